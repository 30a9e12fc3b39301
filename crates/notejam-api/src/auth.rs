use std::sync::Arc;

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum::{Json, extract::State, response::{IntoResponse, Redirect}};
use axum_extra::extract::cookie::CookieJar;
use tracing::info;
use uuid::Uuid;

use notejam_db::Database;
use notejam_types::api::{AuthFormView, FieldErrors, Flash, SigninForm, SignupForm};

use crate::error::ApiError;
use crate::flash;
use crate::forms::{push_error, validate_signin, validate_signup};
use crate::session;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub secret_key: String,
}

pub async fn signup_form(jar: CookieJar) -> (CookieJar, Json<AuthFormView>) {
    let (jar, flash) = flash::take(jar);
    (jar, Json(AuthFormView { flash }))
}

pub async fn signin_form(jar: CookieJar) -> (CookieJar, Json<AuthFormView>) {
    let (jar, flash) = flash::take(jar);
    (jar, Json(AuthFormView { flash }))
}

pub async fn signup(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(form): Json<SignupForm>,
) -> Result<impl IntoResponse, ApiError> {
    let mut errors = match validate_signup(&form) {
        Ok(()) => FieldErrors::new(),
        Err(errors) => errors,
    };

    // Uniqueness check only once the field itself is well-formed
    if !errors.contains_key("email") && state.db.get_user_by_email(&form.email)?.is_some() {
        push_error(&mut errors, "email", "Email is already taken");
    }

    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    // Hash password with Argon2id
    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(form.password.as_bytes(), &salt)
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("password hashing failed: {}", e)))?
        .to_string();

    let user_id = Uuid::new_v4();
    state
        .db
        .create_user(&user_id.to_string(), &form.email, &password_hash)?;

    info!("user {} signed up", user_id);

    let jar = flash::set(jar, Flash::success("Now you can sign in"));
    Ok((jar, Redirect::to("/signin")))
}

pub async fn signin(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(form): Json<SigninForm>,
) -> Result<impl IntoResponse, ApiError> {
    validate_signin(&form).map_err(ApiError::Validation)?;

    // Unknown email and wrong password fail identically — no account
    // enumeration.
    let user = state
        .db
        .get_user_by_email(&form.email)?
        .ok_or(ApiError::AuthFailed)?;

    let parsed_hash = PasswordHash::new(&user.password)
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("corrupt password hash: {}", e)))?;

    Argon2::default()
        .verify_password(form.password.as_bytes(), &parsed_hash)
        .map_err(|_| ApiError::AuthFailed)?;

    let user_id: Uuid = user
        .id
        .parse()
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("corrupt user id '{}': {}", user.id, e)))?;

    let token = session::issue_token(&state.secret_key, user_id, &user.email)?;

    let jar = jar.add(session::session_cookie(token));
    Ok((jar, Redirect::to("/notes")))
}

pub async fn signout(jar: CookieJar) -> (CookieJar, Redirect) {
    (session::clear(jar), Redirect::to("/signin"))
}

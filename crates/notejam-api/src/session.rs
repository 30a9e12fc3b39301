use axum::{extract::Request, extract::State, middleware::Next, response::Response};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::AppState;
use crate::error::ApiError;

pub const SESSION_COOKIE: &str = "notejam_session";

/// Signed session credential carried in an HTTP-only cookie.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub exp: usize,
}

/// The authenticated user resolved from the session cookie, inserted into
/// request extensions by `require_login`.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: Uuid,
    pub email: String,
}

pub fn issue_token(secret: &str, user_id: Uuid, email: &str) -> anyhow::Result<String> {
    let claims = Claims {
        sub: user_id,
        email: email.to_string(),
        exp: (chrono::Utc::now() + chrono::Duration::days(30)).timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}

pub fn verify_token(secret: &str, token: &str) -> Option<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .ok()
}

pub fn session_cookie(token: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

pub fn clear(jar: CookieJar) -> CookieJar {
    jar.remove(Cookie::build((SESSION_COOKIE, "")).path("/").build())
}

/// Login guard for all note/pad routes: resolves the current user from the
/// session cookie, or sends the request back to the sign-in flow. The cookie
/// only names the user; the row must still exist in the store, so a session
/// for a vanished account is just as anonymous as no session at all.
pub async fn require_login(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let jar = CookieJar::from_headers(req.headers());

    let token = jar
        .get(SESSION_COOKIE)
        .map(|c| c.value().to_owned())
        .ok_or(ApiError::Unauthorized)?;

    let claims = verify_token(&state.secret_key, &token).ok_or(ApiError::Unauthorized)?;

    let user = state
        .db
        .get_user_by_id(&claims.sub.to_string())?
        .ok_or(ApiError::Unauthorized)?;

    req.extensions_mut().insert(CurrentUser {
        id: claims.sub,
        email: user.email,
    });
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_round_trip() {
        let user_id = Uuid::new_v4();
        let token = issue_token("secret", user_id, "a@x.com").unwrap();

        let claims = verify_token("secret", &token).unwrap();
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.email, "a@x.com");
    }

    #[test]
    fn wrong_secret_rejected() {
        let token = issue_token("secret", Uuid::new_v4(), "a@x.com").unwrap();
        assert!(verify_token("other", &token).is_none());
    }

    #[test]
    fn tampered_token_rejected() {
        let token = issue_token("secret", Uuid::new_v4(), "a@x.com").unwrap();
        let mut tampered = token.clone();
        tampered.pop();
        assert!(verify_token("secret", &tampered).is_none());
    }

    #[test]
    fn expired_token_rejected() {
        let claims = Claims {
            sub: Uuid::new_v4(),
            email: "a@x.com".to_string(),
            exp: (chrono::Utc::now() - chrono::Duration::hours(2)).timestamp() as usize,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"secret"),
        )
        .unwrap();

        assert!(verify_token("secret", &token).is_none());
    }
}

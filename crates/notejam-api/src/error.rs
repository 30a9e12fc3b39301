use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use tracing::error;

use notejam_types::api::{AuthFormView, FieldErrors, Flash, ValidationErrorBody};

/// The one user-visible message for any failed sign-in attempt; unknown email
/// and wrong password must be indistinguishable.
pub const WRONG_CREDENTIALS: &str = "Wrong email or password";

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("validation failed")]
    Validation(FieldErrors),

    #[error("wrong email or password")]
    AuthFailed,

    #[error("not found")]
    NotFound,

    #[error("authentication required")]
    Unauthorized,

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(e: tokio::task::JoinError) -> Self {
        ApiError::Internal(anyhow::anyhow!("blocking task failed: {}", e))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            // Re-render the form with field errors attached; nothing was
            // written.
            ApiError::Validation(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(ValidationErrorBody { errors }),
            )
                .into_response(),

            // A failed sign-in re-renders the sign-in form with the fixed
            // flash message, exactly like a fresh render of that form.
            ApiError::AuthFailed => Json(AuthFormView {
                flash: Some(Flash::error(WRONG_CREDENTIALS)),
            })
            .into_response(),

            ApiError::NotFound => (
                StatusCode::NOT_FOUND,
                Json(serde_json::json!({ "error": "not found" })),
            )
                .into_response(),

            // Anonymous access to a protected route is handled like a failed
            // sign-in: back to the sign-in flow.
            ApiError::Unauthorized => Redirect::to("/signin").into_response(),

            ApiError::Internal(e) => {
                error!("internal error: {:#}", e);
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}

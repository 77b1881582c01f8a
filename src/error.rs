use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::auth::credentials::CredentialError;
use crate::auth::session::SessionError;
use crate::db::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not found")]
    NotFound,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Credential error: {0}")]
    Credentials(#[from] CredentialError),

    #[error("Session error: {0}")]
    Session(#[from] SessionError),
}

fn internal_error(kind: &str, detail: &dyn std::fmt::Display) -> (StatusCode, String) {
    tracing::error!("{}: {}", kind, detail);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "Internal server error".to_string(),
    )
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::NotFound => (StatusCode::NOT_FOUND, "Not found".to_string()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Store(StoreError::PostNotFound(id)) => {
                (StatusCode::NOT_FOUND, format!("Post {} not found", id))
            }
            AppError::Store(e) => internal_error("Store error", e),
            AppError::Credentials(CredentialError::DuplicateEmail) => {
                (StatusCode::CONFLICT, "Email already taken".to_string())
            }
            AppError::Credentials(CredentialError::InvalidCredentials) => (
                StatusCode::UNAUTHORIZED,
                "Invalid email or password".to_string(),
            ),
            AppError::Credentials(e) => internal_error("Credential error", e),
            AppError::Session(e) => {
                tracing::debug!("Rejected session: {}", e);
                (StatusCode::UNAUTHORIZED, "Unauthorized".to_string())
            }
        };

        (status, message).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::auth::session::{self, Session};
use crate::error::AppError;
use crate::state::AppState;

/// The user named by the session cookie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub username: String,
    pub email: String,
}

impl From<Session> for CurrentUser {
    fn from(session: Session) -> Self {
        Self {
            username: session.username,
            email: session.email,
        }
    }
}

/// Extractor that requires a session cookie.
/// Returns 401 if the cookie is absent or malformed.
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session = session::read_session(&parts.headers, &state.config.auth.cookie_name)?;
        Ok(session.into())
    }
}

/// Optional user extractor — returns None instead of 401 when there is no usable session.
pub struct MaybeUser(pub Option<CurrentUser>);

impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match CurrentUser::from_request_parts(parts, state).await {
            Ok(user) => Ok(MaybeUser(Some(user))),
            Err(_) => Ok(MaybeUser(None)),
        }
    }
}

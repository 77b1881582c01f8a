use askama::Template;
use axum::extract::{Form, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use crate::auth::credentials::{self, CredentialError};
use crate::auth::session::{self, Session};
use crate::error::AppResult;
use crate::routes::home::Html;
use crate::state::AppState;

// -- Templates --

#[derive(Template)]
#[template(path = "pages/signup.html")]
pub struct SignupTemplate {
    pub error: Option<String>,
}

#[derive(Template)]
#[template(path = "pages/login.html")]
pub struct LoginTemplate {
    pub error: Option<String>,
}

// -- Request types --

#[derive(Deserialize)]
pub struct SignupForm {
    pub uname: String,
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

fn see_other(location: &str, cookie: String) -> Response {
    (
        StatusCode::SEE_OTHER,
        [
            (header::LOCATION, location.to_string()),
            (header::SET_COOKIE, cookie),
        ],
        "",
    )
        .into_response()
}

// -- Signup handlers --

/// GET /signup — render signup form
pub async fn signup_page() -> Html<SignupTemplate> {
    Html(SignupTemplate { error: None })
}

/// POST /signup — create the user and send them to the login page
pub async fn signup(
    State(state): State<AppState>,
    Form(form): Form<SignupForm>,
) -> AppResult<Response> {
    match credentials::register_user(
        &state.db,
        &form.uname,
        &form.email,
        &form.password,
        state.config.auth.bcrypt_cost,
    ) {
        Ok(()) => {
            tracing::info!("Registered user {}", form.email);
            Ok((
                StatusCode::SEE_OTHER,
                [(header::LOCATION, "/login")],
                "",
            )
                .into_response())
        }
        Err(e @ CredentialError::DuplicateEmail) => Ok((
            StatusCode::CONFLICT,
            Html(SignupTemplate {
                error: Some(e.to_string()),
            }),
        )
            .into_response()),
        Err(e) => Err(e.into()),
    }
}

// -- Login handlers --

/// GET /login — render login form
pub async fn login_page() -> Html<LoginTemplate> {
    Html(LoginTemplate { error: None })
}

/// POST /login — check credentials and issue the session cookie
pub async fn login(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> AppResult<Response> {
    match credentials::authenticate(&state.db, &form.email, &form.password) {
        Ok(identity) => {
            tracing::info!("User {} logged in", identity.id);
            let session = Session::new(identity.username, identity.email);
            let cookie = session::session_cookie(
                &state.config.auth.cookie_name,
                &session,
                state.config.auth.session_hours,
            );
            Ok(see_other("/welcome", cookie))
        }
        Err(e @ CredentialError::InvalidCredentials) => {
            tracing::warn!("Failed login for {}", form.email);
            Ok((
                StatusCode::UNAUTHORIZED,
                Html(LoginTemplate {
                    error: Some(e.to_string()),
                }),
            )
                .into_response())
        }
        Err(e) => Err(e.into()),
    }
}

// -- Logout handler --

/// GET /logout — drop the session cookie and go back to the login page
pub async fn logout(State(state): State<AppState>) -> Response {
    see_other(
        "/login",
        session::clear_session_cookie(&state.config.auth.cookie_name),
    )
}

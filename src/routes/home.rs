use askama::Template;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::get;
use axum::Router;

use crate::error::AppError;
use crate::extractors::MaybeUser;
use crate::state::AppState;

#[derive(Template)]
#[template(path = "pages/landing.html")]
pub struct LandingTemplate;

#[derive(Template)]
#[template(path = "pages/service.html")]
pub struct ServiceTemplate;

#[derive(Template)]
#[template(path = "pages/contact.html")]
pub struct ContactTemplate;

/// Wrapper to render askama templates as axum responses
pub struct Html<T: Template>(pub T);

impl<T: Template> IntoResponse for Html<T> {
    fn into_response(self) -> Response {
        match self.0.render() {
            Ok(body) => (
                StatusCode::OK,
                [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
                body,
            )
                .into_response(),
            Err(e) => {
                tracing::error!("Template render error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Template error").into_response()
            }
        }
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/landing", get(landing))
        .route("/service", get(service))
        .route("/contact", get(contact))
        .route("/success", get(success))
}

/// Signed-in visitors go straight to the forum.
pub async fn index(maybe_user: MaybeUser) -> Response {
    if maybe_user.0.is_some() {
        return Redirect::to("/welcome").into_response();
    }
    Html(LandingTemplate).into_response()
}

async fn landing() -> Html<LandingTemplate> {
    Html(LandingTemplate)
}

async fn service() -> Html<ServiceTemplate> {
    Html(ServiceTemplate)
}

async fn contact() -> Html<ContactTemplate> {
    Html(ContactTemplate)
}

async fn success() -> &'static str {
    "Signup successful!"
}

pub async fn not_found() -> AppError {
    AppError::NotFound
}

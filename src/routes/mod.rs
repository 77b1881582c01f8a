pub mod assets;
pub mod auth;
pub mod home;
pub mod posts;

use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// The full application router.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/assets/{*path}", get(assets::serve))
        .merge(home::router())
        .merge(auth::router())
        .merge(posts::router())
        .fallback(home::not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

use askama::Template;
use axum::extract::{Form, Query, State};
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::Router;
use serde::Deserialize;

use crate::db::models::{Category, NewPost, PostView};
use crate::error::{AppError, AppResult};
use crate::extractors::CurrentUser;
use crate::forum::posts::FilterQuery;
use crate::forum::{self, PostFilter};
use crate::routes::home::Html;
use crate::state::AppState;

#[derive(Template)]
#[template(path = "pages/welcome.html")]
struct WelcomeTemplate {
    username: String,
    email: String,
    posts: Vec<PostView>,
    filter: PostFilter,
    interactive: bool,
}

#[derive(Template)]
#[template(path = "pages/readonly.html")]
struct ReadonlyTemplate {
    posts: Vec<PostView>,
    filter: PostFilter,
    interactive: bool,
}

#[derive(Template)]
#[template(path = "pages/create_post.html")]
struct CreatePostTemplate {
    categories: Vec<Category>,
}

#[derive(Deserialize)]
struct CreatePostForm {
    title: String,
    content: String,
    category: Option<String>,
}

#[derive(Deserialize)]
struct CommentForm {
    post_id: i64,
    content: String,
}

#[derive(Deserialize)]
struct ReactionForm {
    post_id: i64,
}

/// Empty means "no category".
fn parse_category(raw: Option<&str>) -> AppResult<Option<i64>> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(value) => value
            .parse()
            .map(Some)
            .map_err(|_| AppError::BadRequest(format!("Invalid category: {}", value))),
    }
}

/// Forum home for signed-in users
async fn welcome(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<FilterQuery>,
) -> AppResult<impl IntoResponse> {
    let filter = PostFilter::from_query(&query);
    let posts = filter.apply(forum::list_posts(&state.db)?);

    Ok(Html(WelcomeTemplate {
        username: user.username,
        email: user.email,
        posts,
        filter,
        interactive: true,
    }))
}

/// Same listing without a session and without the action forms
async fn readonly(
    State(state): State<AppState>,
    Query(query): Query<FilterQuery>,
) -> AppResult<impl IntoResponse> {
    let filter = PostFilter::from_query(&query);
    let posts = filter.apply(forum::list_posts(&state.db)?);

    Ok(Html(ReadonlyTemplate {
        posts,
        filter,
        interactive: false,
    }))
}

async fn create_page(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let categories = forum::list_categories(&state.db)?;
    Ok(Html(CreatePostTemplate { categories }))
}

async fn create(
    State(state): State<AppState>,
    Form(form): Form<CreatePostForm>,
) -> AppResult<Response> {
    let category_id = parse_category(form.category.as_deref())?;
    let post_id = forum::create_post(
        &state.db,
        NewPost {
            title: form.title,
            content: form.content,
            category_id,
        },
    )?;
    tracing::info!("Created post {}", post_id);

    Ok(Redirect::to("/welcome").into_response())
}

async fn comment(
    State(state): State<AppState>,
    Form(form): Form<CommentForm>,
) -> AppResult<Response> {
    forum::add_comment(&state.db, form.post_id, &form.content)?;
    Ok(Redirect::to("/welcome").into_response())
}

async fn like(
    State(state): State<AppState>,
    Form(form): Form<ReactionForm>,
) -> AppResult<Response> {
    forum::increment_like(&state.db, form.post_id)?;
    Ok(Redirect::to("/welcome").into_response())
}

async fn dislike(
    State(state): State<AppState>,
    Form(form): Form<ReactionForm>,
) -> AppResult<Response> {
    forum::increment_dislike(&state.db, form.post_id)?;
    Ok(Redirect::to("/welcome").into_response())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/welcome", get(welcome))
        .route("/readonly", get(readonly))
        .route("/create", get(create_page).post(create))
        .route("/comment", post(comment))
        .route("/like", post(like))
        .route("/dislike", post(dislike))
}

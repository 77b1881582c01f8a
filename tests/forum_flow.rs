//! End-to-end request tests against the full router
//!
//! Each test gets its own SQLite file in a temp dir and drives the app with
//! `tower::ServiceExt::oneshot`, so no socket is opened.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use forum::config::Config;
use forum::state::AppState;
use forum::{db, forum as board, routes};
use tempfile::TempDir;
use tower::ServiceExt;

struct TestApp {
    _dir: TempDir,
    state: AppState,
}

impl TestApp {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let pool = db::create_pool(&dir.path().join("forum.db"), 4).unwrap();
        db::run_migrations(&pool).unwrap();

        let mut config = Config::default();
        config.auth.bcrypt_cost = 4;

        Self {
            _dir: dir,
            state: AppState { db: pool, config },
        }
    }

    fn router(&self) -> Router {
        routes::app(self.state.clone())
    }

    async fn get(&self, uri: &str, cookie: Option<&str>) -> Response {
        let mut builder = Request::builder().method("GET").uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.router()
            .oneshot(builder.body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    async fn post_form(&self, uri: &str, form: &str) -> Response {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(form.to_string()))
            .unwrap();
        self.router().oneshot(request).await.unwrap()
    }

    async fn signup_and_login(&self) -> String {
        let response = self
            .post_form("/signup", "uname=alice&email=alice%40x.com&password=pw1")
            .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let response = self
            .post_form("/login", "email=alice%40x.com&password=pw1")
            .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        cookie_pair(&response)
    }
}

async fn body_text(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn location(response: &Response) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .unwrap()
        .to_str()
        .unwrap()
}

fn set_cookie(response: &Response) -> &str {
    response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap()
}

// "name=value" part of the Set-Cookie header, as a browser would send it back
fn cookie_pair(response: &Response) -> String {
    set_cookie(response).split(';').next().unwrap().to_string()
}

// ============================================================================
// ACCOUNTS AND SESSIONS
// ============================================================================

#[tokio::test]
async fn signup_then_login_sets_session_and_opens_welcome() {
    let app = TestApp::new();

    let response = app
        .post_form("/signup", "uname=alice&email=alice%40x.com&password=pw1")
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");

    let response = app
        .post_form("/login", "email=alice%40x.com&password=pw1")
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/welcome");
    assert!(set_cookie(&response).starts_with("session=alice|alice@x.com;"));
    assert!(set_cookie(&response).contains("Path=/"));

    let cookie = cookie_pair(&response);
    let response = app.get("/welcome", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("Welcome, alice"));
    assert!(body.contains("alice@x.com"));
}

#[tokio::test]
async fn wrong_password_and_unknown_email_are_both_unauthorized() {
    let app = TestApp::new();
    app.signup_and_login().await;

    let wrong = app
        .post_form("/login", "email=alice%40x.com&password=wrongpw")
        .await;
    assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);
    assert!(wrong.headers().get(header::SET_COOKIE).is_none());
    let wrong_body = body_text(wrong).await;
    assert!(wrong_body.contains("Invalid email or password"));

    let unknown = app
        .post_form("/login", "email=nobody%40x.com&password=pw1")
        .await;
    assert_eq!(unknown.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_text(unknown).await, wrong_body);
}

#[tokio::test]
async fn duplicate_signup_shows_message_and_keeps_one_row() {
    let app = TestApp::new();
    app.signup_and_login().await;

    let response = app
        .post_form("/signup", "uname=other&email=alice%40x.com&password=pw2")
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert!(body_text(response).await.contains("Email already taken"));

    let conn = app.state.db.get().unwrap();
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM user", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn welcome_requires_a_well_formed_session() {
    let app = TestApp::new();

    let response = app.get("/welcome", None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app.get("/welcome", Some("session=just-a-name")).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn logout_expires_the_cookie() {
    let app = TestApp::new();

    let response = app.get("/logout", None).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");
    let cookie = set_cookie(&response);
    assert!(cookie.starts_with("session=;"));
    assert!(cookie.contains("Max-Age=0"));
}

#[tokio::test]
async fn home_redirects_signed_in_users() {
    let app = TestApp::new();

    let response = app.get("/", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.get("/", Some("session=alice|alice@x.com")).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/welcome");
}

#[tokio::test]
async fn non_ascii_and_delimiter_usernames_keep_their_session() {
    let app = TestApp::new();

    for (form, email, shown) in [
        ("uname=Zo%C3%AB&email=zoe%40x.com&password=pw1", "zoe%40x.com", "Welcome, Zoë"),
        ("uname=a%7Cb&email=ab%40x.com&password=pw1", "ab%40x.com", "Welcome, a|b"),
    ] {
        let response = app.post_form("/signup", form).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let response = app
            .post_form("/login", &format!("email={}&password=pw1", email))
            .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert!(set_cookie(&response).is_ascii());

        let cookie = cookie_pair(&response);
        let response = app.get("/welcome", Some(&cookie)).await;
        assert_eq!(response.status(), StatusCode::OK, "cookie {}", cookie);
        assert!(body_text(response).await.contains(shown));
    }
}

// ============================================================================
// POSTS, COMMENTS AND REACTIONS
// ============================================================================

#[tokio::test]
async fn create_post_then_comment_shows_up_everywhere() {
    let app = TestApp::new();
    let cookie = app.signup_and_login().await;

    let response = app
        .post_form("/create", "title=Hello&content=World&category=")
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/welcome");

    let posts = board::list_posts(&app.state.db).unwrap();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].title, "Hello");
    assert_eq!(posts[0].content, "World");
    assert!(posts[0].comments.is_empty());

    let form = format!("post_id={}&content=nice%21", posts[0].id);
    let response = app.post_form("/comment", &form).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let posts = board::list_posts(&app.state.db).unwrap();
    let comments: Vec<&str> = posts[0]
        .comments
        .iter()
        .map(|c| c.content.as_str())
        .collect();
    assert_eq!(comments, vec!["nice!"]);

    for (uri, cookie) in [("/welcome", Some(cookie.as_str())), ("/readonly", None)] {
        let response = app.get(uri, cookie).await;
        assert_eq!(response.status(), StatusCode::OK, "{}", uri);
        let body = body_text(response).await;
        assert!(body.contains("Hello"), "{}", uri);
        assert!(body.contains("World"), "{}", uri);
        assert!(body.contains("nice!"), "{}", uri);
    }
}

#[tokio::test]
async fn readonly_page_has_no_action_forms() {
    let app = TestApp::new();
    app.post_form("/create", "title=Quiet&content=Reading").await;

    let body = body_text(app.get("/readonly", None).await).await;
    assert!(body.contains("Quiet"));
    assert!(!body.contains("action=\"/comment\""));
    assert!(!body.contains("action=\"/like\""));
}

#[tokio::test]
async fn create_page_lists_categories_and_tags_posts() {
    let app = TestApp::new();

    let body = body_text(app.get("/create", None).await).await;
    assert!(body.contains("Announcements"));

    let help = board::list_categories(&app.state.db)
        .unwrap()
        .into_iter()
        .find(|c| c.name == "Help")
        .unwrap();
    let form = format!("title=Stuck&content=Please&category={}", help.id);
    let response = app.post_form("/create", &form).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let posts = board::list_posts(&app.state.db).unwrap();
    assert_eq!(posts[0].category.as_deref(), Some("Help"));
}

#[tokio::test]
async fn bad_or_unknown_category_creates_nothing() {
    let app = TestApp::new();

    let response = app
        .post_form("/create", "title=A&content=B&category=music")
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .post_form("/create", "title=A&content=B&category=999")
        .await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    assert!(board::list_posts(&app.state.db).unwrap().is_empty());
}

#[tokio::test]
async fn like_and_dislike_update_counters() {
    let app = TestApp::new();
    app.post_form("/create", "title=Vote&content=me").await;

    for uri in ["/like", "/like", "/dislike"] {
        let response = app.post_form(uri, "post_id=1").await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/welcome");
    }

    let posts = board::list_posts(&app.state.db).unwrap();
    assert_eq!(posts[0].like_count, 2);
    assert_eq!(posts[0].dislike_count, 1);

    let body = body_text(app.get("/readonly?filter=liked&threshold=1", None).await).await;
    assert!(body.contains("Vote"));
    let body = body_text(app.get("/readonly?filter=disliked&threshold=1", None).await).await;
    assert!(!body.contains("Vote"));
}

#[tokio::test]
async fn cleared_threshold_box_still_lists_posts() {
    let app = TestApp::new();
    let cookie = app.signup_and_login().await;
    app.post_form("/create", "title=Kept&content=here").await;

    let response = app.get("/readonly?filter=all&threshold=", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Kept"));

    let response = app.get("/welcome?filter=liked&threshold=", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn reacting_to_a_missing_post_is_not_found() {
    let app = TestApp::new();
    let response = app.post_form("/like", "post_id=41").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn comment_on_a_missing_post_is_a_server_error() {
    let app = TestApp::new();
    let response = app.post_form("/comment", "post_id=41&content=hi").await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

// ============================================================================
// STATIC PAGES
// ============================================================================

#[tokio::test]
async fn static_pages_and_assets_are_served() {
    let app = TestApp::new();

    for uri in ["/landing", "/service", "/contact", "/signup", "/login"] {
        let response = app.get(uri, None).await;
        assert_eq!(response.status(), StatusCode::OK, "{}", uri);
    }

    let response = app.get("/success", None).await;
    assert_eq!(body_text(response).await, "Signup successful!");

    let response = app.get("/assets/css/forum.css", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "text/css"
    );

    let response = app.get("/assets/nope.js", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app.get("/no/such/page", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

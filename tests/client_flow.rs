//! End-to-end client tests against an in-process stub of the analyzer API.
//!
//! The stub mirrors the backend contract: bearer-protected extract and
//! analyze endpoints, and open login/register endpoints.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};
use tempfile::TempDir;

use compann::auth::{registration_error_message, LoginRequest, RegisterRequest};
use compann::config::Settings;
use compann::credentials::{CredentialStore, FileCredentialStore, TOKEN_KEY, USERNAME_KEY};
use compann::dashboard::{Phase, StepOutcome, ANALYSIS_PRECONDITION_MESSAGE};
use compann::router::{Navigator, Route};
use compann::App;

const PASSWORD: &str = "secret1";

/// One request as the stub saw it.
#[derive(Debug, Clone)]
struct Seen {
    path: String,
    authorization: Option<String>,
}

#[derive(Clone, Default)]
struct Stub {
    seen: Arc<Mutex<Vec<Seen>>>,
}

impl Stub {
    fn record(&self, path: &str, headers: &HeaderMap) -> Option<String> {
        let authorization = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        self.seen.lock().unwrap().push(Seen {
            path: path.to_string(),
            authorization: authorization.clone(),
        });
        authorization
    }

    fn seen(&self) -> Vec<Seen> {
        self.seen.lock().unwrap().clone()
    }
}

fn bearer_is_valid(authorization: Option<&str>) -> bool {
    authorization
        .and_then(|h| h.strip_prefix("Bearer token-"))
        .is_some_and(|user| !user.is_empty())
}

async fn login(State(stub): State<Stub>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    stub.record("/api/auth/login", &headers);
    let username = body["username"].as_str().unwrap_or_default().to_string();
    if body["password"] != PASSWORD {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    Json(json!({
        "accessToken": format!("token-{}", username),
        "tokenType": "Bearer",
        "username": username,
    }))
    .into_response()
}

async fn register(
    State(stub): State<Stub>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    stub.record("/api/auth/register", &headers);
    if body["username"] == "taken" {
        return (StatusCode::BAD_REQUEST, "Error: Username is already taken!").into_response();
    }
    (StatusCode::CREATED, "User registered successfully!").into_response()
}

async fn extract(State(stub): State<Stub>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    let authorization = stub.record("/api/extract", &headers);
    if !bearer_is_valid(authorization.as_deref()) {
        return StatusCode::UNAUTHORIZED.into_response();
    }

    let url = body["url"].as_str().unwrap_or_default();
    let title = if url.contains("unreachable") {
        format!("Error: Could not connect to {}", url)
    } else {
        "Acme Widgets".to_string()
    };
    Json(json!({
        "requestedUrl": url,
        "title": title,
        "metaDescription": "We make widgets",
        "imageUrls": ["https://acme.test/logo.png"],
        "ogImageUrls": [],
        "openGraphTags": {"og:title": "Acme"},
        "twitterTags": {},
        "socialMediaLinks": ["https://twitter.com/acme"],
        "imageCount": 1,
        "openGraphTagCount": 1,
        "twitterTagCount": 0,
        "hasFavicon": true
    }))
    .into_response()
}

async fn analyze(State(stub): State<Stub>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    let authorization = stub.record("/api/analyze", &headers);
    if !bearer_is_valid(authorization.as_deref()) {
        return StatusCode::FORBIDDEN.into_response();
    }
    Json(json!({
        "summary": format!("Analysis of {}", body["title"].as_str().unwrap_or("?")),
        "pros": ["Clear product focus"],
        "cons": ["Thin social presence"],
        "opportunities": ["Content marketing"],
        "redFlags": []
    }))
    .into_response()
}

async fn spawn_stub() -> (SocketAddr, Stub) {
    let stub = Stub::default();
    let app = Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/register", post(register))
        .route("/api/extract", post(extract))
        .route("/api/analyze", post(analyze))
        .with_state(stub.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (addr, stub)
}

fn settings(addr: SocketAddr, data_dir: &TempDir) -> Settings {
    Settings {
        api_url: format!("http://{}", addr),
        request_timeout: 5,
        ..Settings::with_data_dir(data_dir.path().to_path_buf())
    }
}

#[tokio::test]
async fn test_login_extract_analyze_logout() {
    let (addr, stub) = spawn_stub().await;
    let dir = TempDir::new().unwrap();
    let app = App::new(&settings(addr, &dir)).unwrap();

    assert_eq!(app.router.navigate_to(""), Route::Login);

    app.auth
        .login(&LoginRequest::new("alice", PASSWORD))
        .await
        .unwrap();
    assert_eq!(app.router.navigate(Route::Dashboard), Route::Dashboard);
    assert_eq!(app.dashboard.username().as_deref(), Some("alice"));

    assert_eq!(
        app.dashboard.submit_url("https://acme.test").await,
        StepOutcome::Applied
    );
    assert!(app.dashboard.can_request_analysis());
    assert_eq!(app.dashboard.request_analysis().await, StepOutcome::Applied);

    let state = app.dashboard.state();
    assert_eq!(state.phase(), Phase::AnalyzedReady);
    assert_eq!(
        state.analysis.unwrap().summary.as_deref(),
        Some("Analysis of Acme Widgets")
    );

    assert_eq!(app.auth.logout(), Route::Login);
    assert!(!app.session.is_authenticated());

    let seen = stub.seen();
    let paths: Vec<_> = seen.iter().map(|s| s.path.as_str()).collect();
    assert_eq!(paths, ["/api/auth/login", "/api/extract", "/api/analyze"]);
    assert_eq!(seen[0].authorization, None);
    assert_eq!(seen[1].authorization.as_deref(), Some("Bearer token-alice"));
    assert_eq!(seen[2].authorization.as_deref(), Some("Bearer token-alice"));
}

#[tokio::test]
async fn test_session_survives_restart_until_logout() {
    let (addr, stub) = spawn_stub().await;
    let dir = TempDir::new().unwrap();
    let settings = settings(addr, &dir);

    {
        let app = App::new(&settings).unwrap();
        app.auth
            .login(&LoginRequest::new("bob", PASSWORD))
            .await
            .unwrap();
    }

    let restarted = App::new(&settings).unwrap();
    assert!(restarted.session.is_authenticated());
    assert_eq!(restarted.session.username().as_deref(), Some("bob"));
    assert_eq!(restarted.router.navigate_to("dashboard"), Route::Dashboard);
    assert_eq!(
        restarted.dashboard.submit_url("https://acme.test").await,
        StepOutcome::Applied
    );
    assert_eq!(
        stub.seen().last().unwrap().authorization.as_deref(),
        Some("Bearer token-bob")
    );

    restarted.auth.logout();
    drop(restarted);

    let after_logout = App::new(&settings).unwrap();
    assert!(!after_logout.session.is_authenticated());
    assert_eq!(after_logout.router.navigate_to("dashboard"), Route::Login);
}

#[tokio::test]
async fn test_failed_login_changes_nothing() {
    let (addr, _stub) = spawn_stub().await;
    let dir = TempDir::new().unwrap();
    let settings = settings(addr, &dir);
    let app = App::new(&settings).unwrap();

    let err = app
        .auth
        .login(&LoginRequest::new("alice", "wrong-password"))
        .await
        .unwrap_err();
    assert_eq!(err.status().map(|s| s.as_u16()), Some(401));
    assert!(!app.session.is_authenticated());

    let url = settings.api_url().unwrap();
    let store = FileCredentialStore::for_origin(&settings.data_dir, &url);
    assert_eq!(store.get(TOKEN_KEY), None);
}

#[tokio::test]
async fn test_stale_token_gets_session_hint() {
    let (addr, stub) = spawn_stub().await;
    let dir = TempDir::new().unwrap();
    let settings = settings(addr, &dir);

    let url = settings.api_url().unwrap();
    FileCredentialStore::for_origin(&settings.data_dir, &url)
        .set_many(&[(TOKEN_KEY, "revoked"), (USERNAME_KEY, "carol")]);

    let app = App::new(&settings).unwrap();
    assert_eq!(app.router.navigate(Route::Dashboard), Route::Dashboard);
    assert_eq!(
        app.dashboard.submit_url("https://acme.test").await,
        StepOutcome::Failed
    );

    let error = app.dashboard.state().extraction_error.unwrap();
    assert_eq!(
        error,
        format!(
            "Error submitting URL: Http failure response for http://{}/api/extract: \
             401 Unauthorized. Your session might have expired. Please try logging out \
             and logging back in.",
            addr
        )
    );
    assert_eq!(
        stub.seen()[0].authorization.as_deref(),
        Some("Bearer revoked")
    );
}

#[tokio::test]
async fn test_soft_error_blocks_analysis_without_request() {
    let (addr, stub) = spawn_stub().await;
    let dir = TempDir::new().unwrap();
    let app = App::new(&settings(addr, &dir)).unwrap();
    app.auth
        .login(&LoginRequest::new("dave", PASSWORD))
        .await
        .unwrap();

    assert_eq!(
        app.dashboard.submit_url("https://unreachable.test").await,
        StepOutcome::Applied
    );
    let state = app.dashboard.state();
    assert!(state.extraction.is_some());
    assert!(state
        .extraction_error
        .unwrap()
        .starts_with("Extraction issue: Error: Could not connect"));

    assert_eq!(app.dashboard.request_analysis().await, StepOutcome::Invalid);
    assert_eq!(
        app.dashboard.state().analysis_error.as_deref(),
        Some(ANALYSIS_PRECONDITION_MESSAGE)
    );
    assert!(stub.seen().iter().all(|s| s.path != "/api/analyze"));
}

#[tokio::test]
async fn test_register_reports_server_messages() {
    let (addr, stub) = spawn_stub().await;
    let dir = TempDir::new().unwrap();
    let app = App::new(&settings(addr, &dir)).unwrap();

    let reply = app
        .auth
        .register(&RegisterRequest::new("erin", PASSWORD))
        .await
        .unwrap();
    assert_eq!(reply.message(), "User registered successfully!");
    assert!(!app.session.is_authenticated());

    let err = app
        .auth
        .register(&RegisterRequest::new("taken", PASSWORD))
        .await
        .unwrap_err();
    assert_eq!(
        registration_error_message(&err),
        "Error: Username is already taken!"
    );
    assert!(stub.seen().iter().all(|s| s.authorization.is_none()));
}

#[tokio::test]
async fn test_unreachable_server_is_transport_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let dir = TempDir::new().unwrap();
    let app = App::new(&settings(addr, &dir)).unwrap();
    app.session.set_authenticated("token-frank", "frank");

    assert_eq!(
        app.dashboard.submit_url("https://acme.test").await,
        StepOutcome::Failed
    );
    assert_eq!(
        app.dashboard.state().extraction_error,
        Some(format!(
            "Error submitting URL: Http failure response for http://{}/api/extract: 0 Unknown Error",
            addr
        ))
    );
}

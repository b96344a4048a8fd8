#![allow(dead_code)]

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use sea_orm::{Database, DatabaseConnection};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

use gitcal_webservice::calendar::{CalendarGenerator, GenerationError, GenerationRequest};
use gitcal_webservice::db::schema;
use gitcal_webservice::server::config::ServerConfig;
use gitcal_webservice::web::create_axum_router;

pub const TEST_ENCRYPTION_KEY: &str =
    "000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f";

/// Test stand-in for the GitLab-backed generator: returns canned bytes or
/// a canned authentication failure, and records every request. The canned
/// response can be swapped mid-test.
pub struct StubGenerator {
    pub response: std::sync::Mutex<Result<Vec<u8>, String>>,
    pub seen: std::sync::Mutex<Vec<GenerationRequest>>,
}

impl StubGenerator {
    pub fn ok(bytes: &[u8]) -> Self {
        StubGenerator {
            response: std::sync::Mutex::new(Ok(bytes.to_vec())),
            seen: std::sync::Mutex::new(Vec::new()),
        }
    }

    pub fn auth_failure(message: &str) -> Self {
        StubGenerator {
            response: std::sync::Mutex::new(Err(message.to_string())),
            seen: std::sync::Mutex::new(Vec::new()),
        }
    }

    pub fn set_response(&self, bytes: &[u8]) {
        *self.response.lock().unwrap() = Ok(bytes.to_vec());
    }
}

#[async_trait]
impl CalendarGenerator for StubGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<Vec<u8>, GenerationError> {
        self.seen.lock().unwrap().push(request.clone());
        match &*self.response.lock().unwrap() {
            Ok(bytes) => Ok(bytes.clone()),
            Err(message) => Err(GenerationError::AuthFailed(message.clone())),
        }
    }
}

pub struct TestApp {
    pub router: Router,
    pub db: DatabaseConnection,
    pub config: Arc<ServerConfig>,
    pub media_root: TempDir,
    _db_dir: TempDir,
}

pub async fn spawn_app(generator: Arc<dyn CalendarGenerator>) -> TestApp {
    let db_dir = TempDir::new().expect("failed to create temp db dir");
    let db_path = db_dir.path().join("test.sqlite");
    let db = Database::connect(format!("sqlite://{}?mode=rwc", db_path.display()))
        .await
        .expect("failed to open sqlite database");
    schema::create_all_tables(&db)
        .await
        .expect("failed to create schema");

    let media_root = TempDir::new().expect("failed to create media root");
    let config = Arc::new(ServerConfig {
        listen_addr: "127.0.0.1:0".to_string(),
        jwt_secret: "test-secret".to_string(),
        token_encryption_key: TEST_ENCRYPTION_KEY.to_string(),
        media_root: media_root.path().display().to_string(),
    });

    let router = create_axum_router(db.clone(), generator, config.clone());
    TestApp {
        router,
        db,
        config,
        media_root,
        _db_dir: db_dir,
    }
}

pub async fn spawn_app_with_stub_ok(bytes: &[u8]) -> TestApp {
    spawn_app(Arc::new(StubGenerator::ok(bytes))).await
}

/// Sends a request and returns status plus parsed JSON body (Null when
/// the body is empty or not JSON).
pub async fn send_json(
    router: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let (status, bytes, _) = send_raw(router, method, uri, token, body).await;
    let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, json)
}

pub async fn send_raw(
    router: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> (StatusCode, Vec<u8>, axum::http::HeaderMap) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("failed to build request");

    let response = router
        .clone()
        .oneshot(request)
        .await
        .expect("request failed");
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("failed to read body")
        .to_bytes()
        .to_vec();
    (status, bytes, headers)
}

/// Registers a user and returns their login token.
pub async fn register_and_login(router: &Router, username: &str, password: &str) -> String {
    let (status, _) = send_json(
        router,
        "POST",
        "/api/auth/register",
        None,
        Some(serde_json::json!({ "username": username, "password": password })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "registration failed for {username}");

    let (status, body) = send_json(
        router,
        "POST",
        "/api/auth/login",
        None,
        Some(serde_json::json!({ "username": username, "password": password })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed for {username}");
    body["token"]
        .as_str()
        .expect("login response carries no token")
        .to_string()
}

/// Promotes an existing user to superuser directly in the database; the
/// API deliberately offers no endpoint for this.
pub async fn make_superuser(db: &DatabaseConnection, username: &str) {
    use gitcal_webservice::db::entities::user;
    use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};

    let user_model = user::Entity::find()
        .filter(user::Column::Username.eq(username))
        .one(db)
        .await
        .expect("user lookup failed")
        .expect("user not found");
    let mut active: user::ActiveModel = user_model.into();
    active.is_superuser = Set(true);
    active.update(db).await.expect("failed to promote user");
}

/// Creates a GitLab API registration and returns its id.
pub async fn create_api(router: &Router, token: &str, name: &str) -> i32 {
    let (status, body) = send_json(
        router,
        "POST",
        "/api/gitlabapis",
        Some(token),
        Some(serde_json::json!({
            "api_name": name,
            "url": "https://gitlab.example.org/",
            "token": "glpat-test-token"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "api creation failed: {body}");
    body["id"].as_i64().expect("api id missing") as i32
}

/// Creates a calendar configuration and returns the response body.
pub async fn create_config(
    router: &Router,
    token: &str,
    api_id: i32,
    name: &str,
    projects: &str,
) -> serde_json::Value {
    let (status, body) = send_json(
        router,
        "POST",
        "/api/calendars",
        Some(token),
        Some(serde_json::json!({
            "config_name": name,
            "api_id": api_id,
            "projects": projects
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "config creation failed: {body}");
    body
}

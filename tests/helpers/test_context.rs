//! Test context for unified test setup
//!
//! Builds the full router over an in-memory document store and a temporary
//! upload directory, and drives it with `tower::ServiceExt::oneshot`.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use chrono::Utc;
use serde_json::Value;
use std::sync::{Arc, Once};
use tempfile::TempDir;
use tower::ServiceExt;
use uuid::Uuid;

use EventHub::config::Settings;
use EventHub::database::MemoryStore;
use EventHub::handlers::build_router;
use EventHub::models::{AuditFields, ChangeType, Permissions, Role, User};
use EventHub::services::LocalObjectStore;
use EventHub::state::AppState;

use super::test_data::{test_email, TEST_PASSWORD};

static INIT: Once = Once::new();

/// A decoded response
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestResponse {
    pub fn message(&self) -> &str {
        self.body["message"].as_str().unwrap_or_default()
    }

    pub fn id(&self) -> Uuid {
        self.body["id"]
            .as_str()
            .and_then(|id| Uuid::parse_str(id).ok())
            .unwrap_or_else(|| panic!("response has no id: {}", self.body))
    }
}

/// A user known to the test with a valid session token
#[derive(Debug, Clone)]
pub struct TestUser {
    pub id: Uuid,
    pub email: String,
    pub token: String,
}

/// Unified test context that manages all test components
pub struct TestContext {
    pub app: Router,
    pub state: AppState,
    pub temp_dir: TempDir,
}

impl TestContext {
    /// Create a new test context with all components initialized
    pub async fn new() -> Self {
        Self::new_with_settings(|_| {}).await
    }

    /// Create a new test context after adjusting the default test settings
    pub async fn new_with_settings(adjust: impl FnOnce(&mut Settings)) -> Self {
        INIT.call_once(|| {
            let _ = tracing_subscriber::fmt().with_env_filter("warn").try_init();
        });

        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let mut settings = Self::create_test_settings(&temp_dir);
        adjust(&mut settings);

        let objects = Arc::new(LocalObjectStore::new(&settings.storage).expect("Invalid storage settings"));
        let state = AppState::new(settings, Arc::new(MemoryStore::new()), objects);
        let app = build_router(state.clone());

        Self { app, state, temp_dir }
    }

    /// Create test-specific settings
    fn create_test_settings(temp_dir: &TempDir) -> Settings {
        let mut settings = Settings::default();
        settings.auth.jwt_secret = "integration-test-secret".to_string();
        settings.storage.upload_dir = temp_dir.path().join("uploads").to_string_lossy().to_string();
        settings.storage.public_base_url = "http://localhost:5000/uploads".to_string();
        settings.logging.level = "debug".to_string();
        settings.logging.file_path = temp_dir.path().join("logs").to_string_lossy().to_string();
        settings
    }

    /// Send a request through the router
    pub async fn request(&self, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("Failed to build request");

        self.send(request).await
    }

    /// Send a multipart body produced by [`super::MultipartForm`]
    pub async fn multipart(&self, uri: &str, token: &str, (content_type, body): (String, Vec<u8>)) -> TestResponse {
        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .header(header::CONTENT_TYPE, content_type)
            .body(Body::from(body))
            .expect("Failed to build request");

        self.send(request).await
    }

    async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.app.clone().oneshot(request).await.expect("Router failed");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read body");
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into()))
        };

        TestResponse { status, body }
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.request(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> TestResponse {
        self.request(Method::POST, uri, token, Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: Option<&str>, body: Value) -> TestResponse {
        self.request(Method::PUT, uri, token, Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.request(Method::DELETE, uri, token, None).await
    }

    /// Insert a user straight into the store; registration cannot create admins
    pub async fn seed_user(&self, name: &str, role: Role) -> TestUser {
        let now = Utc::now();
        let email = test_email(name);
        let user = User {
            id: Uuid::new_v4(),
            name: name.to_string(),
            role,
            permissions: Permissions::default(),
            tickets: Vec::new(),
            email: email.clone(),
            phone: None,
            last_session: now,
            password_hash: self.state.services.auth_service.hash_password(TEST_PASSWORD),
            verified: true,
            verify_number: None,
            is_deleted: false,
            created_at: now,
            audit: AuditFields::stamp(None, &ChangeType::Create),
        };
        self.state.db.users.create(&user).await.expect("Failed to seed user");

        TestUser {
            id: user.id,
            token: self.token_for(user.id),
            email,
        }
    }

    pub async fn admin(&self) -> TestUser {
        self.seed_user("Admin", Role::Admin).await
    }

    /// Register through the API as an ordinary user
    pub async fn register(&self, name: &str) -> TestUser {
        let email = test_email(name);
        let response = self
            .post(
                "/api/users",
                None,
                serde_json::json!({ "name": name, "email": email, "password": TEST_PASSWORD }),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "register failed: {}", response.body);

        TestUser {
            id: response.id(),
            email,
            token: response.body["token"].as_str().unwrap_or_default().to_string(),
        }
    }

    pub fn token_for(&self, user_id: Uuid) -> String {
        self.state
            .services
            .auth_service
            .generate_token(user_id)
            .expect("Failed to sign token")
    }
}

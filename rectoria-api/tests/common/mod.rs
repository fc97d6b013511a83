/// Common test utilities for integration tests
///
/// Builds the full router on the in-memory store, so the tests need neither
/// a database nor environment variables.

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::response::Response;
use rectoria_api::app::{build_router, AppState};
use rectoria_api::config::{ApiConfig, Config, Environment, JwtConfig, LogFormat};
use rectoria_shared::auth::jwt::{create_token, Claims, ADMIN_ROLE};
use rectoria_shared::data_access::DataAccess;
use rectoria_shared::registry::Registry;
use rectoria_shared::store::MemoryStore;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt as _;

pub const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

/// Test context containing all necessary resources
pub struct TestContext {
    pub app: axum::Router,
    pub data: DataAccess,
    pub config: Config,
}

impl TestContext {
    /// Creates a new test context with an empty store
    pub fn new() -> Self {
        let config = Config {
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                cors_origins: vec!["*".to_string()],
            },
            database: None,
            jwt: JwtConfig {
                secret: SECRET.to_string(),
            },
            environment: Environment::Pruebas,
            log_format: LogFormat::Pretty,
        };

        let registry = Arc::new(Registry::new().unwrap());
        let data = DataAccess::new(registry, Arc::new(MemoryStore::new()));
        let app = build_router(AppState::new(data.clone(), config.clone()));

        TestContext { app, data, config }
    }

    /// Token for a user holding `rol`
    pub fn token_for(&self, rol: &str) -> String {
        create_token(&Claims::new(1, "prueba", rol), &self.config.jwt.secret).unwrap()
    }

    /// Authorization header value for an admin
    pub fn admin_header(&self) -> String {
        format!("Bearer {}", self.token_for(ADMIN_ROLE))
    }

    /// Sends a request and returns the status with the decoded JSON body
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        authorization: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(authorization) = authorization {
            builder = builder.header(header::AUTHORIZATION, authorization);
        }

        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();
        read_json(response).await
    }

    /// Sends a request carrying the admin token
    pub async fn send_as_admin(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let authorization = self.admin_header();
        self.send(method, uri, Some(&authorization), body).await
    }
}

pub async fn read_json(response: Response) -> (StatusCode, Value) {
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap_or_else(|_| {
            panic!("Expected JSON body, got {}", String::from_utf8_lossy(&body))
        })
    };

    (status, json)
}

//! API handlers module

pub mod assessments;
pub mod attendance;
pub mod courses;
pub mod discussions;
pub mod health;
pub mod live_sessions;
pub mod platforms;
pub mod reports;
pub mod sap;
pub mod students;
pub mod teachers;

use axum::extract::{FromRequest, FromRequestParts};
use classdesk_common::errors::{AppError, Result};
use serde::Serialize;

/// JSON body extractor whose rejections use the API error format
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

/// Query string extractor with the same rejection handling as `AppJson`
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct AppQuery<T>(pub T);

/// `{"message": ...}` acknowledgement body
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Fail with `MissingField` when a required string is blank
pub fn require(value: &str, field: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(AppError::MissingField {
            field: field.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::{create_router, uploads::UploadStore, AppState};
    use axum::{
        body::Body,
        http::{header::CONTENT_TYPE, Method, Request, StatusCode},
        Router,
    };
    use classdesk_common::{config::AppConfig, db::SharedStore, MemoryStore};
    use serde_json::Value;
    use std::sync::Arc;
    use tempfile::TempDir;
    use tower::ServiceExt;

    pub struct TestApp {
        pub router: Router,
        pub uploads: TempDir,
    }

    pub fn test_app() -> TestApp {
        let uploads = tempfile::tempdir().unwrap();

        let mut config = AppConfig::default();
        config.rate_limit.enabled = false;
        config.uploads.dir = uploads.path().to_string_lossy().into_owned();

        let store: SharedStore = Arc::new(MemoryStore::new());

        let state = AppState {
            uploads: Arc::new(UploadStore::new(&config.uploads)),
            config: Arc::new(config),
            store,
            metrics: None,
        };

        TestApp {
            router: create_router(state),
            uploads,
        }
    }

    impl TestApp {
        pub async fn request(&self, request: Request<Body>) -> (StatusCode, Value) {
            let response = self.router.clone().oneshot(request).await.unwrap();
            let status = response.status();
            let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
                .await
                .unwrap();
            let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
            (status, body)
        }

        pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
            self.send(Method::GET, uri, None).await
        }

        pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
            self.send(Method::POST, uri, Some(body)).await
        }

        pub async fn put(&self, uri: &str, body: Value) -> (StatusCode, Value) {
            self.send(Method::PUT, uri, Some(body)).await
        }

        pub async fn delete(&self, uri: &str) -> (StatusCode, Value) {
            self.send(Method::DELETE, uri, None).await
        }

        async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
            let builder = Request::builder().method(method).uri(uri);
            let request = match body {
                Some(json) => builder
                    .header(CONTENT_TYPE, "application/json")
                    .body(Body::from(json.to_string()))
                    .unwrap(),
                None => builder.body(Body::empty()).unwrap(),
            };
            self.request(request).await
        }
    }
}

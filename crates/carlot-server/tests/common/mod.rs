#![allow(dead_code)]

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use carlot_db::DbPool;
use carlot_server::{app, config::DatabaseConfig, init_state};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

/// A router over a freshly bootstrapped database in a temp directory.
pub struct TestApp {
    pub app: Router,
    pub pool: DbPool,
    _dir: TempDir,
}

pub fn database_config(dir: &TempDir) -> DatabaseConfig {
    DatabaseConfig {
        path: dir
            .path()
            .join("carlot-test.db")
            .to_str()
            .expect("temp path should be valid utf-8")
            .to_string(),
        busy_timeout_ms: 1_000,
        pool_max_size: 2,
    }
}

pub fn setup_app() -> TestApp {
    let dir = TempDir::new().expect("failed to create temp dir");
    let state = init_state(&database_config(&dir)).expect("failed to init state");
    let pool = state.pool.clone();

    TestApp {
        app: app(state),
        pool,
        _dir: dir,
    }
}

impl TestApp {
    pub async fn send(&self, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        self.send_request(request).await
    }

    pub async fn send_request(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    pub fn count_cars(&self) -> i64 {
        let conn = self.pool.get().unwrap();
        conn.query_row("SELECT COUNT(*) FROM cars", [], |row| row.get(0))
            .unwrap()
    }
}

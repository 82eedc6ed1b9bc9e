//! Shared test harness: fake object store, scripted synthesis provider,
//! and request helpers.
//!
//! `build_test_app` wires the same router and middleware stack that
//! `main.rs` uses, with the external seams (object store, synthesis
//! provider) replaced by in-memory fakes.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Request, Response, StatusCode};
use axum::routing::get;
use axum::Router;
use bytes::Bytes;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tokio::sync::Notify;
use tower::ServiceExt;

use aplfit_api::config::ServerConfig;
use aplfit_api::router::build_app_router;
use aplfit_api::state::AppState;
use aplfit_storage::{ObjectInfo, ObjectStore, StorageError, StoredObject};
use aplfit_synthesis::{SynthesisError, SynthesisProvider};

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
    }
}

// ---------------------------------------------------------------------------
// Fake object store
// ---------------------------------------------------------------------------

/// In-memory [`ObjectStore`] backed by a `HashMap`.
#[derive(Default)]
pub struct FakeStore {
    objects: Mutex<HashMap<String, (String, Bytes)>>,
}

impl FakeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-load an object, e.g. a catalog image.
    pub fn seed(&self, key: &str, content_type: &str, bytes: Bytes) {
        self.objects
            .lock()
            .unwrap()
            .insert(key.to_string(), (content_type.to_string(), bytes));
    }

    pub fn contains(&self, key: &str) -> bool {
        self.objects.lock().unwrap().contains_key(key)
    }

    /// Keys currently stored under a prefix.
    pub fn keys_with_prefix(&self, prefix: &str) -> Vec<String> {
        let mut keys: Vec<String> = self
            .objects
            .lock()
            .unwrap()
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect();
        keys.sort();
        keys
    }

    fn url_for(key: &str) -> String {
        format!("https://objects.test/{key}")
    }
}

#[async_trait::async_trait]
impl ObjectStore for FakeStore {
    async fn put(
        &self,
        bytes: Bytes,
        key: &str,
        content_type: &str,
    ) -> Result<StoredObject, StorageError> {
        let size = bytes.len();
        self.objects
            .lock()
            .unwrap()
            .insert(key.to_string(), (content_type.to_string(), bytes));
        Ok(StoredObject {
            url: Self::url_for(key),
            key: key.to_string(),
            size,
        })
    }

    async fn get(&self, key: &str) -> Result<Bytes, StorageError> {
        self.objects
            .lock()
            .unwrap()
            .get(key)
            .map(|(_, bytes)| bytes.clone())
            .ok_or_else(|| StorageError::NotFound(key.to_string()))
    }

    async fn presign_get(&self, key: &str, _expiry: Duration) -> Result<String, StorageError> {
        Ok(format!("{}?signed=1", Self::url_for(key)))
    }

    async fn list(&self, prefix: &str) -> Result<Vec<ObjectInfo>, StorageError> {
        let objects = self.objects.lock().unwrap();
        let mut infos: Vec<ObjectInfo> = objects
            .iter()
            .filter(|(k, _)| k.starts_with(prefix))
            .map(|(k, (_, bytes))| ObjectInfo {
                key: k.clone(),
                size: bytes.len() as i64,
            })
            .collect();
        infos.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(infos)
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.objects.lock().unwrap().remove(key);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Scripted synthesis provider
// ---------------------------------------------------------------------------

/// What the scripted provider does when called.
#[derive(Clone)]
pub enum ProviderScript {
    /// Return this output URL as the synthesized image.
    Succeed { output_url: String },
    /// Fail with this message.
    Fail { message: String },
}

/// A [`SynthesisProvider`] that follows a fixed script and records its
/// inputs.
///
/// An optional gate holds the call until the test releases it, so tests can
/// observe the `processing` state deterministically.
pub struct ScriptedProvider {
    script: ProviderScript,
    gate: Option<Arc<Notify>>,
    calls: Mutex<Vec<SynthesisCall>>,
}

/// One recorded provider invocation.
#[derive(Debug, Clone)]
pub struct SynthesisCall {
    pub person_image_url: String,
    pub garment_image_url: String,
    pub prompt: String,
}

impl ScriptedProvider {
    pub fn succeeding(output_url: &str) -> Self {
        Self {
            script: ProviderScript::Succeed {
                output_url: output_url.to_string(),
            },
            gate: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            script: ProviderScript::Fail {
                message: message.to_string(),
            },
            gate: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Hold each call until `gate.notify_one()` is invoked.
    pub fn gated(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn calls(&self) -> Vec<SynthesisCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl SynthesisProvider for ScriptedProvider {
    async fn synthesize(
        &self,
        person_image_url: &str,
        garment_image_url: &str,
        prompt: &str,
    ) -> Result<String, SynthesisError> {
        self.calls.lock().unwrap().push(SynthesisCall {
            person_image_url: person_image_url.to_string(),
            garment_image_url: garment_image_url.to_string(),
            prompt: prompt.to_string(),
        });

        if let Some(gate) = &self.gate {
            gate.notified().await;
        }

        match &self.script {
            ProviderScript::Succeed { output_url } => Ok(output_url.clone()),
            ProviderScript::Fail { message } => Err(SynthesisError::Failed(message.clone())),
        }
    }
}

// ---------------------------------------------------------------------------
// Result-image server
// ---------------------------------------------------------------------------

/// Start a local HTTP server that answers every GET with the given bytes
/// as `image/jpeg`, returning a URL pointing at it.
///
/// The orchestrator downloads the provider's output URL over plain HTTP,
/// so success scenarios need a real (local) endpoint to fetch from.
pub async fn spawn_image_server(bytes: Bytes) -> String {
    let app = Router::new().fallback(get(move || {
        let bytes = bytes.clone();
        async move { ([(header::CONTENT_TYPE, "image/jpeg")], bytes) }
    }));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind image server");
    let addr: SocketAddr = listener.local_addr().expect("image server addr");

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("image server");
    });

    format!("http://{addr}/output.jpg")
}

// ---------------------------------------------------------------------------
// App construction
// ---------------------------------------------------------------------------

/// Build the application router with the given fakes behind the seams.
pub fn build_test_app(
    pool: PgPool,
    store: Arc<FakeStore>,
    provider: Arc<ScriptedProvider>,
) -> Router {
    let config = test_config();
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        store,
        provider,
        http: reqwest::Client::new(),
    };
    build_app_router(state, &config)
}

/// Build the app for tests that never reach the synthesis provider.
pub fn build_default_app(pool: PgPool) -> Router {
    build_test_app(
        pool,
        Arc::new(FakeStore::new()),
        Arc::new(ScriptedProvider::failing("unexpected provider call")),
    )
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn get_req(app: Router, uri: &str) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method("GET")
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
    .unwrap()
}

/// Build and send a multipart POST. Fields are `(name, filename,
/// content_type, bytes)`; plain text fields pass `None` for filename and
/// content type.
pub async fn post_multipart(
    app: Router,
    uri: &str,
    parts: Vec<(&str, Option<(&str, &str)>, Vec<u8>)>,
) -> Response<Body> {
    let boundary = "test-boundary-7MA4YWxkTrZu0gW";
    let mut body: Vec<u8> = Vec::new();

    for (name, file_meta, data) in parts {
        body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
        match file_meta {
            Some((filename, content_type)) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\n\
                         Content-Type: {content_type}\r\n\r\n"
                    )
                    .as_bytes(),
                );
            }
            None => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
                );
            }
        }
        body.extend_from_slice(&data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());

    app.oneshot(
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap(),
    )
    .await
    .unwrap()
}

/// Collect a response body as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ---------------------------------------------------------------------------
// Polling
// ---------------------------------------------------------------------------

/// Poll `GET /api/fitting/result/{id}` until the record reaches a terminal
/// status, with a bounded number of attempts.
pub async fn poll_until_terminal(app: &Router, record_id: i64) -> serde_json::Value {
    for _ in 0..200 {
        let response = get_req(app.clone(), &format!("/api/fitting/result/{record_id}")).await;
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        let status = json["data"]["status"].as_str().unwrap_or_default().to_string();
        if status == "completed" || status == "failed" {
            return json;
        }
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
    panic!("Fitting record {record_id} never reached a terminal status");
}

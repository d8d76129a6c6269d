//! Stub scene backend served by axum on an ephemeral port.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use parking_lot::Mutex;
use serde_json::{json, Value};

#[derive(Clone)]
pub struct Stub {
    pub health: Arc<Mutex<(StatusCode, Value)>>,
    pub generate: Arc<Mutex<(StatusCode, Value)>>,
    /// When unset, refine echoes the instruction back with a fresh image URL.
    pub refine_override: Arc<Mutex<Option<(StatusCode, Value)>>>,
    pub preset_hits: Arc<AtomicUsize>,
    pub generate_bodies: Arc<Mutex<Vec<Value>>>,
    pub refine_bodies: Arc<Mutex<Vec<Value>>>,
    pub request_ids: Arc<Mutex<Vec<String>>>,
}

impl Default for Stub {
    fn default() -> Self {
        Self {
            health: Arc::new(Mutex::new((StatusCode::OK, json!({
                "status": "healthy",
                "checks": {"fal_api": true, "gemini_api": true, "cache_size": 0, "ready": true}
            })))),
            generate: Arc::new(Mutex::new((StatusCode::OK, generation_body("http://x/img.png")))),
            refine_override: Arc::new(Mutex::new(None)),
            preset_hits: Arc::new(AtomicUsize::new(0)),
            generate_bodies: Arc::new(Mutex::new(Vec::new())),
            refine_bodies: Arc::new(Mutex::new(Vec::new())),
            request_ids: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl Stub {
    pub fn set_health(&self, status: StatusCode, body: Value) {
        *self.health.lock() = (status, body);
    }

    pub fn set_generate(&self, status: StatusCode, body: Value) {
        *self.generate.lock() = (status, body);
    }

    pub fn set_refine(&self, status: StatusCode, body: Value) {
        *self.refine_override.lock() = Some((status, body));
    }

    fn record_request_id(&self, headers: &HeaderMap) {
        if let Some(id) = headers.get("x-request-id").and_then(|v| v.to_str().ok()) {
            self.request_ids.lock().push(id.to_string());
        }
    }
}

pub fn generation_body(image_url: &str) -> Value {
    json!({
        "success": true,
        "image_url": image_url,
        "request_id": "req-1",
        "json_prompt": {
            "subject": "sunset on mars",
            "lighting": {"key_light": {"intensity": 0.8, "temperature": "3200K warm"}},
            "style_attributes": {"dynamic_range": "hdr"}
        },
        "metadata": {"seed": 42, "size": "1024x1024", "hdr": true},
        "processing_time_ms": 2100
    })
}

async fn health(State(stub): State<Stub>, headers: HeaderMap) -> Response {
    stub.record_request_id(&headers);
    let (status, body) = stub.health.lock().clone();
    (status, Json(body)).into_response()
}

async fn generate(State(stub): State<Stub>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    stub.record_request_id(&headers);
    stub.generate_bodies.lock().push(body);
    let (status, body) = stub.generate.lock().clone();
    (status, Json(body)).into_response()
}

async fn refine(State(stub): State<Stub>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    stub.record_request_id(&headers);
    let instruction = body["instruction"].as_str().unwrap_or_default().to_string();
    let previous = body["previous_json"].clone();
    let count = {
        let mut bodies = stub.refine_bodies.lock();
        bodies.push(body);
        bodies.len()
    };

    if let Some((status, body)) = stub.refine_override.lock().clone() {
        return (status, Json(body)).into_response();
    }

    Json(json!({
        "success": true,
        "image_url": format!("http://x/refined-{count}.png"),
        "refined_json": {"base": previous, "last_instruction": instruction},
        "instruction_applied": instruction,
        "changes": {"lighting": "reduced intensity by 30%"}
    }))
    .into_response()
}

async fn preset(State(stub): State<Stub>, Path(name): Path<String>) -> Response {
    stub.preset_hits.fetch_add(1, Ordering::SeqCst);
    match name.as_str() {
        "film_noir" => Json(json!({
            "preset": "film_noir",
            "lights": [
                {"type": "key", "intensity": 0.8, "temperature": 3200, "direction_deg": 45, "distance": 1.0, "softness": 0.3},
                {"type": "fill", "intensity": 0.2, "temperature": 3200, "direction_deg": 315, "distance": 1.0, "softness": 0.7}
            ],
            "description": "Cinematic film noir lighting"
        }))
        .into_response(),
        "sci_fi" => Json(json!({
            "lights": [{"intensity": 0.9, "temperature": 8000, "direction_deg": 60}]
        }))
        .into_response(),
        _ => (StatusCode::NOT_FOUND, Json(json!({"detail": format!("Preset '{name}' not found")}))).into_response(),
    }
}

/// Serves `stub` on 127.0.0.1 and returns its base URL.
pub async fn spawn(stub: Stub) -> String {
    let app = Router::new()
        .route("/api/health", get(health))
        .route("/api/generate", post(generate))
        .route("/api/refine", post(refine))
        .route("/api/presets/:name", get(preset))
        .with_state(stub);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

/// Base URL nothing listens on.
pub const DEAD_BACKEND: &str = "http://127.0.0.1:9";

pub fn init_tracing() {
    scene_director::init_tracing();
}

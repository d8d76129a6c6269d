use async_trait::async_trait;
use parking_lot::Mutex;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::cache::TtlCache;
use crate::config::ClientConfig;
use crate::error::{SceneError, SceneResult};
use crate::models::{GenerationRequest, GenerationResult, HealthReport, PresetDocument, RefinementRequest, RefinementResult};

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// The four backend operations the interaction controller depends on.
#[async_trait]
pub trait SceneBackend: Send + Sync {
    /// Never fails: an unreachable or unreadable health endpoint yields `None`.
    async fn check_health(&self) -> Option<HealthReport>;
    async fn generate(&self, request: &GenerationRequest) -> SceneResult<GenerationResult>;
    async fn refine(&self, request: &RefinementRequest) -> SceneResult<RefinementResult>;
    /// `Ok(None)` when the backend does not know the preset.
    async fn get_preset(&self, name: &str) -> SceneResult<Option<PresetDocument>>;
}

// Shortens long string leaves (data URLs, base64 payloads) so documents stay readable in logs
fn truncate_long_strings(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for val in map.values_mut() {
                truncate_long_strings(val);
            }
        }
        Value::Array(arr) => {
            for val in arr.iter_mut() {
                truncate_long_strings(val);
            }
        }
        Value::String(s) if s.chars().count() > 200 => {
            let head: String = s.chars().take(50).collect();
            *s = format!("{}...[truncated {} chars]", head, s.chars().count() - 50);
        }
        _ => {}
    }
}

fn preview_json(value: &Value) -> String {
    let mut copy = value.clone();
    truncate_long_strings(&mut copy);
    serde_json::to_string_pretty(&copy).unwrap_or_default()
}

fn preview(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        format!("{}...[{} chars total]", s.chars().take(max).collect::<String>(), s.chars().count())
    }
}

/// Pulls a human-readable failure message out of a backend body (`detail`, then `error`).
fn failure_message(body: &Value) -> Option<String> {
    ["detail", "error"].iter().find_map(|key| match body.get(*key)? {
        Value::Null => None,
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    })
}

/// Maps a raw response onto the generate/refine contract: non-2xx and
/// `success: false` both become `fail(message)`.
fn parse_outcome<T: DeserializeOwned>(status: StatusCode, body: &str, action: &str, fail: fn(String) -> SceneError) -> SceneResult<T> {
    let parsed: Option<Value> = serde_json::from_str(body).ok();

    if !status.is_success() {
        let message = parsed.as_ref().and_then(failure_message)
            .unwrap_or_else(|| format!("{} failed (HTTP {})", action, status.as_u16()));
        return Err(fail(message));
    }

    let value = parsed.ok_or_else(|| fail(format!("{} returned an unreadable response", action)))?;
    if value.get("success").and_then(Value::as_bool) != Some(true) {
        let message = failure_message(&value).unwrap_or_else(|| format!("{} failed", action));
        return Err(fail(message));
    }

    serde_json::from_value(value).map_err(|e| fail(format!("{} returned an unexpected response: {}", action, e)))
}

pub struct ApiClient {
    client: Client,
    base_url: String,
    presets: Mutex<TtlCache<PresetDocument>>,
}

impl ApiClient {
    pub fn new(config: &ClientConfig) -> SceneResult<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            presets: Mutex::new(TtlCache::new(config.preset_cache_ttl)),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn clear_preset_cache(&self) {
        self.presets.lock().clear();
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Sends the request tagged with a fresh request id and returns status plus raw body.
    async fn execute(&self, request: RequestBuilder, path: &str) -> SceneResult<(StatusCode, String)> {
        let request_id = Uuid::new_v4().to_string();
        info!(%request_id, "🔗 Calling {}{}", self.base_url, path);

        let response = request
            .header(REQUEST_ID_HEADER, &request_id)
            .send()
            .await
            .map_err(|e| {
                warn!(%request_id, "⚠️ Transport error calling {}: {}", path, e);
                SceneError::from(e)
            })?;

        let status = response.status();
        info!(%request_id, "📥 Response status: {}", status);

        let body = response.text().await?;
        Ok((status, body))
    }

    pub async fn check_health(&self) -> Option<HealthReport> {
        let (status, body) = match self.execute(self.client.get(self.url("/api/health")), "/api/health").await {
            Ok(res) => res,
            Err(e) => {
                warn!("⚠️ Health check failed, continuing without it: {}", e);
                return None;
            }
        };

        if !status.is_success() {
            warn!("⚠️ Health check returned {}: {}", status, preview(&body, 200));
            return None;
        }

        match serde_json::from_str::<HealthReport>(&body) {
            Ok(report) => {
                info!("🩺 Backend ready: {} ({:?})", report.is_ready(), report.dependency_flags());
                Some(report)
            }
            Err(e) => {
                warn!("⚠️ Unreadable health report: {}", e);
                None
            }
        }
    }

    pub async fn generate(&self, request: &GenerationRequest) -> SceneResult<GenerationResult> {
        info!("🎬 Generating scene: '{}' (seed {}, hdr {})", preview(&request.prompt, 80), request.seed, request.hdr_enabled);

        let result: GenerationResult = self
            .execute(self.client.post(self.url("/api/generate")).json(request), "/api/generate")
            .await
            .and_then(|(status, body)| parse_outcome(status, &body, "Generation", SceneError::Generation))
            .inspect_err(|e| error!("❌ Generation failed: {}", e))?;

        info!("✅ Scene generated: {} (request {}, {} ms)", preview(&result.image_url, 80), result.request_id, result.processing_time_ms);
        debug!("📦 json_prompt: {}", preview_json(&result.json_prompt));
        Ok(result)
    }

    pub async fn refine(&self, request: &RefinementRequest) -> SceneResult<RefinementResult> {
        info!("🎯 Refining scene with instruction: '{}'", preview(&request.instruction, 80));

        let result: RefinementResult = self
            .execute(self.client.post(self.url("/api/refine")).json(request), "/api/refine")
            .await
            .and_then(|(status, body)| parse_outcome(status, &body, "Refinement", SceneError::Refinement))
            .inspect_err(|e| error!("❌ Refinement failed: {}", e))?;

        info!("✅ Scene refined: {} [{}]", preview(&result.image_url, 80), result.change_summary().join("; "));
        debug!("📦 refined_json: {}", preview_json(&result.refined_json));
        Ok(result)
    }

    pub async fn get_preset(&self, name: &str) -> SceneResult<Option<PresetDocument>> {
        let name = name.trim().to_lowercase();
        let cached = self.presets.lock().get(&name);
        if let Some(doc) = cached {
            debug!("Serving preset '{}' from cache", name);
            return Ok(Some(doc));
        }

        let path = format!("/api/presets/{}", name);
        let (status, body) = self.execute(self.client.get(self.url(&path)), &path).await?;

        if !status.is_success() {
            warn!("⚠️ Preset '{}' unavailable ({})", name, status);
            return Ok(None);
        }

        match serde_json::from_str::<PresetDocument>(&body) {
            Ok(doc) => {
                info!("💡 Loaded preset '{}' with {} lights", name, doc.lights.len());
                self.presets.lock().insert(&name, doc.clone());
                Ok(Some(doc))
            }
            Err(e) => {
                warn!("⚠️ Unreadable preset '{}': {}", name, e);
                Ok(None)
            }
        }
    }
}

#[async_trait]
impl SceneBackend for ApiClient {
    async fn check_health(&self) -> Option<HealthReport> {
        ApiClient::check_health(self).await
    }

    async fn generate(&self, request: &GenerationRequest) -> SceneResult<GenerationResult> {
        ApiClient::generate(self, request).await
    }

    async fn refine(&self, request: &RefinementRequest) -> SceneResult<RefinementResult> {
        ApiClient::refine(self, request).await
    }

    async fn get_preset(&self, name: &str) -> SceneResult<Option<PresetDocument>> {
        ApiClient::get_preset(self, name).await
    }
}

use std::collections::BTreeMap;

use serde::{Serialize, Deserialize};
use serde_json::Value;

/// Preset names served by the backend's `/api/presets/{name}` route.
pub const PRESET_NAMES: [&str; 5] = ["film_noir", "golden_hour", "studio_portrait", "horror", "sci_fi"];

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LightType {
    #[default]
    Key,
    Fill,
    Back,
    Rim,
    Practical,
}

impl LightType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LightType::Key => "key",
            LightType::Fill => "fill",
            LightType::Back => "back",
            LightType::Rim => "rim",
            LightType::Practical => "practical",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Light {
    #[serde(rename = "type", default)]
    pub kind: LightType,
    pub intensity: f64,
    pub temperature: u32,
    pub direction_deg: u32,
    #[serde(default = "default_distance")]
    pub distance: f64,
    #[serde(default = "default_softness")]
    pub softness: f64,
}

fn default_distance() -> f64 { 1.0 }
fn default_softness() -> f64 { 0.5 }

impl Light {
    /// Short human-readable summary, e.g. `key light at 45 degrees, 80% intensity, warm (3200K)`.
    pub fn describe(&self) -> String {
        format!(
            "{} light at {} degrees, {:.0}% intensity, {} ({}K)",
            self.kind.as_str(),
            self.direction_deg,
            self.intensity * 100.0,
            TemperatureCategory::from_kelvin(self.temperature).label(),
            self.temperature
        )
    }
}

/// Coarse colour-temperature bucket shown next to the temperature control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemperatureCategory { Warm, Neutral, Cool }

impl TemperatureCategory {
    pub fn from_kelvin(kelvin: u32) -> Self {
        if kelvin < 4000 {
            TemperatureCategory::Warm
        } else if kelvin > 6000 {
            TemperatureCategory::Cool
        } else {
            TemperatureCategory::Neutral
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TemperatureCategory::Warm => "warm",
            TemperatureCategory::Neutral => "neutral",
            TemperatureCategory::Cool => "cool",
        }
    }
}

/// Intensity-weighted colour temperature of a lighting setup, e.g. `3100K warm orange`.
pub fn describe_mixed_temperature(lights: &[Light]) -> String {
    let total: f64 = lights.iter().map(|l| l.intensity).sum();
    if lights.is_empty() || total <= 0.0 {
        return "5600K neutral".to_string();
    }
    let avg = lights.iter().map(|l| l.temperature as f64 * l.intensity).sum::<f64>() / total;
    let desc = if avg < 3500.0 { "warm orange" }
        else if avg < 4500.0 { "warm white" }
        else if avg < 5500.0 { "neutral white" }
        else if avg < 6500.0 { "cool white" }
        else { "cool blue" };
    format!("{}K {}", avg as u32, desc)
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Camera {
    pub lens: String,
    pub f_stop: f64,
    pub focal_distance: f64,
    pub angle: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub lighting_setup: Vec<Light>,
    pub camera: Camera,
    pub hdr_enabled: bool,
    pub style: String,
    pub seed: u32,
    pub output_size: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GenerationResult {
    pub success: bool,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub json_prompt: Value,
    #[serde(default)]
    pub request_id: String,
    #[serde(default)]
    pub metadata: Option<Value>,
    #[serde(default)]
    pub processing_time_ms: u64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RefinementRequest {
    pub previous_json: Value,
    pub instruction: String,
    pub hdr: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RefinementResult {
    pub success: bool,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub refined_json: Value,
    #[serde(default)]
    pub instruction_applied: String,
    #[serde(default)]
    pub changes: BTreeMap<String, Value>,
}

impl RefinementResult {
    /// `field: description` pairs, one per changed field.
    pub fn change_summary(&self) -> Vec<String> {
        self.changes.iter().map(|(field, change)| match change {
            Value::String(s) => format!("{field}: {s}"),
            other => format!("{field}: {other}"),
        }).collect()
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct HealthChecks {
    #[serde(default)]
    pub ready: bool,
    #[serde(flatten)]
    pub dependencies: BTreeMap<String, Value>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct HealthReport {
    #[serde(default)]
    pub status: Option<String>,
    pub checks: HealthChecks,
}

impl HealthReport {
    pub fn is_ready(&self) -> bool { self.checks.ready }

    /// Boolean readiness flags per dependency; counters and other values are skipped.
    pub fn dependency_flags(&self) -> Vec<(&str, bool)> {
        self.checks.dependencies.iter()
            .filter_map(|(name, v)| v.as_bool().map(|b| (name.as_str(), b)))
            .collect()
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PresetDocument {
    #[serde(default)]
    pub preset: Option<String>,
    #[serde(default)]
    pub lights: Vec<Light>,
    #[serde(default)]
    pub description: Option<String>,
}

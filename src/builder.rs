use rand::Rng;

use crate::models::{Camera, GenerationRequest, Light, LightType};
use crate::ui::ControlValues;

/// Seeds are drawn uniformly from `0..SEED_RANGE`.
pub const SEED_RANGE: u32 = 10_000;

pub const DEFAULT_DISTANCE: f64 = 1.0;
pub const DEFAULT_SOFTNESS: f64 = 0.5;
pub const DEFAULT_FOCAL_DISTANCE: f64 = 5.0;
pub const DEFAULT_CAMERA_ANGLE: &str = "eye-level";
pub const DEFAULT_STYLE: &str = "cinematic";
pub const DEFAULT_OUTPUT_SIZE: &str = "1024x1024";

/// Builds a generation request from the controls with a fresh random seed.
pub fn build_generation_request(controls: &ControlValues) -> GenerationRequest {
    let seed = rand::thread_rng().gen_range(0..SEED_RANGE);
    build_generation_request_with_seed(controls, seed)
}

pub fn build_generation_request_with_seed(controls: &ControlValues, seed: u32) -> GenerationRequest {
    let key = Light {
        kind: LightType::Key,
        intensity: f64::from(controls.intensity_pct.min(100)) / 100.0,
        temperature: controls.temperature_k,
        direction_deg: u32::from(controls.light_angle_deg % 360),
        distance: DEFAULT_DISTANCE,
        softness: DEFAULT_SOFTNESS,
    };

    GenerationRequest {
        prompt: controls.prompt.trim().to_string(),
        lighting_setup: vec![key],
        camera: Camera {
            lens: controls.lens.clone(),
            f_stop: controls.f_stop,
            focal_distance: DEFAULT_FOCAL_DISTANCE,
            angle: DEFAULT_CAMERA_ANGLE.to_string(),
        },
        hdr_enabled: controls.hdr_enabled,
        style: DEFAULT_STYLE.to_string(),
        seed,
        output_size: DEFAULT_OUTPUT_SIZE.to_string(),
    }
}

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info, warn};

use crate::builder::build_generation_request;
use crate::client::SceneBackend;
use crate::error::SceneError;
use crate::history::HistoryEntry;
use crate::models::{describe_mixed_temperature, RefinementRequest, PRESET_NAMES};
use crate::ui::{ControlValues, FlowKind, FlowState, Notification, UiState};

pub const API_KEY_GUIDANCE: &str = "API key missing: set FAL_KEY and GEMINI_API_KEY for the backend and restart it.";
pub const API_BANNER_MESSAGE: &str = "API keys needed: the backend is up but not configured to generate images.";

/// User intents, decoupled from whatever input surface produced them.
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    CheckHealth,
    Generate,
    Refine(String),
    ApplyPreset(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Succeeded,
    Failed(SceneError),
    /// A newer request of the same flow was issued while this one was in flight; its result was dropped.
    Superseded,
}

/// User-visible notification for a failed flow.
pub fn error_notification(err: &SceneError) -> Notification {
    if err.is_credential_failure() {
        Notification::error(API_KEY_GUIDANCE)
    } else {
        Notification::error(err.to_string())
    }
}

fn settle(ui: &mut UiState, kind: FlowKind, outcome: Outcome) -> Outcome {
    let terminal = match &outcome {
        Outcome::Succeeded => FlowState::Succeeded,
        Outcome::Failed(_) => FlowState::Failed,
        Outcome::Superseded => return outcome,
    };
    debug!(?kind, ?terminal, "Flow settled");
    ui.flow_mut(kind).settle(terminal);
    outcome
}

/// Drives generate/refine/preset/health flows against a shared `UiState`.
///
/// The state lock is only taken between awaits, so several flows can be in
/// flight at once. Within one flow only the most recently issued request may
/// write its result.
#[derive(Clone)]
pub struct InteractionController {
    backend: Arc<dyn SceneBackend>,
    ui: Arc<RwLock<UiState>>,
}

impl InteractionController {
    pub fn new(backend: Arc<dyn SceneBackend>) -> Self {
        Self::with_state(backend, UiState::default())
    }

    pub fn with_state(backend: Arc<dyn SceneBackend>, state: UiState) -> Self {
        Self { backend, ui: Arc::new(RwLock::new(state)) }
    }

    pub fn state(&self) -> Arc<RwLock<UiState>> {
        self.ui.clone()
    }

    pub fn snapshot(&self) -> UiState {
        self.ui.read().clone()
    }

    /// Applies a control edit and resynchronizes derived display text.
    pub fn update_controls(&self, edit: impl FnOnce(&mut ControlValues)) {
        let mut ui = self.ui.write();
        edit(&mut ui.controls);
        ui.sync_derived();
    }

    pub fn set_instruction(&self, text: impl Into<String>) {
        self.ui.write().instruction = text.into();
    }

    pub fn drain_notifications(&self) -> Vec<Notification> {
        self.ui.write().drain_notifications()
    }

    pub async fn dispatch(&self, intent: Intent) -> Outcome {
        debug!(?intent, "Dispatching intent");
        match intent {
            Intent::CheckHealth => self.check_health().await,
            Intent::Generate => self.generate().await,
            Intent::Refine(instruction) => self.refine(instruction).await,
            Intent::ApplyPreset(name) => self.apply_preset(name).await,
        }
    }

    async fn check_health(&self) -> Outcome {
        let ticket = self.ui.write().health.begin();
        let report = self.backend.check_health().await;

        let mut ui = self.ui.write();
        if !ui.health.is_current(ticket) {
            return Outcome::Superseded;
        }

        match report {
            None => {
                warn!("⚠️ Backend health unknown, UI continues without it");
                settle(&mut ui, FlowKind::Health, Outcome::Failed(SceneError::Connectivity("health check unavailable".into())))
            }
            Some(report) if !report.is_ready() => {
                if !ui.api_banner {
                    warn!("🔑 Backend reports not ready: {:?}", report.dependency_flags());
                    ui.api_banner = true;
                    ui.notify(Notification::warning(API_BANNER_MESSAGE));
                }
                settle(&mut ui, FlowKind::Health, Outcome::Succeeded)
            }
            Some(_) => {
                info!("🩺 Backend ready");
                settle(&mut ui, FlowKind::Health, Outcome::Succeeded)
            }
        }
    }

    async fn generate(&self) -> Outcome {
        let (ticket, request) = {
            let mut ui = self.ui.write();
            if ui.controls.prompt.trim().is_empty() {
                let err = SceneError::precondition("Describe the scene before generating.");
                ui.notify(error_notification(&err));
                return settle(&mut ui, FlowKind::Generate, Outcome::Failed(err));
            }
            let request = build_generation_request(&ui.controls);
            let ticket = ui.generate.begin();
            ui.loading = true;
            ui.image_url = None;
            (ticket, request)
        };

        // Network call happens outside the lock
        let result = self.backend.generate(&request).await;

        let mut ui = self.ui.write();
        if !ui.generate.is_current(ticket) {
            info!("Dropping stale generate response (ticket {})", ticket);
            return Outcome::Superseded;
        }
        ui.loading = false;

        match result {
            Ok(res) => {
                ui.image_url = Some(res.image_url);
                ui.json_output = Some(res.json_prompt);
                ui.notify(Notification::success(format!("Scene generated in {:.1}s", res.processing_time_ms as f64 / 1000.0)));
                settle(&mut ui, FlowKind::Generate, Outcome::Succeeded)
            }
            Err(err) => {
                ui.notify(error_notification(&err));
                settle(&mut ui, FlowKind::Generate, Outcome::Failed(err))
            }
        }
    }

    async fn refine(&self, instruction: String) -> Outcome {
        let instruction = instruction.trim().to_string();

        let (ticket, request) = {
            let mut ui = self.ui.write();
            ui.instruction = instruction.clone();

            if !ui.has_scene_json() {
                let err = SceneError::precondition("Generate a scene first, then refine it.");
                ui.status = Some(err.to_string());
                return settle(&mut ui, FlowKind::Refine, Outcome::Failed(err));
            }
            if instruction.is_empty() {
                let err = SceneError::precondition("Describe how the scene should change.");
                ui.status = Some(err.to_string());
                return settle(&mut ui, FlowKind::Refine, Outcome::Failed(err));
            }

            let request = RefinementRequest {
                previous_json: ui.json_output.clone().unwrap_or_default(),
                instruction: instruction.clone(),
                hdr: ui.controls.hdr_enabled,
                seed: None,
            };
            let ticket = ui.refine.begin();
            // Old image stays on screen until the refined one replaces it
            ui.status = Some(format!("Refining: {}...", instruction));
            (ticket, request)
        };

        let result = self.backend.refine(&request).await;

        let mut ui = self.ui.write();
        if !ui.refine.is_current(ticket) {
            info!("Dropping stale refine response (ticket {})", ticket);
            return Outcome::Superseded;
        }
        ui.status = None;

        match result {
            Ok(res) => {
                let applied = if res.instruction_applied.is_empty() { instruction.clone() } else { res.instruction_applied.clone() };
                let changes = res.change_summary();
                ui.image_url = Some(res.image_url.clone());
                ui.json_output = Some(res.refined_json);
                if let Some(evicted) = ui.history.push(HistoryEntry::new(instruction, res.image_url)) {
                    debug!("History full, evicted '{}'", evicted.instruction);
                }
                ui.instruction.clear();
                ui.notify(Notification::success(format!("Refined: {}", applied)));
                if !changes.is_empty() {
                    ui.notify(Notification::info(changes.join("; ")));
                }
                settle(&mut ui, FlowKind::Refine, Outcome::Succeeded)
            }
            Err(err) => {
                ui.notify(error_notification(&err));
                settle(&mut ui, FlowKind::Refine, Outcome::Failed(err))
            }
        }
    }

    async fn apply_preset(&self, name: String) -> Outcome {
        let key = name.trim().to_lowercase();
        if !PRESET_NAMES.contains(&key.as_str()) {
            let mut ui = self.ui.write();
            let err = SceneError::PresetNotFound(name);
            ui.notify(error_notification(&err));
            return settle(&mut ui, FlowKind::Preset, Outcome::Failed(err));
        }

        let ticket = self.ui.write().preset.begin();
        let fetched = self.backend.get_preset(&key).await;

        let mut ui = self.ui.write();
        if !ui.preset.is_current(ticket) {
            return Outcome::Superseded;
        }

        let lights = match fetched {
            Ok(doc) => doc.map(|d| d.lights).unwrap_or_default(),
            Err(err) => {
                warn!("⚠️ Could not load preset '{}': {}", name, err);
                ui.notify(error_notification(&err));
                return settle(&mut ui, FlowKind::Preset, Outcome::Failed(err));
            }
        };

        let Some(light) = lights.first() else {
            let err = SceneError::PresetNotFound(name);
            ui.notify(error_notification(&err));
            return settle(&mut ui, FlowKind::Preset, Outcome::Failed(err));
        };

        ui.controls.intensity_pct = (light.intensity * 100.0).round().clamp(0.0, 100.0) as u8;
        ui.controls.temperature_k = light.temperature;
        ui.controls.light_angle_deg = (light.direction_deg % 360) as u16;
        ui.sync_derived();

        let mix = describe_mixed_temperature(&lights);
        info!("💡 Applied preset '{}': {} (mix {})", key, light.describe(), mix);
        ui.notify(Notification::success(format!(
            "Applied {} preset: {}; overall {}",
            key.replace('_', " "),
            light.describe(),
            mix
        )));
        settle(&mut ui, FlowKind::Preset, Outcome::Succeeded)
    }
}

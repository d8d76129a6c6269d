//! Explicit view state the controller reads from and projects results into.
//!
//! Nothing here renders; a host (terminal, webview, test) reads `UiState`
//! and drains `notifications` after each dispatch.

use serde_json::Value;

use crate::history::RefinementHistory;
use crate::models::TemperatureCategory;

/// Values of the parameter controls as the user left them.
#[derive(Debug, Clone, PartialEq)]
pub struct ControlValues {
    pub prompt: String,
    /// Key light intensity in percent, 0–100.
    pub intensity_pct: u8,
    pub temperature_k: u32,
    /// Key light direction in degrees, 0–359.
    pub light_angle_deg: u16,
    pub lens: String,
    pub f_stop: f64,
    pub hdr_enabled: bool,
}

impl Default for ControlValues {
    fn default() -> Self {
        Self {
            prompt: String::new(),
            intensity_pct: 100,
            temperature_k: 5600,
            light_angle_deg: 45,
            lens: "50mm".to_string(),
            f_stop: 2.8,
            hdr_enabled: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind { Success, Error, Warning, Info }

#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self { Self { kind: NotificationKind::Success, message: message.into() } }
    pub fn error(message: impl Into<String>) -> Self { Self { kind: NotificationKind::Error, message: message.into() } }
    pub fn warning(message: impl Into<String>) -> Self { Self { kind: NotificationKind::Warning, message: message.into() } }
    pub fn info(message: impl Into<String>) -> Self { Self { kind: NotificationKind::Info, message: message.into() } }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowKind { Generate, Refine, Preset, Health }

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlowState {
    #[default]
    Idle,
    Pending,
    Succeeded,
    Failed,
}

/// Current state of one flow, how its last run ended, and the ticket of its latest request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlowTracker {
    pub state: FlowState,
    /// `Succeeded` or `Failed` once a run has settled.
    pub last_outcome: Option<FlowState>,
    latest_ticket: u64,
}

impl FlowTracker {
    /// Enters `Pending` and issues a ticket newer than every earlier one.
    pub(crate) fn begin(&mut self) -> u64 {
        self.latest_ticket += 1;
        self.state = FlowState::Pending;
        self.latest_ticket
    }

    pub(crate) fn is_current(&self, ticket: u64) -> bool {
        ticket == self.latest_ticket
    }

    /// Records the terminal state and returns the flow to `Idle`.
    pub(crate) fn settle(&mut self, terminal: FlowState) {
        self.last_outcome = Some(terminal);
        self.state = FlowState::Idle;
    }
}

#[derive(Debug, Clone)]
pub struct UiState {
    pub controls: ControlValues,
    /// Refinement instruction input.
    pub instruction: String,
    pub image_url: Option<String>,
    /// Structured document of the displayed scene; `None` is the placeholder.
    pub json_output: Option<Value>,
    pub loading: bool,
    /// Inline status line of the refine panel.
    pub status: Option<String>,
    pub temperature_label: String,
    /// "API keys needed" banner, raised at most once per session.
    pub api_banner: bool,
    pub history: RefinementHistory,
    pub notifications: Vec<Notification>,
    pub generate: FlowTracker,
    pub refine: FlowTracker,
    pub preset: FlowTracker,
    pub health: FlowTracker,
}

impl Default for UiState {
    fn default() -> Self {
        Self::new(ControlValues::default())
    }
}

impl UiState {
    pub fn new(controls: ControlValues) -> Self {
        let temperature_label = temperature_label(controls.temperature_k);
        Self {
            controls,
            instruction: String::new(),
            image_url: None,
            json_output: None,
            loading: false,
            status: None,
            temperature_label,
            api_banner: false,
            history: RefinementHistory::new(),
            notifications: Vec::new(),
            generate: FlowTracker::default(),
            refine: FlowTracker::default(),
            preset: FlowTracker::default(),
            health: FlowTracker::default(),
        }
    }

    pub(crate) fn flow_mut(&mut self, kind: FlowKind) -> &mut FlowTracker {
        match kind {
            FlowKind::Generate => &mut self.generate,
            FlowKind::Refine => &mut self.refine,
            FlowKind::Preset => &mut self.preset,
            FlowKind::Health => &mut self.health,
        }
    }

    /// True once a generation has put a real scene document on screen.
    pub fn has_scene_json(&self) -> bool {
        match &self.json_output {
            None | Some(Value::Null) => false,
            Some(Value::Object(map)) => !map.is_empty(),
            Some(Value::String(s)) => !s.trim().is_empty(),
            Some(_) => true,
        }
    }

    /// Recomputes display text derived from the controls.
    pub fn sync_derived(&mut self) {
        self.temperature_label = temperature_label(self.controls.temperature_k);
    }

    pub fn notify(&mut self, notification: Notification) {
        self.notifications.push(notification);
    }

    pub fn drain_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }
}

/// Label shown next to the temperature control, e.g. `3200K (warm)`.
pub fn temperature_label(kelvin: u32) -> String {
    format!("{}K ({})", kelvin, TemperatureCategory::from_kelvin(kelvin).label())
}

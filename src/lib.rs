//! Client side of the Scene Director: builds cinematic lighting requests
//! from UI controls, drives generate/refine flows against the backend, and
//! keeps the session's view state and refinement history.

pub mod builder;
pub mod cache;
pub mod client;
pub mod config;
pub mod controller;
pub mod error;
pub mod history;
pub mod models;
pub mod ui;

use tracing_subscriber::{fmt, EnvFilter};

pub use client::{ApiClient, SceneBackend};
pub use config::ClientConfig;
pub use controller::{InteractionController, Intent, Outcome};
pub use error::{SceneError, SceneResult};
pub use ui::{ControlValues, Notification, NotificationKind, UiState};

/// Installs a `fmt` subscriber honouring `RUST_LOG`, defaulting to `info`.
/// Safe to call more than once; later calls are ignored.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).try_init();
}

/// Builds a controller talking HTTP to the backend described by `config`.
pub fn connect(config: &ClientConfig) -> SceneResult<InteractionController> {
    let client = ApiClient::new(config)?;
    tracing::info!(base_url = client.base_url(), "Starting scene director session");
    Ok(InteractionController::new(std::sync::Arc::new(client)))
}

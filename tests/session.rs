//! Full generate → refine sessions through `InteractionController` over HTTP.

mod common;

use std::sync::atomic::Ordering;

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use scene_director::controller::API_KEY_GUIDANCE;
use scene_director::history::HISTORY_LIMIT;
use scene_director::ui::FlowState;
use scene_director::{ClientConfig, Intent, InteractionController, Notification, NotificationKind, Outcome, SceneError};
use serde_json::json;

use common::{spawn, Stub, DEAD_BACKEND};

async fn session(stub: &Stub) -> InteractionController {
    common::init_tracing();
    let base_url = spawn(stub.clone()).await;
    let ctrl = scene_director::connect(&ClientConfig::new(base_url)).unwrap();
    ctrl.update_controls(|c| {
        c.prompt = "sunset on mars".into();
        c.hdr_enabled = true;
    });
    ctrl
}

#[tokio::test]
async fn generate_renders_image_and_json() {
    let stub = Stub::default();
    let ctrl = session(&stub).await;

    let outcome = ctrl.dispatch(Intent::Generate).await;

    assert_eq!(outcome, Outcome::Succeeded);
    let ui = ctrl.snapshot();
    assert_eq!(ui.image_url.as_deref(), Some("http://x/img.png"));
    assert_eq!(ui.json_output.as_ref().unwrap()["subject"], "sunset on mars");
    assert_eq!(ui.generate.last_outcome, Some(FlowState::Succeeded));
    assert!(!ui.loading);
    assert_eq!(ui.notifications.iter().map(|n| n.kind).collect::<Vec<_>>(), vec![NotificationKind::Success]);

    let sent = stub.generate_bodies.lock()[0].clone();
    assert_eq!(sent["prompt"], "sunset on mars");
    assert_eq!(sent["hdr_enabled"], true);
    assert!(sent["seed"].as_u64().unwrap() < 10_000);
}

#[tokio::test]
async fn missing_key_failure_gives_guidance_and_allows_retry() {
    let stub = Stub::default();
    stub.set_generate(StatusCode::INTERNAL_SERVER_ERROR, json!({"detail": "FAL_API_KEY missing"}));
    let ctrl = session(&stub).await;

    let outcome = ctrl.dispatch(Intent::Generate).await;

    assert_eq!(outcome, Outcome::Failed(SceneError::Generation("FAL_API_KEY missing".into())));
    let ui = ctrl.snapshot();
    assert!(!ui.loading);
    assert_eq!(ui.generate.state, FlowState::Idle);
    assert_eq!(ctrl.drain_notifications(), vec![Notification::error(API_KEY_GUIDANCE)]);

    stub.set_generate(StatusCode::OK, common::generation_body("http://x/retry.png"));
    assert_eq!(ctrl.dispatch(Intent::Generate).await, Outcome::Succeeded);
    assert_eq!(ctrl.snapshot().image_url.as_deref(), Some("http://x/retry.png"));
}

#[tokio::test]
async fn refine_records_history_and_clears_instruction() {
    let stub = Stub::default();
    let ctrl = session(&stub).await;
    ctrl.dispatch(Intent::Generate).await;
    ctrl.set_instruction("make it darker");

    let outcome = ctrl.dispatch(Intent::Refine("make it darker".into())).await;

    assert_eq!(outcome, Outcome::Succeeded);
    let ui = ctrl.snapshot();
    assert_eq!(ui.history.len(), 1);
    let entry = ui.history.latest().unwrap();
    assert_eq!(entry.instruction, "make it darker");
    assert_eq!(entry.image_url, "http://x/refined-1.png");
    assert_eq!(ui.instruction, "");
    assert_eq!(ui.image_url.as_deref(), Some("http://x/refined-1.png"));

    let sent = stub.refine_bodies.lock()[0].clone();
    assert_eq!(sent["previous_json"]["subject"], "sunset on mars");
    assert_eq!(sent["instruction"], "make it darker");
}

#[tokio::test]
async fn refine_chains_on_the_latest_document() {
    let stub = Stub::default();
    let ctrl = session(&stub).await;
    ctrl.dispatch(Intent::Generate).await;

    ctrl.dispatch(Intent::Refine("make it darker".into())).await;
    ctrl.dispatch(Intent::Refine("add rain".into())).await;

    let second = stub.refine_bodies.lock()[1].clone();
    assert_eq!(second["previous_json"]["last_instruction"], "make it darker");
}

#[tokio::test]
async fn history_keeps_only_the_latest_five_refinements() {
    let stub = Stub::default();
    let ctrl = session(&stub).await;
    ctrl.dispatch(Intent::Generate).await;

    let steps = ["darker", "warmer", "add fog", "night time", "wide angle", "add rain"];
    for step in steps {
        assert_eq!(ctrl.dispatch(Intent::Refine(step.to_string())).await, Outcome::Succeeded);
    }

    let ui = ctrl.snapshot();
    assert_eq!(ui.history.len(), HISTORY_LIMIT);
    assert_eq!(ui.history.instructions(), steps[1..].to_vec());
    assert_eq!(ui.history.latest().unwrap().image_url, "http://x/refined-6.png");
}

#[tokio::test]
async fn refine_without_scene_never_reaches_backend() {
    let stub = Stub::default();
    let ctrl = session(&stub).await;

    let outcome = ctrl.dispatch(Intent::Refine("make it darker".into())).await;

    assert!(matches!(outcome, Outcome::Failed(SceneError::Precondition(_))));
    assert!(stub.refine_bodies.lock().is_empty());
    assert!(ctrl.snapshot().status.is_some());
}

#[tokio::test]
async fn preset_updates_controls_and_label() {
    let stub = Stub::default();
    let ctrl = session(&stub).await;

    assert_eq!(ctrl.dispatch(Intent::ApplyPreset("film_noir".into())).await, Outcome::Succeeded);

    let ui = ctrl.snapshot();
    assert_eq!((ui.controls.intensity_pct, ui.controls.temperature_k, ui.controls.light_angle_deg), (80, 3200, 45));
    assert_eq!(ui.temperature_label, "3200K (warm)");
    assert_eq!(
        ui.notifications,
        vec![Notification::success(
            "Applied film noir preset: key light at 45 degrees, 80% intensity, warm (3200K); overall 3200K warm orange"
        )]
    );
}

#[tokio::test]
async fn unknown_preset_leaves_controls_alone() {
    let stub = Stub::default();
    let ctrl = session(&stub).await;
    let before = ctrl.snapshot().controls;

    let outcome = ctrl.dispatch(Intent::ApplyPreset("disco".into())).await;

    assert_eq!(outcome, Outcome::Failed(SceneError::PresetNotFound("disco".into())));
    assert_eq!(ctrl.snapshot().controls, before);
    assert_eq!(stub.preset_hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn not_ready_backend_raises_banner() {
    let stub = Stub::default();
    stub.set_health(StatusCode::OK, json!({"status": "degraded", "checks": {"fal_api": false, "gemini_api": true, "ready": false}}));
    let ctrl = session(&stub).await;

    assert_eq!(ctrl.dispatch(Intent::CheckHealth).await, Outcome::Succeeded);

    let ui = ctrl.snapshot();
    assert!(ui.api_banner);
    assert_eq!(ui.notifications[0].kind, NotificationKind::Warning);
}

#[tokio::test]
async fn unreachable_backend_does_not_block_the_session() {
    common::init_tracing();
    let ctrl = scene_director::connect(&ClientConfig::new(DEAD_BACKEND)).unwrap();
    ctrl.update_controls(|c| c.prompt = "sunset on mars".into());

    let health = ctrl.dispatch(Intent::CheckHealth).await;
    assert!(matches!(health, Outcome::Failed(SceneError::Connectivity(_))));
    assert!(!ctrl.snapshot().api_banner);

    let generate = ctrl.dispatch(Intent::Generate).await;
    assert!(matches!(generate, Outcome::Failed(SceneError::Connectivity(_))));
    let ui = ctrl.snapshot();
    assert!(!ui.loading);
    assert_eq!(ui.generate.state, FlowState::Idle);
    assert_eq!(ui.notifications.len(), 1);
    assert_eq!(ui.notifications[0].kind, NotificationKind::Error);
}

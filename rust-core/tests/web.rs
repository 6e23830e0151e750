//! 浏览器环境下的绑定层测试：`wasm-pack test --headless --chrome`。

#![cfg(target_arch = "wasm32")]

use lightcycle_core::{GameEvent, MatchEngine, MatchPhase, MatchSnapshot};
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::JsFuture;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

fn engine() -> MatchEngine {
    MatchEngine::new(Some(r#"{"seed":7}"#.to_string())).expect("config should parse")
}

fn snapshot(engine: &MatchEngine) -> MatchSnapshot {
    let json = engine.snapshot_json().expect("snapshot should serialize");
    serde_json::from_str(&json).expect("snapshot should deserialize")
}

#[wasm_bindgen_test]
fn engine_runs_through_countdown_into_play() {
    let mut engine = engine();
    assert_eq!(engine.phase(), "menu");

    engine.start(0.0).expect("menu can start");
    let events: Vec<GameEvent> =
        serde_wasm_bindgen::from_value(engine.update(3500.0).expect("update")).expect("events");
    assert!(events.contains(&GameEvent::CountdownGo));
    assert_eq!(snapshot(&engine).phase, MatchPhase::Playing);

    engine.update(3600.0).expect("update");
    let snap = snapshot(&engine);
    assert_eq!(snap.player.position.x, 11);
    assert_eq!(snap.cells.len(), 40 * 40);
}

#[wasm_bindgen_test]
fn invalid_commands_surface_as_js_errors() {
    let mut engine = engine();
    let err: JsValue = engine.pause(0.0).expect_err("cannot pause from menu");
    assert!(err.is_object());
    assert!(engine.set_difficulty("nightmare").is_err());
    assert!(MatchEngine::new(Some("{\"ai_smartness\":2}".into())).is_err());
}

#[wasm_bindgen_test]
fn keys_steer_and_toggle_pause() {
    let mut engine = engine();
    engine.start(0.0).expect("menu can start");
    engine.update(3500.0).expect("update");

    assert!(!engine.handle_key("ArrowLeft", 3510.0), "reverse is ignored");
    assert!(engine.handle_key("w", 3520.0));
    assert!(engine.handle_key("Escape", 3530.0));
    assert_eq!(engine.phase(), "paused");
    assert!(engine.handle_key("p", 3540.0));
    assert_eq!(engine.phase(), "playing");
}

#[wasm_bindgen_test]
async fn suggestion_resolves_with_a_heading() {
    let engine = engine();
    let value = JsFuture::from(engine.suggest_heading(Some(10)))
        .await
        .expect("suggestion should resolve");
    let json = value.as_string().expect("suggestion is a JSON string");
    assert!(json.contains("\"heading\""));
}

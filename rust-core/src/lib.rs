pub mod ai;
pub mod game;
pub mod utils;

use gloo_timers::future::TimeoutFuture;
use serde::Serialize;
use serde_wasm_bindgen::to_value;
use std::str::FromStr;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;
use web_sys::js_sys::Promise;

pub use ai::{
    choose_heading, decide_with, legal_headings, window_openness, AiAgent, AiDecision, AiMode,
    CandidateScore, Difficulty, DifficultyProfile, SpaceEvaluator, WindowOpenness,
};
pub use game::{
    advance, default_store, request_heading_change, Cell, ConfigError, Coord, Countdown,
    CountdownSignal, Entity, GameEvent, Grid, Heading, InputCommand, MatchCommand, MatchConfig,
    MatchController, MatchError, MatchOutcome, MatchPhase, MatchResult, MatchSnapshot, MatchState,
    MemoryScoreStore, MoveOutcome, OutcomeReason, Owner, ScoreStore, SimulationClock, StoreError,
    TickReport,
};

#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn start() {
    utils::set_panic_hook();
}

fn to_js_error<E: Serialize + std::fmt::Display>(error: E) -> JsValue {
    to_value(&error).unwrap_or_else(|_| JsValue::from_str(&error.to_string()))
}

fn serde_to_js_error<E: std::fmt::Display>(error: E) -> JsValue {
    JsValue::from_str(&error.to_string())
}

fn parse_difficulty(name: &str) -> Result<Difficulty, ConfigError> {
    Difficulty::from_str(name).map_err(|_| ConfigError::UnknownDifficulty { name: name.into() })
}

#[derive(Serialize)]
struct SuggestionResponse {
    decision: AiDecision,
    phase: MatchPhase,
}

/// 浏览器端持有的对局句柄。宿主负责渲染、音效与输入采集，
/// 这里只接收指令、推进模拟并导出快照与事件。
#[wasm_bindgen]
pub struct MatchEngine {
    controller: MatchController,
}

#[wasm_bindgen]
impl MatchEngine {
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> Result<MatchEngine, JsValue> {
        let config = match config_json {
            Some(json) => MatchConfig::from_json(&json).map_err(to_js_error)?,
            None => MatchConfig::default(),
        };
        let controller = MatchController::new(config, default_store()).map_err(to_js_error)?;
        Ok(MatchEngine { controller })
    }

    pub fn start(&mut self, now_ms: f64) -> Result<(), JsValue> {
        self.controller.start(now_ms).map_err(to_js_error)
    }

    pub fn restart(&mut self, now_ms: f64) -> Result<(), JsValue> {
        self.controller.restart(now_ms).map_err(to_js_error)
    }

    pub fn pause(&mut self, now_ms: f64) -> Result<(), JsValue> {
        self.controller.pause(now_ms).map_err(to_js_error)
    }

    pub fn resume(&mut self, now_ms: f64) -> Result<(), JsValue> {
        self.controller.resume(now_ms).map_err(to_js_error)
    }

    pub fn quit(&mut self) {
        self.controller.quit();
    }

    pub fn set_difficulty(&mut self, name: &str) -> Result<(), JsValue> {
        let difficulty = parse_difficulty(name).map_err(to_js_error)?;
        self.controller.set_difficulty(difficulty);
        Ok(())
    }

    /// 方向名无法识别或转向被拒绝时返回 `false`。
    pub fn steer(&mut self, heading: &str) -> bool {
        Heading::from_str(heading)
            .map(|heading| self.controller.steer(heading))
            .unwrap_or(false)
    }

    pub fn handle_key(&mut self, key: &str, now_ms: f64) -> bool {
        match InputCommand::from_key(key) {
            Some(command) => self.controller.handle_input(command, now_ms),
            None => false,
        }
    }

    /// 推进一帧并返回期间产生的事件。
    pub fn update(&mut self, now_ms: f64) -> Result<JsValue, JsValue> {
        self.controller.update(now_ms);
        self.drain_events()
    }

    pub fn step(&mut self) -> Result<JsValue, JsValue> {
        self.controller.step();
        self.drain_events()
    }

    pub fn drain_events(&mut self) -> Result<JsValue, JsValue> {
        let events = self.controller.drain_events();
        to_value(&events).map_err(JsValue::from)
    }

    pub fn snapshot(&self) -> Result<JsValue, JsValue> {
        to_value(&self.controller.snapshot()).map_err(JsValue::from)
    }

    pub fn snapshot_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.controller.snapshot()).map_err(serde_to_js_error)
    }

    pub fn state_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(self.controller.state()).map_err(serde_to_js_error)
    }

    #[wasm_bindgen(getter)]
    pub fn phase(&self) -> String {
        serde_json::to_value(self.controller.phase())
            .ok()
            .and_then(|value| value.as_str().map(str::to_owned))
            .unwrap_or_default()
    }

    pub fn best_score(&self) -> u32 {
        self.controller.best_score()
    }

    /// 以最高智能度的策略为玩家给出转向建议，可选延迟后返回。
    pub fn suggest_heading(&self, delay_ms: Option<u32>) -> Promise {
        let state = self.controller.state().clone();
        let radius = self.controller.config().openness_radius;
        let delay = delay_ms.unwrap_or(0);

        future_to_promise(async move {
            if delay > 0 {
                TimeoutFuture::new(delay).await;
            }
            let profile = DifficultyProfile::default().with_smartness(1.0);
            let mut agent = AiAgent::new(profile).with_radius(radius);
            let decision = agent.decide(&state.player, &state.grid);
            let response = SuggestionResponse {
                decision,
                phase: state.phase,
            };
            let json = serde_json::to_string(&response).map_err(serde_to_js_error)?;
            Ok(JsValue::from_str(&json))
        })
    }
}

#[wasm_bindgen(js_name = "defaultConfig")]
pub fn default_config() -> Result<JsValue, JsValue> {
    to_value(&MatchConfig::default()).map_err(JsValue::from)
}

#[wasm_bindgen(js_name = "difficultyProfile")]
pub fn difficulty_profile(name: &str) -> Result<JsValue, JsValue> {
    let difficulty = parse_difficulty(name).map_err(to_js_error)?;
    to_value(&DifficultyProfile::from_difficulty(difficulty)).map_err(JsValue::from)
}

/// 按键名映射为指令；无法识别时返回 `null`。
#[wasm_bindgen(js_name = "mapKey")]
pub fn map_key(key: &str) -> Result<JsValue, JsValue> {
    match InputCommand::from_key(key) {
        Some(command) => to_value(&command).map_err(JsValue::from),
        None => Ok(JsValue::NULL),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn difficulty_names_map_to_config_errors() {
        assert_eq!(parse_difficulty("hard"), Ok(Difficulty::Hard));
        assert_eq!(
            parse_difficulty("nightmare"),
            Err(ConfigError::UnknownDifficulty {
                name: "nightmare".into()
            })
        );
    }
}

use serde::{Deserialize, Serialize};

use crate::ai::{AiAgent, AiDecision, Difficulty};
use crate::utils;

use super::clock::{Countdown, CountdownSignal, SimulationClock};
use super::config::{ConfigError, MatchConfig};
use super::grid::{Heading, Owner};
use super::movement::{advance, request_heading_change, MoveOutcome};
use super::score::{MemoryScoreStore, ScoreStore};
use super::state::{
    GameEvent, MatchOutcome, MatchPhase, MatchResult, MatchSnapshot, MatchState, OutcomeReason,
};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MatchCommand {
    Start,
    Restart,
    Pause,
    Resume,
    Quit,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum MatchError {
    InvalidTransition {
        from: MatchPhase,
        command: MatchCommand,
    },
    Config {
        error: ConfigError,
    },
}

impl std::fmt::Display for MatchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchError::InvalidTransition { from, command } => {
                write!(f, "cannot {command:?} while in {from:?}")
            }
            MatchError::Config { error } => write!(f, "{error}"),
        }
    }
}

impl std::error::Error for MatchError {}

impl From<ConfigError> for MatchError {
    fn from(error: ConfigError) -> Self {
        MatchError::Config { error }
    }
}

/// 宿主输入映射后的指令。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum InputCommand {
    Steer { heading: Heading },
    TogglePause,
}

impl InputCommand {
    /// 键盘按键名（`KeyboardEvent.key`）到指令的映射。
    pub fn from_key(key: &str) -> Option<Self> {
        let heading = match key {
            "ArrowUp" | "w" | "W" => Heading::Up,
            "ArrowDown" | "s" | "S" => Heading::Down,
            "ArrowLeft" | "a" | "A" => Heading::Left,
            "ArrowRight" | "d" | "D" => Heading::Right,
            "Escape" | "p" | "P" => return Some(InputCommand::TogglePause),
            _ => return None,
        };
        Some(InputCommand::Steer { heading })
    }
}

/// 单个 tick 的结算明细。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TickReport {
    pub player: MoveOutcome,
    pub ai: MoveOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_decision: Option<AiDecision>,
}

/// 对局控制器：负责生命周期状态机、tick 编排与胜负结算。
pub struct MatchController {
    config: MatchConfig,
    state: MatchState,
    clock: SimulationClock,
    countdown: Countdown,
    agent: AiAgent,
    store: Box<dyn ScoreStore>,
    best_score: u32,
    matches_started: u64,
    last_now: f64,
    events: Vec<GameEvent>,
}

impl MatchController {
    pub fn new(config: MatchConfig, store: Box<dyn ScoreStore>) -> Result<Self, MatchError> {
        config.validate()?;
        let best_score = match store.load() {
            Ok(best) => best,
            Err(err) => {
                utils::warn(&format!("best score unavailable, starting from 0: {err}"));
                0
            }
        };
        Ok(Self {
            state: MatchState::new(config.grid_size, config.difficulty),
            clock: config.clock(),
            countdown: config.countdown(),
            agent: Self::build_agent(&config, 0),
            config,
            store,
            best_score,
            matches_started: 0,
            last_now: 0.0,
            events: Vec::new(),
        })
    }

    pub fn in_memory(config: MatchConfig) -> Result<Self, MatchError> {
        Self::new(config, Box::new(MemoryScoreStore::default()))
    }

    fn build_agent(config: &MatchConfig, match_index: u64) -> AiAgent {
        let agent = match config.seed {
            Some(seed) => AiAgent::with_seed(config.profile(), seed.wrapping_add(match_index)),
            None => AiAgent::new(config.profile()),
        };
        agent.with_radius(config.openness_radius)
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    pub fn state(&self) -> &MatchState {
        &self.state
    }

    pub fn phase(&self) -> MatchPhase {
        self.state.phase
    }

    pub fn best_score(&self) -> u32 {
        self.best_score
    }

    pub fn clock(&self) -> &SimulationClock {
        &self.clock
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    fn set_phase(&mut self, phase: MatchPhase) {
        if self.state.phase != phase {
            self.state.phase = phase;
            self.emit(GameEvent::PhaseChanged { phase });
        }
    }

    fn reject(&self, command: MatchCommand) -> MatchError {
        MatchError::InvalidTransition {
            from: self.state.phase,
            command,
        }
    }

    /// 下一局开始时生效。
    pub fn set_difficulty(&mut self, difficulty: Difficulty) {
        self.config.difficulty = difficulty;
    }

    pub fn start(&mut self, now_ms: f64) -> Result<(), MatchError> {
        match self.state.phase {
            MatchPhase::Menu | MatchPhase::GameOver => {
                self.begin_match(now_ms);
                Ok(())
            }
            _ => Err(self.reject(MatchCommand::Start)),
        }
    }

    pub fn restart(&mut self, now_ms: f64) -> Result<(), MatchError> {
        if self.state.phase != MatchPhase::GameOver {
            return Err(self.reject(MatchCommand::Restart));
        }
        self.begin_match(now_ms);
        Ok(())
    }

    fn begin_match(&mut self, now_ms: f64) {
        self.state = MatchState::new(self.config.grid_size, self.config.difficulty);
        self.agent = Self::build_agent(&self.config, self.matches_started);
        self.matches_started += 1;
        self.clock = self.config.clock();
        self.countdown = self.config.countdown();
        self.countdown.start(now_ms);
        self.last_now = now_ms;
        utils::log(&format!(
            "match {} started on {:?}",
            self.matches_started, self.config.difficulty
        ));
        self.set_phase(MatchPhase::Countdown);
        self.advance_countdown(now_ms);
    }

    pub fn pause(&mut self, now_ms: f64) -> Result<(), MatchError> {
        if self.state.phase != MatchPhase::Playing {
            return Err(self.reject(MatchCommand::Pause));
        }
        self.clock.pause(now_ms);
        self.last_now = now_ms;
        self.set_phase(MatchPhase::Paused);
        Ok(())
    }

    pub fn resume(&mut self, now_ms: f64) -> Result<(), MatchError> {
        if self.state.phase != MatchPhase::Paused {
            return Err(self.reject(MatchCommand::Resume));
        }
        self.clock.resume(now_ms);
        self.last_now = now_ms;
        self.set_phase(MatchPhase::Playing);
        Ok(())
    }

    /// 任何阶段都可以退回菜单。
    pub fn quit(&mut self) {
        self.set_phase(MatchPhase::Menu);
    }

    pub fn steer(&mut self, heading: Heading) -> bool {
        if self.state.phase != MatchPhase::Playing {
            return false;
        }
        let applied = request_heading_change(&mut self.state.player, heading);
        if applied {
            self.emit(GameEvent::Turn {
                owner: Owner::Player,
            });
        }
        applied
    }

    /// 处理映射后的输入；返回输入是否产生了效果。
    pub fn handle_input(&mut self, command: InputCommand, now_ms: f64) -> bool {
        match (command, self.state.phase) {
            (InputCommand::Steer { heading }, _) => self.steer(heading),
            (InputCommand::TogglePause, MatchPhase::Playing) => self.pause(now_ms).is_ok(),
            (InputCommand::TogglePause, MatchPhase::Paused) => self.resume(now_ms).is_ok(),
            (InputCommand::TogglePause, _) => false,
        }
    }

    /// 宿主每帧调用一次。每次调用最多推进一个 tick。
    pub fn update(&mut self, now_ms: f64) {
        self.last_now = now_ms;
        match self.state.phase {
            MatchPhase::Countdown => self.advance_countdown(now_ms),
            MatchPhase::Playing => {
                if self.clock.should_tick(now_ms) {
                    self.clock.mark_tick(now_ms);
                    self.step();
                }
                if self.state.phase == MatchPhase::Playing && self.clock.maybe_ramp_speed(now_ms) {
                    let multiplier = self.clock.speed_multiplier();
                    self.emit(GameEvent::SpeedUp { multiplier });
                }
            }
            MatchPhase::Menu | MatchPhase::Paused | MatchPhase::GameOver => {}
        }
    }

    fn advance_countdown(&mut self, now_ms: f64) {
        let (signals, finished) = self.countdown.advance(now_ms);
        for signal in signals {
            let event = match signal {
                CountdownSignal::Tick { remaining } => GameEvent::CountdownTick { remaining },
                CountdownSignal::Go => GameEvent::CountdownGo,
            };
            self.emit(event);
        }
        if finished {
            self.clock.start(now_ms);
            self.set_phase(MatchPhase::Playing);
        }
    }

    /// 不经时钟判断直接执行一个 tick：先玩家、后 AI 决策与移动，最后统一结算。
    pub fn step(&mut self) -> Option<TickReport> {
        if self.state.phase != MatchPhase::Playing {
            return None;
        }

        let MatchState {
            grid, player, ai, ..
        } = &mut self.state;

        let player_move = if player.alive {
            advance(player, grid)
        } else {
            MoveOutcome::Halted
        };

        let (ai_move, ai_decision) = if ai.alive {
            let decision = self.agent.decide(ai, grid);
            ai.heading = decision.heading;
            (advance(ai, grid), Some(decision))
        } else {
            (MoveOutcome::Halted, None)
        };

        for (owner, outcome) in [(Owner::Player, player_move), (Owner::Ai, ai_move)] {
            if outcome.is_crash() {
                let entity = self.state.entity(owner);
                let event = GameEvent::Crash {
                    owner,
                    position: entity.position,
                    color: entity.color.clone(),
                };
                self.emit(event);
            }
        }

        self.state.ticks += 1;
        if self.state.player.alive {
            let gained = self.clock.speed_multiplier().floor() as u32;
            self.state.score = self.state.score.saturating_add(gained);
        }
        self.state.survival_secs = (self.clock.playing_ms(self.last_now) / 1000.0).floor() as u32;

        if let Some((outcome, reason)) = self.state.classify(player_move, ai_move) {
            self.finish_match(outcome, reason);
        }

        Some(TickReport {
            player: player_move,
            ai: ai_move,
            ai_decision,
        })
    }

    fn finish_match(&mut self, outcome: MatchOutcome, reason: OutcomeReason) {
        let score = self.state.score;
        let new_best = score > self.best_score;
        if new_best {
            self.best_score = score;
            if let Err(err) = self.store.save(score) {
                utils::warn(&format!("could not persist best score {score}: {err}"));
            }
        }

        let result = MatchResult {
            outcome,
            reason,
            score,
            survival_secs: self.state.survival_secs,
            max_speed: self.clock.max_speed(),
            best_score: self.best_score,
            new_best,
        };
        utils::log(&format!(
            "match over: {:?} ({:?}), score {}",
            result.outcome, result.reason, result.score
        ));
        self.state.result = Some(result);

        if outcome == MatchOutcome::Win {
            self.emit(GameEvent::Victory);
        }
        if new_best {
            self.emit(GameEvent::NewBestScore { score });
        }
        self.set_phase(MatchPhase::GameOver);
    }

    pub fn snapshot(&self) -> MatchSnapshot {
        let countdown = if self.state.phase == MatchPhase::Countdown {
            self.countdown.display()
        } else {
            None
        };
        MatchSnapshot {
            phase: self.state.phase,
            difficulty: self.state.difficulty,
            grid_size: self.state.grid.size(),
            cells: self.state.grid.markers(),
            player: self.state.player.clone(),
            ai: self.state.ai.clone(),
            score: self.state.score,
            best_score: self.best_score,
            speed_multiplier: self.clock.speed_multiplier(),
            max_speed: self.clock.max_speed(),
            tick_interval_ms: self.clock.tick_interval_ms(),
            survival_secs: self.state.survival_secs,
            countdown,
            result: self.state.result.clone(),
        }
    }
}

use serde::{Deserialize, Serialize};

use crate::ai::Difficulty;

use super::entity::Entity;
use super::grid::{Coord, Grid, Owner};
use super::movement::MoveOutcome;

/// 对局阶段。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum MatchPhase {
    #[default]
    Menu,
    Countdown,
    Playing,
    Paused,
    GameOver,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MatchOutcome {
    Win,
    Loss,
}

/// 胜负原因。双方同一 tick 撞毁时判负：只有玩家存活才算胜利。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum OutcomeReason {
    OpponentCrashed {
        cause: MoveOutcome,
    },
    PlayerCrashed {
        cause: MoveOutcome,
    },
    SimultaneousCrash {
        player_cause: MoveOutcome,
        ai_cause: MoveOutcome,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatchResult {
    pub outcome: MatchOutcome,
    pub reason: OutcomeReason,
    pub score: u32,
    pub survival_secs: u32,
    pub max_speed: f64,
    pub best_score: u32,
    pub new_best: bool,
}

/// 供渲染、音效等外部模块消费的离散事件。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum GameEvent {
    PhaseChanged {
        phase: MatchPhase,
    },
    CountdownTick {
        remaining: u8,
    },
    CountdownGo,
    Turn {
        owner: Owner,
    },
    SpeedUp {
        multiplier: f64,
    },
    Crash {
        owner: Owner,
        position: Coord,
        color: String,
    },
    Victory,
    NewBestScore {
        score: u32,
    },
}

/// 单局对战的完整模拟状态。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatchState {
    pub grid: Grid,
    pub player: Entity,
    pub ai: Entity,
    pub phase: MatchPhase,
    pub difficulty: Difficulty,
    pub score: u32,
    #[serde(default)]
    pub survival_secs: u32,
    #[serde(default)]
    pub ticks: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<MatchResult>,
}

impl MatchState {
    pub fn new(grid_size: u16, difficulty: Difficulty) -> Self {
        let mut grid = Grid::new(grid_size);
        let player = Entity::spawn(&mut grid, Owner::Player);
        let ai = Entity::spawn(&mut grid, Owner::Ai);
        Self {
            grid,
            player,
            ai,
            phase: MatchPhase::Menu,
            difficulty,
            score: 0,
            survival_secs: 0,
            ticks: 0,
            result: None,
        }
    }

    pub fn entity(&self, owner: Owner) -> &Entity {
        match owner {
            Owner::Player => &self.player,
            Owner::Ai => &self.ai,
        }
    }

    pub fn is_finished(&self) -> bool {
        !self.player.alive || !self.ai.alive
    }

    /// 根据本 tick 双方的移动结果判定胜负；双方都存活时返回 `None`。
    pub fn classify(
        &self,
        player_move: MoveOutcome,
        ai_move: MoveOutcome,
    ) -> Option<(MatchOutcome, OutcomeReason)> {
        match (self.player.alive, self.ai.alive) {
            (true, true) => None,
            (true, false) => Some((
                MatchOutcome::Win,
                OutcomeReason::OpponentCrashed { cause: ai_move },
            )),
            (false, true) => Some((
                MatchOutcome::Loss,
                OutcomeReason::PlayerCrashed { cause: player_move },
            )),
            (false, false) => Some((
                MatchOutcome::Loss,
                OutcomeReason::SimultaneousCrash {
                    player_cause: player_move,
                    ai_cause: ai_move,
                },
            )),
        }
    }
}

/// 每帧交给渲染端的只读快照。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatchSnapshot {
    pub phase: MatchPhase,
    pub difficulty: Difficulty,
    pub grid_size: u16,
    pub cells: Vec<u8>,
    pub player: Entity,
    pub ai: Entity,
    pub score: u32,
    pub best_score: u32,
    pub speed_multiplier: f64,
    pub max_speed: f64,
    pub tick_interval_ms: f64,
    pub survival_secs: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub countdown: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<MatchResult>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::movement::advance;

    #[test]
    fn classify_covers_every_survival_combination() {
        let mut state = MatchState::new(40, Difficulty::Medium);
        assert_eq!(state.classify(MoveOutcome::Moved, MoveOutcome::Moved), None);

        state.ai.alive = false;
        assert_eq!(
            state.classify(MoveOutcome::Moved, MoveOutcome::CrashedTrail),
            Some((
                MatchOutcome::Win,
                OutcomeReason::OpponentCrashed {
                    cause: MoveOutcome::CrashedTrail
                }
            ))
        );

        state.player.alive = false;
        let (outcome, reason) = state
            .classify(MoveOutcome::CrashedWall, MoveOutcome::CrashedTrail)
            .expect("both dead is terminal");
        assert_eq!(outcome, MatchOutcome::Loss);
        assert!(matches!(reason, OutcomeReason::SimultaneousCrash { .. }));

        state.ai.alive = true;
        assert_eq!(
            state.classify(MoveOutcome::CrashedWall, MoveOutcome::Moved).map(|(o, _)| o),
            Some(MatchOutcome::Loss)
        );
    }

    #[test]
    fn state_serializes_for_the_host() {
        let mut state = MatchState::new(10, Difficulty::Easy);
        let MatchState { grid, player, .. } = &mut state;
        advance(player, grid);

        let json = serde_json::to_string(&state).expect("state should serialize");
        let back: MatchState = serde_json::from_str(&json).expect("state should deserialize");
        assert_eq!(back, state);
        assert!(json.contains("\"phase\":\"menu\""));
    }
}

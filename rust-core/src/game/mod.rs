//! 游戏核心逻辑模块（网格、实体、移动、时钟、对局状态机等）。

pub mod clock;
pub mod config;
pub mod entity;
pub mod grid;
pub mod movement;
pub mod rules;
pub mod score;
pub mod state;

pub use clock::{Countdown, CountdownSignal, SimulationClock};
pub use config::{ConfigError, MatchConfig};
pub use entity::Entity;
pub use grid::{Cell, Coord, Grid, Heading, Owner};
pub use movement::{advance, request_heading_change, MoveOutcome};
pub use rules::{InputCommand, MatchCommand, MatchController, MatchError, TickReport};
pub use score::{default_store, MemoryScoreStore, ScoreStore, StoreError};
pub use state::{
    GameEvent, MatchOutcome, MatchPhase, MatchResult, MatchSnapshot, MatchState, OutcomeReason,
};

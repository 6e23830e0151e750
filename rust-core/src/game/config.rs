use serde::{Deserialize, Serialize};

use crate::ai::{Difficulty, DifficultyProfile};

use super::clock::{Countdown, SimulationClock};

const DEFAULT_GRID_SIZE: u16 = 40;
const DEFAULT_BASE_INTERVAL_MS: f64 = 100.0;
const DEFAULT_SPEED_RAMP_FACTOR: f64 = 0.93;
const DEFAULT_SPEED_RAMP_INTERVAL_MS: f64 = 8000.0;
const DEFAULT_COUNTDOWN_STEPS: u8 = 3;
const DEFAULT_COUNTDOWN_STEP_MS: f64 = 1000.0;
const DEFAULT_COUNTDOWN_GO_MS: f64 = 500.0;
const DEFAULT_OPENNESS_RADIUS: i32 = 5;
const MIN_GRID_SIZE: u16 = 4;
const MIN_SPEED_RAMP_FACTOR: f64 = 0.5;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum ConfigError {
    GridTooSmall { size: u16 },
    SmartnessOutOfRange { value: f64 },
    InvalidDuration { field: String },
    InvalidRampFactor { value: f64 },
    InvalidRadius { value: i32 },
    UnknownDifficulty { name: String },
    Malformed { reason: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::GridTooSmall { size } => write!(f, "grid size {size} is too small"),
            ConfigError::SmartnessOutOfRange { value } => {
                write!(f, "ai_smartness {value} must lie in [0, 1]")
            }
            ConfigError::InvalidDuration { field } => write!(f, "{field} must be positive"),
            ConfigError::InvalidRampFactor { value } => {
                write!(f, "speed_ramp_factor {value} must lie in [{MIN_SPEED_RAMP_FACTOR}, 1]")
            }
            ConfigError::InvalidRadius { value } => {
                write!(f, "openness_radius {value} must lie in [0, grid_size]")
            }
            ConfigError::UnknownDifficulty { name } => write!(f, "unknown difficulty '{name}'"),
            ConfigError::Malformed { reason } => write!(f, "malformed config: {reason}"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// 对局配置。所有字段均有默认值，宿主可只传入需要覆盖的部分。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MatchConfig {
    pub grid_size: u16,
    pub base_interval_ms: f64,
    pub speed_ramp_factor: f64,
    pub speed_ramp_interval_ms: f64,
    pub countdown_steps: u8,
    pub countdown_step_ms: f64,
    pub countdown_go_ms: f64,
    pub openness_radius: i32,
    pub difficulty: Difficulty,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_smartness: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            grid_size: DEFAULT_GRID_SIZE,
            base_interval_ms: DEFAULT_BASE_INTERVAL_MS,
            speed_ramp_factor: DEFAULT_SPEED_RAMP_FACTOR,
            speed_ramp_interval_ms: DEFAULT_SPEED_RAMP_INTERVAL_MS,
            countdown_steps: DEFAULT_COUNTDOWN_STEPS,
            countdown_step_ms: DEFAULT_COUNTDOWN_STEP_MS,
            countdown_go_ms: DEFAULT_COUNTDOWN_GO_MS,
            openness_radius: DEFAULT_OPENNESS_RADIUS,
            difficulty: Difficulty::default(),
            ai_smartness: None,
            seed: None,
        }
    }
}

impl MatchConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: MatchConfig = serde_json::from_str(json).map_err(|err| ConfigError::Malformed {
            reason: err.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = difficulty;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_smartness(mut self, ai_smartness: f64) -> Self {
        self.ai_smartness = Some(ai_smartness);
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid_size < MIN_GRID_SIZE {
            return Err(ConfigError::GridTooSmall {
                size: self.grid_size,
            });
        }
        let durations = [
            ("base_interval_ms", self.base_interval_ms),
            ("speed_ramp_interval_ms", self.speed_ramp_interval_ms),
            ("countdown_step_ms", self.countdown_step_ms),
        ];
        for (field, value) in durations {
            if !(value > 0.0) {
                return Err(ConfigError::InvalidDuration {
                    field: field.into(),
                });
            }
        }
        if !(self.countdown_go_ms >= 0.0) {
            return Err(ConfigError::InvalidDuration {
                field: "countdown_go_ms".into(),
            });
        }
        if !(MIN_SPEED_RAMP_FACTOR..=1.0).contains(&self.speed_ramp_factor) {
            return Err(ConfigError::InvalidRampFactor {
                value: self.speed_ramp_factor,
            });
        }
        if !(0..=i32::from(self.grid_size)).contains(&self.openness_radius) {
            return Err(ConfigError::InvalidRadius {
                value: self.openness_radius,
            });
        }
        if let Some(value) = self.ai_smartness {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::SmartnessOutOfRange { value });
            }
        }
        Ok(())
    }

    pub fn profile(&self) -> DifficultyProfile {
        let profile = DifficultyProfile::from_difficulty(self.difficulty);
        match self.ai_smartness {
            Some(value) => profile.with_smartness(value),
            None => profile,
        }
    }

    pub fn clock(&self) -> SimulationClock {
        SimulationClock::new(
            self.base_interval_ms,
            self.speed_ramp_factor,
            self.speed_ramp_interval_ms,
        )
    }

    pub fn countdown(&self) -> Countdown {
        Countdown::new(
            self.countdown_steps,
            self.countdown_step_ms,
            self.countdown_go_ms,
        )
    }
}

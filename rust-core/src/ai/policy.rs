use std::str::FromStr;

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::openness::{SpaceEvaluator, WindowOpenness};
use crate::game::{Entity, Grid, Heading};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl FromStr for Difficulty {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" | "normal" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            _ => Err(()),
        }
    }
}

/// 难度参数。`ai_speed` 为保留字段，目前不影响 tick 节奏。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct DifficultyProfile {
    pub ai_smartness: f64,
    pub ai_speed: f64,
}

impl DifficultyProfile {
    pub fn from_difficulty(difficulty: Difficulty) -> Self {
        match difficulty {
            Difficulty::Easy => Self {
                ai_smartness: 0.3,
                ai_speed: 1.2,
            },
            Difficulty::Medium => Self {
                ai_smartness: 0.6,
                ai_speed: 1.0,
            },
            Difficulty::Hard => Self {
                ai_smartness: 0.9,
                ai_speed: 0.8,
            },
        }
    }

    pub fn with_smartness(mut self, ai_smartness: f64) -> Self {
        self.ai_smartness = ai_smartness;
        self
    }
}

impl Default for DifficultyProfile {
    fn default() -> Self {
        DifficultyProfile::from_difficulty(Difficulty::Medium)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AiMode {
    /// 按开阔度择优。
    Smart,
    Random,
    /// 无路可走，保持原方向。
    Forced,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CandidateScore {
    pub heading: Heading,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AiDecision {
    pub heading: Heading,
    pub mode: AiMode,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub candidates: Vec<CandidateScore>,
}

/// 不掉头、不越界、不撞已占用格的方向。
pub fn legal_headings(entity: &Entity, grid: &Grid) -> Vec<Heading> {
    Heading::ALL
        .into_iter()
        .filter(|&heading| heading != entity.heading.opposite())
        .filter(|&heading| !grid.occupied(entity.position.step(heading)))
        .collect()
}

pub fn decide_with<E, R>(
    entity: &Entity,
    grid: &Grid,
    profile: &DifficultyProfile,
    evaluator: &E,
    rng: &mut R,
) -> AiDecision
where
    E: SpaceEvaluator + ?Sized,
    R: Rng + ?Sized,
{
    let legal = legal_headings(entity, grid);
    if legal.is_empty() {
        return AiDecision {
            heading: entity.heading,
            mode: AiMode::Forced,
            candidates: Vec::new(),
        };
    }

    let roll: f64 = rng.gen();
    if roll < profile.ai_smartness {
        let candidates: Vec<CandidateScore> = legal
            .iter()
            .map(|&heading| CandidateScore {
                heading,
                score: Some(evaluator.score(grid, entity.position.step(heading))),
            })
            .collect();
        let best = candidates.iter().filter_map(|c| c.score).max().unwrap_or(0);
        let leaders: Vec<Heading> = candidates
            .iter()
            .filter(|c| c.score == Some(best))
            .map(|c| c.heading)
            .collect();
        let heading = leaders.choose(rng).copied().unwrap_or(entity.heading);
        AiDecision {
            heading,
            mode: AiMode::Smart,
            candidates,
        }
    } else {
        let heading = legal.choose(rng).copied().unwrap_or(entity.heading);
        AiDecision {
            heading,
            mode: AiMode::Random,
            candidates: legal
                .into_iter()
                .map(|heading| CandidateScore {
                    heading,
                    score: None,
                })
                .collect(),
        }
    }
}

/// 以默认开阔度窗口为 AI 实体选择下一步方向。
pub fn choose_heading<R: Rng + ?Sized>(
    entity: &Entity,
    grid: &Grid,
    profile: &DifficultyProfile,
    rng: &mut R,
) -> Heading {
    decide_with(entity, grid, profile, &WindowOpenness::default(), rng).heading
}

#[derive(Debug, Clone)]
pub struct AiAgent {
    profile: DifficultyProfile,
    evaluator: WindowOpenness,
    rng: SmallRng,
}

impl AiAgent {
    pub fn new(profile: DifficultyProfile) -> Self {
        Self {
            profile,
            evaluator: WindowOpenness::default(),
            rng: SmallRng::from_entropy(),
        }
    }

    pub fn with_seed(profile: DifficultyProfile, seed: u64) -> Self {
        Self {
            profile,
            evaluator: WindowOpenness::default(),
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    pub fn with_radius(mut self, radius: i32) -> Self {
        self.evaluator = WindowOpenness { radius };
        self
    }

    pub fn profile(&self) -> &DifficultyProfile {
        &self.profile
    }

    pub fn decide(&mut self, entity: &Entity, grid: &Grid) -> AiDecision {
        decide_with(entity, grid, &self.profile, &self.evaluator, &mut self.rng)
    }

    pub fn choose_heading(&mut self, entity: &Entity, grid: &Grid) -> Heading {
        self.decide(entity, grid).heading
    }
}

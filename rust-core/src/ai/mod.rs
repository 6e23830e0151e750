//! AI 算法模块（开阔度启发式与难度驱动的随机策略）。

pub mod openness;
pub mod policy;

pub use openness::{window_openness, SpaceEvaluator, WindowOpenness};
pub use policy::{
    choose_heading, decide_with, legal_headings, AiAgent, AiDecision, AiMode, CandidateScore,
    Difficulty, DifficultyProfile,
};

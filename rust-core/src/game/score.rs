//! 最高分持久化。存储失败只记录警告，绝不影响模拟本身。

use serde::{Deserialize, Serialize};

pub const BEST_SCORE_KEY: &str = "lightCycleHighScore";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum StoreError {
    Unavailable,
    Corrupt { value: String },
    WriteFailed { reason: String },
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Unavailable => f.write_str("score storage is unavailable"),
            StoreError::Corrupt { value } => write!(f, "stored best score '{value}' is not a number"),
            StoreError::WriteFailed { reason } => write!(f, "failed to save best score: {reason}"),
        }
    }
}

impl std::error::Error for StoreError {}

pub trait ScoreStore {
    fn load(&self) -> Result<u32, StoreError>;
    fn save(&mut self, score: u32) -> Result<(), StoreError>;
}

/// 进程内存储，用于测试与无浏览器环境。
#[derive(Debug, Clone, Default)]
pub struct MemoryScoreStore {
    best: Option<u32>,
    saves: usize,
}

impl MemoryScoreStore {
    pub fn new(best: u32) -> Self {
        Self {
            best: Some(best),
            saves: 0,
        }
    }

    pub fn saves(&self) -> usize {
        self.saves
    }
}

impl ScoreStore for MemoryScoreStore {
    fn load(&self) -> Result<u32, StoreError> {
        Ok(self.best.unwrap_or(0))
    }

    fn save(&mut self, score: u32) -> Result<(), StoreError> {
        self.best = Some(score);
        self.saves += 1;
        Ok(())
    }
}

pub fn parse_stored(raw: Option<String>) -> Result<u32, StoreError> {
    match raw {
        None => Ok(0),
        Some(value) => value
            .trim()
            .parse::<u32>()
            .map_err(|_| StoreError::Corrupt { value }),
    }
}

/// 浏览器 `localStorage` 存储。
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone, Default)]
pub struct LocalStorageScoreStore;

#[cfg(target_arch = "wasm32")]
impl LocalStorageScoreStore {
    fn storage() -> Result<web_sys::Storage, StoreError> {
        web_sys::window()
            .and_then(|window| window.local_storage().ok().flatten())
            .ok_or(StoreError::Unavailable)
    }
}

#[cfg(target_arch = "wasm32")]
impl ScoreStore for LocalStorageScoreStore {
    fn load(&self) -> Result<u32, StoreError> {
        let raw = Self::storage()?
            .get_item(BEST_SCORE_KEY)
            .map_err(|_| StoreError::Unavailable)?;
        parse_stored(raw)
    }

    fn save(&mut self, score: u32) -> Result<(), StoreError> {
        Self::storage()?
            .set_item(BEST_SCORE_KEY, &score.to_string())
            .map_err(|err| StoreError::WriteFailed {
                reason: format!("{err:?}"),
            })
    }
}

/// 宿主环境下的默认存储：浏览器中使用 `localStorage`，否则使用内存。
pub fn default_store() -> Box<dyn ScoreStore> {
    #[cfg(target_arch = "wasm32")]
    {
        Box::new(LocalStorageScoreStore)
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        Box::new(MemoryScoreStore::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_text_parses_or_reports_corruption() {
        assert_eq!(parse_stored(None), Ok(0));
        assert_eq!(parse_stored(Some(" 1250 ".into())), Ok(1250));
        assert_eq!(
            parse_stored(Some("NaN".into())),
            Err(StoreError::Corrupt { value: "NaN".into() })
        );
    }

    #[test]
    fn memory_store_round_trips() {
        let mut store = MemoryScoreStore::default();
        assert_eq!(store.load(), Ok(0));
        store.save(77).expect("memory save never fails");
        assert_eq!(store.load(), Ok(77));
        assert_eq!(store.saves(), 1);
    }
}

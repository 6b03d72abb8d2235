use crate::logic::rules::GameRules;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(&'static str),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    // Search Parameters
    pub depth: u8,
    pub use_transposition_table: bool,

    // Session Parameters
    pub tt_path: PathBuf,
    pub rules: GameRules,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            depth: 2,
            use_transposition_table: true,
            tt_path: PathBuf::from("tt.json"),
            rules: GameRules::default(),
        }
    }
}

impl EngineConfig {
    /// Missing fields keep their defaults.
    pub fn load_from_json(json_str: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json_str)?)
    }

    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::load_from_json(&json)
    }

    /// Rejects board shapes no game can be played on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rules.columns == 0 {
            return Err(ConfigError::Invalid("rules.columns must be at least 1"));
        }
        if self.rules.rows == 0 {
            return Err(ConfigError::Invalid("rules.rows must be at least 1"));
        }
        if self.rules.max_dice_value == 0 {
            return Err(ConfigError::Invalid("rules.max_dice_value must be at least 1"));
        }
        Ok(())
    }
}

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveError {
    GameOver,
    ColumnOutOfRange,
    ColumnFull,
}

impl std::fmt::Display for MoveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let msg = match self {
            Self::GameOver => "the game is over",
            Self::ColumnOutOfRange => "column out of range",
            Self::ColumnFull => "column is full",
        };
        f.write_str(msg)
    }
}

impl std::error::Error for MoveError {}

/// Board dimensions and die size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameRules {
    pub columns: usize,
    pub rows: usize,
    pub max_dice_value: u8,
}

impl Default for GameRules {
    fn default() -> Self {
        Self {
            columns: 3,
            rows: 3,
            max_dice_value: 6,
        }
    }
}

impl GameRules {
    pub const fn dice_values(&self) -> std::ops::RangeInclusive<u8> {
        1..=self.max_dice_value
    }
}

use crate::logic::rules::MoveError;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Player {
    First,
    Second,
}

impl Player {
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::First => Self::Second,
            Self::Second => Self::First,
        }
    }

    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::First => 0,
            Self::Second => 1,
        }
    }
}

/// One player's grid. Each column holds its dice bottom-up in placement
/// order, without gaps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    columns: Vec<Vec<u8>>,
    rows: usize,
}

impl Board {
    #[must_use]
    pub fn new(columns: usize, rows: usize) -> Self {
        Self {
            columns: vec![Vec::with_capacity(rows); columns],
            rows,
        }
    }

    pub fn column(&self, column: usize) -> Option<&[u8]> {
        self.columns.get(column).map(Vec::as_slice)
    }

    /// Out-of-range columns count as full.
    pub fn is_column_full(&self, column: usize) -> bool {
        !self
            .columns
            .get(column)
            .is_some_and(|dice| dice.len() < self.rows)
    }

    pub fn open_columns(&self) -> Vec<usize> {
        (0..self.columns.len())
            .filter(|&c| !self.is_column_full(c))
            .collect()
    }

    pub fn dice_count(&self) -> usize {
        self.columns.iter().map(Vec::len).sum()
    }

    pub fn is_full(&self) -> bool {
        self.dice_count() >= self.columns.len() * self.rows
    }

    pub fn place(&mut self, column: usize, value: u8) -> Result<(), MoveError> {
        let rows = self.rows;
        let dice = self
            .columns
            .get_mut(column)
            .ok_or(MoveError::ColumnOutOfRange)?;
        if dice.len() >= rows {
            return Err(MoveError::ColumnFull);
        }
        dice.push(value);
        Ok(())
    }

    /// Removes every die showing `value` from `column`, returning how many
    /// were removed.
    pub fn knock_out(&mut self, column: usize, value: u8) -> usize {
        let Some(dice) = self.columns.get_mut(column) else {
            return 0;
        };
        let before = dice.len();
        dice.retain(|&d| d != value);
        before - dice.len()
    }

    /// Each distinct value `v` seen `n` times in a column is worth `v * n * n`.
    pub fn column_score(&self, column: usize) -> u32 {
        let Some(dice) = self.columns.get(column) else {
            return 0;
        };
        let mut score = 0;
        for (i, &value) in dice.iter().enumerate() {
            // Count each value once, at its first occurrence.
            if dice.iter().take(i).any(|&d| d == value) {
                continue;
            }
            let count = dice.iter().filter(|&&d| d == value).count();
            #[allow(clippy::cast_possible_truncation)]
            let count = count as u32;
            score += u32::from(value) * count * count;
        }
        score
    }

    pub fn score(&self) -> u32 {
        (0..self.columns.len()).map(|c| self.column_score(c)).sum()
    }

    /// Appends a canonical encoding of the grid: each column's dice sorted,
    /// columns separated by `0`.
    pub(crate) fn encode_into(&self, out: &mut Vec<u8>) {
        for dice in &self.columns {
            let mut sorted = dice.clone();
            sorted.sort_unstable();
            out.extend_from_slice(&sorted);
            out.push(0);
        }
    }

    /// Text grid, top row first, `0` marking an empty slot.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for row in (0..self.rows).rev() {
            for dice in &self.columns {
                let value = dice.get(row).copied().unwrap_or(0);
                let _ = write!(out, "{value} ");
            }
            out.push('\n');
        }
        out
    }
}

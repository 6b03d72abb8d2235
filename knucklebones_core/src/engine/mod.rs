use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::hash::Hash;

pub mod config;
pub mod search;
pub mod tt;


/// A column index, 0-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Move {
    pub column: usize,
}

/// One die value at a chance node, with the columns open under it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChanceOutcome {
    pub dice_value: u8,
    pub columns: Vec<usize>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SearchStats {
    pub depth: u8,
    pub nodes: u64,
    pub tt_hits: u64,
    pub time_ms: u64,
}

#[derive(Debug, Clone, Copy)]
pub struct SearchOutcome {
    pub best_move: Move,
    /// Value of the position for the player who acts, higher is better.
    pub score: f64,
    pub stats: SearchStats,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SearchError {
    #[error("no legal column for the player to move")]
    NoLegalMoves,
    #[error("position refused column {column} it reported as legal")]
    IllegalMove { column: usize },
}

/// Everything the search needs from a game position. The search only ever
/// mutates clones it made itself.
pub trait Position: Clone {
    type Player: Copy + Eq + Debug;
    /// Exact encoding: equal keys mean equal positions.
    type Key: Clone + Eq + Hash + Serialize + DeserializeOwned;

    fn opponent(player: Self::Player) -> Self::Player;

    fn current_player(&self) -> Self::Player;

    fn pending_dice_value(&self) -> u8;

    fn set_pending_dice_value(&mut self, value: u8);

    fn legal_columns(&self, player: Self::Player) -> Vec<usize>;

    /// Every die value exactly once, each paired with its legal columns.
    fn chance_expansion(&self) -> Vec<ChanceOutcome>;

    /// Places the pending die for the current player and passes the turn.
    /// Returns `false` and leaves the position untouched if the column is full.
    fn apply_move(&mut self, column: usize) -> bool;

    fn is_terminal(&self) -> bool;

    /// Bounded, finite, and zero-sum between the two players.
    fn heuristic_score(&self, player: Self::Player) -> f64;

    fn encode(&self) -> Self::Key;
}

pub trait Searcher<P: Position> {
    fn select_move(&mut self, position: &P, depth: u8) -> Result<SearchOutcome, SearchError>;
}

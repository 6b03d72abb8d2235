//! Decision core for a Knucklebones opponent: a chance-aware negamax search
//! with a persistent transposition table, plus the game engine it plays.

pub mod engine;
pub mod logic;
pub mod worker;

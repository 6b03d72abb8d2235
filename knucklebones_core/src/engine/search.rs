use crate::engine::config::EngineConfig;
use crate::engine::tt::{TTEntry, TTFlag, TranspositionTable};
use crate::engine::{Move, Position, SearchError, SearchOutcome, SearchStats, Searcher};
use std::sync::Arc;
use std::time::Instant;

/// Negamax over alternating player turns and dice rolls, memoized in a
/// transposition table owned by the engine for the whole session.
pub struct NegamaxEngine<P: Position> {
    config: Arc<EngineConfig>,
    tt: TranspositionTable<P::Key>,
    nodes_searched: u64,
    tt_hits: u64,
}

impl<P: Position> NegamaxEngine<P> {
    pub fn new(config: Arc<EngineConfig>) -> Self {
        Self::with_table(config, TranspositionTable::new())
    }

    pub const fn with_table(config: Arc<EngineConfig>, tt: TranspositionTable<P::Key>) -> Self {
        Self {
            config,
            tt,
            nodes_searched: 0,
            tt_hits: 0,
        }
    }

    pub fn update_config(&mut self, config: Arc<EngineConfig>) {
        self.config = config;
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub const fn table(&self) -> &TranspositionTable<P::Key> {
        &self.tt
    }

    pub fn table_mut(&mut self) -> &mut TranspositionTable<P::Key> {
        &mut self.tt
    }

    pub fn into_table(self) -> TranspositionTable<P::Key> {
        self.tt
    }

    /// Nodes visited since the last `select_move` started.
    pub const fn nodes_searched(&self) -> u64 {
        self.nodes_searched
    }

    /// Value of `position` for `player`. The opponent's value is the
    /// negation.
    ///
    /// A table entry only short-circuits the call when it is deep enough and
    /// either exact or a bound that already falls outside the window; it
    /// never narrows the window otherwise.
    pub fn negamax(
        &mut self,
        position: &P,
        mut alpha: f64,
        beta: f64,
        depth: u8,
        player: P::Player,
    ) -> Result<f64, SearchError> {
        self.nodes_searched += 1;
        let alpha_original = alpha;

        // TT Probe
        let key = self.config.use_transposition_table.then(|| position.encode());
        if let Some(entry) = key.as_ref().and_then(|k| self.tt.probe(k)) {
            if entry.depth >= depth {
                let resolved = match entry.flag {
                    TTFlag::Exact => true,
                    TTFlag::LowerBound => entry.value >= beta,
                    TTFlag::UpperBound => entry.value <= alpha,
                };
                if resolved {
                    self.tt_hits += 1;
                    return Ok(entry.value);
                }
            }
        }

        if depth == 0 || position.is_terminal() {
            return Ok(position.heuristic_score(player));
        }

        let opponent = P::opponent(player);
        let mut best = f64::NEG_INFINITY;
        let mut expanded = false;

        for outcome in position.chance_expansion() {
            if outcome.columns.is_empty() {
                continue;
            }

            let mut total = 0.0;
            for &column in &outcome.columns {
                let mut child = position.clone();
                child.set_pending_dice_value(outcome.dice_value);
                if !child.apply_move(column) {
                    return Err(SearchError::IllegalMove { column });
                }
                total -= self.negamax(&child, -beta, -alpha, depth - 1, opponent)?;
            }
            #[allow(clippy::cast_precision_loss)]
            let outcome_value = total / outcome.columns.len() as f64;
            expanded = true;

            best = best.max(outcome_value);
            alpha = alpha.max(best);
            if alpha >= beta {
                break;
            }
        }

        // Live position with no open column under any roll (possible for
        // adapters whose game does not end on a full board): score as a leaf.
        if !expanded {
            return Ok(position.heuristic_score(player));
        }

        if let Some(key) = key {
            let flag = if best <= alpha_original {
                TTFlag::UpperBound
            } else if best >= beta {
                TTFlag::LowerBound
            } else {
                TTFlag::Exact
            };
            self.tt.store(
                key,
                TTEntry {
                    value: best,
                    flag,
                    depth,
                },
            );
        }

        Ok(best)
    }
}

impl<P: Position> Searcher<P> for NegamaxEngine<P> {
    /// Tries every open column with the position's own pending die and keeps
    /// the one leaving the opponent the lowest value. Ties go to the lowest
    /// column.
    fn select_move(&mut self, position: &P, depth: u8) -> Result<SearchOutcome, SearchError> {
        self.nodes_searched = 0;
        self.tt_hits = 0;
        let start = Instant::now();

        if position.is_terminal() {
            return Err(SearchError::NoLegalMoves);
        }

        let mut best: Option<(usize, f64)> = None;
        for column in position.legal_columns(position.current_player()) {
            let mut child = position.clone();
            if !child.apply_move(column) {
                return Err(SearchError::IllegalMove { column });
            }
            let value = self.negamax(
                &child,
                f64::NEG_INFINITY,
                f64::INFINITY,
                depth,
                child.current_player(),
            )?;
            log::trace!("column {column}: opponent value {value:.3}");

            if !best.is_some_and(|(_, best_value)| value >= best_value) {
                best = Some((column, value));
            }
        }

        let (column, value) = best.ok_or(SearchError::NoLegalMoves)?;
        #[allow(clippy::cast_possible_truncation)]
        let time_ms = start.elapsed().as_millis() as u64;
        let stats = SearchStats {
            depth,
            nodes: self.nodes_searched,
            tt_hits: self.tt_hits,
            time_ms,
        };
        log::debug!(
            "selected column {column} (score {:.3}) depth={} nodes={} tt_hits={} tt_size={} time={}ms",
            -value,
            stats.depth,
            stats.nodes,
            stats.tt_hits,
            self.tt.len(),
            stats.time_ms
        );

        Ok(SearchOutcome {
            best_move: Move { column },
            score: -value,
            stats,
        })
    }
}

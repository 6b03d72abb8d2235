use crate::engine::{ChanceOutcome, Position};
use crate::logic::board::{Board, Player};
use crate::logic::rules::{GameRules, MoveError};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Exact transposition key for a [`Game`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GameKey(pub Vec<u8>);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    Playing,
    Won(Player),
    Draw,
}

#[derive(Debug, Clone)]
pub struct Game {
    rules: GameRules,
    boards: [Board; 2],
    dice_value: u8,
    turn: Player,
    rng: StdRng,
}

impl Game {
    /// # Panics
    /// If `rules.max_dice_value` is 0.
    #[must_use]
    pub fn new(rules: GameRules) -> Self {
        Self::with_rng(rules, StdRng::from_entropy())
    }

    /// A game whose every roll is reproducible from `seed`.
    #[must_use]
    pub fn with_seed(rules: GameRules, seed: u64) -> Self {
        Self::with_rng(rules, StdRng::seed_from_u64(seed))
    }

    fn with_rng(rules: GameRules, mut rng: StdRng) -> Self {
        let dice_value = rng.gen_range(rules.dice_values());
        Self {
            boards: [
                Board::new(rules.columns, rules.rows),
                Board::new(rules.columns, rules.rows),
            ],
            rules,
            dice_value,
            turn: Player::First,
            rng,
        }
    }

    pub const fn rules(&self) -> &GameRules {
        &self.rules
    }

    pub const fn turn(&self) -> Player {
        self.turn
    }

    pub const fn dice_value(&self) -> u8 {
        self.dice_value
    }

    pub fn set_dice_value(&mut self, value: u8) {
        self.dice_value = value;
    }

    // `Player::index` is 0 or 1, always in bounds for `boards`.
    #[allow(clippy::indexing_slicing)]
    pub const fn board(&self, player: Player) -> &Board {
        &self.boards[player.index()]
    }

    #[allow(clippy::indexing_slicing)]
    fn board_mut(&mut self, player: Player) -> &mut Board {
        &mut self.boards[player.index()]
    }

    pub fn score(&self, player: Player) -> u32 {
        self.board(player).score()
    }

    pub fn available_columns(&self, player: Player) -> Vec<usize> {
        self.board(player).open_columns()
    }

    /// The game ends as soon as either board is full.
    pub fn is_game_over(&self) -> bool {
        self.boards.iter().any(Board::is_full)
    }

    pub fn status(&self) -> GameStatus {
        if !self.is_game_over() {
            return GameStatus::Playing;
        }
        let first = self.score(Player::First);
        let second = self.score(Player::Second);
        match first.cmp(&second) {
            std::cmp::Ordering::Greater => GameStatus::Won(Player::First),
            std::cmp::Ordering::Less => GameStatus::Won(Player::Second),
            std::cmp::Ordering::Equal => GameStatus::Draw,
        }
    }

    pub fn winner(&self) -> Option<Player> {
        match self.status() {
            GameStatus::Won(player) => Some(player),
            GameStatus::Playing | GameStatus::Draw => None,
        }
    }

    /// Places the pending die for the player to move, knocks the same value
    /// out of the opponent's matching column, then passes the turn and rolls.
    pub fn make_move(&mut self, column: usize) -> Result<(), MoveError> {
        if self.is_game_over() {
            return Err(MoveError::GameOver);
        }

        let turn = self.turn;
        let value = self.dice_value;
        self.board_mut(turn).place(column, value)?;
        self.board_mut(turn.opposite()).knock_out(column, value);

        self.turn = turn.opposite();
        self.dice_value = self.rng.gen_range(self.rules.dice_values());
        Ok(())
    }

    pub fn render(&self, player: Player) -> String {
        self.board(player).render()
    }
}

impl Position for Game {
    type Player = Player;
    type Key = GameKey;

    fn opponent(player: Player) -> Player {
        player.opposite()
    }

    fn current_player(&self) -> Player {
        self.turn
    }

    fn pending_dice_value(&self) -> u8 {
        self.dice_value
    }

    fn set_pending_dice_value(&mut self, value: u8) {
        self.set_dice_value(value);
    }

    fn legal_columns(&self, player: Player) -> Vec<usize> {
        self.available_columns(player)
    }

    fn chance_expansion(&self) -> Vec<ChanceOutcome> {
        let columns = self.available_columns(self.turn);
        if columns.is_empty() {
            return Vec::new();
        }
        self.rules
            .dice_values()
            .map(|dice_value| ChanceOutcome {
                dice_value,
                columns: columns.clone(),
            })
            .collect()
    }

    fn apply_move(&mut self, column: usize) -> bool {
        self.make_move(column).is_ok()
    }

    fn is_terminal(&self) -> bool {
        self.is_game_over()
    }

    fn heuristic_score(&self, player: Player) -> f64 {
        f64::from(self.score(player)) - f64::from(self.score(player.opposite()))
    }

    /// Starts with the board shape and die range, so games played under
    /// different rules never share entries in one table.
    fn encode(&self) -> GameKey {
        let mut bytes = Vec::with_capacity(2 * self.rules.columns * (self.rules.rows + 1) + 19);
        for dim in [self.rules.columns, self.rules.rows] {
            let dim = u64::try_from(dim).unwrap_or(u64::MAX);
            bytes.extend_from_slice(&dim.to_le_bytes());
        }
        bytes.push(self.rules.max_dice_value);
        #[allow(clippy::cast_possible_truncation)]
        bytes.push(self.turn.index() as u8);
        bytes.push(self.dice_value);
        for board in &self.boards {
            board.encode_into(&mut bytes);
        }
        GameKey(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules() -> GameRules {
        GameRules::default()
    }

    #[test]
    fn test_new_game_rolls_in_range() {
        for seed in 0..32 {
            let game = Game::with_seed(rules(), seed);
            assert!((1..=6).contains(&game.dice_value()));
            assert_eq!(game.turn(), Player::First);
            assert_eq!(game.status(), GameStatus::Playing);
        }
    }

    #[test]
    fn test_seeded_games_roll_identically() {
        let mut a = Game::with_seed(rules(), 7);
        let mut b = Game::with_seed(rules(), 7);
        for column in [0, 1, 2, 0, 1] {
            assert_eq!(a.dice_value(), b.dice_value());
            a.make_move(column).unwrap();
            b.make_move(column).unwrap();
        }
        assert_eq!(a.encode(), b.encode());
    }

    #[test]
    fn test_make_move_knocks_out_opponent() {
        let mut game = Game::with_seed(rules(), 1);
        game.set_dice_value(4);
        game.make_move(1).unwrap();
        assert_eq!(game.turn(), Player::Second);

        game.set_dice_value(4);
        game.make_move(1).unwrap();

        assert_eq!(game.board(Player::First).column(1), Some(&[][..]));
        assert_eq!(game.board(Player::Second).column(1), Some(&[4][..]));
        assert_eq!(game.turn(), Player::First);
    }

    #[test]
    fn test_make_move_rejects_full_column() {
        let rules = GameRules {
            columns: 2,
            rows: 1,
            max_dice_value: 6,
        };
        let mut game = Game::with_seed(rules, 3);
        game.set_dice_value(2);
        game.make_move(0).unwrap();
        game.set_dice_value(3);
        game.make_move(0).unwrap();

        // First player's column 0 is full now.
        assert_eq!(game.make_move(0), Err(MoveError::ColumnFull));
        assert_eq!(game.make_move(5), Err(MoveError::ColumnOutOfRange));
        assert!(!game.apply_move(0));
        assert_eq!(game.turn(), Player::First);
    }

    #[test]
    fn test_game_over_when_one_board_full() {
        let rules = GameRules {
            columns: 1,
            rows: 1,
            max_dice_value: 6,
        };
        let mut game = Game::with_seed(rules, 11);
        game.set_dice_value(5);
        game.make_move(0).unwrap();

        assert!(game.is_game_over());
        assert!(game.is_terminal());
        assert_eq!(game.winner(), Some(Player::First));
        assert_eq!(game.make_move(0), Err(MoveError::GameOver));
    }

    #[test]
    fn test_chance_expansion_covers_every_die() {
        let game = Game::with_seed(rules(), 5);
        let outcomes = game.chance_expansion();
        let values: Vec<u8> = outcomes.iter().map(|o| o.dice_value).collect();
        assert_eq!(values, vec![1, 2, 3, 4, 5, 6]);
        for outcome in &outcomes {
            assert_eq!(outcome.columns, vec![0, 1, 2]);
        }
    }

    #[test]
    fn test_heuristic_is_zero_sum() {
        let mut game = Game::with_seed(rules(), 9);
        for column in [0, 2, 1, 1, 0] {
            game.make_move(column).unwrap();
            let first = game.heuristic_score(Player::First);
            let second = game.heuristic_score(Player::Second);
            assert!((first + second).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn test_encode_ignores_placement_order() {
        let mut a = Game::with_seed(rules(), 2);
        a.set_dice_value(3);
        a.make_move(0).unwrap();
        a.set_dice_value(1);
        a.make_move(2).unwrap();
        a.set_dice_value(5);
        a.make_move(0).unwrap();

        let mut b = Game::with_seed(rules(), 2);
        b.set_dice_value(5);
        b.make_move(0).unwrap();
        b.set_dice_value(1);
        b.make_move(2).unwrap();
        b.set_dice_value(3);
        b.make_move(0).unwrap();

        a.set_dice_value(6);
        b.set_dice_value(6);
        assert_eq!(a.encode(), b.encode());

        b.set_dice_value(2);
        assert_ne!(a.encode(), b.encode());
    }

    #[test]
    fn test_encode_distinguishes_rules() {
        let shape = |rows, max_dice_value| GameRules {
            columns: 2,
            rows,
            max_dice_value,
        };
        let play = |rules| {
            let mut game = Game::with_seed(rules, 6);
            game.set_dice_value(3);
            game.make_move(0).unwrap();
            game.set_dice_value(2);
            game
        };

        let short = play(shape(1, 6));
        let tall = play(shape(3, 6));
        let wide_die = play(shape(3, 8));
        assert_ne!(short.encode(), tall.encode());
        assert_ne!(tall.encode(), wide_die.encode());
        assert_eq!(tall.encode(), play(shape(3, 6)).encode());
    }

    #[test]
    fn test_encode_distinguishes_boards() {
        let mut a = Game::with_seed(rules(), 4);
        let mut b = a.clone();
        a.set_dice_value(2);
        a.make_move(0).unwrap();
        b.set_dice_value(2);
        b.make_move(1).unwrap();
        a.set_dice_value(1);
        b.set_dice_value(1);
        assert_ne!(a.encode(), b.encode());
    }
}

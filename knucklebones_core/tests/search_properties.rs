use knucklebones_core::engine::config::EngineConfig;
use knucklebones_core::engine::search::NegamaxEngine;
use knucklebones_core::engine::tt::TranspositionTable;
use knucklebones_core::engine::{Position, Searcher};
use knucklebones_core::logic::board::Player;
use knucklebones_core::logic::game::{Game, GameKey};
use knucklebones_core::logic::rules::GameRules;
use std::sync::Arc;

fn config(use_tt: bool) -> Arc<EngineConfig> {
    Arc::new(EngineConfig {
        use_transposition_table: use_tt,
        ..EngineConfig::default()
    })
}

#[test]
fn test_three_by_three_opening_depth_one() {
    let mut game = Game::with_seed(GameRules::default(), 123);
    game.set_dice_value(6);
    assert_eq!(game.current_player(), Player::First);

    let mut engine: NegamaxEngine<Game> = NegamaxEngine::new(config(false));
    let first = engine.select_move(&game, 1).expect("legal move");
    let second = engine.select_move(&game, 1).expect("legal move");

    assert!([0, 1, 2].contains(&first.best_move.column));
    assert!(first.score.is_finite());
    assert_eq!(first.best_move, second.best_move);
    assert!((first.score - second.score).abs() < f64::EPSILON);
}

#[test]
fn test_chance_expansion_is_exhaustive() {
    for max_dice_value in [1, 4, 6, 8] {
        let rules = GameRules {
            max_dice_value,
            ..GameRules::default()
        };
        let game = Game::with_seed(rules, 99);
        let values: Vec<u8> = game
            .chance_expansion()
            .iter()
            .map(|outcome| outcome.dice_value)
            .collect();
        let expected: Vec<u8> = (1..=max_dice_value).collect();
        assert_eq!(values, expected);
    }
}

#[test]
fn test_selected_column_is_always_legal() {
    let mut engine: NegamaxEngine<Game> = NegamaxEngine::new(config(true));
    for seed in 0..4 {
        let mut game = Game::with_seed(GameRules::default(), seed);
        while !game.is_game_over() {
            let legal = game.legal_columns(game.current_player());
            let outcome = engine.select_move(&game, 1).expect("legal move");
            assert!(legal.contains(&outcome.best_move.column));
            game.make_move(outcome.best_move.column).expect("legal move");
        }
    }
}

#[test]
fn test_heuristic_is_symmetric_through_a_game() {
    let mut game = Game::with_seed(GameRules::default(), 5);
    let mut column = 0;
    while !game.is_game_over() {
        let a = game.heuristic_score(Player::First);
        let b = game.heuristic_score(Player::Second);
        assert!((a + b).abs() < f64::EPSILON);

        let open = game.legal_columns(game.current_player());
        column = (column + 1) % 3;
        let pick = if open.contains(&column) {
            column
        } else {
            *open.first().expect("open column")
        };
        game.make_move(pick).expect("open column");
    }
}

#[test]
fn test_table_survives_a_session_round_trip() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("tt.json");

    let mut game = Game::with_seed(GameRules::default(), 77);
    game.set_dice_value(3);

    let loaded: TranspositionTable<GameKey> =
        TranspositionTable::load(&path).expect("missing file loads empty");
    assert!(loaded.is_empty());

    let mut engine: NegamaxEngine<Game> =
        NegamaxEngine::with_table(config(true), loaded);
    let before = engine.select_move(&game, 2).expect("legal move");
    let table = engine.into_table();
    table.save(&path).expect("save");

    let reloaded: TranspositionTable<GameKey> = TranspositionTable::load(&path).expect("load");
    assert_eq!(reloaded.len(), table.len());
    for (key, entry) in table.iter() {
        assert_eq!(reloaded.probe(key), Some(*entry));
    }

    // A warm table answers the same question without re-searching the tree.
    let mut engine: NegamaxEngine<Game> =
        NegamaxEngine::with_table(config(true), reloaded);
    let after = engine.select_move(&game, 2).expect("legal move");
    assert_eq!(after.best_move, before.best_move);
    assert!((after.score - before.score).abs() < 1e-9);
    assert!(after.stats.tt_hits > 0);
    assert!(after.stats.nodes < before.stats.nodes);
}

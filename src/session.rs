use knucklebones_core::engine::config::EngineConfig;
use knucklebones_core::engine::search::NegamaxEngine;
use knucklebones_core::engine::tt::TranspositionTable;
use knucklebones_core::engine::{SearchOutcome, Searcher};
use knucklebones_core::logic::board::Player;
use knucklebones_core::logic::game::{Game, GameKey, GameStatus};
use knucklebones_core::worker::{Output, SearchWorker};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::error::Error;
use std::io::{BufRead, Write};
use std::sync::Arc;
use std::time::Duration;

type SessionResult = Result<(), Box<dyn Error>>;

fn new_game(config: &EngineConfig, seed: Option<u64>) -> Game {
    seed.map_or_else(
        || Game::new(config.rules),
        |seed| Game::with_seed(config.rules, seed),
    )
}

fn session_rng(seed: Option<u64>) -> StdRng {
    // Offset so the session's choices don't mirror the game's dice.
    seed.map_or_else(StdRng::from_entropy, |seed| {
        StdRng::seed_from_u64(seed.wrapping_add(1))
    })
}

fn load_table(config: &EngineConfig) -> Result<TranspositionTable<GameKey>, Box<dyn Error>> {
    if !config.use_transposition_table {
        return Ok(TranspositionTable::new());
    }
    Ok(TranspositionTable::load(&config.tt_path)?)
}

fn save_table(config: &EngineConfig, table: &TranspositionTable<GameKey>) -> SessionResult {
    if config.use_transposition_table {
        table.save(&config.tt_path)?;
    }
    Ok(())
}

fn print_boards(game: &Game) {
    for player in [Player::First, Player::Second] {
        print!("{}", game.render(player));
        println!(
            "Number of dice: {}, Score: {}\n",
            game.board(player).dice_count(),
            game.score(player)
        );
    }
}

fn print_result(game: &Game, turns: usize) {
    println!("Game over after {turns} turns");
    match game.status() {
        GameStatus::Won(player) => println!("{player:?} wins"),
        GameStatus::Draw => println!("Draw"),
        GameStatus::Playing => {}
    }
}

pub fn run_random_game(config: &EngineConfig, seed: Option<u64>) -> SessionResult {
    let mut game = new_game(config, seed);
    let mut rng = session_rng(seed);
    let mut turns = 0;

    while !game.is_game_over() {
        let open = game.available_columns(game.turn());
        let Some(&column) = open.choose(&mut rng) else {
            break;
        };
        println!(
            "Current player: {:?}, dice: {}, column: {column}",
            game.turn(),
            game.dice_value()
        );
        game.make_move(column)?;
        turns += 1;
        print_boards(&game);
    }

    print_result(&game, turns);
    Ok(())
}

pub fn run_selfplay(config: &EngineConfig, seed: Option<u64>) -> SessionResult {
    let mut game = new_game(config, seed);
    let table = load_table(config)?;
    let mut engine: NegamaxEngine<Game> =
        NegamaxEngine::with_table(Arc::new(config.clone()), table);
    let mut turns = 0;

    while !game.is_game_over() {
        let SearchOutcome {
            best_move, score, ..
        } = engine.select_move(&game, config.depth)?;
        println!(
            "Current player: {:?}, dice: {}, best move: {}, score: {score:.2}",
            game.turn(),
            game.dice_value(),
            best_move.column
        );
        game.make_move(best_move.column)?;
        turns += 1;
        print_boards(&game);
    }

    print_result(&game, turns);
    save_table(config, engine.table())
}

fn read_human_column(game: &Game) -> Result<Option<usize>, Box<dyn Error>> {
    let stdin = std::io::stdin();
    loop {
        print!("Dice {}. Enter your column: ", game.dice_value());
        std::io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            return Ok(None);
        }
        match line.trim().parse::<usize>() {
            Ok(column) if game.available_columns(game.turn()).contains(&column) => {
                return Ok(Some(column));
            }
            _ => println!("Invalid move"),
        }
    }
}

/// Hands a copy of the game to the worker and polls until it answers.
fn engine_column(
    worker: &mut SearchWorker<Game>,
    game: &Game,
    depth: u8,
) -> Result<SearchOutcome, Box<dyn Error>> {
    let ticket = worker.compute_move(game, depth)?;
    print!("Thinking");
    loop {
        match worker.try_recv()? {
            Some(Output::MoveFound { ticket: t, outcome }) if t == ticket => {
                println!();
                return Ok(outcome);
            }
            Some(Output::Failed { ticket: t, error }) if t == ticket => {
                println!();
                return Err(error.into());
            }
            Some(stale) => tracing::warn!(ticket = stale.ticket(), "discarding stale reply"),
            None => {
                print!(".");
                std::io::stdout().flush()?;
                std::thread::sleep(Duration::from_millis(100));
            }
        }
    }
}

pub fn play_against_engine(config: &EngineConfig, seed: Option<u64>) -> SessionResult {
    let mut game = new_game(config, seed);
    let mut rng = session_rng(seed);
    let human = if rng.gen_bool(0.5) {
        Player::First
    } else {
        Player::Second
    };
    println!("You are {human:?}");

    let table = load_table(config)?;
    let engine: NegamaxEngine<Game> = NegamaxEngine::with_table(Arc::new(config.clone()), table);
    let mut worker = SearchWorker::spawn(engine)?;
    let mut turns = 0;

    while !game.is_game_over() {
        print!("{}", game.render(Player::First));
        println!("-----");
        print!("{}", game.render(Player::Second));

        let column = if game.turn() == human {
            match read_human_column(&game)? {
                Some(column) => column,
                None => {
                    tracing::info!("input closed, leaving the game");
                    break;
                }
            }
        } else {
            let outcome = engine_column(&mut worker, &game, config.depth)?;
            println!(
                "Engine plays {} with dice {} (score {:.2})",
                outcome.best_move.column,
                game.dice_value(),
                outcome.score
            );
            outcome.best_move.column
        };

        game.make_move(column)?;
        turns += 1;
    }

    print_boards(&game);
    print_result(&game, turns);

    let engine = worker.shutdown()?;
    save_table(config, engine.table())
}

//! Backgammon self-play
//!
//! Plays random matches through the engine and prints a summary. Useful for
//! soak-testing the rules with a fixed seed.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use rust_backgammon::{
    Backgammon, GameEndReason, GameRng, Playout, PlayoutConfig, RulesConfig, Side, WinClass,
};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Random self-play of backgammon matches.
#[derive(Parser, Debug)]
#[command(name = "bg-selfplay", version, about)]
struct Args {
    /// RNG seed; the same seed replays the same matches. Random if unset.
    #[arg(long)]
    seed: Option<u64>,

    /// Match length in points (0 for money play).
    #[arg(long, default_value_t = 5)]
    length: u32,

    /// Number of matches to play.
    #[arg(long, default_value_t = 10)]
    matches: u32,

    /// Games per money session.
    #[arg(long, default_value_t = 10)]
    money_games: u32,

    /// TOML file with optional rules.
    #[arg(long)]
    rules: Option<PathBuf>,

    /// Chance the side on turn doubles when allowed.
    #[arg(long, default_value_t = 0.1)]
    double_probability: f64,

    /// Chance an offered double is taken.
    #[arg(long, default_value_t = 0.8)]
    take_probability: f64,

    /// Chance a take is made as a beaver.
    #[arg(long, default_value_t = 0.0)]
    beaver_probability: f64,
}

#[derive(Default)]
struct Tally {
    wins: [u32; 2],
    games: u32,
    gammons: u32,
    backgammons: u32,
    declined: u32,
    crawford_games: u32,
    max_cube: u32,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let args = Args::parse();
    debug!(?args, "parsed arguments");

    let rules = match &args.rules {
        Some(path) => {
            let source = std::fs::read_to_string(path)
                .with_context(|| format!("reading rules from {}", path.display()))?;
            RulesConfig::from_toml_str(&source)?
        }
        None => RulesConfig::default(),
    };
    let engine = Backgammon::new(rules)?;

    let config = PlayoutConfig::default()
        .with_double_probability(args.double_probability)
        .with_take_probability(args.take_probability)
        .with_beaver_probability(args.beaver_probability)
        .with_max_games(if args.length == 0 { args.money_games } else { 0 });
    let playout = Playout::new(&engine).with_config(config);

    let mut rng = args.seed.map_or_else(GameRng::from_entropy, GameRng::new);
    let mut tally = Tally::default();
    let start = Instant::now();

    for n in 0..args.matches {
        let state = if args.length == 0 {
            engine.start_money_session()
        } else {
            engine.start_new_match(args.length)?
        };
        let report = playout
            .play_match(&state, &mut rng)
            .with_context(|| format!("match {n} failed"))?;

        for result in &report.results {
            tally.games += 1;
            match result.class {
                WinClass::Gammon => tally.gammons += 1,
                WinClass::Backgammon => tally.backgammons += 1,
                WinClass::Normal => {}
            }
            if result.reason == GameEndReason::DoubleDeclined {
                tally.declined += 1;
            }
        }
        tally.crawford_games += report.crawford_games;
        tally.max_cube = tally.max_cube.max(report.max_cube);

        let scores = report.final_state.match_state();
        let leader = if scores.score(Side::White) >= scores.score(Side::Black) {
            Side::White
        } else {
            Side::Black
        };
        let winner = scores.match_winner().unwrap_or(leader);
        tally.wins[winner.index()] += 1;
        info!(
            n,
            %winner,
            white = scores.score(Side::White),
            black = scores.score(Side::Black),
            games = report.results.len(),
            "match finished"
        );
    }

    let elapsed = start.elapsed().as_secs_f64();
    println!("Backgammon self-play");
    println!("====================");
    println!("Seed: {}", rng.seed());
    if args.length == 0 {
        println!("Mode: money play, {} games per session", args.money_games);
    } else {
        println!("Mode: {}-point matches", args.length);
    }
    println!("Matches: {}  Games: {}", args.matches, tally.games);
    println!(
        "White won {}  Black won {}",
        tally.wins[Side::White.index()],
        tally.wins[Side::Black.index()]
    );
    println!(
        "Gammons: {}  Backgammons: {}  Declined doubles: {}",
        tally.gammons, tally.backgammons, tally.declined
    );
    println!(
        "Crawford games: {}  Highest cube: {}",
        tally.crawford_games, tally.max_cube
    );
    println!("Elapsed: {elapsed:.2}s");

    Ok(())
}

//! sim-runner: headless batch simulator for the Fairway wagering game.
//!
//! Usage:
//!   sim-runner --rounds 100000 --seed 42 --out exports/golf_normal
//!   sim-runner --one-round --seed 7
//!   sim-runner --course course.json --rounds 500000 --cost-multiplier 100

use anyhow::Result;
use fairway_core::{
    config, export::ExportOptions, play_round, simulate_to_bundle, SymbolTable,
};
use std::env;
use std::path::Path;

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let rounds = parse_arg(&args, "--rounds", 100_000u64);
    let bet = parse_arg(&args, "--bet", 1.0f64);
    let seed = parse_opt_arg::<u64>(&args, "--seed");
    let one_round = args.iter().any(|a| a == "--one-round");
    let mode = args
        .windows(2)
        .find(|w| w[0] == "--mode")
        .map(|w| w[1].as_str())
        .unwrap_or("normal");
    let cost_multiplier = parse_arg(&args, "--cost-multiplier", 1u64);
    let out = args
        .windows(2)
        .find(|w| w[0] == "--out")
        .map(|w| w[1].as_str())
        .unwrap_or("exports/golf_normal");
    let course = args.windows(2).find(|w| w[0] == "--course").map(|w| w[1].as_str());

    let table = match course {
        Some(path) => {
            log::info!("loading course from {path}");
            config::load_course(path)?
        }
        None => SymbolTable::default_course(),
    };

    if one_round {
        return print_one_round(&table, bet, seed.unwrap_or(42));
    }

    println!("Fairway — sim-runner");
    println!("  rounds:          {rounds}");
    println!("  bet:             {bet}");
    match seed {
        Some(s) => println!("  seed:            {s}"),
        None => println!("  seed:            (entropy — not reproducible)"),
    }
    println!("  out prefix:      {out}");
    println!();

    let options = ExportOptions {
        mode: mode.to_string(),
        cost_multiplier,
        ..ExportOptions::default()
    };
    let (aggregation, bundle) =
        simulate_to_bundle(&table, rounds, bet, seed, Path::new(out), &options)?;

    println!("=== RUN SUMMARY ===");
    println!("  rounds:          {}", aggregation.total_rounds);
    println!("  unique outcomes: {}", aggregation.records.len());
    println!("  total bet:       {:.2}", aggregation.total_bet);
    println!("  total win:       {:.2}", aggregation.total_win_cents as f64 / 100.0);
    println!("  RTP:             {:.2}%", aggregation.rtp() * 100.0);
    println!();
    println!("  logic:  {}", bundle.logic.display());
    println!("  lookup: {}", bundle.lookup.display());
    println!("  index:  {}", bundle.index.display());

    Ok(())
}

fn print_one_round(table: &SymbolTable, bet: f64, seed: u64) -> Result<()> {
    let state = play_round(table, bet, seed);

    println!("One round (seed {seed}, bet {bet}):");
    for entry in state.book.events() {
        println!("  {}", serde_json::to_string(entry)?);
    }
    println!("Final running total: {} cents", state.running_total_win);
    println!("Path: {}", state.path());
    Ok(())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}

fn parse_opt_arg<T: std::str::FromStr>(args: &[String], flag: &str) -> Option<T> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
}

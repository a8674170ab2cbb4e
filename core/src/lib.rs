//! Fairway — a three-zone probabilistic wagering round, simulated in
//! batch to build the publish bundle a settlement engine consumes.
//!
//! Pipeline, strictly one-directional:
//!   SymbolTable → RoundEngine → Aggregator → Exporter
//!
//! This crate produces artifacts (event logs, lookup table, index
//! descriptor); it never decides or validates real-money settlement.

pub mod aggregate;
pub mod config;
pub mod error;
pub mod event;
pub mod export;
pub mod rng;
pub mod round;
pub mod symbol;
pub mod types;

pub use aggregate::{AggregateRecord, Aggregation, Aggregator};
pub use error::{SimError, SimResult};
pub use event::{Book, BookEvent, RoundEvent};
pub use export::{ExportOptions, ExportedBundle, SCALE};
pub use rng::RoundRng;
pub use round::{RoundEngine, RoundState};
pub use symbol::{Symbol, SymbolKind, SymbolTable};
pub use types::{Cents, RoundIndex, Zone, ZONE_COUNT};

use std::path::Path;

/// Play a single round with an explicit seed and return its completed
/// state (full event log plus final total). This is the unit the batch
/// entry point calls N times.
pub fn play_round(table: &SymbolTable, bet_amount: f64, seed: u64) -> RoundState {
    let engine = RoundEngine::new(table.clone());
    let mut rng = RoundRng::from_seed(seed);
    engine.play(bet_amount, &mut rng)
}

/// Simulate `rounds` rounds and write the aggregated publish bundle to
/// `prefix`. Returns the aggregation alongside the published paths.
pub fn simulate_to_bundle(
    table: &SymbolTable,
    rounds: u64,
    bet_amount: f64,
    base_seed: Option<u64>,
    prefix: &Path,
    options: &ExportOptions,
) -> SimResult<(Aggregation, ExportedBundle)> {
    let aggregator = Aggregator::new(RoundEngine::new(table.clone()));
    let aggregation = aggregator.simulate(rounds, bet_amount, base_seed)?;
    let bundle = export::export_bundle(&aggregation, prefix, options)?;
    Ok((aggregation, bundle))
}

//! Batch aggregation — run many rounds, dedup by outcome path.
//!
//! RULES:
//!   - Round i of a seeded batch uses seed base_seed + i. Reproducing a
//!     batch reproduces every round, id assignment included.
//!   - Rounds are embarrassingly parallel: each owns its state and its
//!     RNG. Each worker folds its contiguous chunk of round indices
//!     into a partial path→record map as rounds complete, so memory
//!     holds one record per unique path, never one log per round.
//!   - Partials merge in chunk (round-index) order, so first-seen id
//!     assignment never depends on worker arrival order.
//!   - A repeated path must repeat its payout. Paths are
//!     payout-deterministic; disagreement is an engine bug and aborts
//!     the batch rather than silently overwriting.

use crate::{
    error::{SimError, SimResult},
    rng::RoundRng,
    round::{RoundEngine, RoundState},
    types::{Cents, RoundIndex},
};
use rayon::prelude::*;
use std::collections::HashMap;

/// Rounds folded per worker chunk. Chunks are contiguous round-index
/// ranges, which is what keeps the merge order deterministic.
pub const FOLD_CHUNK: usize = 4096;

/// One canonical record per unique outcome path.
#[derive(Debug, Clone)]
pub struct AggregateRecord {
    /// Stable id ≥ 1, assigned in first-seen order. This ordering is an
    /// observable contract of the export format.
    pub id: u64,
    pub path: String,
    pub payout_cents: Cents,
    /// How many simulated rounds produced this path.
    pub weight: u64,
    /// The event log of the first round observed with this path.
    pub sample: RoundState,
}

/// The output of one aggregation run: deduped records in id order plus
/// the non-deduped scalar totals.
#[derive(Debug, Clone)]
pub struct Aggregation {
    pub records: Vec<AggregateRecord>,
    pub total_rounds: u64,
    pub total_bet: f64,
    pub total_win_cents: Cents,
}

impl Aggregation {
    /// Return-to-player ratio over the whole batch (not deduped).
    pub fn rtp(&self) -> f64 {
        if self.total_bet == 0.0 {
            return 0.0;
        }
        (self.total_win_cents as f64 / 100.0) / self.total_bet
    }

    /// Σ weight — must equal `total_rounds` for any batch.
    pub fn total_weight(&self) -> u64 {
        self.records.iter().map(|r| r.weight).sum()
    }
}

/// One worker's fold of a contiguous round-index range. Completed
/// rounds are observed and dropped; only first-seen samples survive.
struct Partial {
    records: Vec<PartialRecord>,
    by_path: HashMap<String, usize>,
    rounds: u64,
    total_bet: f64,
    total_win_cents: Cents,
}

struct PartialRecord {
    path: String,
    payout_cents: Cents,
    weight: u64,
    sample: RoundState,
    /// Global index of the first round observed with this path, for
    /// error context and the merge's ordering contract.
    first_round: RoundIndex,
}

impl Partial {
    fn new() -> Self {
        Self {
            records: Vec::new(),
            by_path: HashMap::new(),
            rounds: 0,
            total_bet: 0.0,
            total_win_cents: 0,
        }
    }

    /// Fold one completed round in, consuming it.
    fn observe(&mut self, state: RoundState, round_index: RoundIndex) -> SimResult<()> {
        self.rounds += 1;
        self.total_bet += state.bet_amount;
        self.total_win_cents += state.running_total_win;

        let path = state.path();
        match self.by_path.get(&path) {
            Some(&slot) => {
                let record = &mut self.records[slot];
                if record.payout_cents != state.running_total_win {
                    return Err(SimError::InvariantViolation {
                        path,
                        expected: record.payout_cents,
                        actual: state.running_total_win,
                        round: round_index,
                    });
                }
                record.weight += 1;
            }
            None => {
                self.by_path.insert(path.clone(), self.records.len());
                self.records.push(PartialRecord {
                    path,
                    payout_cents: state.running_total_win,
                    weight: 1,
                    sample: state,
                    first_round: round_index,
                });
            }
        }
        Ok(())
    }
}

/// Runs the round engine N times and folds the results.
pub struct Aggregator {
    engine: RoundEngine,
}

impl Aggregator {
    pub fn new(engine: RoundEngine) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &RoundEngine {
        &self.engine
    }

    /// Simulate `rounds` rounds. With a base seed the batch is fully
    /// reproducible; without one, each round gets an independent
    /// entropy-drawn seed (still one RNG per round — never shared).
    pub fn simulate(
        &self,
        rounds: u64,
        bet_amount: f64,
        base_seed: Option<u64>,
    ) -> SimResult<Aggregation> {
        let seeds: Vec<u64> = match base_seed {
            Some(base) => (0..rounds).map(|i| RoundRng::batch_seed(base, i)).collect(),
            None => (0..rounds).map(|_| rand::random()).collect(),
        };

        // Worker pool sized by rayon. Each chunk covers a contiguous
        // round-index range and folds its rounds as they complete;
        // collect keeps chunk order, which the merge relies on.
        let partials: Vec<Partial> = seeds
            .par_chunks(FOLD_CHUNK)
            .enumerate()
            .map(|(chunk_index, chunk)| {
                let start = (chunk_index * FOLD_CHUNK) as RoundIndex;
                let mut partial = Partial::new();
                for (offset, &seed) in chunk.iter().enumerate() {
                    let mut rng = RoundRng::from_seed(seed);
                    let state = self.engine.play(bet_amount, &mut rng);
                    partial.observe(state, start + offset as RoundIndex)?;
                }
                Ok(partial)
            })
            .collect::<SimResult<Vec<Partial>>>()?;

        merge(partials)
    }

    /// Fold completed rounds, in round-index order, into an
    /// aggregation. Tests feed this hand-built rounds; simulate() goes
    /// through the same observe/merge path per worker chunk.
    pub fn fold(&self, states: Vec<RoundState>) -> SimResult<Aggregation> {
        let mut partial = Partial::new();
        for (round_index, state) in states.into_iter().enumerate() {
            partial.observe(state, round_index as RoundIndex)?;
        }
        merge(vec![partial])
    }
}

/// Merge per-chunk partials into the global record list. Partials
/// arrive in round-index order and each partial's records are in its
/// own first-seen order, so walking them in sequence assigns ids in
/// global first-seen order.
fn merge(partials: Vec<Partial>) -> SimResult<Aggregation> {
    let mut records: Vec<AggregateRecord> = Vec::new();
    let mut by_path: HashMap<String, usize> = HashMap::new();
    let mut total_rounds = 0u64;
    let mut total_bet = 0.0;
    let mut total_win_cents: Cents = 0;

    for partial in partials {
        total_rounds += partial.rounds;
        total_bet += partial.total_bet;
        total_win_cents += partial.total_win_cents;

        for incoming in partial.records {
            match by_path.get(&incoming.path) {
                Some(&slot) => {
                    let record = &mut records[slot];
                    if record.payout_cents != incoming.payout_cents {
                        return Err(SimError::InvariantViolation {
                            path: incoming.path,
                            expected: record.payout_cents,
                            actual: incoming.payout_cents,
                            round: incoming.first_round,
                        });
                    }
                    record.weight += incoming.weight;
                }
                None => {
                    let id = records.len() as u64 + 1;
                    by_path.insert(incoming.path.clone(), records.len());
                    records.push(AggregateRecord {
                        id,
                        path: incoming.path,
                        payout_cents: incoming.payout_cents,
                        weight: incoming.weight,
                        sample: incoming.sample,
                    });
                }
            }
        }
    }

    log::debug!(
        "aggregated {} rounds into {} unique outcomes",
        total_rounds,
        records.len()
    );

    Ok(Aggregation {
        records,
        total_rounds,
        total_bet,
        total_win_cents,
    })
}

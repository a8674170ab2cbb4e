//! The round engine — one complete play from tee-off to termination.
//!
//! State progression is strictly forward:
//!   AwaitingZone1 → AwaitingZone2 → AwaitingZone3 → Ended
//! A terminal symbol (hard_end / soft_end / hole) ends the round where
//! it lands; zone 3 ends the round whatever it draws, because the zone
//! count is fixed at three.
//!
//! RULES:
//!   - All randomness comes from the caller-supplied RoundRng.
//!   - Every state change is recorded in the round's event book.
//!   - The last two events are always finalWin then gameEnd, and
//!     finalWin.amount equals the running total at halt.

use crate::{
    event::{Book, BookEvent, RoundEvent},
    rng::RoundRng,
    symbol::{Symbol, SymbolTable},
    types::{Cents, Zone, ZONE_COUNT},
};

/// The mutable state of one round in flight. Owned exclusively by a
/// single `RoundEngine::play` invocation; immutable once returned.
#[derive(Debug, Clone)]
pub struct RoundState {
    pub bet_amount: f64,
    /// Running win in integer cents, updated as hits apply.
    pub running_total_win: Cents,
    pub book: Book,
}

impl RoundState {
    fn new(bet_amount: f64) -> Self {
        Self {
            bet_amount,
            running_total_win: 0,
            book: Book::new(),
        }
    }

    fn push(&mut self, event: RoundEvent) {
        self.book.push(event);
    }

    /// The codes of the symbols hit, in zone order.
    pub fn hit_codes(&self) -> Vec<&str> {
        self.book
            .events()
            .iter()
            .filter_map(|BookEvent { event, .. }| match event {
                RoundEvent::HitResult { hit, .. } => Some(hit.as_str()),
                _ => None,
            })
            .collect()
    }

    /// The round's outcome path: hyphen-joined hit codes. Two rounds
    /// with the same path are economically identical.
    pub fn path(&self) -> String {
        self.hit_codes().join("-")
    }
}

/// Plays rounds against a fixed, validated symbol table.
pub struct RoundEngine {
    table: SymbolTable,
}

impl RoundEngine {
    pub fn new(table: SymbolTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &SymbolTable {
        &self.table
    }

    /// Play one round. The returned state's book always ends with
    /// finalWin then gameEnd.
    pub fn play(&self, bet_amount: f64, rng: &mut RoundRng) -> RoundState {
        let mut state = RoundState::new(bet_amount);

        state.push(RoundEvent::TeeOff {
            zone: 1,
            description: "Player tees off into Zone 1".into(),
        });

        for zone in 1..=ZONE_COUNT {
            if zone > 1 {
                state.push(RoundEvent::EnterZone {
                    zone,
                    description: format!("Ball enters Zone {zone}"),
                });
            }

            let symbol = self.table.pick(zone, rng);
            let terminal = apply_hit(&mut state, zone, symbol);

            if terminal && zone < ZONE_COUNT {
                finish(&mut state, format!("Ended at zone {zone} with {}", symbol.kind.name()));
                return state;
            }
            if zone == ZONE_COUNT {
                // Zone 3 ends the round regardless of the drawn kind.
                finish(
                    &mut state,
                    format!("Completed zones - last: {}", symbol.kind.name()),
                );
                return state;
            }
        }

        unreachable!("round loop always returns from zone 3")
    }
}

/// Apply one hit's effect to the running total and record the hit
/// event. Returns whether the hit is terminal.
///
/// Effects (integer cents; `award_cents` truncates `multiplier * 100`
/// toward zero):
///   payout    += award, continue
///   hole      += award, terminal
///   hard_end  := 0,     terminal
///   soft_end  unchanged, terminal
///   empty     unchanged, continue
fn apply_hit(state: &mut RoundState, zone: Zone, symbol: &Symbol) -> bool {
    use crate::symbol::SymbolKind::*;

    let terminal = match symbol.kind {
        Payout => {
            state.running_total_win += symbol.award_cents();
            false
        }
        Hole => {
            state.running_total_win += symbol.award_cents();
            true
        }
        HardEnd => {
            state.running_total_win = 0;
            true
        }
        SoftEnd => true,
        Empty => false,
    };

    state.push(RoundEvent::HitResult {
        zone,
        hit: symbol.code.clone(),
        hit_kind: symbol.kind,
        multiplier: symbol.multiplier,
        running_total_win: state.running_total_win,
        is_final: terminal,
    });

    terminal
}

fn finish(state: &mut RoundState, reason: String) {
    state.push(RoundEvent::FinalWin {
        amount: state.running_total_win,
    });
    state.push(RoundEvent::GameEnd {
        reason,
        running_total_win: state.running_total_win,
    });
}

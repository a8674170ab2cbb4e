//! Round events and the append-only event book.
//!
//! RULE: the book is the only record of a round. Every state change the
//! engine makes is visible as an event, and the book's append operation
//! is the only place an event index is ever assigned.
//!
//! Wire format: each event serializes as a JSON object with a `type`
//! tag drawn from the fixed enumeration
//! `{teeOff, enterZone, hitResult, finalWin, gameEnd, stateSnapshot}`.

use crate::{
    symbol::SymbolKind,
    types::{Cents, Zone},
};
use serde::{Deserialize, Serialize};

/// Every event a round can emit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum RoundEvent {
    /// Ball is placed and the first hit begins (zone 1).
    TeeOff {
        zone: Zone,
        description: String,
    },

    /// Ball moves into the next zone.
    EnterZone {
        zone: Zone,
        description: String,
    },

    /// Ball lands somewhere in a zone and produces a result. Carries the
    /// running total *after* this hit's effect has been applied.
    HitResult {
        zone: Zone,
        hit: String,
        hit_kind: SymbolKind,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        multiplier: Option<f64>,
        running_total_win: Cents,
        /// Present (true) only on the hit that ends the round early.
        #[serde(rename = "final", default, skip_serializing_if = "is_false")]
        is_final: bool,
    },

    /// Final payout amount in integer cents, for the settlement engine.
    FinalWin {
        amount: Cents,
    },

    /// Explicit termination marker with a human-readable reason.
    GameEnd {
        reason: String,
        running_total_win: Cents,
    },

    /// Debug-only snapshot of engine state. Part of the fixed `type`
    /// enumeration for inspection tooling; the engine never emits it.
    StateSnapshot {
        zone: Zone,
        running_total_win: Cents,
    },
}

fn is_false(b: &bool) -> bool {
    !b
}

impl RoundEvent {
    /// True on the hit event that terminates the round early.
    pub fn is_final_hit(&self) -> bool {
        matches!(self, Self::HitResult { is_final: true, .. })
    }
}

/// An event as it sits in a book: its position plus the event itself.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BookEvent {
    pub index: u32,
    #[serde(flatten)]
    pub event: RoundEvent,
}

/// The ordered, append-only event log of one round.
///
/// `push` re-derives the index from the current length; callers can
/// never supply or reuse an index.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct Book {
    events: Vec<BookEvent>,
}

impl Book {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event, stamping its index from the current log length.
    pub fn push(&mut self, event: RoundEvent) {
        let index = self.events.len() as u32;
        self.events.push(BookEvent { index, event });
    }

    pub fn events(&self) -> &[BookEvent] {
        &self.events
    }

    pub fn last(&self) -> Option<&BookEvent> {
        self.events.last()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_stamps_sequential_indices() {
        let mut book = Book::new();
        book.push(RoundEvent::TeeOff {
            zone: 1,
            description: "tee".into(),
        });
        book.push(RoundEvent::FinalWin { amount: 0 });
        let indices: Vec<u32> = book.events().iter().map(|e| e.index).collect();
        assert_eq!(indices, vec![0, 1]);
    }

    #[test]
    fn hit_result_wire_format() {
        let event = RoundEvent::HitResult {
            zone: 2,
            hit: "P5".into(),
            hit_kind: SymbolKind::Payout,
            multiplier: Some(2.5),
            running_total_win: 250,
            is_final: false,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "hitResult");
        assert_eq!(json["hitKind"], "payout");
        assert_eq!(json["runningTotalWin"], 250);
        // Non-final hits omit the flag entirely.
        assert!(json.get("final").is_none());
    }

    #[test]
    fn final_hit_carries_the_flag() {
        let event = RoundEvent::HitResult {
            zone: 1,
            hit: "H1".into(),
            hit_kind: SymbolKind::HardEnd,
            multiplier: None,
            running_total_win: 0,
            is_final: true,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["final"], true);
        assert!(json.get("multiplier").is_none());
    }

    #[test]
    fn state_snapshot_is_part_of_the_type_enumeration() {
        let event = RoundEvent::StateSnapshot {
            zone: 3,
            running_total_win: 600,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "stateSnapshot");
    }
}

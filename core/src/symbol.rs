//! Symbols and per-zone symbol tables.
//!
//! RULE: a zone's duplicate entries are the sole weighting mechanism.
//! Selection is a uniform index draw over the zone's sequence; there is
//! no separate probability field anywhere.

use crate::{
    error::{SimError, SimResult},
    rng::RoundRng,
    types::{Cents, Zone, ZONE_COUNT},
};
use serde::{Deserialize, Serialize};

/// What a drawn symbol does to the round.
/// Closed enumeration — effect application is an exhaustive match, so a
/// new kind is a compile-time extension point, not a silent no-op.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SymbolKind {
    Payout,
    Empty,
    SoftEnd,
    HardEnd,
    Hole,
}

impl SymbolKind {
    /// Terminal kinds end the round immediately wherever they are drawn.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::SoftEnd | Self::HardEnd | Self::Hole)
    }

    /// Only payout and hole symbols carry a multiplier.
    pub fn carries_multiplier(&self) -> bool {
        matches!(self, Self::Payout | Self::Hole)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Payout => "payout",
            Self::Empty => "empty",
            Self::SoftEnd => "soft_end",
            Self::HardEnd => "hard_end",
            Self::Hole => "hole",
        }
    }
}

/// One possible outcome within a zone. Immutable value.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Symbol {
    /// UI-friendly long name, e.g. "Bronze Bunker".
    pub name: String,
    /// Short identifier, e.g. "P1" / "H1" / "HO". Outcome paths are
    /// built from these.
    pub code: String,
    pub kind: SymbolKind,
    /// Payout multiplier, present only for payout/hole symbols.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multiplier: Option<f64>,
}

impl Symbol {
    pub fn payout(name: &str, code: &str, multiplier: f64) -> Self {
        Self {
            name: name.into(),
            code: code.into(),
            kind: SymbolKind::Payout,
            multiplier: Some(multiplier),
        }
    }

    pub fn hole(name: &str, code: &str, multiplier: f64) -> Self {
        Self {
            name: name.into(),
            code: code.into(),
            kind: SymbolKind::Hole,
            multiplier: Some(multiplier),
        }
    }

    pub fn soft_end(name: &str, code: &str) -> Self {
        Self {
            name: name.into(),
            code: code.into(),
            kind: SymbolKind::SoftEnd,
            multiplier: None,
        }
    }

    pub fn hard_end(name: &str, code: &str) -> Self {
        Self {
            name: name.into(),
            code: code.into(),
            kind: SymbolKind::HardEnd,
            multiplier: None,
        }
    }

    pub fn empty(name: &str, code: &str) -> Self {
        Self {
            name: name.into(),
            code: code.into(),
            kind: SymbolKind::Empty,
            multiplier: None,
        }
    }

    /// The cents this symbol awards on a hit: `multiplier * 100`,
    /// truncated toward zero. Truncation (not rounding) is load-bearing —
    /// it affects payout totals and must match the published tables.
    pub fn award_cents(&self) -> Cents {
        match self.multiplier {
            Some(m) => (m * 100.0) as Cents,
            None => 0,
        }
    }
}

/// The per-zone symbol populations for one game mode.
/// Process-wide immutable configuration: constructed once, validated at
/// load, read-only afterwards.
#[derive(Debug, Clone)]
pub struct SymbolTable {
    zones: [Vec<Symbol>; ZONE_COUNT as usize],
}

impl SymbolTable {
    /// Build a table from per-zone sequences, validating that every zone
    /// is non-empty and every payout/hole symbol carries a multiplier.
    /// Validation failures surface before any round executes.
    pub fn new(
        zone1: Vec<Symbol>,
        zone2: Vec<Symbol>,
        zone3: Vec<Symbol>,
    ) -> SimResult<Self> {
        let table = Self {
            zones: [zone1, zone2, zone3],
        };
        table.validate()?;
        Ok(table)
    }

    fn validate(&self) -> SimResult<()> {
        for (i, zone) in self.zones.iter().enumerate() {
            if zone.is_empty() {
                return Err(SimError::Configuration(format!(
                    "zone {} has no symbols",
                    i + 1
                )));
            }
            for symbol in zone {
                if symbol.kind.carries_multiplier() && symbol.multiplier.is_none() {
                    return Err(SimError::Configuration(format!(
                        "{} symbol '{}' in zone {} has no multiplier",
                        symbol.kind.name(),
                        symbol.code,
                        i + 1
                    )));
                }
            }
        }
        Ok(())
    }

    /// The symbol sequence for `zone` (1..=3).
    pub fn zone(&self, zone: Zone) -> &[Symbol] {
        assert!(
            (1..=ZONE_COUNT).contains(&zone),
            "zone {zone} out of range"
        );
        &self.zones[(zone - 1) as usize]
    }

    /// Uniform draw over the zone's sequence index range. Duplicate
    /// entries in the sequence are the weighting.
    pub fn pick(&self, zone: Zone, rng: &mut RoundRng) -> &Symbol {
        let symbols = self.zone(zone);
        let index = rng.next_u64_below(symbols.len() as u64) as usize;
        &symbols[index]
    }

    /// The built-in course: the default loadout shipped with the game.
    /// Values here are configuration, not engineering — they define the
    /// game mode's math, and changing them changes the published tables.
    pub fn default_course() -> Self {
        let p1 = Symbol::payout("Bronze Bunker", "P1", 1.2);
        let p2 = Symbol::payout("Silver Sands", "P2", 1.5);
        let p3 = Symbol::payout("Rusty Ridge", "P3", 1.8);
        let p4 = Symbol::payout("Copper Curve", "P4", 2.0);
        let p5 = Symbol::payout("Golden Fairway", "P5", 2.5);
        let p6 = Symbol::payout("Emerald Ridge", "P6", 3.0);
        let p7 = Symbol::payout("Diamond Sandpit", "P7", 3.5);
        let hole = Symbol::hole("Hole-in-One", "HO", 6.0);

        let s1 = Symbol::soft_end("Soft Bush", "S1");
        let s2 = Symbol::soft_end("Sticky Mud", "S2");
        let h1 = Symbol::hard_end("Deep Water Trap", "H1");
        let h2 = Symbol::hard_end("Broken Cliff", "H2");
        let h3 = Symbol::hard_end("Iron Wall", "H3");
        let h4 = Symbol::hard_end("Rocky Doom", "H4");
        let empty = Symbol::empty("Empty", "E1");

        let mut zone1 = vec![p1, p2, p3, p4, h1.clone(), h2.clone()];
        zone1.extend(std::iter::repeat(empty.clone()).take(9));

        let mut zone2 = vec![p5, p6, p7, s1.clone(), s2.clone(), h2.clone(), h3.clone()];
        zone2.extend(std::iter::repeat(empty).take(5));

        let zone3 = vec![hole, s1, s2, h1, h2, h3, h4];

        // The built-in loadout always validates.
        Self::new(zone1, zone2, zone3).expect("default course is valid")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn award_cents_truncates_toward_zero() {
        assert_eq!(Symbol::payout("x", "X", 1.8).award_cents(), 180);
        // Fractional cents are dropped, never rounded up.
        assert_eq!(Symbol::payout("y", "Y", 1.995).award_cents(), 199);
        assert_eq!(Symbol::payout("z", "Z", 0.999).award_cents(), 99);
    }

    #[test]
    fn empty_zone_is_a_configuration_error() {
        let err = SymbolTable::new(
            vec![],
            vec![Symbol::empty("Empty", "E1")],
            vec![Symbol::empty("Empty", "E1")],
        )
        .unwrap_err();
        assert!(matches!(err, SimError::Configuration(_)));
    }

    #[test]
    fn payout_without_multiplier_is_rejected() {
        let bad = Symbol {
            name: "Broken".into(),
            code: "P9".into(),
            kind: SymbolKind::Payout,
            multiplier: None,
        };
        let err = SymbolTable::new(
            vec![bad],
            vec![Symbol::empty("Empty", "E1")],
            vec![Symbol::empty("Empty", "E1")],
        )
        .unwrap_err();
        assert!(matches!(err, SimError::Configuration(_)));
    }

    #[test]
    fn default_course_zone_sizes() {
        let table = SymbolTable::default_course();
        assert_eq!(table.zone(1).len(), 15);
        assert_eq!(table.zone(2).len(), 12);
        assert_eq!(table.zone(3).len(), 7);
    }
}

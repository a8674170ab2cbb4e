//! Symbol table loading from JSON course files.
//!
//! A course file defines the three zone loadouts:
//!
//! ```json
//! {
//!   "zone1": [ {"name": "Bronze Bunker", "code": "P1",
//!               "kind": "payout", "multiplier": 1.2}, ... ],
//!   "zone2": [ ... ],
//!   "zone3": [ ... ]
//! }
//! ```
//!
//! Symbol values are configuration, not engineering: the loader only
//! checks structural validity (non-empty zones, multipliers present on
//! payout/hole symbols), never the math they encode.

use crate::{
    error::{SimError, SimResult},
    symbol::{Symbol, SymbolTable},
};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
struct CourseFile {
    zone1: Vec<Symbol>,
    zone2: Vec<Symbol>,
    zone3: Vec<Symbol>,
}

/// Load and validate a symbol table from a course JSON file.
pub fn load_course(path: &str) -> SimResult<SymbolTable> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        SimError::Configuration(format!("cannot read course file '{path}': {e}"))
    })?;
    parse_course(&content)
        .map_err(|e| match e {
            SimError::Serialization(inner) => SimError::Configuration(format!(
                "cannot parse course file '{path}': {inner}"
            )),
            other => other,
        })
}

/// Parse a course definition from a JSON string.
pub fn parse_course(content: &str) -> SimResult<SymbolTable> {
    let file: CourseFile = serde_json::from_str(content)?;
    SymbolTable::new(file.zone1, file.zone2, file.zone3)
}

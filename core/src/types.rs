//! Shared primitive types used across the entire simulation.

/// A money amount in integer cents. All payout arithmetic is exact
/// integer arithmetic in this space — never floating compare.
pub type Cents = i64;

/// Zero-based index of a simulated round within a batch.
pub type RoundIndex = u64;

/// A zone number, 1..=3.
pub type Zone = u8;

/// Number of zones in a round. Fixed — every round ends at or before
/// zone 3, whatever zone 3 draws.
pub const ZONE_COUNT: Zone = 3;

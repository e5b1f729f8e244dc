//! Pure derivation engine: outcomes, active frames, tallies, and season stats.

/// Active-frame and next-frame-number derivation.
pub mod active;
/// Frame winner resolution.
pub mod outcome;
/// Season-level metrics and match summaries.
pub mod season;
/// Breaker and season suggestions.
pub mod suggest;
/// Per-match tally, winner, and implicit best-of-3 rule.
pub mod tally;

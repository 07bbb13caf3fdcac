// Text analysis: counts, idea heuristics, density and length calibration.
// Pure functions only. Nothing here errors; empty input degrades to zero.

pub mod density;
pub mod metrics;

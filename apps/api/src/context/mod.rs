// Context flattening: turns profile records and assessment answers into
// bounded prompt text. Pure functions only, no I/O.

pub mod flatten;
pub mod models;
pub mod profile;

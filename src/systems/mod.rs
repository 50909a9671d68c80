//! The phases of a simulated year.

pub mod growth;
pub mod recruitment;
pub mod wind;

pub use growth::{sweep, EmittedSeed, SweepOutcome};
pub use recruitment::{admit, prepare, PendingSeed};
pub use wind::resolve_wind;

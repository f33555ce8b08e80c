//! Venue discovery orchestration for VenueScout.
//!
//! This crate ties the primary directory, the secondary catalog, the
//! language-model fallbacks and the static table into a single
//! [`Aggregator::discover`] call that always returns a best-effort list.

pub mod aggregator;
pub mod merge;

pub use aggregator::{
    Aggregator, AggregatorSettings, DiscoveryReport, PhaseCounts, ProgressReporter, SilentProgress,
};

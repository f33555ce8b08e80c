//! Shared types, error model, and configuration for VenueScout.
//!
//! This crate is the foundation depended on by all other VenueScout crates.
//! It provides:
//! - [`VenueScoutError`]: the unified error type
//! - [`Outcome`]: success-or-degraded results returned by every venue source
//! - Domain types ([`VenueRecord`], [`FieldValue`], [`DiscoveryId`])
//! - Configuration ([`AppConfig`], config loading, API key resolution)

pub mod config;
pub mod error;
pub mod outcome;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, LlmConfig, PrimaryConfig, SecondaryConfig, ThresholdConfig, config_dir,
    config_file_path, init_config, load_config, load_config_from, resolve_api_key,
};
pub use error::{Result, VenueScoutError};
pub use outcome::{DegradeCause, Degradation, Outcome, SourceKind};
pub use types::{
    DiscoveryId, FieldValue, IdSpace, TBD, VenueRecord, collapse_whitespace, derive_acronym,
    random_id,
};

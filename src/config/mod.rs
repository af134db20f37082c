//! Configuration loading and management for the daily benefit engine.
//!
//! This module loads the scheme configuration from YAML files: metadata,
//! the date-indexed rate table and the yearly PASS ceilings. Callers that
//! already hold this data can build a [`SchemeConfig`] directly.
//!
//! # Example
//!
//! ```no_run
//! use ij_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/carmf").unwrap();
//! println!("Loaded scheme: {}", config.scheme().name);
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{
    ClassThresholds, PassCeilings, RatePeriod, RateTable, RateTier, SchemeConfig, SchemeMetadata,
};

//! Daily sick-leave benefit engine for self-employed doctors
//!
//! This crate computes statutory daily benefits ("indemnités journalières")
//! from one or more work-stoppage periods, the member's age and affiliation
//! history, and a date-indexed rate table. Every result carries a
//! period-by-period and day-by-day breakdown plus an audit trace.

#![warn(missing_docs)]

pub mod api;
pub mod calculation;
pub mod config;
pub mod error;
pub mod models;

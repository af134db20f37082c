//! HTTP API module for the daily benefit engine.
//!
//! This module exposes the calculation pipeline as a single
//! `POST /calculate` endpoint.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{CalculationRequest, StoppagePeriodRequest};
pub use response::{ApiError, ApiErrorResponse};
pub use state::AppState;

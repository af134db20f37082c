//! Core data models for the daily benefit engine.
//!
//! This module contains all the domain models used throughout the engine.

mod calculation_input;
mod calculation_result;
mod member;
mod stoppage;
mod taux;

pub use calculation_input::CalculationInput;
pub use calculation_result::{
    AuditStep, AuditTrace, AuditWarning, CalculationResult, DailyEntry, EndPaymentDates,
    ExclusionReason, PaymentWindow, PeriodResult, RateSegment, RateSource, TierPeriod,
};
pub use member::{ContributionClass, OptionRate, ProfessionalStatus};
pub use stoppage::{DECLARATION_GRACE_DAYS, DateEffet, StoppagePeriod};
pub use taux::{Reduction, TauxBand, TauxCode};

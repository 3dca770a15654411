//! # Service Math
//!
//! Numeric and calendar helpers shared by the forecast orchestration crates.
//! This crate provides the clamp-and-round post-processing rule, business-day
//! arithmetic and the differencing routines used by autoregressive models.

use thiserror::Error;

pub mod calendar;
pub mod differencing;
pub mod rounding;

pub use calendar::{business_days_inclusive, is_weekend, next_business_day};
pub use rounding::{post_process, round_to};

/// Errors that can occur in forecast-related calculations
#[derive(Error, Debug)]
pub enum MathError {
    #[error("Insufficient data for calculation: {0}")]
    InsufficientData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Calculation error: {0}")]
    CalculationError(String),
}

/// Result type for forecast math operations
pub type Result<T> = std::result::Result<T, MathError>;

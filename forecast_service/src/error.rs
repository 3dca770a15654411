//! Error types for the forecast_service crate

use polars::prelude::PolarsError;
use std::path::PathBuf;
use thiserror::Error;

/// Custom error types for the forecast_service crate
#[derive(Debug, Error)]
pub enum ForecastError {
    /// A model artifact is missing, unreadable or malformed
    #[error("Model load error ({}): {reason}", path.display())]
    ModelLoad { path: PathBuf, reason: String },

    /// Target date is a weekend or precedes the first forecastable date
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    /// A derived metric has an undefined denominator
    #[error("Undefined metric: {0}")]
    UndefinedMetric(String),

    /// The underlying model failed while predicting
    #[error("Prediction error: {0}")]
    Prediction(String),

    /// Error from invalid parameters
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Error from IO operations
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error from JSON (de)serialization
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Error from reading CSV input
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Error from Polars operations
    #[error("Polars error: {0}")]
    PolarsError(String),

    /// Error from rendering the summary chart
    #[error("Render error: {0}")]
    Render(String),
}

impl ForecastError {
    pub(crate) fn model_load(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        ForecastError::ModelLoad {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;

impl From<PolarsError> for ForecastError {
    fn from(err: PolarsError) -> Self {
        ForecastError::PolarsError(err.to_string())
    }
}

impl From<askama::Error> for ForecastError {
    fn from(err: askama::Error) -> Self {
        ForecastError::Render(err.to_string())
    }
}

impl From<service_math::MathError> for ForecastError {
    fn from(err: service_math::MathError) -> Self {
        ForecastError::Prediction(err.to_string())
    }
}

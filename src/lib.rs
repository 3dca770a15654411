//! # FWO
//!
//! Workspace facade for the restaurant forecast orchestration crates.
//!
//! - [`forecast_service`]: model registry, horizon forecasts, reshaping and
//!   the meal-to-waste and meal-to-CO2 pipelines
//! - [`service_math`]: business-day calendar, differencing and rounding
//!
//! ## Example
//!
//! ```
//! use fwo_workspace::forecast_service::forecaster::steps_for_horizon;
//! use fwo_workspace::forecast_service::TimeGranularity;
//! use fwo_workspace::service_math::post_process;
//!
//! assert_eq!(steps_for_horizon(TimeGranularity::SubDaily, 5).unwrap(), 45);
//! assert_eq!(post_process(-3.2_f64), 0.0);
//! assert_eq!(post_process(12.346_f64), 12.35);
//! ```

pub use forecast_service;
pub use service_math;

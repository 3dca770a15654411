//! # Forecast Service
//!
//! Forecast orchestration for the Chemicum, Physicum and Exactum restaurants.
//!
//! ## Features
//!
//! - Model registry loaded once from portable JSON artifacts
//! - Horizon forecasts of receipts, occupancy, biowaste and meal mix
//! - Date-keyed records merged across restaurants, clamped and rounded
//! - Meal composition to per-customer waste, as numbers or an SVG summary
//! - Meal composition to CO2 footprint
//! - CSV export of records and CSV batch input
//!
//! ## Time Granularity
//!
//! Receipt and occupancy models emit 9 hourly steps per requested day and
//! their records are keyed by `datetime`. The steps are a fixed hour apart,
//! so five requested days cover 45 consecutive hours of clock time. Biowaste and meal-mix models emit one step per day
//! and are keyed by `date`:
//!
//! ```rust
//! use forecast_service::{MetricCategory, TimeGranularity};
//!
//! assert_eq!(
//!     MetricCategory::Receipt.time_granularity(),
//!     Some(TimeGranularity::SubDaily)
//! );
//! assert_eq!(TimeGranularity::SubDaily.samples_per_day(), 9);
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use forecast_service::{ForecastService, MealComposition, OutputMode, RestaurantKey, ServiceConfig};
//!
//! # fn main() -> forecast_service::Result<()> {
//! let service = ForecastService::from_config(ServiceConfig::load(None)?)?;
//!
//! // Five days of hourly receipts for every restaurant
//! let records = service.forecast_receipts(5)?;
//! println!("{}", serde_json::to_string_pretty(&records)?);
//!
//! // Waste per customer for a planned menu
//! let menu = MealComposition::new(120.0, 80.0, 150.0, 60.0, 40.0)?;
//! let waste = service.forecast_meal_to_waste(
//!     RestaurantKey::Exactum,
//!     &menu,
//!     "2024-05-20",
//!     OutputMode::Numeric,
//! )?;
//! println!("{:?}", waste);
//! # Ok(())
//! # }
//! ```

pub mod batch;
pub mod category;
pub mod config;
pub mod data;
pub mod error;
pub mod export;
pub mod forecaster;
pub mod models;
pub mod pipelines;
pub mod registry;
pub mod render;
pub mod reshape;
pub mod restaurant;
pub mod service;

// Re-export commonly used types
pub use crate::batch::{BatchOutcome, BatchResult, BatchRow, MealRequest, RejectedRow};
pub use crate::category::{Frequency, MetricCategory, ModelShape, TimeGranularity};
pub use crate::config::ServiceConfig;
pub use crate::data::{ForecastSeries, MealComposition, TimeIndexedSample};
pub use crate::error::{ForecastError, Result};
pub use crate::forecaster::HorizonForecaster;
pub use crate::models::{ComponentForecaster, Regressor, SeriesModel};
pub use crate::pipelines::{
    Co2Prediction, MealToCo2Pipeline, MealToWasteOutput, MealToWastePipeline, MealToWasteResult,
    OutputMode,
};
pub use crate::registry::{ModelRegistry, RegistryBuilder};
pub use crate::render::RenderedImage;
pub use crate::reshape::{DateKeyedRecord, RecordValue};
pub use crate::restaurant::{PerRestaurant, RestaurantKey};
pub use crate::service::ForecastService;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");

//! Metric categories, their time granularity and step spacing

use crate::error::{ForecastError, Result};
use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of forecast served by the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricCategory {
    /// Receipts per hour slot
    Receipt,
    /// Customers entering per hour slot
    Occupancy,
    /// Daily biowaste split by area
    Biowaste,
    /// Daily count of sold meals per category
    MealMix,
    /// Waste regressed from a meal composition
    MealToWaste,
    /// CO2 regressed from a meal composition
    MealToCo2,
}

/// Whether a category is served by a time-series or a regression model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelShape {
    TimeSeries,
    Regression,
}

/// Time granularity of a time-series category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeGranularity {
    /// Nine hourly steps per requested day.
    ///
    /// Steps are spaced a fixed hour apart and run through the night, so
    /// `n` requested days span `9 * n` hours of clock time (5 days end
    /// about two calendar days after the model start). A "day" here counts
    /// nine opening-hour slots, not a calendar day.
    SubDaily,
    /// One sample per calendar day
    Daily,
}

impl Default for TimeGranularity {
    fn default() -> Self {
        TimeGranularity::Daily
    }
}

impl TimeGranularity {
    /// Model steps per requested day
    pub fn samples_per_day(&self) -> usize {
        match self {
            TimeGranularity::SubDaily => 9,
            TimeGranularity::Daily => 1,
        }
    }

    /// Spacing between consecutive forecast steps
    pub fn frequency(&self) -> Frequency {
        match self {
            TimeGranularity::SubDaily => Frequency::Hourly,
            TimeGranularity::Daily => Frequency::Daily,
        }
    }

    /// Name of the timestamp field in reshaped records
    pub fn record_key(&self) -> &'static str {
        match self {
            TimeGranularity::SubDaily => "datetime",
            TimeGranularity::Daily => "date",
        }
    }

    /// `strftime` pattern used for record keys
    pub fn timestamp_format(&self) -> &'static str {
        match self {
            TimeGranularity::SubDaily => "%Y-%m-%d %H:%M:%S",
            TimeGranularity::Daily => "%Y-%m-%d",
        }
    }
}

impl MetricCategory {
    /// Categories answered by the horizon forecaster
    pub const SERIES: [MetricCategory; 4] = [
        MetricCategory::Receipt,
        MetricCategory::Occupancy,
        MetricCategory::Biowaste,
        MetricCategory::MealMix,
    ];

    pub fn shape(&self) -> ModelShape {
        match self {
            MetricCategory::MealToWaste | MetricCategory::MealToCo2 => ModelShape::Regression,
            _ => ModelShape::TimeSeries,
        }
    }

    /// Granularity of time-series categories; `None` for regressions
    pub fn time_granularity(&self) -> Option<TimeGranularity> {
        match self {
            MetricCategory::Receipt | MetricCategory::Occupancy => Some(TimeGranularity::SubDaily),
            MetricCategory::Biowaste | MetricCategory::MealMix => Some(TimeGranularity::Daily),
            MetricCategory::MealToWaste | MetricCategory::MealToCo2 => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MetricCategory::Receipt => "receipt",
            MetricCategory::Occupancy => "occupancy",
            MetricCategory::Biowaste => "biowaste",
            MetricCategory::MealMix => "meal",
            MetricCategory::MealToWaste => "meal_to_waste",
            MetricCategory::MealToCo2 => "meal_to_co2",
        }
    }
}

impl fmt::Display for MetricCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetricCategory {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "receipt" | "receipts" => Ok(MetricCategory::Receipt),
            "occupancy" => Ok(MetricCategory::Occupancy),
            "biowaste" => Ok(MetricCategory::Biowaste),
            "meal" | "meals" | "meal_mix" => Ok(MetricCategory::MealMix),
            "meal_to_waste" => Ok(MetricCategory::MealToWaste),
            "meal_to_co2" => Ok(MetricCategory::MealToCo2),
            other => Err(ForecastError::InvalidParameter(format!(
                "Unknown metric category: {}",
                other
            ))),
        }
    }
}

/// Spacing of a model's time index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    Hourly,
    Daily,
    /// Monday to Friday, skipping weekends
    BusinessDaily,
}

impl Frequency {
    /// Timestamp of the step following `timestamp`
    pub fn advance(&self, timestamp: NaiveDateTime) -> Option<NaiveDateTime> {
        match self {
            Frequency::Hourly => timestamp.checked_add_signed(Duration::hours(1)),
            Frequency::Daily => timestamp.checked_add_signed(Duration::days(1)),
            Frequency::BusinessDaily => {
                let date = service_math::next_business_day(timestamp.date())?;
                Some(date.and_time(timestamp.time()))
            }
        }
    }
}

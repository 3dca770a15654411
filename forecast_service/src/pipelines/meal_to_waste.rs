//! Meal composition to per-customer waste
//!
//! Three sequential stages, each short-circuiting on failure:
//!
//! 1. [`ReceiptForecast`]: validate the target date, count business days
//!    since the first forecastable date and read the restaurant's receipt
//!    count from the last step of the joint day-ahead model. That step must
//!    fall on the target date.
//! 2. [`WasteForecast`]: run the restaurant's meal regressor to get
//!    customer-area and kitchen-area waste.
//! 3. [`WastePerCustomer`]: `(customer + kitchen) * 1000 / receipts`.

use crate::category::MetricCategory;
use crate::data::MealComposition;
use crate::error::{ForecastError, Result};
use crate::pipelines::OutputMode;
use crate::registry::{ModelRegistry, WASTE_OUTPUTS};
use crate::render::{render_waste_summary, RenderedImage, WasteSummary};
use crate::restaurant::RestaurantKey;
use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use service_math::{business_days_inclusive, is_weekend};
use tracing::debug;

/// Day after the last date present in the receipt training data
pub fn default_first_eligible_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, 9).unwrap_or(NaiveDate::MIN)
}

/// Reference line drawn on the per-customer waste panel, in grams
pub const WASTE_THRESHOLD_GRAMS: f64 = 40.0;

/// Parse `YYYY-MM-DD`, tolerating a trailing time of day
pub fn parse_target_date(input: &str) -> Result<NaiveDate> {
    let input = input.trim();
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .or_else(|_| {
            NaiveDateTime::parse_from_str(input, "%Y-%m-%d %H:%M:%S").map(|dt| dt.date())
        })
        .or_else(|_| {
            NaiveDateTime::parse_from_str(input, "%Y-%m-%dT%H:%M:%S").map(|dt| dt.date())
        })
        .map_err(|_| ForecastError::InvalidDate(format!("Cannot parse date '{}'", input)))
}

/// Business-day offset of `date` from `first_eligible`, counting both ends.
///
/// Weekends and dates before `first_eligible` are rejected.
pub fn business_day_offset(date: NaiveDate, first_eligible: NaiveDate) -> Result<u32> {
    if is_weekend(date) {
        return Err(ForecastError::InvalidDate(format!(
            "Input date {} must not be weekend",
            date
        )));
    }

    let offset = business_days_inclusive(first_eligible, date);
    if offset == 0 {
        return Err(ForecastError::InvalidDate(format!(
            "Input date {} is before the first forecastable date {}",
            date, first_eligible
        )));
    }

    Ok(offset)
}

/// Stage 1 output
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ReceiptForecast {
    pub date: NaiveDate,
    /// Business days from the first eligible date, inclusive
    pub offset: u32,
    /// Predicted receipts, truncated toward zero
    pub receipts: i64,
}

/// Stage 2 output, in kilograms
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WasteForecast {
    pub customer: f64,
    pub kitchen: f64,
}

impl WasteForecast {
    pub fn total(&self) -> f64 {
        self.customer + self.kitchen
    }
}

/// Stage 3 output
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WastePerCustomer {
    pub grams: f64,
}

impl WastePerCustomer {
    /// Derive grams of waste per receipt.
    ///
    /// A non-positive receipt count leaves the metric undefined.
    pub fn derive(receipts: &ReceiptForecast, waste: &WasteForecast) -> Result<Self> {
        if receipts.receipts <= 0 {
            return Err(ForecastError::UndefinedMetric(format!(
                "Waste per customer is undefined for {} predicted receipts on {}",
                receipts.receipts, receipts.date
            )));
        }

        Ok(Self {
            grams: waste.total() * 1000.0 / receipts.receipts as f64,
        })
    }
}

/// Numeric result of the pipeline
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MealToWasteResult {
    pub date: String,
    pub predicted_waste_customer: f64,
    pub predicted_waste_kitchen: f64,
    pub predicted_num_receipts: i64,
    pub predicted_waste_per_customer: f64,
}

/// Either the numbers or the rendered chart, never both
#[derive(Debug, Clone, PartialEq)]
pub enum MealToWasteOutput {
    Numeric(MealToWasteResult),
    Image(RenderedImage),
}

/// Chains the day-ahead receipt model and a meal regressor
#[derive(Debug, Clone, Copy)]
pub struct MealToWastePipeline<'a> {
    registry: &'a ModelRegistry,
    first_eligible: NaiveDate,
    waste_threshold: f64,
}

impl<'a> MealToWastePipeline<'a> {
    pub fn new(registry: &'a ModelRegistry) -> Self {
        Self {
            registry,
            first_eligible: default_first_eligible_date(),
            waste_threshold: WASTE_THRESHOLD_GRAMS,
        }
    }

    pub fn with_first_eligible_date(mut self, date: NaiveDate) -> Self {
        self.first_eligible = date;
        self
    }

    pub fn with_waste_threshold(mut self, grams: f64) -> Self {
        self.waste_threshold = grams;
        self
    }

    pub fn first_eligible_date(&self) -> NaiveDate {
        self.first_eligible
    }

    /// Stage 1: receipts predicted for the restaurant on `date`
    pub fn forecast_receipts(
        &self,
        restaurant: RestaurantKey,
        date: NaiveDate,
    ) -> Result<ReceiptForecast> {
        let offset = business_day_offset(date, self.first_eligible)?;
        let model = self.registry.day_ahead_receipts();
        let series = model.predict(offset as usize)?;

        let field = restaurant.receipt_field();
        let index = series.component_index(&field)?;
        let last = series.last().ok_or_else(|| {
            ForecastError::Prediction(format!("{} returned no steps", model.name()))
        })?;
        if last.timestamp.date() != date {
            return Err(ForecastError::Prediction(format!(
                "{} step {} lands on {} instead of {}; first eligible date {} does not match the model start",
                model.name(),
                offset,
                last.timestamp.date(),
                date,
                self.first_eligible
            )));
        }
        let value = last.values[index];

        if !value.is_finite() {
            return Err(ForecastError::Prediction(format!(
                "{} predicted a non-finite receipt count for {}",
                model.name(),
                restaurant
            )));
        }

        debug!(%restaurant, %date, offset, step = %last.timestamp, value, "forecasted receipts");
        Ok(ReceiptForecast {
            date,
            offset,
            receipts: value.trunc() as i64,
        })
    }

    /// Stage 2: customer and kitchen waste for the composition
    pub fn forecast_waste(
        &self,
        restaurant: RestaurantKey,
        composition: &MealComposition,
    ) -> Result<WasteForecast> {
        composition.validate()?;
        let model = self
            .registry
            .regressor(restaurant, MetricCategory::MealToWaste)?;
        let outputs = model.predict(&composition.to_features())?;

        match outputs[..] {
            [customer, kitchen] => {
                debug!(%restaurant, customer, kitchen, "forecasted waste");
                Ok(WasteForecast { customer, kitchen })
            }
            _ => Err(ForecastError::Prediction(format!(
                "{} returned {} outputs, expected {}",
                model.name(),
                outputs.len(),
                WASTE_OUTPUTS
            ))),
        }
    }

    /// Run all stages and produce the requested output
    pub fn run(
        &self,
        restaurant: RestaurantKey,
        composition: &MealComposition,
        date: &str,
        mode: OutputMode,
    ) -> Result<MealToWasteOutput> {
        let target = parse_target_date(date)?;
        let receipts = self.forecast_receipts(restaurant, target)?;
        let waste = self.forecast_waste(restaurant, composition)?;
        let per_customer = WastePerCustomer::derive(&receipts, &waste)?;

        match mode {
            OutputMode::Numeric => Ok(MealToWasteOutput::Numeric(MealToWasteResult {
                date: date.to_string(),
                predicted_waste_customer: waste.customer,
                predicted_waste_kitchen: waste.kitchen,
                predicted_num_receipts: receipts.receipts,
                predicted_waste_per_customer: per_customer.grams,
            })),
            OutputMode::Image => {
                let summary = WasteSummary {
                    date: date.to_string(),
                    composition: *composition,
                    waste,
                    receipts: receipts.receipts,
                    per_customer_grams: per_customer.grams,
                    threshold_grams: self.waste_threshold,
                };
                Ok(MealToWasteOutput::Image(render_waste_summary(&summary)?))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[rstest]
    #[case("2024-05-09", 1)]
    #[case("2024-05-10", 2)]
    #[case("2024-05-13", 3)]
    #[case("2024-05-16", 6)]
    fn test_business_day_offset(#[case] target: &str, #[case] expected: u32) {
        let offset = business_day_offset(date(target), default_first_eligible_date()).unwrap();
        assert_eq!(offset, expected);
    }

    #[rstest]
    #[case("2024-05-11")]
    #[case("2024-05-12")]
    #[case("2024-05-08")]
    #[case("2023-12-29")]
    fn test_invalid_dates_are_rejected(#[case] target: &str) {
        let result = business_day_offset(date(target), default_first_eligible_date());
        assert!(matches!(result, Err(ForecastError::InvalidDate(_))));
    }

    #[test]
    fn test_parse_target_date_formats() {
        assert_eq!(parse_target_date("2024-05-20").unwrap(), date("2024-05-20"));
        assert_eq!(parse_target_date("2024-05-20 00:00:00").unwrap(), date("2024-05-20"));
        assert_eq!(parse_target_date("2024-05-20T12:30:00").unwrap(), date("2024-05-20"));
        assert!(matches!(
            parse_target_date("20.5.2024"),
            Err(ForecastError::InvalidDate(_))
        ));
    }

    #[test]
    fn test_waste_per_customer() {
        let receipts = ReceiptForecast {
            date: date("2024-05-20"),
            offset: 8,
            receipts: 250,
        };
        let waste = WasteForecast {
            customer: 6.0,
            kitchen: 4.0,
        };

        let per_customer = WastePerCustomer::derive(&receipts, &waste).unwrap();
        assert_eq!(per_customer.grams, 40.0);
    }

    #[test]
    fn test_zero_receipts_leave_metric_undefined() {
        let receipts = ReceiptForecast {
            date: date("2024-05-20"),
            offset: 8,
            receipts: 0,
        };
        let waste = WasteForecast {
            customer: 6.0,
            kitchen: 4.0,
        };

        let result = WastePerCustomer::derive(&receipts, &waste);
        assert!(matches!(result, Err(ForecastError::UndefinedMetric(_))));
    }
}

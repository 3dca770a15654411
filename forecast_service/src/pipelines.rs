//! Pipelines deriving metrics from a hypothetical meal composition

use crate::error::{ForecastError, Result};
use std::str::FromStr;

pub mod meal_to_co2;
pub mod meal_to_waste;

pub use meal_to_co2::{Co2Prediction, MealToCo2Pipeline};
pub use meal_to_waste::{
    business_day_offset, default_first_eligible_date, parse_target_date, MealToWasteOutput,
    MealToWastePipeline, MealToWasteResult, ReceiptForecast, WasteForecast, WastePerCustomer,
    WASTE_THRESHOLD_GRAMS,
};

/// How the meal-to-waste pipeline presents its result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Structured numbers
    #[default]
    Numeric,
    /// Rendered chart summary
    Image,
}

impl FromStr for OutputMode {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "numeric" => Ok(OutputMode::Numeric),
            "image" => Ok(OutputMode::Image),
            other => Err(ForecastError::InvalidParameter(format!(
                "Unknown output mode: {}",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_output_mode() {
        assert_eq!("image".parse::<OutputMode>().unwrap(), OutputMode::Image);
        assert_eq!("Numeric".parse::<OutputMode>().unwrap(), OutputMode::Numeric);
        assert!("pdf".parse::<OutputMode>().is_err());
    }
}

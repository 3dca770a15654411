//! Meal composition to CO2 footprint

use crate::category::MetricCategory;
use crate::data::MealComposition;
use crate::error::{ForecastError, Result};
use crate::registry::ModelRegistry;
use crate::restaurant::RestaurantKey;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Co2Prediction {
    pub predicted_co2: f64,
}

/// Runs a restaurant's CO2 regressor on a meal composition
#[derive(Debug, Clone, Copy)]
pub struct MealToCo2Pipeline<'a> {
    registry: &'a ModelRegistry,
}

impl<'a> MealToCo2Pipeline<'a> {
    pub fn new(registry: &'a ModelRegistry) -> Self {
        Self { registry }
    }

    pub fn run(
        &self,
        restaurant: RestaurantKey,
        composition: &MealComposition,
    ) -> Result<Co2Prediction> {
        composition.validate()?;
        let model = self
            .registry
            .regressor(restaurant, MetricCategory::MealToCo2)?;
        let outputs = model.predict(&composition.to_features())?;

        match outputs[..] {
            [predicted_co2] => Ok(Co2Prediction { predicted_co2 }),
            _ => Err(ForecastError::Prediction(format!(
                "{} returned {} outputs, expected 1",
                model.name(),
                outputs.len()
            ))),
        }
    }
}

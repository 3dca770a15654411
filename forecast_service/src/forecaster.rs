//! Horizon forecaster: requested days in, model steps out

use crate::category::{MetricCategory, TimeGranularity};
use crate::data::ForecastSeries;
use crate::error::{ForecastError, Result};
use crate::registry::ModelRegistry;
use crate::restaurant::{PerRestaurant, RestaurantKey};
use tracing::debug;

/// Number of model steps covering `number_of_days` for a granularity
pub fn steps_for_horizon(granularity: TimeGranularity, number_of_days: usize) -> Result<usize> {
    if number_of_days == 0 {
        return Err(ForecastError::InvalidParameter(
            "Number of days must be positive".to_string(),
        ));
    }

    number_of_days
        .checked_mul(granularity.samples_per_day())
        .ok_or_else(|| {
            ForecastError::InvalidParameter(format!(
                "Horizon of {} days is too large",
                number_of_days
            ))
        })
}

/// Runs the registry's series models over a horizon expressed in days
#[derive(Debug, Clone, Copy)]
pub struct HorizonForecaster<'a> {
    registry: &'a ModelRegistry,
}

impl<'a> HorizonForecaster<'a> {
    pub fn new(registry: &'a ModelRegistry) -> Self {
        Self { registry }
    }

    /// Forecast one restaurant's series.
    ///
    /// The result has exactly `number_of_days * samples_per_day` steps with
    /// strictly increasing timestamps. Model failures are not retried.
    ///
    /// For sub-daily categories the days are counts of nine hourly steps;
    /// the returned timestamps cover `9 * number_of_days` consecutive hours,
    /// not `number_of_days` calendar days.
    pub fn forecast(
        &self,
        restaurant: RestaurantKey,
        category: MetricCategory,
        number_of_days: usize,
    ) -> Result<ForecastSeries> {
        let granularity = category.time_granularity().ok_or_else(|| {
            ForecastError::InvalidParameter(format!("{} is not a time-series category", category))
        })?;
        let steps = steps_for_horizon(granularity, number_of_days)?;
        let model = self.registry.series_model(restaurant, category)?;

        debug!(%restaurant, %category, steps, model = model.name(), "forecasting series");
        let series = model.predict(steps)?;

        if series.len() != steps {
            return Err(ForecastError::Prediction(format!(
                "{} returned {} steps, expected {}",
                model.name(),
                series.len(),
                steps
            )));
        }

        if !series.is_strictly_increasing() {
            return Err(ForecastError::Prediction(format!(
                "{} returned timestamps that are not strictly increasing",
                model.name()
            )));
        }

        Ok(series)
    }

    /// Forecast every restaurant's series for one category
    pub fn forecast_all(
        &self,
        category: MetricCategory,
        number_of_days: usize,
    ) -> Result<PerRestaurant<ForecastSeries>> {
        PerRestaurant::try_from_fn(|restaurant| self.forecast(restaurant, category, number_of_days))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_steps_for_horizon() {
        assert_eq!(steps_for_horizon(TimeGranularity::SubDaily, 5).unwrap(), 45);
        assert_eq!(steps_for_horizon(TimeGranularity::Daily, 5).unwrap(), 5);
        assert!(steps_for_horizon(TimeGranularity::Daily, 0).is_err());
        assert!(steps_for_horizon(TimeGranularity::SubDaily, usize::MAX).is_err());
    }
}

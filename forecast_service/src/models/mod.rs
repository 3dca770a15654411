//! Pre-fitted forecasting and regression models
//!
//! Models are immutable once built and every prediction takes `&self`, so a
//! loaded registry can be shared between threads without locking.

use crate::category::Frequency;
use crate::data::ForecastSeries;
use crate::error::{ForecastError, Result};
use chrono::NaiveDateTime;
use std::fmt::Debug;

pub mod arima;
pub mod artifact;
pub mod exponential_smoothing;
pub mod linear;
pub mod moving_average;
pub mod seasonal;
pub mod tree_ensemble;

/// Multi-step forecaster with a time index
pub trait SeriesModel: Debug + Send + Sync {
    /// Predict `steps` steps past the end of the training data in one shot
    fn predict(&self, steps: usize) -> Result<ForecastSeries>;

    /// Name of the model
    fn name(&self) -> &str;
}

/// Single-output forecaster used as one component of a [`SeriesModel`]
pub trait ComponentForecaster: Debug + Send + Sync {
    /// Generate forecast for future periods
    fn forecast(&self, horizon: usize) -> Result<Vec<f64>>;

    /// Name of the model
    fn name(&self) -> &str;
}

/// Regressor from a fixed-length feature vector to one or more outputs
pub trait Regressor: Debug + Send + Sync {
    fn predict(&self, features: &[f64]) -> Result<Vec<f64>>;

    /// Expected number of input features
    fn n_features(&self) -> usize;

    /// Number of values returned by [`Regressor::predict`]
    fn n_outputs(&self) -> usize;

    /// Name of the model
    fn name(&self) -> &str;
}

/// A named component and the model that forecasts it
#[derive(Debug)]
pub struct Component {
    pub name: String,
    pub model: Box<dyn ComponentForecaster>,
}

/// Series model assembled from independent per-component forecasters
/// sharing one time index.
#[derive(Debug)]
pub struct ComponentSeriesModel {
    name: String,
    /// Timestamp of the first forecast step
    start: NaiveDateTime,
    frequency: Frequency,
    components: Vec<Component>,
}

impl ComponentSeriesModel {
    pub fn new(
        name: impl Into<String>,
        start: NaiveDateTime,
        frequency: Frequency,
        components: Vec<Component>,
    ) -> Result<Self> {
        if components.is_empty() {
            return Err(ForecastError::InvalidParameter(
                "A series model needs at least one component".to_string(),
            ));
        }

        Ok(Self {
            name: name.into(),
            start,
            frequency,
            components,
        })
    }

    pub fn frequency(&self) -> Frequency {
        self.frequency
    }
}

impl SeriesModel for ComponentSeriesModel {
    fn predict(&self, steps: usize) -> Result<ForecastSeries> {
        let mut columns = Vec::with_capacity(self.components.len());

        for component in &self.components {
            let values = component.model.forecast(steps)?;
            if values.len() != steps {
                return Err(ForecastError::Prediction(format!(
                    "{} returned {} steps for component '{}', expected {}",
                    component.model.name(),
                    values.len(),
                    component.name,
                    steps
                )));
            }
            if values.iter().any(|value| !value.is_finite()) {
                return Err(ForecastError::Prediction(format!(
                    "{} produced a non-finite value for component '{}'",
                    component.model.name(),
                    component.name
                )));
            }
            columns.push(values);
        }

        let names = self.components.iter().map(|c| c.name.clone()).collect();
        ForecastSeries::from_columns(self.start, self.frequency, names, columns)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Reject feature vectors of the wrong length or with non-finite entries
pub(crate) fn check_features(model: &str, expected: usize, features: &[f64]) -> Result<()> {
    if features.len() != expected {
        return Err(ForecastError::Prediction(format!(
            "{} expects {} features, got {}",
            model,
            expected,
            features.len()
        )));
    }

    if features.iter().any(|value| !value.is_finite()) {
        return Err(ForecastError::Prediction(format!(
            "{} received a non-finite feature",
            model
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::exponential_smoothing::TrainedExponentialSmoothing;
    use chrono::NaiveDate;

    #[derive(Debug)]
    struct Exploding;

    impl ComponentForecaster for Exploding {
        fn forecast(&self, horizon: usize) -> Result<Vec<f64>> {
            Ok(vec![f64::INFINITY; horizon])
        }

        fn name(&self) -> &str {
            "exploding"
        }
    }

    fn start() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 9)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_component_model_stacks_columns() {
        let model = ComponentSeriesModel::new(
            "waste",
            start(),
            Frequency::Daily,
            vec![
                Component {
                    name: "customer".to_string(),
                    model: Box::new(TrainedExponentialSmoothing::new(2.0, None).unwrap()),
                },
                Component {
                    name: "kitchen".to_string(),
                    model: Box::new(TrainedExponentialSmoothing::new(5.0, Some(1.0)).unwrap()),
                },
            ],
        )
        .unwrap();

        let series = model.predict(3).unwrap();
        assert_eq!(series.len(), 3);
        assert_eq!(series.component("customer").unwrap(), vec![2.0, 2.0, 2.0]);
        assert_eq!(series.component("kitchen").unwrap(), vec![6.0, 7.0, 8.0]);
    }

    #[test]
    fn test_non_finite_output_is_a_prediction_error() {
        let model = ComponentSeriesModel::new(
            "broken",
            start(),
            Frequency::Daily,
            vec![Component {
                name: "value".to_string(),
                model: Box::new(Exploding),
            }],
        )
        .unwrap();

        assert!(matches!(model.predict(2), Err(ForecastError::Prediction(_))));
    }

    #[test]
    fn test_check_features() {
        assert!(check_features("m", 2, &[1.0, 2.0]).is_ok());
        assert!(check_features("m", 2, &[1.0]).is_err());
        assert!(check_features("m", 1, &[f64::NAN]).is_err());
    }
}

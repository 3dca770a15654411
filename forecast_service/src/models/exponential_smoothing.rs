//! Exponential smoothing models for time series forecasting

use crate::error::{ForecastError, Result};
use crate::models::ComponentForecaster;

/// Fitted exponential smoothing model.
///
/// Without a trend the forecast is flat at the last level (simple
/// exponential smoothing); with a trend it follows Holt's linear method.
#[derive(Debug, Clone)]
pub struct TrainedExponentialSmoothing {
    /// Name of the model
    name: String,
    /// Current level
    level: f64,
    /// Current trend per step, if fitted
    trend: Option<f64>,
}

impl TrainedExponentialSmoothing {
    pub fn new(level: f64, trend: Option<f64>) -> Result<Self> {
        if !level.is_finite() || trend.map_or(false, |t| !t.is_finite()) {
            return Err(ForecastError::InvalidParameter(
                "Smoothing level and trend must be finite".to_string(),
            ));
        }

        let name = match trend {
            Some(_) => "Exponential Smoothing (linear trend)".to_string(),
            None => "Exponential Smoothing".to_string(),
        };

        Ok(Self { name, level, trend })
    }
}

impl ComponentForecaster for TrainedExponentialSmoothing {
    fn forecast(&self, horizon: usize) -> Result<Vec<f64>> {
        let trend = self.trend.unwrap_or(0.0);
        let values = (1..=horizon)
            .map(|h| self.level + h as f64 * trend)
            .collect();

        Ok(values)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_forecast() {
        let model = TrainedExponentialSmoothing::new(104.2, None).unwrap();
        assert_eq!(model.forecast(3).unwrap(), vec![104.2; 3]);
    }

    #[test]
    fn test_trend_forecast() {
        let model = TrainedExponentialSmoothing::new(10.0, Some(-4.0)).unwrap();
        assert_eq!(model.forecast(3).unwrap(), vec![6.0, 2.0, -2.0]);
    }

    #[test]
    fn test_rejects_non_finite_parameters() {
        assert!(TrainedExponentialSmoothing::new(f64::NAN, None).is_err());
        assert!(TrainedExponentialSmoothing::new(1.0, Some(f64::INFINITY)).is_err());
    }
}

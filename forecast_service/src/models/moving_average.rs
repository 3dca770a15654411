//! Moving average models for time series forecasting

use crate::error::{ForecastError, Result};
use crate::models::ComponentForecaster;
use std::collections::VecDeque;

/// Trained Simple Moving Average model.
///
/// Each forecast is the mean of the last `window` values, and is itself
/// appended to the window before the next step.
#[derive(Debug, Clone)]
pub struct TrainedSimpleMA {
    /// Name of the model
    name: String,
    /// Window size
    window: usize,
    /// Historical data, at least `window` values
    historical_data: Vec<f64>,
}

impl TrainedSimpleMA {
    pub fn new(window: usize, historical_data: Vec<f64>) -> Result<Self> {
        if window == 0 {
            return Err(ForecastError::InvalidParameter(
                "Window size must be positive".to_string(),
            ));
        }

        if historical_data.len() < window {
            return Err(ForecastError::InvalidParameter(format!(
                "Insufficient data for SMA. Need at least {} observations.",
                window
            )));
        }

        Ok(Self {
            name: format!("Simple Moving Average (window={})", window),
            window,
            historical_data,
        })
    }
}

impl ComponentForecaster for TrainedSimpleMA {
    fn forecast(&self, horizon: usize) -> Result<Vec<f64>> {
        let tail = &self.historical_data[self.historical_data.len() - self.window..];
        let mut window: VecDeque<f64> = tail.iter().copied().collect();
        let mut sum: f64 = window.iter().sum();
        let mut forecasts = Vec::with_capacity(horizon);

        for _ in 0..horizon {
            let average = sum / self.window as f64;
            forecasts.push(average);

            if let Some(oldest) = window.pop_front() {
                sum -= oldest;
            }
            window.push_back(average);
            sum += average;
        }

        Ok(forecasts)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_moving_average_feeds_back() {
        let model = TrainedSimpleMA::new(3, vec![100.0, 102.0, 104.0, 103.0, 105.0]).unwrap();
        let forecast = model.forecast(2).unwrap();

        assert_relative_eq!(forecast[0], 104.0);
        assert_relative_eq!(forecast[1], (103.0 + 105.0 + 104.0) / 3.0);
    }

    #[test]
    fn test_parameter_validation() {
        assert!(TrainedSimpleMA::new(0, vec![1.0]).is_err());
        assert!(TrainedSimpleMA::new(4, vec![1.0, 2.0]).is_err());
    }
}

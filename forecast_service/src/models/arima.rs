//! ARIMA models for time series forecasting

use crate::error::{ForecastError, Result};
use crate::models::ComponentForecaster;
use service_math::differencing::{autoregressive_recursion, difference, integrate};

/// Fitted ARIMA(p, d, 0) model.
///
/// The AR recursion runs on the series differenced `differences` times and
/// forecasts are integrated back to levels.
#[derive(Debug, Clone)]
pub struct TrainedArimaModel {
    /// Name of the model
    name: String,
    /// Constant term of the differenced process
    intercept: f64,
    /// Fitted AR coefficients, most recent lag first
    ar_coefficients: Vec<f64>,
    /// Differencing order (d)
    differences: usize,
    /// Historical data (undifferenced)
    historical_data: Vec<f64>,
}

impl TrainedArimaModel {
    /// Create a fitted model from its coefficients and trailing history
    pub fn new(
        intercept: f64,
        ar_coefficients: Vec<f64>,
        differences: usize,
        historical_data: Vec<f64>,
    ) -> Result<Self> {
        let p = ar_coefficients.len();
        let needed = p + differences + 1;
        if historical_data.len() < needed {
            return Err(ForecastError::InvalidParameter(format!(
                "Insufficient history for ARIMA({},{},0). Need at least {} observations, got {}.",
                p,
                differences,
                needed,
                historical_data.len()
            )));
        }

        if !intercept.is_finite()
            || ar_coefficients.iter().any(|c| !c.is_finite())
            || historical_data.iter().any(|v| !v.is_finite())
        {
            return Err(ForecastError::InvalidParameter(
                "ARIMA parameters and history must be finite".to_string(),
            ));
        }

        Ok(Self {
            name: format!("ARIMA({},{},0)", p, differences),
            intercept,
            ar_coefficients,
            differences,
            historical_data,
        })
    }
}

impl ComponentForecaster for TrainedArimaModel {
    fn forecast(&self, horizon: usize) -> Result<Vec<f64>> {
        let differenced = difference(&self.historical_data, self.differences)?;
        let forecasts =
            autoregressive_recursion(&differenced, self.intercept, &self.ar_coefficients, horizon)?;
        let levels = integrate(&self.historical_data, self.differences, &forecasts)?;

        Ok(levels)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

//! Multi-output linear regression (ordinary, ridge or lasso fits)

use crate::error::{ForecastError, Result};
use crate::models::{check_features, Regressor};

/// Fitted linear regressor with one coefficient row per output
#[derive(Debug, Clone)]
pub struct LinearRegressor {
    /// Name of the model
    name: String,
    /// One intercept per output
    intercepts: Vec<f64>,
    /// `coefficients[output][feature]`
    coefficients: Vec<Vec<f64>>,
    /// Number of input features
    n_features: usize,
}

impl LinearRegressor {
    pub fn new(
        name: impl Into<String>,
        intercepts: Vec<f64>,
        coefficients: Vec<Vec<f64>>,
    ) -> Result<Self> {
        if intercepts.is_empty() || intercepts.len() != coefficients.len() {
            return Err(ForecastError::InvalidParameter(format!(
                "Linear model needs one intercept per coefficient row, got {} and {}",
                intercepts.len(),
                coefficients.len()
            )));
        }

        let n_features = coefficients[0].len();
        if n_features == 0 || coefficients.iter().any(|row| row.len() != n_features) {
            return Err(ForecastError::InvalidParameter(
                "Linear model coefficient rows must share a non-zero length".to_string(),
            ));
        }

        if intercepts.iter().chain(coefficients.iter().flatten()).any(|v| !v.is_finite()) {
            return Err(ForecastError::InvalidParameter(
                "Linear model parameters must be finite".to_string(),
            ));
        }

        Ok(Self {
            name: name.into(),
            intercepts,
            coefficients,
            n_features,
        })
    }
}

impl Regressor for LinearRegressor {
    fn predict(&self, features: &[f64]) -> Result<Vec<f64>> {
        check_features(&self.name, self.n_features, features)?;

        let outputs = self
            .intercepts
            .iter()
            .zip(self.coefficients.iter())
            .map(|(intercept, row)| {
                intercept
                    + row
                        .iter()
                        .zip(features.iter())
                        .map(|(coefficient, x)| coefficient * x)
                        .sum::<f64>()
            })
            .collect();

        Ok(outputs)
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    fn n_outputs(&self) -> usize {
        self.intercepts.len()
    }

    fn name(&self) -> &str {
        &self.name
    }
}

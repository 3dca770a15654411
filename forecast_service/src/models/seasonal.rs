//! Repeating seasonal profile

use crate::error::{ForecastError, Result};
use crate::models::ComponentForecaster;

/// Forecast that cycles through a fitted profile, e.g. the average value of
/// each opening-hour slot.
#[derive(Debug, Clone)]
pub struct SeasonalProfile {
    name: String,
    pattern: Vec<f64>,
    /// Index into `pattern` of the first forecast step
    phase: usize,
}

impl SeasonalProfile {
    pub fn new(pattern: Vec<f64>, phase: usize) -> Result<Self> {
        if pattern.is_empty() {
            return Err(ForecastError::InvalidParameter(
                "Seasonal pattern must not be empty".to_string(),
            ));
        }

        if pattern.iter().any(|value| !value.is_finite()) {
            return Err(ForecastError::InvalidParameter(
                "Seasonal pattern must be finite".to_string(),
            ));
        }

        Ok(Self {
            name: format!("Seasonal Profile (period={})", pattern.len()),
            phase: phase % pattern.len(),
            pattern,
        })
    }
}

impl ComponentForecaster for SeasonalProfile {
    fn forecast(&self, horizon: usize) -> Result<Vec<f64>> {
        let period = self.pattern.len();
        let values = (0..horizon)
            .map(|step| self.pattern[(self.phase + step) % period])
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
    fn test_profile_wraps_around() {
        let model = SeasonalProfile::new(vec![1.0, 2.0, 3.0], 2).unwrap();
        assert_eq!(model.forecast(5).unwrap(), vec![3.0, 1.0, 2.0, 3.0, 1.0]);
    }

    #[test]
    fn test_empty_profile_is_rejected() {
        assert!(SeasonalProfile::new(vec![], 0).is_err());
    }
}

//! Forecast output series and meal composition inputs

use crate::category::Frequency;
use crate::error::{ForecastError, Result};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Time-indexed output of a series model.
///
/// A model may emit several named components per step (e.g. waste per
/// area); `values[step][component]` follows the order of `components`.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastSeries {
    /// Timestamps, ascending
    timestamps: Vec<NaiveDateTime>,
    /// Names of the emitted components
    components: Vec<String>,
    /// Row-major values, one row per timestamp
    values: Vec<Vec<f64>>,
}

/// One step of a [`ForecastSeries`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeIndexedSample<'a> {
    pub timestamp: NaiveDateTime,
    pub values: &'a [f64],
}

impl ForecastSeries {
    /// Create a new series, validating its shape
    pub fn new(
        timestamps: Vec<NaiveDateTime>,
        components: Vec<String>,
        values: Vec<Vec<f64>>,
    ) -> Result<Self> {
        if components.is_empty() {
            return Err(ForecastError::Prediction(
                "Series must have at least one component".to_string(),
            ));
        }

        if values.len() != timestamps.len() {
            return Err(ForecastError::Prediction(format!(
                "Values length ({}) doesn't match timestamps length ({})",
                values.len(),
                timestamps.len()
            )));
        }

        if let Some(row) = values.iter().find(|row| row.len() != components.len()) {
            return Err(ForecastError::Prediction(format!(
                "Step has {} values but the series has {} components",
                row.len(),
                components.len()
            )));
        }

        Ok(Self {
            timestamps,
            components,
            values,
        })
    }

    /// Create a series from per-component columns, generating the time index
    /// from `start` at the given `frequency`
    pub fn from_columns(
        start: NaiveDateTime,
        frequency: Frequency,
        components: Vec<String>,
        columns: Vec<Vec<f64>>,
    ) -> Result<Self> {
        let steps = columns.first().map_or(0, Vec::len);
        if columns.iter().any(|column| column.len() != steps) {
            return Err(ForecastError::Prediction(
                "Component columns have different lengths".to_string(),
            ));
        }

        let timestamps = time_index(start, frequency, steps)?;
        let values = (0..steps)
            .map(|step| columns.iter().map(|column| column[step]).collect())
            .collect();

        Self::new(timestamps, components, values)
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn timestamps(&self) -> &[NaiveDateTime] {
        &self.timestamps
    }

    pub fn components(&self) -> &[String] {
        &self.components
    }

    /// Iterate the steps in time order
    pub fn samples(&self) -> impl Iterator<Item = TimeIndexedSample<'_>> + '_ {
        self.timestamps
            .iter()
            .zip(self.values.iter())
            .map(|(timestamp, values)| TimeIndexedSample {
                timestamp: *timestamp,
                values,
            })
    }

    /// The final step, if any
    pub fn last(&self) -> Option<TimeIndexedSample<'_>> {
        self.samples().last()
    }

    /// Position of a named component
    pub fn component_index(&self, name: &str) -> Result<usize> {
        self.components
            .iter()
            .position(|component| component == name)
            .ok_or_else(|| {
                ForecastError::Prediction(format!(
                    "Series has no component '{}' (available: {})",
                    name,
                    self.components.join(", ")
                ))
            })
    }

    /// Values of a named component across all steps
    pub fn component(&self, name: &str) -> Result<Vec<f64>> {
        let index = self.component_index(name)?;
        Ok(self.values.iter().map(|row| row[index]).collect())
    }

    /// Whether each timestamp is later than the previous one
    pub fn is_strictly_increasing(&self) -> bool {
        self.timestamps.windows(2).all(|pair| pair[0] < pair[1])
    }
}

/// Generate `steps` timestamps starting at `start`
pub fn time_index(
    start: NaiveDateTime,
    frequency: Frequency,
    steps: usize,
) -> Result<Vec<NaiveDateTime>> {
    let mut timestamps = Vec::with_capacity(steps);
    let mut current = start;

    for step in 0..steps {
        if step > 0 {
            current = frequency.advance(current).ok_or_else(|| {
                ForecastError::Prediction("Time index overflowed the calendar".to_string())
            })?;
        }
        timestamps.push(current);
    }

    Ok(timestamps)
}

/// Names of the meal features, in model input order
pub const MEAL_FEATURES: [&str; 5] = ["fish", "chicken", "vegetarian", "meat", "vegan"];

/// Hypothetical number of portions sold per meal type
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MealComposition {
    pub fish: f64,
    pub chicken: f64,
    pub vegetarian: f64,
    pub meat: f64,
    pub vegan: f64,
}

impl MealComposition {
    /// Create a composition, rejecting negative or non-finite counts
    pub fn new(fish: f64, chicken: f64, vegetarian: f64, meat: f64, vegan: f64) -> Result<Self> {
        let composition = Self {
            fish,
            chicken,
            vegetarian,
            meat,
            vegan,
        };
        composition.validate()?;
        Ok(composition)
    }

    pub fn validate(&self) -> Result<()> {
        for (name, value) in MEAL_FEATURES.iter().zip(self.to_features()) {
            if !value.is_finite() || value < 0.0 {
                return Err(ForecastError::InvalidParameter(format!(
                    "Meal count '{}' must be a non-negative number, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }

    /// Feature vector in [`MEAL_FEATURES`] order
    pub fn to_features(&self) -> [f64; 5] {
        [self.fish, self.chicken, self.vegetarian, self.meat, self.vegan]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn start() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 9)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_from_columns_builds_rows() {
        let series = ForecastSeries::from_columns(
            start(),
            Frequency::Hourly,
            vec!["a".to_string(), "b".to_string()],
            vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]],
        )
        .unwrap();

        assert_eq!(series.len(), 3);
        assert_eq!(series.last().unwrap().values, &[3.0, 6.0]);
        assert_eq!(series.component("b").unwrap(), vec![4.0, 5.0, 6.0]);
        assert!(series.is_strictly_increasing());
        assert_eq!(series.timestamps()[2], start() + chrono::Duration::hours(2));
    }

    #[test]
    fn test_new_rejects_ragged_rows() {
        let result = ForecastSeries::new(
            vec![start()],
            vec!["a".to_string(), "b".to_string()],
            vec![vec![1.0]],
        );
        assert!(matches!(result, Err(ForecastError::Prediction(_))));
    }

    #[test]
    fn test_missing_component_is_reported() {
        let series =
            ForecastSeries::new(vec![start()], vec!["a".to_string()], vec![vec![1.0]]).unwrap();
        let err = series.component("z").unwrap_err();
        assert!(err.to_string().contains("'z'"));
    }

    #[test]
    fn test_meal_composition_validation() {
        assert!(MealComposition::new(1.0, 2.0, 3.0, 4.0, 5.0).is_ok());
        assert!(MealComposition::new(-1.0, 0.0, 0.0, 0.0, 0.0).is_err());
        assert!(MealComposition::new(0.0, f64::NAN, 0.0, 0.0, 0.0).is_err());
        assert_eq!(
            MealComposition::new(1.0, 2.0, 3.0, 4.0, 5.0).unwrap().to_features(),
            [1.0, 2.0, 3.0, 4.0, 5.0]
        );
    }
}

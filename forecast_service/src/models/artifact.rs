//! Portable JSON artifacts for pre-fitted models
//!
//! A series artifact looks like
//!
//! ```json
//! {
//!   "name": "receipt-Chemicum",
//!   "start": "2024-05-09T10:00:00",
//!   "frequency": "hourly",
//!   "components": [
//!     { "name": "num_receipts",
//!       "model": { "kind": "autoregressive", "intercept": 12.0,
//!                  "coefficients": [0.6], "differences": 0,
//!                  "history": [31.0, 28.0] } }
//!   ]
//! }
//! ```
//!
//! and a regressor artifact names its input features and outputs next to a
//! `linear` or `tree_ensemble` model body.

use crate::category::Frequency;
use crate::error::{ForecastError, Result};
use crate::models::arima::TrainedArimaModel;
use crate::models::exponential_smoothing::TrainedExponentialSmoothing;
use crate::models::linear::LinearRegressor;
use crate::models::moving_average::TrainedSimpleMA;
use crate::models::seasonal::SeasonalProfile;
use crate::models::tree_ensemble::{RegressionTree, TreeEnsembleRegressor, TreeNode};
use crate::models::{
    Component, ComponentForecaster, ComponentSeriesModel, Regressor, SeriesModel,
};
use chrono::NaiveDateTime;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// Stored form of a multi-component series model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesArtifact {
    pub name: String,
    /// Timestamp of the first forecast step
    pub start: NaiveDateTime,
    pub frequency: Frequency,
    pub components: Vec<ComponentArtifact>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentArtifact {
    pub name: String,
    pub model: ComponentModelArtifact,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ComponentModelArtifact {
    Autoregressive {
        intercept: f64,
        coefficients: Vec<f64>,
        #[serde(default)]
        differences: usize,
        history: Vec<f64>,
    },
    ExponentialSmoothing {
        level: f64,
        #[serde(default)]
        trend: Option<f64>,
    },
    MovingAverage {
        window: usize,
        history: Vec<f64>,
    },
    Seasonal {
        pattern: Vec<f64>,
        #[serde(default)]
        phase: usize,
    },
}

/// Stored form of a regressor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressorArtifact {
    pub name: String,
    /// Input feature names, in order
    pub features: Vec<String>,
    /// Output names, in order
    pub outputs: Vec<String>,
    pub model: RegressorModelArtifact,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RegressorModelArtifact {
    Linear {
        intercepts: Vec<f64>,
        coefficients: Vec<Vec<f64>>,
    },
    TreeEnsemble {
        base_score: f64,
        trees: Vec<TreeArtifact>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeArtifact {
    pub nodes: Vec<TreeNode>,
}

impl ComponentModelArtifact {
    fn into_forecaster(self) -> Result<Box<dyn ComponentForecaster>> {
        let model: Box<dyn ComponentForecaster> = match self {
            ComponentModelArtifact::Autoregressive {
                intercept,
                coefficients,
                differences,
                history,
            } => Box::new(TrainedArimaModel::new(
                intercept,
                coefficients,
                differences,
                history,
            )?),
            ComponentModelArtifact::ExponentialSmoothing { level, trend } => {
                Box::new(TrainedExponentialSmoothing::new(level, trend)?)
            }
            ComponentModelArtifact::MovingAverage { window, history } => {
                Box::new(TrainedSimpleMA::new(window, history)?)
            }
            ComponentModelArtifact::Seasonal { pattern, phase } => {
                Box::new(SeasonalProfile::new(pattern, phase)?)
            }
        };
        Ok(model)
    }
}

impl SeriesArtifact {
    /// Build the executable model
    pub fn into_model(self) -> Result<ComponentSeriesModel> {
        let mut components = Vec::with_capacity(self.components.len());
        for component in self.components {
            if components.iter().any(|c: &Component| c.name == component.name) {
                return Err(ForecastError::InvalidParameter(format!(
                    "Duplicate component '{}'",
                    component.name
                )));
            }
            components.push(Component {
                name: component.name,
                model: component.model.into_forecaster()?,
            });
        }

        ComponentSeriesModel::new(self.name, self.start, self.frequency, components)
    }
}

impl RegressorArtifact {
    /// Build the executable model, checking declared features and outputs
    /// against the model body
    pub fn into_model(self) -> Result<Box<dyn Regressor>> {
        let n_features = self.features.len();
        let model: Box<dyn Regressor> = match self.model {
            RegressorModelArtifact::Linear {
                intercepts,
                coefficients,
            } => Box::new(LinearRegressor::new(self.name, intercepts, coefficients)?),
            RegressorModelArtifact::TreeEnsemble { base_score, trees } => {
                let trees = trees
                    .into_iter()
                    .map(|tree| RegressionTree::new(tree.nodes, n_features))
                    .collect::<Result<Vec<_>>>()?;
                Box::new(TreeEnsembleRegressor::new(
                    self.name, base_score, trees, n_features,
                )?)
            }
        };

        if model.n_features() != n_features {
            return Err(ForecastError::InvalidParameter(format!(
                "Model body uses {} features but {} are declared",
                model.n_features(),
                n_features
            )));
        }

        if model.n_outputs() != self.outputs.len() {
            return Err(ForecastError::InvalidParameter(format!(
                "Model body produces {} outputs but {} are declared",
                model.n_outputs(),
                self.outputs.len()
            )));
        }

        Ok(model)
    }
}

/// Read and deserialize a JSON artifact, reporting failures as model-load errors
pub fn read_artifact<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let file = File::open(path).map_err(|e| ForecastError::model_load(path, e))?;
    serde_json::from_reader(BufReader::new(file)).map_err(|e| ForecastError::model_load(path, e))
}

/// Serialize an artifact as pretty JSON
pub fn write_artifact<T: Serialize>(path: &Path, artifact: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = File::create(path)?;
    serde_json::to_writer_pretty(BufWriter::new(file), artifact)?;
    Ok(())
}

/// Load a series model and check it runs at the expected frequency
pub fn load_series_model(path: &Path, frequency: Frequency) -> Result<Box<dyn SeriesModel>> {
    let artifact: SeriesArtifact = read_artifact(path)?;
    if artifact.frequency != frequency {
        return Err(ForecastError::model_load(
            path,
            format!(
                "expected {:?} frequency, artifact declares {:?}",
                frequency, artifact.frequency
            ),
        ));
    }

    let model = artifact
        .into_model()
        .map_err(|e| ForecastError::model_load(path, e))?;
    Ok(Box::new(model))
}

/// Load a regressor and check its features and output count
pub fn load_regressor(
    path: &Path,
    features: &[&str],
    n_outputs: usize,
) -> Result<Box<dyn Regressor>> {
    let artifact: RegressorArtifact = read_artifact(path)?;

    if artifact.features.iter().map(String::as_str).ne(features.iter().copied()) {
        return Err(ForecastError::model_load(
            path,
            format!(
                "expected features [{}], artifact declares [{}]",
                features.join(", "),
                artifact.features.join(", ")
            ),
        ));
    }

    if artifact.outputs.len() != n_outputs {
        return Err(ForecastError::model_load(
            path,
            format!(
                "expected {} outputs, artifact declares {}",
                n_outputs,
                artifact.outputs.len()
            ),
        ));
    }

    artifact
        .into_model()
        .map_err(|e| ForecastError::model_load(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::MEAL_FEATURES;
    use tempfile::tempdir;

    const SERIES_JSON: &str = r#"{
        "name": "biowaste-Exactum",
        "start": "2024-05-09T00:00:00",
        "frequency": "daily",
        "components": [
            {"name": "amnt_waste_customer",
             "model": {"kind": "exponential_smoothing", "level": 4.5}},
            {"name": "amnt_waste_kitchen",
             "model": {"kind": "autoregressive", "intercept": 1.0,
                       "coefficients": [0.5], "history": [6.0, 4.0]}},
            {"name": "amnt_waste_hall",
             "model": {"kind": "moving_average", "window": 2, "history": [1.0, 3.0]}},
            {"name": "amnt_waste_coffee",
             "model": {"kind": "seasonal", "pattern": [0.5, 0.7]}}
        ]
    }"#;

    #[test]
    fn test_series_artifact_builds_model() {
        let artifact: SeriesArtifact = serde_json::from_str(SERIES_JSON).unwrap();
        let model = artifact.into_model().unwrap();
        let series = model.predict(2).unwrap();

        assert_eq!(series.components().len(), 4);
        assert_eq!(series.component("amnt_waste_customer").unwrap(), vec![4.5, 4.5]);
        assert_eq!(series.component("amnt_waste_kitchen").unwrap(), vec![3.0, 2.5]);
        assert_eq!(series.component("amnt_waste_hall").unwrap(), vec![2.0, 2.5]);
        assert_eq!(series.component("amnt_waste_coffee").unwrap(), vec![0.5, 0.7]);
    }

    #[test]
    fn test_duplicate_components_are_rejected() {
        let mut artifact: SeriesArtifact = serde_json::from_str(SERIES_JSON).unwrap();
        let first = artifact.components[0].clone();
        artifact.components.push(first);
        assert!(artifact.into_model().is_err());
    }

    #[test]
    fn test_frequency_mismatch_is_a_load_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("biowaste/Exactum.json");
        let artifact: SeriesArtifact = serde_json::from_str(SERIES_JSON).unwrap();
        write_artifact(&path, &artifact).unwrap();

        assert!(load_series_model(&path, Frequency::Daily).is_ok());
        let err = load_series_model(&path, Frequency::Hourly).unwrap_err();
        assert!(matches!(err, ForecastError::ModelLoad { .. }));
    }

    #[test]
    fn test_missing_file_is_a_load_error() {
        let dir = tempdir().unwrap();
        let err = load_series_model(&dir.path().join("nope.json"), Frequency::Daily).unwrap_err();
        assert!(matches!(err, ForecastError::ModelLoad { .. }));
    }

    #[test]
    fn test_regressor_output_count_is_checked() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("co2.json");
        let artifact = RegressorArtifact {
            name: "co2".to_string(),
            features: MEAL_FEATURES.iter().map(|f| f.to_string()).collect(),
            outputs: vec!["co2".to_string()],
            model: RegressorModelArtifact::Linear {
                intercepts: vec![0.2],
                coefficients: vec![vec![0.1; 5]],
            },
        };
        write_artifact(&path, &artifact).unwrap();

        let model = load_regressor(&path, &MEAL_FEATURES, 1).unwrap();
        assert_eq!(model.n_outputs(), 1);
        assert!(load_regressor(&path, &MEAL_FEATURES, 2).is_err());
        assert!(load_regressor(&path, &["fish"], 1).is_err());
    }

    #[test]
    fn test_declared_outputs_must_match_body() {
        let artifact = RegressorArtifact {
            name: "waste".to_string(),
            features: MEAL_FEATURES.iter().map(|f| f.to_string()).collect(),
            outputs: vec!["customer".to_string(), "kitchen".to_string()],
            model: RegressorModelArtifact::Linear {
                intercepts: vec![0.2],
                coefficients: vec![vec![0.1; 5]],
            },
        };
        assert!(artifact.into_model().is_err());
    }
}

//! Service configuration

use crate::error::{ForecastError, Result};
use crate::pipelines::{default_first_eligible_date, WASTE_THRESHOLD_GRAMS};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable overriding [`ServiceConfig::model_root`]
pub const MODEL_ROOT_ENV: &str = "FWO_MODEL_ROOT";

/// Default artifact directory, relative to the working directory
pub const DEFAULT_MODEL_ROOT: &str = "trained_models";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServiceConfig {
    /// Directory holding the model artifacts
    pub model_root: PathBuf,
    /// First date the day-ahead receipt model can forecast
    pub first_eligible_date: NaiveDate,
    /// Reference line on the per-customer waste chart
    pub waste_threshold_grams: f64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            model_root: PathBuf::from(DEFAULT_MODEL_ROOT),
            first_eligible_date: default_first_eligible_date(),
            waste_threshold_grams: WASTE_THRESHOLD_GRAMS,
        }
    }
}

impl ServiceConfig {
    /// Read a JSON config file. Missing keys take their defaults.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let config: Self = serde_json::from_reader(BufReader::new(file))?;
        debug!(path = %path.display(), "loaded config");
        config.validated()
    }

    /// Defaults, or the given file, with environment overrides applied
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        Ok(config.with_env_overrides(|key| std::env::var(key).ok()))
    }

    /// Apply overrides from an environment lookup
    pub fn with_env_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(root) = lookup(MODEL_ROOT_ENV).filter(|value| !value.is_empty()) {
            debug!(%root, "model root taken from {}", MODEL_ROOT_ENV);
            self.model_root = PathBuf::from(root);
        }
        self
    }

    fn validated(self) -> Result<Self> {
        if !self.waste_threshold_grams.is_finite() || self.waste_threshold_grams < 0.0 {
            return Err(ForecastError::InvalidParameter(format!(
                "waste_threshold_grams must be a non-negative number, got {}",
                self.waste_threshold_grams
            )));
        }
        Ok(self)
    }
}

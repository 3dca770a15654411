//! Registry owning every trained model of the service
//!
//! The registry is built once, either from artifacts on disk with
//! [`ModelRegistry::load`] or from in-memory models with
//! [`RegistryBuilder`]. Both paths fill every slot or fail; afterwards the
//! registry is read-only and pipelines only borrow it.

use crate::category::{Frequency, MetricCategory, ModelShape};
use crate::data::MEAL_FEATURES;
use crate::error::{ForecastError, Result};
use crate::models::artifact::{load_regressor, load_series_model};
use crate::models::{Regressor, SeriesModel};
use crate::restaurant::{PerRestaurant, RestaurantKey};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Outputs of the meal-to-waste regressor: customer-area and kitchen-area waste
pub const WASTE_OUTPUTS: usize = 2;

/// Outputs of the meal-to-CO2 regressor
pub const CO2_OUTPUTS: usize = 1;

/// Conventional artifact locations below a model root directory
#[derive(Debug, Clone)]
pub struct ArtifactLayout {
    root: PathBuf,
}

impl ArtifactLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `<root>/<category>/<Restaurant>.json` for time-series categories
    pub fn series_path(&self, category: MetricCategory, restaurant: RestaurantKey) -> PathBuf {
        self.root
            .join(category.as_str())
            .join(format!("{}.json", restaurant.name()))
    }

    /// `<root>/receipt/by_day.json`
    pub fn day_ahead_path(&self) -> PathBuf {
        self.root
            .join(MetricCategory::Receipt.as_str())
            .join("by_day.json")
    }

    /// `<root>/biowaste/from_meal_<Restaurant>.json` or
    /// `<root>/co2/from_meal_<Restaurant>.json`
    pub fn regressor_path(&self, category: MetricCategory, restaurant: RestaurantKey) -> PathBuf {
        let directory = match category {
            MetricCategory::MealToCo2 => "co2",
            _ => "biowaste",
        };
        self.root
            .join(directory)
            .join(format!("from_meal_{}.json", restaurant.name()))
    }
}

/// Every trained model, keyed by restaurant and metric category
#[derive(Debug)]
pub struct ModelRegistry {
    receipt: PerRestaurant<Box<dyn SeriesModel>>,
    occupancy: PerRestaurant<Box<dyn SeriesModel>>,
    biowaste: PerRestaurant<Box<dyn SeriesModel>>,
    meal: PerRestaurant<Box<dyn SeriesModel>>,
    /// Joint business-day receipt model with one `<Restaurant>_rcpts` field each
    receipt_by_day: Box<dyn SeriesModel>,
    waste_from_meal: PerRestaurant<Box<dyn Regressor>>,
    co2_from_meal: PerRestaurant<Box<dyn Regressor>>,
}

impl ModelRegistry {
    /// Load every artifact below `root`, failing on the first missing or
    /// malformed one
    pub fn load(root: impl AsRef<Path>) -> Result<Self> {
        let layout = ArtifactLayout::new(root.as_ref());
        let mut builder = RegistryBuilder::new();

        for category in MetricCategory::SERIES {
            info!("Load trained {} forecasting models for 3 restaurants", category);
            let frequency = category
                .time_granularity()
                .map(|granularity| granularity.frequency())
                .unwrap_or(Frequency::Daily);

            for restaurant in RestaurantKey::ALL {
                let path = layout.series_path(category, restaurant);
                debug!(path = %path.display(), "loading series artifact");
                let model = load_series_model(&path, frequency)?;
                builder = builder.series(category, restaurant, model);
            }
        }

        info!("Load trained receipt forecasting model by day");
        let model = load_series_model(&layout.day_ahead_path(), Frequency::BusinessDaily)?;
        builder = builder.day_ahead_receipts(model);

        for (category, n_outputs) in [
            (MetricCategory::MealToWaste, WASTE_OUTPUTS),
            (MetricCategory::MealToCo2, CO2_OUTPUTS),
        ] {
            info!("Load trained {} regressors by restaurant", category);
            for restaurant in RestaurantKey::ALL {
                let path = layout.regressor_path(category, restaurant);
                debug!(path = %path.display(), "loading regressor artifact");
                let model = load_regressor(&path, &MEAL_FEATURES, n_outputs)?;
                builder = builder.regressor(category, restaurant, model);
            }
        }

        builder.build().map_err(|e| match e {
            ForecastError::ModelLoad { reason, .. } => ForecastError::ModelLoad {
                path: layout.root().to_path_buf(),
                reason,
            },
            other => other,
        })
    }

    /// Start assembling a registry from in-memory models
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Series model of a time-series category
    pub fn series_model(
        &self,
        restaurant: RestaurantKey,
        category: MetricCategory,
    ) -> Result<&dyn SeriesModel> {
        let table = match category {
            MetricCategory::Receipt => &self.receipt,
            MetricCategory::Occupancy => &self.occupancy,
            MetricCategory::Biowaste => &self.biowaste,
            MetricCategory::MealMix => &self.meal,
            MetricCategory::MealToWaste | MetricCategory::MealToCo2 => {
                return Err(ForecastError::InvalidParameter(format!(
                    "{} is served by a regressor, not a series model",
                    category
                )))
            }
        };
        Ok(table.get(restaurant).as_ref())
    }

    /// Regressor of a regression category
    pub fn regressor(
        &self,
        restaurant: RestaurantKey,
        category: MetricCategory,
    ) -> Result<&dyn Regressor> {
        match category {
            MetricCategory::MealToWaste => Ok(self.waste_from_meal.get(restaurant).as_ref()),
            MetricCategory::MealToCo2 => Ok(self.co2_from_meal.get(restaurant).as_ref()),
            other => Err(ForecastError::InvalidParameter(format!(
                "{} is served by a series model, not a regressor",
                other
            ))),
        }
    }

    /// The joint business-day receipt model
    pub fn day_ahead_receipts(&self) -> &dyn SeriesModel {
        self.receipt_by_day.as_ref()
    }
}

type SlotKey = (MetricCategory, RestaurantKey);

/// Collects models slot by slot; [`RegistryBuilder::build`] checks that every
/// slot is filled.
#[derive(Default)]
pub struct RegistryBuilder {
    series: HashMap<SlotKey, Box<dyn SeriesModel>>,
    regressors: HashMap<SlotKey, Box<dyn Regressor>>,
    day_ahead: Option<Box<dyn SeriesModel>>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn series(
        mut self,
        category: MetricCategory,
        restaurant: RestaurantKey,
        model: Box<dyn SeriesModel>,
    ) -> Self {
        self.series.insert((category, restaurant), model);
        self
    }

    pub fn regressor(
        mut self,
        category: MetricCategory,
        restaurant: RestaurantKey,
        model: Box<dyn Regressor>,
    ) -> Self {
        self.regressors.insert((category, restaurant), model);
        self
    }

    pub fn day_ahead_receipts(mut self, model: Box<dyn SeriesModel>) -> Self {
        self.day_ahead = Some(model);
        self
    }

    /// Validate and freeze the registry.
    ///
    /// Reports every empty slot at once, rejects models registered under the
    /// wrong kind of category, checks regressor shapes and checks that the
    /// day-ahead model exposes a receipt field for every restaurant.
    pub fn build(mut self) -> Result<ModelRegistry> {
        let mut problems = Vec::new();

        for (category, _) in self.series.keys() {
            if category.shape() != ModelShape::TimeSeries {
                problems.push(format!("{} registered as a series model", category));
            }
        }
        for (category, _) in self.regressors.keys() {
            if category.shape() != ModelShape::Regression {
                problems.push(format!("{} registered as a regressor", category));
            }
        }

        for category in MetricCategory::SERIES {
            for restaurant in RestaurantKey::ALL {
                if !self.series.contains_key(&(category, restaurant)) {
                    problems.push(format!("missing {} model for {}", category, restaurant));
                }
            }
        }

        for (category, n_outputs) in [
            (MetricCategory::MealToWaste, WASTE_OUTPUTS),
            (MetricCategory::MealToCo2, CO2_OUTPUTS),
        ] {
            for restaurant in RestaurantKey::ALL {
                match self.regressors.get(&(category, restaurant)) {
                    None => problems.push(format!("missing {} model for {}", category, restaurant)),
                    Some(model) => {
                        if model.n_features() != MEAL_FEATURES.len() {
                            problems.push(format!(
                                "{} model for {} takes {} features, expected {}",
                                category,
                                restaurant,
                                model.n_features(),
                                MEAL_FEATURES.len()
                            ));
                        }
                        if model.n_outputs() != n_outputs {
                            problems.push(format!(
                                "{} model for {} returns {} outputs, expected {}",
                                category,
                                restaurant,
                                model.n_outputs(),
                                n_outputs
                            ));
                        }
                    }
                }
            }
        }

        match &self.day_ahead {
            None => problems.push("missing day-ahead receipt model".to_string()),
            Some(model) => match model.predict(1) {
                Ok(probe) => {
                    for restaurant in RestaurantKey::ALL {
                        if probe.component_index(&restaurant.receipt_field()).is_err() {
                            problems.push(format!(
                                "day-ahead receipt model has no '{}' field",
                                restaurant.receipt_field()
                            ));
                        }
                    }
                }
                Err(e) => problems.push(format!("day-ahead receipt model fails to predict: {}", e)),
            },
        }

        if !problems.is_empty() {
            return Err(ForecastError::model_load("<registry>", problems.join("; ")));
        }

        let mut take_series = |category: MetricCategory| {
            PerRestaurant::try_from_fn(|restaurant| {
                self.series
                    .remove(&(category, restaurant))
                    .ok_or_else(|| missing_slot(category, restaurant))
            })
        };
        let receipt = take_series(MetricCategory::Receipt)?;
        let occupancy = take_series(MetricCategory::Occupancy)?;
        let biowaste = take_series(MetricCategory::Biowaste)?;
        let meal = take_series(MetricCategory::MealMix)?;

        let mut take_regressors = |category: MetricCategory| {
            PerRestaurant::try_from_fn(|restaurant| {
                self.regressors
                    .remove(&(category, restaurant))
                    .ok_or_else(|| missing_slot(category, restaurant))
            })
        };
        let waste_from_meal = take_regressors(MetricCategory::MealToWaste)?;
        let co2_from_meal = take_regressors(MetricCategory::MealToCo2)?;

        let receipt_by_day = self
            .day_ahead
            .take()
            .ok_or_else(|| ForecastError::model_load("<registry>", "missing day-ahead receipt model"))?;

        info!("Model registry ready");
        Ok(ModelRegistry {
            receipt,
            occupancy,
            biowaste,
            meal,
            receipt_by_day,
            waste_from_meal,
            co2_from_meal,
        })
    }
}

fn missing_slot(category: MetricCategory, restaurant: RestaurantKey) -> ForecastError {
    ForecastError::model_load(
        "<registry>",
        format!("missing {} model for {}", category, restaurant),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_paths() {
        let layout = ArtifactLayout::new("/trained_models");
        assert_eq!(
            layout.series_path(MetricCategory::MealMix, RestaurantKey::Exactum),
            PathBuf::from("/trained_models/meal/Exactum.json")
        );
        assert_eq!(
            layout.day_ahead_path(),
            PathBuf::from("/trained_models/receipt/by_day.json")
        );
        assert_eq!(
            layout.regressor_path(MetricCategory::MealToCo2, RestaurantKey::Physicum),
            PathBuf::from("/trained_models/co2/from_meal_Physicum.json")
        );
        assert_eq!(
            layout.regressor_path(MetricCategory::MealToWaste, RestaurantKey::Chemicum),
            PathBuf::from("/trained_models/biowaste/from_meal_Chemicum.json")
        );
    }

    #[test]
    fn test_empty_builder_lists_every_missing_slot() {
        let err = ModelRegistry::builder().build().unwrap_err();
        let message = err.to_string();

        assert!(matches!(err, ForecastError::ModelLoad { .. }));
        assert!(message.contains("missing receipt model for Chemicum"));
        assert!(message.contains("missing meal_to_co2 model for Exactum"));
        assert!(message.contains("missing day-ahead receipt model"));
    }
}

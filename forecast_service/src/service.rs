//! Forecast orchestration service
//!
//! Owns the loaded [`ModelRegistry`] and the [`ServiceConfig`], and exposes
//! the operations callers use: horizon forecasts reshaped into date-keyed
//! records, the meal-to-waste pipeline and the meal-to-CO2 pipeline.

use crate::batch::{BatchOutcome, BatchResult, BatchRow, MealRequest};
use crate::category::MetricCategory;
use crate::config::ServiceConfig;
use crate::data::MealComposition;
use crate::error::{ForecastError, Result};
use crate::forecaster::HorizonForecaster;
use crate::pipelines::{
    Co2Prediction, MealToCo2Pipeline, MealToWasteOutput, MealToWastePipeline, OutputMode,
};
use crate::registry::ModelRegistry;
use crate::reshape::{post_process_records, reshape, DateKeyedRecord};
use crate::restaurant::RestaurantKey;
use tracing::{debug, info, warn};

#[derive(Debug)]
pub struct ForecastService {
    registry: ModelRegistry,
    config: ServiceConfig,
}

impl ForecastService {
    pub fn new(registry: ModelRegistry, config: ServiceConfig) -> Self {
        Self { registry, config }
    }

    /// Load the registry from `config.model_root`
    pub fn from_config(config: ServiceConfig) -> Result<Self> {
        info!(root = %config.model_root.display(), "Loading model registry");
        let registry = ModelRegistry::load(&config.model_root)?;
        Ok(Self::new(registry, config))
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Forecast `number_of_days` of a time-series category for every
    /// restaurant, merged by timestamp and post-processed
    pub fn forecast_series(
        &self,
        category: MetricCategory,
        number_of_days: usize,
    ) -> Result<Vec<DateKeyedRecord>> {
        let granularity = category.time_granularity().ok_or_else(|| {
            ForecastError::InvalidParameter(format!("{} is not a time-series category", category))
        })?;

        let series = HorizonForecaster::new(&self.registry).forecast_all(category, number_of_days)?;
        let records = post_process_records(reshape(granularity, &series));
        debug!(%category, number_of_days, records = records.len(), "reshaped forecast");
        Ok(records)
    }

    pub fn forecast_receipts(&self, number_of_days: usize) -> Result<Vec<DateKeyedRecord>> {
        self.forecast_series(MetricCategory::Receipt, number_of_days)
    }

    pub fn forecast_occupancy(&self, number_of_days: usize) -> Result<Vec<DateKeyedRecord>> {
        self.forecast_series(MetricCategory::Occupancy, number_of_days)
    }

    pub fn forecast_biowaste(&self, number_of_days: usize) -> Result<Vec<DateKeyedRecord>> {
        self.forecast_series(MetricCategory::Biowaste, number_of_days)
    }

    pub fn forecast_meal_mix(&self, number_of_days: usize) -> Result<Vec<DateKeyedRecord>> {
        self.forecast_series(MetricCategory::MealMix, number_of_days)
    }

    fn meal_to_waste(&self) -> MealToWastePipeline<'_> {
        MealToWastePipeline::new(&self.registry)
            .with_first_eligible_date(self.config.first_eligible_date)
            .with_waste_threshold(self.config.waste_threshold_grams)
    }

    /// Per-customer waste on `date` for a hypothetical meal composition
    pub fn forecast_meal_to_waste(
        &self,
        restaurant: RestaurantKey,
        composition: &MealComposition,
        date: &str,
        mode: OutputMode,
    ) -> Result<MealToWasteOutput> {
        self.meal_to_waste().run(restaurant, composition, date, mode)
    }

    pub fn forecast_meal_to_co2(
        &self,
        restaurant: RestaurantKey,
        composition: &MealComposition,
    ) -> Result<Co2Prediction> {
        MealToCo2Pipeline::new(&self.registry).run(restaurant, composition)
    }

    /// Run one request; a date selects the waste pipeline, no date the
    /// CO2 pipeline
    pub fn run_request(&self, request: &MealRequest) -> BatchOutcome {
        let result = match &request.date {
            Some(date) => self
                .forecast_meal_to_waste(
                    request.restaurant,
                    &request.composition,
                    date,
                    OutputMode::Numeric,
                )
                .and_then(|output| match output {
                    MealToWasteOutput::Numeric(result) => Ok(BatchResult::Waste(result)),
                    MealToWasteOutput::Image(_) => Err(ForecastError::Prediction(
                        "Numeric mode returned an image".to_string(),
                    )),
                }),
            None => self
                .forecast_meal_to_co2(request.restaurant, &request.composition)
                .map(BatchResult::Co2),
        };

        if let Err(err) = &result {
            warn!(row = request.row, restaurant = %request.restaurant, "batch row failed: {}", err);
        }
        BatchOutcome::from_result(request, result)
    }

    /// Run every row in order; rejected rows are reported without running
    pub fn run_batch(&self, rows: &[BatchRow]) -> Vec<BatchOutcome> {
        rows.iter()
            .map(|row| match row {
                Ok(request) => self.run_request(request),
                Err(rejected) => {
                    warn!(row = rejected.row, "batch row rejected: {}", rejected.error);
                    BatchOutcome::rejected(rejected)
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::RejectedRow;
    use crate::category::Frequency;
    use crate::models::linear::LinearRegressor;
    use crate::models::seasonal::SeasonalProfile;
    use crate::models::{Component, ComponentSeriesModel, SeriesModel};
    use crate::reshape::RecordValue;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn series(start: &str, frequency: Frequency, fields: &[(&str, f64)]) -> Box<dyn SeriesModel> {
        let start = NaiveDate::parse_from_str(start, "%Y-%m-%d")
            .unwrap()
            .and_hms_opt(if frequency == Frequency::Hourly { 10 } else { 0 }, 0, 0)
            .unwrap();
        let components = fields
            .iter()
            .map(|(name, value)| Component {
                name: name.to_string(),
                model: Box::new(SeasonalProfile::new(vec![*value, -*value], 0).unwrap()),
            })
            .collect();
        Box::new(ComponentSeriesModel::new("fixture", start, frequency, components).unwrap())
    }

    fn service(receipts: f64) -> ForecastService {
        let mut builder = ModelRegistry::builder();
        for restaurant in RestaurantKey::ALL {
            builder = builder
                .series(
                    MetricCategory::Receipt,
                    restaurant,
                    series("2024-05-09", Frequency::Hourly, &[("receipts", 12.346)]),
                )
                .series(
                    MetricCategory::Occupancy,
                    restaurant,
                    series("2024-05-09", Frequency::Hourly, &[("occupancy", 50.0)]),
                )
                .series(
                    MetricCategory::Biowaste,
                    restaurant,
                    series(
                        "2024-05-09",
                        Frequency::Daily,
                        &[("amnt_waste_customer", 4.0), ("amnt_waste_kitchen", 2.0)],
                    ),
                )
                .series(
                    MetricCategory::MealMix,
                    restaurant,
                    series("2024-05-09", Frequency::Daily, &[("num_fish", 30.0), ("num_vegan", 8.0)]),
                )
                .regressor(
                    MetricCategory::MealToWaste,
                    restaurant,
                    Box::new(
                        LinearRegressor::new("waste", vec![6.0, 4.0], vec![vec![0.0; 5], vec![0.0; 5]])
                            .unwrap(),
                    ),
                )
                .regressor(
                    MetricCategory::MealToCo2,
                    restaurant,
                    Box::new(LinearRegressor::new("co2", vec![1.5], vec![vec![0.5; 5]]).unwrap()),
                );
        }
        let fields: Vec<(String, f64)> = RestaurantKey::ALL
            .iter()
            .map(|r| (r.receipt_field(), receipts))
            .collect();
        let fields: Vec<(&str, f64)> = fields.iter().map(|(n, v)| (n.as_str(), *v)).collect();
        let registry = builder
            .day_ahead_receipts(series("2024-05-09", Frequency::BusinessDaily, &fields))
            .build()
            .unwrap();

        ForecastService::new(registry, ServiceConfig::default())
    }

    #[test]
    fn test_receipts_are_post_processed_per_hour() {
        let records = service(250.0).forecast_receipts(1).unwrap();

        assert_eq!(records.len(), 9);
        assert_eq!(records[0].timestamp(), "2024-05-09 10:00:00");
        assert_eq!(records[0].key_field(), "datetime");
        assert_eq!(records[0].get(RestaurantKey::Exactum), Some(&RecordValue::Scalar(12.35)));
        // Alternating fixture dips below zero and is clamped
        assert_eq!(records[1].get(RestaurantKey::Exactum), Some(&RecordValue::Scalar(0.0)));
    }

    #[test]
    fn test_meal_mix_records_group_components() {
        let records = service(250.0).forecast_meal_mix(3).unwrap();

        assert_eq!(records.len(), 3);
        assert_eq!(records[2].timestamp(), "2024-05-11");
        let chemicum = records[0].get(RestaurantKey::Chemicum).unwrap();
        assert_eq!(chemicum.field("num_fish"), Some(30.0));
        assert_eq!(chemicum.field("num_vegan"), Some(8.0));
    }

    #[test]
    fn test_regression_category_is_not_a_series() {
        let result = service(250.0).forecast_series(MetricCategory::MealToCo2, 1);
        assert!(matches!(result, Err(ForecastError::InvalidParameter(_))));
    }

    #[test]
    fn test_meal_to_waste_numeric() {
        let composition = MealComposition::new(10.0, 20.0, 30.0, 40.0, 5.0).unwrap();
        let output = service(250.0)
            .forecast_meal_to_waste(RestaurantKey::Physicum, &composition, "2024-05-09", OutputMode::Numeric)
            .unwrap();

        match output {
            MealToWasteOutput::Numeric(result) => {
                assert_eq!(result.predicted_num_receipts, 250);
                assert_eq!(result.predicted_waste_per_customer, 40.0);
            }
            MealToWasteOutput::Image(_) => panic!("expected numeric output"),
        }
    }

    #[test]
    fn test_zero_receipts_leave_waste_per_customer_undefined() {
        let composition = MealComposition::new(10.0, 20.0, 30.0, 40.0, 5.0).unwrap();
        let result = service(0.0).forecast_meal_to_waste(
            RestaurantKey::Chemicum,
            &composition,
            "2024-05-09",
            OutputMode::Numeric,
        );

        assert!(matches!(result, Err(ForecastError::UndefinedMetric(_))));
    }

    #[test]
    fn test_batch_mixes_waste_co2_and_failures() {
        let composition = MealComposition::default();
        let requests = vec![
            Ok(MealRequest {
                row: 1,
                restaurant: RestaurantKey::Chemicum,
                date: Some("2024-05-09".to_string()),
                composition,
            }),
            Ok(MealRequest {
                row: 2,
                restaurant: RestaurantKey::Chemicum,
                date: None,
                composition,
            }),
            Ok(MealRequest {
                row: 3,
                restaurant: RestaurantKey::Exactum,
                date: Some("2024-05-11".to_string()),
                composition,
            }),
            Err(RejectedRow {
                row: 4,
                restaurant: "Kumpula".to_string(),
                error: ForecastError::InvalidParameter("Unknown restaurant: Kumpula".to_string()),
            }),
        ];

        let outcomes = service(250.0).run_batch(&requests);

        assert_eq!(outcomes.len(), 4);
        assert!(matches!(outcomes[0].result, Some(BatchResult::Waste(_))));
        assert_eq!(
            outcomes[1].result,
            Some(BatchResult::Co2(Co2Prediction { predicted_co2: 1.5 }))
        );
        assert!(!outcomes[2].is_ok());
        assert_eq!(outcomes[3].restaurant, "Kumpula");
        assert!(!outcomes[3].is_ok());
    }
}

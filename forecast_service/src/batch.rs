//! Batch meal requests read from CSV

use crate::data::MealComposition;
use crate::error::{ForecastError, Result};
use crate::pipelines::{Co2Prediction, MealToWasteResult};
use crate::restaurant::RestaurantKey;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct MealRow {
    restaurant: String,
    date: Option<String>,
    fish: f64,
    chicken: f64,
    vegetarian: f64,
    meat: f64,
    vegan: f64,
}

/// One row of a batch file
#[derive(Debug, Clone, PartialEq)]
pub struct MealRequest {
    /// 1-based data row number, header excluded
    pub row: usize,
    pub restaurant: RestaurantKey,
    /// Target date for the waste pipeline; `None` asks for CO2 only
    pub date: Option<String>,
    pub composition: MealComposition,
}

impl MealRow {
    fn into_request(self, row: usize) -> Result<MealRequest> {
        let at_row = |err: ForecastError| match err {
            ForecastError::InvalidParameter(msg) => {
                ForecastError::InvalidParameter(format!("row {}: {}", row, msg))
            }
            other => other,
        };
        let restaurant = self.restaurant.parse::<RestaurantKey>().map_err(at_row)?;
        let composition =
            MealComposition::new(self.fish, self.chicken, self.vegetarian, self.meat, self.vegan)
                .map_err(at_row)?;
        let date = self
            .date
            .map(|date| date.trim().to_string())
            .filter(|date| !date.is_empty());

        Ok(MealRequest {
            row,
            restaurant,
            date,
            composition,
        })
    }
}

/// A data row that could not be turned into a [`MealRequest`]
#[derive(Debug)]
pub struct RejectedRow {
    pub row: usize,
    /// Restaurant cell as written in the file
    pub restaurant: String,
    pub error: ForecastError,
}

/// Parsed request or the reason its row was rejected
pub type BatchRow = std::result::Result<MealRequest, RejectedRow>;

/// Parse requests with columns `restaurant,date,fish,chicken,vegetarian,meat,vegan`.
///
/// Bad cells reject only their own row. Unreadable input or a broken
/// header fails the whole file.
pub fn read_meal_requests<R: Read>(reader: R) -> Result<Vec<BatchRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers = reader.headers()?.clone();
    let restaurant_column = headers.iter().position(|name| name == "restaurant");

    let mut rows = Vec::new();
    for (i, record) in reader.records().enumerate() {
        let record = record?;
        let row = i + 1;
        let parsed = record
            .deserialize::<MealRow>(Some(&headers))
            .map_err(ForecastError::from)
            .and_then(|meal| meal.into_request(row))
            .map_err(|error| RejectedRow {
                row,
                restaurant: restaurant_column
                    .and_then(|column| record.get(column))
                    .unwrap_or_default()
                    .to_string(),
                error,
            });
        rows.push(parsed);
    }

    Ok(rows)
}

pub fn read_meal_requests_from_path<P: AsRef<Path>>(path: P) -> Result<Vec<BatchRow>> {
    read_meal_requests(File::open(path)?)
}

/// What a batch row produced
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum BatchResult {
    Waste(MealToWasteResult),
    Co2(Co2Prediction),
}

/// Per-row outcome; one failing row does not stop the batch
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchOutcome {
    pub row: usize,
    pub restaurant: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<BatchResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BatchOutcome {
    pub fn from_result(request: &MealRequest, result: Result<BatchResult>) -> Self {
        let (result, error) = match result {
            Ok(result) => (Some(result), None),
            Err(err) => (None, Some(err.to_string())),
        };
        Self {
            row: request.row,
            restaurant: request.restaurant.to_string(),
            result,
            error,
        }
    }

    pub fn rejected(rejected: &RejectedRow) -> Self {
        Self {
            row: rejected.row,
            restaurant: rejected.restaurant.clone(),
            result: None,
            error: Some(rejected.error.to_string()),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

//! Tabular export of date-keyed records

use crate::error::{ForecastError, Result};
use crate::reshape::{DateKeyedRecord, RecordValue};
use crate::restaurant::RestaurantKey;
use polars::prelude::*;
use std::io::Write;

/// Column of the flattened table: a restaurant scalar or one of its components
#[derive(Debug, Clone, PartialEq, Eq)]
enum ValueColumn {
    Scalar(RestaurantKey),
    Field(RestaurantKey, String),
}

impl ValueColumn {
    fn name(&self) -> String {
        match self {
            ValueColumn::Scalar(restaurant) => restaurant.name().to_string(),
            ValueColumn::Field(restaurant, field) => format!("{}.{}", restaurant.name(), field),
        }
    }

    fn extract(&self, record: &DateKeyedRecord) -> Option<f64> {
        match self {
            ValueColumn::Scalar(restaurant) => record.get(*restaurant)?.as_scalar(),
            ValueColumn::Field(restaurant, field) => record.get(*restaurant)?.field(field),
        }
    }
}

fn value_columns(records: &[DateKeyedRecord]) -> Vec<ValueColumn> {
    let mut columns = Vec::new();
    for restaurant in RestaurantKey::ALL {
        for record in records {
            let candidates = match record.get(restaurant) {
                Some(RecordValue::Scalar(_)) => vec![ValueColumn::Scalar(restaurant)],
                Some(RecordValue::Group(fields)) => fields
                    .iter()
                    .map(|(name, _)| ValueColumn::Field(restaurant, name.clone()))
                    .collect(),
                None => Vec::new(),
            };
            for column in candidates {
                if !columns.contains(&column) {
                    columns.push(column);
                }
            }
        }
    }
    columns
}

/// Flatten records into a frame.
///
/// The first column holds the timestamp and is named after the record key.
/// Group values become `<Restaurant>.<component>` columns; a restaurant
/// missing from a record leaves nulls.
pub fn records_to_dataframe(records: &[DateKeyedRecord]) -> Result<DataFrame> {
    let key_field = records
        .first()
        .map(DateKeyedRecord::key_field)
        .ok_or_else(|| ForecastError::InvalidParameter("No records to export".to_string()))?;

    if records.iter().any(|record| record.key_field() != key_field) {
        return Err(ForecastError::InvalidParameter(
            "Records mix date and datetime keys".to_string(),
        ));
    }

    let timestamps: Vec<&str> = records.iter().map(DateKeyedRecord::timestamp).collect();
    let mut series = vec![Series::new(key_field, timestamps)];

    for column in value_columns(records) {
        let values: Vec<Option<f64>> = records.iter().map(|record| column.extract(record)).collect();
        series.push(Series::new(&column.name(), values));
    }

    Ok(DataFrame::new(series)?)
}

/// Write records as CSV with a header row
pub fn write_records_csv<W: Write>(records: &[DateKeyedRecord], writer: W) -> Result<()> {
    let mut df = records_to_dataframe(records)?;
    CsvWriter::new(writer).has_header(true).finish(&mut df)?;
    Ok(())
}

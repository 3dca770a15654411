//! Series reshaping into date-keyed records and post-processing

use crate::category::TimeGranularity;
use crate::data::ForecastSeries;
use crate::restaurant::{PerRestaurant, RestaurantKey};
use serde::ser::{Serialize, SerializeMap, Serializer};
use service_math::post_process;
use std::collections::HashMap;

/// Value reported by one restaurant for one timestamp
#[derive(Debug, Clone, PartialEq)]
pub enum RecordValue {
    /// Single-component series (receipts, occupancy)
    Scalar(f64),
    /// Multi-component series, keyed by component name (biowaste, meal mix)
    Group(Vec<(String, f64)>),
}

impl RecordValue {
    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            RecordValue::Scalar(value) => Some(*value),
            RecordValue::Group(_) => None,
        }
    }

    /// Look up a component of a group value
    pub fn field(&self, name: &str) -> Option<f64> {
        match self {
            RecordValue::Scalar(_) => None,
            RecordValue::Group(fields) => fields
                .iter()
                .find(|(field, _)| field == name)
                .map(|(_, value)| *value),
        }
    }

    fn map_leaves(self, f: impl Fn(f64) -> f64) -> Self {
        match self {
            RecordValue::Scalar(value) => RecordValue::Scalar(f(value)),
            RecordValue::Group(fields) => RecordValue::Group(
                fields
                    .into_iter()
                    .map(|(name, value)| (name, f(value)))
                    .collect(),
            ),
        }
    }
}

impl Serialize for RecordValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            RecordValue::Scalar(value) => serializer.serialize_f64(*value),
            RecordValue::Group(fields) => {
                let mut map = serializer.serialize_map(Some(fields.len()))?;
                for (name, value) in fields {
                    map.serialize_entry(name, value)?;
                }
                map.end()
            }
        }
    }
}

/// All restaurants' values for one timestamp.
///
/// Serializes flat, e.g. `{"date": "2024-05-09", "Chemicum": {...}, ...}`.
#[derive(Debug, Clone, PartialEq)]
pub struct DateKeyedRecord {
    /// `"date"` or `"datetime"`
    key_field: &'static str,
    timestamp: String,
    /// Restaurants in order of first report
    entries: Vec<(RestaurantKey, RecordValue)>,
}

impl DateKeyedRecord {
    pub fn new(key_field: &'static str, timestamp: impl Into<String>) -> Self {
        Self {
            key_field,
            timestamp: timestamp.into(),
            entries: Vec::new(),
        }
    }

    pub fn key_field(&self) -> &'static str {
        self.key_field
    }

    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    pub fn entries(&self) -> &[(RestaurantKey, RecordValue)] {
        &self.entries
    }

    pub fn get(&self, restaurant: RestaurantKey) -> Option<&RecordValue> {
        self.entries
            .iter()
            .find(|(key, _)| *key == restaurant)
            .map(|(_, value)| value)
    }

    /// Insert a restaurant's value, replacing an earlier one for the same key
    pub fn merge(&mut self, restaurant: RestaurantKey, value: RecordValue) {
        match self.entries.iter_mut().find(|(key, _)| *key == restaurant) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((restaurant, value)),
        }
    }

    /// Apply [`post_process`] to every leaf value
    pub fn post_processed(self) -> Self {
        Self {
            entries: self
                .entries
                .into_iter()
                .map(|(key, value)| (key, value.map_leaves(post_process)))
                .collect(),
            ..self
        }
    }
}

impl Serialize for DateKeyedRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len() + 1))?;
        map.serialize_entry(self.key_field, &self.timestamp)?;
        for (restaurant, value) in &self.entries {
            map.serialize_entry(restaurant.name(), value)?;
        }
        map.end()
    }
}

/// Merge per-restaurant series into one record per formatted timestamp.
///
/// Restaurants are visited in declared order and samples in time order.
/// Records appear in order of first appearance; a timestamp reported by
/// only some restaurants yields a record holding only those restaurants.
pub fn reshape(
    granularity: TimeGranularity,
    series: &PerRestaurant<ForecastSeries>,
) -> Vec<DateKeyedRecord> {
    let format = granularity.timestamp_format();
    let mut records: Vec<DateKeyedRecord> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for (restaurant, restaurant_series) in series.iter() {
        let components = restaurant_series.components();

        for sample in restaurant_series.samples() {
            let key = sample.timestamp.format(format).to_string();
            let position = *index.entry(key.clone()).or_insert_with(|| {
                records.push(DateKeyedRecord::new(granularity.record_key(), key));
                records.len() - 1
            });

            let value = if components.len() == 1 {
                RecordValue::Scalar(sample.values[0])
            } else {
                RecordValue::Group(
                    components
                        .iter()
                        .cloned()
                        .zip(sample.values.iter().copied())
                        .collect(),
                )
            };
            records[position].merge(restaurant, value);
        }
    }

    records
}

/// Post-process every record
pub fn post_process_records(records: Vec<DateKeyedRecord>) -> Vec<DateKeyedRecord> {
    records
        .into_iter()
        .map(DateKeyedRecord::post_processed)
        .collect()
}

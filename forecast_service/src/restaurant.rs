//! Restaurant identifiers and fixed-shape per-restaurant containers

use crate::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the three forecasted restaurants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RestaurantKey {
    Chemicum,
    Physicum,
    Exactum,
}

impl RestaurantKey {
    /// Every restaurant, in declared order. Reshaping iterates in this order.
    pub const ALL: [RestaurantKey; 3] = [
        RestaurantKey::Chemicum,
        RestaurantKey::Physicum,
        RestaurantKey::Exactum,
    ];

    /// Display name, also used in artifact file names and record keys
    pub fn name(&self) -> &'static str {
        match self {
            RestaurantKey::Chemicum => "Chemicum",
            RestaurantKey::Physicum => "Physicum",
            RestaurantKey::Exactum => "Exactum",
        }
    }

    /// Output field of the joint day-ahead receipt model for this restaurant
    pub fn receipt_field(&self) -> String {
        format!("{}_rcpts", self.name())
    }
}

impl fmt::Display for RestaurantKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RestaurantKey {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self> {
        RestaurantKey::ALL
            .into_iter()
            .find(|key| key.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ForecastError::InvalidParameter(format!("Unknown restaurant: {}", s)))
    }
}

/// Exactly one value per restaurant.
///
/// The shape makes a missing or extra restaurant unrepresentable, so
/// per-restaurant model tables are complete by construction.
#[derive(Debug, Clone, PartialEq)]
pub struct PerRestaurant<T> {
    pub chemicum: T,
    pub physicum: T,
    pub exactum: T,
}

impl<T> PerRestaurant<T> {
    /// Build by calling `f` once per restaurant in declared order
    pub fn from_fn(mut f: impl FnMut(RestaurantKey) -> T) -> Self {
        Self {
            chemicum: f(RestaurantKey::Chemicum),
            physicum: f(RestaurantKey::Physicum),
            exactum: f(RestaurantKey::Exactum),
        }
    }

    /// Fallible [`PerRestaurant::from_fn`]; stops at the first error
    pub fn try_from_fn<E>(
        mut f: impl FnMut(RestaurantKey) -> std::result::Result<T, E>,
    ) -> std::result::Result<Self, E> {
        Ok(Self {
            chemicum: f(RestaurantKey::Chemicum)?,
            physicum: f(RestaurantKey::Physicum)?,
            exactum: f(RestaurantKey::Exactum)?,
        })
    }

    pub fn get(&self, key: RestaurantKey) -> &T {
        match key {
            RestaurantKey::Chemicum => &self.chemicum,
            RestaurantKey::Physicum => &self.physicum,
            RestaurantKey::Exactum => &self.exactum,
        }
    }

    /// Iterate `(restaurant, value)` pairs in declared order
    pub fn iter(&self) -> impl Iterator<Item = (RestaurantKey, &T)> + '_ {
        RestaurantKey::ALL.into_iter().map(move |key| (key, self.get(key)))
    }

    /// Fallible map preserving the per-restaurant shape
    pub fn try_map<U, E>(
        &self,
        mut f: impl FnMut(RestaurantKey, &T) -> std::result::Result<U, E>,
    ) -> std::result::Result<PerRestaurant<U>, E> {
        PerRestaurant::try_from_fn(|key| f(key, self.get(key)))
    }
}

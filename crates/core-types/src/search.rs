use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Optional filters for a property search. Every field left as `None`
/// leaves that dimension unfiltered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertySearch {
    /// Case-insensitive substring of the property's city.
    pub city: Option<String>,
    /// Substring of the owner's identifier (matched as text).
    pub owner_id: Option<i32>,
    /// Lower nightly price bound in major currency units (dollars).
    pub minimum_price_per_night: Option<i64>,
    /// Upper nightly price bound in major currency units (dollars).
    pub maximum_price_per_night: Option<i64>,
    /// Exclusive lower bound on the mean review rating.
    pub minimum_rating: Option<Decimal>,
}

impl PropertySearch {
    /// The city filter, ignoring empty or whitespace-only input.
    pub fn city_filter(&self) -> Option<&str> {
        self.city
            .as_deref()
            .map(str::trim)
            .filter(|city| !city.is_empty())
    }

    /// The price bounds, only when both ends were supplied.
    pub fn price_range(&self) -> Option<(i64, i64)> {
        self.minimum_price_per_night
            .zip(self.maximum_price_per_night)
    }
}

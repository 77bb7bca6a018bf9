use async_trait::async_trait;
use std::fmt::Debug;

use crate::model::{Coordinate, CurrentConditions, ForecastSample, UnitSystem};

pub mod openweather;

/// Resolves a free-text city name to at most one best-match coordinate.
/// `Ok(None)` is the "city not found" condition.
#[async_trait]
pub trait GeocodingSource: Send + Sync + Debug {
    async fn resolve(&self, city: &str) -> anyhow::Result<Option<Coordinate>>;
}

/// Current conditions for a coordinate, expressed in the requested units.
#[async_trait]
pub trait WeatherSource: Send + Sync + Debug {
    async fn current(
        &self,
        coordinate: &Coordinate,
        units: UnitSystem,
    ) -> anyhow::Result<CurrentConditions>;
}

/// Fixed-interval forecast samples for a coordinate, ascending by
/// timestamp, covering at least 24 hours and up to 5 days.
#[async_trait]
pub trait ForecastSource: Send + Sync + Debug {
    async fn forecast(
        &self,
        coordinate: &Coordinate,
        units: UnitSystem,
    ) -> anyhow::Result<Vec<ForecastSample>>;
}

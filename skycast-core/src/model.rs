use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// A geographic point with a display label, produced by geocoding,
/// geolocation, or a saved-location lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
    pub display_name: String,
}

impl Coordinate {
    /// Dedup equality: exact (latitude, longitude) match. The display name
    /// is a label and takes no part in identity.
    #[allow(clippy::float_cmp)]
    pub fn same_point(&self, other: &Coordinate) -> bool {
        self.latitude == other.latitude && self.longitude == other.longitude
    }
}

/// Provider condition code (icon-style, e.g. "01d") plus human-readable text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    pub code: String,
    pub text: String,
}

/// Current conditions for one (coordinate, unit) pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub temperature: f64,
    pub humidity: u8,
    pub wind_speed: f64,
    pub condition: Condition,
}

/// One forecast data point at a fixed interval (3 hours in the source
/// schedule). Sequences are ascending by timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastSample {
    pub timestamp: i64,
    pub temperature: f64,
    pub humidity: u8,
    pub wind_speed: f64,
    pub condition: Condition,
}

/// Per-day rollup of the forecast samples sharing a local calendar date.
/// Derived on every fetch, never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct DaySummary {
    pub day_key: String,
    pub min_temperature: f64,
    pub max_temperature: f64,
    pub condition: Condition,
    pub sample_count: usize,
}

/// Unit system requested from the data sources. Values arrive already
/// expressed in this system; the client never converts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitSystem {
    #[default]
    Metric,
    Imperial,
}

impl UnitSystem {
    /// Value of the provider's `units` query parameter.
    pub fn api_value(self) -> &'static str {
        match self {
            UnitSystem::Metric => "metric",
            UnitSystem::Imperial => "imperial",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            UnitSystem::Metric => UnitSystem::Imperial,
            UnitSystem::Imperial => UnitSystem::Metric,
        }
    }
}

impl FromStr for UnitSystem {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "metric" => Ok(UnitSystem::Metric),
            "imperial" => Ok(UnitSystem::Imperial),
            other => Err(format!(
                "Unknown unit system '{other}'. Supported: metric, imperial."
            )),
        }
    }
}

/// Which forecast rendering is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Daily,
    Hourly,
}

impl View {
    pub fn toggled(self) -> Self {
        match self {
            View::Daily => View::Hourly,
            View::Hourly => View::Daily,
        }
    }
}

impl FromStr for View {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "daily" => Ok(View::Daily),
            "hourly" => Ok(View::Hourly),
            other => Err(format!("Unknown view '{other}'. Supported: daily, hourly.")),
        }
    }
}

/// Persisted theme name. Anything unrecognized in the store degrades to
/// the default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn name(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    /// Lenient parse for values read back from the store.
    pub fn from_name(name: &str) -> Self {
        match name.trim() {
            "dark" => Theme::Dark,
            _ => Theme::Light,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

//! Unit-aware presentation mapping. Formatting only: values arrive from the
//! data sources already expressed in the requested unit system, so nothing
//! here converts.

use chrono::NaiveDate;

use crate::model::UnitSystem;

pub fn unit_suffix(units: UnitSystem) -> &'static str {
    match units {
        UnitSystem::Metric => "C",
        UnitSystem::Imperial => "F",
    }
}

pub fn wind_unit_label(units: UnitSystem) -> &'static str {
    match units {
        UnitSystem::Metric => "m/s",
        UnitSystem::Imperial => "mph",
    }
}

pub fn format_temperature(value: f64, units: UnitSystem) -> String {
    format!("{value:.1}°{}", unit_suffix(units))
}

pub fn format_wind(value: f64, units: UnitSystem) -> String {
    format!("{value:.1} {}", wind_unit_label(units))
}

pub fn format_humidity(pct: u8) -> String {
    format!("{pct}%")
}

/// Short display label for a `YYYY-MM-DD` day key, e.g. "Fri Aug 7".
/// Unparseable keys fall back to the raw key.
pub fn weekday_label(day_key: &str) -> String {
    NaiveDate::parse_from_str(day_key, "%Y-%m-%d")
        .map(|date| date.format("%a %b %-d").to_string())
        .unwrap_or_else(|_| day_key.to_string())
}

//! Core library for the `skycast` CLI.
//!
//! This crate defines:
//! - Domain models (coordinates, conditions, forecast samples, summaries)
//! - The forecast aggregation engine (day bucketing, hourly window)
//! - Abstractions over the external data sources and the blob store
//! - The session coordinator that owns all mutable state
//! - Configuration & credentials handling
//!
//! It is used by `skycast-cli`, but can also be reused by other binaries or services.

pub mod config;
pub mod format;
pub mod geolocate;
pub mod model;
pub mod provider;
pub mod session;
pub mod store;
pub mod timeline;

pub use config::Config;
pub use model::{
    Condition, Coordinate, CurrentConditions, DaySummary, ForecastSample, Theme, UnitSystem, View,
};
pub use session::{FetchState, Session, SessionError, Sources};
pub use timeline::{DEFAULT_HOURLY_WINDOW, DayBucketer, next_window};

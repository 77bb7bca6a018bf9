//! Location/session coordination: owns all mutable session state and the
//! transitions between `Idle`, `Resolving`, `Loading`, `Ready`, and
//! `Failed`. All errors are recovered here; none propagate past this
//! boundary.

use std::time::{Duration, Instant};

use crate::geolocate::GeolocationSource;
use crate::model::{
    Coordinate, CurrentConditions, DaySummary, ForecastSample, Theme, UnitSystem, View,
};
use crate::provider::{ForecastSource, GeocodingSource, WeatherSource};
use crate::store::{self, KvStore, SavedLocations};
use crate::timeline::{DayBucketer, next_window};

/// How long a transient confirmation stays visible.
pub const TRANSIENT_MESSAGE_TTL: Duration = Duration::from_secs(3);

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Location permission denied")]
    LocationPermissionDenied,

    #[error("City not found")]
    CityNotFound,

    #[error("Failed to fetch current weather: {0}")]
    CurrentWeatherFetchFailed(anyhow::Error),

    #[error("Failed to fetch forecast: {0}")]
    ForecastFetchFailed(anyhow::Error),

    #[error("Please enter a city name")]
    EmptySearchInput,
}

/// Where the session is in its fetch lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchState {
    Idle,
    Resolving,
    Loading,
    Ready,
    Failed,
}

/// The external collaborators a session talks to.
pub struct Sources {
    pub geolocator: Box<dyn GeolocationSource>,
    pub geocoder: Box<dyn GeocodingSource>,
    pub weather: Box<dyn WeatherSource>,
    pub forecast: Box<dyn ForecastSource>,
}

#[derive(Debug)]
struct TransientMessage {
    text: String,
    expires_at: Instant,
}

pub struct Session {
    sources: Sources,
    store: Box<dyn KvStore>,
    bucketer: DayBucketer,

    state: FetchState,
    active: Option<Coordinate>,
    current: Option<CurrentConditions>,
    samples: Option<Vec<ForecastSample>>,
    units: UnitSystem,
    view: View,
    theme: Theme,
    saved: SavedLocations,
    last_error: Option<SessionError>,
    transient: Option<TransientMessage>,

    /// Bumped on every (coordinate, unit) change; a fetch outcome carrying
    /// an older value is stale and gets discarded.
    generation: u64,
}

impl Session {
    /// Builds a session, loading saved locations and theme once from the
    /// store (absent/corrupt values degrade to defaults).
    pub fn new(sources: Sources, store: Box<dyn KvStore>) -> Self {
        let saved = SavedLocations::load(store.as_ref());
        let theme = store::load_theme(store.as_ref());

        Self {
            sources,
            store,
            bucketer: DayBucketer::local(),
            state: FetchState::Idle,
            active: None,
            current: None,
            samples: None,
            units: UnitSystem::default(),
            view: View::default(),
            theme,
            saved,
            last_error: None,
            transient: None,
            generation: 0,
        }
    }

    pub fn with_units(mut self, units: UnitSystem) -> Self {
        self.units = units;
        self
    }

    pub fn with_view(mut self, view: View) -> Self {
        self.view = view;
        self
    }

    /// Startup transition: with no coordinate yet, resolve one via
    /// geolocation. Failure lands in `Failed` with a permission-denied
    /// error and the session stays interactive (search still works).
    pub async fn start(&mut self) {
        if self.active.is_some() {
            return;
        }

        self.state = FetchState::Resolving;
        match self.sources.geolocator.locate().await {
            Ok(coordinate) => {
                self.active = Some(coordinate);
                self.refresh().await;
            }
            Err(err) => {
                tracing::debug!("Geolocation failed: {err:#}");
                self.last_error = Some(SessionError::LocationPermissionDenied);
                self.state = FetchState::Failed;
            }
        }
    }

    /// Resolve a city name and make it the active coordinate. Returns
    /// `true` when a coordinate was set (the caller should clear its input
    /// field); validation and lookup failures surface through
    /// [`Session::last_error`] and leave displayed data untouched.
    pub async fn search(&mut self, input: &str) -> bool {
        let query = input.trim();
        if query.is_empty() {
            self.last_error = Some(SessionError::EmptySearchInput);
            return false;
        }

        match self.sources.geocoder.resolve(query).await {
            Ok(Some(coordinate)) => {
                self.last_error = None;
                self.active = Some(coordinate);
                self.refresh().await;
                true
            }
            Ok(None) => {
                self.last_error = Some(SessionError::CityNotFound);
                false
            }
            Err(err) => {
                tracing::debug!("Geocoding failed for {query:?}: {err:#}");
                self.last_error = Some(SessionError::CityNotFound);
                false
            }
        }
    }

    /// Add the active coordinate to the favorites. Duplicates leave the
    /// list untouched and only flash a transient note; no active
    /// coordinate is a silent no-op.
    pub fn save_current(&mut self) {
        let Some(coordinate) = self.active.clone() else {
            return;
        };

        if self.saved.contains(&coordinate) {
            self.show_transient("Location already saved");
            return;
        }

        self.saved.push(coordinate);
        self.saved.persist(self.store.as_ref());
        self.show_transient("Location saved!");
    }

    /// Make a favorite the active coordinate, triggering a fetch cycle.
    pub async fn load_saved(&mut self, index: usize) {
        let Some(coordinate) = self.saved.get(index).cloned() else {
            return;
        };

        self.active = Some(coordinate);
        self.refresh().await;
    }

    /// Switch unit systems; with a coordinate active this re-runs the
    /// fetch cycle so both payloads arrive in the new units.
    pub async fn set_units(&mut self, units: UnitSystem) {
        if self.units == units {
            return;
        }

        self.units = units;
        if self.active.is_some() {
            self.refresh().await;
        }
    }

    pub async fn toggle_units(&mut self) {
        self.set_units(self.units.toggled()).await;
    }

    /// Pure state change; nothing is re-fetched.
    pub fn set_view(&mut self, view: View) {
        self.view = view;
    }

    pub fn toggle_view(&mut self) {
        self.view = self.view.toggled();
    }

    /// Flips and persists the theme. Never touches fetch state.
    pub fn toggle_theme(&mut self) {
        self.theme = self.theme.toggled();
        store::persist_theme(self.store.as_ref(), self.theme);
    }

    /// Re-runs the fetch cycle for the active coordinate and unit: both
    /// payloads are requested concurrently and applied as one atomic unit.
    pub async fn refresh(&mut self) {
        let Some(coordinate) = self.active.clone() else {
            return;
        };

        let generation = self.begin_fetch();
        let units = self.units;
        let (weather, forecast) = tokio::join!(
            self.sources.weather.current(&coordinate, units),
            self.sources.forecast.forecast(&coordinate, units),
        );

        self.apply_fetch(generation, weather, forecast);
    }

    fn begin_fetch(&mut self) -> u64 {
        self.generation += 1;
        self.state = FetchState::Loading;
        self.last_error = None;
        self.generation
    }

    /// Applies a fetch outcome, unless a newer cycle has started since the
    /// given generation was captured, in which case the outcome is stale
    /// and dropped.
    fn apply_fetch(
        &mut self,
        generation: u64,
        weather: anyhow::Result<CurrentConditions>,
        forecast: anyhow::Result<Vec<ForecastSample>>,
    ) {
        if generation != self.generation {
            tracing::debug!(
                stale = generation,
                current = self.generation,
                "Discarding stale fetch outcome"
            );
            return;
        }

        match (weather, forecast) {
            (Ok(current), Ok(samples)) => {
                self.current = Some(current);
                self.samples = Some(samples);
                self.state = FetchState::Ready;
            }
            (Err(err), _) => self.fail_fetch(SessionError::CurrentWeatherFetchFailed(err)),
            (_, Err(err)) => self.fail_fetch(SessionError::ForecastFetchFailed(err)),
        }
    }

    /// Fetch failures clear both payloads together: stale data is never
    /// shown next to an error.
    fn fail_fetch(&mut self, error: SessionError) {
        self.current = None;
        self.samples = None;
        self.last_error = Some(error);
        self.state = FetchState::Failed;
    }

    fn show_transient(&mut self, text: &str) {
        // Overwriting supersedes the previous message's pending expiry.
        self.transient = Some(TransientMessage {
            text: text.to_string(),
            expires_at: Instant::now() + TRANSIENT_MESSAGE_TTL,
        });
    }

    // Read-side accessors.

    pub fn state(&self) -> FetchState {
        self.state
    }

    pub fn is_loading(&self) -> bool {
        self.state == FetchState::Loading || self.state == FetchState::Resolving
    }

    pub fn active_coordinate(&self) -> Option<&Coordinate> {
        self.active.as_ref()
    }

    pub fn current_weather(&self) -> Option<&CurrentConditions> {
        self.current.as_ref()
    }

    pub fn forecast_samples(&self) -> Option<&[ForecastSample]> {
        self.samples.as_deref()
    }

    /// Day summaries derived from the samples of the active
    /// coordinate/unit pair; empty while no forecast is present.
    pub fn day_summaries(&self) -> Vec<DaySummary> {
        self.samples
            .as_deref()
            .map(|samples| self.bucketer.aggregate_daily(samples))
            .unwrap_or_default()
    }

    /// Near-term prefix of the sample sequence for the hourly view.
    pub fn hourly_window(&self, max_count: usize) -> &[ForecastSample] {
        next_window(self.samples.as_deref().unwrap_or_default(), max_count)
    }

    pub fn units(&self) -> UnitSystem {
        self.units
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn saved(&self) -> &SavedLocations {
        &self.saved
    }

    pub fn last_error(&self) -> Option<&SessionError> {
        self.last_error.as_ref()
    }

    /// Active transient confirmation, if it has not expired yet.
    pub fn transient_message(&self) -> Option<&str> {
        self.transient
            .as_ref()
            .filter(|message| Instant::now() < message.expires_at)
            .map(|message| message.text.as_str())
    }
}

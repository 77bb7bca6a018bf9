use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::model::{Condition, Coordinate, CurrentConditions, ForecastSample, UnitSystem};

use super::{ForecastSource, GeocodingSource, WeatherSource};

const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org";

/// OpenWeatherMap client covering geocoding, current weather, and the
/// 5-day/3-hour forecast.
#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL.to_string())
    }

    /// Point the client at a different host. Tests use this to target a
    /// local mock server.
    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        Self {
            api_key,
            base_url,
            http: Client::new(),
        }
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        query: &[(&str, &str)],
        what: &str,
    ) -> Result<T> {
        let url = format!("{}{path}", self.base_url);

        let res = self
            .http
            .get(&url)
            .query(query)
            .send()
            .await
            .with_context(|| format!("Failed to send request to OpenWeather ({what})"))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .with_context(|| format!("Failed to read OpenWeather {what} response body"))?;

        if !status.is_success() {
            return Err(anyhow!(
                "OpenWeather {} request failed with status {}: {}",
                what,
                status,
                truncate_body(&body),
            ));
        }

        serde_json::from_str(&body)
            .with_context(|| format!("Failed to parse OpenWeather {what} JSON"))
    }
}

/// Icon identifier to retrievable image URL. Pure string templating.
pub fn icon_url(code: &str) -> String {
    format!("https://openweathermap.org/img/wn/{code}@2x.png")
}

#[async_trait]
impl GeocodingSource for OpenWeatherProvider {
    async fn resolve(&self, city: &str) -> Result<Option<Coordinate>> {
        let matches: Vec<OwGeoRecord> = self
            .get_json(
                "/geo/1.0/direct",
                &[("q", city), ("limit", "1"), ("appid", self.api_key.as_str())],
                "geocoding",
            )
            .await?;

        Ok(matches.into_iter().next().map(|record| Coordinate {
            latitude: record.lat,
            longitude: record.lon,
            display_name: record.name,
        }))
    }
}

#[async_trait]
impl WeatherSource for OpenWeatherProvider {
    async fn current(
        &self,
        coordinate: &Coordinate,
        units: UnitSystem,
    ) -> Result<CurrentConditions> {
        let parsed: OwCurrentResponse = self
            .get_json(
                "/data/2.5/weather",
                &[
                    ("lat", coordinate.latitude.to_string().as_str()),
                    ("lon", coordinate.longitude.to_string().as_str()),
                    ("units", units.api_value()),
                    ("appid", self.api_key.as_str()),
                ],
                "current weather",
            )
            .await?;

        Ok(CurrentConditions {
            temperature: parsed.main.temp,
            humidity: parsed.main.humidity,
            wind_speed: parsed.wind.speed,
            condition: condition_of(&parsed.weather),
        })
    }
}

#[async_trait]
impl ForecastSource for OpenWeatherProvider {
    async fn forecast(
        &self,
        coordinate: &Coordinate,
        units: UnitSystem,
    ) -> Result<Vec<ForecastSample>> {
        let parsed: OwForecastResponse = self
            .get_json(
                "/data/2.5/forecast",
                &[
                    ("lat", coordinate.latitude.to_string().as_str()),
                    ("lon", coordinate.longitude.to_string().as_str()),
                    ("units", units.api_value()),
                    ("appid", self.api_key.as_str()),
                ],
                "forecast",
            )
            .await?;

        Ok(parsed
            .list
            .into_iter()
            .map(|entry| ForecastSample {
                timestamp: entry.dt,
                temperature: entry.main.temp,
                humidity: entry.main.humidity,
                wind_speed: entry.wind.speed,
                condition: condition_of(&entry.weather),
            })
            .collect())
    }
}

fn condition_of(weather: &[OwWeather]) -> Condition {
    weather
        .first()
        .map(|w| Condition {
            code: w.icon.clone(),
            text: w.description.clone(),
        })
        .unwrap_or_else(|| Condition {
            code: "na".to_string(),
            text: "Unknown".to_string(),
        })
}

#[derive(Debug, Deserialize)]
struct OwGeoRecord {
    lat: f64,
    lon: f64,
    name: String,
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    dt: i64,
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    list: Vec<OwForecastEntry>,
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        format!("{}...", &body[..MAX])
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn coordinate() -> Coordinate {
        Coordinate {
            latitude: 50.45,
            longitude: 30.52,
            display_name: "Kyiv".to_string(),
        }
    }

    async fn provider(server: &MockServer) -> OpenWeatherProvider {
        OpenWeatherProvider::with_base_url("TESTKEY".to_string(), server.uri())
    }

    #[tokio::test]
    async fn geocoding_returns_best_match() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/geo/1.0/direct"))
            .and(query_param("q", "Kyiv"))
            .and(query_param("limit", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                r#"[{"name":"Kyiv","lat":50.45,"lon":30.52,"country":"UA"}]"#,
                "application/json",
            ))
            .mount(&server)
            .await;

        let found = provider(&server).await.resolve("Kyiv").await.unwrap();
        let found = found.expect("one match expected");
        assert_eq!(found.display_name, "Kyiv");
        assert_eq!(found.latitude, 50.45);
        assert_eq!(found.longitude, 30.52);
    }

    #[tokio::test]
    async fn geocoding_empty_result_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/geo/1.0/direct"))
            .respond_with(ResponseTemplate::new(200).set_body_raw("[]", "application/json"))
            .mount(&server)
            .await;

        let found = provider(&server).await.resolve("Nowhereville").await.unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn current_weather_parses_and_passes_units() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data/2.5/weather"))
            .and(query_param("units", "imperial"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                r#"{
                    "main": {"temp": 71.6, "humidity": 64},
                    "weather": [{"description": "clear sky", "icon": "01d"}],
                    "wind": {"speed": 5.2}
                }"#,
                "application/json",
            ))
            .mount(&server)
            .await;

        let current = provider(&server)
            .await
            .current(&coordinate(), UnitSystem::Imperial)
            .await
            .unwrap();

        assert_eq!(current.temperature, 71.6);
        assert_eq!(current.humidity, 64);
        assert_eq!(current.wind_speed, 5.2);
        assert_eq!(current.condition.code, "01d");
        assert_eq!(current.condition.text, "clear sky");
    }

    #[tokio::test]
    async fn forecast_maps_entries_in_order() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data/2.5/forecast"))
            .and(query_param("units", "metric"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                r#"{
                    "list": [
                        {"dt": 1754524800, "main": {"temp": 18.4, "humidity": 70},
                         "weather": [{"description": "light rain", "icon": "10d"}],
                         "wind": {"speed": 4.1}},
                        {"dt": 1754535600, "main": {"temp": 21.0, "humidity": 55},
                         "weather": [{"description": "scattered clouds", "icon": "03d"}],
                         "wind": {"speed": 3.0}}
                    ]
                }"#,
                "application/json",
            ))
            .mount(&server)
            .await;

        let samples = provider(&server)
            .await
            .forecast(&coordinate(), UnitSystem::Metric)
            .await
            .unwrap();

        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].timestamp, 1754524800);
        assert_eq!(samples[0].condition.code, "10d");
        assert_eq!(samples[1].temperature, 21.0);
        assert!(samples[0].timestamp < samples[1].timestamp);
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data/2.5/weather"))
            .respond_with(
                ResponseTemplate::new(401)
                    .set_body_raw(r#"{"cod":401,"message":"Invalid API key"}"#, "application/json"),
            )
            .mount(&server)
            .await;

        let err = provider(&server)
            .await
            .current(&coordinate(), UnitSystem::Metric)
            .await
            .unwrap_err();

        let msg = err.to_string();
        assert!(msg.contains("current weather"));
        assert!(msg.contains("401"));
    }

    #[test]
    fn icon_url_templates_the_code() {
        assert_eq!(
            icon_url("01d"),
            "https://openweathermap.org/img/wn/01d@2x.png"
        );
    }
}

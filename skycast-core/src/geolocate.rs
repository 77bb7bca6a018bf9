//! Device position lookup. Single-shot: one coordinate or one failure, no
//! streaming updates.

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::fmt::Debug;

use crate::model::Coordinate;

const DEFAULT_BASE_URL: &str = "http://ip-api.com";
const FALLBACK_NAME: &str = "Current Location";

#[async_trait]
pub trait GeolocationSource: Send + Sync + Debug {
    async fn locate(&self) -> Result<Coordinate>;
}

/// IP-based geolocation via ip-api.com. Free, no API key; coarse but good
/// enough to seed the session with a starting coordinate.
#[derive(Debug, Clone)]
pub struct IpGeolocator {
    base_url: String,
    http: Client,
}

impl IpGeolocator {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL.to_string())
    }

    pub fn with_base_url(base_url: String) -> Self {
        Self {
            base_url,
            http: Client::new(),
        }
    }
}

impl Default for IpGeolocator {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Deserialize)]
struct IpApiResponse {
    status: String,
    lat: Option<f64>,
    lon: Option<f64>,
    city: Option<String>,
}

#[async_trait]
impl GeolocationSource for IpGeolocator {
    async fn locate(&self) -> Result<Coordinate> {
        let url = format!("{}/json", self.base_url);

        let res = self
            .http
            .get(&url)
            .send()
            .await
            .context("Failed to send IP geolocation request")?;

        let status = res.status();
        if !status.is_success() {
            return Err(anyhow!("IP geolocation request failed with status {status}"));
        }

        let parsed: IpApiResponse = res
            .json()
            .await
            .context("Failed to parse IP geolocation JSON")?;

        if parsed.status != "success" {
            return Err(anyhow!("IP geolocation lookup refused: {}", parsed.status));
        }

        let (lat, lon) = parsed
            .lat
            .zip(parsed.lon)
            .ok_or_else(|| anyhow!("IP geolocation response missing coordinates"))?;

        Ok(Coordinate {
            latitude: lat,
            longitude: lon,
            display_name: parsed
                .city
                .filter(|city| !city.is_empty())
                .unwrap_or_else(|| FALLBACK_NAME.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn locate_parses_successful_lookup() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/json"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                r#"{"status":"success","lat":50.45,"lon":30.52,"city":"Kyiv"}"#,
                "application/json",
            ))
            .mount(&server)
            .await;

        let found = IpGeolocator::with_base_url(server.uri()).locate().await.unwrap();
        assert_eq!(found.latitude, 50.45);
        assert_eq!(found.longitude, 30.52);
        assert_eq!(found.display_name, "Kyiv");
    }

    #[tokio::test]
    async fn locate_falls_back_to_generic_name() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/json"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                r#"{"status":"success","lat":1.0,"lon":2.0}"#,
                "application/json",
            ))
            .mount(&server)
            .await;

        let found = IpGeolocator::with_base_url(server.uri()).locate().await.unwrap();
        assert_eq!(found.display_name, "Current Location");
    }

    #[tokio::test]
    async fn locate_fails_on_refused_lookup() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/json"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                r#"{"status":"fail"}"#,
                "application/json",
            ))
            .mount(&server)
            .await;

        let err = IpGeolocator::with_base_url(server.uri()).locate().await.unwrap_err();
        assert!(err.to_string().contains("refused"));
    }
}

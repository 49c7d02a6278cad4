use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::{check_status, trim_base, ClientError};

pub const DEFAULT_GEOCODING_URL: &str = "https://geocoding-api.open-meteo.com";
pub const DEFAULT_FORECAST_URL: &str = "https://api.open-meteo.com";

const CURRENT_FIELDS: &str =
    "temperature_2m,relative_humidity_2m,apparent_temperature,precipitation,weather_code,wind_speed_10m";
const DAILY_FIELDS: &str =
    "weather_code,temperature_2m_max,temperature_2m_min,precipitation_sum,precipitation_probability_max";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureUnit {
    #[default]
    Celsius,
    Fahrenheit,
}

impl TemperatureUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            TemperatureUnit::Celsius => "celsius",
            TemperatureUnit::Fahrenheit => "fahrenheit",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub country_code: Option<String>,
    #[serde(default)]
    pub timezone: Option<String>,
}

impl Location {
    fn in_country(&self, country: &str) -> bool {
        let matches = |field: &Option<String>| {
            field
                .as_deref()
                .is_some_and(|value| value.eq_ignore_ascii_case(country))
        };
        matches(&self.country) || matches(&self.country_code)
    }
}

#[derive(Debug, Deserialize)]
struct GeocodingResponse {
    #[serde(default)]
    results: Vec<Location>,
}

/// Open-Meteo geocoding and forecast APIs (no key needed).
#[derive(Debug, Clone)]
pub struct OpenMeteoClient {
    http: reqwest::Client,
    geocoding_url: String,
    forecast_url: String,
}

impl OpenMeteoClient {
    pub fn new(http: reqwest::Client) -> Self {
        Self {
            http,
            geocoding_url: DEFAULT_GEOCODING_URL.to_string(),
            forecast_url: DEFAULT_FORECAST_URL.to_string(),
        }
    }

    pub fn with_base_urls(mut self, geocoding_url: impl Into<String>, forecast_url: impl Into<String>) -> Self {
        self.geocoding_url = trim_base(geocoding_url);
        self.forecast_url = trim_base(forecast_url);
        self
    }

    /// Best match for `name`, optionally restricted to a country name or code.
    pub async fn geocode(&self, name: &str, country: Option<&str>) -> Result<Option<Location>, ClientError> {
        let count = if country.is_some() { "10" } else { "1" };
        let response = self
            .http
            .get(format!("{}/v1/search", self.geocoding_url))
            .query(&[("name", name), ("count", count), ("language", "en"), ("format", "json")])
            .send()
            .await?;
        let body: GeocodingResponse = check_status(response).await?.json().await?;

        let location = match country {
            Some(country) => body.results.into_iter().find(|l| l.in_country(country)),
            None => body.results.into_iter().next(),
        };
        debug!(name, found = location.is_some(), "open-meteo geocoding finished");
        Ok(location)
    }

    /// Current conditions plus a daily forecast for `days` days.
    pub async fn forecast(&self, location: &Location, unit: TemperatureUnit, days: u8) -> Result<Value, ClientError> {
        let response = self
            .http
            .get(format!("{}/v1/forecast", self.forecast_url))
            .query(&[
                ("latitude", location.latitude.to_string()),
                ("longitude", location.longitude.to_string()),
                ("current", CURRENT_FIELDS.to_string()),
                ("daily", DAILY_FIELDS.to_string()),
                ("timezone", "auto".to_string()),
                ("temperature_unit", unit.as_str().to_string()),
                ("forecast_days", days.to_string()),
            ])
            .send()
            .await?;
        let body: Value = check_status(response).await?.json().await?;
        if let Some(reason) = body.get("reason").and_then(Value::as_str) {
            return Err(ClientError::Api(reason.to_string()));
        }
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    #[tokio::test]
    async fn geocode_filters_by_country() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/v1/search")
            .match_query(Matcher::UrlEncoded("name".into(), "Paris".into()))
            .with_body(
                json!({ "results": [
                    { "name": "Paris", "latitude": 33.66, "longitude": -95.55, "country": "United States", "country_code": "US" },
                    { "name": "Paris", "latitude": 48.85, "longitude": 2.35, "country": "France", "country_code": "FR" }
                ]})
                .to_string(),
            )
            .create_async()
            .await;

        let client = OpenMeteoClient::new(reqwest::Client::new()).with_base_urls(server.url(), server.url());
        let location = client.geocode("Paris", Some("fr")).await.unwrap().unwrap();
        assert_eq!(location.country.as_deref(), Some("France"));
    }

    #[tokio::test]
    async fn geocode_without_results_is_none() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/v1/search")
            .match_query(Matcher::Any)
            .with_body(json!({ "generationtime_ms": 0.5 }).to_string())
            .create_async()
            .await;

        let client = OpenMeteoClient::new(reqwest::Client::new()).with_base_urls(server.url(), server.url());
        assert_eq!(client.geocode("Atlantis", None).await.unwrap(), None);
    }
}

use serde::Deserialize;

use crate::clients::open_meteo::{OpenMeteoClient, TemperatureUnit};

use super::error::ToolError;
use super::traits::{ArgSchema, ToolOutput, TypedTool};

const MAX_FORECAST_DAYS: u8 = 16;

#[derive(Debug, Deserialize)]
pub struct WeatherInput {
    pub location: String,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub temperature_unit: Option<TemperatureUnit>,
    #[serde(default)]
    pub days: Option<u8>,
}

/// Current weather and forecast for a named place via Open-Meteo.
pub struct OpenMeteoTool {
    client: OpenMeteoClient,
}

impl OpenMeteoTool {
    pub fn new(client: OpenMeteoClient) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl TypedTool for OpenMeteoTool {
    type Input = WeatherInput;

    const NAME: &'static str = "OpenMeteoTool";
    const DESCRIPTION: &'static str =
        "Retrieve current weather and a daily forecast for a location. Returns JSON with the measured values and their units.";

    fn input_schema(&self) -> Vec<ArgSchema> {
        vec![
            ArgSchema::required("location", "string", "City or place name, e.g. 'San Francisco'"),
            ArgSchema::optional("country", "string", "Country name or ISO code to disambiguate the place"),
            ArgSchema::optional("temperature_unit", "string", "'celsius' (default) or 'fahrenheit'"),
            ArgSchema::optional("days", "integer", "Number of forecast days, 1 to 16 (default 1)"),
        ]
    }

    fn validate(&self, input: &WeatherInput) -> Result<(), String> {
        if input.location.trim().is_empty() {
            return Err("location must not be empty".into());
        }
        if let Some(days) = input.days {
            if !(1..=MAX_FORECAST_DAYS).contains(&days) {
                return Err(format!("days must be between 1 and {}", MAX_FORECAST_DAYS));
            }
        }
        Ok(())
    }

    async fn call(&self, input: WeatherInput) -> Result<ToolOutput, ToolError> {
        let location = self
            .client
            .geocode(input.location.trim(), input.country.as_deref())
            .await
            .map_err(|e| ToolError::upstream(Self::NAME, e))?
            .ok_or_else(|| ToolError::invalid(format!("Location '{}' was not found", input.location)))?;

        let forecast = self
            .client
            .forecast(
                &location,
                input.temperature_unit.unwrap_or_default(),
                input.days.unwrap_or(1),
            )
            .await
            .map_err(|e| ToolError::upstream(Self::NAME, e))?;

        let place = match &location.country {
            Some(country) => format!("{}, {}", location.name, country),
            None => location.name.clone(),
        };
        let body = serde_json::to_string_pretty(&forecast).map_err(|e| ToolError::upstream(Self::NAME, e))?;
        Ok(ToolOutput::Text(format!("Weather for {}:\n{}", place, body)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::error::ToolErrorKind;
    use crate::tools::traits::Tool;
    use mockito::Matcher;
    use serde_json::json;

    async fn tool_for(server: &mockito::ServerGuard) -> OpenMeteoTool {
        OpenMeteoTool::new(OpenMeteoClient::new(reqwest::Client::new()).with_base_urls(server.url(), server.url()))
    }

    #[tokio::test]
    async fn reports_forecast_for_geocoded_place() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/v1/search")
            .match_query(Matcher::Any)
            .with_body(json!({ "results": [{ "name": "San Francisco", "latitude": 37.77, "longitude": -122.42, "country": "United States" }] }).to_string())
            .create_async()
            .await;
        let forecast = server
            .mock("GET", "/v1/forecast")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("latitude".into(), "37.77".into()),
                Matcher::UrlEncoded("temperature_unit".into(), "fahrenheit".into()),
            ]))
            .with_body(json!({ "current": { "temperature_2m": 61.2 } }).to_string())
            .create_async()
            .await;

        let tool = tool_for(&server).await;
        let out = tool
            .run(json!({ "location": "San Francisco", "temperature_unit": "fahrenheit" }))
            .await
            .unwrap();
        assert!(out.starts_with("Weather for San Francisco, United States:"));
        assert!(out.contains("61.2"));
        forecast.assert_async().await;
    }

    #[tokio::test]
    async fn unknown_place_is_input_validation() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/v1/search")
            .match_query(Matcher::Any)
            .with_body("{}")
            .create_async()
            .await;

        let err = tool_for(&server).await.run(json!({ "location": "Atlantis" })).await.unwrap_err();
        assert_eq!(err.kind(), ToolErrorKind::InputValidation);
    }

    #[tokio::test]
    async fn unreachable_service_is_upstream() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/v1/search")
            .match_query(Matcher::Any)
            .with_status(500)
            .create_async()
            .await;

        let err = tool_for(&server).await.run(json!({ "location": "Oslo" })).await.unwrap_err();
        assert_eq!(err.kind(), ToolErrorKind::Upstream);
    }

    #[tokio::test]
    async fn invalid_input_makes_no_request() {
        let mut server = mockito::Server::new_async().await;
        let geocode = server
            .mock("GET", "/v1/search")
            .match_query(Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let tool = tool_for(&server).await;
        for input in [json!({}), json!({ "location": " " }), json!({ "location": "Oslo", "days": 40 })] {
            let err = tool.run(input).await.unwrap_err();
            assert_eq!(err.kind(), ToolErrorKind::InputValidation);
        }
        geocode.assert_async().await;
    }
}

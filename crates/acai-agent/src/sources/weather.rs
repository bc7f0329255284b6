//! weatherapi.com client.
//!
//! `days == 0` asks `current.json`; otherwise `forecast.json?days=N`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use acai_core::config::schema::WeatherToolConfig;

use super::SourceError;

/// Most forecast days the API serves.
pub const MAX_FORECAST_DAYS: u32 = 10;

// ─────────────────────────────────────────────
// Report types
// ─────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct WeatherReport {
    pub location: ReportLocation,
    pub current: CurrentConditions,
    /// Empty when only current conditions were requested.
    pub forecast: Vec<ForecastDay>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportLocation {
    pub name: String,
    pub country: String,
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CurrentConditions {
    pub temp_c: f64,
    pub wind_kph: f64,
    pub wind_degree: f64,
    pub condition: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForecastDay {
    /// `YYYY-MM-DD` as the API reports it.
    pub date: String,
    pub min_temp_c: f64,
    pub max_temp_c: f64,
    pub max_wind_kph: f64,
    pub condition: String,
}

/// Anything that can answer "what's the weather at this place".
#[async_trait]
pub trait WeatherSource: Send + Sync {
    /// Current conditions, plus `days` of forecast when `days > 0`.
    async fn fetch(&self, location: &str, days: u32) -> Result<WeatherReport, SourceError>;
}

// ─────────────────────────────────────────────
// Wire format
// ─────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct ApiResponse {
    location: Option<ApiLocation>,
    current: Option<ApiCurrent>,
    forecast: Option<ApiForecast>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct ApiLocation {
    #[serde(default)]
    name: String,
    #[serde(default)]
    country: String,
    #[serde(default)]
    lat: f64,
    #[serde(default)]
    lon: f64,
}

#[derive(Debug, Deserialize)]
struct ApiCondition {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct ApiCurrent {
    temp_c: f64,
    wind_kph: f64,
    wind_degree: f64,
    condition: ApiCondition,
}

#[derive(Debug, Deserialize)]
struct ApiForecast {
    #[serde(default)]
    forecastday: Vec<ApiForecastDay>,
}

#[derive(Debug, Deserialize)]
struct ApiForecastDay {
    date: String,
    day: ApiDay,
}

#[derive(Debug, Deserialize)]
struct ApiDay {
    maxtemp_c: f64,
    mintemp_c: f64,
    maxwind_kph: f64,
    condition: ApiCondition,
}

impl ApiResponse {
    fn into_report(self) -> Result<WeatherReport, SourceError> {
        let location = self
            .location
            .ok_or_else(|| SourceError::Decode("response has no location".into()))?;
        let current = self
            .current
            .ok_or_else(|| SourceError::Decode("response has no current conditions".into()))?;

        let forecast = self
            .forecast
            .map(|f| f.forecastday)
            .unwrap_or_default()
            .into_iter()
            .map(|d| ForecastDay {
                date: d.date,
                min_temp_c: d.day.mintemp_c,
                max_temp_c: d.day.maxtemp_c,
                max_wind_kph: d.day.maxwind_kph,
                condition: d.day.condition.text,
            })
            .collect();

        Ok(WeatherReport {
            location: ReportLocation {
                name: location.name,
                country: location.country,
                lat: location.lat,
                lon: location.lon,
            },
            current: CurrentConditions {
                temp_c: current.temp_c,
                wind_kph: current.wind_kph,
                wind_degree: current.wind_degree,
                condition: current.condition.text,
            },
            forecast,
        })
    }
}

// ─────────────────────────────────────────────
// WeatherApiClient
// ─────────────────────────────────────────────

/// HTTP client for weatherapi.com.
pub struct WeatherApiClient {
    client: Client,
    api_base: String,
    api_key: String,
}

impl WeatherApiClient {
    /// Build a client from config. A missing API key is a configuration error.
    pub fn new(config: &WeatherToolConfig) -> Result<Self, SourceError> {
        if config.api_key.trim().is_empty() {
            return Err(SourceError::MissingApiKey("weatherapi.com"));
        }
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()?;
        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }
}

#[async_trait]
impl WeatherSource for WeatherApiClient {
    async fn fetch(&self, location: &str, days: u32) -> Result<WeatherReport, SourceError> {
        let days = days.min(MAX_FORECAST_DAYS);
        let request = if days == 0 {
            self.client
                .get(format!("{}/current.json", self.api_base))
                .query(&[("key", self.api_key.as_str()), ("q", location), ("aqi", "no")])
        } else {
            let days = days.to_string();
            self.client
                .get(format!("{}/forecast.json", self.api_base))
                .query(&[
                    ("key", self.api_key.as_str()),
                    ("q", location),
                    ("days", days.as_str()),
                    ("aqi", "no"),
                    ("alerts", "no"),
                ])
        };

        debug!(location, days, "fetching weather");
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        // weatherapi reports bad keys and unknown places as an error object,
        // usually with a 4xx status.
        let parsed: Result<ApiResponse, _> = serde_json::from_str(&body);
        if let Ok(ApiResponse { error: Some(err), .. }) = &parsed {
            return Err(SourceError::Api {
                code: err.code,
                message: err.message.clone(),
            });
        }
        if !status.is_success() {
            return Err(SourceError::Status {
                status: status.as_u16(),
                body,
            });
        }

        parsed
            .map_err(|e| SourceError::Decode(e.to_string()))?
            .into_report()
    }
}

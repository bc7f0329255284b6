//! External data sources behind the weather and holiday tools.
//!
//! Each source is a trait so tools can be built against fakes in tests.

pub mod calendar;
pub mod weather;

use thiserror::Error;

pub use calendar::{HolidayEvent, HolidayFeed, IcsHolidayFeed};
pub use weather::{WeatherApiClient, WeatherReport, WeatherSource};

/// Failure talking to an external data source.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The source needs credentials that were not configured.
    #[error("missing API key for {0}")]
    MissingApiKey(&'static str),

    #[error("request failed: {0}")]
    Http(String),

    #[error("unexpected status {status}: {body}")]
    Status { status: u16, body: String },

    /// The service answered with an error object of its own.
    #[error("api error {code}: {message}")]
    Api { code: i64, message: String },

    #[error("failed to decode response: {0}")]
    Decode(String),

    #[error("failed to parse feed: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for SourceError {
    fn from(e: reqwest::Error) -> Self {
        SourceError::Http(e.to_string())
    }
}

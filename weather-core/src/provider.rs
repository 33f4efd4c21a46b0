use async_trait::async_trait;
use serde_json::Value;
use std::fmt::Debug;

use crate::error::Result;

pub mod openweather;

pub use openweather::OpenWeatherProvider;

/// Source of raw current-weather payloads, one call per city.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// Fetch the raw payload for `city`. Non-success responses are errors.
    async fn fetch_weather(&self, city: &str) -> Result<Value>;
}

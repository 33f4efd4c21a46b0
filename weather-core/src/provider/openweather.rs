use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

use crate::{
    config::Config,
    error::{Result, WeatherError},
};

use super::WeatherProvider;

pub const UNITS: &str = "metric";

const MISSING_KEY_MESSAGE: &str = "OpenWeatherMap API key is required.";

/// Current-weather client for the OpenWeatherMap `/weather` endpoint.
#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherProvider {
    /// Fails with [`WeatherError::Configuration`] when the key is missing or blank.
    pub fn new(config: &Config) -> Result<Self> {
        let api_key = config
            .api_key()
            .ok_or_else(|| WeatherError::Configuration(MISSING_KEY_MESSAGE.into()))?;

        let mut builder = Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder.build().map_err(|e| {
            WeatherError::Configuration(format!("Failed to build HTTP client: {e}"))
        })?;

        Ok(Self {
            api_key: api_key.to_owned(),
            base_url: config.base_url.clone(),
            http,
        })
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn fetch_weather(&self, city: &str) -> Result<Value> {
        tracing::info!("Fetching weather for {city}");

        // The request URL carries the API key, keep it out of the error.
        let transport = |source: reqwest::Error| WeatherError::Transport {
            city: city.to_owned(),
            source: source.without_url(),
        };

        let res = self
            .http
            .get(&self.base_url)
            .query(&[
                ("q", city),
                ("appid", self.api_key.as_str()),
                ("units", UNITS),
            ])
            .send()
            .await
            .map_err(transport)?;

        let status = res.status();

        if !status.is_success() {
            let body = res
                .text()
                .await
                .unwrap_or_else(|e| format!("<unreadable body: {e}>"));
            tracing::error!("API request failed for {city}: {body}");

            return Err(WeatherError::Fetch {
                city: city.to_owned(),
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        let body = res.text().await.map_err(transport)?;

        serde_json::from_str(&body)
            .map_err(|e| WeatherError::Payload(format!("response for {city} is not JSON: {e}")))
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.chars().count() > MAX {
        format!("{}...", body.chars().take(MAX).collect::<String>())
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_api_key_is_configuration_error() {
        let err = OpenWeatherProvider::new(&Config::default()).unwrap_err();
        assert!(matches!(err, WeatherError::Configuration(_)));
        assert_eq!(err.to_string(), "OpenWeatherMap API key is required.");

        let err = OpenWeatherProvider::new(&Config::with_api_key("")).unwrap_err();
        assert!(matches!(err, WeatherError::Configuration(_)));
    }

    #[test]
    fn builds_with_timeout_and_custom_endpoint() {
        let mut cfg = Config::with_api_key("KEY");
        cfg.base_url = "http://127.0.0.1:1/weather".into();
        cfg.timeout_secs = Some(3);

        assert!(OpenWeatherProvider::new(&cfg).is_ok());
    }

    #[test]
    fn truncate_body_respects_char_boundaries() {
        let short = "city not found";
        assert_eq!(truncate_body(short), short);

        let long = "é".repeat(250);
        let truncated = truncate_body(&long);
        assert!(truncated.ends_with("..."));
        assert_eq!(truncated.chars().count(), 203);
    }
}

//! Error taxonomy for the weather pipeline.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, WeatherError>;

#[derive(Error, Debug)]
pub enum WeatherError {
    /// Missing or empty credential. Aborts the whole batch.
    #[error("{0}")]
    Configuration(String),

    #[error("{0}")]
    Validation(String),

    /// The API answered with a non-success status.
    #[error("Failed to fetch weather for {city}. Status: {status}. Body: {body}")]
    Fetch {
        city: String,
        status: u16,
        body: String,
    },

    #[error("Failed to send weather request for {city}: {source}")]
    Transport {
        city: String,
        #[source]
        source: reqwest::Error,
    },

    /// The payload lacks a field the normalizer consumes, or is not JSON.
    #[error("Invalid weather payload: {0}")]
    Payload(String),

    #[error("Failed to read config file {}: {source}", .path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write config file {}: {source}", .path.display())]
    ConfigWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {}: {source}", .path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to serialize configuration to TOML: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),
}

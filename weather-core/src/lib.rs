//! Core library for the `weather` workflow step.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The weather provider abstraction and its OpenWeatherMap client
//! - Normalization of raw payloads, alert classification and summaries
//! - The per-record processor and the error-isolating batch driver
//!
//! It is used by `weather-cli`, but can also be embedded in other pipelines.

pub mod config;
pub mod error;
pub mod model;
pub mod normalize;
pub mod processor;
pub mod provider;

pub use config::Config;
pub use error::{Result, WeatherError};
pub use model::{AlertType, ErrorRecord, InputRecord, NormalizedWeatherRecord, OutputRecord};
pub use normalize::{generate_alert, generate_summary, normalize_data};
pub use processor::{WeatherRecordProcessor, run_batch};
pub use provider::{OpenWeatherProvider, WeatherProvider};

//! Per-record pipeline and the batch driver around it.

use crate::{
    config::Config,
    error::{Result, WeatherError},
    model::{ErrorRecord, InputRecord, NormalizedWeatherRecord, OutputRecord},
    normalize,
    provider::{OpenWeatherProvider, WeatherProvider},
};

/// Fetches and normalizes weather for one input record at a time.
#[derive(Debug)]
pub struct WeatherRecordProcessor<P = OpenWeatherProvider> {
    provider: P,
}

impl WeatherRecordProcessor<OpenWeatherProvider> {
    /// Build a processor backed by OpenWeatherMap.
    ///
    /// Fails with [`WeatherError::Configuration`] when `config` has no usable API key.
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self::with_provider(OpenWeatherProvider::new(config)?))
    }
}

impl<P: WeatherProvider> WeatherRecordProcessor<P> {
    pub fn with_provider(provider: P) -> Self {
        Self { provider }
    }

    /// Validate, fetch and normalize a single record.
    pub async fn process(&self, input: &InputRecord) -> Result<NormalizedWeatherRecord> {
        let city = input
            .city
            .as_deref()
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| {
                WeatherError::Validation("Input item must have a \"city\" property.".into())
            })?;

        let raw = self.provider.fetch_weather(city).await?;
        normalize::normalize(raw, Some(city))
    }

    /// Process every record in order, one at a time.
    ///
    /// The output has one entry per input. Failures become [`ErrorRecord`]s
    /// carrying the input's city and never stop the loop.
    pub async fn process_batch(&self, inputs: &[InputRecord]) -> Vec<OutputRecord> {
        let mut results = Vec::with_capacity(inputs.len());

        for input in inputs {
            let output = match self.process(input).await {
                Ok(record) => OutputRecord::Weather(record),
                Err(e) => {
                    tracing::warn!(
                        "Error processing city {:?}: {e}",
                        input.city.as_deref().unwrap_or_default()
                    );
                    OutputRecord::Error(ErrorRecord {
                        error: e.to_string(),
                        city: input.city.clone(),
                    })
                }
            };
            results.push(output);
        }

        results
    }
}

/// Run a whole invocation: build the processor from `config`, then process `inputs`.
///
/// A configuration failure aborts before any request is made and yields a
/// single error record without a city.
pub async fn run_batch(config: &Config, inputs: &[InputRecord]) -> Vec<OutputRecord> {
    match WeatherRecordProcessor::new(config) {
        Ok(processor) => processor.process_batch(inputs).await,
        Err(e) => {
            tracing::error!("A critical error occurred: {e}");
            vec![OutputRecord::Error(ErrorRecord {
                error: e.to_string(),
                city: None,
            })]
        }
    }
}

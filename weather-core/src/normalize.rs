//! Turning raw OpenWeatherMap payloads into [`NormalizedWeatherRecord`]s.
//!
//! Everything here is pure: the only side effect is a debug log of the
//! finished record.

use serde::Deserialize;
use serde_json::Value;

use crate::{
    error::{Result, WeatherError},
    model::{AlertType, NormalizedWeatherRecord},
};

pub const TEMPERATURE_UNIT: &str = "C";
pub const MISSING_CONDITION: &str = "N/A";

const MPS_TO_KPH: f64 = 3.6;
const HEAT_THRESHOLD_C: f64 = 32.0;
const FROST_THRESHOLD_C: f64 = 0.0;
const PRECIPITATION_CONDITIONS: [&str; 6] =
    ["rain", "snow", "drizzle", "storm", "thunderstorm", "mist"];

// Numeric fields the normalizer requires. Everything is optional so a sparse
// payload fails with a precise message rather than a serde error.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct OwPayload {
    main: Option<OwMain>,
    wind: Option<OwWind>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct OwMain {
    temp: Option<f64>,
    humidity: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct OwWind {
    speed: Option<f64>,
}

/// Round half away from zero to 2 decimal places. Never returns `-0.0`.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0 + 0.0
}

pub fn celsius_to_fahrenheit(celsius: f64) -> f64 {
    celsius * 9.0 / 5.0 + 32.0
}

/// Normalize a payload that must carry its own city `name`.
pub fn normalize_data(raw: Value) -> Result<NormalizedWeatherRecord> {
    normalize(raw, None)
}

/// Normalize `raw`, using `fallback_city` when the payload has no `name`.
pub(crate) fn normalize(raw: Value, fallback_city: Option<&str>) -> Result<NormalizedWeatherRecord> {
    let payload = OwPayload::deserialize(&raw)
        .map_err(|e| WeatherError::Payload(format!("unexpected shape: {e}")))?;

    let city = text_at(&raw, "/name")
        .or(fallback_city)
        .map(str::to_owned)
        .ok_or_else(|| WeatherError::Payload("missing field `name`".into()))?;

    let main = payload.main.unwrap_or_default();
    let celsius = main
        .temp
        .ok_or_else(|| WeatherError::Payload("missing field `main.temp`".into()))?;
    let humidity = main
        .humidity
        .ok_or_else(|| WeatherError::Payload("missing field `main.humidity`".into()))?;
    let wind_mps = payload
        .wind
        .and_then(|w| w.speed)
        .ok_or_else(|| WeatherError::Payload("missing field `wind.speed`".into()))?;

    let condition = text_at(&raw, "/weather/0/main")
        .unwrap_or(MISSING_CONDITION)
        .to_string();

    let mut record = NormalizedWeatherRecord {
        city,
        temperature: round2(celsius),
        temperature_unit: TEMPERATURE_UNIT.to_string(),
        condition,
        humidity,
        wind_speed: round2(wind_mps * MPS_TO_KPH),
        alert_type: None,
        summary: String::new(),
        raw_response: raw,
    };

    record.alert_type = generate_alert(&record.condition, record.temperature);
    record.summary = generate_summary(&record, celsius_to_fahrenheit(celsius));

    tracing::debug!(
        city = %record.city,
        temperature = record.temperature,
        condition = %record.condition,
        alert = ?record.alert_type,
        "normalized weather record"
    );

    Ok(record)
}

/// Non-empty string at `pointer`, if any.
fn text_at<'a>(raw: &'a Value, pointer: &str) -> Option<&'a str> {
    raw.pointer(pointer)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

/// First matching rule wins: precipitation, then heat, then frost.
pub fn generate_alert(condition: &str, temperature_c: f64) -> Option<AlertType> {
    let condition = condition.to_lowercase();

    if PRECIPITATION_CONDITIONS.contains(&condition.as_str()) {
        Some(AlertType::Precipitation)
    } else if temperature_c > HEAT_THRESHOLD_C {
        Some(AlertType::Heat)
    } else if temperature_c < FROST_THRESHOLD_C {
        Some(AlertType::Frost)
    } else {
        None
    }
}

pub fn generate_summary(record: &NormalizedWeatherRecord, temperature_f: f64) -> String {
    format!(
        "Daily Weather - {}: Temp: {}°C / {:.2}°F, Condition: {}, Humidity: {}%, Wind: {} kph.",
        record.city,
        record.temperature,
        round2(temperature_f),
        record.condition,
        record.humidity,
        record.wind_speed,
    )
}

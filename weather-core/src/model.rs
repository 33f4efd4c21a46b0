use serde::Serialize;
use serde_json::Value;

/// One item handed to the processor by the surrounding workflow.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputRecord {
    pub city: Option<String>,
}

impl InputRecord {
    pub fn new(city: impl Into<String>) -> Self {
        Self {
            city: Some(city.into()),
        }
    }

    /// Read an item from loosely-typed JSON.
    ///
    /// Accepts a bare `{"city": ...}` object or the workflow envelope
    /// `{"json": {"city": ...}}`. Extra fields are ignored; a missing or
    /// non-string `city` produces a record without a city.
    pub fn from_json(value: &Value) -> Self {
        let body = match value.get("json") {
            Some(inner) if inner.is_object() => inner,
            _ => value,
        };

        Self {
            city: body.get("city").and_then(Value::as_str).map(str::to_owned),
        }
    }
}

/// Rule-based label attached to a normalized record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AlertType {
    #[serde(rename = "Precipitation Alert")]
    Precipitation,
    #[serde(rename = "Heat Alert")]
    Heat,
    #[serde(rename = "Frost Alert")]
    Frost,
}

impl AlertType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertType::Precipitation => "Precipitation Alert",
            AlertType::Heat => "Heat Alert",
            AlertType::Frost => "Frost Alert",
        }
    }
}

impl std::fmt::Display for AlertType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedWeatherRecord {
    pub city: String,
    /// Celsius, rounded to 2 decimal places.
    pub temperature: f64,
    pub temperature_unit: String,
    pub condition: String,
    pub humidity: f64,
    /// Kilometers per hour, rounded to 2 decimal places.
    pub wind_speed: f64,
    pub alert_type: Option<AlertType>,
    pub summary: String,
    /// The API payload exactly as received.
    pub raw_response: Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorRecord {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
}

/// One entry of the batch output; an error record is recognised by its `error` field.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum OutputRecord {
    Weather(NormalizedWeatherRecord),
    Error(ErrorRecord),
}

impl OutputRecord {
    pub fn is_error(&self) -> bool {
        matches!(self, OutputRecord::Error(_))
    }

    pub fn city(&self) -> Option<&str> {
        match self {
            OutputRecord::Weather(record) => Some(record.city.as_str()),
            OutputRecord::Error(record) => record.city.as_deref(),
        }
    }

    pub fn as_weather(&self) -> Option<&NormalizedWeatherRecord> {
        match self {
            OutputRecord::Weather(record) => Some(record),
            OutputRecord::Error(_) => None,
        }
    }

    pub fn as_error(&self) -> Option<&ErrorRecord> {
        match self {
            OutputRecord::Error(record) => Some(record),
            OutputRecord::Weather(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn input_reads_bare_and_enveloped_items() {
        let bare = InputRecord::from_json(&json!({"city": "Paris", "extra": 1}));
        let wrapped = InputRecord::from_json(&json!({"json": {"city": "Paris"}, "pairedItem": 0}));

        assert_eq!(bare, InputRecord::new("Paris"));
        assert_eq!(wrapped, InputRecord::new("Paris"));
    }

    #[test]
    fn input_without_string_city_has_no_city() {
        assert_eq!(InputRecord::from_json(&json!({})).city, None);
        assert_eq!(InputRecord::from_json(&json!({"city": 42})).city, None);
        assert_eq!(InputRecord::from_json(&json!("Paris")).city, None);
    }

    #[test]
    fn alert_serializes_as_label() {
        assert_eq!(
            serde_json::to_value(AlertType::Precipitation).unwrap(),
            json!("Precipitation Alert")
        );
        assert_eq!(AlertType::Frost.to_string(), "Frost Alert");
    }

    #[test]
    fn error_record_omits_unknown_city() {
        let fatal = OutputRecord::Error(ErrorRecord {
            error: "API key is required.".into(),
            city: None,
        });
        assert_eq!(
            serde_json::to_value(&fatal).unwrap(),
            json!({"error": "API key is required."})
        );

        let per_item = OutputRecord::Error(ErrorRecord {
            error: "boom".into(),
            city: Some("Oslo".into()),
        });
        assert_eq!(
            serde_json::to_value(&per_item).unwrap(),
            json!({"error": "boom", "city": "Oslo"})
        );
        assert!(per_item.is_error());
        assert_eq!(per_item.city(), Some("Oslo"));
    }

    #[test]
    fn weather_record_serializes_flat_with_null_alert() {
        let record = OutputRecord::Weather(NormalizedWeatherRecord {
            city: "Lima".into(),
            temperature: 20.0,
            temperature_unit: "C".into(),
            condition: "Clouds".into(),
            humidity: 70.0,
            wind_speed: 10.8,
            alert_type: None,
            summary: "s".into(),
            raw_response: json!({"name": "Lima"}),
        });

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["city"], "Lima");
        assert_eq!(value["temperature_unit"], "C");
        assert!(value["alert_type"].is_null());
        assert!(value.get("error").is_none());
        assert_eq!(value["raw_response"]["name"], "Lima");
    }
}

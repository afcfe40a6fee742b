use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use crate::error::IngestError;

/// field the collector owns; any caller-supplied value is overwritten
pub const TIMESTAMP_FIELD: &str = "timestamp";

/// local time, no offset, microseconds (e.g. "2026-10-19T14:03:07.120558")
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

/// field averaged by /stats
pub const MOISTURE_FIELD: &str = "moisture";

/// a stored sensor reading
/// flat json object as posted by the sensor plus the server timestamp.
/// examples:
/// - {"moisture": 31022, "device_id": "pico-1", "timestamp": "..."}
/// - {"red": 512, "green": 880, "blue": 301, "moisture": 40211, "timestamp": "..."}
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Reading(Map<String, Value>);

impl Reading {
    /// parse a request body into the unstamped field map
    /// rejects invalid json and any json value that is not an object
    pub fn parse(body: &[u8]) -> Result<Map<String, Value>, IngestError> {
        match serde_json::from_slice::<Value>(body).map_err(IngestError::MalformedBody)? {
            Value::Object(fields) => Ok(fields),
            other => Err(IngestError::NotAnObject(json_kind(&other))),
        }
    }

    /// stamp the fields with the receipt time
    pub fn stamp(mut fields: Map<String, Value>, now: NaiveDateTime) -> Self {
        let stamp = now.format(TIMESTAMP_FORMAT).to_string();
        fields.insert(TIMESTAMP_FIELD.to_string(), Value::String(stamp));
        Self(fields)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn timestamp(&self) -> Option<&str> {
        self.0.get(TIMESTAMP_FIELD).and_then(Value::as_str)
    }

    /// moisture as used by /stats: missing or non-numeric counts as 0
    pub fn moisture(&self) -> Number {
        match self.0.get(MOISTURE_FIELD) {
            Some(Value::Number(n)) => n.clone(),
            _ => Number::from(0),
        }
    }

    /// one line of the daily log, without the trailing newline
    pub fn to_json_line(&self) -> Result<String, IngestError> {
        serde_json::to_string(&self.0).map_err(IngestError::Encode)
    }

    /// short human-readable summary for the ingest log line
    /// soil sensors send `moisture`, rgb sensors `red_light` or plain `red`
    pub fn summary(&self) -> String {
        let field = |names: &[&str]| {
            names
                .iter()
                .find_map(|name| self.0.get(*name))
                .map(|v| v.to_string())
                .unwrap_or_else(|| "-".to_string())
        };
        format!(
            "moisture={} r={} g={} b={}",
            field(&[MOISTURE_FIELD]),
            field(&["red_light", "red"]),
            field(&["green_light", "green"]),
            field(&["blue_light", "blue"]),
        )
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    fn noon() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 19)
            .unwrap()
            .and_hms_micro_opt(12, 0, 5, 42)
            .unwrap()
    }

    #[test]
    fn test_parse_accepts_object() {
        let fields = Reading::parse(br#"{"moisture": 512, "device_id": "pico-1"}"#).unwrap();
        assert_eq!(fields["moisture"], 512);
        assert_eq!(fields["device_id"], "pico-1");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        let err = Reading::parse(b"moisture=512").unwrap_err();
        assert!(matches!(err, IngestError::MalformedBody(_)));
        assert!(!err.to_string().is_empty());
    }

    #[test]
    fn test_parse_rejects_bare_number() {
        // soil sensor firmware posts a bare integer; that is not a reading
        let err = Reading::parse(b"31022").unwrap_err();
        assert!(matches!(err, IngestError::NotAnObject("number")));
    }

    #[test]
    fn test_stamp_adds_timestamp() {
        let fields = Reading::parse(br#"{"moisture": 10}"#).unwrap();
        let reading = Reading::stamp(fields, noon());
        assert_eq!(reading.timestamp(), Some("2026-10-19T12:00:05.000042"));
        assert_eq!(reading.get("moisture"), Some(&json!(10)));
    }

    #[test]
    fn test_stamp_overwrites_caller_timestamp() {
        let fields = Reading::parse(br#"{"timestamp": "yesterday", "moisture": 1}"#).unwrap();
        let reading = Reading::stamp(fields, noon());
        assert_eq!(reading.timestamp(), Some("2026-10-19T12:00:05.000042"));
        assert_eq!(serde_json::to_value(&reading).unwrap().as_object().unwrap().len(), 2);
    }

    #[test]
    fn test_moisture_defaults_to_zero() {
        let missing = Reading::stamp(Map::new(), noon());
        assert_eq!(missing.moisture(), Number::from(0));

        let text = Reading::stamp(Reading::parse(br#"{"moisture": "wet"}"#).unwrap(), noon());
        assert_eq!(text.moisture(), Number::from(0));

        let float = Reading::stamp(Reading::parse(br#"{"moisture": 12.5}"#).unwrap(), noon());
        assert_eq!(float.moisture().as_f64(), Some(12.5));
    }

    #[test]
    fn test_json_line_keeps_field_order() {
        let fields = Reading::parse(br#"{"red": 1, "green": 2, "blue": 3}"#).unwrap();
        let line = Reading::stamp(fields, noon()).to_json_line().unwrap();
        assert_eq!(
            line,
            r#"{"red":1,"green":2,"blue":3,"timestamp":"2026-10-19T12:00:05.000042"}"#
        );
        assert!(!line.contains('\n'));
    }

    #[test]
    fn test_numbers_are_logged_exactly_as_posted() {
        let body = br#"{"moisture": 123456789012345678901234567890, "ratio": 0.1000000000000000055511151231257827, "big": 1e400}"#;
        let line = Reading::stamp(Reading::parse(body).unwrap(), noon()).to_json_line().unwrap();
        assert_eq!(
            line,
            r#"{"moisture":123456789012345678901234567890,"ratio":0.1000000000000000055511151231257827,"big":1e400,"timestamp":"2026-10-19T12:00:05.000042"}"#
        );
    }

    #[test]
    fn test_summary_reads_both_rgb_spellings() {
        let a = Reading::stamp(
            Reading::parse(br#"{"moisture": 5, "red_light": 1, "green_light": 2, "blue_light": 3}"#).unwrap(),
            noon(),
        );
        assert_eq!(a.summary(), "moisture=5 r=1 g=2 b=3");

        let b = Reading::stamp(Reading::parse(br#"{"red": 7}"#).unwrap(), noon());
        assert_eq!(b.summary(), "moisture=- r=7 g=- b=-");
    }
}

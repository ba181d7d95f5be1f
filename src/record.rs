use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::merge::merge_layers;
use crate::trace::TraceContext;

/// Flat key/value mapping carried by a log record.
///
/// Values are arbitrary JSON; keys colliding with reserved record fields
/// (timestamp, service, level, category, event, trace.*) override them on
/// merge, last writer wins.
pub type Fields = serde_json::Map<String, Value>;

/// A single structured log line, assembled per call and discarded after
/// serialization. Never retained, queued or mutated after emission.
#[derive(Debug, Clone)]
pub struct LogRecord {
    pub timestamp: DateTime<Utc>,
    pub service: String,
    pub level: String,
    pub category: String,
    pub event: String,
    pub trace: Option<TraceContext>,
    pub extra: Fields,
}

impl LogRecord {
    /// Flatten the record into one field map.
    ///
    /// Merge order is fixed: base fields, then trace correlation fields,
    /// then caller-supplied extras. Later layers override earlier ones on
    /// key collision.
    pub fn into_fields(self) -> Fields {
        let mut base = Fields::new();
        base.insert(
            "timestamp".to_string(),
            Value::String(self.timestamp.to_rfc3339_opts(SecondsFormat::Micros, true)),
        );
        base.insert("service".to_string(), Value::String(self.service));
        base.insert("level".to_string(), Value::String(self.level));
        base.insert("category".to_string(), Value::String(self.category));
        base.insert("event".to_string(), Value::String(self.event));

        let trace = self.trace.map(|t| t.to_fields()).unwrap_or_default();

        merge_layers([base, trace, self.extra])
    }

    /// Serialize the record into a single compact JSON line (no trailing
    /// newline).
    pub fn into_json(self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.into_fields())
    }
}

/// Convert any serializable value into a [`Fields`] map.
///
/// **Returns**
/// - `Ok(map)` when the value serializes to a JSON object.
/// - `Err(..)` when serialization fails or the value is not an object
///   (arrays, scalars and null cannot be merged into a flat record).
pub fn to_fields<T: Serialize>(value: &T) -> Result<Fields, serde_json::Error> {
    use serde::ser::Error;

    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(serde_json::Error::custom(format!(
            "expected a JSON object for extra fields, got {}",
            kind_of(&other)
        ))),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn record(extra: Fields) -> LogRecord {
        LogRecord {
            timestamp: Utc.with_ymd_and_hms(2026, 3, 1, 12, 30, 45).unwrap(),
            service: "slots-service".to_string(),
            level: "INFO".to_string(),
            category: "game".to_string(),
            event: "start".to_string(),
            trace: None,
            extra,
        }
    }

    #[test]
    fn timestamp_is_utc_with_z_suffix() {
        let fields = record(Fields::new()).into_fields();
        let ts = fields["timestamp"].as_str().unwrap();
        assert!(ts.ends_with('Z'), "timestamp {ts} should end with Z");
        assert!(ts.starts_with("2026-03-01T12:30:45"));
    }

    #[test]
    fn extra_fields_override_base_fields() {
        let mut extra = Fields::new();
        extra.insert("service".to_string(), json!("imposter"));
        extra.insert("spin_count".to_string(), json!(3));

        let fields = record(extra).into_fields();
        assert_eq!(fields["service"], json!("imposter"));
        assert_eq!(fields["spin_count"], json!(3));
    }

    #[test]
    fn trace_fields_sit_between_base_and_extra() {
        let mut rec = record(Fields::new());
        rec.trace = Some(TraceContext::new(1, 1, 1));
        let mut extra = Fields::new();
        extra.insert("span.id".to_string(), json!("overridden"));
        rec.extra = extra;

        let fields = rec.into_fields();
        assert_eq!(
            fields["trace.id"],
            json!("00000000000000000000000000000001")
        );
        assert_eq!(fields["span.id"], json!("overridden"));
        assert_eq!(fields["trace.flags"], json!(1));
    }

    #[test]
    fn into_json_is_one_line() {
        let json = record(Fields::new()).into_json().unwrap();
        assert!(!json.contains('\n'));
        let parsed: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["category"], json!("game"));
    }

    #[test]
    fn to_fields_accepts_structs() {
        #[derive(Serialize)]
        struct Spin {
            reel: u32,
            symbol: String,
        }

        let fields = to_fields(&Spin { reel: 2, symbol: "cherry".to_string() }).unwrap();
        assert_eq!(fields["reel"], json!(2));
        assert_eq!(fields["symbol"], json!("cherry"));
    }

    #[test]
    fn to_fields_rejects_non_objects() {
        let err = to_fields(&vec![1, 2, 3]).unwrap_err();
        assert!(err.to_string().contains("an array"));
    }
}

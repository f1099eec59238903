use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Serialize, Serializer};

/// One normalized data-logger reading. Absent values serialize as `null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CanonicalRecord {
    #[serde(serialize_with = "serialize_utc")]
    pub timestamp: Option<DateTime<Utc>>,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
}

impl CanonicalRecord {
    pub fn to_json_line(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// RFC 3339 with a literal `Z`, e.g. `2023-03-15T00:00:00Z`
fn serialize_utc<S>(ts: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match ts {
        Some(ts) => serializer.serialize_str(&format_utc(ts)),
        None => serializer.serialize_none(),
    }
}

pub fn format_utc(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Failure line printed instead of records.
#[derive(Debug, Serialize)]
pub struct ErrorOutput {
    pub error: String,
}

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesRecord {
    pub date: NaiveDate,
    pub total: u64,
}

/// A sales row as supplied by a caller, before validation.
///
/// Both fields are kept as loose JSON so that malformed rows reach the forecast
/// validation step (and get a precise error code) instead of failing deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSalesRecord {
    #[serde(default)]
    pub date: Value,
    #[serde(default)]
    pub total: Value,
}

impl RawSalesRecord {
    pub fn new(date: impl Into<String>, total: impl Into<Value>) -> Self {
        Self {
            date: Value::String(date.into()),
            total: total.into(),
        }
    }
}

impl From<SalesRecord> for RawSalesRecord {
    fn from(record: SalesRecord) -> Self {
        Self::new(record.date.format("%Y-%m-%d").to_string(), record.total)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastRequest {
    pub sales: Vec<RawSalesRecord>,
    #[serde(default)]
    pub horizon_days: Option<i64>,
}

use chrono::NaiveDate;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ForecastMethod {
    OverallAverage,
    WeekdayPattern,
}

impl ForecastMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::OverallAverage => "overall-average",
            Self::WeekdayPattern => "weekday-pattern",
        }
    }
}

impl fmt::Display for ForecastMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub total: u64,
    pub lower: u64,
    pub upper: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Forecast {
    pub method: ForecastMethod,
    pub used_fallback: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(rename = "forecast")]
    pub points: Vec<ForecastPoint>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastFailure {
    pub code: String,
    pub message: String,
}

/// Outcome of one forecast call. Serializes as `{"ok": true, ...}` or
/// `{"ok": false, "code": ..., "message": ...}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ForecastOutcome {
    Ok(Forecast),
    Err(ForecastFailure),
}

impl ForecastOutcome {
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok(_))
    }

    pub fn forecast(&self) -> Option<&Forecast> {
        match self {
            Self::Ok(f) => Some(f),
            Self::Err(_) => None,
        }
    }

    pub fn failure(&self) -> Option<&ForecastFailure> {
        match self {
            Self::Ok(_) => None,
            Self::Err(e) => Some(e),
        }
    }
}

#[derive(Serialize)]
struct TaggedOk<'a> {
    ok: bool,
    #[serde(flatten)]
    forecast: &'a Forecast,
}

#[derive(Serialize)]
struct TaggedErr<'a> {
    ok: bool,
    #[serde(flatten)]
    failure: &'a ForecastFailure,
}

impl Serialize for ForecastOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Ok(forecast) => TaggedOk { ok: true, forecast }.serialize(serializer),
            Self::Err(failure) => TaggedErr { ok: false, failure }.serialize(serializer),
        }
    }
}

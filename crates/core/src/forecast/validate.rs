use crate::domain::sales::{RawSalesRecord, SalesRecord};
use crate::forecast::error::ForecastError;
use chrono::{DateTime, NaiveDate};
use serde_json::Value;

// 2^64 as f64; anything at or above cannot be represented as u64.
const U64_LIMIT_F64: f64 = 18_446_744_073_709_551_616.0;

pub fn validate_records(raw: &[RawSalesRecord]) -> Result<Vec<SalesRecord>, ForecastError> {
    if raw.is_empty() {
        return Err(ForecastError::EmptyData);
    }

    let mut out = Vec::with_capacity(raw.len());
    for (i, record) in raw.iter().enumerate() {
        let row = i + 1;
        let date = parse_date(&record.date).ok_or_else(|| ForecastError::InvalidDate {
            row,
            value: display_value(&record.date),
        })?;
        let total = parse_total(&record.total).ok_or_else(|| ForecastError::InvalidAmount {
            row,
            value: display_value(&record.total),
        })?;
        out.push(SalesRecord { date, total });
    }

    Ok(out)
}

pub fn parse_date(value: &Value) -> Option<NaiveDate> {
    let s = value.as_str()?.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(d);
    }

    DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive())
}

/// Non-negative whole numbers only. `100.0` is accepted, `100.5` and `-1` are not.
pub fn parse_total(value: &Value) -> Option<u64> {
    let Value::Number(n) = value else {
        return None;
    };
    if let Some(u) = n.as_u64() {
        return Some(u);
    }
    if n.is_i64() {
        // Representable as i64 but not u64: negative.
        return None;
    }

    let f = n.as_f64()?;
    if f.is_finite() && f >= 0.0 && f.fract() == 0.0 && f < U64_LIMIT_F64 {
        Some(f as u64)
    } else {
        None
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => format!("\"{s}\""),
        Value::Null => "missing".to_string(),
        other => other.to_string(),
    }
}

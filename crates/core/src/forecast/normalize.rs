use crate::domain::sales::SalesRecord;
use crate::forecast::error::ForecastError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DuplicatePolicy {
    #[default]
    Reject,
    KeepLast,
    Sum,
}

impl DuplicatePolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Reject => "reject",
            Self::KeepLast => "keep-last",
            Self::Sum => "sum",
        }
    }
}

impl FromStr for DuplicatePolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reject" => Ok(Self::Reject),
            "keep-last" | "keep_last" | "last" => Ok(Self::KeepLast),
            "sum" => Ok(Self::Sum),
            other => anyhow::bail!("unknown duplicate policy: {other} (expected reject, keep-last or sum)"),
        }
    }
}

pub fn normalize(
    records: &[SalesRecord],
    policy: DuplicatePolicy,
) -> Result<Vec<SalesRecord>, ForecastError> {
    let mut sorted = records.to_vec();
    sorted.sort_by_key(|r| r.date);

    let mut out: Vec<SalesRecord> = Vec::with_capacity(sorted.len());
    for record in sorted {
        if let Some(prev) = out.last_mut().filter(|prev| prev.date == record.date) {
            match policy {
                DuplicatePolicy::Reject => {
                    return Err(ForecastError::DuplicateDate { date: record.date });
                }
                DuplicatePolicy::KeepLast => *prev = record,
                DuplicatePolicy::Sum => {
                    prev.total = prev.total.checked_add(record.total).ok_or_else(|| {
                        ForecastError::internal(format!("total overflow summing {}", record.date))
                    })?;
                }
            }
            continue;
        }
        out.push(record);
    }

    Ok(out)
}

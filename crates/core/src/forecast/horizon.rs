use crate::domain::forecast::ForecastFailure;
use std::num::NonZeroU32;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HorizonError {
    #[error("The forecast horizon must be at least 1 day (requested {requested}).")]
    NotPositive { requested: i64 },

    #[error("The forecast horizon can be at most {max} days (requested {requested}).")]
    TooLong { requested: i64, max: u32 },
}

impl HorizonError {
    pub fn code(&self) -> &'static str {
        "InvalidHorizon"
    }
}

impl From<HorizonError> for ForecastFailure {
    fn from(err: HorizonError) -> Self {
        Self {
            code: err.code().to_string(),
            message: err.to_string(),
        }
    }
}

pub fn resolve_horizon(
    requested: Option<i64>,
    default_days: u32,
    max_days: u32,
) -> Result<NonZeroU32, HorizonError> {
    let days = requested.unwrap_or_else(|| i64::from(default_days));
    if days < 1 {
        return Err(HorizonError::NotPositive { requested: days });
    }
    if days > i64::from(max_days) {
        return Err(HorizonError::TooLong {
            requested: days,
            max: max_days,
        });
    }
    u32::try_from(days)
        .ok()
        .and_then(NonZeroU32::new)
        .ok_or(HorizonError::NotPositive { requested: days })
}

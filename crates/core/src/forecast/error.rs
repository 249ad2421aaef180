use crate::domain::forecast::ForecastFailure;
use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ForecastError {
    #[error("No sales data provided. Add at least one day of sales to generate a forecast.")]
    EmptyData,

    #[error("Row {row} has an invalid date ({value}). Use a calendar date such as 2024-08-01.")]
    InvalidDate { row: usize, value: String },

    #[error("Row {row} has an invalid total ({value}). Totals must be whole numbers of zero or more.")]
    InvalidAmount { row: usize, value: String },

    #[error("More than one sales total was supplied for {date}. Provide one total per day.")]
    DuplicateDate { date: NaiveDate },

    #[error("An unexpected error occurred while generating the forecast. Please try again.")]
    Internal { detail: String },
}

impl ForecastError {
    pub fn internal(detail: impl Into<String>) -> Self {
        Self::Internal {
            detail: detail.into(),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::EmptyData => "EmptyData",
            Self::InvalidDate { .. } => "InvalidDate",
            Self::InvalidAmount { .. } => "InvalidAmount",
            Self::DuplicateDate { .. } => "DuplicateDate",
            Self::Internal { .. } => "Internal",
        }
    }

    pub fn is_input_error(&self) -> bool {
        !matches!(self, Self::Internal { .. })
    }

    /// An `Internal` produced by a contained panic. The panic hook has already reported it.
    pub fn is_contained_panic(&self) -> bool {
        matches!(self, Self::Internal { detail } if detail.starts_with("panic:"))
    }
}

impl From<&ForecastError> for ForecastFailure {
    fn from(err: &ForecastError) -> Self {
        Self {
            code: err.code().to_string(),
            message: err.to_string(),
        }
    }
}

impl From<ForecastError> for ForecastFailure {
    fn from(err: ForecastError) -> Self {
        Self::from(&err)
    }
}

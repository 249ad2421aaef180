use crate::domain::forecast::{Forecast, ForecastMethod, ForecastOutcome};
use crate::domain::sales::RawSalesRecord;
use crate::forecast::error::ForecastError;
use crate::forecast::model::{self, WeekdayProfile, MIN_HISTORY_DAYS};
use crate::forecast::normalize::{normalize, DuplicatePolicy};
use crate::forecast::validate::validate_records;
use crate::time::Clock;
use std::num::NonZeroU32;
use std::panic::{catch_unwind, AssertUnwindSafe};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForecastOptions {
    pub duplicate_policy: DuplicatePolicy,
    /// Mark weekday-pattern results as `usedFallback` too, as existing dashboards expect.
    pub legacy_fallback_flag: bool,
}

impl Default for ForecastOptions {
    fn default() -> Self {
        Self {
            duplicate_policy: DuplicatePolicy::Reject,
            legacy_fallback_flag: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ForecastEngine<C> {
    clock: C,
    options: ForecastOptions,
}

impl<C: Clock> ForecastEngine<C> {
    pub fn new(clock: C) -> Self {
        Self::with_options(clock, ForecastOptions::default())
    }

    pub fn with_options(clock: C, options: ForecastOptions) -> Self {
        Self { clock, options }
    }

    pub fn forecast(&self, sales: &[RawSalesRecord], horizon_days: NonZeroU32) -> ForecastOutcome {
        match self.try_forecast(sales, horizon_days) {
            Ok(forecast) => ForecastOutcome::Ok(forecast),
            Err(err) => ForecastOutcome::Err(err.into()),
        }
    }

    pub fn try_forecast(
        &self,
        sales: &[RawSalesRecord],
        horizon_days: NonZeroU32,
    ) -> Result<Forecast, ForecastError> {
        self.guarded(|| self.compute(sales, horizon_days))
    }

    fn compute(
        &self,
        sales: &[RawSalesRecord],
        horizon_days: NonZeroU32,
    ) -> Result<Forecast, ForecastError> {
        let records = validate_records(sales)?;
        let records = normalize(&records, self.options.duplicate_policy)?;
        let horizon = horizon_days.get();

        if records.len() < MIN_HISTORY_DAYS {
            let today = self.clock.today();
            tracing::debug!(
                days = records.len(),
                %today,
                horizon_days = horizon,
                method = %ForecastMethod::OverallAverage,
                "insufficient history; using overall average"
            );
            let points = model::overall_average(&records, today, horizon)?;
            return Ok(Forecast {
                method: ForecastMethod::OverallAverage,
                used_fallback: true,
                message: Some(insufficient_history_message(records.len())),
                points,
            });
        }

        tracing::debug!(
            days = records.len(),
            horizon_days = horizon,
            method = %ForecastMethod::WeekdayPattern,
            "forecasting from weekday pattern"
        );
        let points = model::weekday_pattern(&records, horizon)?;
        Ok(Forecast {
            method: ForecastMethod::WeekdayPattern,
            used_fallback: self.options.legacy_fallback_flag,
            message: None,
            points,
        })
    }

    pub fn weekday_profile(&self, sales: &[RawSalesRecord]) -> Result<WeekdayProfile, ForecastError> {
        self.guarded(|| {
            let records = validate_records(sales)?;
            let records = normalize(&records, self.options.duplicate_policy)?;
            WeekdayProfile::from_records(&records)
        })
    }

    fn guarded<T>(
        &self,
        f: impl FnOnce() -> Result<T, ForecastError>,
    ) -> Result<T, ForecastError> {
        let result = catch_unwind(AssertUnwindSafe(f))
            .unwrap_or_else(|payload| Err(ForecastError::internal(panic_detail(payload.as_ref()))));

        if let Err(ForecastError::Internal { detail }) = &result {
            tracing::error!(%detail, "forecast failed with an internal error");
        }
        result
    }
}

pub fn forecast<C: Clock>(
    clock: &C,
    sales: &[RawSalesRecord],
    horizon_days: NonZeroU32,
) -> ForecastOutcome {
    ForecastEngine::new(clock).forecast(sales, horizon_days)
}

fn insufficient_history_message(days: usize) -> String {
    let plural = if days == 1 { "" } else { "s" };
    format!(
        "Only {days} day{plural} of sales history available; at least {MIN_HISTORY_DAYS} days are \
         needed for a weekday-pattern forecast. Showing a flat overall-average forecast instead."
    )
}

fn panic_detail(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("panic: {s}")
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("panic: {s}")
    } else {
        "panic: non-string payload".to_string()
    }
}

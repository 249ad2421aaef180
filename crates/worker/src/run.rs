use anyhow::Context;
use chrono::{DateTime, Utc};
use mauzo_core::config::Settings;
use mauzo_core::domain::forecast::ForecastOutcome;
use mauzo_core::forecast::{resolve_horizon, ForecastEngine, WeekdayProfile};
use mauzo_core::time::{clock::resolve_today, FixedClock};
use serde_json::{json, Value};

use crate::ingest::{load_history, HistorySource};

#[derive(Debug, Clone)]
pub struct Job {
    pub source: HistorySource,
    pub horizon_days: Option<u32>,
    pub today: Option<String>,
    pub show_profile: bool,
}

#[derive(Debug)]
pub struct Report {
    pub outcome: ForecastOutcome,
    pub profile: Option<WeekdayProfile>,
}

impl Report {
    pub fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }

    pub fn to_json(&self, show_profile: bool) -> anyhow::Result<Value> {
        let outcome = serde_json::to_value(&self.outcome)?;
        if !show_profile {
            return Ok(outcome);
        }
        let mut doc = json!({ "outcome": outcome });
        if let Some(profile) = &self.profile {
            doc["profile"] = serde_json::to_value(profile)?;
        }
        Ok(doc)
    }
}

pub fn run(job: &Job, settings: &Settings, now_utc: DateTime<Utc>) -> anyhow::Result<Report> {
    let shop_offset = settings.utc_offset()?;
    let horizon = resolve_horizon(
        job.horizon_days.map(i64::from),
        settings.default_horizon_days,
        settings.max_horizon_days,
    )
    .context("invalid --horizon-days")?;
    let today = resolve_today(job.today.as_deref(), now_utc, shop_offset)?;

    let sales = load_history(&job.source, shop_offset)?;
    tracing::info!(
        rows = sales.len(),
        %today,
        horizon_days = horizon.get(),
        duplicate_policy = settings.duplicate_policy.as_str(),
        "forecasting sales history"
    );

    let engine = ForecastEngine::with_options(FixedClock(today), settings.forecast_options());
    let outcome = engine.forecast(&sales, horizon);

    let profile = if job.show_profile {
        engine.weekday_profile(&sales).ok()
    } else {
        None
    };

    match &outcome {
        ForecastOutcome::Ok(f) => tracing::info!(
            method = %f.method,
            points = f.points.len(),
            "forecast generated"
        ),
        ForecastOutcome::Err(failure) => tracing::warn!(
            code = %failure.code,
            message = %failure.message,
            "forecast failed"
        ),
    }

    Ok(Report { outcome, profile })
}

use anyhow::Context;
use chrono::{DateTime, FixedOffset, NaiveDate, Utc};

pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

impl<C: Clock + ?Sized> Clock for &C {
    fn today(&self) -> NaiveDate {
        (**self).today()
    }
}

impl<C: Clock + ?Sized> Clock for std::sync::Arc<C> {
    fn today(&self) -> NaiveDate {
        (**self).today()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    offset: FixedOffset,
}

impl SystemClock {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }
}

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        date_at_offset(Utc::now(), self.offset)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

pub fn date_at_offset(now_utc: DateTime<Utc>, offset: FixedOffset) -> NaiveDate {
    now_utc.with_timezone(&offset).date_naive()
}

/// Resolve the date a forecast run treats as today: an explicit `YYYY-MM-DD`
/// wins, otherwise the local date of `now_utc` at `offset`.
pub fn resolve_today(
    today_arg: Option<&str>,
    now_utc: DateTime<Utc>,
    offset: FixedOffset,
) -> anyhow::Result<NaiveDate> {
    if let Some(s) = today_arg {
        return NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .with_context(|| format!("invalid date (expected YYYY-MM-DD): {s}"));
    }

    Ok(date_at_offset(now_utc, offset))
}

use crate::domain::forecast::ForecastPoint;
use crate::domain::sales::SalesRecord;
use crate::forecast::error::ForecastError;
use crate::time::calendar::{self, DAYS_PER_WEEK, WEEKDAYS};
use chrono::{Datelike, NaiveDate, Weekday};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

pub const MIN_HISTORY_DAYS: usize = 14;

pub const PATTERN_WINDOW_DAYS: usize = 28;

pub const BAND_PERCENT: u64 = 15;

pub fn rounded_mean(totals: &[u64]) -> Result<Option<u64>, ForecastError> {
    if totals.is_empty() {
        return Ok(None);
    }

    let n = totals.len() as u128;
    let sum = totals
        .iter()
        .try_fold(0u128, |acc, &t| acc.checked_add(u128::from(t)))
        .ok_or_else(|| ForecastError::internal("overflow summing totals"))?;

    let mean = sum
        .checked_mul(2)
        .and_then(|twice| twice.checked_add(n))
        .map(|num| num / (2 * n))
        .ok_or_else(|| ForecastError::internal("overflow computing mean"))?;

    u64::try_from(mean)
        .map(Some)
        .map_err(|_| ForecastError::internal("mean exceeds u64"))
}

fn scale_percent(value: u64, percent: u64) -> Result<u64, ForecastError> {
    let scaled = (u128::from(value) * u128::from(percent) * 2 + 100) / 200;
    u64::try_from(scaled).map_err(|_| ForecastError::internal("band edge exceeds u64"))
}

pub fn band(total: u64) -> Result<(u64, u64), ForecastError> {
    let lower = scale_percent(total, 100 - BAND_PERCENT)?;
    let upper = scale_percent(total, 100 + BAND_PERCENT)?;
    Ok((lower, upper))
}

pub fn point(date: NaiveDate, total: u64) -> Result<ForecastPoint, ForecastError> {
    let (lower, upper) = band(total)?;
    Ok(ForecastPoint {
        date,
        total,
        lower,
        upper,
    })
}

fn future_dates(anchor: NaiveDate, horizon_days: u32) -> Result<Vec<NaiveDate>, ForecastError> {
    calendar::days_after(anchor, horizon_days).ok_or_else(|| {
        ForecastError::internal(format!(
            "{horizon_days} days after {anchor} is outside the supported calendar"
        ))
    })
}

pub fn overall_average(
    records: &[SalesRecord],
    today: NaiveDate,
    horizon_days: u32,
) -> Result<Vec<ForecastPoint>, ForecastError> {
    let totals: Vec<u64> = records.iter().map(|r| r.total).collect();
    let avg = rounded_mean(&totals)?.ok_or(ForecastError::EmptyData)?;

    future_dates(today, horizon_days)?
        .into_iter()
        .map(|date| point(date, avg))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekdayProfile {
    totals: [u64; DAYS_PER_WEEK],
    samples: [usize; DAYS_PER_WEEK],
}

impl WeekdayProfile {
    /// Build from sorted, de-duplicated records using the last `PATTERN_WINDOW_DAYS` of them.
    /// Weekdays without samples take the rounded mean of the whole window.
    pub fn from_records(records: &[SalesRecord]) -> Result<Self, ForecastError> {
        let start = records.len().saturating_sub(PATTERN_WINDOW_DAYS);
        let window = &records[start..];

        let all: Vec<u64> = window.iter().map(|r| r.total).collect();
        let overall = rounded_mean(&all)?.ok_or(ForecastError::EmptyData)?;

        let mut buckets: [Vec<u64>; DAYS_PER_WEEK] = Default::default();
        for r in window {
            buckets[calendar::weekday_index(r.date)].push(r.total);
        }

        let mut totals = [overall; DAYS_PER_WEEK];
        let mut samples = [0usize; DAYS_PER_WEEK];
        for (i, bucket) in buckets.iter().enumerate() {
            samples[i] = bucket.len();
            if let Some(mean) = rounded_mean(bucket)? {
                totals[i] = mean;
            }
        }

        Ok(Self { totals, samples })
    }

    pub fn total_for(&self, weekday: Weekday) -> u64 {
        self.totals[weekday.num_days_from_sunday() as usize]
    }

    pub fn samples_for(&self, weekday: Weekday) -> usize {
        self.samples[weekday.num_days_from_sunday() as usize]
    }

    pub fn entries(&self) -> impl Iterator<Item = (Weekday, u64)> + '_ {
        WEEKDAYS.iter().copied().zip(self.totals.iter().copied())
    }
}

impl Serialize for WeekdayProfile {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(DAYS_PER_WEEK))?;
        for (weekday, total) in self.entries() {
            map.serialize_entry(&weekday.to_string(), &total)?;
        }
        map.end()
    }
}

pub fn weekday_pattern(
    records: &[SalesRecord],
    horizon_days: u32,
) -> Result<Vec<ForecastPoint>, ForecastError> {
    let last = records.last().ok_or(ForecastError::EmptyData)?;
    let profile = WeekdayProfile::from_records(records)?;

    future_dates(last.date, horizon_days)?
        .into_iter()
        .map(|date| point(date, profile.total_for(date.weekday())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Days;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn consecutive(start: NaiveDate, totals: &[u64]) -> Vec<SalesRecord> {
        totals
            .iter()
            .enumerate()
            .map(|(i, &total)| SalesRecord {
                date: start.checked_add_days(Days::new(i as u64)).unwrap(),
                total,
            })
            .collect()
    }

    #[test]
    fn rounded_mean_rounds_half_up() {
        assert_eq!(rounded_mean(&[]).unwrap(), None);
        assert_eq!(rounded_mean(&[1, 2]).unwrap(), Some(2));
        assert_eq!(rounded_mean(&[1, 1, 2]).unwrap(), Some(1));
        assert_eq!(rounded_mean(&[u64::MAX, u64::MAX]).unwrap(), Some(u64::MAX));
    }

    #[test]
    fn band_is_fifteen_percent_each_side() {
        assert_eq!(band(100).unwrap(), (85, 115));
        assert_eq!(band(0).unwrap(), (0, 0));
        // 8.5 -> 9, 11.5 -> 12
        assert_eq!(band(10).unwrap(), (9, 12));
        assert_eq!(band(1).unwrap(), (1, 1));
    }

    #[test]
    fn band_overflow_is_internal() {
        assert_eq!(band(u64::MAX).unwrap_err().code(), "Internal");
    }

    #[test]
    fn overall_average_anchors_on_today() {
        let records = consecutive(d(2024, 1, 1), &[100, 101]);
        let points = overall_average(&records, d(2024, 8, 19), 2).unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].date, d(2024, 8, 20));
        assert_eq!(points[1].date, d(2024, 8, 21));
        // mean 100.5 rounds up
        assert!(points.iter().all(|p| p.total == 101 && p.lower == 86 && p.upper == 116));
    }

    #[test]
    fn profile_uses_trailing_window_only() {
        // 35 days: the first 7 are huge and must fall outside the 28-day window.
        let mut totals = vec![10_000; 7];
        totals.extend(std::iter::repeat(100).take(28));
        let records = consecutive(d(2024, 7, 1), &totals);
        let profile = WeekdayProfile::from_records(&records).unwrap();
        assert!(profile.entries().all(|(_, t)| t == 100));
        assert!(WEEKDAYS.iter().all(|&w| profile.samples_for(w) == 4));
    }

    #[test]
    fn profile_fills_missing_weekdays_with_window_mean() {
        // Only weekdays Mon-Fri present over three weeks; weekend gets the overall mean.
        let mut records = Vec::new();
        let mut date = d(2024, 8, 5); // Monday
        for _ in 0..3 {
            for total in [100u64, 200, 300, 400, 500] {
                records.push(SalesRecord { date, total });
                date = date.checked_add_days(Days::new(1)).unwrap();
            }
            date = date.checked_add_days(Days::new(2)).unwrap();
        }
        let profile = WeekdayProfile::from_records(&records).unwrap();
        assert_eq!(profile.total_for(Weekday::Mon), 100);
        assert_eq!(profile.total_for(Weekday::Fri), 500);
        assert_eq!(profile.total_for(Weekday::Sat), 300);
        assert_eq!(profile.total_for(Weekday::Sun), 300);
        assert_eq!(profile.samples_for(Weekday::Sun), 0);
    }

    #[test]
    fn weekday_pattern_anchors_after_last_record() {
        let records = consecutive(d(2024, 8, 1), &[100; 14]);
        let points = weekday_pattern(&records, 3).unwrap();
        assert_eq!(points[0].date, d(2024, 8, 15));
        assert_eq!(points[2].date, d(2024, 8, 17));
    }

    #[test]
    fn profile_serializes_sunday_first() {
        let records = consecutive(d(2024, 8, 4), &[7, 1, 2, 3, 4, 5, 6]);
        let profile = WeekdayProfile::from_records(&records).unwrap();
        let json = serde_json::to_string(&profile).unwrap();
        assert_eq!(
            json,
            r#"{"Sun":7,"Mon":1,"Tue":2,"Wed":3,"Thu":4,"Fri":5,"Sat":6}"#
        );
    }
}

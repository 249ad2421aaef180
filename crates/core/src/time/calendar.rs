use chrono::{Datelike, Days, NaiveDate, Weekday};

pub const DAYS_PER_WEEK: usize = 7;

pub const WEEKDAYS: [Weekday; DAYS_PER_WEEK] = [
    Weekday::Sun,
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
];

pub fn weekday_index(date: NaiveDate) -> usize {
    date.weekday().num_days_from_sunday() as usize
}

pub fn days_after(anchor: NaiveDate, count: u32) -> Option<Vec<NaiveDate>> {
    (1..=u64::from(count))
        .map(|i| anchor.checked_add_days(Days::new(i)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn weekday_index_starts_on_sunday() {
        // 2024-08-18 is a Sunday.
        assert_eq!(weekday_index(d(2024, 8, 18)), 0);
        assert_eq!(weekday_index(d(2024, 8, 19)), 1);
        assert_eq!(weekday_index(d(2024, 8, 24)), 6);
        for (i, wd) in WEEKDAYS.iter().enumerate() {
            assert_eq!(wd.num_days_from_sunday() as usize, i);
        }
    }

    #[test]
    fn days_after_crosses_month_and_leap_day() {
        let out = days_after(d(2024, 2, 27), 4).unwrap();
        assert_eq!(
            out,
            vec![d(2024, 2, 28), d(2024, 2, 29), d(2024, 3, 1), d(2024, 3, 2)]
        );
    }

    #[test]
    fn days_after_zero_is_empty() {
        assert_eq!(days_after(d(2024, 1, 1), 0), Some(vec![]));
    }

    #[test]
    fn days_after_fails_at_end_of_calendar() {
        assert_eq!(days_after(NaiveDate::MAX, 1), None);
    }
}

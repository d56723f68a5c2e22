use chrono::{Datelike, Duration, Local, NaiveDate, Weekday};

/// Display format used everywhere a date faces the user: `dd.MM.yyyy`.
pub const DATE_FMT: &str = "%d.%m.%Y";

/// Filename-safe variant of [`DATE_FMT`].
pub const FILE_DATE_FMT: &str = "%d_%m_%Y";

/// How many weekend days a `!newpoll next` poll offers.
pub const DEFAULT_WEEKEND_COUNT: usize = 10;

/// The next `count` Saturdays and Sundays strictly after `after`, ascending,
/// formatted as `dd.MM.yyyy`. Pure: the same input always yields the same
/// sequence, and month/year rollovers fall out of the date arithmetic.
pub fn upcoming_weekends(after: NaiveDate, count: usize) -> Vec<String> {
    (1i64..)
        .map(|offset| after + Duration::days(offset))
        .filter(|day| matches!(day.weekday(), Weekday::Sat | Weekday::Sun))
        .take(count)
        .map(|day| day.format(DATE_FMT).to_string())
        .collect()
}

/// [`upcoming_weekends`] anchored at today, with the default count.
pub fn next_weekends() -> Vec<String> {
    upcoming_weekends(Local::now().date_naive(), DEFAULT_WEEKEND_COUNT)
}

/// Parse a `dd.MM.yyyy` string back into a date. `None` for anything that
/// is not a date, e.g. the options of a free-form poll.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text, DATE_FMT).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn generates_the_requested_number_of_entries() {
        assert_eq!(upcoming_weekends(date(2024, 1, 1), 10).len(), 10);
        assert_eq!(upcoming_weekends(date(2024, 1, 1), 3).len(), 3);
    }

    #[test]
    fn entries_are_strictly_future_ascending_weekend_days() {
        let anchor = date(2024, 1, 6); // a Saturday
        let parsed: Vec<NaiveDate> = upcoming_weekends(anchor, 10)
            .iter()
            .map(|s| parse_date(s).unwrap())
            .collect();
        for day in &parsed {
            assert!(*day > anchor);
            assert!(matches!(day.weekday(), Weekday::Sat | Weekday::Sun));
        }
        for pair in parsed.windows(2) {
            assert!(pair[0] < pair[1]);
        }
        // The anchor Saturday itself is excluded; the next weekend day is
        // the following Sunday.
        assert_eq!(parsed[0], date(2024, 1, 7));
    }

    #[test]
    fn rolls_over_month_and_year_boundaries() {
        let days = upcoming_weekends(date(2023, 12, 29), 4);
        assert_eq!(days, vec!["30.12.2023", "31.12.2023", "06.01.2024", "07.01.2024"]);
    }

    #[test]
    fn is_restartable() {
        let anchor = date(2024, 5, 15);
        assert_eq!(
            upcoming_weekends(anchor, 10),
            upcoming_weekends(anchor, 10)
        );
    }

    #[test]
    fn parse_rejects_non_dates() {
        assert_eq!(parse_date("pizza"), None);
        assert_eq!(parse_date("2024-01-06"), None);
        assert_eq!(parse_date("06.01.2024"), Some(date(2024, 1, 6)));
    }
}

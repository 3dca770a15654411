//! Business-day arithmetic (Monday to Friday)

use chrono::{Datelike, NaiveDate, Weekday};

/// Whether the date falls on a Saturday or Sunday
pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Count the business days in `start..=end`.
///
/// Returns 0 when `end` precedes `start`.
pub fn business_days_inclusive(start: NaiveDate, end: NaiveDate) -> u32 {
    if end < start {
        return 0;
    }

    let total_days = (end - start).num_days() + 1;
    let full_weeks = total_days / 7;
    let remainder = total_days % 7;

    // Each full week contributes five business days; walk the leftover days
    let mut count = full_weeks * 5;
    let mut weekday = start.weekday();
    for _ in 0..remainder {
        if !matches!(weekday, Weekday::Sat | Weekday::Sun) {
            count += 1;
        }
        weekday = weekday.succ();
    }

    count as u32
}

/// The first business day strictly after `date`
pub fn next_business_day(date: NaiveDate) -> Option<NaiveDate> {
    let mut current = date.succ_opt()?;
    while is_weekend(current) {
        current = current.succ_opt()?;
    }
    Some(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[rstest]
    #[case("2024-05-09", "2024-05-09", 1)]
    #[case("2024-05-09", "2024-05-10", 2)]
    #[case("2024-05-09", "2024-05-13", 3)]
    #[case("2024-05-09", "2024-05-16", 6)]
    #[case("2024-05-09", "2024-06-06", 21)]
    #[case("2024-05-09", "2024-05-08", 0)]
    #[case("2024-05-11", "2024-05-12", 0)]
    fn test_business_days_inclusive(#[case] start: &str, #[case] end: &str, #[case] expected: u32) {
        assert_eq!(business_days_inclusive(date(start), date(end)), expected);
    }

    #[test]
    fn test_matches_day_by_day_count() {
        let start = date("2024-05-09");
        let mut end = start;
        let mut expected = 0;
        for _ in 0..400 {
            if !is_weekend(end) {
                expected += 1;
            }
            assert_eq!(business_days_inclusive(start, end), expected);
            end = end.succ_opt().unwrap();
        }
    }

    #[test]
    fn test_weekend_detection() {
        assert!(is_weekend(date("2024-05-11")));
        assert!(is_weekend(date("2024-05-12")));
        assert!(!is_weekend(date("2024-05-13")));
    }

    #[test]
    fn test_next_business_day() {
        assert_eq!(next_business_day(date("2024-05-10")), Some(date("2024-05-13")));
        assert_eq!(next_business_day(date("2024-05-11")), Some(date("2024-05-13")));
        assert_eq!(next_business_day(date("2024-05-13")), Some(date("2024-05-14")));
    }
}

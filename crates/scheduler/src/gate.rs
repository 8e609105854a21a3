//! Business-hours predicate for the task portal.

use chrono::{Datelike, NaiveDateTime, Timelike, Weekday};

use teamboard_core::config::BusinessHours;

/// Monday to Friday, `start_hour <= hour < end_hour`, in the caller's
/// local wall-clock time.
pub fn within_business_hours(hours: BusinessHours, at: NaiveDateTime) -> bool {
    if matches!(at.weekday(), Weekday::Sat | Weekday::Sun) {
        return false;
    }
    (hours.start_hour..hours.end_hour).contains(&at.hour())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn at(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
        // 2026-10-12 is a Monday.
        NaiveDate::from_ymd_opt(2026, 10, day)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    #[test]
    fn open_on_weekdays_between_eight_and_twenty() {
        let hours = BusinessHours::default();
        for day in 12..=16 {
            assert!(within_business_hours(hours, at(day, 8, 0)), "day {}", day);
            assert!(within_business_hours(hours, at(day, 19, 59)), "day {}", day);
        }
    }

    #[test]
    fn closed_at_the_edges_and_on_weekends() {
        let hours = BusinessHours::default();
        assert!(!within_business_hours(hours, at(14, 7, 59)));
        assert!(!within_business_hours(hours, at(14, 20, 0)));
        assert!(!within_business_hours(hours, at(17, 12, 0)));
        assert!(!within_business_hours(hours, at(18, 12, 0)));
    }

    #[test]
    fn custom_window() {
        let hours = BusinessHours { start_hour: 9, end_hour: 18 };
        assert!(!within_business_hours(hours, at(14, 8, 30)));
        assert!(within_business_hours(hours, at(14, 17, 30)));
    }
}

//! Decides whether a flight operates on a given calendar date.

use crate::models::flight::Recurrence;
use chrono::{Datelike, NaiveDate, Weekday};

fn is_weekend(day: Weekday) -> bool {
    matches!(day, Weekday::Sat | Weekday::Sun)
}

/// Evaluates a parsed recurrence rule against a date.
pub fn operates_on(rule: Recurrence, date: NaiveDate) -> bool {
    let day = date.weekday();
    match rule {
        Recurrence::Daily => true,
        Recurrence::Weekends => is_weekend(day),
        Recurrence::WeeklyAll => !is_weekend(day),
        Recurrence::Weekly(wanted) => day == wanted,
    }
}

/// Evaluates a stored recurrence string. Unrecognised rules are never
/// available.
pub fn is_available(rule: &str, date: NaiveDate) -> bool {
    match rule.parse::<Recurrence>() {
        Ok(rule) => operates_on(rule, date),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    // 2024-12-02 is a Monday
    fn week() -> impl Iterator<Item = NaiveDate> {
        (2..=8).map(|d| date(2024, 12, d))
    }

    #[test]
    fn daily_is_always_available() {
        assert!(week().all(|d| is_available("Daily", d)));
    }

    #[test]
    fn weekends_only_on_saturday_and_sunday() {
        for d in week() {
            let weekend = matches!(d.weekday(), Weekday::Sat | Weekday::Sun);
            assert_eq!(is_available("Weekends", d), weekend, "{}", d);
        }
        // leap day 2024-02-29 was a Thursday
        assert!(!is_available("Weekends", date(2024, 2, 29)));
    }

    #[test]
    fn weekly_all_covers_weekdays_only() {
        let open: Vec<_> = week().filter(|d| is_available("Weekly:All", *d)).collect();
        assert_eq!(open.len(), 5);
        assert!(!is_available("Weekly:All", date(2024, 12, 7)));
    }

    #[test]
    fn weekly_day_matches_that_day_only() {
        assert!(is_available("Weekly:Wednesday", date(2024, 12, 4)));
        assert!(!is_available("Weekly:Wednesday", date(2024, 12, 5)));
        assert!(is_available("Weekly:Sunday", date(2024, 12, 8)));
    }

    #[test]
    fn unknown_rules_fail_closed() {
        for rule in ["", "daily", "Weekly:", "Weekly:Funday", "Monthly", "Weekly:(Mon - Fri)"] {
            assert!(week().all(|d| !is_available(rule, d)), "{}", rule);
        }
    }
}

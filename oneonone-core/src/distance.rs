//! Human relative-time strings ("about 2 hours", "3 days ago").
//!
//! Thresholds follow the date-fns `formatDistance` table.

use chrono::{DateTime, Utc};

const MINUTES_IN_DAY: i64 = 1_440;
const MINUTES_IN_ALMOST_TWO_DAYS: i64 = 2_520;
const MINUTES_IN_MONTH: i64 = 43_200;
const MINUTES_IN_TWO_MONTHS: i64 = 86_400;

/// Distance between two instants, order-independent, without suffix.
pub fn format_distance(a: &DateTime<Utc>, b: &DateTime<Utc>) -> String {
    let seconds = (*b - *a).num_seconds().abs();
    let minutes = (seconds as f64 / 60.0).round() as i64;

    if minutes < 2 {
        return if minutes == 0 {
            "less than a minute".to_string()
        } else {
            "1 minute".to_string()
        };
    }

    if minutes < 45 {
        return format!("{} minutes", minutes);
    }

    if minutes < 90 {
        return "about 1 hour".to_string();
    }

    if minutes < MINUTES_IN_DAY {
        let hours = (minutes as f64 / 60.0).round() as i64;
        return format!("about {} hours", hours);
    }

    if minutes < MINUTES_IN_ALMOST_TWO_DAYS {
        return "1 day".to_string();
    }

    if minutes < MINUTES_IN_MONTH {
        let days = (minutes as f64 / MINUTES_IN_DAY as f64).round() as i64;
        return format!("{} days", days);
    }

    if minutes < MINUTES_IN_TWO_MONTHS {
        let months = (minutes as f64 / MINUTES_IN_MONTH as f64).round() as i64;
        return plural(months, "about 1 month", "about {} months");
    }

    let months = minutes / MINUTES_IN_MONTH;
    if months < 12 {
        let nearest = (minutes as f64 / MINUTES_IN_MONTH as f64).round() as i64;
        return plural(nearest, "1 month", "{} months");
    }

    let months_since_start_of_year = months % 12;
    let years = months / 12;

    if months_since_start_of_year < 3 {
        plural(years, "about 1 year", "about {} years")
    } else if months_since_start_of_year < 9 {
        plural(years, "over 1 year", "over {} years")
    } else {
        plural(years + 1, "almost 1 year", "almost {} years")
    }
}

/// Distance from `now` with a direction suffix: "in 2 days" or "2 days ago".
pub fn format_relative(instant: &DateTime<Utc>, now: &DateTime<Utc>) -> String {
    let distance = format_distance(instant, now);
    if instant > now {
        format!("in {}", distance)
    } else {
        format!("{} ago", distance)
    }
}

fn plural(n: i64, one: &str, many: &str) -> String {
    if n == 1 {
        one.to_string()
    } else {
        many.replace("{}", &n.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn base() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2023, 2, 10, 9, 0, 0).unwrap()
    }

    fn after(d: Duration) -> String {
        format_distance(&base(), &(base() + d))
    }

    #[test]
    fn minutes() {
        assert_eq!(after(Duration::seconds(20)), "less than a minute");
        assert_eq!(after(Duration::seconds(70)), "1 minute");
        assert_eq!(after(Duration::minutes(5)), "5 minutes");
        assert_eq!(after(Duration::minutes(44)), "44 minutes");
    }

    #[test]
    fn hours() {
        assert_eq!(after(Duration::minutes(45)), "about 1 hour");
        assert_eq!(after(Duration::minutes(89)), "about 1 hour");
        assert_eq!(after(Duration::minutes(90)), "about 2 hours");
        assert_eq!(after(Duration::hours(23)), "about 23 hours");
    }

    #[test]
    fn days() {
        assert_eq!(after(Duration::hours(24)), "1 day");
        assert_eq!(after(Duration::hours(41)), "1 day");
        assert_eq!(after(Duration::hours(42)), "2 days");
        assert_eq!(after(Duration::days(10)), "10 days");
        assert_eq!(after(Duration::days(29)), "29 days");
    }

    #[test]
    fn months() {
        assert_eq!(after(Duration::days(30)), "about 1 month");
        assert_eq!(after(Duration::days(45)), "about 2 months");
        assert_eq!(after(Duration::days(60)), "2 months");
        assert_eq!(after(Duration::days(200)), "7 months");
    }

    #[test]
    fn years() {
        assert_eq!(after(Duration::days(365)), "about 1 year");
        assert_eq!(after(Duration::days(365 + 150)), "over 1 year");
        assert_eq!(after(Duration::days(365 + 300)), "almost 2 years");
        assert_eq!(after(Duration::days(3 * 365 + 20)), "about 3 years");
    }

    #[test]
    fn order_independent() {
        let later = base() + Duration::days(3);
        assert_eq!(format_distance(&later, &base()), format_distance(&base(), &later));
    }

    #[test]
    fn relative_suffix() {
        let now = base();
        assert_eq!(format_relative(&(now + Duration::days(3)), &now), "in 3 days");
        assert_eq!(format_relative(&(now - Duration::minutes(5)), &now), "5 minutes ago");
    }
}

use chrono::{DateTime, Datelike, Duration, NaiveTime, TimeZone, Utc};
use serde::Serialize;

/// Request metadata captured with a public menu view
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MenuViewContext {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub referer: Option<String>,
}

/// View counters for one restaurant
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct MenuViewStats {
    pub total_views: i64,
    pub views_today: i64,
    pub views_this_week: i64,
    pub views_this_month: i64,
}

/// Start instants of the reporting windows, all in UTC
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodStarts {
    pub today: DateTime<Utc>,
    /// Monday of the current week
    pub week: DateTime<Utc>,
    pub month: DateTime<Utc>,
}

impl PeriodStarts {
    pub fn at(now: DateTime<Utc>) -> Self {
        let date = now.date_naive();
        let week_date = date - Duration::days(i64::from(date.weekday().num_days_from_monday()));
        let month_date = date - Duration::days(i64::from(date.day0()));

        let midnight = |d: chrono::NaiveDate| Utc.from_utc_datetime(&d.and_time(NaiveTime::default()));

        Self {
            today: midnight(date),
            week: midnight(week_date),
            month: midnight(month_date),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    #[test]
    fn test_period_starts_midweek() {
        // Thursday
        let starts = PeriodStarts::at(utc(2026, 10, 15, 17, 42));
        assert_eq!(starts.today, utc(2026, 10, 15, 0, 0));
        assert_eq!(starts.week, utc(2026, 10, 12, 0, 0));
        assert_eq!(starts.month, utc(2026, 10, 1, 0, 0));
    }

    #[test]
    fn test_period_starts_sunday_belongs_to_previous_monday() {
        let starts = PeriodStarts::at(utc(2026, 10, 18, 9, 0));
        assert_eq!(starts.week, utc(2026, 10, 12, 0, 0));
    }

    #[test]
    fn test_period_starts_week_crossing_month() {
        // Saturday 1st: week started in the previous month
        let starts = PeriodStarts::at(utc(2026, 8, 1, 12, 0));
        assert_eq!(starts.week, utc(2026, 7, 27, 0, 0));
        assert_eq!(starts.month, utc(2026, 8, 1, 0, 0));
        assert!(starts.week < starts.month);
    }
}

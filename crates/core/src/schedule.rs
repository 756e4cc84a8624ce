//! Pure schedule math for the slot generator.
//!
//! Everything here is deterministic and side-effect free so the
//! window-walking rules (weekday numbering, weekend skipping, the
//! `[tomorrow, tomorrow + 7*weeks)` bounds) can be unit tested without
//! a database.

use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc, Weekday};

use crate::error::CoreError;
use crate::types::Timestamp;

/// Smallest schedule extension, in weeks.
pub const MIN_WEEKS: u8 = 1;

/// Largest schedule extension, in weeks.
pub const MAX_WEEKS: u8 = 4;

/// Clamp a requested extension length to the allowed `[1, 4]` range.
pub fn clamp_weeks(weeks: i64) -> u8 {
    if weeks < MIN_WEEKS as i64 || weeks > MAX_WEEKS as i64 {
        MIN_WEEKS
    } else {
        weeks as u8
    }
}

/// Day-of-week numbering used by schedule templates: Monday = 1 through
/// Sunday = 7. Templates themselves are restricted to 1-5 at the input
/// layer; 6 and 7 exist only so dates can be compared against them.
pub fn weekday_number(date: NaiveDate) -> u8 {
    date.weekday().number_from_monday() as u8
}

/// Whether a date falls on Saturday or Sunday. Weekend dates are never
/// instantiated regardless of template contents.
pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// A validated `"HH:MM"` template start time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemplateTime {
    pub hour: u8,
    pub minute: u8,
}

impl TemplateTime {
    /// Parse a `"HH:MM"` string, rejecting anything that is not a
    /// well-formed 24-hour wall-clock time.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        let invalid = || CoreError::Validation(format!("Invalid template time '{s}', expected HH:MM"));

        let (h, m) = s.split_once(':').ok_or_else(invalid)?;
        if h.len() != 2 || m.len() != 2 {
            return Err(invalid());
        }
        let hour: u8 = h.parse().map_err(|_| invalid())?;
        let minute: u8 = m.parse().map_err(|_| invalid())?;
        if hour > 23 || minute > 59 {
            return Err(invalid());
        }
        Ok(Self { hour, minute })
    }

    /// Place this wall-clock time on a calendar date, in UTC.
    pub fn on_date(self, date: NaiveDate) -> Timestamp {
        let naive = date
            .and_hms_opt(self.hour as u32, self.minute as u32, 0)
            .expect("validated HH:MM is always a valid time");
        Utc.from_utc_datetime(&naive)
    }
}

/// The half-open generation window `[tomorrow, tomorrow + 7*weeks)`,
/// anchored at UTC midnight of the day after `now`.
#[derive(Debug, Clone, Copy)]
pub struct GenerationWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl GenerationWindow {
    pub fn starting_tomorrow(now: DateTime<Utc>, weeks: u8) -> Self {
        let start = now.date_naive() + Duration::days(1);
        let end = start + Duration::days(7 * weeks as i64);
        Self { start, end }
    }

    /// Iterate the weekday (Mon-Fri) dates inside the window.
    pub fn weekdays(self) -> impl Iterator<Item = NaiveDate> {
        self.start
            .iter_days()
            .take_while(move |d| *d < self.end)
            .filter(|d| !is_weekend(*d))
    }
}

/// Compute a slot's `[start, end)` bounds from its date, template time
/// and the owning activity's duration in minutes.
pub fn slot_bounds(
    date: NaiveDate,
    time: TemplateTime,
    duration_minutes: i32,
) -> (Timestamp, Timestamp) {
    let start = time.on_date(date);
    (start, start + Duration::minutes(duration_minutes as i64))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn clamp_weeks_bounds() {
        assert_eq!(clamp_weeks(0), 1);
        assert_eq!(clamp_weeks(-3), 1);
        assert_eq!(clamp_weeks(1), 1);
        assert_eq!(clamp_weeks(4), 4);
        assert_eq!(clamp_weeks(5), 1);
    }

    #[test]
    fn weekday_numbering_is_monday_based() {
        // 2025-06-02 is a Monday.
        assert_eq!(weekday_number(date(2025, 6, 2)), 1);
        assert_eq!(weekday_number(date(2025, 6, 6)), 5);
        assert_eq!(weekday_number(date(2025, 6, 8)), 7);
    }

    #[test]
    fn parse_template_time() {
        let t = TemplateTime::parse("17:00").unwrap();
        assert_eq!((t.hour, t.minute), (17, 0));
        assert_eq!(TemplateTime::parse("09:45").unwrap().minute, 45);

        assert!(TemplateTime::parse("24:00").is_err());
        assert!(TemplateTime::parse("12:60").is_err());
        assert!(TemplateTime::parse("9:00").is_err());
        assert!(TemplateTime::parse("12-30").is_err());
        assert!(TemplateTime::parse("").is_err());
    }

    #[test]
    fn window_starts_tomorrow_and_skips_weekends() {
        // Friday 2025-06-06 12:00 UTC -> window starts Saturday 06-07.
        let now = Utc.with_ymd_and_hms(2025, 6, 6, 12, 0, 0).unwrap();
        let window = GenerationWindow::starting_tomorrow(now, 1);
        assert_eq!(window.start, date(2025, 6, 7));
        assert_eq!(window.end, date(2025, 6, 14));

        let days: Vec<_> = window.weekdays().collect();
        // Sat 7th and Sun 8th skipped, Sat 14th excluded by the bound.
        assert_eq!(
            days,
            vec![
                date(2025, 6, 9),
                date(2025, 6, 10),
                date(2025, 6, 11),
                date(2025, 6, 12),
                date(2025, 6, 13),
            ]
        );
    }

    #[test]
    fn window_length_scales_with_weeks() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
        let window = GenerationWindow::starting_tomorrow(now, 4);
        assert_eq!(window.weekdays().count(), 20);
    }

    #[test]
    fn slot_bounds_add_duration() {
        let t = TemplateTime::parse("17:00").unwrap();
        let (start, end) = slot_bounds(date(2025, 6, 2), t, 60);
        assert_eq!(start, Utc.with_ymd_and_hms(2025, 6, 2, 17, 0, 0).unwrap());
        assert_eq!(end, Utc.with_ymd_and_hms(2025, 6, 2, 18, 0, 0).unwrap());
    }
}

//! Calendar-accurate elapsed-time computation.
//!
//! Ages must reflect whether the birthday has already occurred in the
//! reference year, so the difference is taken component by component with
//! borrows propagated the way a manual calendar subtraction would, rather
//! than dividing a duration by 365 days.

use chrono::{DateTime, Datelike, NaiveDate, Timelike, Utc};

/// Component-wise difference between two instants.
///
/// All components are non-negative once normalized; `days` borrows are worth
/// the length of the earlier instant's month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarDiff {
    /// Whole years elapsed.
    pub years: i64,
    /// Months on top of `years`.
    pub months: i64,
    /// Days on top of `months`.
    pub days: i64,
    /// Hours on top of `days`.
    pub hours: i64,
    /// Minutes on top of `hours`.
    pub minutes: i64,
    /// Seconds on top of `minutes`.
    pub seconds: i64,
}

fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|first_of_next| first_of_next.pred_opt())
        .map_or(31, |last_of_this| last_of_this.day())
}

/// Calendar difference between two UTC instants, ignoring argument order.
///
/// # Examples
/// ```
/// use backend::domain::calendar_diff;
/// use chrono::{TimeZone, Utc};
///
/// let born = Utc.with_ymd_and_hms(1986, 7, 12, 0, 0, 0).unwrap();
/// let reference = Utc.with_ymd_and_hms(2017, 7, 11, 0, 0, 0).unwrap();
/// assert_eq!(calendar_diff(born, reference).years, 30);
/// ```
pub fn calendar_diff(a: DateTime<Utc>, b: DateTime<Utc>) -> CalendarDiff {
    let (from, to) = if a <= b { (a, b) } else { (b, a) };

    let mut years = i64::from(to.year()) - i64::from(from.year());
    let mut months = i64::from(to.month()) - i64::from(from.month());
    let mut days = i64::from(to.day()) - i64::from(from.day());
    let mut hours = i64::from(to.hour()) - i64::from(from.hour());
    let mut minutes = i64::from(to.minute()) - i64::from(from.minute());
    let mut seconds = i64::from(to.second()) - i64::from(from.second());

    if seconds < 0 {
        seconds += 60;
        minutes -= 1;
    }
    if minutes < 0 {
        minutes += 60;
        hours -= 1;
    }
    if hours < 0 {
        hours += 24;
        days -= 1;
    }
    if days < 0 {
        days += i64::from(days_in_month(from.year(), from.month()));
        months -= 1;
    }
    if months < 0 {
        months += 12;
        years -= 1;
    }

    CalendarDiff {
        years,
        months,
        days,
        hours,
        minutes,
        seconds,
    }
}

/// Whole calendar years between a birth instant and a reference instant.
pub fn age_in_years(birth: DateTime<Utc>, reference: DateTime<Utc>) -> i64 {
    calendar_diff(birth, reference).years
}

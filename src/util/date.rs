use chrono::{Datelike, Duration, Local, NaiveDate, TimeZone, Weekday};

use crate::model::Timestamp;

/// Current instant in epoch milliseconds.
pub fn now_ms() -> Timestamp {
    Local::now().timestamp_millis()
}

/// Today's local calendar date.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// The local calendar day containing an epoch-millisecond instant.
/// None when the value is outside the representable range.
pub fn local_day(ms: Timestamp) -> Option<NaiveDate> {
    Local
        .timestamp_millis_opt(ms)
        .single()
        .map(|dt| dt.date_naive())
}

/// ISO `YYYY-MM-DD` form of a date.
pub fn iso_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// The upcoming Monday strictly after `today`; a Monday maps a week out.
pub fn upcoming_monday(today: NaiveDate) -> NaiveDate {
    let ahead = 7 - i64::from(today.weekday().num_days_from_monday());
    today + Duration::days(ahead)
}

/// The Sunday that begins the week containing `date`.
pub fn week_start_sunday(date: NaiveDate) -> NaiveDate {
    date.week(Weekday::Sun).first_day()
}

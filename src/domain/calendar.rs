//! Business-day calendar arithmetic.
//!
//! Weekend-skipping only; exchange holidays are not modeled. Exit expiries
//! are scheduled with [`add_business_days`], so a holding period always lands
//! on a weekday even though the underlying series may still skip that date
//! (a holiday), which is why the engine compares expiry dates against bar
//! dates rather than counting bars.

use chrono::{Datelike, Days, NaiveDate, Weekday};

pub fn is_business_day(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// `date` advanced by `n` business days, skipping Saturdays and Sundays.
///
/// Matches pandas' `BDay(n)` offset for weekday anchors: a Friday plus one
/// business day is the following Monday.
pub fn add_business_days(date: NaiveDate, n: u32) -> NaiveDate {
    let mut current = date;
    for _ in 0..n {
        current = current + Days::new(1);
        while !is_business_day(current) {
            current = current + Days::new(1);
        }
    }
    current
}

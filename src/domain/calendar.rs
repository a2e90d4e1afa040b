//! US equity market trading calendar.
//!
//! A day is a non-trading day when it falls on a weekend or on one of the
//! eight fixed-rule market holidays. New Year's Day, Independence Day and
//! Christmas that land on a weekend mark both the preceding Friday and the
//! following Monday, so either observed date reports as closed. A fixed
//! holiday on a weekday closes only that day; the surrounding Friday or
//! Monday is not widened into the holiday.

use chrono::{Datelike, Duration, NaiveDate, Weekday};

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

pub fn is_trading_day(date: NaiveDate) -> bool {
    !is_weekend(date) && !is_market_holiday(date)
}

/// A New Year's Day on Saturday is observed on 31 December of the prior
/// year, so both the date's own year and the next one are consulted.
pub fn is_market_holiday(date: NaiveDate) -> bool {
    let year = date.year();
    market_holidays(year).contains(&date) || market_holidays(year + 1).contains(&date)
}

/// All holiday dates generated by the rules for `year`, sorted. May include
/// 31 December of `year - 1` when New Year's Day falls on a Saturday.
pub fn market_holidays(year: i32) -> Vec<NaiveDate> {
    let mut days = Vec::with_capacity(16);

    for (month, day) in [(1, 1), (7, 4), (12, 25)] {
        if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
            push_with_observed(&mut days, date);
        }
    }

    let nth = [
        (1, Weekday::Mon, 3),
        (2, Weekday::Mon, 3),
        (9, Weekday::Mon, 1),
        (11, Weekday::Thu, 4),
    ];
    for (month, weekday, n) in nth {
        if let Some(date) = NaiveDate::from_weekday_of_month_opt(year, month, weekday, n) {
            days.push(date);
        }
    }

    if let Some(date) = last_weekday_of_month(year, 5, Weekday::Mon) {
        days.push(date);
    }

    days.sort();
    days.dedup();
    days
}

fn push_with_observed(days: &mut Vec<NaiveDate>, date: NaiveDate) {
    days.push(date);
    match date.weekday() {
        Weekday::Sat => {
            days.push(date - Duration::days(1));
            days.push(date + Duration::days(2));
        }
        Weekday::Sun => {
            days.push(date - Duration::days(2));
            days.push(date + Duration::days(1));
        }
        _ => {}
    }
}

fn last_weekday_of_month(year: i32, month: u32, weekday: Weekday) -> Option<NaiveDate> {
    let first_of_next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    let mut date = first_of_next.pred_opt()?;
    while date.weekday() != weekday {
        date = date.pred_opt()?;
    }
    Some(date)
}

//! Chart bucket granularity and per-period date arithmetic.

use chrono::{Datelike, Duration, Months, NaiveDate, Weekday};
use std::fmt;

use super::error::StockfolioError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Granularity {
    Day,
    Week,
    Month,
    Quarter,
    Year,
}

impl Granularity {
    /// Picks the bucket size from the day span `end - start`, which must be
    /// strictly positive.
    pub fn for_span(start: NaiveDate, end: NaiveDate) -> Result<Self, StockfolioError> {
        let days = (end - start).num_days();
        if days <= 0 {
            return Err(StockfolioError::InvalidDateRange { start, end });
        }
        Ok(match days {
            d if d < 30 => Granularity::Day,
            d if d <= 60 => Granularity::Week,
            d if d <= 360 => Granularity::Month,
            d if d <= 3600 => Granularity::Quarter,
            _ => Granularity::Year,
        })
    }

    /// The date one step after `date`. Month-based steps clamp to the last
    /// valid day of the target month.
    pub fn advance(self, date: NaiveDate) -> Option<NaiveDate> {
        match self {
            Granularity::Day => date.succ_opt(),
            Granularity::Week => date.checked_add_signed(Duration::days(7)),
            Granularity::Month => date.checked_add_months(Months::new(1)),
            Granularity::Quarter => date.checked_add_months(Months::new(3)),
            Granularity::Year => date.checked_add_months(Months::new(12)),
        }
    }

    /// Last date of the period containing `date`. Weeks close on Friday.
    pub fn period_end(self, date: NaiveDate) -> NaiveDate {
        match self {
            Granularity::Day => date,
            Granularity::Week => {
                let ahead = (Weekday::Fri.num_days_from_monday() + 7
                    - date.weekday().num_days_from_monday())
                    % 7;
                date + Duration::days(ahead as i64)
            }
            Granularity::Month => last_day_of_month(date.year(), date.month()),
            Granularity::Quarter => {
                let quarter_end_month = ((date.month() - 1) / 3 + 1) * 3;
                last_day_of_month(date.year(), quarter_end_month)
            }
            Granularity::Year => last_day_of_month(date.year(), 12),
        }
    }

    /// First cursor of a period walk beginning at `start`.
    pub fn walk_start(self, start: NaiveDate) -> NaiveDate {
        match self {
            Granularity::Day => start,
            Granularity::Week => match start.weekday() {
                Weekday::Sat => start - Duration::days(1),
                Weekday::Sun => start - Duration::days(2),
                _ => start,
            },
            Granularity::Month | Granularity::Quarter => start.with_day(1).unwrap_or(start),
            Granularity::Year => start.with_ordinal(1).unwrap_or(start),
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Granularity::Day => "day",
            Granularity::Week => "week",
            Granularity::Month => "month",
            Granularity::Quarter => "quarter",
            Granularity::Year => "year",
        };
        f.write_str(name)
    }
}

fn last_day_of_month(year: i32, month: u32) -> NaiveDate {
    let first_of_next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    first_of_next
        .and_then(|d| d.pred_opt())
        .unwrap_or(NaiveDate::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn span_thresholds() {
        let start = d(2024, 1, 1);
        let after = |days: i64| start + Duration::days(days);
        assert_eq!(Granularity::for_span(start, after(4)).unwrap(), Granularity::Day);
        assert_eq!(Granularity::for_span(start, after(29)).unwrap(), Granularity::Day);
        assert_eq!(Granularity::for_span(start, after(30)).unwrap(), Granularity::Week);
        assert_eq!(Granularity::for_span(start, after(60)).unwrap(), Granularity::Week);
        assert_eq!(Granularity::for_span(start, after(61)).unwrap(), Granularity::Month);
        assert_eq!(Granularity::for_span(start, after(360)).unwrap(), Granularity::Month);
        assert_eq!(Granularity::for_span(start, after(361)).unwrap(), Granularity::Quarter);
        assert_eq!(Granularity::for_span(start, after(3600)).unwrap(), Granularity::Quarter);
        assert_eq!(Granularity::for_span(start, after(3601)).unwrap(), Granularity::Year);
    }

    #[test]
    fn span_must_be_positive() {
        let start = d(2024, 1, 10);
        assert!(matches!(
            Granularity::for_span(start, start),
            Err(StockfolioError::InvalidDateRange { .. })
        ));
        assert!(Granularity::for_span(start, d(2024, 1, 9)).is_err());
    }

    #[test]
    fn week_ends_on_friday() {
        // 2024-05-01 is a Wednesday.
        assert_eq!(Granularity::Week.period_end(d(2024, 5, 1)), d(2024, 5, 3));
        assert_eq!(Granularity::Week.period_end(d(2024, 5, 3)), d(2024, 5, 3));
        assert_eq!(Granularity::Week.period_end(d(2024, 5, 4)), d(2024, 5, 10));
    }

    #[test]
    fn month_quarter_year_ends() {
        assert_eq!(Granularity::Month.period_end(d(2024, 2, 10)), d(2024, 2, 29));
        assert_eq!(Granularity::Quarter.period_end(d(2024, 2, 10)), d(2024, 3, 31));
        assert_eq!(Granularity::Quarter.period_end(d(2024, 11, 1)), d(2024, 12, 31));
        assert_eq!(Granularity::Year.period_end(d(2024, 6, 1)), d(2024, 12, 31));
    }

    #[test]
    fn advance_steps() {
        assert_eq!(Granularity::Day.advance(d(2024, 2, 28)), Some(d(2024, 2, 29)));
        assert_eq!(Granularity::Week.advance(d(2024, 2, 28)), Some(d(2024, 3, 6)));
        assert_eq!(Granularity::Month.advance(d(2024, 1, 31)), Some(d(2024, 2, 29)));
        assert_eq!(Granularity::Quarter.advance(d(2024, 1, 15)), Some(d(2024, 4, 15)));
        assert_eq!(Granularity::Year.advance(d(2024, 2, 29)), Some(d(2025, 2, 28)));
    }

    #[test]
    fn walk_start_snaps_back() {
        assert_eq!(Granularity::Week.walk_start(d(2024, 5, 4)), d(2024, 5, 3));
        assert_eq!(Granularity::Week.walk_start(d(2024, 5, 5)), d(2024, 5, 3));
        assert_eq!(Granularity::Week.walk_start(d(2024, 5, 6)), d(2024, 5, 6));
        assert_eq!(Granularity::Month.walk_start(d(2024, 5, 17)), d(2024, 5, 1));
        assert_eq!(Granularity::Year.walk_start(d(2024, 5, 17)), d(2024, 1, 1));
    }

    #[test]
    fn display_names() {
        assert_eq!(Granularity::Day.to_string(), "day");
        assert_eq!(Granularity::Quarter.to_string(), "quarter");
    }
}

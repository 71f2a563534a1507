//! Period resolution: turns a named relative period or an explicit date pair
//! into a closed calendar date range plus the label shown on the widget.

use chrono::{Duration, Local, NaiveDate};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Raised when an explicit range starts after it ends.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("Start date {start} must be on or before end date {end}")]
pub struct InvalidRangeError {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown period '{0}'")]
pub struct UnknownPeriod(pub String);

/// A relative period ending today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NamedPeriod {
    /// 오늘
    Today,
    /// 최근 7일
    Last7Days,
    /// 최근 30일
    Last30Days,
}

impl NamedPeriod {
    pub const ALL: [NamedPeriod; 3] = [
        NamedPeriod::Today,
        NamedPeriod::Last7Days,
        NamedPeriod::Last30Days,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            NamedPeriod::Today => "오늘",
            NamedPeriod::Last7Days => "최근 7일",
            NamedPeriod::Last30Days => "최근 30일",
        }
    }

    /// Number of calendar days covered, today included.
    pub fn days(&self) -> i64 {
        match self {
            NamedPeriod::Today => 1,
            NamedPeriod::Last7Days => 7,
            NamedPeriod::Last30Days => 30,
        }
    }
}

impl fmt::Display for NamedPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for NamedPeriod {
    type Err = UnknownPeriod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NamedPeriod::ALL
            .into_iter()
            .find(|period| period.name() == s.trim())
            .ok_or_else(|| UnknownPeriod(s.to_string()))
    }
}

/// An inclusive range of calendar dates. `start <= end` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, InvalidRangeError> {
        if start > end {
            return Err(InvalidRangeError { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn single(date: NaiveDate) -> Self {
        Self {
            start: date,
            end: date,
        }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Number of days in the range, both ends included.
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    pub fn is_single_day(&self) -> bool {
        self.start == self.end
    }

    pub fn iter_days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        self.start.iter_days().take_while(move |day| *day <= end)
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_single_day() {
            write!(f, "{}", self.start.format("%Y-%m-%d"))
        } else {
            write!(
                f,
                "{} ~ {}",
                self.start.format("%Y-%m-%d"),
                self.end.format("%Y-%m-%d")
            )
        }
    }
}

/// A concrete range together with its display label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPeriod {
    pub range: DateRange,
    pub label: String,
}

/// What the user picked in the period selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodSelection {
    Named(NamedPeriod),
    Explicit { start: NaiveDate, end: NaiveDate },
}

/// Anything that can be resolved into a [`ResolvedPeriod`] relative to a given day.
///
/// `today` is injected so resolution stays a pure function; use
/// [`DatePeriod::resolve_today`] to resolve against the local calendar date.
pub trait DatePeriod: Sized {
    fn resolve(self, today: NaiveDate) -> Result<ResolvedPeriod, InvalidRangeError>;

    fn resolve_today(self) -> Result<ResolvedPeriod, InvalidRangeError> {
        self.resolve(local_today())
    }
}

impl DatePeriod for NamedPeriod {
    fn resolve(self, today: NaiveDate) -> Result<ResolvedPeriod, InvalidRangeError> {
        let start = today - Duration::days(self.days() - 1);
        Ok(ResolvedPeriod {
            range: DateRange::new(start, today)?,
            label: self.name().to_string(),
        })
    }
}

impl DatePeriod for (NaiveDate, NaiveDate) {
    fn resolve(self, _today: NaiveDate) -> Result<ResolvedPeriod, InvalidRangeError> {
        let range = DateRange::new(self.0, self.1)?;
        Ok(ResolvedPeriod {
            label: range.to_string(),
            range,
        })
    }
}

impl DatePeriod for PeriodSelection {
    fn resolve(self, today: NaiveDate) -> Result<ResolvedPeriod, InvalidRangeError> {
        match self {
            PeriodSelection::Named(period) => period.resolve(today),
            PeriodSelection::Explicit { start, end } => (start, end).resolve(today),
        }
    }
}

/// The local calendar date. Time of day never enters the arithmetic.
pub fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_today_is_single_day() {
        let today = day(2024, 3, 10);
        let resolved = "오늘".parse::<NamedPeriod>().unwrap().resolve(today).unwrap();
        assert_eq!(resolved.range.start(), today);
        assert_eq!(resolved.range.end(), today);
        assert_eq!(resolved.label, "오늘");
    }

    #[test]
    fn test_named_periods_cover_exact_day_counts() {
        let today = day(2024, 3, 10);
        let week = NamedPeriod::Last7Days.resolve(today).unwrap();
        assert_eq!(week.range.start(), day(2024, 3, 4));
        assert_eq!(week.range.days(), 7);
        assert_eq!(week.range.iter_days().count(), 7);

        let month = "최근 30일"
            .parse::<NamedPeriod>()
            .unwrap()
            .resolve(today)
            .unwrap();
        assert_eq!(month.range.start(), day(2024, 2, 10));
        assert_eq!(month.range.end(), today);
        assert_eq!(month.range.days(), 30);
    }

    #[test]
    fn test_named_period_across_dst_and_year_boundary() {
        // 2024-03-31 is a DST switch in much of Europe; only calendar days matter here.
        let week = NamedPeriod::Last7Days.resolve(day(2024, 3, 31)).unwrap();
        assert_eq!(week.range.start(), day(2024, 3, 25));

        let month = NamedPeriod::Last30Days.resolve(day(2024, 1, 5)).unwrap();
        assert_eq!(month.range.start(), day(2023, 12, 7));
        assert_eq!(month.range.days(), 30);
    }

    #[test]
    fn test_explicit_range_labels() {
        let today = day(2024, 3, 10);
        let single = (day(2024, 1, 1), day(2024, 1, 1)).resolve(today).unwrap();
        assert_eq!(single.label, "2024-01-01");

        let span = PeriodSelection::Explicit {
            start: day(2023, 10, 1),
            end: day(2023, 10, 31),
        }
        .resolve(today)
        .unwrap();
        assert_eq!(span.label, "2023-10-01 ~ 2023-10-31");
        assert_eq!(span.range.days(), 31);
    }

    #[test]
    fn test_explicit_range_rejects_inverted_dates() {
        let err = (day(2024, 1, 2), day(2024, 1, 1))
            .resolve(day(2024, 3, 10))
            .unwrap_err();
        assert_eq!(
            err,
            InvalidRangeError {
                start: day(2024, 1, 2),
                end: day(2024, 1, 1)
            }
        );
    }
}

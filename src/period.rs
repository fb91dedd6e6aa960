//! Named time-span algebra with a total order and a `FOREVER` maximum.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{RetentionError, Result};

const HOUR_SECS: i64 = 3600;
const DAY_SECS: i64 = 24 * HOUR_SECS;

/// A named retention span.
///
/// Every variant but [`Period::Forever`] has a fixed, comparable duration.
/// `Forever` has no finite duration and compares strictly greater than every
/// other period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Period {
    Day,
    Week,
    Month,
    ThreeMonths,
    SixMonths,
    Year,
    TwoYears,
    ThreeYears,
    FourYears,
    FiveYears,
    Forever,
}

impl Period {
    /// Canonical duration in seconds, or `None` for [`Period::Forever`].
    pub fn duration_secs(self) -> Option<i64> {
        match self {
            Period::Day => Some(DAY_SECS),
            Period::Week => Some(7 * DAY_SECS),
            Period::Month => Some(30 * DAY_SECS),
            Period::ThreeMonths => Some(90 * DAY_SECS),
            Period::SixMonths => Some(180 * DAY_SECS),
            Period::Year => Some(365 * DAY_SECS),
            Period::TwoYears => Some(2 * 365 * DAY_SECS),
            Period::ThreeYears => Some(3 * 365 * DAY_SECS),
            Period::FourYears => Some(4 * 365 * DAY_SECS),
            Period::FiveYears => Some(5 * 365 * DAY_SECS),
            Period::Forever => None,
        }
    }

    /// `chrono::Duration` form of [`Period::duration_secs`].
    pub fn duration(self) -> Option<chrono::Duration> {
        self.duration_secs().map(chrono::Duration::seconds)
    }

    /// Total-order comparison. Equal periods compare equal; `Forever` is
    /// strictly greater than every other period; otherwise periods compare
    /// by their canonical duration.
    pub fn compare(self, other: Period) -> Ordering {
        match (self, other) {
            (Period::Forever, Period::Forever) => Ordering::Equal,
            (Period::Forever, _) => Ordering::Greater,
            (_, Period::Forever) => Ordering::Less,
            (a, b) => a.duration_secs().unwrap().cmp(&b.duration_secs().unwrap()),
        }
    }

    /// Parse the canonical wire string for a period.
    pub fn parse(s: &str) -> Result<Period> {
        match s {
            "DAY" => Ok(Period::Day),
            "WEEK" => Ok(Period::Week),
            "MONTH" => Ok(Period::Month),
            "3_MONTH" => Ok(Period::ThreeMonths),
            "6_MONTH" => Ok(Period::SixMonths),
            "YEAR" => Ok(Period::Year),
            "2_YEARS" => Ok(Period::TwoYears),
            "3_YEARS" => Ok(Period::ThreeYears),
            "4_YEARS" => Ok(Period::FourYears),
            "5_YEARS" => Ok(Period::FiveYears),
            "FOREVER" => Ok(Period::Forever),
            other => Err(RetentionError::InvalidPeriod(other.to_string())),
        }
    }

    /// Canonical wire string for a period.
    pub fn as_str(self) -> &'static str {
        match self {
            Period::Day => "DAY",
            Period::Week => "WEEK",
            Period::Month => "MONTH",
            Period::ThreeMonths => "3_MONTH",
            Period::SixMonths => "6_MONTH",
            Period::Year => "YEAR",
            Period::TwoYears => "2_YEARS",
            Period::ThreeYears => "3_YEARS",
            Period::FourYears => "4_YEARS",
            Period::FiveYears => "5_YEARS",
            Period::Forever => "FOREVER",
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl PartialOrd for Period {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.compare(*other))
    }
}

impl Ord for Period {
    fn cmp(&self, other: &Self) -> Ordering {
        self.compare(*other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forever_is_strictly_greatest() {
        for p in [
            Period::Day,
            Period::Week,
            Period::Month,
            Period::ThreeMonths,
            Period::SixMonths,
            Period::Year,
            Period::TwoYears,
            Period::ThreeYears,
            Period::FourYears,
            Period::FiveYears,
        ] {
            assert_eq!(p.compare(Period::Forever), Ordering::Less);
            assert_eq!(Period::Forever.compare(p), Ordering::Greater);
        }
        assert_eq!(Period::Forever.compare(Period::Forever), Ordering::Equal);
    }

    #[test]
    fn total_order_by_duration() {
        assert_eq!(Period::Day.compare(Period::Week), Ordering::Less);
        assert_eq!(Period::Year.compare(Period::SixMonths), Ordering::Greater);
        assert_eq!(Period::Month.compare(Period::Month), Ordering::Equal);
        assert_eq!(Period::FiveYears.compare(Period::FourYears), Ordering::Greater);
    }

    #[test]
    fn parse_round_trips_canonical_strings() {
        for s in [
            "DAY", "WEEK", "MONTH", "3_MONTH", "6_MONTH", "YEAR", "2_YEARS", "3_YEARS",
            "4_YEARS", "5_YEARS", "FOREVER",
        ] {
            let p = Period::parse(s).unwrap();
            assert_eq!(p.as_str(), s);
        }
    }

    #[test]
    fn unknown_period_is_hard_error() {
        assert!(Period::parse("FORTNIGHT").is_err());
        assert!(Period::parse("").is_err());
    }

    #[test]
    fn ord_trait_matches_compare() {
        let mut periods = vec![Period::Forever, Period::Day, Period::Year, Period::Week];
        periods.sort();
        assert_eq!(
            periods,
            vec![Period::Day, Period::Week, Period::Year, Period::Forever]
        );
    }
}

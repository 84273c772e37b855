//! Reporting periods and fiscal-year bucketing.
//!
//! Sales are reported monthly but analysed per calendar year, per fiscal
//! year (April to March, named after the year in which it ends) or per
//! calendar quarter. A [`Period`] is the bucket a record falls into once
//! a [`PeriodBasis`] has been applied to its date.

use crate::error::{DataError, Result};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// First month of the fiscal year (April).
pub const FISCAL_YEAR_START_MONTH: u32 = 4;

/// A reporting period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Period {
    /// A calendar or fiscal year.
    Year(i32),
    /// A calendar quarter, `quarter` in 1..=4.
    Quarter {
        /// Calendar year.
        year: i32,
        /// Quarter number (1-4).
        quarter: u8,
    },
}

impl Period {
    /// Create a quarter period, rejecting quarter numbers outside 1..=4.
    pub fn quarter(year: i32, quarter: u8) -> Result<Self> {
        if (1..=4).contains(&quarter) {
            Ok(Self::Quarter { year, quarter })
        } else {
            Err(DataError::InvalidPeriod(format!("{year}-Q{quarter}")))
        }
    }

    /// Year component of the period.
    pub const fn year(&self) -> i32 {
        match self {
            Self::Year(year) | Self::Quarter { year, .. } => *year,
        }
    }

    /// Signed number of periods from `self` to `end`.
    ///
    /// Returns `None` when the two periods are of different kinds.
    pub const fn periods_until(&self, end: &Self) -> Option<i64> {
        match (self, end) {
            (Self::Year(a), Self::Year(b)) => Some(*b as i64 - *a as i64),
            (
                Self::Quarter {
                    year: ya,
                    quarter: qa,
                },
                Self::Quarter {
                    year: yb,
                    quarter: qb,
                },
            ) => Some((*yb as i64 * 4 + *qb as i64) - (*ya as i64 * 4 + *qa as i64)),
            _ => None,
        }
    }

    /// Period that follows this one.
    pub const fn next(&self) -> Self {
        match *self {
            Self::Year(y) => Self::Year(y + 1),
            Self::Quarter { year, quarter: 4 } => Self::Quarter {
                year: year + 1,
                quarter: 1,
            },
            Self::Quarter { year, quarter } => Self::Quarter {
                year,
                quarter: quarter + 1,
            },
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Year(year) => write!(f, "{year}"),
            Self::Quarter { year, quarter } => write!(f, "{year}-Q{quarter}"),
        }
    }
}

impl FromStr for Period {
    type Err = DataError;

    /// Accepts `2024`, `FY 2024`, `FY2024` and `2024-Q1`.
    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let token = trimmed
            .strip_prefix("FY")
            .or_else(|| trimmed.strip_prefix("fy"))
            .map_or(trimmed, str::trim_start);

        if let Some((year, quarter)) = token.split_once("-Q") {
            let year = year
                .parse::<i32>()
                .map_err(|_| DataError::InvalidPeriod(s.to_string()))?;
            let quarter = quarter
                .parse::<u8>()
                .map_err(|_| DataError::InvalidPeriod(s.to_string()))?;
            return Self::quarter(year, quarter);
        }

        token
            .parse::<i32>()
            .map(Self::Year)
            .map_err(|_| DataError::InvalidPeriod(s.to_string()))
    }
}

impl Serialize for Period {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Period {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// How record dates are bucketed into periods.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodBasis {
    /// Calendar year (January to December).
    Calendar,
    /// Fiscal year starting in the configured month.
    #[default]
    Fiscal,
    /// Calendar quarter.
    Quarter,
}

impl PeriodBasis {
    /// Bucket a date into a period.
    pub fn bucket(&self, date: NaiveDate, fiscal_start_month: u32) -> Period {
        match self {
            Self::Calendar => Period::Year(date.year()),
            Self::Fiscal => Period::Year(fiscal_year(date, fiscal_start_month)),
            Self::Quarter => Period::Quarter {
                year: date.year(),
                quarter: (date.month0() / 3 + 1) as u8,
            },
        }
    }
}

impl fmt::Display for PeriodBasis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Calendar => "calendar",
            Self::Fiscal => "fiscal",
            Self::Quarter => "quarter",
        };
        f.write_str(name)
    }
}

impl FromStr for PeriodBasis {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "calendar" | "year" => Ok(Self::Calendar),
            "fiscal" | "fy" => Ok(Self::Fiscal),
            "quarter" | "quarterly" => Ok(Self::Quarter),
            other => Err(DataError::InvalidPeriod(format!("unknown basis: {other}"))),
        }
    }
}

/// Fiscal year a date belongs to, named after the calendar year in which
/// the fiscal year ends.
///
/// With an April start, 2023-03-31 is in FY2023 and 2023-04-01 in FY2024.
/// A January start degenerates to the calendar year.
pub fn fiscal_year(date: NaiveDate, start_month: u32) -> i32 {
    if start_month > 1 && date.month() >= start_month {
        date.year() + 1
    } else {
        date.year()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[rstest]
    #[case(date(2023, 3, 31), 2023)]
    #[case(date(2023, 4, 1), 2024)]
    #[case(date(2023, 12, 31), 2024)]
    #[case(date(2024, 1, 15), 2024)]
    fn test_fiscal_year_april_start(#[case] d: NaiveDate, #[case] expected: i32) {
        assert_eq!(fiscal_year(d, FISCAL_YEAR_START_MONTH), expected);
    }

    #[test]
    fn test_fiscal_year_january_start_is_calendar() {
        assert_eq!(fiscal_year(date(2023, 6, 1), 1), 2023);
    }

    #[test]
    fn test_bucket_quarter() {
        let basis = PeriodBasis::Quarter;
        assert_eq!(
            basis.bucket(date(2024, 5, 1), FISCAL_YEAR_START_MONTH),
            Period::Quarter {
                year: 2024,
                quarter: 2
            }
        );
        assert_eq!(
            basis.bucket(date(2024, 12, 1), FISCAL_YEAR_START_MONTH),
            Period::Quarter {
                year: 2024,
                quarter: 4
            }
        );
    }

    #[test]
    fn test_periods_until() {
        assert_eq!(Period::Year(2022).periods_until(&Period::Year(2024)), Some(2));
        let q1 = Period::quarter(2023, 3).unwrap();
        let q2 = Period::quarter(2024, 2).unwrap();
        assert_eq!(q1.periods_until(&q2), Some(3));
        assert_eq!(Period::Year(2022).periods_until(&q2), None);
    }

    #[test]
    fn test_next_wraps_quarter() {
        let q4 = Period::quarter(2023, 4).unwrap();
        assert_eq!(q4.next(), Period::quarter(2024, 1).unwrap());
        assert_eq!(Period::Year(2023).next(), Period::Year(2024));
    }

    #[rstest]
    #[case("2024", Period::Year(2024))]
    #[case("FY 2024", Period::Year(2024))]
    #[case("FY2023", Period::Year(2023))]
    #[case("2024-Q3", Period::Quarter { year: 2024, quarter: 3 })]
    fn test_parse_period(#[case] input: &str, #[case] expected: Period) {
        assert_eq!(input.parse::<Period>().unwrap(), expected);
    }

    #[test]
    fn test_parse_period_rejects_bad_quarter() {
        assert!("2024-Q5".parse::<Period>().is_err());
        assert!("twenty".parse::<Period>().is_err());
    }

    #[test]
    fn test_display_and_serialize() {
        let period = Period::quarter(2022, 1).unwrap();
        assert_eq!(period.to_string(), "2022-Q1");
        assert_eq!(csv_field(&period), "2022-Q1");
    }

    fn csv_field(period: &Period) -> String {
        let mut wtr = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(vec![]);
        wtr.serialize(period).unwrap();
        String::from_utf8(wtr.into_inner().unwrap())
            .unwrap()
            .trim()
            .to_string()
    }
}

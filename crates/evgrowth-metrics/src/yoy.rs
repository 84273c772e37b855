//! Period-over-period change.

use evgrowth_data::Period;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::FusedIterator;
use std::slice::Windows;

/// Percent change between two values.
///
/// Growth from zero has no finite percentage and is tagged
/// [`PctChange::Unbounded`] instead of carrying an IEEE infinity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum PctChange {
    /// Ordinary percent change.
    Finite(f64),
    /// Growth from zero to a positive value.
    Unbounded,
}

impl PctChange {
    /// The finite percentage, if any.
    pub const fn finite(&self) -> Option<f64> {
        match self {
            Self::Finite(v) => Some(*v),
            Self::Unbounded => None,
        }
    }

    /// Whether this is growth from zero.
    pub const fn is_unbounded(&self) -> bool {
        matches!(self, Self::Unbounded)
    }
}

impl fmt::Display for PctChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Finite(v) => write!(f, "{v:.2}%"),
            Self::Unbounded => f.write_str("new"),
        }
    }
}

/// Percent change from `from` to `to`.
///
/// `None` when both are zero, or when a zero base moves to a negative value.
pub fn pct_change(from: f64, to: f64) -> Option<PctChange> {
    if from == 0.0 {
        return (to > 0.0).then_some(PctChange::Unbounded);
    }
    Some(PctChange::Finite((to - from) / from * 100.0))
}

/// Change between two consecutive periods.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct YoyChange {
    /// Earlier period.
    pub from: Period,
    /// Later period.
    pub to: Period,
    /// Percent change; `None` when undefined.
    pub pct_change: Option<PctChange>,
}

/// Lazy iterator over consecutive-period changes.
///
/// Borrows the series and holds no other state; clone it, or call
/// [`year_over_year`] again, to start over.
#[derive(Debug, Clone)]
pub struct YearOverYear<'a> {
    windows: Windows<'a, (Period, f64)>,
}

/// Changes between each pair of consecutive entries of a period-ordered
/// series.
///
/// # Examples
///
/// ```
/// use evgrowth_data::Period;
/// use evgrowth_metrics::{PctChange, year_over_year};
///
/// let series = [(Period::Year(2022), 0.0), (Period::Year(2023), 0.0), (Period::Year(2024), 10.0)];
/// let changes: Vec<_> = year_over_year(&series).collect();
/// assert_eq!(changes[0].pct_change, None);
/// assert_eq!(changes[1].pct_change, Some(PctChange::Unbounded));
/// ```
pub fn year_over_year(series: &[(Period, f64)]) -> YearOverYear<'_> {
    YearOverYear {
        windows: series.windows(2),
    }
}

impl Iterator for YearOverYear<'_> {
    type Item = YoyChange;

    fn next(&mut self) -> Option<Self::Item> {
        self.windows.next().map(|pair| {
            let (from, from_value) = pair[0];
            let (to, to_value) = pair[1];
            YoyChange {
                from,
                to,
                pct_change: pct_change(from_value, to_value),
            }
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.windows.size_hint()
    }
}

impl ExactSizeIterator for YearOverYear<'_> {}

impl FusedIterator for YearOverYear<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_zero_to_zero_then_zero_to_positive() {
        let series = [
            (Period::Year(2022), 0.0),
            (Period::Year(2023), 0.0),
            (Period::Year(2024), 10.0),
        ];
        let changes: Vec<_> = year_over_year(&series).collect();
        assert_eq!(changes.len(), 2);
        assert_eq!(changes[0].from, Period::Year(2022));
        assert_eq!(changes[0].to, Period::Year(2023));
        assert_eq!(changes[0].pct_change, None);
        assert_eq!(changes[1].pct_change, Some(PctChange::Unbounded));
    }

    #[test]
    fn test_finite_changes() {
        let series = [
            (Period::Year(2022), 100.0),
            (Period::Year(2023), 150.0),
            (Period::Year(2024), 75.0),
        ];
        let changes: Vec<_> = year_over_year(&series)
            .map(|c| c.pct_change.and_then(|p| p.finite()).unwrap())
            .collect();
        assert_relative_eq!(changes[0], 50.0);
        assert_relative_eq!(changes[1], -50.0);
    }

    #[test]
    fn test_restartable() {
        let series = [(Period::Year(2023), 1.0), (Period::Year(2024), 2.0)];
        let iter = year_over_year(&series);
        let first: Vec<_> = iter.clone().collect();
        let second: Vec<_> = iter.collect();
        assert_eq!(first, second);
        assert_eq!(year_over_year(&series).collect::<Vec<_>>(), first);
    }

    #[test]
    fn test_short_series_yield_nothing() {
        assert_eq!(year_over_year(&[]).count(), 0);
        assert_eq!(year_over_year(&[(Period::Year(2024), 5.0)]).len(), 0);
    }

    #[test]
    fn test_to_zero_is_full_decline() {
        assert_eq!(pct_change(40.0, 0.0), Some(PctChange::Finite(-100.0)));
    }

    #[test]
    fn test_display_never_prints_infinity() {
        assert_eq!(PctChange::Unbounded.to_string(), "new");
        assert_eq!(PctChange::Finite(12.345).to_string(), "12.35%");
    }
}

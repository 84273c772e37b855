//! Compound annual growth rate.
//!
//! CAGR is the constant per-period rate that takes a start value to an end
//! value over `n` periods:
//!
//! ```text
//! CAGR% = ((end / start) ^ (1 / n) - 1) * 100
//! ```
//!
//! It is undefined for a non-positive start value.

use crate::aggregate::{GroupKey, Measure, PeriodAggregates};
use crate::error::{MetricsError, Result};
use crate::rank::{TieBreak, assign_ranks};
use evgrowth_data::Period;
use serde::{Deserialize, Serialize};

/// Compound growth rate in percent per period.
///
/// Returns `Ok(None)` when `start_value <= 0`. A non-positive
/// `num_periods` is an [`MetricsError::InvalidPeriodRange`], and a negative
/// or non-finite `end_value` is an [`MetricsError::InvalidValue`].
///
/// # Examples
///
/// ```
/// use evgrowth_metrics::compute_cagr;
///
/// let cagr = compute_cagr(100.0, 400.0, 2).unwrap().unwrap();
/// assert!((cagr - 100.0).abs() < 1e-9);
/// assert_eq!(compute_cagr(0.0, 50.0, 2).unwrap(), None);
/// ```
pub fn compute_cagr(start_value: f64, end_value: f64, num_periods: i64) -> Result<Option<f64>> {
    if num_periods <= 0 {
        return Err(MetricsError::InvalidPeriodRange(format!(
            "period count must be at least 1, got {num_periods}"
        )));
    }
    if !end_value.is_finite() || end_value < 0.0 {
        return Err(MetricsError::InvalidValue(format!(
            "end value must be a non-negative number, got {end_value}"
        )));
    }
    if start_value.is_nan() || start_value <= 0.0 {
        return Ok(None);
    }

    let ratio = end_value / start_value;
    Ok(Some((ratio.powf(1.0 / num_periods as f64) - 1.0) * 100.0))
}

/// Why an entity could not be compared across two periods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataGap {
    /// No data in the start period.
    MissingStart(Period),
    /// No data in the end period.
    MissingEnd(Period),
    /// No data in either period.
    MissingBoth,
}

/// Growth of one group between two periods.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthResult {
    /// Group (entity, or entity and category).
    pub entity: GroupKey,
    /// Start period.
    pub start_period: Period,
    /// End period.
    pub end_period: Period,
    /// Value in the start period.
    pub start_value: Option<f64>,
    /// Value in the end period.
    pub end_value: Option<f64>,
    /// CAGR in percent; `None` when undefined.
    pub cagr_percent: Option<f64>,
    /// 1-based rank by descending CAGR; `None` when the CAGR is undefined.
    pub rank: Option<usize>,
    /// Missing data that excluded the group from comparison.
    pub gap: Option<DataGap>,
}

impl GrowthResult {
    /// Whether the CAGR is defined.
    pub const fn is_defined(&self) -> bool {
        self.cagr_percent.is_some()
    }
}

/// CAGR of every group between `start` and `end`.
///
/// Groups missing either period get a [`DataGap`] and a `None` CAGR; they
/// do not fail the computation. Results come back in group order with
/// ranks assigned.
pub fn cagr_between(
    aggregates: &PeriodAggregates,
    measure: Measure,
    start: Period,
    end: Period,
    tie_break: TieBreak,
) -> Result<Vec<GrowthResult>> {
    let num_periods = start.periods_until(&end).ok_or_else(|| {
        MetricsError::InvalidPeriodRange(format!("{start} and {end} are different period kinds"))
    })?;
    if num_periods <= 0 {
        return Err(MetricsError::InvalidPeriodRange(format!(
            "end period {end} must be after start period {start}"
        )));
    }

    let mut results = Vec::new();
    for key in aggregates.groups() {
        let start_value = aggregates.get(key, start).map(|t| t.value(measure));
        let end_value = aggregates.get(key, end).map(|t| t.value(measure));

        let (cagr_percent, gap) = match (start_value, end_value) {
            (Some(s), Some(e)) => (compute_cagr(s, e, num_periods)?, None),
            (None, Some(_)) => (None, Some(DataGap::MissingStart(start))),
            (Some(_), None) => (None, Some(DataGap::MissingEnd(end))),
            (None, None) => (None, Some(DataGap::MissingBoth)),
        };

        if let Some(gap) = gap {
            tracing::debug!(entity = %key, ?gap, "excluded from growth comparison");
        }

        results.push(GrowthResult {
            entity: key.clone(),
            start_period: start,
            end_period: end,
            start_value,
            end_value,
            cagr_percent,
            rank: None,
            gap,
        });
    }

    assign_ranks(&mut results, tie_break);
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::{GroupField, aggregate_by_period};
    use approx::assert_relative_eq;
    use evgrowth_data::SalesRecord;
    use rstest::rstest;

    #[test]
    fn test_doubling_each_year() {
        let cagr = compute_cagr(100.0, 400.0, 2).unwrap().unwrap();
        assert_relative_eq!(cagr, 100.0, epsilon = 1e-12);
    }

    #[rstest]
    #[case(0.0)]
    #[case(-5.0)]
    #[case(f64::NAN)]
    fn test_non_positive_start_is_undefined(#[case] start: f64) {
        assert_eq!(compute_cagr(start, 50.0, 2).unwrap(), None);
    }

    #[rstest]
    #[case(1.0, 1)]
    #[case(250.0, 3)]
    #[case(1e6, 10)]
    fn test_flat_series_has_zero_growth(#[case] value: f64, #[case] n: i64) {
        let cagr = compute_cagr(value, value, n).unwrap().unwrap();
        assert_relative_eq!(cagr, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_decline_is_negative() {
        let cagr = compute_cagr(400.0, 100.0, 2).unwrap().unwrap();
        assert_relative_eq!(cagr, -50.0, epsilon = 1e-12);
    }

    #[rstest]
    #[case(0)]
    #[case(-1)]
    fn test_non_positive_period_count(#[case] n: i64) {
        assert!(matches!(
            compute_cagr(1.0, 2.0, n),
            Err(MetricsError::InvalidPeriodRange(_))
        ));
    }

    #[rstest]
    #[case(100.0, -1.0)]
    #[case(100.0, f64::NAN)]
    #[case(100.0, f64::INFINITY)]
    #[case(0.0, -1.0)]
    fn test_invalid_end_value_rejected(#[case] start: f64, #[case] end: f64) {
        assert!(matches!(
            compute_cagr(start, end, 2),
            Err(MetricsError::InvalidValue(_))
        ));
    }

    #[test]
    fn test_zero_end_is_full_decline() {
        let cagr = compute_cagr(100.0, 0.0, 2).unwrap().unwrap();
        assert_relative_eq!(cagr, -100.0, epsilon = 1e-12);
    }

    #[rstest]
    #[case(100.0, 400.0, 2)]
    #[case(3.0, 7.0, 5)]
    #[case(12_345.0, 9_876.0, 3)]
    #[case(1.0, 1_000_000.0, 4)]
    fn test_compounding_recovers_end_value(
        #[case] start: f64,
        #[case] end: f64,
        #[case] n: i64,
    ) {
        let cagr = compute_cagr(start, end, n).unwrap().unwrap();
        let recovered = start * (1.0 + cagr / 100.0).powi(n as i32);
        assert_relative_eq!(recovered, end, max_relative = 1e-9);
    }

    fn aggregates() -> PeriodAggregates {
        let records = vec![
            SalesRecord::new("A", Period::Year(2022), 100.0),
            SalesRecord::new("A", Period::Year(2024), 400.0),
            SalesRecord::new("B", Period::Year(2022), 0.0),
            SalesRecord::new("B", Period::Year(2024), 50.0),
            SalesRecord::new("C", Period::Year(2024), 70.0),
            SalesRecord::new("D", Period::Year(2022), 10.0),
            SalesRecord::new("D", Period::Year(2024), 10.0),
        ];
        aggregate_by_period(&records, &[GroupField::Entity]).unwrap()
    }

    #[test]
    fn test_cagr_between_ranks_and_gaps() {
        let results = cagr_between(
            &aggregates(),
            Measure::Electric,
            Period::Year(2022),
            Period::Year(2024),
            TieBreak::FirstSeen,
        )
        .unwrap();

        assert_eq!(results.len(), 4);
        let a = &results[0];
        assert_relative_eq!(a.cagr_percent.unwrap(), 100.0, epsilon = 1e-12);
        assert_eq!(a.rank, Some(1));

        let b = &results[1];
        assert_eq!(b.cagr_percent, None);
        assert_eq!(b.rank, None);
        assert_eq!(b.gap, None);

        let c = &results[2];
        assert_eq!(c.gap, Some(DataGap::MissingStart(Period::Year(2022))));
        assert_eq!(c.rank, None);

        let d = &results[3];
        assert_eq!(d.rank, Some(2));
    }

    #[test]
    fn test_cagr_between_rejects_reversed_range() {
        let err = cagr_between(
            &aggregates(),
            Measure::Electric,
            Period::Year(2024),
            Period::Year(2024),
            TieBreak::FirstSeen,
        )
        .unwrap_err();
        assert!(matches!(err, MetricsError::InvalidPeriodRange(_)));
    }
}

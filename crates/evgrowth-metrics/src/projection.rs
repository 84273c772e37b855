//! Forward projection at a constant growth rate.

use crate::aggregate::{GroupKey, Measure, PeriodAggregates};
use crate::cagr::GrowthResult;
use crate::error::{MetricsError, Result};
use evgrowth_data::Period;
use serde::{Deserialize, Serialize};

/// Compound `current` forward by `cagr_percent` for `periods` periods.
///
/// # Examples
///
/// ```
/// use evgrowth_metrics::project;
///
/// assert!((project(100.0, 100.0, 2) - 400.0).abs() < 1e-9);
/// ```
pub fn project(current: f64, cagr_percent: f64, periods: i64) -> f64 {
    current * (1.0 + cagr_percent / 100.0).powf(periods as f64)
}

/// Projected value of one group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projection {
    /// Group.
    pub entity: GroupKey,
    /// Period the projection starts from.
    pub base_period: Period,
    /// Projected period.
    pub target_period: Period,
    /// Value in the base period.
    pub base_value: f64,
    /// Growth rate applied.
    pub cagr_percent: f64,
    /// Projected value.
    pub projected: f64,
}

/// Project every group with a defined CAGR from `base` to `target`.
///
/// Groups without a defined CAGR or without data in `base` are skipped.
/// Results are ordered by projected value, highest first.
pub fn project_growth(
    results: &[GrowthResult],
    aggregates: &PeriodAggregates,
    measure: Measure,
    base: Period,
    target: Period,
) -> Result<Vec<Projection>> {
    let periods = match base.periods_until(&target) {
        Some(n) if n > 0 => n,
        _ => {
            return Err(MetricsError::InvalidPeriodRange(format!(
                "projection target {target} must be a later period of the same kind as {base}"
            )));
        }
    };

    let mut projections: Vec<_> = results
        .iter()
        .filter_map(|r| {
            let cagr_percent = r.cagr_percent?;
            let base_value = aggregates.get(&r.entity, base)?.value(measure);
            Some(Projection {
                entity: r.entity.clone(),
                base_period: base,
                target_period: target,
                base_value,
                cagr_percent,
                projected: project(base_value, cagr_percent, periods),
            })
        })
        .collect();

    projections.sort_by(|a, b| b.projected.total_cmp(&a.projected));
    Ok(projections)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::{GroupField, aggregate_by_period};
    use crate::cagr::cagr_between;
    use crate::rank::TieBreak;
    use approx::assert_relative_eq;
    use evgrowth_data::SalesRecord;

    #[test]
    fn test_project_zero_growth() {
        assert_relative_eq!(project(250.0, 0.0, 6), 250.0);
    }

    #[test]
    fn test_project_growth_to_2030() {
        let records = vec![
            SalesRecord::new("A", Period::Year(2022), 100.0),
            SalesRecord::new("A", Period::Year(2024), 400.0),
            SalesRecord::new("B", Period::Year(2022), 1000.0),
            SalesRecord::new("B", Period::Year(2024), 1000.0),
            SalesRecord::new("C", Period::Year(2024), 5.0),
        ];
        let aggs = aggregate_by_period(&records, &[GroupField::Entity]).unwrap();
        let results = cagr_between(
            &aggs,
            Measure::Electric,
            Period::Year(2022),
            Period::Year(2024),
            TieBreak::FirstSeen,
        )
        .unwrap();

        let projections = project_growth(
            &results,
            &aggs,
            Measure::Electric,
            Period::Year(2024),
            Period::Year(2030),
        )
        .unwrap();

        assert_eq!(projections.len(), 2);
        assert_eq!(projections[0].entity, GroupKey::single("A"));
        assert_relative_eq!(projections[0].projected, 400.0 * 64.0, max_relative = 1e-9);
        assert_relative_eq!(projections[1].projected, 1000.0, max_relative = 1e-9);
    }

    #[test]
    fn test_target_before_base_rejected() {
        let aggs = PeriodAggregates::default();
        assert!(
            project_growth(&[], &aggs, Measure::Electric, Period::Year(2030), Period::Year(2024))
                .is_err()
        );
    }
}

//! EV penetration: electric units as a share of all units sold.

use crate::aggregate::{GroupKey, PeriodAggregates};
use crate::error::{MetricsError, Result};
use crate::yoy::{PctChange, pct_change};
use evgrowth_data::Period;
use serde::{Deserialize, Serialize};

/// Electric units as a percent of total units.
///
/// `None` when `total_units` is not positive.
pub fn penetration_rate(units_sold: f64, total_units: f64) -> Option<f64> {
    (total_units > 0.0).then(|| units_sold / total_units * 100.0)
}

/// Penetration of every group with data in `period`.
///
/// A group's rate is the ratio of its summed electric to summed total units,
/// `None` when it has no total units in that period.
pub fn penetration_in(aggregates: &PeriodAggregates, period: Period) -> Vec<(GroupKey, Option<f64>)> {
    aggregates
        .groups()
        .filter_map(|key| {
            aggregates
                .get(key, period)
                .map(|t| (key.clone(), penetration_rate(t.units_sold, t.total_units)))
        })
        .collect()
}

/// Change in one group's penetration between two periods.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PenetrationChange {
    /// Group.
    pub entity: GroupKey,
    /// Earlier period.
    pub from: Period,
    /// Later period.
    pub to: Period,
    /// Penetration in percent in the earlier period.
    pub from_rate: f64,
    /// Penetration in percent in the later period.
    pub to_rate: f64,
    /// Difference in percentage points.
    pub change: f64,
    /// Relative change of the rate.
    pub pct_change: Option<PctChange>,
}

impl PenetrationChange {
    /// Whether penetration fell.
    pub fn is_decline(&self) -> bool {
        self.change < 0.0
    }
}

/// Penetration change of every group with a defined rate in both periods.
///
/// Each period's rate is the ratio of summed electric to summed total units
/// for that group. Groups with no totals in either period are skipped.
pub fn penetration_changes(
    aggregates: &PeriodAggregates,
    from: Period,
    to: Period,
) -> Result<Vec<PenetrationChange>> {
    match from.periods_until(&to) {
        Some(n) if n > 0 => {}
        _ => {
            return Err(MetricsError::InvalidPeriodRange(format!(
                "{to} must be a later period of the same kind as {from}"
            )));
        }
    }

    let rate = |key: &GroupKey, period: Period| {
        aggregates
            .get(key, period)
            .and_then(|t| penetration_rate(t.units_sold, t.total_units))
    };

    let changes = aggregates
        .groups()
        .filter_map(|key| {
            let from_rate = rate(key, from)?;
            let to_rate = rate(key, to)?;
            Some(PenetrationChange {
                entity: key.clone(),
                from,
                to,
                from_rate,
                to_rate,
                change: to_rate - from_rate,
                pct_change: pct_change(from_rate, to_rate),
            })
        })
        .collect();
    Ok(changes)
}

/// Groups whose penetration fell, steepest decline first.
pub fn declines(changes: &[PenetrationChange]) -> Vec<PenetrationChange> {
    let mut out: Vec<_> = changes.iter().filter(|c| c.is_decline()).cloned().collect();
    out.sort_by(|a, b| a.change.total_cmp(&b.change));
    out
}

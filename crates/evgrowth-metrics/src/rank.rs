//! Ranking by growth or by volume.

use crate::aggregate::GroupKey;
use crate::cagr::GrowthResult;
use crate::error::{MetricsError, Result};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// How equal values are ordered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreak {
    /// Keep input order.
    #[default]
    FirstSeen,
    /// Order by group name.
    EntityName,
}

/// Which end of an ordering to take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Highest values first.
    Top,
    /// Lowest values first.
    Bottom,
}

/// Outcome of a growth ranking.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ranking {
    /// Selected groups, best (or worst, for a bottom ranking) first.
    pub ranked: Vec<GrowthResult>,
    /// Groups whose CAGR is undefined, in input order.
    pub unranked: Vec<GrowthResult>,
}

fn compare_desc(a: &GrowthResult, b: &GrowthResult, tie_break: TieBreak) -> Ordering {
    // callers only pass defined results
    let (x, y) = (
        a.cagr_percent.unwrap_or(f64::NEG_INFINITY),
        b.cagr_percent.unwrap_or(f64::NEG_INFINITY),
    );
    let by_value = y.total_cmp(&x);
    match tie_break {
        TieBreak::FirstSeen => by_value,
        TieBreak::EntityName => by_value.then_with(|| a.entity.cmp(&b.entity)),
    }
}

/// Split into (defined, sorted by descending CAGR with ranks set) and
/// undefined.
fn order(
    results: &[GrowthResult],
    tie_break: TieBreak,
) -> (Vec<GrowthResult>, Vec<GrowthResult>) {
    let (mut defined, unranked): (Vec<_>, Vec<_>) = results
        .iter()
        .cloned()
        .map(|mut r| {
            r.rank = None;
            r
        })
        .partition(GrowthResult::is_defined);

    // sort_by is stable, so equal CAGRs keep input order
    defined.sort_by(|a, b| compare_desc(a, b, tie_break));
    for (i, r) in defined.iter_mut().enumerate() {
        r.rank = Some(i + 1);
    }
    (defined, unranked)
}

/// Set `rank` on every result in place without reordering.
///
/// Defined CAGRs get 1-based ranks by descending value; undefined ones get
/// `None`.
pub fn assign_ranks(results: &mut [GrowthResult], tie_break: TieBreak) {
    let mut indices: Vec<usize> = (0..results.len())
        .filter(|&i| results[i].is_defined())
        .collect();
    indices.sort_by(|&a, &b| compare_desc(&results[a], &results[b], tie_break));

    for r in results.iter_mut() {
        r.rank = None;
    }
    for (position, &i) in indices.iter().enumerate() {
        results[i].rank = Some(position + 1);
    }
}

/// The `n` groups with the highest CAGR.
///
/// Undefined CAGRs never appear in `ranked`; they are returned in
/// `unranked`. Each ranked result carries its rank among all defined
/// results.
pub fn top_n_by_cagr(results: &[GrowthResult], n: usize, tie_break: TieBreak) -> Result<Ranking> {
    if n == 0 {
        return Err(MetricsError::InvalidCount);
    }
    let (mut defined, unranked) = order(results, tie_break);
    defined.truncate(n);
    Ok(Ranking {
        ranked: defined,
        unranked,
    })
}

/// The `n` groups with the lowest CAGR, lowest first.
///
/// Ranks are still counted from the top, so the last of 30 groups has rank
/// 30.
pub fn bottom_n_by_cagr(
    results: &[GrowthResult],
    n: usize,
    tie_break: TieBreak,
) -> Result<Ranking> {
    if n == 0 {
        return Err(MetricsError::InvalidCount);
    }
    let (defined, unranked) = order(results, tie_break);
    let ranked = defined.into_iter().rev().take(n).collect();
    Ok(Ranking { ranked, unranked })
}

/// The `n` highest or lowest values, e.g. top makers by units sold.
///
/// Equal values keep input order.
pub fn top_n_by_value<I>(values: I, n: usize, direction: Direction) -> Result<Vec<(GroupKey, f64)>>
where
    I: IntoIterator<Item = (GroupKey, f64)>,
{
    if n == 0 {
        return Err(MetricsError::InvalidCount);
    }
    let mut values: Vec<_> = values.into_iter().collect();
    match direction {
        Direction::Top => values.sort_by(|a, b| b.1.total_cmp(&a.1)),
        Direction::Bottom => values.sort_by(|a, b| a.1.total_cmp(&b.1)),
    }
    values.truncate(n);
    Ok(values)
}

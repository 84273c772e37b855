//! Polars `DataFrame` conversion for presentation layers.
//!
//! Undefined values become nulls.

use crate::export::{ExportError, ShareRow};
use evgrowth_metrics::{GrowthResult, PenetrationChange, Pivot, Projection};
use polars::prelude::*;

/// Columns: entity, rank, start_period, end_period, start_value, end_value,
/// cagr_percent.
pub fn growth_frame(results: &[GrowthResult]) -> Result<DataFrame, ExportError> {
    let entities: Vec<String> = results.iter().map(|r| r.entity.to_string()).collect();
    let ranks: Vec<Option<i64>> = results
        .iter()
        .map(|r| r.rank.and_then(|n| i64::try_from(n).ok()))
        .collect();
    let starts: Vec<String> = results.iter().map(|r| r.start_period.to_string()).collect();
    let ends: Vec<String> = results.iter().map(|r| r.end_period.to_string()).collect();
    let start_values: Vec<Option<f64>> = results.iter().map(|r| r.start_value).collect();
    let end_values: Vec<Option<f64>> = results.iter().map(|r| r.end_value).collect();
    let cagrs: Vec<Option<f64>> = results.iter().map(|r| r.cagr_percent).collect();

    let df = DataFrame::new(vec![
        Series::new("entity".into(), entities).into(),
        Series::new("rank".into(), ranks).into(),
        Series::new("start_period".into(), starts).into(),
        Series::new("end_period".into(), ends).into(),
        Series::new("start_value".into(), start_values).into(),
        Series::new("end_value".into(), end_values).into(),
        Series::new("cagr_percent".into(), cagrs).into(),
    ])?;

    Ok(df)
}

/// One `entity` column plus one column per period.
pub fn pivot_frame(pivot: &Pivot) -> Result<DataFrame, ExportError> {
    let entities: Vec<String> = pivot.rows.iter().map(|r| r.entity.to_string()).collect();
    let mut columns: Vec<Column> = vec![Series::new("entity".into(), entities).into()];

    for (i, period) in pivot.periods.iter().enumerate() {
        let values: Vec<Option<f64>> = pivot
            .rows
            .iter()
            .map(|r| r.values.get(i).copied().flatten())
            .collect();
        columns.push(Series::new(period.to_string().into(), values).into());
    }

    Ok(DataFrame::new(columns)?)
}

/// Columns: entity, share_percent, previous_share_percent, change_pp.
pub fn share_frame(rows: &[ShareRow]) -> Result<DataFrame, ExportError> {
    let entities: Vec<String> = rows.iter().map(|r| r.entity.clone()).collect();
    let shares: Vec<f64> = rows.iter().map(|r| r.share_percent).collect();
    let previous: Vec<Option<f64>> = rows.iter().map(|r| r.previous_share_percent).collect();
    let changes: Vec<Option<f64>> = rows.iter().map(|r| r.change_pp).collect();

    let df = DataFrame::new(vec![
        Series::new("entity".into(), entities).into(),
        Series::new("share_percent".into(), shares).into(),
        Series::new("previous_share_percent".into(), previous).into(),
        Series::new("change_pp".into(), changes).into(),
    ])?;

    Ok(df)
}

/// Columns: entity, from_rate, to_rate, change_pp.
pub fn penetration_frame(changes: &[PenetrationChange]) -> Result<DataFrame, ExportError> {
    let entities: Vec<String> = changes.iter().map(|c| c.entity.to_string()).collect();
    let from: Vec<f64> = changes.iter().map(|c| c.from_rate).collect();
    let to: Vec<f64> = changes.iter().map(|c| c.to_rate).collect();
    let delta: Vec<f64> = changes.iter().map(|c| c.change).collect();

    let df = DataFrame::new(vec![
        Series::new("entity".into(), entities).into(),
        Series::new("from_rate".into(), from).into(),
        Series::new("to_rate".into(), to).into(),
        Series::new("change_pp".into(), delta).into(),
    ])?;

    Ok(df)
}

/// Columns: entity, base_value, cagr_percent, projected.
pub fn projection_frame(projections: &[Projection]) -> Result<DataFrame, ExportError> {
    let entities: Vec<String> = projections.iter().map(|p| p.entity.to_string()).collect();
    let base: Vec<f64> = projections.iter().map(|p| p.base_value).collect();
    let cagr: Vec<f64> = projections.iter().map(|p| p.cagr_percent).collect();
    let projected: Vec<f64> = projections.iter().map(|p| p.projected).collect();

    let df = DataFrame::new(vec![
        Series::new("entity".into(), entities).into(),
        Series::new("base_value".into(), base).into(),
        Series::new("cagr_percent".into(), cagr).into(),
        Series::new("projected".into(), projected).into(),
    ])?;

    Ok(df)
}

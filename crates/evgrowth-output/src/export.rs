//! CSV and JSON export of metric results.
//!
//! Results are flattened into one row type per metric before writing, so
//! the CSV and JSON forms carry the same columns. Undefined values are an
//! empty CSV field and `null` in JSON.

use evgrowth_data::Period;
use evgrowth_metrics::{
    DataGap, GroupKey, GrowthResult, PenetrationChange, PctChange, Pivot, Projection, Ranking,
    Seasonality, YoyChange,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur during export operations.
#[derive(Debug, Error)]
pub enum ExportError {
    /// CSV serialization error.
    #[error("CSV serialization error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// DataFrame construction error.
    #[error("DataFrame error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),

    /// Invalid format error.
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}

/// Export format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    /// Comma-separated values format.
    Csv,

    /// Compact JSON format.
    Json,

    /// Pretty-printed JSON format.
    PrettyJson,
}

impl ExportFormat {
    /// Get the file extension for this format.
    pub const fn extension(&self) -> &str {
        match self {
            Self::Csv => "csv",
            Self::Json | Self::PrettyJson => "json",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Csv => "csv",
            Self::Json => "json",
            Self::PrettyJson => "pretty-json",
        })
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            "pretty-json" | "pretty_json" | "pretty" => Ok(Self::PrettyJson),
            other => Err(ExportError::InvalidFormat(other.to_string())),
        }
    }
}

/// Trait for exporting data in various formats.
pub trait Exporter {
    /// Export data to a string in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError>;

    /// Export data to a file in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or file writing fails.
    fn export_to_file(&self, path: &Path, format: ExportFormat) -> Result<(), ExportError> {
        let content = self.export_to_string(format)?;
        let mut file = File::create(path)?;
        file.write_all(content.as_bytes())?;
        Ok(())
    }
}

fn write_csv<T: Serialize>(rows: &[T]) -> Result<String, ExportError> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    for row in rows {
        wtr.serialize(row)?;
    }
    let bytes = wtr.into_inner().map_err(|e| e.into_error())?;
    String::from_utf8(bytes).map_err(|e| ExportError::InvalidFormat(e.to_string()))
}

fn export_rows<T: Serialize>(rows: &[T], format: ExportFormat) -> Result<String, ExportError> {
    match format {
        ExportFormat::Csv => write_csv(rows),
        ExportFormat::Json => Ok(serde_json::to_string(rows)?),
        ExportFormat::PrettyJson => Ok(serde_json::to_string_pretty(rows)?),
    }
}

fn gap_label(gap: &DataGap) -> String {
    match gap {
        DataGap::MissingStart(p) | DataGap::MissingEnd(p) => format!("missing {p}"),
        DataGap::MissingBoth => "missing both periods".to_string(),
    }
}

/// One CAGR result as a flat row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthRow {
    /// Rank by descending CAGR.
    pub rank: Option<usize>,
    /// Group label.
    pub entity: String,
    /// Start period.
    pub start_period: Period,
    /// End period.
    pub end_period: Period,
    /// Value in the start period.
    pub start_value: Option<f64>,
    /// Value in the end period.
    pub end_value: Option<f64>,
    /// CAGR in percent.
    pub cagr_percent: Option<f64>,
    /// Why the group could not be compared.
    pub note: Option<String>,
}

impl From<&GrowthResult> for GrowthRow {
    fn from(r: &GrowthResult) -> Self {
        Self {
            rank: r.rank,
            entity: r.entity.to_string(),
            start_period: r.start_period,
            end_period: r.end_period,
            start_value: r.start_value,
            end_value: r.end_value,
            cagr_percent: r.cagr_percent,
            note: r.gap.as_ref().map(gap_label),
        }
    }
}

impl Exporter for [GrowthResult] {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        let rows: Vec<GrowthRow> = self.iter().map(GrowthRow::from).collect();
        export_rows(&rows, format)
    }
}

impl Exporter for Ranking {
    /// Ranked groups first, then unranked ones.
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        let rows: Vec<GrowthRow> = self
            .ranked
            .iter()
            .chain(&self.unranked)
            .map(GrowthRow::from)
            .collect();
        export_rows(&rows, format)
    }
}

/// One period-over-period change as a flat row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YoyRow {
    /// Group label.
    pub entity: String,
    /// Earlier period.
    pub from: Period,
    /// Later period.
    pub to: Period,
    /// Percent change; empty when undefined or unbounded.
    pub pct_change: Option<f64>,
    /// Growth from zero.
    pub unbounded: bool,
}

impl YoyRow {
    /// Rows for every change of one group.
    pub fn for_entity<I>(entity: &GroupKey, changes: I) -> Vec<Self>
    where
        I: IntoIterator<Item = YoyChange>,
    {
        changes
            .into_iter()
            .map(|c| Self {
                entity: entity.to_string(),
                from: c.from,
                to: c.to,
                pct_change: c.pct_change.as_ref().and_then(PctChange::finite),
                unbounded: c.pct_change.is_some_and(|p| p.is_unbounded()),
            })
            .collect()
    }
}

impl Exporter for [YoyRow] {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        export_rows(self, format)
    }
}

/// One group's market share, optionally against an earlier period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShareRow {
    /// Group label.
    pub entity: String,
    /// Share in percent.
    pub share_percent: f64,
    /// Share in the comparison period, in percent.
    pub previous_share_percent: Option<f64>,
    /// Change in percentage points.
    pub change_pp: Option<f64>,
}

impl ShareRow {
    /// Rows for `current` shares, largest first.
    pub fn from_shares(current: &BTreeMap<GroupKey, f64>) -> Vec<Self> {
        let mut rows: Vec<Self> = current
            .iter()
            .map(|(key, share)| Self {
                entity: key.to_string(),
                share_percent: *share,
                previous_share_percent: None,
                change_pp: None,
            })
            .collect();
        sort_by_share(&mut rows);
        rows
    }

    /// Rows for `current` shares against an earlier period, largest first.
    ///
    /// `delta` is the percentage-point change per group, as returned by
    /// `market_share_delta`. Every group present in any map gets a row and a
    /// missing share counts as 0%.
    pub fn compared(
        current: &BTreeMap<GroupKey, f64>,
        previous: &BTreeMap<GroupKey, f64>,
        delta: &BTreeMap<GroupKey, f64>,
    ) -> Vec<Self> {
        let keys: BTreeSet<&GroupKey> = current
            .keys()
            .chain(previous.keys())
            .chain(delta.keys())
            .collect();

        let mut rows: Vec<Self> = keys
            .into_iter()
            .map(|key| Self {
                entity: key.to_string(),
                share_percent: current.get(key).copied().unwrap_or(0.0),
                previous_share_percent: Some(previous.get(key).copied().unwrap_or(0.0)),
                change_pp: Some(delta.get(key).copied().unwrap_or(0.0)),
            })
            .collect();
        sort_by_share(&mut rows);
        rows
    }
}

fn sort_by_share(rows: &mut [ShareRow]) {
    rows.sort_by(|a, b| b.share_percent.total_cmp(&a.share_percent));
}

impl Exporter for [ShareRow] {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        export_rows(self, format)
    }
}

/// One penetration change as a flat row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PenetrationRow {
    /// Group label.
    pub entity: String,
    /// Earlier period.
    pub from: Period,
    /// Later period.
    pub to: Period,
    /// Penetration in the earlier period, in percent.
    pub from_rate: f64,
    /// Penetration in the later period, in percent.
    pub to_rate: f64,
    /// Change in percentage points.
    pub change_pp: f64,
}

impl From<&PenetrationChange> for PenetrationRow {
    fn from(c: &PenetrationChange) -> Self {
        Self {
            entity: c.entity.to_string(),
            from: c.from,
            to: c.to,
            from_rate: c.from_rate,
            to_rate: c.to_rate,
            change_pp: c.change,
        }
    }
}

impl Exporter for [PenetrationChange] {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        let rows: Vec<PenetrationRow> = self.iter().map(PenetrationRow::from).collect();
        export_rows(&rows, format)
    }
}

/// One projection as a flat row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionRow {
    /// Group label.
    pub entity: String,
    /// Base period.
    pub base_period: Period,
    /// Projected period.
    pub target_period: Period,
    /// Value in the base period.
    pub base_value: f64,
    /// CAGR applied, in percent.
    pub cagr_percent: f64,
    /// Projected value.
    pub projected: f64,
}

impl From<&Projection> for ProjectionRow {
    fn from(p: &Projection) -> Self {
        Self {
            entity: p.entity.to_string(),
            base_period: p.base_period,
            target_period: p.target_period,
            base_value: p.base_value,
            cagr_percent: p.cagr_percent,
            projected: p.projected,
        }
    }
}

impl Exporter for [Projection] {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        let rows: Vec<ProjectionRow> = self.iter().map(ProjectionRow::from).collect();
        export_rows(&rows, format)
    }
}

/// One group's volume in a largest/smallest listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeRow {
    /// Position in the listing, from 1.
    pub position: usize,
    /// Group label.
    pub entity: String,
    /// Units sold.
    pub units: f64,
}

impl VolumeRow {
    /// Rows in listing order.
    pub fn from_values(values: &[(GroupKey, f64)]) -> Vec<Self> {
        values
            .iter()
            .enumerate()
            .map(|(i, (key, units))| Self {
                position: i + 1,
                entity: key.to_string(),
                units: *units,
            })
            .collect()
    }
}

impl Exporter for [VolumeRow] {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        export_rows(self, format)
    }
}

/// One group's penetration in a ranked listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PenetrationRankRow {
    /// Position in the listing, from 1.
    pub position: usize,
    /// Group label.
    pub entity: String,
    /// Period the rate was measured in.
    pub period: String,
    /// Electric share of total units, in percent.
    pub penetration_percent: f64,
}

impl PenetrationRankRow {
    /// Rows in listing order.
    pub fn from_rates(period: Period, rates: &[(GroupKey, f64)]) -> Vec<Self> {
        rates
            .iter()
            .enumerate()
            .map(|(i, (key, rate))| Self {
                position: i + 1,
                entity: key.to_string(),
                period: period.to_string(),
                penetration_percent: *rate,
            })
            .collect()
    }
}

impl Exporter for [PenetrationRankRow] {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        export_rows(self, format)
    }
}

impl Exporter for Pivot {
    /// CSV has one column per period; JSON keeps the nested form.
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => {
                let mut wtr = csv::Writer::from_writer(vec![]);
                let header = std::iter::once("entity".to_string())
                    .chain(self.periods.iter().map(ToString::to_string));
                wtr.write_record(header)?;
                for row in &self.rows {
                    let cells = std::iter::once(row.entity.to_string()).chain(
                        row.values
                            .iter()
                            .map(|v| v.map(|x| x.to_string()).unwrap_or_default()),
                    );
                    wtr.write_record(cells)?;
                }
                let bytes = wtr.into_inner().map_err(|e| e.into_error())?;
                String::from_utf8(bytes).map_err(|e| ExportError::InvalidFormat(e.to_string()))
            }
            ExportFormat::Json => Ok(serde_json::to_string(self)?),
            ExportFormat::PrettyJson => Ok(serde_json::to_string_pretty(self)?),
        }
    }
}

impl Exporter for Seasonality {
    /// CSV holds the month rows; JSON holds the whole profile.
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => write_csv(&self.months),
            ExportFormat::Json => Ok(serde_json::to_string(self)?),
            ExportFormat::PrettyJson => Ok(serde_json::to_string_pretty(self)?),
        }
    }
}

//! Per-period aggregation.
//!
//! Sums electric and total units for every (group, period) pair. Groups are
//! built from the entity and/or the vehicle category; the period is the one
//! each record was bucketed into at load time.

use crate::error::{MetricsError, Result};
use derive_more::From;
use evgrowth_data::{Period, SalesRecord};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

/// Label used for records without a category.
const UNSPECIFIED_CATEGORY: &str = "Unspecified";

/// Which units a metric is computed over.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Measure {
    /// Electric units sold.
    #[default]
    Electric,
    /// All units sold.
    Total,
    /// All units sold minus electric units.
    NonElectric,
}

impl Measure {
    /// Value of this measure for one record.
    pub fn of_record(&self, record: &SalesRecord) -> f64 {
        let total = record.total_units.unwrap_or(0.0);
        match self {
            Self::Electric => record.units_sold,
            Self::Total => total,
            Self::NonElectric => (total - record.units_sold).max(0.0),
        }
    }
}

impl fmt::Display for Measure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Electric => "electric",
            Self::Total => "total",
            Self::NonElectric => "non_electric",
        })
    }
}

impl FromStr for Measure {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "electric" | "ev" => Ok(Self::Electric),
            "total" => Ok(Self::Total),
            "non_electric" | "non-electric" | "non_ev" => Ok(Self::NonElectric),
            other => Err(format!("unknown measure: {other}")),
        }
    }
}

/// Record field that can be grouped on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupField {
    /// State or manufacturer.
    Entity,
    /// Vehicle segment.
    Category,
}

impl GroupField {
    fn extract(&self, record: &SalesRecord) -> String {
        match self {
            Self::Entity => record.entity.clone(),
            Self::Category => record
                .category
                .as_ref()
                .map_or_else(|| UNSPECIFIED_CATEGORY.to_string(), ToString::to_string),
        }
    }
}

/// Values of the group-by fields for one group, in group-by order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, From, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupKey(Vec<String>);

impl GroupKey {
    /// Key made of a single value.
    pub fn single(value: impl Into<String>) -> Self {
        Self(vec![value.into()])
    }

    /// Key parts, in group-by order.
    pub fn parts(&self) -> &[String] {
        &self.0
    }
}

impl From<&str> for GroupKey {
    fn from(value: &str) -> Self {
        Self::single(value)
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.pad("All");
        }
        f.pad(&self.0.join(" / "))
    }
}

/// Summed units for one (group, period) cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Totals {
    /// Electric units sold.
    pub units_sold: f64,
    /// All units sold.
    pub total_units: f64,
}

impl Totals {
    /// Value of the given measure.
    pub fn value(&self, measure: Measure) -> f64 {
        match measure {
            Measure::Electric => self.units_sold,
            Measure::Total => self.total_units,
            Measure::NonElectric => (self.total_units - self.units_sold).max(0.0),
        }
    }

    fn add(&mut self, record: &SalesRecord) {
        self.units_sold += record.units_sold;
        self.total_units += record.total_units.unwrap_or(0.0);
    }
}

/// Aggregated units keyed by (group, period).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PeriodAggregates {
    fields: Vec<GroupField>,
    cells: BTreeMap<GroupKey, BTreeMap<Period, Totals>>,
}

/// Sum units per (group, period).
///
/// `group_by` may be empty, which yields one group per period. Naming the
/// same field twice is rejected.
pub fn aggregate_by_period<'a, I>(records: I, group_by: &[GroupField]) -> Result<PeriodAggregates>
where
    I: IntoIterator<Item = &'a SalesRecord>,
{
    let mut seen = BTreeSet::new();
    for field in group_by {
        if !seen.insert(*field as u8) {
            return Err(MetricsError::MismatchedGroupKeys(format!(
                "{field:?} listed more than once"
            )));
        }
    }

    let mut cells: BTreeMap<GroupKey, BTreeMap<Period, Totals>> = BTreeMap::new();
    for record in records {
        let key = GroupKey(group_by.iter().map(|f| f.extract(record)).collect());
        cells
            .entry(key)
            .or_default()
            .entry(record.period)
            .or_default()
            .add(record);
    }

    Ok(PeriodAggregates {
        fields: group_by.to_vec(),
        cells,
    })
}

impl PeriodAggregates {
    /// Fields the aggregates are grouped by.
    pub fn fields(&self) -> &[GroupField] {
        &self.fields
    }

    /// Number of (group, period) cells.
    pub fn len(&self) -> usize {
        self.cells.values().map(BTreeMap::len).sum()
    }

    /// Whether there are no cells.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Totals for one cell.
    pub fn get(&self, key: &GroupKey, period: Period) -> Option<&Totals> {
        self.cells.get(key).and_then(|periods| periods.get(&period))
    }

    /// All cells ordered by group then period.
    pub fn iter(&self) -> impl Iterator<Item = (&GroupKey, Period, &Totals)> + '_ {
        self.cells
            .iter()
            .flat_map(|(key, periods)| periods.iter().map(move |(p, t)| (key, *p, t)))
    }

    /// Groups, sorted.
    pub fn groups(&self) -> impl Iterator<Item = &GroupKey> + '_ {
        self.cells.keys()
    }

    /// Distinct periods across all groups, sorted.
    pub fn periods(&self) -> BTreeSet<Period> {
        self.cells
            .values()
            .flat_map(|periods| periods.keys().copied())
            .collect()
    }

    /// Period-ordered series of one group.
    pub fn series(&self, key: &GroupKey, measure: Measure) -> Vec<(Period, f64)> {
        self.cells
            .get(key)
            .map(|periods| {
                periods
                    .iter()
                    .map(|(p, t)| (*p, t.value(measure)))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Value of every group that has data in `period`.
    pub fn period_values(&self, period: Period, measure: Measure) -> Vec<(GroupKey, f64)> {
        self.cells
            .iter()
            .filter_map(|(key, periods)| {
                periods
                    .get(&period)
                    .map(|t| (key.clone(), t.value(measure)))
            })
            .collect()
    }

    /// Value of every group summed over all periods.
    pub fn group_totals(&self, measure: Measure) -> Vec<(GroupKey, f64)> {
        self.cells
            .iter()
            .map(|(key, periods)| {
                let sum = periods.values().map(|t| t.value(measure)).sum();
                (key.clone(), sum)
            })
            .collect()
    }

    /// Keep only the given groups.
    pub fn retain_groups(&mut self, keep: &BTreeSet<GroupKey>) {
        self.cells.retain(|key, _| keep.contains(key));
    }

    /// Groups as rows and the given periods as columns.
    ///
    /// Cells without data are `None`.
    pub fn pivot(&self, periods: &[Period], measure: Measure) -> Pivot {
        let rows = self
            .cells
            .iter()
            .map(|(key, cells)| PivotRow {
                entity: key.clone(),
                values: periods
                    .iter()
                    .map(|p| cells.get(p).map(|t| t.value(measure)))
                    .collect(),
            })
            .collect();

        Pivot {
            periods: periods.to_vec(),
            rows,
        }
    }
}

/// Every period from `start` to `end` inclusive.
pub fn period_span(start: Period, end: Period) -> Result<Vec<Period>> {
    let steps = start.periods_until(&end).ok_or_else(|| {
        MetricsError::InvalidPeriodRange(format!("{start} and {end} are different period kinds"))
    })?;
    if steps < 0 {
        return Err(MetricsError::InvalidPeriodRange(format!(
            "{end} is before {start}"
        )));
    }

    let mut periods = Vec::with_capacity(steps as usize + 1);
    let mut current = start;
    periods.push(current);
    for _ in 0..steps {
        current = current.next();
        periods.push(current);
    }
    Ok(periods)
}

/// Groups by periods table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pivot {
    /// Column periods.
    pub periods: Vec<Period>,
    /// One row per group.
    pub rows: Vec<PivotRow>,
}

/// One row of a [`Pivot`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PivotRow {
    /// Group.
    pub entity: GroupKey,
    /// Value per column period.
    pub values: Vec<Option<f64>>,
}

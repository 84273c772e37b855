//! Growth Metrics Engine
//!
//! A configured facade over the metric functions. The configuration fixes
//! the measure, the group-by fields and the tie-break once, so callers only
//! pass data and periods.
//!
//! The engine holds no data. Each call recomputes from its inputs, so the
//! same inputs always give the same outputs.

use crate::aggregate::{GroupField, GroupKey, Measure, PeriodAggregates, aggregate_by_period};
use crate::cagr::{GrowthResult, cagr_between};
use crate::error::Result;
use crate::penetration::{PenetrationChange, penetration_changes, penetration_in};
use crate::projection::{Projection, project_growth};
use crate::rank::{Direction, Ranking, TieBreak, bottom_n_by_cagr, top_n_by_cagr, top_n_by_value};
use crate::seasonality::{Seasonality, seasonality};
use crate::share::{market_share, market_share_delta};
use crate::yoy::{YearOverYear, year_over_year};
use evgrowth_data::{Period, SalesRecord};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Units every growth, share and ranking metric is computed over.
    pub measure: Measure,

    /// Fields records are grouped by.
    pub group_by: Vec<GroupField>,

    /// Ordering of equal CAGRs.
    pub tie_break: TieBreak,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            measure: Measure::Electric,
            group_by: vec![GroupField::Entity],
            tie_break: TieBreak::FirstSeen,
        }
    }
}

/// Growth analytics over per-period sales aggregates.
///
/// # Examples
///
/// ```
/// use evgrowth_data::{Period, SalesRecord};
/// use evgrowth_metrics::GrowthMetricsEngine;
///
/// let records = vec![
///     SalesRecord::new("Kerala", Period::Year(2022), 100.0),
///     SalesRecord::new("Kerala", Period::Year(2024), 400.0),
/// ];
/// let engine = GrowthMetricsEngine::new();
/// let aggs = engine.aggregate(&records).unwrap();
/// let growth = engine.cagr(&aggs, Period::Year(2022), Period::Year(2024)).unwrap();
/// assert_eq!(growth[0].rank, Some(1));
/// ```
#[derive(Debug, Clone, Default)]
pub struct GrowthMetricsEngine {
    config: EngineConfig,
}

impl GrowthMetricsEngine {
    /// Create an engine with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an engine with the given configuration.
    pub const fn with_config(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Active configuration.
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Sum units per (group, period) using the configured group-by fields.
    pub fn aggregate<'a, I>(&self, records: I) -> Result<PeriodAggregates>
    where
        I: IntoIterator<Item = &'a SalesRecord>,
    {
        let aggregates = aggregate_by_period(records, &self.config.group_by)?;
        tracing::debug!(
            groups = aggregates.groups().count(),
            cells = aggregates.len(),
            "aggregated records"
        );
        Ok(aggregates)
    }

    /// CAGR of every group between two periods, ranked.
    ///
    /// # Arguments
    /// * `aggregates` - Output of [`Self::aggregate`]
    /// * `start` - First period
    /// * `end` - Last period, strictly after `start`
    pub fn cagr(
        &self,
        aggregates: &PeriodAggregates,
        start: Period,
        end: Period,
    ) -> Result<Vec<GrowthResult>> {
        cagr_between(
            aggregates,
            self.config.measure,
            start,
            end,
            self.config.tie_break,
        )
    }

    /// The `n` fastest-growing groups.
    pub fn top_n(&self, results: &[GrowthResult], n: usize) -> Result<Ranking> {
        top_n_by_cagr(results, n, self.config.tie_break)
    }

    /// The `n` slowest-growing groups, slowest first.
    pub fn bottom_n(&self, results: &[GrowthResult], n: usize) -> Result<Ranking> {
        bottom_n_by_cagr(results, n, self.config.tie_break)
    }

    /// The `n` largest or smallest groups by volume.
    ///
    /// # Arguments
    /// * `aggregates` - Output of [`Self::aggregate`]
    /// * `period` - Only this period, or all periods summed when `None`
    /// * `n` - Number of groups to return
    /// * `direction` - Largest or smallest first
    pub fn top_groups_by_volume(
        &self,
        aggregates: &PeriodAggregates,
        period: Option<Period>,
        n: usize,
        direction: Direction,
    ) -> Result<Vec<(GroupKey, f64)>> {
        let values = match period {
            Some(period) => aggregates.period_values(period, self.config.measure),
            None => aggregates.group_totals(self.config.measure),
        };
        top_n_by_value(values, n, direction)
    }

    /// Period-ordered series of one group.
    pub fn series(&self, aggregates: &PeriodAggregates, key: &GroupKey) -> Vec<(Period, f64)> {
        aggregates.series(key, self.config.measure)
    }

    /// Consecutive-period changes of a series.
    pub fn year_over_year<'s>(&self, series: &'s [(Period, f64)]) -> YearOverYear<'s> {
        year_over_year(series)
    }

    /// Each group's share of the `period` total, in percent.
    pub fn market_share(
        &self,
        aggregates: &PeriodAggregates,
        period: Period,
    ) -> BTreeMap<GroupKey, f64> {
        market_share(aggregates.period_values(period, self.config.measure))
    }

    /// Share change in percentage points from `before` to `after`.
    pub fn market_share_delta(
        &self,
        aggregates: &PeriodAggregates,
        before: Period,
        after: Period,
    ) -> BTreeMap<GroupKey, f64> {
        market_share_delta(
            &self.market_share(aggregates, before),
            &self.market_share(aggregates, after),
        )
    }

    /// Penetration change of every group between two periods.
    pub fn penetration_changes(
        &self,
        aggregates: &PeriodAggregates,
        from: Period,
        to: Period,
    ) -> Result<Vec<PenetrationChange>> {
        penetration_changes(aggregates, from, to)
    }

    /// Penetration of every group with data in `period`.
    pub fn penetration_in(
        &self,
        aggregates: &PeriodAggregates,
        period: Period,
    ) -> Vec<(GroupKey, Option<f64>)> {
        penetration_in(aggregates, period)
    }

    /// The `n` groups with the highest or lowest penetration in `period`.
    ///
    /// Groups without total units have no rate and are never ranked.
    pub fn top_groups_by_penetration(
        &self,
        aggregates: &PeriodAggregates,
        period: Period,
        n: usize,
        direction: Direction,
    ) -> Result<Vec<(GroupKey, f64)>> {
        let rates = penetration_in(aggregates, period)
            .into_iter()
            .filter_map(|(key, rate)| rate.map(|r| (key, r)));
        top_n_by_value(rates, n, direction)
    }

    /// Month-of-year profile of the records, months listed from
    /// `first_month`.
    pub fn seasonality<'a, I>(&self, records: I, first_month: u32) -> Option<Seasonality>
    where
        I: IntoIterator<Item = &'a SalesRecord>,
    {
        seasonality(records, self.config.measure, first_month)
    }

    /// Compound each group's `base` value forward to `target` at its CAGR.
    pub fn project(
        &self,
        results: &[GrowthResult],
        aggregates: &PeriodAggregates,
        base: Period,
        target: Period,
    ) -> Result<Vec<Projection>> {
        project_growth(results, aggregates, self.config.measure, base, target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use evgrowth_data::{Category, RecordFilter};

    fn records() -> Vec<SalesRecord> {
        vec![
            SalesRecord::new("OLA", Period::Year(2023), 200.0).with_total(400.0),
            SalesRecord::new("OLA", Period::Year(2024), 300.0).with_total(500.0),
            SalesRecord::new("TVS", Period::Year(2023), 100.0).with_total(1000.0),
            SalesRecord::new("TVS", Period::Year(2024), 300.0).with_total(1000.0),
        ]
    }

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.measure, Measure::Electric);
        assert_eq!(config.group_by, [GroupField::Entity]);
        assert_eq!(config.tie_break, TieBreak::FirstSeen);
    }

    #[test]
    fn test_config_from_partial_json() {
        let config: EngineConfig = serde_json::from_str(r#"{"measure": "total"}"#).unwrap();
        assert_eq!(config.measure, Measure::Total);
        assert_eq!(config.group_by, [GroupField::Entity]);
    }

    #[test]
    fn test_measure_switch() {
        let engine = GrowthMetricsEngine::with_config(EngineConfig {
            measure: Measure::Total,
            ..EngineConfig::default()
        });
        let aggs = engine.aggregate(&records()).unwrap();
        let growth = engine
            .cagr(&aggs, Period::Year(2023), Period::Year(2024))
            .unwrap();
        assert_relative_eq!(growth[0].cagr_percent.unwrap(), 25.0, epsilon = 1e-9);
        assert_relative_eq!(growth[1].cagr_percent.unwrap(), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_share_delta() {
        let engine = GrowthMetricsEngine::new();
        let aggs = engine.aggregate(&records()).unwrap();
        let delta = engine.market_share_delta(&aggs, Period::Year(2023), Period::Year(2024));
        let ola = delta[&GroupKey::single("OLA")];
        assert_relative_eq!(ola, 50.0 - 200.0 / 3.0, epsilon = 1e-9);
    }

    #[test]
    fn test_volume_ranking() {
        let engine = GrowthMetricsEngine::new();
        let aggs = engine.aggregate(&records()).unwrap();
        let top = engine
            .top_groups_by_volume(&aggs, None, 1, Direction::Top)
            .unwrap();
        assert_eq!(top, [(GroupKey::single("OLA"), 500.0)]);

        let low = engine
            .top_groups_by_volume(&aggs, Some(Period::Year(2023)), 1, Direction::Bottom)
            .unwrap();
        assert_eq!(low, [(GroupKey::single("TVS"), 100.0)]);
    }

    #[test]
    fn test_penetration_ranking_per_category() {
        let mut records = records();
        records.push(SalesRecord::new("Ather", Period::Year(2024), 50.0));
        let records: Vec<SalesRecord> = records
            .into_iter()
            .map(|r| r.with_category(Category::TwoWheelers))
            .chain([
                SalesRecord::new("Tata", Period::Year(2024), 90.0)
                    .with_total(100.0)
                    .with_category(Category::FourWheelers),
            ])
            .collect();

        let engine = GrowthMetricsEngine::new();
        let two_wheelers = RecordFilter::all().category(Category::TwoWheelers);
        let aggs = engine
            .aggregate(records.iter().filter(|r| two_wheelers.matches(r)))
            .unwrap();

        let top = engine
            .top_groups_by_penetration(&aggs, Period::Year(2024), 5, Direction::Top)
            .unwrap();
        let names: Vec<String> = top.iter().map(|(k, _)| k.to_string()).collect();
        assert_eq!(names, ["OLA", "TVS"]);
        assert_relative_eq!(top[0].1, 60.0);
        assert_relative_eq!(top[1].1, 30.0);

        let rates = engine.penetration_in(&aggs, Period::Year(2024));
        assert_eq!(rates.len(), 3);
        assert!(rates.contains(&(GroupKey::single("Ather"), None)));

        let bottom = engine
            .top_groups_by_penetration(&aggs, Period::Year(2024), 1, Direction::Bottom)
            .unwrap();
        assert_eq!(bottom, [(GroupKey::single("TVS"), 30.0)]);
    }
}

//! Subcommand handlers.
//!
//! Every handler aggregates the filtered records with the configured engine,
//! computes one report and hands it to [`Context::emit`].

use evgrowth::data::{Dataset, Period, RecordFilter};
use evgrowth::metrics::{
    Direction, GroupKey, GrowthMetricsEngine, PeriodAggregates, declines, period_span,
};
use evgrowth::output::{
    ExportError, ExportFormat, Exporter, PenetrationRankRow, ShareRow, ToTable, VolumeRow, YoyRow,
};
use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// Year projections target when none is given.
pub(crate) const DEFAULT_TARGET_YEAR: i32 = 2030;

/// Errors raised by the subcommands themselves.
#[derive(Debug, Error)]
pub(crate) enum CommandError {
    /// Nothing left after filtering.
    #[error("no sales data matches the selection")]
    NoData,

    /// `yoy` was asked for an entity that is not in the data.
    #[error("unknown entity: {0}")]
    UnknownEntity(String),

    /// Seasonality needs record dates.
    #[error("no dated records: seasonality needs a date column")]
    NoDates,
}

/// How reports are written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub(crate) enum OutputFormat {
    /// Fixed-width text table
    #[default]
    Table,
    /// Markdown table
    Markdown,
    /// CSV rows
    Csv,
    /// Pretty-printed JSON
    Json,
}

/// Render a report in the given format.
pub(crate) fn render<T>(report: &T, format: OutputFormat) -> Result<String, ExportError>
where
    T: Exporter + ToTable + ?Sized,
{
    let mut text = match format {
        OutputFormat::Table => report.to_table().to_ascii_table(),
        OutputFormat::Markdown => report.to_table().to_markdown(),
        OutputFormat::Csv => report.export_to_string(ExportFormat::Csv)?,
        OutputFormat::Json => report.export_to_string(ExportFormat::PrettyJson)?,
    };
    if !text.ends_with('\n') {
        text.push('\n');
    }
    Ok(text)
}

/// Default projection target in the same period kind as `base`.
pub(crate) const fn default_target(base: Period) -> Period {
    match base {
        Period::Year(_) => Period::Year(DEFAULT_TARGET_YEAR),
        Period::Quarter { .. } => Period::Quarter {
            year: DEFAULT_TARGET_YEAR,
            quarter: 4,
        },
    }
}

/// Loaded data plus the settings shared by every subcommand.
#[derive(Debug)]
pub(crate) struct Context {
    pub(crate) dataset: Arc<Dataset>,
    pub(crate) filter: RecordFilter,
    pub(crate) engine: GrowthMetricsEngine,
    pub(crate) first_month: u32,
    pub(crate) format: OutputFormat,
    pub(crate) output: Option<PathBuf>,
}

type CommandResult = Result<(), Box<dyn Error>>;

impl Context {
    fn aggregates(&self) -> Result<PeriodAggregates, Box<dyn Error>> {
        let aggregates = self.engine.aggregate(self.dataset.filter(&self.filter))?;
        if aggregates.is_empty() {
            return Err(CommandError::NoData.into());
        }
        Ok(aggregates)
    }

    fn bounds(aggregates: &PeriodAggregates) -> Result<(Period, Period), CommandError> {
        let periods = aggregates.periods();
        match (periods.first(), periods.last()) {
            (Some(first), Some(last)) => Ok((*first, *last)),
            _ => Err(CommandError::NoData),
        }
    }

    fn emit<T>(&self, report: &T) -> CommandResult
    where
        T: Exporter + ToTable + ?Sized,
    {
        let text = render(report, self.format)?;
        match &self.output {
            Some(path) => {
                std::fs::write(path, text)?;
                info!(path = %path.display(), "wrote report");
            }
            None => print!("{text}"),
        }
        Ok(())
    }

    /// CAGR ranking between two periods, defaulting to the full range.
    pub(crate) fn cagr(
        &self,
        start: Option<Period>,
        end: Option<Period>,
        n: usize,
        bottom: bool,
    ) -> CommandResult {
        let aggregates = self.aggregates()?;
        let (first, last) = Self::bounds(&aggregates)?;
        let growth = self
            .engine
            .cagr(&aggregates, start.unwrap_or(first), end.unwrap_or(last))?;
        let ranking = if bottom {
            self.engine.bottom_n(&growth, n)?
        } else {
            self.engine.top_n(&growth, n)?
        };
        info!(
            ranked = ranking.ranked.len(),
            unranked = ranking.unranked.len(),
            "ranked groups"
        );
        self.emit(&ranking)
    }

    /// Consecutive-period changes for one entity or all of them.
    pub(crate) fn yoy(&self, entity: Option<&str>) -> CommandResult {
        let aggregates = self.aggregates()?;
        let keys: Vec<&GroupKey> = aggregates
            .groups()
            .filter(|key| {
                entity.is_none_or(|name| {
                    key.parts()
                        .first()
                        .is_some_and(|part| part.eq_ignore_ascii_case(name))
                })
            })
            .collect();
        if let (Some(name), true) = (entity, keys.is_empty()) {
            return Err(CommandError::UnknownEntity(name.to_string()).into());
        }

        let mut rows = Vec::new();
        for key in keys {
            let series = self.engine.series(&aggregates, key);
            rows.extend(YoyRow::for_entity(key, self.engine.year_over_year(&series)));
        }
        self.emit(rows.as_slice())
    }

    /// Market share in a period, optionally against an earlier one.
    pub(crate) fn share(
        &self,
        period: Option<Period>,
        compare: Option<Period>,
        top: Option<usize>,
    ) -> CommandResult {
        let aggregates = self.aggregates()?;
        let (_, last) = Self::bounds(&aggregates)?;
        let period = period.unwrap_or(last);
        let current = self.engine.market_share(&aggregates, period);

        let mut rows = match compare {
            Some(before) => {
                let previous = self.engine.market_share(&aggregates, before);
                let delta = self
                    .engine
                    .market_share_delta(&aggregates, before, period);
                ShareRow::compared(&current, &previous, &delta)
            }
            None => ShareRow::from_shares(&current),
        };
        if let Some(n) = top {
            rows.truncate(n);
        }
        self.emit(rows.as_slice())
    }

    /// Largest or smallest groups by volume.
    pub(crate) fn top(&self, period: Option<Period>, n: usize, bottom: bool) -> CommandResult {
        let aggregates = self.aggregates()?;
        let direction = if bottom {
            Direction::Bottom
        } else {
            Direction::Top
        };
        let values = self
            .engine
            .top_groups_by_volume(&aggregates, period, n, direction)?;
        self.emit(VolumeRow::from_values(&values).as_slice())
    }

    /// Penetration change between two periods, defaulting to the full range.
    pub(crate) fn penetration(
        &self,
        from: Option<Period>,
        to: Option<Period>,
        only_declines: bool,
    ) -> CommandResult {
        let aggregates = self.aggregates()?;
        let (first, last) = Self::bounds(&aggregates)?;
        let changes = self.engine.penetration_changes(
            &aggregates,
            from.unwrap_or(first),
            to.unwrap_or(last),
        )?;
        let changes = if only_declines {
            declines(&changes)
        } else {
            changes
        };
        self.emit(changes.as_slice())
    }

    /// Entities ranked by penetration within one period.
    pub(crate) fn penetration_ranking(&self, period: Period, n: usize, bottom: bool) -> CommandResult {
        let aggregates = self.aggregates()?;
        let direction = if bottom {
            Direction::Bottom
        } else {
            Direction::Top
        };
        let rates = self
            .engine
            .top_groups_by_penetration(&aggregates, period, n, direction)?;
        self.emit(PenetrationRankRow::from_rates(period, &rates).as_slice())
    }

    /// Month-of-year profile of the filtered records.
    pub(crate) fn seasonality(&self) -> CommandResult {
        let profile = self
            .engine
            .seasonality(self.dataset.filter(&self.filter), self.first_month)
            .ok_or(CommandError::NoDates)?;
        info!(peak = profile.peak_name(), low = profile.low_name(), "seasonality");
        self.emit(&profile)
    }

    /// Projection of the `end` value to `target` at the `start`..`end` CAGR.
    pub(crate) fn project(
        &self,
        start: Option<Period>,
        end: Option<Period>,
        target: Option<Period>,
        top: Option<usize>,
    ) -> CommandResult {
        let aggregates = self.aggregates()?;
        let (first, last) = Self::bounds(&aggregates)?;
        let end = end.unwrap_or(last);
        let growth = self
            .engine
            .cagr(&aggregates, start.unwrap_or(first), end)?;
        let target = target.unwrap_or(default_target(end));

        let mut projections = self.engine.project(&growth, &aggregates, end, target)?;
        if let Some(n) = top {
            projections.truncate(n);
        }
        self.emit(projections.as_slice())
    }

    /// Groups by periods table over the full range.
    pub(crate) fn pivot(&self) -> CommandResult {
        let aggregates = self.aggregates()?;
        let (first, last) = Self::bounds(&aggregates)?;
        let span = period_span(first, last)?;
        self.emit(&aggregates.pivot(&span, self.engine.config().measure))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use evgrowth::data::{Category, PeriodBasis, SalesRecord};
    use rstest::rstest;

    fn context(format: OutputFormat) -> Context {
        let dataset = Dataset::new(
            vec![
                SalesRecord::new("Kerala", Period::Year(2022), 100.0).with_total(1000.0),
                SalesRecord::new("Kerala", Period::Year(2024), 400.0).with_total(1000.0),
                SalesRecord::new("Goa", Period::Year(2022), 50.0).with_total(500.0),
                SalesRecord::new("Goa", Period::Year(2024), 50.0).with_total(500.0),
            ],
            PeriodBasis::Calendar,
        );
        Context {
            dataset: Arc::new(dataset),
            filter: RecordFilter::all(),
            engine: GrowthMetricsEngine::new(),
            first_month: 1,
            format,
            output: None,
        }
    }

    #[rstest]
    #[case(Period::Year(2024), Period::Year(2030))]
    #[case(Period::Quarter { year: 2024, quarter: 2 }, Period::Quarter { year: 2030, quarter: 4 })]
    fn test_default_target(#[case] base: Period, #[case] expected: Period) {
        assert_eq!(default_target(base), expected);
    }

    #[rstest]
    #[case(OutputFormat::Table, "Kerala")]
    #[case(OutputFormat::Markdown, "| Kerala |")]
    #[case(OutputFormat::Csv, "rank,entity")]
    #[case(OutputFormat::Json, "\"entity\"")]
    fn test_render_formats(#[case] format: OutputFormat, #[case] needle: &str) {
        let ctx = context(format);
        let aggregates = ctx.aggregates().unwrap();
        let growth = ctx
            .engine
            .cagr(&aggregates, Period::Year(2022), Period::Year(2024))
            .unwrap();
        let text = render(growth.as_slice(), format).unwrap();
        assert!(text.contains(needle), "{text}");
        assert!(text.ends_with('\n'));
    }

    fn category_context() -> Context {
        let two = |entity: &str, units: f64, total: f64| {
            SalesRecord::new(entity, Period::Year(2024), units)
                .with_total(total)
                .with_category(Category::TwoWheelers)
        };
        let dataset = Dataset::new(
            vec![
                two("Goa", 30.0, 100.0),
                two("Delhi", 10.0, 100.0),
                two("Kerala", 50.0, 100.0),
                SalesRecord::new("Delhi", Period::Year(2024), 90.0)
                    .with_total(100.0)
                    .with_category(Category::FourWheelers),
            ],
            PeriodBasis::Fiscal,
        );
        let path = std::env::temp_dir().join(format!(
            "evgrowth_cli_penetration_{}.csv",
            std::process::id()
        ));
        Context {
            dataset: Arc::new(dataset),
            filter: RecordFilter::all().category(Category::TwoWheelers),
            engine: GrowthMetricsEngine::new(),
            first_month: 4,
            format: OutputFormat::Csv,
            output: Some(path),
        }
    }

    #[test]
    fn test_penetration_ranking_with_category_filter() {
        let ctx = category_context();
        ctx.penetration_ranking(Period::Year(2024), 2, false).unwrap();

        let path = ctx.output.clone().unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            text,
            "position,entity,period,penetration_percent\n1,Kerala,2024,50.0\n2,Goa,2024,30.0\n"
        );

        ctx.penetration_ranking(Period::Year(2024), 1, true).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("1,Delhi,2024,10.0"));
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_unknown_entity() {
        let err = context(OutputFormat::Csv).yoy(Some("Atlantis")).unwrap_err();
        assert_eq!(err.to_string(), "unknown entity: Atlantis");
    }

    #[test]
    fn test_category_filter_can_empty_the_data() {
        let mut ctx = context(OutputFormat::Table);
        ctx.filter = RecordFilter::all().category("4-Wheelers".parse().unwrap());
        let err = ctx.cagr(None, None, 5, false).unwrap_err();
        assert_eq!(err.to_string(), CommandError::NoData.to_string());
    }

    #[test]
    fn test_seasonality_needs_dates() {
        let err = context(OutputFormat::Table).seasonality().unwrap_err();
        assert!(err.to_string().starts_with("no dated records"));
    }

    #[test]
    fn test_report_written_to_file() {
        let path = std::env::temp_dir().join("evgrowth_cli_share_test.csv");
        let mut ctx = context(OutputFormat::Csv);
        ctx.output = Some(path.clone());
        ctx.share(None, Some(Period::Year(2022)), None).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("entity,share_percent"));
        assert!(text.contains("Kerala,88.88"));
        std::fs::remove_file(&path).ok();
    }
}

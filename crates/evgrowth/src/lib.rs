#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Re-export the workspace crates
pub use evgrowth_data as data;
pub use evgrowth_metrics as metrics;
pub use evgrowth_output as output;

// Re-export the types most callers start from
pub use evgrowth_data::{Dataset, LoadOptions, Period, PeriodBasis, SalesRecord};
pub use evgrowth_metrics::{EngineConfig, GrowthMetricsEngine, GrowthResult, Measure};
pub use evgrowth_output::{ExportFormat, Exporter, ToTable};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[rstest]
    #[case(PeriodBasis::Calendar)]
    #[case(PeriodBasis::Fiscal)]
    fn test_reexports_compose(#[case] basis: PeriodBasis) {
        let dataset = Dataset::new(
            vec![
                SalesRecord::new("A", Period::Year(2023), 10.0),
                SalesRecord::new("A", Period::Year(2024), 20.0),
            ],
            basis,
        );
        let engine = GrowthMetricsEngine::new();
        let aggs = engine.aggregate(dataset.records()).unwrap();
        let growth = engine
            .cagr(&aggs, Period::Year(2023), Period::Year(2024))
            .unwrap();
        let csv = growth.export_to_string(ExportFormat::Csv).unwrap();
        assert!(csv.contains("A,2023,2024,10.0,20.0,100.0,"));
    }
}

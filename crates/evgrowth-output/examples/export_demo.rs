//! Demonstration of tables, exports and DataFrames on generated data.

use evgrowth_data::{DemoConfig, FISCAL_YEAR_START_MONTH, Period, PeriodBasis, generate_demo};
use evgrowth_metrics::{GrowthMetricsEngine, period_span};
use evgrowth_output::{ExportFormat, Exporter, ToTable, growth_frame, pivot_frame};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== evgrowth Export Demo ===\n");

    let config = DemoConfig {
        entities: 6,
        ..DemoConfig::default()
    };
    let dataset = generate_demo(&config, PeriodBasis::Fiscal, FISCAL_YEAR_START_MONTH);
    let engine = GrowthMetricsEngine::new();
    let aggs = engine.aggregate(dataset.records())?;

    let growth = engine.cagr(&aggs, Period::Year(2022), Period::Year(2024))?;
    let ranking = engine.top_n(&growth, 3)?;

    println!("1. ASCII table");
    println!("{}", ranking.to_table().to_ascii_table());

    println!("2. Markdown");
    println!("{}", ranking.to_table().to_markdown());

    println!("3. CSV");
    println!("{}", growth.export_to_string(ExportFormat::Csv)?);

    println!("4. JSON");
    println!("{}\n", ranking.export_to_string(ExportFormat::PrettyJson)?);

    println!("5. DataFrames");
    println!("{}", growth_frame(&growth)?);
    let span = period_span(Period::Year(2022), Period::Year(2024))?;
    println!("{}", pivot_frame(&aggs.pivot(&span, engine.config().measure))?);

    let path = std::env::temp_dir().join(format!("evgrowth_demo.{}", ExportFormat::Csv.extension()));
    growth.export_to_file(&path, ExportFormat::Csv)?;
    println!("\nWrote {}", path.display());

    Ok(())
}

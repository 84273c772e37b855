//! Walk through the growth metrics on generated data.
//!
//! ```sh
//! cargo run -p evgrowth-metrics --example growth_demo
//! ```

use evgrowth_data::{DemoConfig, FISCAL_YEAR_START_MONTH, Period, PeriodBasis, generate_demo};
use evgrowth_metrics::{Direction, GrowthMetricsEngine, declines};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("==========================================================");
    println!("              EV Growth Metrics - Demo");
    println!("==========================================================\n");

    let dataset = generate_demo(
        &DemoConfig::default(),
        PeriodBasis::Fiscal,
        FISCAL_YEAR_START_MONTH,
    );
    let engine = GrowthMetricsEngine::new();
    let aggs = engine.aggregate(dataset.records())?;
    let (start, end) = (Period::Year(2022), Period::Year(2024));

    println!("Top 5 by CAGR, FY{start} to FY{end}");
    let growth = engine.cagr(&aggs, start, end)?;
    for r in engine.top_n(&growth, 5)?.ranked {
        let rank = r.rank.unwrap_or_default();
        let cagr = r.cagr_percent.unwrap_or_default();
        println!("  {rank:>2}. {:<12} {cagr:>8.2}%", r.entity);
    }

    println!("\nBiggest sellers in FY{end}");
    for (entity, units) in engine.top_groups_by_volume(&aggs, Some(end), 3, Direction::Top)? {
        println!("  {entity:<12} {units:>12.0}");
    }

    println!("\nMarket share change, FY{start} to FY{end}");
    let mut delta: Vec<_> = engine.market_share_delta(&aggs, start, end).into_iter().collect();
    delta.sort_by(|a, b| b.1.total_cmp(&a.1));
    for (entity, pp) in delta.iter().take(3) {
        println!("  {entity:<12} {pp:>+8.2} pp");
    }

    println!("\nPenetration declines");
    let changes = engine.penetration_changes(&aggs, start, end)?;
    for c in declines(&changes).iter().take(3) {
        println!(
            "  {:<12} {:>6.2}% -> {:>6.2}% ({:+.2} pp)",
            c.entity, c.from_rate, c.to_rate, c.change
        );
    }

    if let Some(profile) = engine.seasonality(dataset.records(), FISCAL_YEAR_START_MONTH) {
        println!(
            "\nPeak month {} ({:+.1}% vs average), low month {} ({:+.1}%)",
            profile.peak_name(),
            profile.peak_vs_avg_pct,
            profile.low_name(),
            profile.low_vs_avg_pct
        );
    }

    println!("\nProjected FY2030 sales");
    for p in engine
        .project(&growth, &aggs, end, Period::Year(2030))?
        .iter()
        .take(3)
    {
        println!("  {:<12} {:>14.0}", p.entity, p.projected);
    }

    Ok(())
}

//! evgrowth CLI binary.
//!
//! Growth, share, penetration and projection reports over EV sales data.

mod commands;
mod config;

use clap::{Parser, Subcommand};
use commands::{Context, OutputFormat};
use config::{Config, Layout};
use evgrowth::data::{Category, Period, PeriodBasis, RecordFilter, global_cache};
use evgrowth::metrics::{GroupField, GrowthMetricsEngine, Measure};
use std::path::PathBuf;
use std::process;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser)]
#[command(name = "evgrowth")]
#[command(about = "evgrowth: growth metrics for EV sales data", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Sales CSV file
    #[arg(long, global = true)]
    data: Option<PathBuf>,

    /// Column layout of the data file
    #[arg(long, global = true, value_enum)]
    layout: Option<Layout>,

    /// Period bucketing (calendar, fiscal or quarter)
    #[arg(long, global = true)]
    basis: Option<PeriodBasis>,

    /// Only records of this vehicle category (e.g. 2-Wheelers)
    #[arg(long, global = true)]
    category: Option<Category>,

    /// Units to measure (electric, total or non_electric)
    #[arg(long, global = true)]
    measure: Option<Measure>,

    /// Group by vehicle category as well as entity
    #[arg(long, global = true)]
    by_category: bool,

    /// Use generated demo data instead of a file
    #[arg(long, global = true)]
    demo: bool,

    /// Configuration file (default: <config_dir>/evgrowth/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    /// Write the report to a file instead of stdout
    #[arg(long, short, global = true)]
    output: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Rank entities by compound annual growth rate
    Cagr {
        /// First period (default: earliest in the data)
        #[arg(long)]
        start: Option<Period>,

        /// Last period (default: latest in the data)
        #[arg(long)]
        end: Option<Period>,

        /// Number of entities to rank
        #[arg(long, short = 'n', default_value = "10")]
        top: usize,

        /// Slowest growers instead of fastest
        #[arg(long)]
        bottom: bool,
    },

    /// Period-over-period change
    Yoy {
        /// Only this entity
        entity: Option<String>,
    },

    /// Market share in a period
    Share {
        /// Period (default: latest in the data)
        #[arg(long)]
        period: Option<Period>,

        /// Also show the share change since this period
        #[arg(long)]
        compare: Option<Period>,

        /// Only the largest N entities
        #[arg(long, short = 'n')]
        top: Option<usize>,
    },

    /// Largest or smallest entities by sales volume
    Top {
        /// Period (default: all periods summed)
        #[arg(long)]
        period: Option<Period>,

        /// Number of entities
        #[arg(long, short = 'n', default_value = "3")]
        top: usize,

        /// Smallest instead of largest
        #[arg(long)]
        bottom: bool,
    },

    /// EV penetration change between two periods, or a ranking within one
    Penetration {
        /// First period (default: earliest in the data)
        #[arg(long)]
        from: Option<Period>,

        /// Last period (default: latest in the data)
        #[arg(long)]
        to: Option<Period>,

        /// Only entities whose penetration fell
        #[arg(long)]
        declines: bool,

        /// Rank entities by penetration within this period instead
        #[arg(long, conflicts_with_all = ["from", "to", "declines"])]
        period: Option<Period>,

        /// Number of entities to rank with --period
        #[arg(long, short = 'n', default_value = "5")]
        top: usize,

        /// Lowest penetration first, with --period
        #[arg(long)]
        bottom: bool,
    },

    /// Month-of-year sales profile with peak and low months
    Seasonality,

    /// Project sales forward at each entity's CAGR
    Project {
        /// First period of the growth window (default: earliest)
        #[arg(long)]
        start: Option<Period>,

        /// Last period of the growth window and projection base (default: latest)
        #[arg(long)]
        end: Option<Period>,

        /// Projection target (default: 2030)
        #[arg(long)]
        target: Option<Period>,

        /// Only the largest N projections
        #[arg(long, short = 'n')]
        top: Option<usize>,
    },

    /// Entity by period table of sales
    Pivot,
}

fn main() {
    init_tracing();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Logs go to stderr so piped reports stay clean.
/// `EVGROWTH_LOG_FORMAT=json` switches to JSON lines.
fn init_tracing() {
    let log_format = std::env::var("EVGROWTH_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "evgrowth=info".into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(std::io::stderr),
                )
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }
}

/// Command-line flags take precedence over the configuration file.
fn apply_flags(mut config: Config, cli: &Cli) -> Config {
    if let Some(data) = &cli.data {
        config.data = Some(data.clone());
        config.demo = false;
    }
    if cli.demo {
        config.demo = true;
    }
    if let Some(layout) = cli.layout {
        config.layout = layout;
    }
    if let Some(basis) = cli.basis {
        config.basis = basis;
    }
    if let Some(measure) = cli.measure {
        config.engine.measure = measure;
    }
    if cli.by_category && !config.engine.group_by.contains(&GroupField::Category) {
        config.engine.group_by.push(GroupField::Category);
    }
    config
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = apply_flags(Config::load(cli.config.as_deref())?, &cli);
    let options = config.load_options()?;
    let dataset = global_cache(options).get_or_load()?;
    tracing::info!(
        records = dataset.len(),
        entities = dataset.entities().len(),
        basis = %dataset.basis(),
        "dataset ready"
    );

    let filter = match &cli.category {
        Some(category) => RecordFilter::all().category(category.clone()),
        None => RecordFilter::all(),
    };

    let ctx = Context {
        dataset,
        filter,
        engine: GrowthMetricsEngine::with_config(config.engine.clone()),
        first_month: config.first_month(),
        format: cli.format,
        output: cli.output.clone(),
    };

    match cli.command {
        Commands::Cagr {
            start,
            end,
            top,
            bottom,
        } => ctx.cagr(start, end, top, bottom),
        Commands::Yoy { entity } => ctx.yoy(entity.as_deref()),
        Commands::Share {
            period,
            compare,
            top,
        } => ctx.share(period, compare, top),
        Commands::Top {
            period,
            top,
            bottom,
        } => ctx.top(period, top, bottom),
        Commands::Penetration {
            period: Some(period),
            top,
            bottom,
            ..
        } => ctx.penetration_ranking(period, top, bottom),
        Commands::Penetration {
            from, to, declines, ..
        } => ctx.penetration(from, to, declines),
        Commands::Seasonality => ctx.seasonality(),
        Commands::Project {
            start,
            end,
            target,
            top,
        } => ctx.project(start, end, target, top),
        Commands::Pivot => ctx.pivot(),
    }
}

#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod aggregate;
pub mod cagr;
pub mod engine;
pub mod error;
pub mod penetration;
pub mod projection;
pub mod rank;
pub mod seasonality;
pub mod share;
pub mod yoy;

pub use aggregate::{
    GroupField, GroupKey, Measure, PeriodAggregates, Pivot, PivotRow, Totals, aggregate_by_period,
    period_span,
};
pub use cagr::{DataGap, GrowthResult, cagr_between, compute_cagr};
pub use engine::{EngineConfig, GrowthMetricsEngine};
pub use error::{MetricsError, Result};
pub use penetration::{
    PenetrationChange, declines, penetration_changes, penetration_in, penetration_rate,
};
pub use projection::{Projection, project, project_growth};
pub use rank::{
    Direction, Ranking, TieBreak, assign_ranks, bottom_n_by_cagr, top_n_by_cagr, top_n_by_value,
};
pub use seasonality::{MonthlySales, Seasonality, seasonality};
pub use share::{market_share, market_share_delta};
pub use yoy::{PctChange, YearOverYear, YoyChange, pct_change, year_over_year};

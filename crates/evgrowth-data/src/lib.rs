#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod cache;
pub mod demo;
pub mod error;
pub mod loader;
pub mod period;
pub mod record;
pub mod schema;

pub use cache::{DatasetCache, global_cache};
pub use demo::{DemoConfig, generate_demo};
pub use error::{DataError, Result};
pub use loader::{DataSource, LoadOptions, load, read_csv};
pub use period::{FISCAL_YEAR_START_MONTH, Period, PeriodBasis, fiscal_year};
pub use record::{Category, Dataset, RecordFilter, SalesRecord};
pub use schema::{ColumnIndex, Schema};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

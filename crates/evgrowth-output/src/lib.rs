#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod export;
pub mod frame;
pub mod table;

pub use export::{
    ExportError, ExportFormat, Exporter, GrowthRow, PenetrationRankRow, PenetrationRow,
    ProjectionRow, ShareRow, VolumeRow, YoyRow,
};
pub use frame::{growth_frame, penetration_frame, pivot_frame, projection_frame, share_frame};
pub use table::{NOT_AVAILABLE, Table, ToTable, format_percent, format_value};

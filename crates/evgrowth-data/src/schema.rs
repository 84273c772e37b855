//! Column schema for sales files.
//!
//! Header names are resolved to column positions once per file. Everything
//! after that works on positions, so a misspelt column fails the load up
//! front instead of surfacing as missing values later.

use crate::error::{DataError, Result};
use csv::StringRecord;
use serde::{Deserialize, Serialize};

/// Names of the columns a sales file must provide.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Schema {
    /// Date column.
    pub date_column: String,
    /// Entity column (state or manufacturer).
    pub entity_column: String,
    /// Electric units sold.
    pub units_column: String,
    /// Total units sold, if the file carries it.
    pub total_column: Option<String>,
    /// Vehicle segment, if the file carries it.
    pub category_column: Option<String>,
}

impl Schema {
    /// Layout of the state-level sales file.
    pub fn by_state() -> Self {
        Self {
            date_column: "date".to_string(),
            entity_column: "state".to_string(),
            units_column: "electric_vehicles_sold".to_string(),
            total_column: Some("total_vehicles_sold".to_string()),
            category_column: Some("vehicle_category".to_string()),
        }
    }

    /// Layout of the manufacturer-level sales file.
    pub fn by_maker() -> Self {
        Self {
            date_column: "date".to_string(),
            entity_column: "maker".to_string(),
            units_column: "electric_vehicles_sold".to_string(),
            total_column: None,
            category_column: Some("vehicle_category".to_string()),
        }
    }

    /// Resolve the schema against a header row.
    pub fn resolve(&self, headers: &StringRecord) -> Result<ColumnIndex> {
        let find = |name: &str| -> Result<usize> {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
                .ok_or_else(|| DataError::MissingColumn {
                    column: name.to_string(),
                })
        };

        Ok(ColumnIndex {
            date: find(self.date_column.as_str())?,
            entity: find(self.entity_column.as_str())?,
            units: find(self.units_column.as_str())?,
            total: self.total_column.as_deref().map(find).transpose()?,
            category: self.category_column.as_deref().map(find).transpose()?,
        })
    }
}

impl Default for Schema {
    fn default() -> Self {
        Self::by_state()
    }
}

/// Column positions of a validated header row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnIndex {
    /// Date column position.
    pub date: usize,
    /// Entity column position.
    pub entity: usize,
    /// Electric units column position.
    pub units: usize,
    /// Total units column position.
    pub total: Option<usize>,
    /// Category column position.
    pub category: Option<usize>,
}

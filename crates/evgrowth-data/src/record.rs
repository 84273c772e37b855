//! Sales records and the in-memory dataset.

use crate::period::{Period, PeriodBasis};
use chrono::NaiveDate;
use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::convert::Infallible;
use std::ops::RangeInclusive;
use std::str::FromStr;

/// Vehicle segment of a sales record.
#[derive(Debug, Display, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    /// Electric two-wheelers.
    #[display("2-Wheelers")]
    TwoWheelers,
    /// Electric three-wheelers.
    #[display("3-Wheelers")]
    ThreeWheelers,
    /// Electric four-wheelers.
    #[display("4-Wheelers")]
    FourWheelers,
    /// Any other label found in the source data.
    #[display("{_0}")]
    Other(String),
}

impl FromStr for Category {
    type Err = Infallible;

    /// Lenient parse: `2-Wheelers`, `Two-Wheeler Manufacturer` and `2W` all
    /// map to [`Category::TwoWheelers`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let label = s.trim();
        let lower = label.to_ascii_lowercase();
        let category = if lower.starts_with('2') || lower.starts_with("two") {
            Self::TwoWheelers
        } else if lower.starts_with('3') || lower.starts_with("three") {
            Self::ThreeWheelers
        } else if lower.starts_with('4') || lower.starts_with("four") {
            Self::FourWheelers
        } else {
            Self::Other(label.to_string())
        };
        Ok(category)
    }
}

/// A single row of sales data.
///
/// `entity` is a state or a manufacturer depending on the source file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesRecord {
    /// State or manufacturer.
    pub entity: String,
    /// Reporting period the record is bucketed into.
    pub period: Period,
    /// Source date, when known.
    pub date: Option<NaiveDate>,
    /// Vehicle segment, when known.
    pub category: Option<Category>,
    /// Electric units sold.
    pub units_sold: f64,
    /// All units sold (electric and otherwise), when known.
    pub total_units: Option<f64>,
}

impl SalesRecord {
    /// Create a record with only the mandatory fields.
    pub fn new(entity: impl Into<String>, period: Period, units_sold: f64) -> Self {
        Self {
            entity: entity.into(),
            period,
            date: None,
            category: None,
            units_sold,
            total_units: None,
        }
    }

    /// Set the total units sold.
    pub const fn with_total(mut self, total_units: f64) -> Self {
        self.total_units = Some(total_units);
        self
    }

    /// Set the vehicle segment.
    pub fn with_category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    /// Set the source date.
    pub const fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }
}

/// Filter applied to a dataset before aggregation.
///
/// `None` fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordFilter {
    /// Entities to keep.
    pub entities: Option<BTreeSet<String>>,
    /// Categories to keep.
    pub categories: Option<BTreeSet<Category>>,
    /// Inclusive period range to keep.
    pub periods: Option<RangeInclusive<Period>>,
}

impl RecordFilter {
    /// Filter that keeps every record.
    pub fn all() -> Self {
        Self::default()
    }

    /// Restrict to the given entities.
    pub fn entities<I, S>(mut self, entities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.entities = Some(entities.into_iter().map(Into::into).collect());
        self
    }

    /// Restrict to the given category.
    pub fn category(mut self, category: Category) -> Self {
        self.categories
            .get_or_insert_with(BTreeSet::new)
            .insert(category);
        self
    }

    /// Restrict to an inclusive period range.
    pub fn periods(mut self, range: RangeInclusive<Period>) -> Self {
        self.periods = Some(range);
        self
    }

    /// Whether a record passes the filter.
    pub fn matches(&self, record: &SalesRecord) -> bool {
        let entity_ok = self
            .entities
            .as_ref()
            .is_none_or(|set| set.contains(&record.entity));
        let category_ok = self.categories.as_ref().is_none_or(|set| {
            record
                .category
                .as_ref()
                .is_some_and(|category| set.contains(category))
        });
        let period_ok = self
            .periods
            .as_ref()
            .is_none_or(|range| range.contains(&record.period));
        entity_ok && category_ok && period_ok
    }
}

/// An immutable, loaded set of sales records.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    records: Vec<SalesRecord>,
    basis: PeriodBasis,
}

impl Dataset {
    /// Wrap already-bucketed records.
    pub const fn new(records: Vec<SalesRecord>, basis: PeriodBasis) -> Self {
        Self { records, basis }
    }

    /// All records in load order.
    pub fn records(&self) -> &[SalesRecord] {
        &self.records
    }

    /// Basis the records' periods were bucketed with.
    pub const fn basis(&self) -> PeriodBasis {
        self.basis
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct entities, sorted.
    pub fn entities(&self) -> BTreeSet<&str> {
        self.records.iter().map(|r| r.entity.as_str()).collect()
    }

    /// Distinct periods, sorted.
    pub fn periods(&self) -> BTreeSet<Period> {
        self.records.iter().map(|r| r.period).collect()
    }

    /// Distinct categories, sorted.
    pub fn categories(&self) -> BTreeSet<&Category> {
        self.records
            .iter()
            .filter_map(|r| r.category.as_ref())
            .collect()
    }

    /// Records passing `filter`, in load order.
    pub fn filter<'a>(
        &'a self,
        filter: &'a RecordFilter,
    ) -> impl Iterator<Item = &'a SalesRecord> + 'a {
        self.records.iter().filter(move |r| filter.matches(r))
    }
}

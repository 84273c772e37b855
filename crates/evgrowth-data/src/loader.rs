//! CSV loading.
//!
//! The loader validates the header row against a [`Schema`], parses each
//! row into a [`SalesRecord`] and buckets its date into a [`Period`] using
//! the configured [`PeriodBasis`]. A missing data file is an error: generated
//! data is only used when [`DataSource::Demo`] is requested explicitly.

use crate::demo::{DemoConfig, generate_demo};
use crate::error::{DataError, Result};
use crate::period::{FISCAL_YEAR_START_MONTH, PeriodBasis};
use crate::record::{Category, Dataset, SalesRecord};
use crate::schema::{ColumnIndex, Schema};
use chrono::{Datelike, NaiveDate};
use csv::{ReaderBuilder, StringRecord, Trim};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Read;
use std::path::PathBuf;

/// Date formats accepted in the date column, tried in order.
const DATE_FORMATS: &[&str] = &[
    "%d-%b-%y", "%Y-%m-%d", "%d-%m-%Y", "%d/%m/%Y", "%d-%m-%y", "%d/%m/%y",
];

/// Earliest plausible sales year.
///
/// chrono's `%Y` also matches two digits, so `01-04-23` parses as year 1
/// under `%Y-%m-%d`. Such matches are skipped.
const MIN_YEAR: i32 = 1900;

/// Where a dataset comes from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    /// A delimited file on disk.
    Csv(PathBuf),
    /// Generated demonstration data.
    Demo(DemoConfig),
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Csv(path) => write!(f, "{}", path.display()),
            Self::Demo(config) => write!(f, "demo(seed={})", config.seed),
        }
    }
}

/// Everything needed to load a dataset. Doubles as the cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LoadOptions {
    /// Data source.
    pub source: DataSource,
    /// Column layout of the source file.
    pub schema: Schema,
    /// Period bucketing.
    pub basis: PeriodBasis,
    /// First month of the fiscal year.
    pub fiscal_start_month: u32,
    /// Field delimiter.
    pub delimiter: u8,
}

impl LoadOptions {
    /// Options for a CSV file with the state-level layout.
    pub fn csv(path: impl Into<PathBuf>) -> Self {
        Self {
            source: DataSource::Csv(path.into()),
            schema: Schema::default(),
            basis: PeriodBasis::default(),
            fiscal_start_month: FISCAL_YEAR_START_MONTH,
            delimiter: b',',
        }
    }

    /// Options for generated demo data.
    pub fn demo(config: DemoConfig) -> Self {
        Self {
            source: DataSource::Demo(config),
            ..Self::csv(PathBuf::new())
        }
    }

    /// Set the schema.
    pub fn with_schema(mut self, schema: Schema) -> Self {
        self.schema = schema;
        self
    }

    /// Set the period basis.
    pub const fn with_basis(mut self, basis: PeriodBasis) -> Self {
        self.basis = basis;
        self
    }

    fn validate(&self) -> Result<()> {
        if !(1..=12).contains(&self.fiscal_start_month) {
            return Err(DataError::InvalidFiscalStartMonth(self.fiscal_start_month));
        }
        Ok(())
    }
}

/// Load a dataset from its configured source.
pub fn load(options: &LoadOptions) -> Result<Dataset> {
    options.validate()?;

    match &options.source {
        DataSource::Csv(path) => {
            if !path.is_file() {
                return Err(DataError::DataFileNotFound(path.clone()));
            }
            let file = std::fs::File::open(path)?;
            let dataset = read_csv(file, options)?;
            tracing::info!(
                path = %path.display(),
                rows = dataset.len(),
                basis = %options.basis,
                "loaded sales data"
            );
            Ok(dataset)
        }
        DataSource::Demo(config) => {
            tracing::warn!(seed = config.seed, "using generated demo data");
            Ok(generate_demo(config, options.basis, options.fiscal_start_month))
        }
    }
}

/// Parse delimited sales data from any reader.
pub fn read_csv<R: Read>(reader: R, options: &LoadOptions) -> Result<Dataset> {
    options.validate()?;

    let mut rdr = ReaderBuilder::new()
        .delimiter(options.delimiter)
        .trim(Trim::All)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let index = options.schema.resolve(&headers)?;

    let mut records = Vec::new();
    for (i, row) in rdr.records().enumerate() {
        let row = row?;
        // header is row 1
        let row_number = i + 2;
        records.push(parse_row(&row, row_number, &index, options)?);
    }

    Ok(Dataset::new(records, options.basis))
}

fn parse_row(
    row: &StringRecord,
    row_number: usize,
    index: &ColumnIndex,
    options: &LoadOptions,
) -> Result<SalesRecord> {
    let schema = &options.schema;
    let cell = |pos: usize| row.get(pos).unwrap_or("");

    let date = parse_date(cell(index.date)).ok_or_else(|| DataError::Parse {
        row: row_number,
        column: schema.date_column.clone(),
        message: format!("unrecognised date '{}'", cell(index.date)),
    })?;

    let entity = cell(index.entity);
    if entity.is_empty() {
        return Err(DataError::Parse {
            row: row_number,
            column: schema.entity_column.clone(),
            message: "empty entity".to_string(),
        });
    }

    let units_sold = parse_units(cell(index.units), row_number, &schema.units_column)?;

    let total_units = match (index.total, schema.total_column.as_deref()) {
        (Some(pos), Some(column)) if !cell(pos).is_empty() => {
            Some(parse_units(cell(pos), row_number, column)?)
        }
        _ => None,
    };

    let category = index
        .category
        .map(cell)
        .filter(|label| !label.is_empty())
        .and_then(|label| label.parse::<Category>().ok());

    Ok(SalesRecord {
        entity: entity.to_string(),
        period: options.basis.bucket(date, options.fiscal_start_month),
        date: Some(date),
        category,
        units_sold,
        total_units,
    })
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    DATE_FORMATS.iter().find_map(|fmt| {
        NaiveDate::parse_from_str(raw, fmt)
            .ok()
            .filter(|date| date.year() >= MIN_YEAR)
    })
}

fn parse_units(raw: &str, row: usize, column: &str) -> Result<f64> {
    let value = raw.parse::<f64>().map_err(|e| DataError::Parse {
        row,
        column: column.to_string(),
        message: format!("'{raw}': {e}"),
    })?;
    if !value.is_finite() || value < 0.0 {
        return Err(DataError::InvalidUnits {
            row,
            column: column.to_string(),
            value,
        });
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::period::Period;
    use rstest::rstest;

    const STATE_CSV: &str = "\
date,state,vehicle_category,electric_vehicles_sold,total_vehicles_sold
01-Mar-23,Delhi,2-Wheelers,100,1000
01-Apr-23,Delhi,2-Wheelers,150,1200
2023-04-01,Goa,4-Wheelers,5,400
";

    #[test]
    fn test_read_csv_buckets_fiscal_years() {
        let options = LoadOptions::csv("unused.csv");
        let ds = read_csv(STATE_CSV.as_bytes(), &options).unwrap();
        assert_eq!(ds.len(), 3);
        let records = ds.records();
        assert_eq!(records[0].period, Period::Year(2023));
        assert_eq!(records[1].period, Period::Year(2024));
        assert_eq!(records[2].period, Period::Year(2024));
        assert_eq!(records[2].category, Some(Category::FourWheelers));
        assert_eq!(records[1].total_units, Some(1200.0));
    }

    #[test]
    fn test_read_csv_calendar_basis() {
        let options = LoadOptions::csv("unused.csv").with_basis(PeriodBasis::Calendar);
        let ds = read_csv(STATE_CSV.as_bytes(), &options).unwrap();
        assert!(ds.records().iter().all(|r| r.period == Period::Year(2023)));
    }

    #[test]
    fn test_negative_units_rejected() {
        let csv = "date,state,vehicle_category,electric_vehicles_sold,total_vehicles_sold\n\
                   01-Apr-23,Delhi,2-Wheelers,-1,10\n";
        let err = read_csv(csv.as_bytes(), &LoadOptions::csv("x.csv")).unwrap_err();
        assert!(matches!(err, DataError::InvalidUnits { row: 2, .. }));
    }

    #[test]
    fn test_bad_date_reports_row() {
        let csv = "date,state,vehicle_category,electric_vehicles_sold,total_vehicles_sold\n\
                   01-Apr-23,Delhi,2-Wheelers,1,10\n\
                   someday,Delhi,2-Wheelers,1,10\n";
        let err = read_csv(csv.as_bytes(), &LoadOptions::csv("x.csv")).unwrap_err();
        match err {
            DataError::Parse { row, column, .. } => {
                assert_eq!(row, 3);
                assert_eq!(column, "date");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_empty_total_is_none() {
        let csv = "date,state,vehicle_category,electric_vehicles_sold,total_vehicles_sold\n\
                   01-Apr-23,Delhi,2-Wheelers,1,\n";
        let ds = read_csv(csv.as_bytes(), &LoadOptions::csv("x.csv")).unwrap();
        assert_eq!(ds.records()[0].total_units, None);
    }

    #[rstest]
    #[case("01-Apr-23", 2023, 4, 1)]
    #[case("2023-04-01", 2023, 4, 1)]
    #[case("01-04-2023", 2023, 4, 1)]
    #[case("01/04/2023", 2023, 4, 1)]
    #[case("01-04-23", 2023, 4, 1)]
    #[case("31/03/24", 2024, 3, 31)]
    fn test_parse_date_formats(
        #[case] raw: &str,
        #[case] year: i32,
        #[case] month: u32,
        #[case] day: u32,
    ) {
        assert_eq!(parse_date(raw), NaiveDate::from_ymd_opt(year, month, day));
    }

    #[test]
    fn test_two_digit_year_dates_bucket_correctly() {
        let csv = "date,state,vehicle_category,electric_vehicles_sold,total_vehicles_sold\n\
                   01-04-23,Delhi,2-Wheelers,1,10\n\
                   31-03-23,Delhi,2-Wheelers,2,10\n";
        let ds = read_csv(csv.as_bytes(), &LoadOptions::csv("x.csv")).unwrap();
        let records = ds.records();
        assert_eq!(records[0].date, NaiveDate::from_ymd_opt(2023, 4, 1));
        assert_eq!(records[0].period, Period::Year(2024));
        assert_eq!(records[1].period, Period::Year(2023));
    }

    #[test]
    fn test_implausible_year_rejected() {
        let csv = "date,state,vehicle_category,electric_vehicles_sold,total_vehicles_sold\n\
                   0023-04-01,Delhi,2-Wheelers,1,10\n";
        let err = read_csv(csv.as_bytes(), &LoadOptions::csv("x.csv")).unwrap_err();
        assert!(matches!(err, DataError::Parse { row: 2, .. }));
    }

    #[test]
    fn test_missing_file_is_loud() {
        let err = load(&LoadOptions::csv("/definitely/not/here.csv")).unwrap_err();
        assert!(matches!(err, DataError::DataFileNotFound(_)));
    }

    #[test]
    fn test_invalid_fiscal_month() {
        let mut options = LoadOptions::csv("x.csv");
        options.fiscal_start_month = 13;
        let err = read_csv(STATE_CSV.as_bytes(), &options).unwrap_err();
        assert!(matches!(err, DataError::InvalidFiscalStartMonth(13)));
    }
}

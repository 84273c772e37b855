//! Generated demonstration data.
//!
//! Only reachable through [`DataSource::Demo`](crate::DataSource::Demo).
//! Nothing in the crate substitutes generated data for a file that failed
//! to load.

use crate::period::PeriodBasis;
use crate::record::{Category, Dataset, SalesRecord};
use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Shape of the generated dataset.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DemoConfig {
    /// RNG seed; the same seed always yields the same data.
    pub seed: u64,
    /// Number of entities, named `State_1` ..= `State_n`.
    pub entities: usize,
    /// First calendar year generated (from April).
    pub first_year: i32,
    /// Number of consecutive twelve-month spans generated.
    pub years: u32,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            entities: 30,
            first_year: 2021,
            years: 3,
        }
    }
}

/// Generate monthly records from April of `first_year` onwards.
pub fn generate_demo(config: &DemoConfig, basis: PeriodBasis, fiscal_start_month: u32) -> Dataset {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let categories = [Category::TwoWheelers, Category::FourWheelers];
    let months = config.years * 12;

    let mut records = Vec::with_capacity(config.entities * months as usize * categories.len());
    for entity in 1..=config.entities {
        let name = format!("State_{entity}");
        for offset in 0..months {
            // month offsets counted from April of first_year
            let month0 = 3 + offset;
            let year = config.first_year + (month0 / 12) as i32;
            let month = month0 % 12 + 1;
            let Some(date) = NaiveDate::from_ymd_opt(year, month, 1) else {
                continue;
            };
            for category in &categories {
                let total = f64::from(rng.gen_range(4_000u32..40_000));
                let electric = f64::from(rng.gen_range(150u32..4_000));
                records.push(
                    SalesRecord::new(name.clone(), basis.bucket(date, fiscal_start_month), electric)
                        .with_total(total)
                        .with_category(category.clone())
                        .with_date(date),
                );
            }
        }
    }

    Dataset::new(records, basis)
}

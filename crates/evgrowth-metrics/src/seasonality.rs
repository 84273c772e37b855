//! Month-of-year sales pattern.
//!
//! Dated records are summed by calendar month across all years, then the
//! months are compared against their average.

use crate::aggregate::Measure;
use chrono::{Datelike, Month};
use evgrowth_data::SalesRecord;
use serde::{Deserialize, Serialize};

/// Units sold in one calendar month, summed across years.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlySales {
    /// Month number, 1 = January.
    pub month: u32,
    /// English month name.
    pub name: String,
    /// Summed units.
    pub units: f64,
    /// Units as a percent of the monthly average; 100 is an average month.
    pub score: f64,
}

/// Seasonal profile of a set of records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Seasonality {
    /// Months with data, starting from the requested first month.
    pub months: Vec<MonthlySales>,
    /// Best-selling month.
    pub peak_month: u32,
    /// Worst-selling month.
    pub low_month: u32,
    /// Units in the peak month.
    pub peak_sales: f64,
    /// Units in the low month.
    pub low_sales: f64,
    /// Mean units per month.
    pub average: f64,
    /// Peak month above the average, in percent.
    pub peak_vs_avg_pct: f64,
    /// Low month against the average, in percent.
    pub low_vs_avg_pct: f64,
    /// Peak over low; `None` when the low month sold nothing.
    pub peak_to_low_ratio: Option<f64>,
    /// Coefficient of variation in percent (sample std / mean).
    pub volatility_pct: Option<f64>,
}

impl Seasonality {
    /// Name of the peak month.
    pub fn peak_name(&self) -> &str {
        self.name_of(self.peak_month)
    }

    /// Name of the low month.
    pub fn low_name(&self) -> &str {
        self.name_of(self.low_month)
    }

    fn name_of(&self, month: u32) -> &str {
        self.months
            .iter()
            .find(|m| m.month == month)
            .map_or("", |m| m.name.as_str())
    }
}

fn month_name(month: u32) -> String {
    u8::try_from(month)
        .ok()
        .and_then(|m| Month::try_from(m).ok())
        .map_or_else(|| month.to_string(), |m| m.name().to_string())
}

fn relative(value: f64, average: f64) -> f64 {
    if average > 0.0 {
        (value - average) / average * 100.0
    } else {
        0.0
    }
}

/// Seasonal profile of the dated records.
///
/// Months are listed starting at `first_month` (1 for January, 4 for an
/// April fiscal year) and wrapping around. Records without a date are
/// ignored; `None` when no record has one. On equal sales the month listed
/// first wins.
pub fn seasonality<'a, I>(records: I, measure: Measure, first_month: u32) -> Option<Seasonality>
where
    I: IntoIterator<Item = &'a SalesRecord>,
{
    let mut sums: [Option<f64>; 12] = [None; 12];
    for record in records {
        if let Some(date) = record.date {
            let slot = &mut sums[date.month0() as usize];
            *slot = Some(slot.unwrap_or(0.0) + measure.of_record(record));
        }
    }

    let start = first_month.clamp(1, 12) - 1;
    let ordered: Vec<(u32, f64)> = (0..12)
        .map(|offset| (start + offset) % 12)
        .filter_map(|m0| sums[m0 as usize].map(|units| (m0 + 1, units)))
        .collect();
    if ordered.is_empty() {
        return None;
    }

    let count = ordered.len() as f64;
    let average = ordered.iter().map(|(_, u)| u).sum::<f64>() / count;

    let mut peak = ordered[0];
    let mut low = ordered[0];
    for &(month, units) in &ordered[1..] {
        if units > peak.1 {
            peak = (month, units);
        }
        if units < low.1 {
            low = (month, units);
        }
    }

    let volatility_pct = (ordered.len() > 1 && average > 0.0).then(|| {
        let variance = ordered
            .iter()
            .map(|(_, u)| (u - average).powi(2))
            .sum::<f64>()
            / (count - 1.0);
        variance.sqrt() / average * 100.0
    });

    let months = ordered
        .iter()
        .map(|&(month, units)| MonthlySales {
            month,
            name: month_name(month),
            units,
            score: if average > 0.0 {
                units / average * 100.0
            } else {
                0.0
            },
        })
        .collect();

    Some(Seasonality {
        months,
        peak_month: peak.0,
        low_month: low.0,
        peak_sales: peak.1,
        low_sales: low.1,
        average,
        peak_vs_avg_pct: relative(peak.1, average),
        low_vs_avg_pct: relative(low.1, average),
        peak_to_low_ratio: (low.1 > 0.0).then(|| peak.1 / low.1),
        volatility_pct,
    })
}

//! ASCII and Markdown tables.
//!
//! Undefined values print as `N/A`, growth from zero as `new`.

use crate::export::{PenetrationRankRow, ShareRow, VolumeRow, YoyRow};
use evgrowth_metrics::{
    GrowthResult, PenetrationChange, Pivot, Projection, Ranking, Seasonality,
};
use serde::{Deserialize, Serialize};

/// Placeholder for undefined values.
pub const NOT_AVAILABLE: &str = "N/A";

/// Format an optional number, `N/A` when absent or not finite.
pub fn format_value(value: Option<f64>, precision: usize) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{v:.precision$}"),
        _ => NOT_AVAILABLE.to_string(),
    }
}

/// Format an optional percentage, `N/A` when absent or not finite.
pub fn format_percent(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{v:.2}%"),
        _ => NOT_AVAILABLE.to_string(),
    }
}

/// A titled table of pre-formatted cells.
///
/// The first column is left-aligned, the others right-aligned.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    /// Title line.
    pub title: String,
    /// Lines printed under the title.
    pub notes: Vec<String>,
    /// Column headers.
    pub headers: Vec<String>,
    /// Cell text, one vector per row.
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Create an empty table.
    pub fn new<I, S>(title: impl Into<String>, headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            title: title.into(),
            notes: Vec::new(),
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Add a line under the title.
    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    /// Append a row. Short rows are padded with empty cells.
    pub fn push_row(&mut self, mut cells: Vec<String>) {
        cells.resize(self.headers.len().max(cells.len()), String::new());
        self.rows.push(cells);
    }

    fn widths(&self) -> Vec<usize> {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                let len = cell.chars().count();
                match widths.get_mut(i) {
                    Some(w) => *w = (*w).max(len),
                    None => widths.push(len),
                }
            }
        }
        widths
    }

    fn ascii_line(cells: &[String], widths: &[usize]) -> String {
        let padded: Vec<String> = widths
            .iter()
            .enumerate()
            .map(|(i, &w)| {
                let cell = cells.get(i).map_or("", String::as_str);
                if i == 0 {
                    format!("{cell:<w$}")
                } else {
                    format!("{cell:>w$}")
                }
            })
            .collect();
        padded.join("  ").trim_end().to_string()
    }

    /// Render as a fixed-width text table.
    pub fn to_ascii_table(&self) -> String {
        let widths = self.widths();
        let rule = (widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1)).max(40);
        let mut output = String::new();

        output.push_str(&format!("\n{}\n", self.title));
        for note in &self.notes {
            output.push_str(&format!("{note}\n"));
        }
        output.push_str(&"=".repeat(rule));
        output.push('\n');

        output.push_str(&Self::ascii_line(&self.headers, &widths));
        output.push('\n');
        output.push_str(&"-".repeat(rule));
        output.push('\n');

        for row in &self.rows {
            output.push_str(&Self::ascii_line(row, &widths));
            output.push('\n');
        }

        output.push_str(&"=".repeat(rule));
        output.push('\n');
        output
    }

    /// Render as a Markdown table.
    pub fn to_markdown(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!("# {}\n\n", self.title));
        for note in &self.notes {
            output.push_str(&format!("{note}\n\n"));
        }

        output.push_str(&format!("| {} |\n", self.headers.join(" | ")));
        let align: Vec<&str> = (0..self.headers.len())
            .map(|i| if i == 0 { "---" } else { "---:" })
            .collect();
        output.push_str(&format!("|{}|\n", align.join("|")));

        for row in &self.rows {
            let cells: Vec<String> = row.iter().map(|c| c.replace('|', "\\|")).collect();
            output.push_str(&format!("| {} |\n", cells.join(" | ")));
        }
        output
    }
}

/// Conversion of a result set into a [`Table`].
pub trait ToTable {
    /// Build the table.
    fn to_table(&self) -> Table;
}

fn growth_table<'a, I>(title: String, results: I) -> Table
where
    I: IntoIterator<Item = &'a GrowthResult>,
{
    let mut table = Table::new(title, ["Entity", "Rank", "Start", "End", "CAGR"]);
    for r in results {
        table.push_row(vec![
            r.entity.to_string(),
            r.rank.map_or_else(|| NOT_AVAILABLE.to_string(), |n| n.to_string()),
            format_value(r.start_value, 0),
            format_value(r.end_value, 0),
            format_percent(r.cagr_percent),
        ]);
    }
    table
}

fn growth_title(results: &[GrowthResult]) -> String {
    results.first().map_or_else(
        || "Growth".to_string(),
        |r| format!("Growth {} to {}", r.start_period, r.end_period),
    )
}

impl ToTable for [GrowthResult] {
    fn to_table(&self) -> Table {
        growth_table(growth_title(self), self)
    }
}

impl ToTable for Ranking {
    fn to_table(&self) -> Table {
        let title = growth_title(if self.ranked.is_empty() {
            &self.unranked
        } else {
            &self.ranked
        });
        let mut table = growth_table(title, &self.ranked);
        if !self.unranked.is_empty() {
            let names: Vec<String> = self.unranked.iter().map(|r| r.entity.to_string()).collect();
            table = table.note(format!("Not ranked (no growth rate): {}", names.join(", ")));
        }
        table
    }
}

impl ToTable for [YoyRow] {
    fn to_table(&self) -> Table {
        let mut table = Table::new("Period-over-period change", ["Entity", "From", "To", "Change"]);
        for row in self {
            let change = if row.unbounded {
                "new".to_string()
            } else {
                format_percent(row.pct_change)
            };
            table.push_row(vec![
                row.entity.clone(),
                row.from.to_string(),
                row.to.to_string(),
                change,
            ]);
        }
        table
    }
}

impl ToTable for [ShareRow] {
    fn to_table(&self) -> Table {
        let compare = self.iter().any(|r| r.previous_share_percent.is_some());
        let mut table = if compare {
            Table::new("Market share", ["Entity", "Share", "Previous", "Change (pp)"])
        } else {
            Table::new("Market share", ["Entity", "Share"])
        };
        for row in self {
            let mut cells = vec![row.entity.clone(), format_percent(Some(row.share_percent))];
            if compare {
                cells.push(format_percent(row.previous_share_percent));
                cells.push(format_value(row.change_pp, 2));
            }
            table.push_row(cells);
        }
        table
    }
}

impl ToTable for [PenetrationChange] {
    fn to_table(&self) -> Table {
        let title = self.first().map_or_else(
            || "EV penetration".to_string(),
            |c| format!("EV penetration {} to {}", c.from, c.to),
        );
        let mut table = Table::new(title, ["Entity", "From", "To", "Change (pp)", "Change"]);
        for c in self {
            table.push_row(vec![
                c.entity.to_string(),
                format_percent(Some(c.from_rate)),
                format_percent(Some(c.to_rate)),
                format_value(Some(c.change), 2),
                c.pct_change
                    .map_or_else(|| NOT_AVAILABLE.to_string(), |p| p.to_string()),
            ]);
        }
        table
    }
}

impl ToTable for Seasonality {
    fn to_table(&self) -> Table {
        let mut table = Table::new("Seasonality", ["Month", "Units", "Score"])
            .note(format!(
                "Peak: {} ({:+.1}% vs average)",
                self.peak_name(),
                self.peak_vs_avg_pct
            ))
            .note(format!(
                "Low: {} ({:+.1}% vs average)",
                self.low_name(),
                self.low_vs_avg_pct
            ))
            .note(format!(
                "Peak-to-low ratio: {}",
                format_value(self.peak_to_low_ratio, 2)
            ))
            .note(format!("Volatility: {}", format_percent(self.volatility_pct)));
        for m in &self.months {
            table.push_row(vec![
                m.name.clone(),
                format_value(Some(m.units), 0),
                format_value(Some(m.score), 1),
            ]);
        }
        table
    }
}

impl ToTable for [Projection] {
    fn to_table(&self) -> Table {
        let title = self.first().map_or_else(
            || "Projection".to_string(),
            |p| format!("Projection {} to {}", p.base_period, p.target_period),
        );
        let mut table = Table::new(title, ["Entity", "Base", "CAGR", "Projected"]);
        for p in self {
            table.push_row(vec![
                p.entity.to_string(),
                format_value(Some(p.base_value), 0),
                format_percent(Some(p.cagr_percent)),
                format_value(Some(p.projected), 0),
            ]);
        }
        table
    }
}

impl ToTable for [PenetrationRankRow] {
    fn to_table(&self) -> Table {
        let title = self.first().map_or_else(
            || "EV penetration".to_string(),
            |r| format!("EV penetration {}", r.period),
        );
        let mut table = Table::new(title, ["Entity", "#", "Penetration"]);
        for row in self {
            table.push_row(vec![
                row.entity.clone(),
                row.position.to_string(),
                format_percent(Some(row.penetration_percent)),
            ]);
        }
        table
    }
}

impl ToTable for [VolumeRow] {
    fn to_table(&self) -> Table {
        let mut table = Table::new("Sales volume", ["Entity", "#", "Units"]);
        for row in self {
            table.push_row(vec![
                row.entity.clone(),
                row.position.to_string(),
                format_value(Some(row.units), 0),
            ]);
        }
        table
    }
}

impl ToTable for Pivot {
    fn to_table(&self) -> Table {
        let headers = std::iter::once("Entity".to_string())
            .chain(self.periods.iter().map(ToString::to_string));
        let mut table = Table::new("Sales by period", headers);
        for row in &self.rows {
            let mut cells = vec![row.entity.to_string()];
            cells.extend(row.values.iter().map(|v| format_value(*v, 0)));
            table.push_row(cells);
        }
        table
    }
}

//! Markdown report for a captured table.

use crate::reader::Table;
use crate::stats::ColumnStats;
use crate::value::ValueFormat;
use chrono::{DateTime, FixedOffset};
use std::fmt;

/// Per-column statistics of a [`Table`], rendered as Markdown.
///
/// The first column is treated as the index (usually a timestamp) and left
/// out unless `include_index` is set.
#[derive(Debug, Clone, Copy)]
pub struct Report<'a> {
    source: &'a str,
    table: &'a Table,
    include_index: bool,
    date: Option<DateTime<FixedOffset>>,
}

impl<'a> Report<'a> {
    /// # Arguments
    /// * `source` - Name of the capture (file path or `<stdin>`)
    /// * `table` - The parsed table
    /// * `include_index` - Also summarize the first column
    pub fn new(source: &'a str, table: &'a Table, include_index: bool) -> Self {
        Self {
            source,
            table,
            include_index,
            date: None,
        }
    }

    /// Stamp the report with the time it was generated.
    pub fn with_date(mut self, date: DateTime<FixedOffset>) -> Self {
        self.date = Some(date);
        self
    }
}

fn number(value: f64) -> impl fmt::Display {
    ValueFormat::Shortest.display(value)
}

fn fmt_stats(stats: &ColumnStats, f: &mut fmt::Formatter) -> fmt::Result {
    writeln!(f, "- samples: {}", stats.count)?;
    writeln!(f, "- average: {}", number(stats.mean))?;
    writeln!(f, "- median: {}", number(stats.median))?;
    match stats.std_dev {
        Some(std_dev) => writeln!(f, "- standard deviation: {}", number(std_dev))?,
        None => writeln!(f, "- standard deviation: n/a")?,
    }
    writeln!(f, "- max: {}", number(stats.max))?;
    writeln!(f, "- min: {}", number(stats.min))
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "# Report")?;
        writeln!(f)?;
        if let Some(date) = &self.date {
            writeln!(f, "## Date")?;
            writeln!(f, "{}", date.format("%Y-%m-%d %H:%M:%S %:z"))?;
            writeln!(f)?;
        }
        writeln!(f, "## Source")?;
        writeln!(f, "{}", self.source)?;
        writeln!(f)?;
        writeln!(f, "## Rows")?;
        writeln!(f, "{}", self.table.len())?;
        writeln!(f)?;
        writeln!(f, "## Statistics")?;

        let skip = usize::from(!self.include_index);
        for (index, column) in self.table.columns.iter().enumerate().skip(skip) {
            writeln!(f)?;
            writeln!(f, "### {column}")?;
            match ColumnStats::from_values(&self.table.column_values(index)) {
                Some(stats) => fmt_stats(&stats, f)?,
                None => writeln!(f, "- samples: 0")?,
            }
        }
        Ok(())
    }
}

/// Render the report for `table` as a string.
pub fn render_report(source: &str, table: &Table, include_index: bool) -> String {
    Report::new(source, table, include_index).to_string()
}

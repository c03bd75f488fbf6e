//! Delimited table output.
//!
//! This module provides the [`Dialect`] presets (comma/CRLF and tab/LF) and
//! the [`DelimitedTableWriter`] that streams a header and rows to a
//! [`Sink`](crate::sink::Sink) in that dialect.

pub mod writer;

pub use writer::DelimitedTableWriter;

use std::borrow::Cow;
use std::fmt;

/// Field separator and row delimiter of a delimited table.
///
/// The row delimiter is written before every row, so it terminates the
/// previous line (the header or the prior row).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dialect {
    /// Written between consecutive fields of one line.
    pub separator: Cow<'static, str>,
    /// Written before the fields of every row.
    pub row_delimiter: Cow<'static, str>,
}

impl Dialect {
    /// Comma separated values with CR-LF line endings.
    pub const CSV: Dialect = Dialect {
        separator: Cow::Borrowed(","),
        row_delimiter: Cow::Borrowed("\r\n"),
    };

    /// Tab separated values with LF line endings.
    pub const TSV: Dialect = Dialect {
        separator: Cow::Borrowed("\t"),
        row_delimiter: Cow::Borrowed("\n"),
    };

    /// A custom dialect.
    ///
    /// # Example
    /// ```
    /// use sensor_table::Dialect;
    ///
    /// let semicolons = Dialect::new(";", "\n");
    /// assert_eq!(semicolons.separator, ";");
    /// ```
    pub fn new(
        separator: impl Into<Cow<'static, str>>,
        row_delimiter: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self {
            separator: separator.into(),
            row_delimiter: row_delimiter.into(),
        }
    }
}

/// Named dialect presets, selectable on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum DialectKind {
    /// Comma separated, CR-LF terminated
    #[default]
    Csv,
    /// Tab separated, LF terminated
    Tsv,
}

impl DialectKind {
    /// The preset this kind names.
    pub fn dialect(self) -> Dialect {
        match self {
            DialectKind::Csv => Dialect::CSV,
            DialectKind::Tsv => Dialect::TSV,
        }
    }
}

impl fmt::Display for DialectKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DialectKind::Csv => write!(f, "csv"),
            DialectKind::Tsv => write!(f, "tsv"),
        }
    }
}

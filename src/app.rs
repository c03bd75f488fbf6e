//! Core application runner for the `sensor-table` host tool.
//!
//! This module is decoupled from CLI parsing and process exit codes so it can
//! be tested with in-memory input and output.

use crate::output::{DelimitedTableWriter, DialectKind};
use crate::reader::{ReadError, Table, read_table};
use crate::report::Report;
use crate::sink::IoSink;
use crate::value::ValueFormat;
use chrono::Local;
use clap::Parser;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use thiserror::Error;

/// Configuration for a run.
#[derive(Parser, Debug, Clone)]
#[command(author, about, version)]
pub struct Options {
    /// Captured table to read. Reads standard input when omitted.
    #[arg(long, value_name = "PATH")]
    pub input: Option<PathBuf>,

    /// Dialect of the captured table.
    #[arg(long, default_value_t, value_enum)]
    pub dialect: DialectKind,

    /// Re-emit the table in this dialect instead of printing a report.
    #[arg(long, value_enum, value_name = "DIALECT")]
    pub convert: Option<DialectKind>,

    /// Digits after the decimal point when converting.
    /// Without it, values use the shortest form that reads back exactly.
    #[arg(long, value_name = "DIGITS")]
    pub precision: Option<u8>,

    /// Stop after this many data rows.
    #[arg(long, value_name = "ROWS")]
    pub max_rows: Option<usize>,

    /// Include the first (index) column in the report statistics.
    #[arg(long)]
    pub include_index: bool,

    /// Verbose output, log skipped lines and table shape
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

impl Options {
    fn value_format(&self) -> ValueFormat {
        self.precision.map_or(ValueFormat::Shortest, ValueFormat::Fixed)
    }

    fn source_name(&self) -> String {
        self.input
            .as_ref()
            .map_or_else(|| "<stdin>".to_string(), |path| path.display().to_string())
    }
}

/// Errors returned by the run loop.
#[derive(Error, Debug)]
pub enum RunError {
    #[error("cannot open {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Read(#[from] ReadError),
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Write `table` to `out` through a [`DelimitedTableWriter`].
fn convert(
    table: &Table,
    kind: DialectKind,
    value_format: ValueFormat,
    out: &mut dyn Write,
) -> io::Result<()> {
    let mut sink = IoSink::new(out);
    let mut writer = DelimitedTableWriter::with_dialect(&mut sink, kind.dialect())
        .with_value_format(value_format);

    for column in &table.columns {
        writer.add_column(column.as_str());
    }
    writer.write_header();
    // By position, so repeated column names keep their own values.
    for row in &table.rows {
        writer.write_values(row);
    }

    sink.flush()
}

/// Read a captured table from `input` and write a report or a converted table to `out`.
pub fn run_with_io(
    options: &Options,
    input: &mut dyn BufRead,
    out: &mut dyn Write,
) -> Result<(), RunError> {
    let table = read_table(input, options.dialect.dialect(), options.max_rows)?;
    log::info!(
        "read {} rows with {} columns",
        table.len(),
        table.columns.len()
    );

    match options.convert {
        Some(kind) => convert(&table, kind, options.value_format(), out)?,
        None => {
            let source = options.source_name();
            let report = Report::new(&source, &table, options.include_index)
                .with_date(Local::now().fixed_offset());
            write!(out, "{report}")?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(args: &[&str]) -> Options {
        Options::try_parse_from(std::iter::once("sensor-table").chain(args.iter().copied()))
            .unwrap()
    }

    fn run(args: &[&str], input: &str) -> Result<String, RunError> {
        let mut out = Vec::new();
        run_with_io(&options(args), &mut input.as_bytes(), &mut out)?;
        Ok(String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_defaults() {
        let options = options(&[]);
        assert_eq!(options.dialect, DialectKind::Csv);
        assert_eq!(options.convert, None);
        assert_eq!(options.value_format(), ValueFormat::Shortest);
        assert_eq!(options.source_name(), "<stdin>");
    }

    #[test]
    fn test_report_from_stdin() {
        let out = run(&[], "time,temperature\r\n0,20.0\r\n1,22.0").unwrap();
        assert!(out.starts_with("# Report\n\n## Date\n"));
        assert!(out.contains("\n\n## Source\n<stdin>\n"));
        assert!(out.contains("### temperature\n- samples: 2\n- average: 21.0\n"));
        assert!(!out.contains("### time"));
    }

    #[test]
    fn test_report_names_input_path() {
        let out = run(&["--input", "data/capture.tsv", "--dialect", "tsv"], "a\tb").unwrap();
        assert!(out.contains("## Source\ndata/capture.tsv\n"));
        assert!(out.contains("## Rows\n0\n"));
    }

    #[test]
    fn test_convert_csv_to_tsv() {
        let out = run(&["--convert", "tsv"], "x,y\r\n1,2\r\n,4.5").unwrap();
        assert_eq!(out, "x\ty\n1.0\t2.0\n\t4.5");
    }

    #[test]
    fn test_convert_keeps_repeated_columns_apart() {
        let out = run(&["--convert", "csv"], "t,v,v\r\n0,1,\r\n1,,5").unwrap();
        assert_eq!(out, "t,v,v\r\n0.0,1.0,\r\n1.0,,5.0");
    }

    #[test]
    fn test_convert_missing_first_field() {
        let out = run(
            &["--dialect", "tsv", "--convert", "csv"],
            "a\tb\tc\n\t2\t3\n\t\t",
        )
        .unwrap();
        assert_eq!(out, "a,b,c\r\n,2.0,3.0\r\n,,");
    }

    #[test]
    fn test_convert_with_precision_and_limit() {
        let out = run(
            &["--dialect", "tsv", "--convert", "csv", "--precision", "2", "--max-rows", "1"],
            "t\tv\n0\t1.005\n1\t2",
        )
        .unwrap();
        assert_eq!(out, "t,v\r\n0.00,1.00");
    }

    #[test]
    fn test_read_errors_propagate() {
        let error = run(&[], "a,b\r\n1").unwrap_err();
        assert!(matches!(
            error,
            RunError::Read(ReadError::FieldCount { line: 2, .. })
        ));

        let error = run(&[], "").unwrap_err();
        assert_eq!(error.to_string(), "stream is empty, expected a header line");
    }

    #[test]
    fn test_open_error_message() {
        let error = RunError::Open {
            path: PathBuf::from("missing.csv"),
            source: io::Error::new(io::ErrorKind::NotFound, "not found"),
        };
        assert_eq!(error.to_string(), "cannot open missing.csv: not found");
    }
}

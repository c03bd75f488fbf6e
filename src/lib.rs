//! `sensor-table` library.
//!
//! The device side streams sensor readings as a delimited table: register
//! columns on a [`DelimitedTableWriter`], write the header once, then write
//! rows keyed by column name. Text goes to any [`Sink`], from an in-memory
//! `String` to a serial port wrapped in an [`IoSink`].
//!
//! The host side reads a captured stream back with [`TableReader`] and
//! summarizes it with [`ColumnStats`] and [`Report`]. The binary
//! (`src/main.rs`) is responsible for CLI parsing and process exit codes; the
//! run loop lives in [`crate::app`].

pub mod app;
pub mod output;
pub mod reader;
pub mod report;
pub mod row;
pub mod sink;
pub mod stats;
pub mod value;

#[cfg(test)]
mod test_utils;

// Re-export commonly used types at the crate root
pub use output::{DelimitedTableWriter, Dialect, DialectKind};
pub use reader::{ReadError, Table, TableReader, read_table};
pub use report::{Report, render_report};
pub use row::Row;
pub use sink::{IoSink, Sink};
pub use stats::ColumnStats;
pub use value::ValueFormat;

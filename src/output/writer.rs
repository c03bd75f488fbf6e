//! Header and row serialization.

use crate::output::Dialect;
use crate::row::Row;
use crate::sink::Sink;
use crate::value::ValueFormat;
use std::borrow::Cow;

/// Writes a delimited table (header line, then rows) to a borrowed [`Sink`].
///
/// Columns are registered with [`add_column`](Self::add_column) and their
/// registration order fixes the field order of the header and every row. The
/// header is written at most once; rows are dropped until it has been written.
/// None of the operations report errors: missing values become empty fields
/// and row keys that match no column are never looked at.
///
/// # Example
/// ```
/// use sensor_table::DelimitedTableWriter;
///
/// let mut out = String::new();
/// let mut table = DelimitedTableWriter::csv(&mut out);
/// table.add_column("x");
/// table.add_column("y");
/// table.write_header();
/// table.write_row(&[("x", 1.0), ("y", 2.0)]);
/// table.write_row(&[("y", 4.0)]);
///
/// assert_eq!(out, "x,y\r\n1.0,2.0\r\n,4.0");
/// ```
pub struct DelimitedTableWriter<'s, S: Sink + ?Sized> {
    sink: &'s mut S,
    dialect: Dialect,
    value_format: ValueFormat,
    columns: Vec<String>,
    header_written: bool,
}

impl<'s, S: Sink + ?Sized> DelimitedTableWriter<'s, S> {
    /// Create a writer with an explicit separator and row delimiter.
    ///
    /// # Arguments
    /// * `sink` - Output destination, borrowed for the writer's lifetime
    /// * `separator` - Written between fields of one line
    /// * `row_delimiter` - Written before the fields of every row
    pub fn new(
        sink: &'s mut S,
        separator: impl Into<Cow<'static, str>>,
        row_delimiter: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self::with_dialect(sink, Dialect::new(separator, row_delimiter))
    }

    /// Create a writer for `dialect`. Nothing is written yet.
    pub fn with_dialect(sink: &'s mut S, dialect: Dialect) -> Self {
        Self {
            sink,
            dialect,
            value_format: ValueFormat::default(),
            columns: Vec::new(),
            header_written: false,
        }
    }

    /// Comma separated, CR-LF terminated writer.
    pub fn csv(sink: &'s mut S) -> Self {
        Self::with_dialect(sink, Dialect::CSV)
    }

    /// Tab separated, LF terminated writer.
    pub fn tsv(sink: &'s mut S) -> Self {
        Self::with_dialect(sink, Dialect::TSV)
    }

    /// Render numeric fields with `value_format` instead of the shortest form.
    pub fn with_value_format(mut self, value_format: ValueFormat) -> Self {
        self.value_format = value_format;
        self
    }

    /// Append a column. Duplicates are kept and produce duplicate fields.
    ///
    /// Columns added after the header has been written only affect rows.
    pub fn add_column(&mut self, name: impl Into<String>) {
        self.columns.push(name.into());
    }

    /// Write the column names joined by the separator.
    ///
    /// Only the first call writes anything. No line terminator follows the
    /// header; the first row supplies it.
    pub fn write_header(&mut self) {
        if self.header_written {
            log::debug!("header already written, ignoring");
            return;
        }

        let mut first = true;
        for column in &self.columns {
            if first {
                first = false;
            } else {
                self.sink.print(&self.dialect.separator);
            }
            self.sink.print(column);
        }

        self.header_written = true;
    }

    /// Write the row delimiter followed by one field per column.
    ///
    /// Fields whose column has no value in `row` are left empty. Before
    /// [`write_header`](Self::write_header) has been called the row is
    /// dropped.
    pub fn write_row<R: Row + ?Sized>(&mut self, row: &R) {
        if !self.header_written {
            log::debug!("header not written yet, dropping row");
            return;
        }

        self.write_fields(|_, column| row.value(column));
    }

    /// Write a row given by position: `values[i]` fills the `i`-th column.
    ///
    /// Unlike [`write_row`](Self::write_row) this keeps repeated column
    /// names apart. `None` and positions past the end of `values` are left
    /// empty; extra values are ignored. Dropped before the header like
    /// `write_row`.
    pub fn write_values(&mut self, values: &[Option<f64>]) {
        if !self.header_written {
            log::debug!("header not written yet, dropping row");
            return;
        }

        self.write_fields(|index, _| values.get(index).copied().flatten());
    }

    /// Row delimiter, then one field per column from `field(index, name)`.
    fn write_fields(&mut self, mut field: impl FnMut(usize, &str) -> Option<f64>) {
        self.sink.print(&self.dialect.row_delimiter);

        let mut first = true;
        for (index, column) in self.columns.iter().enumerate() {
            if first {
                first = false;
            } else {
                self.sink.print(&self.dialect.separator);
            }
            match field(index, column) {
                Some(value) => self.sink.print_value(value, self.value_format),
                None => log::trace!("no value for column {column:?}"),
            }
        }
    }

    /// Registered columns in output order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Whether the header has been written.
    pub fn header_written(&self) -> bool {
        self.header_written
    }

    /// Separator and row delimiter in use.
    pub fn dialect(&self) -> &Dialect {
        &self.dialect
    }

    /// How numeric fields are rendered.
    pub fn value_format(&self) -> ValueFormat {
        self.value_format
    }
}

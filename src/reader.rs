//! Host-side parsing of a captured table stream.
//!
//! The device writes the header, then a row delimiter before every row, and
//! never terminates the last row. [`TableReader`] reads that framing back.
//! Dialects with a one-byte separator and a one-byte or CR-LF delimiter (both
//! presets) are parsed with the `csv` crate; other custom dialects fall back
//! to splitting on the delimiter and separator strings.

use crate::output::Dialect;
use std::collections::BTreeMap;
use std::io::{self, BufRead};
use thiserror::Error;

/// Errors while reading a captured table.
#[derive(Error, Debug)]
pub enum ReadError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    /// The stream ended before any header text.
    #[error("stream is empty, expected a header line")]
    MissingHeader,
    #[error("line {line}: expected {expected} fields, found {found}")]
    FieldCount {
        line: usize,
        expected: usize,
        found: usize,
    },
    #[error("line {line}: invalid value {value:?} in column {column:?}")]
    InvalidValue {
        line: usize,
        column: String,
        value: String,
    },
    #[error("line {line}: not valid UTF-8")]
    InvalidUtf8 { line: usize },
}

/// Map a `csv` error, keeping UTF-8 failures as [`ReadError::InvalidUtf8`].
fn csv_error(error: csv::Error) -> ReadError {
    let utf8_line = match error.kind() {
        csv::ErrorKind::Utf8 { pos, .. } => Some(pos.as_ref().map_or(0, |p| p.line() as usize)),
        _ => None,
    };
    match utf8_line {
        Some(line) => ReadError::InvalidUtf8 { line },
        None => ReadError::from(error),
    }
}

/// One parsed row: a value per header column, `None` for empty fields.
pub type Values = Vec<Option<f64>>;

/// Field separator byte and terminator, when `dialect` fits the `csv` crate.
fn csv_layout(dialect: &Dialect) -> Option<(u8, csv::Terminator)> {
    let &[separator] = dialect.separator.as_bytes() else {
        return None;
    };
    let terminator = match dialect.row_delimiter.as_bytes() {
        b"\r\n" => csv::Terminator::CRLF,
        &[byte] => csv::Terminator::Any(byte),
        _ => return None,
    };
    Some((separator, terminator))
}

#[derive(Debug)]
enum Records<R> {
    Csv {
        reader: csv::Reader<R>,
        record: csv::StringRecord,
    },
    Segments(SegmentReader<R>),
}

/// Streaming reader for a delimited table.
///
/// Iterating yields one item per row. A row that fails to parse yields an
/// error and iteration continues with the next row; an I/O error ends it.
///
/// With the `csv` backend blank lines are skipped and the CR-LF preset
/// also accepts bare CR or LF line endings.
///
/// # Example
/// ```
/// use sensor_table::{Dialect, TableReader};
///
/// let capture = "time,temperature\r\n0.0,21.5\r\n1.0,";
/// let mut reader = TableReader::new(capture.as_bytes(), Dialect::CSV).unwrap();
/// assert_eq!(reader.columns(), ["time", "temperature"]);
/// assert_eq!(reader.next().unwrap().unwrap(), vec![Some(0.0), Some(21.5)]);
/// assert_eq!(reader.next().unwrap().unwrap(), vec![Some(1.0), None]);
/// assert!(reader.next().is_none());
/// ```
#[derive(Debug)]
pub struct TableReader<R> {
    records: Records<R>,
    dialect: Dialect,
    columns: Vec<String>,
    done: bool,
}

impl<R: BufRead> TableReader<R> {
    /// Read the header line and prepare to read rows.
    ///
    /// # Errors
    /// Returns [`ReadError::MissingHeader`] for an empty stream, or the I/O
    /// and UTF-8 errors from reading the header.
    pub fn new(reader: R, dialect: Dialect) -> Result<Self, ReadError> {
        let (records, columns) = match csv_layout(&dialect) {
            Some((separator, terminator)) => {
                let mut reader = csv::ReaderBuilder::new()
                    .has_headers(false)
                    .delimiter(separator)
                    .terminator(terminator)
                    .quoting(false)
                    .trim(csv::Trim::All)
                    .flexible(true)
                    .from_reader(reader);
                let mut record = csv::StringRecord::new();
                if !reader.read_record(&mut record).map_err(csv_error)? {
                    return Err(ReadError::MissingHeader);
                }
                let columns = record.iter().map(str::to_string).collect();
                (Records::Csv { reader, record }, columns)
            }
            None => {
                let mut segments = SegmentReader::new(reader, dialect.clone());
                let columns = segments.header()?;
                (Records::Segments(segments), columns)
            }
        };

        log::debug!("table header: {columns:?}");
        Ok(Self {
            records,
            dialect,
            columns,
            done: false,
        })
    }

    /// Header columns in stream order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// The dialect the stream is parsed with.
    pub fn dialect(&self) -> &Dialect {
        &self.dialect
    }

    /// Give back the underlying reader.
    pub fn into_inner(self) -> R {
        match self.records {
            Records::Csv { reader, .. } => reader.into_inner(),
            Records::Segments(segments) => segments.reader,
        }
    }
}

impl<R: BufRead> Iterator for TableReader<R> {
    type Item = Result<Values, ReadError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let columns = &self.columns;

        let item = match &mut self.records {
            Records::Csv { reader, record } => match reader.read_record(record) {
                Ok(false) => None,
                Ok(true) => {
                    let line = record.position().map_or(0, |p| p.line() as usize);
                    let fields: Vec<&str> = record.iter().collect();
                    Some(parse_row(columns, line, &fields))
                }
                Err(error) => {
                    self.done = error.is_io_error();
                    Some(Err(csv_error(error)))
                }
            },
            Records::Segments(segments) => segments.next_row(columns),
        };

        if item.is_none() || matches!(item, Some(Err(ReadError::Io(_)))) {
            self.done = true;
        }
        item
    }
}

/// Splits a stream on multi-byte delimiters and separators.
///
/// Every delimiter starts a new row, and only the complete delimiter sequence
/// ends one.
#[derive(Debug)]
struct SegmentReader<R> {
    reader: R,
    dialect: Dialect,
    /// Segments consumed so far; the header is line 1.
    line: usize,
    /// The last segment ended with a delimiter, so another row follows.
    row_pending: bool,
}

impl<R: BufRead> SegmentReader<R> {
    fn new(reader: R, dialect: Dialect) -> Self {
        Self {
            reader,
            dialect,
            line: 0,
            row_pending: false,
        }
    }

    fn header(&mut self) -> Result<Vec<String>, ReadError> {
        let (header, terminated) = self.read_segment()?;
        if header.is_empty() && !terminated {
            return Err(ReadError::MissingHeader);
        }
        self.row_pending = terminated;

        let header = self.decode(header)?;
        if header.is_empty() {
            return Ok(Vec::new());
        }
        Ok(split_fields(&header, &self.dialect.separator)
            .into_iter()
            .map(|name| name.trim().to_string())
            .collect())
    }

    /// Read up to and excluding the next row delimiter.
    ///
    /// Returns the segment and whether a delimiter ended it (as opposed to EOF).
    fn read_segment(&mut self) -> io::Result<(Vec<u8>, bool)> {
        self.line += 1;
        let delimiter = self.dialect.row_delimiter.as_bytes();
        let mut segment = Vec::new();

        let Some(&last) = delimiter.last() else {
            self.reader.read_to_end(&mut segment)?;
            return Ok((segment, false));
        };

        loop {
            if self.reader.read_until(last, &mut segment)? == 0 {
                return Ok((segment, false));
            }
            if segment.ends_with(delimiter) {
                segment.truncate(segment.len() - delimiter.len());
                return Ok((segment, true));
            }
        }
    }

    fn decode(&self, segment: Vec<u8>) -> Result<String, ReadError> {
        String::from_utf8(segment).map_err(|_| ReadError::InvalidUtf8 { line: self.line })
    }

    fn next_row(&mut self, columns: &[String]) -> Option<Result<Values, ReadError>> {
        while self.row_pending {
            let (segment, terminated) = match self.read_segment() {
                Ok(read) => read,
                Err(error) => {
                    self.row_pending = false;
                    return Some(Err(error.into()));
                }
            };
            self.row_pending = terminated;

            // With two or more columns the writer never emits an empty row,
            // so an empty segment is a stray terminator.
            if segment.is_empty() && columns.len() >= 2 {
                log::debug!("line {}: skipping empty line", self.line);
                continue;
            }

            let line = self.line;
            return Some(self.decode(segment).and_then(|text| {
                let fields = if columns.is_empty() && text.is_empty() {
                    Vec::new()
                } else {
                    split_fields(&text, &self.dialect.separator)
                };
                parse_row(columns, line, &fields)
            }));
        }
        None
    }
}

fn split_fields<'a>(segment: &'a str, separator: &str) -> Vec<&'a str> {
    if separator.is_empty() {
        vec![segment]
    } else {
        segment.split(separator).collect()
    }
}

/// Check the field count and parse every field of one row.
fn parse_row(columns: &[String], line: usize, fields: &[&str]) -> Result<Values, ReadError> {
    if fields.len() != columns.len() {
        return Err(ReadError::FieldCount {
            line,
            expected: columns.len(),
            found: fields.len(),
        });
    }

    fields
        .iter()
        .zip(columns)
        .map(|(field, column)| {
            parse_field(field).ok_or_else(|| ReadError::InvalidValue {
                line,
                column: column.clone(),
                value: field.to_string(),
            })
        })
        .collect()
}

/// `Some(None)` for an empty field, `None` when the text is not a number.
fn parse_field(field: &str) -> Option<Option<f64>> {
    let field = field.trim();
    if field.is_empty() {
        return Some(None);
    }
    field.parse().ok().map(Some)
}

/// A fully read table.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Values>,
}

impl Table {
    /// Number of data rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of the first column called `name`.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    /// Present values of the column at `index`, in row order.
    pub fn column_values(&self, index: usize) -> Vec<f64> {
        self.rows
            .iter()
            .filter_map(|row| row.get(index).copied().flatten())
            .collect()
    }

    /// The row at `index` keyed by column name, without its empty fields.
    ///
    /// Duplicate column names collapse to the last occurrence.
    pub fn row_map(&self, index: usize) -> Option<BTreeMap<String, f64>> {
        let row = self.rows.get(index)?;
        Some(
            self.columns
                .iter()
                .zip(row)
                .filter_map(|(column, value)| value.map(|v| (column.clone(), v)))
                .collect(),
        )
    }
}

/// Read a whole table, stopping after `max_rows` rows when given.
///
/// # Errors
/// Stops at the first row that fails to parse.
pub fn read_table<R: BufRead>(
    reader: R,
    dialect: Dialect,
    max_rows: Option<usize>,
) -> Result<Table, ReadError> {
    let mut reader = TableReader::new(reader, dialect)?;
    let rows = reader
        .by_ref()
        .take(max_rows.unwrap_or(usize::MAX))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Table {
        columns: reader.columns,
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::DelimitedTableWriter;

    fn read(text: &str, dialect: Dialect) -> Result<Table, ReadError> {
        read_table(text.as_bytes(), dialect, None)
    }

    #[test]
    fn test_reads_writer_output() {
        let mut out = String::new();
        let mut table = DelimitedTableWriter::csv(&mut out);
        for name in ["time", "temperature", "humidity"] {
            table.add_column(name);
        }
        table.write_header();
        table.write_row(&[("time", 0.0), ("temperature", 21.5), ("humidity", 40.25)]);
        table.write_row(&[("time", 1.0), ("humidity", 41.0)]);
        drop(table);

        let parsed = read(&out, Dialect::CSV).unwrap();
        assert_eq!(parsed.columns, ["time", "temperature", "humidity"]);
        assert_eq!(
            parsed.rows,
            vec![
                vec![Some(0.0), Some(21.5), Some(40.25)],
                vec![Some(1.0), None, Some(41.0)],
            ]
        );
    }

    #[test]
    fn test_tsv_stream() {
        let parsed = read("a\tb\n1\t2\n3\t4", Dialect::TSV).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed.rows[1], vec![Some(3.0), Some(4.0)]);
    }

    #[test]
    fn test_header_only() {
        let parsed = read("a,b", Dialect::CSV).unwrap();
        assert_eq!(parsed.columns, ["a", "b"]);
        assert!(parsed.is_empty());
    }

    #[test]
    fn test_empty_stream_has_no_header() {
        assert!(matches!(
            read("", Dialect::CSV),
            Err(ReadError::MissingHeader)
        ));
    }

    #[test]
    fn test_trailing_terminator_is_skipped() {
        let parsed = read("a,b\r\n1.0,2.0\r\n", Dialect::CSV).unwrap();
        assert_eq!(parsed.len(), 1);
    }

    #[test]
    fn test_blank_lines_are_skipped() {
        let parsed = read("a\n\n2.0", Dialect::TSV).unwrap();
        assert_eq!(parsed.rows, vec![vec![Some(2.0)]]);

        let parsed = read("a,b\r\n\r\n1,2\r\n\r\n", Dialect::CSV).unwrap();
        assert_eq!(parsed.rows, vec![vec![Some(1.0), Some(2.0)]]);
    }

    #[test]
    fn test_crlf_preset_accepts_bare_line_feeds() {
        let parsed = read("a,b\n1.0,\n2.0,3", Dialect::CSV).unwrap();
        assert_eq!(
            parsed.rows,
            vec![vec![Some(1.0), None], vec![Some(2.0), Some(3.0)]]
        );
    }

    #[test]
    fn test_custom_dialect_single_column_empty_row_is_kept() {
        let parsed = read("a||||2.0", Dialect::new(";", "||")).unwrap();
        assert_eq!(parsed.rows, vec![vec![None], vec![Some(2.0)]]);
    }

    #[test]
    fn test_custom_dialect_needs_full_delimiter() {
        let parsed = read("a::b\r\n1.0::\n2.0", Dialect::new("::", "\r\n")).unwrap();
        assert_eq!(parsed.rows, vec![vec![Some(1.0), Some(2.0)]]);
    }

    #[test]
    fn test_custom_dialect_empty_stream() {
        assert!(matches!(
            read("", Dialect::new("::", "\n")),
            Err(ReadError::MissingHeader)
        ));
    }

    #[test]
    fn test_field_count_mismatch() {
        let mut reader = TableReader::new("a,b,c\r\n1,2\r\n1,2,3".as_bytes(), Dialect::CSV).unwrap();
        match reader.next() {
            Some(Err(ReadError::FieldCount {
                line,
                expected,
                found,
            })) => {
                assert_eq!((line, expected, found), (2, 3, 2));
            }
            other => panic!("unexpected {other:?}"),
        }
        // The reader continues after a bad row.
        assert_eq!(
            reader.next().unwrap().unwrap(),
            vec![Some(1.0), Some(2.0), Some(3.0)]
        );
        assert!(reader.next().is_none());
    }

    #[test]
    fn test_invalid_value() {
        let error = read("a,b\r\n1.0,ovf", Dialect::CSV).unwrap_err();
        assert_eq!(
            error.to_string(),
            "line 2: invalid value \"ovf\" in column \"b\""
        );
    }

    #[test]
    fn test_invalid_utf8() {
        let bytes: &[u8] = b"a\n\xff";
        let error = read_table(bytes, Dialect::TSV, None).unwrap_err();
        assert!(matches!(error, ReadError::InvalidUtf8 { .. }));

        let error = read_table(bytes, Dialect::new("::", "\n"), None).unwrap_err();
        assert!(matches!(error, ReadError::InvalidUtf8 { line: 2 }));
    }

    #[test]
    fn test_backend_choice() {
        assert!(csv_layout(&Dialect::CSV).is_some());
        assert!(csv_layout(&Dialect::TSV).is_some());
        assert!(csv_layout(&Dialect::new(";", "\n")).is_some());
        assert!(csv_layout(&Dialect::new("::", "\n")).is_none());
        assert!(csv_layout(&Dialect::new(",", "\n\n")).is_none());
        assert!(csv_layout(&Dialect::new("", "\n")).is_none());
    }

    #[test]
    fn test_into_inner_returns_reader() {
        let reader = TableReader::new("a\tb\n1\t2".as_bytes(), Dialect::TSV).unwrap();
        assert_eq!(reader.dialect(), &Dialect::TSV);
        let _rest: &[u8] = reader.into_inner();
    }

    #[test]
    fn test_max_rows() {
        let parsed = read_table("n\n1\n2\n3".as_bytes(), Dialect::TSV, Some(2)).unwrap();
        assert_eq!(parsed.rows, vec![vec![Some(1.0)], vec![Some(2.0)]]);
    }

    #[test]
    fn test_fields_are_trimmed() {
        let parsed = read(" a , b \r\n 1.5 , ", Dialect::CSV).unwrap();
        assert_eq!(parsed.columns, ["a", "b"]);
        assert_eq!(parsed.rows[0], vec![Some(1.5), None]);
    }

    #[test]
    fn test_custom_dialect() {
        let parsed = read("x;y||1;2||3;", Dialect::new(";", "||")).unwrap();
        assert_eq!(parsed.rows, vec![vec![Some(1.0), Some(2.0)], vec![Some(3.0), None]]);
    }

    #[test]
    fn test_table_accessors() {
        let table = Table {
            columns: vec!["t".into(), "v".into(), "v".into()],
            rows: vec![
                vec![Some(0.0), Some(1.0), None],
                vec![Some(1.0), None, Some(5.0)],
            ],
        };
        assert_eq!(table.position("v"), Some(1));
        assert_eq!(table.position("missing"), None);
        assert_eq!(table.column_values(1), vec![1.0]);
        assert_eq!(table.column_values(0), vec![0.0, 1.0]);

        let row = table.row_map(1).unwrap();
        assert_eq!(row.get("v"), Some(&5.0));
        assert_eq!(row.len(), 2);
        assert!(table.row_map(2).is_none());
    }
}

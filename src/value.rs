//! Text rendering of numeric fields.

use std::fmt;

/// How a numeric field is rendered into the table.
///
/// The default is [`ValueFormat::Shortest`], which never loses information.
/// Use [`ValueFormat::Fixed`] to mimic a fixed-decimals print facility; the
/// common microcontroller default is `Fixed(2)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValueFormat {
    /// Shortest text that parses back to the same `f64`, e.g. `1.0`, `0.1`, `1e21`.
    #[default]
    Shortest,
    /// Exactly this many digits after the decimal point.
    Fixed(u8),
}

impl ValueFormat {
    /// Wrap `value` so it renders with this format.
    ///
    /// # Example
    /// ```
    /// use sensor_table::ValueFormat;
    ///
    /// assert_eq!(ValueFormat::Shortest.display(2.0).to_string(), "2.0");
    /// assert_eq!(ValueFormat::Fixed(2).display(2.0).to_string(), "2.00");
    /// ```
    pub fn display(self, value: f64) -> FormattedValue {
        FormattedValue {
            value,
            format: self,
        }
    }
}

/// A value paired with its [`ValueFormat`], see [`ValueFormat::display`].
#[derive(Debug, Clone, Copy)]
pub struct FormattedValue {
    value: f64,
    format: ValueFormat,
}

impl fmt::Display for FormattedValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.format {
            // Debug output is the shortest round-trip form and keeps the `.0`.
            ValueFormat::Shortest => write!(f, "{:?}", self.value),
            ValueFormat::Fixed(digits) => write!(f, "{:.*}", usize::from(digits), self.value),
        }
    }
}

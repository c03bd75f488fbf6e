//! Output sinks for table text.
//!
//! A [`Sink`] is the "print this text fragment" capability the table writer
//! targets. Every header name, separator, row delimiter and field value goes
//! through [`Sink::print`] as its own fragment.

use crate::value::ValueFormat;
use std::fmt;
use std::io;

/// Destination for table text.
///
/// Printing cannot fail from the caller's point of view. Sinks that wrap a
/// fallible transport record the failure themselves (see [`IoSink`]).
pub trait Sink {
    /// Print a text fragment.
    fn print(&mut self, fragment: &str);

    /// Print a numeric value rendered with `format`.
    ///
    /// The default implementation formats straight into [`Sink::print`]
    /// without allocating, so the value may arrive as several fragments.
    fn print_value(&mut self, value: f64, format: ValueFormat) {
        let mut out = Fragments(self);
        // Fragments::write_str never fails.
        let _ = fmt::Write::write_fmt(&mut out, format_args!("{}", format.display(value)));
    }
}

/// Adapts a [`Sink`] to [`fmt::Write`].
struct Fragments<'a, S: ?Sized>(&'a mut S);

impl<S: Sink + ?Sized> fmt::Write for Fragments<'_, S> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.0.print(s);
        Ok(())
    }
}

impl Sink for String {
    fn print(&mut self, fragment: &str) {
        self.push_str(fragment);
    }
}

impl<S: Sink + ?Sized> Sink for &mut S {
    fn print(&mut self, fragment: &str) {
        (**self).print(fragment);
    }

    fn print_value(&mut self, value: f64, format: ValueFormat) {
        (**self).print_value(value, format);
    }
}

/// A [`Sink`] over any byte writer: a serial port, stdout, a file.
///
/// The first I/O error is latched and every later fragment is discarded, so a
/// half-written table never continues after a gap. Check [`IoSink::error`] or
/// [`IoSink::into_inner`] once writing is done.
#[derive(Debug)]
pub struct IoSink<W: io::Write> {
    inner: W,
    error: Option<io::Error>,
}

impl<W: io::Write> IoSink<W> {
    /// Wrap a byte writer.
    pub fn new(inner: W) -> Self {
        Self { inner, error: None }
    }

    /// The latched write error, if any.
    pub fn error(&self) -> Option<&io::Error> {
        self.error.as_ref()
    }

    /// Remove and return the latched write error, resuming output.
    pub fn take_error(&mut self) -> Option<io::Error> {
        self.error.take()
    }

    /// Flush the underlying writer.
    ///
    /// # Errors
    /// Returns the latched write error first, otherwise the flush result.
    pub fn flush(&mut self) -> io::Result<()> {
        if let Some(error) = &self.error {
            return Err(io::Error::new(error.kind(), error.to_string()));
        }
        self.inner.flush()
    }

    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    pub fn get_mut(&mut self) -> &mut W {
        &mut self.inner
    }

    /// Unwrap the writer.
    ///
    /// # Errors
    /// Returns the latched write error instead of the writer if output was lost.
    pub fn into_inner(self) -> io::Result<W> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(self.inner),
        }
    }
}

impl<W: io::Write> Sink for IoSink<W> {
    fn print(&mut self, fragment: &str) {
        if self.error.is_some() {
            return;
        }
        if let Err(error) = self.inner.write_all(fragment.as_bytes()) {
            log::warn!("sink write failed, discarding further output: {error}");
            self.error = Some(error);
        }
    }
}

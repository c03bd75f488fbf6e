//! Row lookup.
//!
//! A row maps column names to values. Output order comes from the writer's
//! column list, so a row only needs lookup by name, never iteration.

use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;

/// Values of one table row, looked up by column name.
pub trait Row {
    /// The value for `column`, or `None` to leave the field empty.
    fn value(&self, column: &str) -> Option<f64>;
}

impl<R: Row + ?Sized> Row for &R {
    fn value(&self, column: &str) -> Option<f64> {
        (**self).value(column)
    }
}

impl Row for BTreeMap<String, f64> {
    fn value(&self, column: &str) -> Option<f64> {
        self.get(column).copied()
    }
}

impl Row for BTreeMap<&str, f64> {
    fn value(&self, column: &str) -> Option<f64> {
        self.get(column).copied()
    }
}

impl<H: BuildHasher> Row for HashMap<String, f64, H> {
    fn value(&self, column: &str) -> Option<f64> {
        self.get(column).copied()
    }
}

impl<H: BuildHasher> Row for HashMap<&str, f64, H> {
    fn value(&self, column: &str) -> Option<f64> {
        self.get(column).copied()
    }
}

/// Name/value pairs, for callers that cannot allocate a map. The first pair
/// with a matching name wins.
impl Row for [(&str, f64)] {
    fn value(&self, column: &str) -> Option<f64> {
        self.iter()
            .find(|(name, _)| *name == column)
            .map(|(_, value)| *value)
    }
}

impl<const N: usize> Row for [(&str, f64); N] {
    fn value(&self, column: &str) -> Option<f64> {
        self.as_slice().value(column)
    }
}

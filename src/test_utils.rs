use crate::sink::Sink;

/// A sink that keeps every printed fragment separately.
///
/// Tests use it to check which fragments were emitted, not just the
/// concatenated text.
#[derive(Debug, Default)]
pub struct FragmentLog {
    pub fragments: Vec<String>,
}

impl FragmentLog {
    /// All fragments concatenated, as a text sink would have received them.
    pub fn joined(&self) -> String {
        self.fragments.concat()
    }

    /// Number of fragments equal to `fragment`.
    pub fn count(&self, fragment: &str) -> usize {
        self.fragments.iter().filter(|f| *f == fragment).count()
    }
}

impl Sink for FragmentLog {
    fn print(&mut self, fragment: &str) {
        self.fragments.push(fragment.to_string());
    }
}

//! Summary statistics for one table column.

/// Summary of the present values of one column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnStats {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    /// Sample standard deviation (divisor `n - 1`); `None` below two samples.
    pub std_dev: Option<f64>,
    pub min: f64,
    pub max: f64,
}

impl ColumnStats {
    /// Summarize `values`, or `None` when there are no samples.
    ///
    /// Ordering uses [`f64::total_cmp`], so a NaN sample sorts after every
    /// number and propagates into the mean.
    ///
    /// # Example
    /// ```
    /// use sensor_table::ColumnStats;
    ///
    /// let stats = ColumnStats::from_values(&[3.0, 1.0, 2.0]).unwrap();
    /// assert_eq!(stats.median, 2.0);
    /// assert_eq!(stats.std_dev, Some(1.0));
    /// ```
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }

        let count = values.len();
        let mean = values.iter().sum::<f64>() / count as f64;

        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);
        let mid = count / 2;
        let median = if count % 2 == 1 {
            sorted[mid]
        } else {
            (sorted[mid - 1] + sorted[mid]) / 2.0
        };

        let std_dev = (count > 1).then(|| {
            let squares: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
            (squares / (count - 1) as f64).sqrt()
        });

        Some(Self {
            count,
            mean,
            median,
            std_dev,
            min: sorted[0],
            max: sorted[count - 1],
        })
    }
}

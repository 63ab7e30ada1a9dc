// src/data_input/country_data.rs

use crate::metrics::{Metric, METRIC_COUNT};

/// Structure to hold data parsed from a single row of the country CSV.
/// Uses `Option<f64>` for metrics so blank or unparseable cells stay distinguishable from zero.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct CountryRecord {
    pub country: String,                      // Country display name.
    pub code: String,                         // ISO 3166-1 alpha-3 code.
    pub values: [Option<f64>; METRIC_COUNT], // Indexed by `Metric::index()`.
}

impl CountryRecord {
    pub fn value(&self, metric: Metric) -> Option<f64> {
        self.values[metric.index()]
    }
}

/// Everything the parser extracted from one input file.
#[derive(Debug, Default, Clone)]
pub struct ParsedTable {
    pub rows: Vec<CountryRecord>,
    /// Whether each metric's column exists in the header row.
    pub metrics_found: [bool; METRIC_COUNT],
    /// Rows dropped for blank keys or CSV record errors.
    pub skipped_rows: usize,
}

impl ParsedTable {
    pub fn has_metric(&self, metric: Metric) -> bool {
        self.metrics_found[metric.index()]
    }

    pub fn available_metrics(&self) -> Vec<Metric> {
        Metric::ALL
            .iter()
            .copied()
            .filter(|m| self.has_metric(*m))
            .collect()
    }
}

// src/data_input/country_data.rs

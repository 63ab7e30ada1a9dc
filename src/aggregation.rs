// src/aggregation.rs

//! Per-country aggregation of parsed rows.
//!
//! ```text
//! rows                               groups (sorted by name, code)
//! Kenya KEN htn=20                   Ghana GHA rows=1 htn=30
//! Kenya KEN htn=24        →          Kenya KEN rows=3 htn=22 (mean of present values)
//! Kenya KEN htn=NA
//! Ghana GHA htn=30
//! ```

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;

use ndarray::Array1;
use ndarray_stats::QuantileExt;
use tracing::{info, warn};

use crate::data_input::country_data::ParsedTable;
use crate::error::{GlobeError, Result};
use crate::metrics::{Metric, METRIC_COUNT};

/// One output row: a (country, code) group with the mean of every metric.
#[derive(Debug, Clone, PartialEq)]
pub struct CountryAggregate {
    pub country: String,
    pub code: String,
    /// Number of input rows carrying this key.
    pub row_count: usize,
    /// Mean over the rows where the metric was present.
    pub means: [Option<f64>; METRIC_COUNT],
}

impl CountryAggregate {
    pub fn mean(&self, metric: Metric) -> Option<f64> {
        self.means[metric.index()]
    }
}

#[derive(Debug, Clone, Default)]
pub struct AggregatedTable {
    pub rows: Vec<CountryAggregate>,
    pub metrics_found: [bool; METRIC_COUNT],
}

/// Running sums for one group.
#[derive(Default)]
struct GroupAccumulator {
    row_count: usize,
    sums: [f64; METRIC_COUNT],
    counts: [usize; METRIC_COUNT],
}

impl GroupAccumulator {
    fn add(&mut self, values: &[Option<f64>; METRIC_COUNT]) {
        self.row_count += 1;
        for (i, value) in values.iter().enumerate() {
            if let Some(v) = value {
                self.sums[i] += v;
                self.counts[i] += 1;
            }
        }
    }

    fn means(&self) -> [Option<f64>; METRIC_COUNT] {
        let mut means = [None; METRIC_COUNT];
        for (i, mean) in means.iter_mut().enumerate() {
            if self.counts[i] > 0 {
                *mean = Some(self.sums[i] / self.counts[i] as f64);
            }
        }
        means
    }
}

/// Groups rows by (country name, country code) and averages every metric.
pub fn aggregate(parsed: &ParsedTable) -> Result<AggregatedTable> {
    if parsed.rows.is_empty() {
        return Err(GlobeError::NoData);
    }

    let mut groups: BTreeMap<(String, String), GroupAccumulator> = BTreeMap::new();
    for row in &parsed.rows {
        groups
            .entry((row.country.clone(), row.code.clone()))
            .or_default()
            .add(&row.values);
    }

    let rows: Vec<CountryAggregate> = groups
        .into_iter()
        .map(|((country, code), acc)| CountryAggregate {
            country,
            code,
            row_count: acc.row_count,
            means: acc.means(),
        })
        .collect();

    let mut names_by_code: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for row in &rows {
        names_by_code
            .entry(row.code.as_str())
            .or_default()
            .push(row.country.as_str());
    }
    for (code, names) in names_by_code.iter().filter(|(_, names)| names.len() > 1) {
        warn!(
            "Country code '{code}' appears under several names ({}); maps keep '{}'",
            names.join(", "),
            names[0]
        );
    }

    info!(
        "Aggregated {} rows into {} countries.",
        parsed.rows.len(),
        rows.len()
    );

    Ok(AggregatedTable {
        rows,
        metrics_found: parsed.metrics_found,
    })
}

impl AggregatedTable {
    pub fn has_metric(&self, metric: Metric) -> bool {
        self.metrics_found[metric.index()]
    }

    /// Errors unless the metric's column was present in the input.
    pub fn require_metric(&self, metric: Metric) -> Result<()> {
        if self.has_metric(metric) {
            Ok(())
        } else {
            Err(GlobeError::MetricUnavailable(metric))
        }
    }

    pub fn total_rows(&self) -> usize {
        self.rows.iter().map(|r| r.row_count).sum()
    }

    /// Rows drawn on a map: the first group of each code in table order.
    pub fn render_rows(&self) -> Vec<&CountryAggregate> {
        let mut seen: HashSet<&str> = HashSet::new();
        self.rows
            .iter()
            .filter(|row| seen.insert(row.code.as_str()))
            .collect()
    }

    /// Min and max of the rendered means, or `None` when no country has a value.
    pub fn value_range(&self, metric: Metric) -> Option<(f64, f64)> {
        let present: Array1<f64> = self
            .render_rows()
            .iter()
            .filter_map(|r| r.mean(metric))
            .filter(|v| v.is_finite())
            .collect();
        match (present.min(), present.max()) {
            (Ok(min), Ok(max)) => Some((*min, *max)),
            _ => None,
        }
    }

    /// Code → mean lookup over [`render_rows`](Self::render_rows).
    ///
    /// A duplicate code keeps the first group even when that group has no
    /// value, so the GIF and HTML exports agree.
    pub fn values_by_code(&self, metric: Metric) -> HashMap<&str, f64> {
        self.render_rows()
            .into_iter()
            .filter_map(|row| row.mean(metric).map(|v| (row.code.as_str(), v)))
            .collect()
    }

    /// Writes the table with renamed metric columns plus the group size.
    pub fn write_csv(&self, path: &Path) -> Result<()> {
        let mut writer = csv::Writer::from_path(path)?;

        let mut header = vec!["Country".to_string(), "Country Code".to_string()];
        header.extend(Metric::ALL.iter().map(|m| m.label().to_string()));
        header.push("Rows".to_string());
        writer.write_record(&header)?;

        for row in &self.rows {
            let mut record = vec![row.country.clone(), row.code.clone()];
            record.extend(
                row.means
                    .iter()
                    .map(|mean| mean.map(|v| v.to_string()).unwrap_or_default()),
            );
            record.push(row.row_count.to_string());
            writer.write_record(&record)?;
        }
        writer.flush()?;
        info!("Aggregated table saved as '{}'.", path.display());
        Ok(())
    }
}


// src/aggregation.rs

// src/error.rs

//! Error type shared by every stage of the globe pipeline.
//!
//! Row-level data problems (blank keys, unparseable cells) are logged and
//! skipped by the parser; everything here aborts the run.

use thiserror::Error;

use crate::metrics::Metric;

#[derive(Debug, Error)]
pub enum GlobeError {
    /// Failed to read or write a file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The CSV reader rejected the input.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Required identity columns are absent from the header row.
    #[error("Missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    /// A metric name did not match any known column or label.
    #[error("Unknown metric '{0}' (expected one of htn, phy, nurse, pharma, chws, hw)")]
    UnknownMetric(String),

    /// The metric is known but its column is not in the input file.
    #[error(
        "Metric '{}' is not available: column '{}' not found in input",
        .0.label(),
        .0.column()
    )]
    MetricUnavailable(Metric),

    /// Nothing survived parsing.
    #[error("No usable data rows in input")]
    NoData,

    /// GeoJSON could not be turned into country shapes.
    #[error("Geometry error: {0}")]
    Geometry(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The TOML configuration file could not be parsed.
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// A configuration value is syntactically valid but unusable.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The drawing backend failed.
    #[error("Render error: {0}")]
    Render(String),
}

pub type Result<T> = std::result::Result<T, GlobeError>;

impl GlobeError {
    /// Wraps a plotters drawing error, which is generic over the backend.
    pub fn render<E: std::fmt::Display>(err: E) -> Self {
        GlobeError::Render(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_columns_lists_every_column() {
        let err = GlobeError::MissingColumns(vec!["'Country_x'".into(), "'Country Code'".into()]);
        assert_eq!(
            err.to_string(),
            "Missing required columns: 'Country_x', 'Country Code'"
        );
    }

    #[test]
    fn test_metric_unavailable_names_column() {
        let err = GlobeError::MetricUnavailable(Metric::Nurses);
        assert_eq!(
            err.to_string(),
            "Metric 'Nurses' is not available: column 'nurse' not found in input"
        );
    }
}

// src/error.rs

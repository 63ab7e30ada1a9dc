// src/export/mod.rs

pub mod gif;
pub mod html;

use tracing::warn;

use crate::aggregation::AggregatedTable;
use crate::config::RenderConfig;
use crate::error::{GlobeError, Result};
use crate::metrics::{Metric, DEFAULT_SELECTION};
use crate::plot_framework::color_range;

/// Resolves the metrics to render.
///
/// Explicitly requested metrics must all be present in the input. With no
/// request, the default selection is filtered down to what the input provides.
pub fn select_metrics(table: &AggregatedTable, requested: &[Metric]) -> Result<Vec<Metric>> {
    let mut selected: Vec<Metric> = Vec::new();
    if requested.is_empty() {
        for metric in DEFAULT_SELECTION {
            if table.has_metric(metric) {
                selected.push(metric);
            } else {
                warn!("Skipping {}: column '{}' not in input", metric.label(), metric.column());
            }
        }
        if selected.is_empty() {
            return Err(GlobeError::MetricUnavailable(DEFAULT_SELECTION[0]));
        }
    } else {
        for &metric in requested {
            table.require_metric(metric)?;
            if !selected.contains(&metric) {
                selected.push(metric);
            }
        }
    }
    Ok(selected)
}

/// Title used when the configuration does not override it.
pub fn single_metric_title(metric: Metric) -> String {
    format!("Rotating Globe: {}", metric.long_name())
}

/// Color range for `metric`: configured bounds, else the data range.
pub fn metric_range(table: &AggregatedTable, config: &RenderConfig, metric: Metric) -> (f64, f64) {
    let style = config.style_for(metric);
    color_range(style.zmin, style.zmax, table.value_range(metric))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregation::CountryAggregate;
    use crate::metrics::METRIC_COUNT;

    fn table(found: &[Metric]) -> AggregatedTable {
        let mut metrics_found = [false; METRIC_COUNT];
        let mut means = [None; METRIC_COUNT];
        for m in found {
            metrics_found[m.index()] = true;
            means[m.index()] = Some(10.0 + m.index() as f64);
        }
        AggregatedTable {
            rows: vec![CountryAggregate {
                country: "Kenya".into(),
                code: "KEN".into(),
                row_count: 1,
                means,
            }],
            metrics_found,
        }
    }

    #[test]
    fn test_default_selection_drops_missing_columns() {
        let t = table(&[Metric::Htn, Metric::Nurses, Metric::TotalHw]);
        assert_eq!(select_metrics(&t, &[]).unwrap(), vec![Metric::Htn, Metric::Nurses]);
    }

    #[test]
    fn test_explicit_selection_requires_columns() {
        let t = table(&[Metric::Htn]);
        assert!(matches!(
            select_metrics(&t, &[Metric::Htn, Metric::Chws]),
            Err(GlobeError::MetricUnavailable(Metric::Chws))
        ));
        assert_eq!(
            select_metrics(&t, &[Metric::Htn, Metric::Htn]).unwrap(),
            vec![Metric::Htn]
        );
    }

    #[test]
    fn test_no_default_metric_available() {
        let t = table(&[Metric::TotalHw]);
        assert!(select_metrics(&t, &[]).is_err());
        assert_eq!(select_metrics(&t, &[Metric::TotalHw]).unwrap(), vec![Metric::TotalHw]);
    }

    #[test]
    fn test_metric_range_uses_configured_bounds_then_data() {
        let t = table(&[Metric::Htn, Metric::TotalHw]);
        let config = RenderConfig::default();
        assert_eq!(metric_range(&t, &config, Metric::Htn), (0.0, 60.0));
        // Single value, auto bounds: padded around it
        assert_eq!(metric_range(&t, &config, Metric::TotalHw), (14.5, 15.5));
    }
}

// src/export/mod.rs

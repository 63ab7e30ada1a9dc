// src/export/gif.rs

use std::fs;
use std::path::{Path, PathBuf};

use plotters::backend::BitMapBackend;
use plotters::drawing::IntoDrawingArea;
use tracing::{debug, info};

use crate::aggregation::AggregatedTable;
use crate::colorscale::ColorScale;
use crate::config::{GlobeStyle, RenderConfig};
use crate::error::{GlobeError, Result};
use crate::export::{metric_range, single_metric_title};
use crate::geo::geometry::CountryShape;
use crate::geo::projection::frame_longitudes;
use crate::metrics::Metric;
use crate::plot_framework::{draw_globe_frame, plain_title_lines, FrameSpec};

/// Settings for one GIF render, resolved from the configuration.
#[derive(Debug, Clone)]
pub struct GifOptions {
    pub output: PathBuf,
    /// Also write one PNG per frame into this directory.
    pub frames_dir: Option<PathBuf>,
    pub width: u32,
    pub height: u32,
    pub frame_ms: u32,
    pub step_deg: f64,
    pub tilt_deg: f64,
    pub draw_labels: bool,
    pub title: String,
    pub note: Option<String>,
    pub globe: GlobeStyle,
    pub colorscale: ColorScale,
    pub colorbar_title: String,
    pub zrange: (f64, f64),
}

impl GifOptions {
    pub fn from_config(
        config: &RenderConfig,
        table: &AggregatedTable,
        metric: Metric,
        output: &Path,
    ) -> Self {
        let style = config.style_for(metric);
        GifOptions {
            output: output.to_path_buf(),
            frames_dir: None,
            width: config.gif.width,
            height: config.gif.height,
            frame_ms: config.animation.frame_ms,
            step_deg: config.animation.step_deg,
            tilt_deg: config.animation.tilt_deg,
            draw_labels: config.gif.draw_labels,
            title: config
                .title
                .clone()
                .unwrap_or_else(|| single_metric_title(metric)),
            note: config.note().map(str::to_string),
            globe: config.globe.resolve(),
            colorscale: style.colorscale,
            colorbar_title: style.colorbar_title(metric),
            zrange: metric_range(table, config, metric),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderSummary {
    pub frames_written: usize,
    /// Shapes filled from the data.
    pub countries_with_data: usize,
    /// Shapes drawn in the plain land color.
    pub countries_without_data: usize,
}

/// Renders the rotating globe for `metric` into an animated GIF.
pub fn render_gif(
    table: &AggregatedTable,
    shapes: &[CountryShape],
    metric: Metric,
    options: &GifOptions,
) -> Result<RenderSummary> {
    table.require_metric(metric)?;
    let longitudes = frame_longitudes(options.step_deg)?;
    let values = table.values_by_code(metric);

    let countries_with_data = shapes
        .iter()
        .filter(|s| values.contains_key(s.code.as_str()))
        .count();
    let summary = RenderSummary {
        frames_written: longitudes.len(),
        countries_with_data,
        countries_without_data: shapes.len() - countries_with_data,
    };

    info!("--- Generating Rotating Globe GIF ({}) ---", metric.label());
    info!(
        "  {} frames at {} ms, {}x{} px. {} of {} countries have data.",
        longitudes.len(),
        options.frame_ms,
        options.width,
        options.height,
        summary.countries_with_data,
        shapes.len()
    );
    let unmatched = values.len().saturating_sub(countries_with_data);
    if unmatched > 0 {
        info!("  {unmatched} data codes have no matching shape.");
    }

    if let Some(dir) = &options.frames_dir {
        fs::create_dir_all(dir)?;
    }

    let title_lines = plain_title_lines(&options.title);
    let spec = FrameSpec {
        title_lines: &title_lines,
        metric_label: metric.label(),
        colorbar_title: &options.colorbar_title,
        colorscale: options.colorscale,
        zrange: options.zrange,
        globe: &options.globe,
        note: options.note.as_deref(),
        draw_labels: options.draw_labels,
        tilt_deg: options.tilt_deg,
    };
    let size = (options.width, options.height);

    let root = BitMapBackend::gif(&options.output, size, options.frame_ms)
        .map_err(GlobeError::render)?
        .into_drawing_area();

    for (index, &lon) in longitudes.iter().enumerate() {
        let stats =
            draw_globe_frame(&root, &spec, shapes, &values, lon).map_err(GlobeError::render)?;
        root.present().map_err(GlobeError::render)?;
        debug!(
            "  Frame {index} (lon {lon}): {} polygons with data, {} without.",
            stats.polygons_with_data, stats.polygons_without_data
        );

        if let Some(dir) = &options.frames_dir {
            let frame_path = dir.join(frame_file_name(index));
            let frame = BitMapBackend::new(&frame_path, size).into_drawing_area();
            draw_globe_frame(&frame, &spec, shapes, &values, lon).map_err(GlobeError::render)?;
            frame.present().map_err(GlobeError::render)?;
        }
    }

    if let Some(dir) = &options.frames_dir {
        info!("  {} PNG frames saved in '{}'.", longitudes.len(), dir.display());
    }
    info!("  Rotating globe saved as '{}'.", options.output.display());
    Ok(summary)
}

/// `frame_000.png`, `frame_001.png`, ...
pub fn frame_file_name(index: usize) -> String {
    format!("frame_{index:03}.png")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregation::CountryAggregate;
    use crate::geo::geometry::{CountryPolygon, GeoPoint};
    use crate::metrics::METRIC_COUNT;

    fn square(code: &str, lon: f64, lat: f64) -> CountryShape {
        let ring = vec![
            GeoPoint { lon, lat },
            GeoPoint { lon: lon + 20.0, lat },
            GeoPoint { lon: lon + 20.0, lat: lat + 20.0 },
            GeoPoint { lon, lat: lat + 20.0 },
            GeoPoint { lon, lat },
        ];
        CountryShape {
            code: code.to_string(),
            name: code.to_string(),
            polygons: vec![CountryPolygon {
                exterior: ring,
                holes: Vec::new(),
            }],
        }
    }

    fn table() -> AggregatedTable {
        let mut metrics_found = [false; METRIC_COUNT];
        metrics_found[Metric::Htn.index()] = true;
        let mut means = [None; METRIC_COUNT];
        means[Metric::Htn.index()] = Some(30.0);
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

    fn options(dir: &Path) -> GifOptions {
        let mut config = RenderConfig::default();
        config.animation.step_deg = 120.0;
        config.gif.width = 96;
        config.gif.height = 96;
        config.gif.draw_labels = false;
        GifOptions::from_config(&config, &table(), Metric::Htn, &dir.join("globe.gif"))
    }

    #[test]
    fn test_frame_file_name() {
        assert_eq!(frame_file_name(0), "frame_000.png");
        assert_eq!(frame_file_name(42), "frame_042.png");
        assert_eq!(frame_file_name(1234), "frame_1234.png");
    }

    #[test]
    fn test_options_from_config() {
        let dir = tempfile::tempdir().unwrap();
        let opts = options(dir.path());
        assert_eq!(opts.title, "Rotating Globe: Hypertension Prevalence");
        assert_eq!(opts.zrange, (0.0, 60.0));
        assert_eq!(opts.colorbar_title, "HTN Prevalence (%)");
        assert_eq!(opts.colorscale, ColorScale::Reds);
    }

    #[test]
    fn test_render_gif_writes_animation_and_frames() {
        let dir = tempfile::tempdir().unwrap();
        let mut opts = options(dir.path());
        opts.frames_dir = Some(dir.path().join("frames"));
        let shapes = vec![square("KEN", 30.0, -10.0), square("PER", -80.0, -20.0)];

        let summary = render_gif(&table(), &shapes, Metric::Htn, &opts).unwrap();
        assert_eq!(
            summary,
            RenderSummary {
                frames_written: 3,
                countries_with_data: 1,
                countries_without_data: 1,
            }
        );
        assert!(fs::metadata(&opts.output).unwrap().len() > 0);
        for index in 0..3 {
            assert!(dir.path().join("frames").join(frame_file_name(index)).exists());
        }
    }

    #[test]
    fn test_render_gif_rejects_unavailable_metric() {
        let dir = tempfile::tempdir().unwrap();
        let opts = options(dir.path());
        let result = render_gif(&table(), &[square("KEN", 30.0, -10.0)], Metric::Nurses, &opts);
        assert!(matches!(result, Err(GlobeError::MetricUnavailable(Metric::Nurses))));
    }
}

// src/export/gif.rs

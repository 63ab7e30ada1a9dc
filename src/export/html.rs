// src/export/html.rs

//! Interactive HTML export.
//!
//! The globe is a plotly.js `choropleth` trace on an orthographic `geo`
//! subplot. Rotation is carried by animation frames that only move
//! `layout.geo.projection.rotation.lon`, so playback happens in the browser.

use std::fs;
use std::path::Path;

use serde_json::{json, Value};
use tracing::{debug, info};

use crate::aggregation::{AggregatedTable, CountryAggregate};
use crate::config::RenderConfig;
use crate::constants::{FONT_SIZE_MAIN_TITLE, FONT_SIZE_NOTE, PLOTLY_COLORSCALE_STOPS, STORY_TITLE};
use crate::error::{GlobeError, Result};
use crate::export::{metric_range, single_metric_title};
use crate::geo::projection::frame_longitudes;
use crate::metrics::Metric;
use crate::plot_framework::plain_title_lines;

const PLOT_DIV_ID: &str = "globe";
const TITLE_FONT_FAMILY: &str = "Georgia, Times New Roman, serif";

/// Page title: the configured override, the story title for several metrics,
/// or the metric's long name.
pub fn page_title(metrics: &[Metric], config: &RenderConfig) -> String {
    if let Some(title) = &config.title {
        return title.clone();
    }
    match metrics {
        [single] => single_metric_title(*single),
        _ => STORY_TITLE.to_string(),
    }
}

/// Title shown after picking `metric` from the dropdown.
pub fn dropdown_title(metric: Metric) -> String {
    format!("<i>{} Distribution <br> and Shortfalls</i>", metric.label())
}

fn colorscale_json(stops: Vec<(f64, String)>) -> Value {
    Value::Array(stops.into_iter().map(|(pos, color)| json!([pos, color])).collect())
}

/// Per-metric trace attributes shared by the trace itself and the dropdown.
struct TraceStyle {
    z: Vec<Option<f64>>,
    colorscale: Value,
    zmin: f64,
    zmax: f64,
    colorbar_title: String,
}

fn trace_style(
    table: &AggregatedTable,
    rows: &[&CountryAggregate],
    config: &RenderConfig,
    metric: Metric,
) -> TraceStyle {
    let style = config.style_for(metric);
    let (zmin, zmax) = metric_range(table, config, metric);
    TraceStyle {
        z: rows.iter().map(|r| r.mean(metric)).collect(),
        colorscale: colorscale_json(style.colorscale.plotly_stops(PLOTLY_COLORSCALE_STOPS)),
        zmin,
        zmax,
        colorbar_title: style.colorbar_title(metric),
    }
}

/// Builds the plotly figure (`data`, `layout`, `frames`) for `metrics`.
///
/// The first metric is shown initially; with more than one metric a dropdown
/// switches between them.
pub fn build_figure(
    table: &AggregatedTable,
    metrics: &[Metric],
    config: &RenderConfig,
) -> Result<Value> {
    let Some(&first) = metrics.first() else {
        return Err(GlobeError::InvalidConfig("no metric selected".into()));
    };
    for &metric in metrics {
        table.require_metric(metric)?;
    }

    let globe = config.globe.resolve();
    let animation = &config.animation;
    let longitudes = frame_longitudes(animation.step_deg)?;

    // plotly draws one shape per location, so each code appears once
    let rows = table.render_rows();
    let locations: Vec<&str> = rows.iter().map(|r| r.code.as_str()).collect();
    let names: Vec<&str> = rows.iter().map(|r| r.country.as_str()).collect();
    let initial = trace_style(table, &rows, config, first);

    let trace = json!({
        "type": "choropleth",
        "locations": locations,
        "locationmode": "ISO-3",
        "z": initial.z,
        "text": names,
        "colorscale": initial.colorscale,
        "zmin": initial.zmin,
        "zmax": initial.zmax,
        "colorbar": { "title": { "text": initial.colorbar_title } },
        "marker": { "line": { "color": globe.marker_line.to_css(), "width": 0.5 } },
        "hovertemplate": "%{text}<br>%{z:.1f}<extra></extra>",
    });

    let play_button = json!({
        "type": "buttons",
        "showactive": false,
        "x": 0.5,
        "xanchor": "center",
        "y": 1.02,
        "yanchor": "bottom",
        "bgcolor": "red",
        "bordercolor": "black",
        "borderwidth": 1,
        "font": { "color": "white" },
        "buttons": [{
            "label": "\u{25b6} Play",
            "method": "animate",
            "args": [Value::Null, {
                "frame": { "duration": animation.frame_ms, "redraw": true },
                "fromcurrent": true,
                "transition": { "duration": 0 },
                "mode": "immediate",
            }],
        }],
    });
    let mut updatemenus = vec![play_button];

    if metrics.len() > 1 {
        let buttons: Vec<Value> = metrics
            .iter()
            .map(|&metric| {
                let ts = trace_style(table, &rows, config, metric);
                let title = config.title.clone().unwrap_or_else(|| dropdown_title(metric));
                json!({
                    "label": metric.label(),
                    "method": "update",
                    "args": [
                        {
                            "z": [ts.z],
                            "colorscale": [ts.colorscale],
                            "zmin": [ts.zmin],
                            "zmax": [ts.zmax],
                            "colorbar.title.text": [ts.colorbar_title],
                        },
                        { "title.text": title },
                    ],
                })
            })
            .collect();
        updatemenus.push(json!({
            "type": "dropdown",
            "direction": "down",
            "showactive": true,
            "x": 0.02,
            "xanchor": "left",
            "y": 1.02,
            "yanchor": "bottom",
            "buttons": buttons,
        }));
    }

    let annotations: Vec<Value> = config
        .note()
        .map(|note| {
            json!({
                "text": note,
                "showarrow": false,
                "xref": "paper",
                "yref": "paper",
                "x": 0.0,
                "y": -0.05,
                "xanchor": "left",
                "yanchor": "top",
                "bgcolor": "red",
                "font": { "color": "white", "size": FONT_SIZE_NOTE },
            })
        })
        .into_iter()
        .collect();

    let layout = json!({
        "title": {
            "text": page_title(metrics, config),
            "x": 0.05,
            "font": { "family": TITLE_FONT_FAMILY, "size": FONT_SIZE_MAIN_TITLE },
        },
        "geo": {
            "projection": {
                "type": "orthographic",
                "rotation": { "lon": 0.0, "lat": animation.tilt_deg },
            },
            "showland": globe.show_land,
            "landcolor": globe.land.to_css(),
            "showocean": globe.show_ocean,
            "oceancolor": globe.ocean.to_css(),
            "showcountries": globe.show_countries,
            "countrycolor": globe.country_line.to_css(),
            "showcoastlines": true,
        },
        "margin": { "l": 0, "r": 0, "t": 110, "b": 40 },
        "updatemenus": updatemenus,
        "annotations": annotations,
    });

    let frames: Vec<Value> = longitudes
        .iter()
        .map(|lon| {
            json!({
                "name": format!("{lon}"),
                "layout": { "geo": { "projection": { "rotation": { "lon": lon } } } },
            })
        })
        .collect();
    debug!("Figure has {} animation frames.", frames.len());

    Ok(json!({
        "data": [trace],
        "layout": layout,
        "frames": frames,
    }))
}

/// Serializes `figure` for embedding in a `<script>` block.
pub fn script_safe_json(figure: &Value) -> Result<String> {
    Ok(serde_json::to_string(figure)?.replace("</", "<\\/"))
}

fn escape_html_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Renders the complete page. `plotly_script` is the `<script>` element loading
/// plotly.js.
pub fn render_html(figure: &Value, plotly_script: &str) -> Result<String> {
    let title_markup = figure
        .pointer("/layout/title/text")
        .and_then(Value::as_str)
        .unwrap_or_default();
    let page_title = escape_html_text(&plain_title_lines(title_markup).join(" "));
    let figure_json = script_safe_json(figure)?;

    Ok(format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>{page_title}</title>
{plotly_script}
</head>
<body style="margin:0">
<div id="{PLOT_DIV_ID}" style="width:100%;height:100vh;"></div>
<script>
var figure = {figure_json};
Plotly.newPlot("{PLOT_DIV_ID}", figure.data, figure.layout, {{responsive: true}}).then(function () {{
  return Plotly.addFrames("{PLOT_DIV_ID}", figure.frames);
}});
</script>
</body>
</html>
"#
    ))
}

/// `<script>` element for plotly.js: the configured source, or a local bundle inlined.
pub fn plotly_script(config: &RenderConfig, bundle: Option<&Path>) -> Result<String> {
    match bundle {
        Some(path) => {
            let source = fs::read_to_string(path)?;
            info!("Inlining plotly.js from '{}'", path.display());
            Ok(format!(
                "<script>\n{}\n</script>",
                source.replace("</script", "<\\/script")
            ))
        }
        None => Ok(format!(
            r#"<script src="{}" charset="utf-8"></script>"#,
            escape_html_text(&config.html.plotly_src).replace('"', "&quot;")
        )),
    }
}

/// Builds the figure for `metrics` and writes the page to `output`.
pub fn write_html(
    table: &AggregatedTable,
    metrics: &[Metric],
    config: &RenderConfig,
    bundle: Option<&Path>,
    output: &Path,
) -> Result<()> {
    info!("--- Generating HTML Globe ---");
    let labels: Vec<&str> = metrics.iter().map(|m| m.label()).collect();
    info!("  Metrics: {}", labels.join(", "));

    let figure = build_figure(table, metrics, config)?;
    let script = plotly_script(config, bundle)?;
    let page = render_html(&figure, &script)?;
    fs::write(output, page)?;

    info!("  HTML globe saved as '{}'.", output.display());
    Ok(())
}


// src/export/html.rs

// tests/pipeline_integration_test.rs

use std::fs;
use std::path::Path;

use health_globe_render::aggregation::aggregate;
use health_globe_render::config::RenderConfig;
use health_globe_render::data_input::csv_parser::parse_country_file;
use health_globe_render::export::gif::{render_gif, GifOptions};
use health_globe_render::export::html::write_html;
use health_globe_render::export::select_metrics;
use health_globe_render::geo::geometry::load_geometry;
use health_globe_render::metrics::Metric;
use health_globe_render::GlobeError;

const SURVEY_CSV: &str = "\
Country_x,Country Code,htn,phy,nurse,pharma,chws
Kenya,KEN,20,1.5,12,0.5,4
Kenya,KEN,24,,14,,
Kenya,KEN,,2.5,,,
Peru,PER,30,12,25,2,
Brazil,BRA,35,21,70,3,8
Brazil,BRA,37,23,74,,
,XXX,50,,,,
";

const WORLD_GEOJSON: &str = r#"{
  "type": "FeatureCollection",
  "features": [
    {"type": "Feature", "properties": {"ISO_A3": "KEN", "NAME": "Kenya"},
     "geometry": {"type": "Polygon", "coordinates": [[[34,-4],[42,-4],[42,5],[34,5],[34,-4]]]}},
    {"type": "Feature", "properties": {"ISO_A3": "PER", "NAME": "Peru"},
     "geometry": {"type": "Polygon", "coordinates": [[[-81,-18],[-69,-18],[-69,0],[-81,0],[-81,-18]]]}},
    {"type": "Feature", "properties": {"ISO_A3": "BRA", "NAME": "Brazil"},
     "geometry": {"type": "MultiPolygon", "coordinates": [
        [[[-74,-33],[-35,-33],[-35,5],[-74,5],[-74,-33]]]
     ]}},
    {"type": "Feature", "properties": {"ISO_A3": "AUS", "NAME": "Australia"},
     "geometry": {"type": "Polygon", "coordinates": [[[113,-39],[153,-39],[153,-11],[113,-11],[113,-39]]]}}
  ]
}"#;

fn write_input(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("survey.csv");
    fs::write(&path, SURVEY_CSV).unwrap();
    path
}

#[test]
fn test_aggregation_preserves_row_counts() {
    let dir = tempfile::tempdir().unwrap();
    let columns = RenderConfig::default().columns;
    let parsed = parse_country_file(&write_input(dir.path()), &columns).unwrap();
    assert_eq!(parsed.rows.len(), 6);
    assert_eq!(parsed.skipped_rows, 1);
    assert!(!parsed.has_metric(Metric::TotalHw));

    let table = aggregate(&parsed).unwrap();
    let counts: Vec<(&str, usize)> = table
        .rows
        .iter()
        .map(|r| (r.code.as_str(), r.row_count))
        .collect();
    assert_eq!(counts, vec![("BRA", 2), ("KEN", 3), ("PER", 1)]);
    assert_eq!(table.total_rows(), parsed.rows.len());

    let kenya = &table.rows[1];
    assert_eq!(kenya.mean(Metric::Htn), Some(22.0));
    assert_eq!(kenya.mean(Metric::Physicians), Some(2.0));
    assert_eq!(kenya.mean(Metric::Pharmacists), Some(0.5));
    assert_eq!(table.rows[2].mean(Metric::Chws), None);
}

#[test]
fn test_aggregate_csv_output() {
    let dir = tempfile::tempdir().unwrap();
    let columns = RenderConfig::default().columns;
    let parsed = parse_country_file(&write_input(dir.path()), &columns).unwrap();
    let table = aggregate(&parsed).unwrap();

    let out = dir.path().join("means.csv");
    table.write_csv(&out).unwrap();

    let mut reader = csv::Reader::from_path(&out).unwrap();
    let headers: Vec<String> = reader.headers().unwrap().iter().map(str::to_string).collect();
    assert_eq!(
        headers,
        vec![
            "Country",
            "Country Code",
            "HTN",
            "Physicians",
            "Nurses",
            "Pharmacists",
            "CHWs",
            "Total HW",
            "Rows"
        ]
    );
    let records: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    assert_eq!(records.len(), 3);
    assert_eq!(&records[0][0], "Brazil");
    assert_eq!(&records[0][2], "36");
    assert_eq!(&records[2][6], "");
    assert_eq!(&records[1][8], "3");
}

#[test]
fn test_missing_identity_columns_are_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.csv");
    fs::write(&path, "Country,htn\nKenya,20\n").unwrap();

    let err = parse_country_file(&path, &RenderConfig::default().columns).unwrap_err();
    match &err {
        GlobeError::MissingColumns(missing) => assert_eq!(missing.len(), 2),
        other => panic!("unexpected error: {other}"),
    }
    let message = err.to_string();
    assert!(message.contains("Country_x"));
    assert!(message.contains("Country Code"));
}

#[test]
fn test_html_export_smoke() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = RenderConfig::default();
    config.animation.step_deg = 10.0;

    let parsed = parse_country_file(&write_input(dir.path()), &config.columns).unwrap();
    let table = aggregate(&parsed).unwrap();
    let metrics = select_metrics(&table, &[]).unwrap();
    assert_eq!(metrics.len(), 5);

    let out = dir.path().join("globe.html");
    write_html(&table, &metrics, &config, None, &out).unwrap();

    let page = fs::read_to_string(&out).unwrap();
    assert!(page.starts_with("<!DOCTYPE html>"));
    assert!(page.contains("cdn.plot.ly"));
    assert!(page.contains("\"orthographic\""));
    assert!(page.contains("Pharmacists Distribution"));
}

#[test]
fn test_html_export_inlines_local_bundle() {
    let dir = tempfile::tempdir().unwrap();
    let bundle = dir.path().join("plotly.min.js");
    fs::write(&bundle, "window.Plotly = {};").unwrap();

    let config = RenderConfig::default();
    let parsed = parse_country_file(&write_input(dir.path()), &config.columns).unwrap();
    let table = aggregate(&parsed).unwrap();

    let out = dir.path().join("offline.html");
    write_html(&table, &[Metric::Htn], &config, Some(&bundle), &out).unwrap();

    let page = fs::read_to_string(&out).unwrap();
    assert!(page.contains("window.Plotly = {};"));
    assert!(!page.contains("cdn.plot.ly"));
}

#[test]
fn test_gif_export_smoke() {
    let dir = tempfile::tempdir().unwrap();
    let geometry = dir.path().join("world.geojson");
    fs::write(&geometry, WORLD_GEOJSON).unwrap();

    let mut config = RenderConfig::default();
    config.animation.step_deg = 90.0;
    config.gif.width = 120;
    config.gif.height = 120;
    config.gif.draw_labels = false;

    let parsed = parse_country_file(&write_input(dir.path()), &config.columns).unwrap();
    let table = aggregate(&parsed).unwrap();
    let shapes = load_geometry(&geometry, &config.geometry).unwrap();
    assert_eq!(shapes.len(), 4);

    let out = dir.path().join("globe.gif");
    let options = GifOptions::from_config(&config, &table, Metric::Nurses, &out);
    let summary = render_gif(&table, &shapes, Metric::Nurses, &options).unwrap();

    assert_eq!(summary.frames_written, 4);
    assert_eq!(summary.countries_with_data, 3);
    assert_eq!(summary.countries_without_data, 1);

    let bytes = fs::read(&out).unwrap();
    assert!(bytes.starts_with(b"GIF8"));
}

#[test]
fn test_lowercase_codes_match_geometry() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("lower.csv");
    fs::write(&input, "Country_x,Country Code,htn\nKenya,ken,20\nPeru,per,30\n").unwrap();
    let geometry = dir.path().join("world.geojson");
    fs::write(&geometry, WORLD_GEOJSON).unwrap();

    let mut config = RenderConfig::default();
    config.animation.step_deg = 180.0;
    config.gif.width = 96;
    config.gif.height = 96;
    config.gif.draw_labels = false;

    let parsed = parse_country_file(&input, &config.columns).unwrap();
    let table = aggregate(&parsed).unwrap();
    let shapes = load_geometry(&geometry, &config.geometry).unwrap();

    let out = dir.path().join("lower.gif");
    let options = GifOptions::from_config(&config, &table, Metric::Htn, &out);
    let summary = render_gif(&table, &shapes, Metric::Htn, &options).unwrap();

    assert_eq!(summary.countries_with_data, 2);
    assert_eq!(summary.countries_without_data, 2);
}

// src/geo/geometry.rs

use std::fs;
use std::path::Path;

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::config::GeometryConfig;
use crate::constants::NAME_PROPERTIES;
use crate::error::{GlobeError, Result};

/// A point on the sphere, in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub lon: f64,
    pub lat: f64,
}

pub type Ring = Vec<GeoPoint>;

/// One polygon: exterior ring followed by its holes.
#[derive(Debug, Clone, PartialEq)]
pub struct CountryPolygon {
    pub exterior: Ring,
    pub holes: Vec<Ring>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CountryShape {
    pub code: String,
    pub name: String,
    pub polygons: Vec<CountryPolygon>,
}

// --- GeoJSON wire format ---

#[derive(Deserialize)]
struct FeatureCollection {
    features: Vec<Feature>,
}

#[derive(Deserialize)]
struct Feature {
    #[serde(default)]
    id: Option<Value>,
    #[serde(default)]
    properties: Option<Map<String, Value>>,
    #[serde(default)]
    geometry: Option<RawGeometry>,
}

#[derive(Deserialize)]
struct RawGeometry {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    coordinates: Value,
}

type Position = Vec<f64>;

/// Loads country outlines from a GeoJSON `FeatureCollection`.
pub fn load_geometry(path: &Path, config: &GeometryConfig) -> Result<Vec<CountryShape>> {
    info!("Loading geometry from '{}'", path.display());
    let text = fs::read_to_string(path)?;
    parse_geometry(&text, config)
}

/// Parses GeoJSON text into shapes, largest polygons first.
pub fn parse_geometry(text: &str, config: &GeometryConfig) -> Result<Vec<CountryShape>> {
    let collection: FeatureCollection = serde_json::from_str(text)?;
    let mut shapes = Vec::new();

    for (index, feature) in collection.features.into_iter().enumerate() {
        let properties = feature.properties.unwrap_or_default();
        let Some(code) = feature_code(&properties, feature.id.as_ref(), config) else {
            warn!("Skipping feature {index}: no ISO alpha-3 code found");
            continue;
        };
        let name = NAME_PROPERTIES
            .iter()
            .find_map(|key| properties.get(*key).and_then(Value::as_str))
            .unwrap_or(&code)
            .to_string();

        let polygons: Vec<CountryPolygon> = match feature.geometry {
            Some(RawGeometry { kind, coordinates }) if kind == "Polygon" => {
                let rings: Vec<Vec<Position>> = serde_json::from_value(coordinates)?;
                convert_polygon(rings).into_iter().collect()
            }
            Some(RawGeometry { kind, coordinates }) if kind == "MultiPolygon" => {
                let parts: Vec<Vec<Vec<Position>>> = serde_json::from_value(coordinates)?;
                parts.into_iter().filter_map(convert_polygon).collect()
            }
            _ => {
                debug!("Skipping feature {index} ({code}): not a polygon");
                Vec::new()
            }
        };
        if polygons.is_empty() {
            continue;
        }
        shapes.push(CountryShape {
            code,
            name,
            polygons,
        });
    }

    if shapes.is_empty() {
        return Err(GlobeError::Geometry(
            "no polygon features with a country code".into(),
        ));
    }

    // Enclaves must be painted after the country surrounding them.
    shapes.sort_by(|a, b| {
        largest_area(b)
            .partial_cmp(&largest_area(a))
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    info!("Loaded {} country shapes.", shapes.len());
    Ok(shapes)
}

fn feature_code(
    properties: &Map<String, Value>,
    id: Option<&Value>,
    config: &GeometryConfig,
) -> Option<String> {
    config
        .code_properties
        .iter()
        .filter_map(|key| properties.get(key).and_then(Value::as_str))
        .chain(id.and_then(Value::as_str))
        .map(str::trim)
        .find(|code| is_alpha3(code))
        .map(|code| code.to_ascii_uppercase())
}

/// Three ASCII letters; rejects Natural Earth's `-99` placeholder.
fn is_alpha3(code: &str) -> bool {
    code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic())
}

fn convert_ring(ring: Vec<Position>) -> Ring {
    ring.into_iter()
        .filter(|p| p.len() >= 2 && p[0].is_finite() && p[1].is_finite())
        .map(|p| GeoPoint {
            lon: p[0],
            lat: p[1].clamp(-90.0, 90.0),
        })
        .collect()
}

fn convert_polygon(rings: Vec<Vec<Position>>) -> Option<CountryPolygon> {
    let mut rings = rings.into_iter().map(convert_ring);
    let exterior = rings.next()?;
    if exterior.len() < 3 {
        return None;
    }
    Some(CountryPolygon {
        exterior,
        holes: rings.filter(|r| r.len() >= 3).collect(),
    })
}

/// Planar shoelace area in squared degrees; only used for draw ordering.
pub fn planar_area(ring: &[GeoPoint]) -> f64 {
    if ring.len() < 3 {
        return 0.0;
    }
    let mut twice_area = 0.0;
    for (i, a) in ring.iter().enumerate() {
        let b = &ring[(i + 1) % ring.len()];
        twice_area += a.lon * b.lat - b.lon * a.lat;
    }
    (twice_area / 2.0).abs()
}

fn largest_area(shape: &CountryShape) -> f64 {
    shape
        .polygons
        .iter()
        .map(|p| planar_area(&p.exterior))
        .fold(0.0, f64::max)
}


// src/geo/geometry.rs

// src/config.rs

//! Render configuration loaded from an optional TOML file.
//!
//! Every key has a default reproducing the stock globe, so an empty file (or no
//! file at all) is a complete configuration. Command-line flags are applied on
//! top of the loaded values by the binary.
//!
//! # Example
//! ```toml
//! note = ""
//!
//! [globe]
//! preset = "classic"
//! ocean_color = "#cce0ff"
//!
//! [animation]
//! step_deg = 5.0
//!
//! [styles.HTN]
//! colorscale = "YlOrRd"
//! zmin = 10.0
//! zmax = 50.0
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use plotters::style::RGBColor;
use serde::Deserialize;
use tracing::debug;

use crate::colorscale::Rgb;
use crate::constants::{
    CLASSIC_COUNTRY_LINE, CLASSIC_LAND, CLASSIC_MARKER_LINE, CLASSIC_OCEAN, DEFAULT_CODE_COLUMN,
    DEFAULT_CODE_PROPERTIES, DEFAULT_COUNTRY_COLUMN, DEFAULT_FRAME_MS, DEFAULT_NOTE,
    DEFAULT_PLOTLY_SRC, DEFAULT_ROTATION_STEP_DEG, FRAME_HEIGHT, FRAME_WIDTH, STORY_COUNTRY_LINE,
    STORY_LAND, STORY_MARKER_LINE, STORY_OCEAN,
};
use crate::error::{GlobeError, Result};
use crate::metrics::{Metric, MetricStyle};

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderConfig {
    /// Overrides the generated page / frame title.
    pub title: Option<String>,
    /// Footnote drawn bottom-left; an empty string disables it.
    pub note: String,
    pub columns: ColumnConfig,
    pub globe: GlobeConfig,
    pub animation: AnimationConfig,
    pub styles: BTreeMap<Metric, MetricStyle>,
    pub html: HtmlConfig,
    pub gif: GifConfig,
    pub geometry: GeometryConfig,
}

impl Default for RenderConfig {
    fn default() -> Self {
        RenderConfig {
            title: None,
            note: DEFAULT_NOTE.to_string(),
            columns: ColumnConfig::default(),
            globe: GlobeConfig::default(),
            animation: AnimationConfig::default(),
            styles: BTreeMap::new(),
            html: HtmlConfig::default(),
            gif: GifConfig::default(),
            geometry: GeometryConfig::default(),
        }
    }
}

impl RenderConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let config = Self::from_toml(&text)?;
        debug!("Loaded configuration from '{}'", path.display());
        Ok(config)
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        let config: RenderConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects values that parse but cannot be rendered.
    pub fn validate(&self) -> Result<()> {
        let step = self.animation.step_deg;
        if !(step > 0.0 && step <= 360.0) {
            return Err(GlobeError::InvalidConfig(format!(
                "animation.step_deg must be in (0, 360], got {step}"
            )));
        }
        if !(-90.0..=90.0).contains(&self.animation.tilt_deg) {
            return Err(GlobeError::InvalidConfig(format!(
                "animation.tilt_deg must be in [-90, 90], got {}",
                self.animation.tilt_deg
            )));
        }
        if self.animation.frame_ms == 0 {
            return Err(GlobeError::InvalidConfig(
                "animation.frame_ms must be positive".into(),
            ));
        }
        if self.gif.width < 64 || self.gif.height < 64 {
            return Err(GlobeError::InvalidConfig(format!(
                "gif size {}x{} is too small (minimum 64x64)",
                self.gif.width, self.gif.height
            )));
        }
        for (metric, style) in &self.styles {
            if let (Some(lo), Some(hi)) = (style.zmin, style.zmax) {
                if lo >= hi {
                    return Err(GlobeError::InvalidConfig(format!(
                        "styles.{}: zmin ({lo}) must be below zmax ({hi})",
                        metric.label()
                    )));
                }
            }
        }
        Ok(())
    }

    /// Configured style for `metric`, falling back to its built-in default.
    pub fn style_for(&self, metric: Metric) -> MetricStyle {
        self.styles
            .get(&metric)
            .cloned()
            .unwrap_or_else(|| metric.default_style())
    }

    pub fn note(&self) -> Option<&str> {
        let note = self.note.trim();
        if note.is_empty() {
            None
        } else {
            Some(note)
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColumnConfig {
    pub country: String,
    pub code: String,
}

impl Default for ColumnConfig {
    fn default() -> Self {
        ColumnConfig {
            country: DEFAULT_COUNTRY_COLUMN.to_string(),
            code: DEFAULT_CODE_COLUMN.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Preset {
    /// Cyan land on a light-blue ocean with black data outlines.
    #[default]
    Story,
    /// Pale grey land with light borders.
    Classic,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GlobeConfig {
    pub preset: Preset,
    pub land_color: Option<Rgb>,
    pub ocean_color: Option<Rgb>,
    pub country_color: Option<Rgb>,
    pub marker_line_color: Option<Rgb>,
    pub show_land: bool,
    pub show_ocean: bool,
    pub show_countries: bool,
}

impl Default for GlobeConfig {
    fn default() -> Self {
        GlobeConfig {
            preset: Preset::Story,
            land_color: None,
            ocean_color: None,
            country_color: None,
            marker_line_color: None,
            show_land: true,
            show_ocean: true,
            show_countries: true,
        }
    }
}

/// Fully resolved globe colors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlobeStyle {
    pub land: Rgb,
    pub ocean: Rgb,
    pub country_line: Rgb,
    pub marker_line: Rgb,
    pub show_land: bool,
    pub show_ocean: bool,
    pub show_countries: bool,
}

impl GlobeConfig {
    pub fn resolve(&self) -> GlobeStyle {
        let (land, ocean, country_line, marker_line): (RGBColor, RGBColor, RGBColor, RGBColor) =
            match self.preset {
                Preset::Story => (STORY_LAND, STORY_OCEAN, STORY_COUNTRY_LINE, STORY_MARKER_LINE),
                Preset::Classic => (
                    CLASSIC_LAND,
                    CLASSIC_OCEAN,
                    CLASSIC_COUNTRY_LINE,
                    CLASSIC_MARKER_LINE,
                ),
            };
        GlobeStyle {
            land: self.land_color.unwrap_or_else(|| land.into()),
            ocean: self.ocean_color.unwrap_or_else(|| ocean.into()),
            country_line: self.country_color.unwrap_or_else(|| country_line.into()),
            marker_line: self.marker_line_color.unwrap_or_else(|| marker_line.into()),
            show_land: self.show_land,
            show_ocean: self.show_ocean,
            show_countries: self.show_countries,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnimationConfig {
    /// Longitude increment between frames, in degrees.
    pub step_deg: f64,
    /// Display time of each frame.
    pub frame_ms: u32,
    /// Latitude the globe is tilted towards.
    pub tilt_deg: f64,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        AnimationConfig {
            step_deg: DEFAULT_ROTATION_STEP_DEG,
            frame_ms: DEFAULT_FRAME_MS,
            tilt_deg: 0.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HtmlConfig {
    /// `<script src>` used when no local bundle is inlined.
    pub plotly_src: String,
}

impl Default for HtmlConfig {
    fn default() -> Self {
        HtmlConfig {
            plotly_src: DEFAULT_PLOTLY_SRC.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GifConfig {
    pub width: u32,
    pub height: u32,
    /// Draw titles, colorbar ticks and the note. Requires system fonts.
    pub draw_labels: bool,
}

impl Default for GifConfig {
    fn default() -> Self {
        GifConfig {
            width: FRAME_WIDTH,
            height: FRAME_HEIGHT,
            draw_labels: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeometryConfig {
    /// Feature properties tried in order for the ISO alpha-3 country code.
    pub code_properties: Vec<String>,
}

impl Default for GeometryConfig {
    fn default() -> Self {
        GeometryConfig {
            code_properties: DEFAULT_CODE_PROPERTIES.iter().map(|s| s.to_string()).collect(),
        }
    }
}


// src/config.rs

// src/constants.rs

use plotters::style::colors::{RED, WHITE};
use plotters::style::RGBColor;

// Default frame dimensions for rasterized output.
pub const FRAME_WIDTH: u32 = 900;
pub const FRAME_HEIGHT: u32 = 700;

// Rotation and playback defaults.
pub const DEFAULT_ROTATION_STEP_DEG: f64 = 2.0;
pub const DEFAULT_FRAME_MS: u32 = 50;

// Identity columns of the input CSV.
pub const DEFAULT_COUNTRY_COLUMN: &str = "Country_x";
pub const DEFAULT_CODE_COLUMN: &str = "Country Code";

// GeoJSON properties tried, in order, for the ISO alpha-3 code.
pub const DEFAULT_CODE_PROPERTIES: [&str; 4] = ["ISO_A3", "iso_a3", "ADM0_A3", "ISO3"];
pub const NAME_PROPERTIES: [&str; 4] = ["NAME", "name", "ADMIN", "NAME_EN"];

// Default output files.
pub const DEFAULT_HTML_OUTPUT: &str = "rotating_globe_map.html";
pub const DEFAULT_GIF_OUTPUT: &str = "rotating_globe.gif";
pub const DEFAULT_AGGREGATE_OUTPUT: &str = "country_means.csv";

pub const DEFAULT_PLOTLY_SRC: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";

// Titles and annotations.
pub const STORY_TITLE: &str = "<i>\u{201c}Where the burden of hypertension rises,<br>the strength of the health system must follow.<br> Lets pitch a story using 3D maps\u{201d}</i>";
pub const DEFAULT_NOTE: &str =
    "Note: Workforce indicators per 10,000 population. HTN prevalence shown in %";

// --- Globe palettes ---
// "story" palette
pub const STORY_LAND: RGBColor = RGBColor(100, 243, 243);
pub const STORY_OCEAN: RGBColor = RGBColor(100, 224, 255);
pub const STORY_COUNTRY_LINE: RGBColor = RGBColor(100, 100, 100);
pub const STORY_MARKER_LINE: RGBColor = RGBColor(0, 0, 0);
// "classic" palette
pub const CLASSIC_LAND: RGBColor = RGBColor(243, 243, 243);
pub const CLASSIC_OCEAN: RGBColor = RGBColor(204, 224, 255);
pub const CLASSIC_COUNTRY_LINE: RGBColor = RGBColor(204, 204, 204);
pub const CLASSIC_MARKER_LINE: RGBColor = RGBColor(68, 68, 68);

pub const COLOR_BACKGROUND: &RGBColor = &WHITE;
pub const COLOR_NOTE_BACKGROUND: &RGBColor = &RED;
pub const COLOR_NOTE_TEXT: &RGBColor = &WHITE;
pub const COLOR_LIMB: RGBColor = RGBColor(60, 60, 60);

// Stroke widths for outlines
pub const LINE_WIDTH_BORDER: u32 = 1;
pub const LINE_WIDTH_LIMB: u32 = 2;

// Font sizes
pub const FONT_SIZE_MAIN_TITLE: i32 = 22;
pub const FONT_SIZE_COLORBAR_TITLE: i32 = 14;
pub const FONT_SIZE_TICK_LABEL: i32 = 12;
pub const FONT_SIZE_NOTE: i32 = 11;
pub const FONT_SIZE_MESSAGE: i32 = 20;

// --- Frame layout (pixels) ---
pub const TITLE_AREA_HEIGHT: i32 = 90;
pub const COLORBAR_AREA_WIDTH: i32 = 130;
pub const COLORBAR_WIDTH: i32 = 22;
pub const COLORBAR_STEPS: usize = 120;
pub const COLORBAR_TICKS: usize = 5;
pub const GLOBE_MARGIN: i32 = 20;

// Number of stops when exporting a colorscale to plotly.
pub const PLOTLY_COLORSCALE_STOPS: usize = 11;

// Angular step used when tracing the limb between clipped ring crossings.
pub const LIMB_ARC_STEP_RAD: f64 = 0.05;

// src/constants.rs

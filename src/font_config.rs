// src/font_config.rs

// Font styles for every text element drawn on a globe frame.
// Plotters resolves these family names against the system fonts at render time.

use crate::constants::{
    FONT_SIZE_COLORBAR_TITLE, FONT_SIZE_MAIN_TITLE, FONT_SIZE_MESSAGE, FONT_SIZE_NOTE,
    FONT_SIZE_TICK_LABEL,
};

/// Serif family for the page title, after the Georgia / Times title of the HTML page
pub const FONT_FAMILY_TITLE: &str = "serif";

/// Family for colorbar, note and status text
pub const FONT_FAMILY_SYSTEM: &str = "sans-serif";

// Tuple representations for use with plotters' IntoFont trait
pub const FONT_TUPLE_MAIN_TITLE: (&str, i32) = (FONT_FAMILY_TITLE, FONT_SIZE_MAIN_TITLE);
pub const FONT_TUPLE_COLORBAR_TITLE: (&str, i32) = (FONT_FAMILY_SYSTEM, FONT_SIZE_COLORBAR_TITLE);
pub const FONT_TUPLE_TICK_LABEL: (&str, i32) = (FONT_FAMILY_SYSTEM, FONT_SIZE_TICK_LABEL);
pub const FONT_TUPLE_NOTE: (&str, i32) = (FONT_FAMILY_SYSTEM, FONT_SIZE_NOTE);
pub const FONT_TUPLE_MESSAGE: (&str, i32) = (FONT_FAMILY_SYSTEM, FONT_SIZE_MESSAGE);

// src/font_config.rs

// src/plot_framework.rs

use plotters::backend::BitMapBackend;
use plotters::coord::Shift;
use plotters::drawing::DrawingArea;
use plotters::element::{Circle, PathElement, Polygon, Rectangle, Text};
use plotters::style::colors::{BLACK, RED};
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::{Color, IntoFont, RGBColor};

use std::collections::HashMap;
use std::error::Error;

use crate::colorscale::ColorScale;
use crate::config::GlobeStyle;
use crate::constants::{
    COLORBAR_AREA_WIDTH, COLORBAR_STEPS, COLORBAR_TICKS, COLORBAR_WIDTH, COLOR_BACKGROUND,
    COLOR_LIMB, COLOR_NOTE_BACKGROUND, COLOR_NOTE_TEXT, FONT_SIZE_COLORBAR_TITLE,
    FONT_SIZE_MAIN_TITLE, FONT_SIZE_MESSAGE, FONT_SIZE_NOTE, GLOBE_MARGIN, LINE_WIDTH_BORDER,
    LINE_WIDTH_LIMB, TITLE_AREA_HEIGHT,
};
use crate::font_config::{
    FONT_TUPLE_COLORBAR_TITLE, FONT_TUPLE_MAIN_TITLE, FONT_TUPLE_MESSAGE, FONT_TUPLE_NOTE,
    FONT_TUPLE_TICK_LABEL,
};
use crate::geo::geometry::CountryShape;
use crate::geo::projection::Orthographic;

// Approximate character width relative to font size, for text boxes
const CHAR_WIDTH_RATIO: f32 = 0.6;
// Mixed-case sans-serif text at note size
const NOTE_CHAR_WIDTH_RATIO: f32 = 0.45;
const NOTE_PADDING: i32 = 4;
const LINE_HEIGHT_SPACING: i32 = 4;
const FRAME_EDGE_PADDING: i32 = 4;

/// Estimated pixel width of `text` at `font_size`.
fn estimate_text_width(text: &str, font_size: i32, char_width_ratio: f32) -> i32 {
    (text.chars().count() as f32 * font_size as f32 * char_width_ratio).ceil() as i32
}

/// Width of the note box including its padding.
pub fn note_box_width(note: &str) -> i32 {
    estimate_text_width(note, FONT_SIZE_NOTE, NOTE_CHAR_WIDTH_RATIO) + 2 * NOTE_PADDING
}

/// Everything about a frame that does not change while the globe turns.
pub struct FrameSpec<'a> {
    /// Title lines, already reduced to plain text.
    pub title_lines: &'a [String],
    /// Short metric label used in status messages.
    pub metric_label: &'a str,
    pub colorbar_title: &'a str,
    pub colorscale: ColorScale,
    /// Color range `(zmin, zmax)`.
    pub zrange: (f64, f64),
    pub globe: &'a GlobeStyle,
    pub note: Option<&'a str>,
    pub draw_labels: bool,
    pub tilt_deg: f64,
}

/// Pixel placement of the globe and colorbar inside a frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameLayout {
    pub globe_center: (i32, i32),
    pub globe_radius: f64,
    pub colorbar_x: i32,
    /// Left edge of the colorbar title, pulled left when the title would overrun the frame.
    pub colorbar_title_x: i32,
    pub colorbar_top: i32,
    pub colorbar_bottom: i32,
}

/// Per-frame drawing counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub polygons_with_data: usize,
    pub polygons_without_data: usize,
}

/// Computes the frame layout for a `width` × `height` bitmap.
pub fn frame_layout(width: u32, height: u32, spec: &FrameSpec) -> FrameLayout {
    let (w, h) = (width as i32, height as i32);
    let top = if spec.draw_labels && !spec.title_lines.is_empty() {
        TITLE_AREA_HEIGHT.max(
            spec.title_lines.len() as i32 * (FONT_SIZE_MAIN_TITLE + LINE_HEIGHT_SPACING) + 16,
        )
    } else {
        GLOBE_MARGIN
    };
    let bottom = if spec.draw_labels && spec.note.is_some() {
        GLOBE_MARGIN + FONT_SIZE_NOTE + 16
    } else {
        GLOBE_MARGIN
    };
    let colorbar_area = COLORBAR_AREA_WIDTH.min(w / 4);

    let region_w = (w - colorbar_area).max(1);
    let region_h = (h - top - bottom).max(1);
    let globe_radius = ((region_w.min(region_h) / 2 - GLOBE_MARGIN).max(8)) as f64;
    let globe_center = (region_w / 2, top + region_h / 2);

    let colorbar_x = w - colorbar_area + colorbar_area / 6;
    let title_width =
        estimate_text_width(spec.colorbar_title, FONT_SIZE_COLORBAR_TITLE, CHAR_WIDTH_RATIO);
    let colorbar_title_x = colorbar_x.min(w - FRAME_EDGE_PADDING - title_width).max(0);
    let colorbar_top = top + if spec.draw_labels { 30 } else { 10 };
    let colorbar_bottom = (h - bottom - 10).max(colorbar_top + 10);

    FrameLayout {
        globe_center,
        globe_radius,
        colorbar_x,
        colorbar_title_x,
        colorbar_top,
        colorbar_bottom,
    }
}

/// Reduces plotly title markup to plain lines: `<br>` breaks, other tags vanish.
pub fn plain_title_lines(markup: &str) -> Vec<String> {
    let mut text = String::with_capacity(markup.len());
    let mut rest = markup;
    while let Some(start) = rest.find('<') {
        text.push_str(&rest[..start]);
        match rest[start..].find('>') {
            Some(end) => {
                let tag = rest[start + 1..start + end].trim().trim_end_matches('/').trim();
                if tag.eq_ignore_ascii_case("br") {
                    text.push('\n');
                }
                rest = &rest[start + end + 1..];
            }
            None => {
                text.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    text.push_str(rest);

    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Formats a colorbar tick value, using "k" and "M" notation for large values.
pub fn format_tick(value: f64) -> String {
    if value.abs() >= 1_000_000.0 {
        format!("{:.1}M", value / 1_000_000.0)
    } else if value.abs() >= 1000.0 {
        format!("{:.0}k", value / 1000.0)
    } else if value.abs() < 10.0 && value.fract() != 0.0 {
        format!("{:.1}", value)
    } else {
        format!("{:.0}", value)
    }
}

/// Color range: configured bounds first, then the data range, padded when degenerate.
pub fn color_range(
    zmin: Option<f64>,
    zmax: Option<f64>,
    data_range: Option<(f64, f64)>,
) -> (f64, f64) {
    let (data_min, data_max) = data_range.unwrap_or((0.0, 1.0));
    let lo = zmin.unwrap_or(data_min);
    let hi = zmax.unwrap_or(data_max);
    let (lo, hi) = if lo <= hi { (lo, hi) } else { (hi, lo) };
    if (hi - lo).abs() < 1e-6 {
        (lo - 0.5, hi + 0.5)
    } else {
        (lo, hi)
    }
}

/// Draw a "Data Unavailable" message over the globe.
pub fn draw_unavailable_message(
    area: &DrawingArea<BitMapBackend, Shift>,
    center: (i32, i32),
    plot_type: &str,
    reason: &str,
) -> Result<(), Box<dyn Error>> {
    let lines = [format!("{plot_type} Data Unavailable:"), reason.to_string()];

    // Estimate text dimensions for better centering
    let estimated_char_width = (FONT_SIZE_MESSAGE as f32 * CHAR_WIDTH_RATIO) as i32;
    let estimated_line_height = FONT_SIZE_MESSAGE + LINE_HEIGHT_SPACING;
    let start_y = center.1 - (lines.len() as i32 * estimated_line_height) / 2;

    for (i, line) in lines.iter().enumerate() {
        let estimated_text_width = line.chars().count() as i32 * estimated_char_width;
        let text_style = FONT_TUPLE_MESSAGE.into_font().color(&RED);
        area.draw(&Text::new(
            line.as_str(),
            (
                center.0 - estimated_text_width / 2,
                start_y + i as i32 * estimated_line_height,
            ),
            text_style,
        ))?;
    }
    Ok(())
}

/// Draws the vertical colorbar: gradient from zmin (bottom) to zmax (top), ticks and title.
fn draw_colorbar(
    area: &DrawingArea<BitMapBackend, Shift>,
    layout: &FrameLayout,
    spec: &FrameSpec,
) -> Result<(), Box<dyn Error>> {
    let x0 = layout.colorbar_x;
    let x1 = x0 + COLORBAR_WIDTH;
    let top = layout.colorbar_top;
    let bottom = layout.colorbar_bottom;
    let height = (bottom - top) as f64;

    for step in 0..COLORBAR_STEPS {
        let t0 = step as f64 / COLORBAR_STEPS as f64;
        let t1 = (step + 1) as f64 / COLORBAR_STEPS as f64;
        let y_low = bottom - (t0 * height).round() as i32;
        let y_high = bottom - (t1 * height).round() as i32;
        let color = spec.colorscale.color_at((t0 + t1) / 2.0);
        area.draw(&Rectangle::new([(x0, y_high), (x1, y_low)], color.filled()))?;
    }
    area.draw(&Rectangle::new(
        [(x0, top), (x1, bottom)],
        BLACK.stroke_width(LINE_WIDTH_BORDER),
    ))?;

    if !spec.draw_labels {
        return Ok(());
    }

    let (zmin, zmax) = spec.zrange;
    for k in 0..COLORBAR_TICKS {
        let frac = k as f64 / (COLORBAR_TICKS - 1) as f64;
        let value = zmin + frac * (zmax - zmin);
        let y = bottom - (frac * height).round() as i32;
        area.draw(&PathElement::new(
            vec![(x1, y), (x1 + 4, y)],
            BLACK.stroke_width(LINE_WIDTH_BORDER),
        ))?;
        area.draw(&Text::new(
            format_tick(value),
            (x1 + 7, y),
            FONT_TUPLE_TICK_LABEL
                .into_font()
                .color(&BLACK)
                .pos(Pos::new(HPos::Left, VPos::Center)),
        ))?;
    }

    area.draw(&Text::new(
        spec.colorbar_title,
        (layout.colorbar_title_x, top - 8),
        FONT_TUPLE_COLORBAR_TITLE
            .into_font()
            .color(&BLACK)
            .pos(Pos::new(HPos::Left, VPos::Bottom)),
    ))?;
    Ok(())
}

/// Draws the note box in the bottom-left corner (white text on red).
fn draw_note(
    area: &DrawingArea<BitMapBackend, Shift>,
    note: &str,
    frame_height: i32,
) -> Result<(), Box<dyn Error>> {
    let box_height = FONT_SIZE_NOTE + 2 * NOTE_PADDING;
    let x0 = 8;
    let x1 = x0 + note_box_width(note);
    let y1 = frame_height - 8;
    let y0 = y1 - box_height;

    area.draw(&Rectangle::new([(x0, y0), (x1, y1)], COLOR_NOTE_BACKGROUND.filled()))?;
    area.draw(&Rectangle::new([(x0, y0), (x1, y1)], BLACK.stroke_width(LINE_WIDTH_BORDER)))?;
    area.draw(&Text::new(
        note,
        (x0 + NOTE_PADDING, y0 + NOTE_PADDING),
        FONT_TUPLE_NOTE.into_font().color(COLOR_NOTE_TEXT),
    ))?;
    Ok(())
}

/// Draws the countries visible from `projection`, filled from `values` where present.
fn draw_countries(
    area: &DrawingArea<BitMapBackend, Shift>,
    projection: &Orthographic,
    shapes: &[CountryShape],
    values: &HashMap<&str, f64>,
    spec: &FrameSpec,
) -> Result<FrameStats, Box<dyn Error>> {
    let globe = spec.globe;
    let land: RGBColor = globe.land.into();
    let ocean: RGBColor = globe.ocean.into();
    let hole_fill: RGBColor = if globe.show_ocean { ocean } else { *COLOR_BACKGROUND };
    let (zmin, zmax) = spec.zrange;
    let mut stats = FrameStats::default();

    for shape in shapes {
        let value = values.get(shape.code.as_str()).copied();
        if value.is_none() && !globe.show_land && !globe.show_countries {
            continue;
        }
        let fill: Option<RGBColor> = match value {
            Some(v) => Some(spec.colorscale.map_value(v, zmin, zmax)),
            None if globe.show_land => Some(land),
            None => None,
        };
        let line: RGBColor = if value.is_some() {
            globe.marker_line.into()
        } else {
            globe.country_line.into()
        };
        let draw_outline = value.is_some() || globe.show_countries;

        for polygon in &shape.polygons {
            let outline = projection.clip_ring(&polygon.exterior);
            if outline.len() < 3 {
                continue;
            }

            if let Some(fill) = fill {
                area.draw(&Polygon::new(outline.clone(), fill.filled()))?;
                for hole in &polygon.holes {
                    let hole_outline = projection.clip_ring(hole);
                    if hole_outline.len() >= 3 {
                        area.draw(&Polygon::new(hole_outline, hole_fill.filled()))?;
                    }
                }
            }

            if draw_outline {
                let mut closed = outline;
                closed.push(closed[0]);
                area.draw(&PathElement::new(closed, line.stroke_width(LINE_WIDTH_BORDER)))?;
            }

            if value.is_some() {
                stats.polygons_with_data += 1;
            } else {
                stats.polygons_without_data += 1;
            }
        }
    }
    Ok(stats)
}

/// Draws one complete globe frame centred on longitude `center_lon`.
pub fn draw_globe_frame(
    area: &DrawingArea<BitMapBackend, Shift>,
    spec: &FrameSpec,
    shapes: &[CountryShape],
    values: &HashMap<&str, f64>,
    center_lon: f64,
) -> Result<FrameStats, Box<dyn Error>> {
    let (width, height) = area.dim_in_pixel();
    let layout = frame_layout(width, height, spec);

    area.fill(COLOR_BACKGROUND)?;

    if spec.draw_labels {
        for (i, line) in spec.title_lines.iter().enumerate() {
            area.draw(&Text::new(
                line.as_str(),
                (
                    (width as f64 * 0.05) as i32,
                    10 + i as i32 * (FONT_SIZE_MAIN_TITLE + LINE_HEIGHT_SPACING),
                ),
                FONT_TUPLE_MAIN_TITLE.into_font().color(&BLACK),
            ))?;
        }
    }

    let radius = layout.globe_radius;
    let radius_px = radius.round() as i32;
    if spec.globe.show_ocean {
        let ocean: RGBColor = spec.globe.ocean.into();
        area.draw(&Circle::new(layout.globe_center, radius_px, ocean.filled()))?;
    }

    let projection = Orthographic::new(center_lon, spec.tilt_deg, radius, layout.globe_center);
    let stats = draw_countries(area, &projection, shapes, values, spec)?;

    area.draw(&Circle::new(
        layout.globe_center,
        radius_px,
        COLOR_LIMB.stroke_width(LINE_WIDTH_LIMB),
    ))?;

    draw_colorbar(area, &layout, spec)?;

    if spec.draw_labels {
        if let Some(note) = spec.note {
            draw_note(area, note, height as i32)?;
        }
        if values.is_empty() {
            draw_unavailable_message(
                area,
                layout.globe_center,
                spec.metric_label,
                "No country has a value",
            )?;
        }
    }

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GlobeConfig;
    use crate::constants::DEFAULT_NOTE;

    fn spec<'a>(title: &'a [String], globe: &'a GlobeStyle, labels: bool) -> FrameSpec<'a> {
        FrameSpec {
            title_lines: title,
            metric_label: "HTN",
            colorbar_title: "HTN Prevalence (%)",
            colorscale: ColorScale::Reds,
            zrange: (0.0, 60.0),
            globe,
            note: Some("note"),
            draw_labels: labels,
            tilt_deg: 0.0,
        }
    }

    #[test]
    fn test_plain_title_lines() {
        let lines = plain_title_lines("<i>First line,<br>second<BR/> third</i>");
        assert_eq!(lines, vec!["First line,", "second", "third"]);
        assert_eq!(plain_title_lines("Rotating Globe"), vec!["Rotating Globe"]);
        assert_eq!(plain_title_lines("a < b"), vec!["a < b"]);
        assert!(plain_title_lines("<i></i>").is_empty());
    }

    #[test]
    fn test_format_tick() {
        assert_eq!(format_tick(0.0), "0");
        assert_eq!(format_tick(15.0), "15");
        assert_eq!(format_tick(7.5), "7.5");
        assert_eq!(format_tick(2400.0), "2k");
        assert_eq!(format_tick(1_500_000.0), "1.5M");
    }

    #[test]
    fn test_color_range() {
        assert_eq!(color_range(Some(0.0), Some(60.0), Some((3.0, 40.0))), (0.0, 60.0));
        assert_eq!(color_range(None, None, Some((3.0, 40.0))), (3.0, 40.0));
        assert_eq!(color_range(Some(10.0), None, Some((3.0, 40.0))), (10.0, 40.0));
        assert_eq!(color_range(None, None, Some((5.0, 5.0))), (4.5, 5.5));
        assert_eq!(color_range(None, None, None), (0.0, 1.0));
    }

    #[test]
    fn test_layout_keeps_globe_inside_frame() {
        let globe = GlobeConfig::default().resolve();
        let title = vec!["A title".to_string()];
        for (w, h) in [(900u32, 700u32), (64, 64), (400, 1200)] {
            for labels in [true, false] {
                let layout = frame_layout(w, h, &spec(&title, &globe, labels));
                let (cx, cy) = layout.globe_center;
                let r = layout.globe_radius as i32;
                assert!(r >= 8);
                assert!(cx - r >= -1 && cx + r <= w as i32, "{w}x{h}");
                assert!(layout.colorbar_bottom > layout.colorbar_top);
                assert!(cy > 0);
                assert!(layout.colorbar_title_x >= 0);
                assert!(layout.colorbar_title_x <= layout.colorbar_x);
            }
        }
    }

    #[test]
    fn test_colorbar_title_stays_inside_frame() {
        let globe = GlobeConfig::default().resolve();
        let title = vec!["A title".to_string()];
        let s = spec(&title, &globe, true);
        let layout = frame_layout(900, 700, &s);
        let title_width =
            estimate_text_width(s.colorbar_title, FONT_SIZE_COLORBAR_TITLE, CHAR_WIDTH_RATIO);
        assert!(layout.colorbar_title_x < layout.colorbar_x);
        assert!(layout.colorbar_title_x + title_width <= 900);
        // Still clear of the globe
        let globe_right = layout.globe_center.0 + layout.globe_radius as i32;
        assert!(layout.colorbar_title_x > globe_right);

        let mut short = spec(&title, &globe, true);
        short.colorbar_title = "HW";
        assert_eq!(frame_layout(900, 700, &short).colorbar_title_x, layout.colorbar_x);
    }

    #[test]
    fn test_note_box_hugs_default_note() {
        let chars = DEFAULT_NOTE.chars().count() as i32;
        let width = note_box_width(DEFAULT_NOTE);
        assert!(width < chars * FONT_SIZE_NOTE / 2);
        assert!(width > chars * FONT_SIZE_NOTE * 2 / 5);
        // Fits a default-sized frame with room to spare
        assert!(8 + width < 900 / 2);
    }
}

// src/plot_framework.rs

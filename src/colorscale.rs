// src/colorscale.rs

use std::fmt;
use std::str::FromStr;

use plotters::style::RGBColor;
use serde::Deserialize;

use crate::error::GlobeError;

/// Sequential colorscales available for choropleth shading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum ColorScale {
    Reds,
    Blues,
    Greens,
    Purples,
    Oranges,
    Greys,
    Viridis,
    YlOrRd,
}

impl ColorScale {
    pub const ALL: [ColorScale; 8] = [
        ColorScale::Reds,
        ColorScale::Blues,
        ColorScale::Greens,
        ColorScale::Purples,
        ColorScale::Oranges,
        ColorScale::Greys,
        ColorScale::Viridis,
        ColorScale::YlOrRd,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ColorScale::Reds => "Reds",
            ColorScale::Blues => "Blues",
            ColorScale::Greens => "Greens",
            ColorScale::Purples => "Purples",
            ColorScale::Oranges => "Oranges",
            ColorScale::Greys => "Greys",
            ColorScale::Viridis => "Viridis",
            ColorScale::YlOrRd => "YlOrRd",
        }
    }

    fn gradient(self) -> colorous::Gradient {
        match self {
            ColorScale::Reds => colorous::REDS,
            ColorScale::Blues => colorous::BLUES,
            ColorScale::Greens => colorous::GREENS,
            ColorScale::Purples => colorous::PURPLES,
            ColorScale::Oranges => colorous::ORANGES,
            ColorScale::Greys => colorous::GREYS,
            ColorScale::Viridis => colorous::VIRIDIS,
            ColorScale::YlOrRd => colorous::YELLOW_ORANGE_RED,
        }
    }

    /// Color at normalized position `t` (clamped to [0, 1]).
    pub fn color_at(self, t: f64) -> RGBColor {
        if !t.is_finite() {
            return RGBColor(0, 0, 0); // Black for invalid values
        }
        let color = self.gradient().eval_continuous(t.clamp(0.0, 1.0));
        RGBColor(color.r, color.g, color.b)
    }

    /// Maps a data value into the scale using the `[zmin, zmax]` color range.
    pub fn map_value(self, value: f64, zmin: f64, zmax: f64) -> RGBColor {
        if !value.is_finite() || !zmin.is_finite() || !zmax.is_finite() {
            return RGBColor(0, 0, 0);
        }
        let (lo, hi) = if zmin <= zmax { (zmin, zmax) } else { (zmax, zmin) };
        let span = (hi - lo).max(1e-9);
        self.color_at((value.clamp(lo, hi) - lo) / span)
    }

    /// Explicit plotly colorscale: `n` evenly spaced `[position, "rgb(r, g, b)"]` stops.
    pub fn plotly_stops(self, n: usize) -> Vec<(f64, String)> {
        let n = n.max(2);
        (0..n)
            .map(|i| {
                let t = i as f64 / (n - 1) as f64;
                let c = self.color_at(t);
                (t, Rgb(c.0, c.1, c.2).to_css())
            })
            .collect()
    }
}

impl fmt::Display for ColorScale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ColorScale {
    type Err = GlobeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        ColorScale::ALL
            .iter()
            .copied()
            .find(|c| c.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| GlobeError::InvalidConfig(format!("unknown colorscale '{wanted}'")))
    }
}

impl TryFrom<String> for ColorScale {
    type Error = GlobeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// An opaque color written as `rgb(r, g, b)` or `#rrggbb`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// CSS form understood by plotly.js.
    pub fn to_css(self) -> String {
        format!("rgb({}, {}, {})", self.0, self.1, self.2)
    }
}

impl From<Rgb> for RGBColor {
    fn from(c: Rgb) -> Self {
        RGBColor(c.0, c.1, c.2)
    }
}

impl From<RGBColor> for Rgb {
    fn from(c: RGBColor) -> Self {
        Rgb(c.0, c.1, c.2)
    }
}

impl FromStr for Rgb {
    type Err = GlobeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || GlobeError::InvalidConfig(format!("invalid color '{s}'"));
        let text = s.trim();

        if let Some(hex) = text.strip_prefix('#') {
            if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
                return Err(invalid());
            }
            let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());
            return Ok(Rgb(channel(0)?, channel(2)?, channel(4)?));
        }

        let inner = text
            .strip_prefix("rgb(")
            .and_then(|rest| rest.strip_suffix(')'))
            .ok_or_else(invalid)?;
        let channels: Vec<u8> = inner
            .split(',')
            .map(|part| part.trim().parse::<u8>().map_err(|_| invalid()))
            .collect::<Result<_, _>>()?;
        match channels.as_slice() {
            [r, g, b] => Ok(Rgb(*r, *g, *b)),
            _ => Err(invalid()),
        }
    }
}

impl TryFrom<String> for Rgb {
    type Error = GlobeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}


// src/colorscale.rs

// src/metrics.rs

/// Centralized metric naming and default styling
///
/// Every per-country indicator the renderer understands, with the CSV column it
/// is read from, the label used in legends and dropdowns, and its default
/// colorbar styling.
use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::colorscale::ColorScale;
use crate::error::GlobeError;

pub const METRIC_COUNT: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(try_from = "String")]
pub enum Metric {
    Htn,
    Physicians,
    Nurses,
    Pharmacists,
    Chws,
    TotalHw,
}

/// Metrics offered in the multi-metric dropdown when none are requested.
pub const DEFAULT_SELECTION: [Metric; 5] = [
    Metric::Htn,
    Metric::Physicians,
    Metric::Nurses,
    Metric::Pharmacists,
    Metric::Chws,
];

impl Metric {
    pub const ALL: [Metric; METRIC_COUNT] = [
        Metric::Htn,
        Metric::Physicians,
        Metric::Nurses,
        Metric::Pharmacists,
        Metric::Chws,
        Metric::TotalHw,
    ];

    /// Position of this metric in per-row value arrays.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Header of the CSV column holding this metric.
    pub fn column(self) -> &'static str {
        match self {
            Metric::Htn => "htn",
            Metric::Physicians => "phy",
            Metric::Nurses => "nurse",
            Metric::Pharmacists => "pharma",
            Metric::Chws => "chws",
            Metric::TotalHw => "hw",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Metric::Htn => "HTN",
            Metric::Physicians => "Physicians",
            Metric::Nurses => "Nurses",
            Metric::Pharmacists => "Pharmacists",
            Metric::Chws => "CHWs",
            Metric::TotalHw => "Total HW",
        }
    }

    pub fn long_name(self) -> &'static str {
        match self {
            Metric::Htn => "Hypertension Prevalence",
            Metric::Physicians => "Physician Density",
            Metric::Nurses => "Nurse Density",
            Metric::Pharmacists => "Pharmacist Density",
            Metric::Chws => "Community Health Worker Density",
            Metric::TotalHw => "Total Health Workforce Density",
        }
    }

    pub fn default_style(self) -> MetricStyle {
        let (colorscale, range, title) = match self {
            Metric::Htn => (ColorScale::Reds, Some((0.0, 60.0)), "HTN Prevalence (%)"),
            Metric::Physicians => (ColorScale::Blues, Some((0.0, 50.0)), "Physicians (/10K)"),
            Metric::Nurses => (ColorScale::Greens, Some((0.0, 100.0)), "Nurses (/10K)"),
            Metric::Pharmacists => (ColorScale::Purples, Some((0.0, 30.0)), "Pharmacists (/10K)"),
            Metric::Chws => (ColorScale::Oranges, Some((0.0, 50.0)), "CHWs (/10K)"),
            Metric::TotalHw => (ColorScale::Greys, None, "Total HW (/10K)"),
        };
        MetricStyle {
            colorscale,
            zmin: range.map(|r| r.0),
            zmax: range.map(|r| r.1),
            title: Some(title.to_string()),
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Metric {
    type Err = GlobeError;

    /// Accepts the column name or the label, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Metric::ALL
            .iter()
            .copied()
            .find(|m| {
                m.column().eq_ignore_ascii_case(wanted) || m.label().eq_ignore_ascii_case(wanted)
            })
            .ok_or_else(|| GlobeError::UnknownMetric(wanted.to_string()))
    }
}

impl TryFrom<String> for Metric {
    type Error = GlobeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Colorbar styling for one metric. Missing bounds are taken from the data.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MetricStyle {
    pub colorscale: ColorScale,
    #[serde(default)]
    pub zmin: Option<f64>,
    #[serde(default)]
    pub zmax: Option<f64>,
    #[serde(default)]
    pub title: Option<String>,
}

impl MetricStyle {
    pub fn colorbar_title(&self, metric: Metric) -> String {
        self.title
            .clone()
            .unwrap_or_else(|| metric.label().to_string())
    }
}


// src/metrics.rs

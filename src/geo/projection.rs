// src/geo/projection.rs

use std::f64::consts::PI;

use ndarray::{arr1, arr2, Array1, Array2};

use crate::constants::LIMB_ARC_STEP_RAD;
use crate::error::{GlobeError, Result};
use crate::geo::geometry::GeoPoint;

/// Orthographic view of the unit sphere centred on (`center_lon`, `center_lat`),
/// scaled to `radius` pixels around `center_px`.
#[derive(Debug, Clone)]
pub struct Orthographic {
    /// Rows: east, north and view direction at the centre point.
    rotation: Array2<f64>,
    radius: f64,
    center_px: (f64, f64),
}

/// Point produced by hemisphere clipping, in globe units.
#[derive(Debug, Clone, Copy, PartialEq)]
enum ClipPoint {
    Inside(f64, f64),
    /// Ring leaves the visible hemisphere here.
    Exit(f64, f64),
    /// Ring comes back into view here.
    Entry(f64, f64),
}

impl ClipPoint {
    fn xy(self) -> (f64, f64) {
        match self {
            ClipPoint::Inside(x, y) | ClipPoint::Exit(x, y) | ClipPoint::Entry(x, y) => (x, y),
        }
    }
}

impl Orthographic {
    pub fn new(center_lon: f64, center_lat: f64, radius: f64, center_px: (i32, i32)) -> Self {
        let (sin_lon, cos_lon) = center_lon.to_radians().sin_cos();
        let (sin_lat, cos_lat) = center_lat.to_radians().sin_cos();
        let rotation = arr2(&[
            [-sin_lon, cos_lon, 0.0],
            [-sin_lat * cos_lon, -sin_lat * sin_lon, cos_lat],
            [cos_lat * cos_lon, cos_lat * sin_lon, sin_lat],
        ]);
        Orthographic {
            rotation,
            radius,
            center_px: (center_px.0 as f64, center_px.1 as f64),
        }
    }

    /// Rotated unit vector `[x, y, depth]`; `depth >= 0` faces the viewer.
    pub fn project(&self, point: GeoPoint) -> Array1<f64> {
        let (sin_lon, cos_lon) = point.lon.to_radians().sin_cos();
        let (sin_lat, cos_lat) = point.lat.to_radians().sin_cos();
        let cartesian = arr1(&[cos_lat * cos_lon, cos_lat * sin_lon, sin_lat]);
        self.rotation.dot(&cartesian)
    }

    pub fn is_visible(&self, point: GeoPoint) -> bool {
        self.project(point)[2] >= 0.0
    }

    /// Globe units to pixel coordinates (y grows downwards).
    pub fn to_screen(&self, x: f64, y: f64) -> (i32, i32) {
        (
            (self.center_px.0 + self.radius * x).round() as i32,
            (self.center_px.1 - self.radius * y).round() as i32,
        )
    }

    /// Clips a ring to the visible hemisphere and returns its pixel outline.
    ///
    /// Edges that cross the horizon are cut where they meet it; the hidden part of
    /// the ring is replaced by an arc along the limb between the exit and the next
    /// entry. A ring entirely on the far side yields an empty vector.
    pub fn clip_ring(&self, ring: &[GeoPoint]) -> Vec<(i32, i32)> {
        let mut points: Vec<Array1<f64>> = ring.iter().map(|p| self.project(*p)).collect();
        if points.len() > 1 && ring.first() == ring.last() {
            points.pop();
        }
        let n = points.len();
        if n < 3 {
            return Vec::new();
        }

        let mut clipped: Vec<ClipPoint> = Vec::with_capacity(n + 8);
        for i in 0..n {
            let a = &points[i];
            let b = &points[(i + 1) % n];
            match (a[2] >= 0.0, b[2] >= 0.0) {
                (true, true) => clipped.push(ClipPoint::Inside(b[0], b[1])),
                (true, false) => {
                    let (x, y) = horizon_crossing(a, b);
                    clipped.push(ClipPoint::Exit(x, y));
                }
                (false, true) => {
                    let (x, y) = horizon_crossing(a, b);
                    clipped.push(ClipPoint::Entry(x, y));
                    clipped.push(ClipPoint::Inside(b[0], b[1]));
                }
                (false, false) => {}
            }
        }
        if clipped.is_empty() {
            return Vec::new();
        }

        let mut outline = Vec::with_capacity(clipped.len() * 2);
        for (i, point) in clipped.iter().enumerate() {
            let (x, y) = point.xy();
            outline.push(self.to_screen(x, y));
            if let ClipPoint::Exit(..) = point {
                let (nx, ny) = clipped[(i + 1) % clipped.len()].xy();
                for (ax, ay) in limb_arc((x, y), (nx, ny)) {
                    outline.push(self.to_screen(ax, ay));
                }
            }
        }
        outline.dedup();
        outline
    }
}

/// Where segment `a → b` meets the `depth = 0` plane, pushed out onto the limb.
fn horizon_crossing(a: &Array1<f64>, b: &Array1<f64>) -> (f64, f64) {
    let t = a[2] / (a[2] - b[2]);
    let x = a[0] + t * (b[0] - a[0]);
    let y = a[1] + t * (b[1] - a[1]);
    let len = x.hypot(y);
    if len > 1e-12 {
        (x / len, y / len)
    } else {
        (x, y)
    }
}

/// Intermediate points on the unit circle strictly between `from` and `to`,
/// following the shorter way round.
fn limb_arc(from: (f64, f64), to: (f64, f64)) -> Vec<(f64, f64)> {
    let start = from.1.atan2(from.0);
    let mut sweep = to.1.atan2(to.0) - start;
    while sweep > PI {
        sweep -= 2.0 * PI;
    }
    while sweep <= -PI {
        sweep += 2.0 * PI;
    }
    let steps = (sweep.abs() / LIMB_ARC_STEP_RAD).ceil() as usize;
    (1..steps)
        .map(|k| {
            let angle = start + sweep * k as f64 / steps as f64;
            (angle.cos(), angle.sin())
        })
        .collect()
}

/// Centre longitudes of the rotation frames: `0, step, 2·step, …` below 360.
pub fn frame_longitudes(step_deg: f64) -> Result<Vec<f64>> {
    if !(step_deg > 0.0 && step_deg <= 360.0) {
        return Err(GlobeError::InvalidConfig(format!(
            "rotation step must be in (0, 360] degrees, got {step_deg}"
        )));
    }
    Ok((0..)
        .map(|i| i as f64 * step_deg)
        .take_while(|lon| *lon < 360.0 - 1e-9)
        .collect())
}


// src/geo/projection.rs

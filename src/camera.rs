//! Camera preset math
//!
//! Poses are plain position/target pairs in world space (Y up). Spherical
//! coordinates follow the orbit convention: polar angle measured from +Y,
//! azimuth = atan2(x, z) of the offset from the target.

use serde::{Deserialize, Serialize};

use crate::bounds::BoundingSphere;

/// Height above a seat's origin the focus camera looks at
pub const SEAT_FOCUS_LIFT: f64 = 1.2;
pub const FOCUS_DISTANCE: f64 = 6.0;
/// Focus offset direction before normalization
const FOCUS_DIRECTION: [f64; 3] = [0.0, 0.4, 1.0];
/// Gallery view direction, elevated and pulled back behind the dais
const GALLERY_DIRECTION: [f64; 3] = [0.0, 49.0, 95.0];
/// Extra room around the framed sphere
const FRAME_MARGIN: f64 = 1.1;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraPose {
    pub position: [f64; 3],
    pub target: [f64; 3],
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Preset {
    Gallery,
    TopDown,
}

impl CameraPose {
    pub fn distance(&self) -> f64 {
        length(self.offset())
    }

    fn offset(&self) -> [f64; 3] {
        sub(self.position, self.target)
    }

    /// (distance, polar, azimuth) of the camera around its target
    pub fn spherical(&self) -> (f64, f64, f64) {
        let [x, y, z] = self.offset();
        let r = length([x, y, z]);
        if r == 0.0 {
            return (0.0, 0.0, 0.0);
        }
        let polar = (y / r).clamp(-1.0, 1.0).acos();
        let azimuth = x.atan2(z);
        (r, polar, azimuth)
    }

    pub fn from_spherical(target: [f64; 3], distance: f64, polar: f64, azimuth: f64) -> Self {
        let (sp, cp) = polar.sin_cos();
        let (sa, ca) = azimuth.sin_cos();
        let position = [
            target[0] + distance * sp * sa,
            target[1] + distance * cp,
            target[2] + distance * sp * ca,
        ];
        Self { position, target }
    }

    /// Close-up on a single seat
    pub fn seat_focus(seat: [f64; 3]) -> Self {
        let target = [seat[0], seat[1] + SEAT_FOCUS_LIFT, seat[2]];
        let dir = normalize(FOCUS_DIRECTION);
        Self {
            position: [
                target[0] + dir[0] * FOCUS_DISTANCE,
                target[1] + dir[1] * FOCUS_DISTANCE,
                target[2] + dir[2] * FOCUS_DISTANCE,
            ],
            target,
        }
    }

    /// Frame the whole sphere for a vertical field of view (degrees)
    pub fn preset(preset: Preset, sphere: &BoundingSphere, fov_y_deg: f64) -> Self {
        let distance = framing_distance(sphere.radius, fov_y_deg);
        let dir = match preset {
            Preset::Gallery => normalize(GALLERY_DIRECTION),
            Preset::TopDown => [0.0, 1.0, 0.0],
        };
        let target = sphere.center;
        Self {
            position: [
                target[0] + dir[0] * distance,
                target[1] + dir[1] * distance,
                target[2] + dir[2] * distance,
            ],
            target,
        }
    }
}

/// Distance at which a sphere of `radius` fills the vertical field of view
pub fn framing_distance(radius: f64, fov_y_deg: f64) -> f64 {
    let half = (fov_y_deg.clamp(1.0, 179.0) / 2.0).to_radians();
    radius * FRAME_MARGIN / half.sin()
}

/// Limits applied to user orbiting
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrbitLimits {
    pub polar_min: f64,
    pub polar_max: f64,
    pub azimuth_min: f64,
    pub azimuth_max: f64,
    pub distance_min: f64,
    pub distance_max: f64,
}

impl Default for OrbitLimits {
    fn default() -> Self {
        Self {
            polar_min: 0.45,
            polar_max: 1.15,
            azimuth_min: -1.83,
            azimuth_max: 1.83,
            distance_min: 0.5,
            distance_max: 240.0,
        }
    }
}

impl OrbitLimits {
    pub fn clamp(&self, pose: &CameraPose) -> CameraPose {
        let (distance, polar, azimuth) = pose.spherical();
        CameraPose::from_spherical(
            pose.target,
            distance.clamp(self.distance_min, self.distance_max),
            polar.clamp(self.polar_min, self.polar_max),
            azimuth.clamp(self.azimuth_min, self.azimuth_max),
        )
    }

    pub fn contains(&self, pose: &CameraPose) -> bool {
        let (distance, polar, azimuth) = pose.spherical();
        (self.distance_min..=self.distance_max).contains(&distance)
            && (self.polar_min..=self.polar_max).contains(&polar)
            && (self.azimuth_min..=self.azimuth_max).contains(&azimuth)
    }
}

/// Index of the projected point closest to the cursor
pub fn nearest_seat(points: &[[f64; 2]], cursor: [f64; 2]) -> Option<usize> {
    points
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let (dx, dy) = (p[0] - cursor[0], p[1] - cursor[1]);
            (i, dx * dx + dy * dy)
        })
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(i, _)| i)
}

fn sub(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

fn length(v: [f64; 3]) -> f64 {
    (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt()
}

fn normalize(v: [f64; 3]) -> [f64; 3] {
    let len = length(v);
    [v[0] / len, v[1] / len, v[2] / len]
}

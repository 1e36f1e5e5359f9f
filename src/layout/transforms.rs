//! Transform Emitter
//!
//! Turns solved angles into world-space seat transforms. Y is up; the assembly
//! lies in the XZ plane around the focal point.

use serde::Serialize;

use super::{LayoutConfig, LayoutSolution, SeatOrder};

/// Quaternion as [w, x, y, z]
pub type Quat = [f64; 4];

/// Create quaternion from axis-angle
fn q_from_axis_angle(axis: [f64; 3], angle: f64) -> Quat {
    let half = angle / 2.0;
    let s = half.sin();
    [half.cos(), axis[0] * s, axis[1] * s, axis[2] * s]
}

/// World transform of a single seat
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeatTransform {
    pub index: usize,
    pub spoke: usize,
    pub row: usize,
    pub seat: usize,
    pub position: [f64; 3],
    /// Rotation about +Y that turns the seat's +Z toward the focal point
    pub yaw: f64,
    pub rotation: Quat,
}

impl SeatTransform {
    /// Column-major 4x4 matrix (rotation about Y, unit scale, translation)
    pub fn matrix(&self) -> [f64; 16] {
        let (s, c) = self.yaw.sin_cos();
        let [x, y, z] = self.position;
        [
            c, 0.0, -s, 0.0, //
            0.0, 1.0, 0.0, 0.0, //
            s, 0.0, c, 0.0, //
            x, y, z, 1.0,
        ]
    }

    /// Unit vector the seat faces, in the horizontal plane
    pub fn forward(&self) -> [f64; 3] {
        let (s, c) = self.yaw.sin_cos();
        [s, 0.0, c]
    }
}

/// Polyline along one bench centerline, for renderers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BenchArc {
    pub spoke: usize,
    pub row: usize,
    pub points: Vec<[f64; 3]>,
}

/// Emit every seat transform in global index order.
///
/// Seat `i` of `n` in a row sits at angle
/// `center - seat_span/2 + i * (w + g) + w/2` (all angular at the row radius),
/// placed on the chair radius behind the bench.
pub fn emit_transforms(
    config: &LayoutConfig,
    solution: &LayoutSolution,
    order: &SeatOrder,
) -> Vec<SeatTransform> {
    let [fx, _, fz] = config.focal_point;
    let mut transforms = Vec::with_capacity(order.total());

    for (index, address) in order.iter() {
        let row = &solution.rows[address.row];
        let center = row.center_angles[address.spoke];
        let half_span = row.seat_spans[address.spoke] / 2.0;
        let seat_ang_w = config.chair_width / row.radius;
        let seat_ang_gap = config.chair_gap / row.radius;

        let angle = center
            + (-half_span + address.seat as f64 * (seat_ang_w + seat_ang_gap) + seat_ang_w / 2.0);
        let x = row.seat_radius * angle.cos();
        let z = row.seat_radius * angle.sin();
        let y = address.row as f64 * config.elevation_step;

        let yaw = (fx - x).atan2(fz - z);

        transforms.push(SeatTransform {
            index,
            spoke: address.spoke,
            row: address.row,
            seat: address.seat,
            position: [x, y, z],
            yaw,
            rotation: q_from_axis_angle([0.0, 1.0, 0.0], yaw),
        });
    }

    tracing::debug!("Emitted {} seat transforms", transforms.len());
    transforms
}

/// Sample each bench centerline with `segments + 1` points
pub fn emit_bench_arcs(
    config: &LayoutConfig,
    solution: &LayoutSolution,
    segments: usize,
) -> Vec<BenchArc> {
    let segments = segments.max(1);
    let mut arcs = Vec::with_capacity(config.spoke_count() * solution.rows.len());

    for spoke in 0..config.spoke_count() {
        for row in &solution.rows {
            let center = row.center_angles[spoke];
            let span = row.bench_spans[spoke];
            let y = row.row as f64 * config.elevation_step;
            let points = (0..=segments)
                .map(|i| {
                    let angle = center - span / 2.0 + span * i as f64 / segments as f64;
                    [row.radius * angle.cos(), y, row.radius * angle.sin()]
                })
                .collect();
            arcs.push(BenchArc {
                spoke,
                row: row.row,
                points,
            });
        }
    }
    arcs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::solve;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::{PI, TAU};

    /// Signed angle from `a` to `b`, wrapped into (-PI, PI]
    fn angle_between(a: [f64; 3], b: [f64; 3]) -> f64 {
        let d = (b[2].atan2(b[0]) - a[2].atan2(a[0])) % TAU;
        if d > PI {
            d - TAU
        } else if d <= -PI {
            d + TAU
        } else {
            d
        }
    }

    fn default_transforms() -> (LayoutConfig, Vec<SeatTransform>) {
        let config = LayoutConfig::default();
        let solution = solve(&config).unwrap();
        let order = SeatOrder::from_config(&config);
        let transforms = emit_transforms(&config, &solution, &order);
        (config, transforms)
    }

    #[test]
    fn test_emits_every_seat_in_order() {
        let (_, transforms) = default_transforms();
        assert_eq!(transforms.len(), 243);
        for (i, t) in transforms.iter().enumerate() {
            assert_eq!(t.index, i);
        }
        assert_eq!((transforms[0].spoke, transforms[0].row), (0, 0));
        assert_eq!(transforms[100].spoke, 2);
        assert_eq!(transforms[122].spoke, 3);
        assert_eq!(transforms[143].spoke, 4);
        assert_eq!((transforms[242].spoke, transforms[242].row), (5, 4));
    }

    #[test]
    fn test_seats_on_chair_radius_and_elevation() {
        let (config, transforms) = default_transforms();
        for t in &transforms {
            let [x, y, z] = t.position;
            assert_abs_diff_eq!((x * x + z * z).sqrt(), config.seat_radius(t.row), epsilon = 1e-9);
            assert_abs_diff_eq!(y, t.row as f64 * 0.4, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_seats_face_focal_point() {
        let (_, transforms) = default_transforms();
        for t in &transforms {
            let [x, _, z] = t.position;
            let len = (x * x + z * z).sqrt();
            let toward = [-x / len, -z / len];
            let forward = t.forward();
            assert_abs_diff_eq!(forward[0], toward[0], epsilon = 1e-9);
            assert_abs_diff_eq!(forward[2], toward[1], epsilon = 1e-9);

            // Quaternion is a pure yaw
            let [w, qx, qy, qz] = t.rotation;
            assert_abs_diff_eq!(w * w + qy * qy, 1.0, epsilon = 1e-12);
            assert_eq!((qx, qz), (0.0, 0.0));
        }
    }

    #[test]
    fn test_adjacent_seats_evenly_spaced() {
        let (config, transforms) = default_transforms();
        for pair in transforms.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            if a.spoke != b.spoke || a.row != b.row {
                continue;
            }
            let step = angle_between(a.position, b.position);
            let radius = config.row_radius(a.row);
            assert_abs_diff_eq!(
                step,
                (config.chair_width + config.chair_gap) / radius,
                epsilon = 1e-9
            );
        }
    }

    #[test]
    fn test_row_centered_on_spoke_angle() {
        let config = LayoutConfig::default();
        let solution = solve(&config).unwrap();
        let order = SeatOrder::from_config(&config);
        let transforms = emit_transforms(&config, &solution, &order);

        // Row 0 of S1 has 8 seats; its middle lies halfway between seats 3 and 4
        let a = transforms[3].position;
        let b = transforms[4].position;
        let mid = a[2].atan2(a[0]) + angle_between(a, b) / 2.0;
        assert_abs_diff_eq!(mid, solution.center_angle(0, 0).unwrap(), epsilon = 1e-9);
    }

    #[test]
    fn test_emission_is_idempotent() {
        let (_, first) = default_transforms();
        let (_, second) = default_transforms();
        assert_eq!(first, second);
    }

    #[test]
    fn test_matrix_layout() {
        let (_, transforms) = default_transforms();
        let t = transforms[57];
        let m = t.matrix();
        assert_eq!(&m[12..15], &t.position[..]);
        assert_eq!(m[15], 1.0);
        // Third column is the forward axis
        let forward = t.forward();
        assert_abs_diff_eq!(m[8], forward[0], epsilon = 1e-12);
        assert_abs_diff_eq!(m[10], forward[2], epsilon = 1e-12);
    }

    #[test]
    fn test_bench_arcs_follow_spans() {
        let config = LayoutConfig::default();
        let solution = solve(&config).unwrap();
        let arcs = emit_bench_arcs(&config, &solution, 12);
        assert_eq!(arcs.len(), 30);
        for arc in &arcs {
            assert_eq!(arc.points.len(), 13);
            // Benches near the ends of the fan can cross the -X axis
            let sweep: f64 = arc.points.windows(2).map(|w| angle_between(w[0], w[1])).sum();
            assert_abs_diff_eq!(
                sweep,
                solution.bench_span(arc.spoke, arc.row).unwrap(),
                epsilon = 1e-9
            );
        }
    }
}

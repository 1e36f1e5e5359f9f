//! Bounding sphere over emitted seats, used to frame camera presets

use serde::Serialize;

use crate::layout::SeatTransform;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoundingSphere {
    pub center: [f64; 3],
    pub radius: f64,
}

/// Sphere centered on the axis-aligned box of all seat positions, with the
/// radius reaching the farthest seat. `None` for an empty slice.
pub fn bounding_sphere(seats: &[SeatTransform]) -> Option<BoundingSphere> {
    let first = seats.first()?.position;
    let (min, max) = seats.iter().fold((first, first), |(mut lo, mut hi), t| {
        for axis in 0..3 {
            lo[axis] = lo[axis].min(t.position[axis]);
            hi[axis] = hi[axis].max(t.position[axis]);
        }
        (lo, hi)
    });

    let center = [
        (min[0] + max[0]) / 2.0,
        (min[1] + max[1]) / 2.0,
        (min[2] + max[2]) / 2.0,
    ];
    let radius = seats
        .iter()
        .map(|t| distance(center, t.position))
        .fold(0.0, f64::max);

    Some(BoundingSphere { center, radius })
}

pub(crate) fn distance(a: [f64; 3], b: [f64; 3]) -> f64 {
    let d = [b[0] - a[0], b[1] - a[1], b[2] - a[2]];
    (d[0] * d[0] + d[1] * d[1] + d[2] * d[2]).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{emit_transforms, solve, LayoutConfig, SeatOrder};
    use approx::assert_abs_diff_eq;

    fn seat_at(index: usize, position: [f64; 3]) -> SeatTransform {
        SeatTransform {
            index,
            spoke: 0,
            row: 0,
            seat: index,
            position,
            yaw: 0.0,
            rotation: [1.0, 0.0, 0.0, 0.0],
        }
    }

    #[test]
    fn test_empty_has_no_sphere() {
        assert_eq!(bounding_sphere(&[]), None);
    }

    #[test]
    fn test_single_seat() {
        let sphere = bounding_sphere(&[seat_at(0, [1.0, 2.0, 3.0])]).unwrap();
        assert_eq!(sphere.center, [1.0, 2.0, 3.0]);
        assert_eq!(sphere.radius, 0.0);
    }

    #[test]
    fn test_box_center_and_farthest_seat() {
        let seats = [
            seat_at(0, [-4.0, 0.0, 0.0]),
            seat_at(1, [4.0, 0.0, 0.0]),
            seat_at(2, [0.0, 0.0, 3.0]),
        ];
        let sphere = bounding_sphere(&seats).unwrap();
        assert_eq!(sphere.center, [0.0, 0.0, 1.5]);
        assert_abs_diff_eq!(sphere.radius, (16.0f64 + 2.25).sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn test_contains_assembly() {
        let config = LayoutConfig::default();
        let solution = solve(&config).unwrap();
        let seats = emit_transforms(&config, &solution, &SeatOrder::from_config(&config));
        let sphere = bounding_sphere(&seats).unwrap();

        for t in &seats {
            assert!(distance(sphere.center, t.position) <= sphere.radius + 1e-9);
        }
        // Outermost chairs sit at 16 + 12 + 1.2 from the focal point
        assert!(sphere.radius > 14.0 && sphere.radius < 2.0 * 29.2);
    }
}

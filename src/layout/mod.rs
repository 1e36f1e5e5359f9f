//! Seat Layout Geometry
//!
//! Benches are grouped into angular spokes fanned around a focal point (the
//! speaker's dais). Each spoke holds a fixed number of rows; row radius grows
//! outward with the row index.
//! - `solver`: per-row centerline angles and bench spans that keep walkways open
//! - `order`: the global seat index traversal order
//! - `transforms`: seat positions and orientations in world space

pub mod order;
pub mod solver;
pub mod transforms;

pub use order::{SeatAddress, SeatOrder, SpokeRange, SEAT_ORDER_VERSION};
pub use solver::{solve, LayoutSolution, PairResidual, RowSolution, SolveReport};
pub use transforms::{emit_bench_arcs, emit_transforms, BenchArc, SeatTransform};

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LayoutError {
    #[error("layout needs at least two spokes, got {0}")]
    TooFewSpokes(usize),
    #[error("spoke '{spoke}' has {found} rows, expected {expected}")]
    RowCountMismatch {
        spoke: String,
        expected: usize,
        found: usize,
    },
    #[error("spoke '{spoke}' row {row} has no seats")]
    EmptyRow { spoke: String, row: usize },
    #[error("duplicate spoke name '{0}'")]
    DuplicateSpoke(String),
    #[error("invalid layout constant {name}: {value}")]
    InvalidConstant { name: &'static str, value: f64 },
}

/// One angular group of benches
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpokeConfig {
    pub name: String,
    /// Seat count per row, innermost row first
    pub rows: Vec<usize>,
}

impl SpokeConfig {
    pub fn new(name: &str, rows: &[usize]) -> Self {
        Self {
            name: name.to_string(),
            rows: rows.to_vec(),
        }
    }

    pub fn total_seats(&self) -> usize {
        self.rows.iter().sum()
    }
}

/// Walkway requirement between two adjacent spokes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairSpec {
    pub a: usize,
    pub b: usize,
    /// Target walkway width in world units
    pub walkway: f64,
    pub allow_fanout: bool,
}

/// Immutable layout configuration. All lengths are world units (meters).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub start_radius: f64,
    pub row_spacing: f64,

    // Base spoke placement (degrees)
    pub center_base_deg: f64,
    pub outer_gap_deg: f64,
    pub center_gap_deg: f64,

    // Bench and chair footprint
    pub bench_depth: f64,
    pub chair_width: f64,
    pub chair_gap: f64,
    pub chair_end_margin: f64,
    pub edge_end_margin: f64,
    pub seat_edge_margin: f64,
    pub chair_back_offset: f64,
    pub elevation_step: f64,
    /// Extra bench length beyond the chairs that trimming may remove
    pub bench_extension: f64,

    // Walkway targets
    pub walkway_outer: f64,
    pub walkway_center: f64,

    /// Point every seat faces
    pub focal_point: [f64; 3],

    // Solver tuning
    pub max_trim_passes: usize,
    pub max_fanout_passes: usize,
    pub deficit_tolerance: f64,

    /// Spokes in seat traversal order
    pub spokes: Vec<SpokeConfig>,
}

const ROWS_OUTER: [usize; 5] = [8, 9, 10, 11, 12];
const ROWS_CENTER_RIGHT: [usize; 5] = [4, 4, 5, 5, 4];
const ROWS_CENTER_LEFT: [usize; 5] = [3, 4, 4, 5, 5];

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            start_radius: 16.0,
            row_spacing: 3.0,
            center_base_deg: 90.0,
            outer_gap_deg: 24.0,
            center_gap_deg: 12.0,
            bench_depth: 1.0,
            chair_width: 0.6,
            chair_gap: 0.55,
            chair_end_margin: 0.35,
            edge_end_margin: 0.2,
            seat_edge_margin: 0.05,
            chair_back_offset: 0.7,
            elevation_step: 0.4,
            bench_extension: 0.0,
            walkway_outer: 2.2,
            walkway_center: 1.6,
            focal_point: [0.0, 0.0, 0.0],
            max_trim_passes: 8,
            max_fanout_passes: 64,
            deficit_tolerance: 1e-4,
            spokes: vec![
                SpokeConfig::new("S1", &ROWS_OUTER),
                SpokeConfig::new("S2", &ROWS_OUTER),
                SpokeConfig::new("C-R", &ROWS_CENTER_RIGHT),
                SpokeConfig::new("C-L", &ROWS_CENTER_LEFT),
                SpokeConfig::new("S5", &ROWS_OUTER),
                SpokeConfig::new("S6", &ROWS_OUTER),
            ],
        }
    }
}

impl LayoutConfig {
    /// Check geometry constants and spoke tables before solving
    pub fn validate(&self) -> Result<(), LayoutError> {
        let positive = [
            ("start_radius", self.start_radius),
            ("row_spacing", self.row_spacing),
            ("chair_width", self.chair_width),
            ("deficit_tolerance", self.deficit_tolerance),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(LayoutError::InvalidConstant { name, value });
            }
        }

        let non_negative = [
            ("chair_gap", self.chair_gap),
            ("chair_end_margin", self.chair_end_margin),
            ("edge_end_margin", self.edge_end_margin),
            ("seat_edge_margin", self.seat_edge_margin),
            ("chair_back_offset", self.chair_back_offset),
            ("bench_depth", self.bench_depth),
            ("bench_extension", self.bench_extension),
            ("walkway_outer", self.walkway_outer),
            ("walkway_center", self.walkway_center),
            ("outer_gap_deg", self.outer_gap_deg),
            ("center_gap_deg", self.center_gap_deg),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(LayoutError::InvalidConstant { name, value });
            }
        }

        for (name, value) in [
            ("center_base_deg", self.center_base_deg),
            ("elevation_step", self.elevation_step),
        ] {
            if !value.is_finite() {
                return Err(LayoutError::InvalidConstant { name, value });
            }
        }
        if let Some(value) = self.focal_point.iter().copied().find(|v| !v.is_finite()) {
            return Err(LayoutError::InvalidConstant {
                name: "focal_point",
                value,
            });
        }

        if self.spokes.len() < 2 {
            return Err(LayoutError::TooFewSpokes(self.spokes.len()));
        }

        let expected = self.spokes[0].rows.len();
        let mut names = HashSet::new();
        for spoke in &self.spokes {
            if !names.insert(spoke.name.as_str()) {
                return Err(LayoutError::DuplicateSpoke(spoke.name.clone()));
            }
            if spoke.rows.len() != expected || expected == 0 {
                return Err(LayoutError::RowCountMismatch {
                    spoke: spoke.name.clone(),
                    expected,
                    found: spoke.rows.len(),
                });
            }
            if let Some(row) = spoke.rows.iter().position(|&n| n == 0) {
                return Err(LayoutError::EmptyRow {
                    spoke: spoke.name.clone(),
                    row,
                });
            }
        }

        Ok(())
    }

    pub fn spoke_count(&self) -> usize {
        self.spokes.len()
    }

    pub fn row_count(&self) -> usize {
        self.spokes.first().map(|s| s.rows.len()).unwrap_or(0)
    }

    pub fn total_seats(&self) -> usize {
        self.spokes.iter().map(SpokeConfig::total_seats).sum()
    }

    /// Bench radius of a row
    pub fn row_radius(&self, row: usize) -> f64 {
        self.start_radius + row as f64 * self.row_spacing
    }

    /// Chairs sit behind the bench, so their radius is larger than the row's
    pub fn seat_radius(&self, row: usize) -> f64 {
        self.row_radius(row) + self.bench_depth / 2.0 + self.chair_back_offset
    }

    /// Linear length occupied by `seats` chairs side by side
    pub fn seat_span_linear(&self, seats: usize) -> f64 {
        if seats == 0 {
            return 0.0;
        }
        seats as f64 * self.chair_width + (seats - 1) as f64 * self.chair_gap
    }

    /// Outermost spokes get extra end margin
    pub fn is_edge_spoke(&self, spoke: usize) -> bool {
        spoke == 0 || spoke + 1 == self.spokes.len()
    }

    /// Linear bench margin at each end of a spoke's chairs
    pub fn end_margin(&self, spoke: usize) -> f64 {
        if self.is_edge_spoke(spoke) {
            self.chair_end_margin + self.edge_end_margin
        } else {
            self.chair_end_margin
        }
    }

    /// Index of the left spoke in the central pair (only for an even spoke count)
    fn center_pair(&self) -> Option<usize> {
        let n = self.spokes.len();
        (n >= 2 && n % 2 == 0).then(|| n / 2 - 1)
    }

    /// Base centerline angle of every spoke in degrees.
    ///
    /// Spokes are symmetric around `center_base_deg`: adjacent spokes are
    /// `outer_gap_deg` apart except the central pair, which is
    /// `center_gap_deg` apart.
    pub fn base_angles_deg(&self) -> Vec<f64> {
        let n = self.spokes.len();
        if n == 0 {
            return Vec::new();
        }
        let gaps: Vec<f64> = (0..n - 1)
            .map(|i| {
                if Some(i) == self.center_pair() {
                    self.center_gap_deg
                } else {
                    self.outer_gap_deg
                }
            })
            .collect();

        let total: f64 = gaps.iter().sum();
        let mut angles = Vec::with_capacity(n);
        let mut angle = self.center_base_deg - total / 2.0;
        angles.push(angle);
        for gap in gaps {
            angle += gap;
            angles.push(angle);
        }
        angles
    }

    /// Walkway specs for every adjacent spoke pair, in spoke order
    pub fn pair_specs(&self) -> Vec<PairSpec> {
        (0..self.spokes.len().saturating_sub(1))
            .map(|a| PairSpec {
                a,
                b: a + 1,
                walkway: if Some(a) == self.center_pair() {
                    self.walkway_center
                } else {
                    self.walkway_outer
                },
                allow_fanout: true,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_default_seat_total() {
        let config = LayoutConfig::default();
        let per_spoke: Vec<usize> = config.spokes.iter().map(SpokeConfig::total_seats).collect();
        assert_eq!(per_spoke, vec![50, 50, 22, 21, 50, 50]);
        assert_eq!(config.total_seats(), 243);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_base_angles() {
        let angles = LayoutConfig::default().base_angles_deg();
        let expected = [36.0, 60.0, 84.0, 96.0, 120.0, 144.0];
        assert_eq!(angles.len(), expected.len());
        for (a, e) in angles.iter().zip(expected) {
            assert_abs_diff_eq!(*a, e, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_row_radius_monotonic() {
        let config = LayoutConfig::default();
        for row in 1..config.row_count() {
            assert!(config.row_radius(row) > config.row_radius(row - 1));
            assert!(config.seat_radius(row) > config.seat_radius(row - 1));
        }
        assert_abs_diff_eq!(config.row_radius(4), 28.0, epsilon = 1e-12);
        assert_abs_diff_eq!(config.seat_radius(0), 17.2, epsilon = 1e-12);
    }

    #[test]
    fn test_pair_specs() {
        let pairs = LayoutConfig::default().pair_specs();
        assert_eq!(pairs.len(), 5);
        let walkways: Vec<f64> = pairs.iter().map(|p| p.walkway).collect();
        assert_eq!(walkways, vec![2.2, 2.2, 1.6, 2.2, 2.2]);
        assert!(pairs.iter().all(|p| p.b == p.a + 1 && p.allow_fanout));
    }

    #[test]
    fn test_edge_margin() {
        let config = LayoutConfig::default();
        assert_abs_diff_eq!(config.end_margin(0), 0.55, epsilon = 1e-12);
        assert_abs_diff_eq!(config.end_margin(2), 0.35, epsilon = 1e-12);
        assert_abs_diff_eq!(config.end_margin(5), 0.55, epsilon = 1e-12);
    }

    #[test]
    fn test_validate_rejects_bad_tables() {
        let mut config = LayoutConfig::default();
        config.spokes[3].rows.pop();
        assert!(matches!(
            config.validate(),
            Err(LayoutError::RowCountMismatch { .. })
        ));

        let mut config = LayoutConfig::default();
        config.spokes[1].rows[2] = 0;
        assert_eq!(
            config.validate(),
            Err(LayoutError::EmptyRow {
                spoke: "S2".to_string(),
                row: 2
            })
        );

        let mut config = LayoutConfig::default();
        config.spokes[4].name = "S1".to_string();
        assert_eq!(
            config.validate(),
            Err(LayoutError::DuplicateSpoke("S1".to_string()))
        );

        let mut config = LayoutConfig::default();
        config.start_radius = -1.0;
        assert!(matches!(
            config.validate(),
            Err(LayoutError::InvalidConstant { name: "start_radius", .. })
        ));

        let mut config = LayoutConfig::default();
        config.spokes.truncate(1);
        assert_eq!(config.validate(), Err(LayoutError::TooFewSpokes(1)));
    }
}

//! Arc Layout Solver
//!
//! Works one row at a time (rows never interact):
//! 1. Convert chair/bench footprints to angular spans at the row radius
//! 2. Trim benches toward their minimum where a walkway is too narrow
//! 3. Fan spoke centerlines outward where trimming is not enough
//! 4. Re-check the gaps at chair radius and nudge any residual deficit
//!
//! Every phase runs a bounded number of passes. When the budget runs out the
//! best geometry so far is returned and the shortfall shows up in
//! [`SolveReport`].

use serde::Serialize;
use tracing::{debug, warn};

use super::{LayoutConfig, LayoutError, PairSpec};

/// Solved geometry of one row across all spokes. Angles are radians.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowSolution {
    pub row: usize,
    pub radius: f64,
    pub seat_radius: f64,
    /// Centerline angle per spoke, adjusted for this row
    pub center_angles: Vec<f64>,
    pub bench_spans: Vec<f64>,
    pub min_bench_spans: Vec<f64>,
    /// Angular width of the chairs measured at the row radius
    pub seat_spans: Vec<f64>,
    pub trim_passes: usize,
    pub fanout_passes: usize,
    pub fanout_converged: bool,
    pub seat_nudges: usize,
}

/// Final walkway state of one neighbour pair in one row
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PairResidual {
    pub row: usize,
    pub a: usize,
    pub b: usize,
    /// Required angular gap between bench edges
    pub required: f64,
    /// Achieved angular gap between bench edges (negative when benches overlap)
    pub bench_gap: f64,
    /// Shortfall in radians, zero when satisfied
    pub deficit: f64,
    /// Achieved gap converted back to world units at the row radius
    pub linear_gap: f64,
    /// Both benches fully trimmed and fan-out unable to widen further
    pub slack_exhausted: bool,
    /// Required angular gap between chair edges at the chair radius
    pub seat_required: f64,
    /// Achieved gap between chair edges, seat-edge margins included
    pub seat_gap: f64,
    /// Shortfall at the chair radius left after the nudge pass
    pub seat_deficit: f64,
}

/// Convergence diagnostics for a whole solve
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SolveReport {
    pub residuals: Vec<PairResidual>,
    pub converged: bool,
}

impl SolveReport {
    /// Largest remaining walkway shortfall between bench edges, in radians
    pub fn max_deficit(&self) -> f64 {
        self.residuals.iter().map(|r| r.deficit).fold(0.0, f64::max)
    }

    /// Largest remaining shortfall between chair edges, in radians
    pub fn max_seat_deficit(&self) -> f64 {
        self.residuals.iter().map(|r| r.seat_deficit).fold(0.0, f64::max)
    }

    /// True when every walkway is within `tolerance` radians of its target
    /// at both the bench edges and the chair edges
    pub fn is_satisfied(&self, tolerance: f64) -> bool {
        self.max_deficit() <= tolerance && self.max_seat_deficit() <= tolerance
    }

    pub fn unsatisfied(&self, tolerance: f64) -> impl Iterator<Item = &PairResidual> {
        self.residuals.iter().filter(move |r| r.deficit > tolerance)
    }

    /// Pairs whose chair edges are still closer than the walkway
    pub fn seat_unsatisfied(&self, tolerance: f64) -> impl Iterator<Item = &PairResidual> {
        self.residuals
            .iter()
            .filter(move |r| r.seat_deficit > tolerance)
    }
}

/// Solved layout: one [`RowSolution`] per row plus diagnostics
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutSolution {
    pub rows: Vec<RowSolution>,
    pub report: SolveReport,
}

impl LayoutSolution {
    pub fn center_angle(&self, spoke: usize, row: usize) -> Option<f64> {
        self.rows.get(row)?.center_angles.get(spoke).copied()
    }

    pub fn bench_span(&self, spoke: usize, row: usize) -> Option<f64> {
        self.rows.get(row)?.bench_spans.get(spoke).copied()
    }

    pub fn seat_span(&self, spoke: usize, row: usize) -> Option<f64> {
        self.rows.get(row)?.seat_spans.get(spoke).copied()
    }
}

/// Solve centerline angles and bench spans for every row
pub fn solve(config: &LayoutConfig) -> Result<LayoutSolution, LayoutError> {
    config.validate()?;

    let base: Vec<f64> = config
        .base_angles_deg()
        .iter()
        .map(|d| d.to_radians())
        .collect();
    let pairs = config.pair_specs();

    let rows: Vec<RowSolution> = (0..config.row_count())
        .map(|row| solve_row(config, &pairs, &base, row))
        .collect();

    let report = build_report(config, &pairs, &rows);
    debug!(
        rows = rows.len(),
        spokes = config.spoke_count(),
        max_deficit = report.max_deficit(),
        max_seat_deficit = report.max_seat_deficit(),
        converged = report.converged,
        "Layout solved"
    );
    if !report.converged {
        warn!(
            max_deficit = report.max_deficit(),
            "Walkway fan-out hit its pass budget; layout is best-effort"
        );
    }
    if report.max_seat_deficit() > config.deficit_tolerance {
        warn!(
            max_seat_deficit = report.max_seat_deficit(),
            "Seat-edge nudge left chairs closer than the walkway"
        );
    }

    Ok(LayoutSolution { rows, report })
}

fn solve_row(config: &LayoutConfig, pairs: &[PairSpec], base: &[f64], row: usize) -> RowSolution {
    let radius = config.row_radius(row);
    let spokes = config.spoke_count();

    let mut seat_spans = Vec::with_capacity(spokes);
    let mut min_bench_spans = Vec::with_capacity(spokes);
    for (s, spoke) in config.spokes.iter().enumerate() {
        let seat_span = config.seat_span_linear(spoke.rows[row]) / radius;
        seat_spans.push(seat_span);
        min_bench_spans.push(seat_span + 2.0 * config.end_margin(s) / radius);
    }
    let mut bench_spans: Vec<f64> = min_bench_spans
        .iter()
        .map(|min| min + config.bench_extension / radius)
        .collect();
    let mut center_angles = base.to_vec();

    let trim_passes = trim_benches(
        config,
        pairs,
        radius,
        &center_angles,
        &mut bench_spans,
        &min_bench_spans,
    );
    let (fanout_passes, fanout_converged) =
        fan_out(config, pairs, radius, &mut center_angles, &bench_spans);

    let seat_radius = config.seat_radius(row);
    let seat_halves = seat_half_spans(config, &seat_spans, seat_radius);
    let seat_nudges =
        nudge_seat_edges(config, pairs, seat_radius, &mut center_angles, &seat_halves);

    debug!(
        row,
        radius, trim_passes, fanout_passes, fanout_converged, seat_nudges, "Row solved"
    );

    RowSolution {
        row,
        radius,
        seat_radius,
        center_angles,
        bench_spans,
        min_bench_spans,
        seat_spans,
        trim_passes,
        fanout_passes,
        fanout_converged,
        seat_nudges,
    }
}

/// Half chair footprint per spoke at the chair radius, seat-edge margin included
fn seat_half_spans(config: &LayoutConfig, seat_spans: &[f64], seat_radius: f64) -> Vec<f64> {
    seat_spans
        .iter()
        .map(|span| span / 2.0 + config.seat_edge_margin / seat_radius)
        .collect()
}

/// Angular gap between the facing edges of two spokes. Negative on overlap.
fn edge_gap(angles: &[f64], a: usize, b: usize, half_a: f64, half_b: f64) -> f64 {
    (angles[b] - angles[a]).abs() - half_a - half_b
}

/// Rotate both centerlines away from each other by `shift`
fn spread_apart(angles: &mut [f64], a: usize, b: usize, shift: f64) {
    if angles[a] < angles[b] {
        angles[a] -= shift;
        angles[b] += shift;
    } else {
        angles[a] += shift;
        angles[b] -= shift;
    }
}

/// Shrink benches toward their minimum span. Returns passes used.
fn trim_benches(
    config: &LayoutConfig,
    pairs: &[PairSpec],
    radius: f64,
    angles: &[f64],
    bench: &mut [f64],
    min_bench: &[f64],
) -> usize {
    let mut passes = 0;
    for _ in 0..config.max_trim_passes {
        passes += 1;
        let mut adjusted = false;

        for pair in pairs {
            let (a, b) = (pair.a, pair.b);
            let required = pair.walkway / radius;
            let gap = edge_gap(angles, a, b, bench[a] / 2.0, bench[b] / 2.0);
            let deficit = required - gap;
            if deficit <= config.deficit_tolerance {
                continue;
            }

            // Each unit of span removed widens the gap by half a unit
            let need = 2.0 * deficit;
            let avail_a = (bench[a] - min_bench[a]).max(0.0);
            let avail_b = (bench[b] - min_bench[b]).max(0.0);
            let give = need.min(avail_a + avail_b);
            if give > 0.0 {
                let take_a = avail_a.min(avail_a / (avail_a + avail_b).max(1e-6) * give);
                let take_b = give - take_a;
                bench[a] -= take_a;
                bench[b] -= take_b;
                adjusted = true;
            }
        }

        if !adjusted {
            break;
        }
    }
    passes
}

/// Rotate centerlines outward until every eligible pair has its walkway.
/// Returns (passes used, converged).
fn fan_out(
    config: &LayoutConfig,
    pairs: &[PairSpec],
    radius: f64,
    angles: &mut [f64],
    bench: &[f64],
) -> (usize, bool) {
    let mut passes = 0;
    for _ in 0..config.max_fanout_passes {
        passes += 1;
        let mut moved = false;

        for pair in pairs.iter().filter(|p| p.allow_fanout) {
            let required = pair.walkway / radius;
            let gap = edge_gap(
                angles,
                pair.a,
                pair.b,
                bench[pair.a] / 2.0,
                bench[pair.b] / 2.0,
            );
            let deficit = required - gap;
            if deficit > config.deficit_tolerance {
                spread_apart(angles, pair.a, pair.b, deficit / 2.0);
                moved = true;
            }
        }

        // Moving one spoke changes its other neighbour, so keep going until quiet
        if !moved {
            return (passes, true);
        }
    }
    (passes, false)
}

/// Final single pass at chair radius. Returns the number of nudges applied.
fn nudge_seat_edges(
    config: &LayoutConfig,
    pairs: &[PairSpec],
    seat_radius: f64,
    angles: &mut [f64],
    seat_halves: &[f64],
) -> usize {
    let mut nudges = 0;
    for pair in pairs {
        let required = pair.walkway / seat_radius;
        let gap = edge_gap(
            angles,
            pair.a,
            pair.b,
            seat_halves[pair.a],
            seat_halves[pair.b],
        );
        let deficit = required - gap;
        if deficit > config.deficit_tolerance {
            spread_apart(angles, pair.a, pair.b, deficit / 2.0);
            nudges += 1;
        }
    }
    nudges
}

fn build_report(config: &LayoutConfig, pairs: &[PairSpec], rows: &[RowSolution]) -> SolveReport {
    let mut residuals = Vec::with_capacity(rows.len() * pairs.len());
    for row in rows {
        let seat_halves = seat_half_spans(config, &row.seat_spans, row.seat_radius);
        for pair in pairs {
            let (a, b) = (pair.a, pair.b);
            let required = pair.walkway / row.radius;
            let bench_gap = edge_gap(
                &row.center_angles,
                a,
                b,
                row.bench_spans[a] / 2.0,
                row.bench_spans[b] / 2.0,
            );
            let trimmed = [a, b].iter().all(|&s| {
                row.bench_spans[s] - row.min_bench_spans[s] <= config.deficit_tolerance
            });
            let fan_blocked = !pair.allow_fanout || !row.fanout_converged;
            let seat_required = pair.walkway / row.seat_radius;
            let seat_gap = edge_gap(&row.center_angles, a, b, seat_halves[a], seat_halves[b]);

            residuals.push(PairResidual {
                row: row.row,
                a,
                b,
                required,
                bench_gap,
                deficit: (required - bench_gap).max(0.0),
                linear_gap: bench_gap * row.radius,
                slack_exhausted: trimmed && fan_blocked,
                seat_required,
                seat_gap,
                seat_deficit: (seat_required - seat_gap).max(0.0),
            });
        }
    }

    SolveReport {
        converged: rows.iter().all(|r| r.fanout_converged),
        residuals,
    }
}

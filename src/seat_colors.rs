//! Seat Color Resolver
//!
//! Within each alliance block the first `wins` seats get the solid alliance
//! color, the next `leads` seats a lighter shade, and the rest stay neutral.
//! Resolution never fails: counts beyond a block's capacity are dropped with a
//! warning so the visualization keeps rendering.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::color::Rgb;
use crate::registry::SeatRegistry;
use crate::timeline::Snapshot;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Palette {
    pub undeclared: Rgb,
    /// Blend toward white used for leading seats
    pub lead_shade_factor: f64,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            undeclared: Rgb::new(0x77, 0x77, 0x77),
            lead_shade_factor: 0.45,
        }
    }
}

/// Result state of a single seat. Alliance positions index into
/// [`SeatRegistry::alliances`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SeatStatus {
    Undeclared,
    Won(usize),
    Leading(usize),
}

/// wins + leads exceeded an alliance's block in one snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OverAllocation {
    pub alliance: String,
    pub wins: usize,
    pub leads: usize,
    pub capacity: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeatColors {
    pub colors: Vec<Rgb>,
    pub status: Vec<SeatStatus>,
    pub over_allocations: Vec<OverAllocation>,
    /// Snapshot ids with no registry entry
    pub unknown_alliances: Vec<String>,
}

impl SeatColors {
    /// Seats that are won or leading
    pub fn declared_count(&self) -> usize {
        self.status
            .iter()
            .filter(|s| !matches!(s, SeatStatus::Undeclared))
            .count()
    }

    pub fn hex(&self) -> Vec<String> {
        self.colors.iter().map(|c| c.to_hex()).collect()
    }

    /// Flat RGB float buffer, 3 floats per seat
    pub fn to_rgb_f32(&self) -> Vec<f32> {
        self.colors.iter().flat_map(|c| c.to_f32()).collect()
    }

    /// (wins, leads) actually painted for an alliance position
    pub fn painted(&self, alliance: usize) -> (usize, usize) {
        self.status.iter().fold((0, 0), |(w, l), s| match s {
            SeatStatus::Won(a) if *a == alliance => (w + 1, l),
            SeatStatus::Leading(a) if *a == alliance => (w, l + 1),
            _ => (w, l),
        })
    }
}

/// Colour every seat for one snapshot
pub fn resolve_colors(
    snapshot: &Snapshot,
    registry: &SeatRegistry,
    palette: &Palette,
) -> SeatColors {
    let total = registry.total_seats();
    let mut colors = vec![palette.undeclared; total];
    let mut status = vec![SeatStatus::Undeclared; total];
    let mut over_allocations = Vec::new();

    for (position, alliance) in registry.alliances().iter().enumerate() {
        let (wins, leads) = snapshot.counts_for(&alliance.id);
        let lead_shade = alliance.color.lighten(palette.lead_shade_factor);
        let block = &alliance.seats;
        // Feed counts are untrusted; saturate so huge values still truncate
        let claimed = wins.saturating_add(leads);

        for (i, &seat) in block.iter().enumerate().take(claimed) {
            if i < wins {
                colors[seat] = alliance.color;
                status[seat] = SeatStatus::Won(position);
            } else {
                colors[seat] = lead_shade;
                status[seat] = SeatStatus::Leading(position);
            }
        }

        if claimed > block.len() {
            warn!(
                "{} wins+leads ({}) exceed block size {} at {}",
                alliance.id,
                claimed,
                block.len(),
                snapshot.time
            );
            over_allocations.push(OverAllocation {
                alliance: alliance.id.clone(),
                wins,
                leads,
                capacity: block.len(),
            });
        }
    }

    let mut unknown_alliances: Vec<String> = Vec::new();
    for count in &snapshot.alliances {
        if registry.alliance(&count.id).is_none() && !unknown_alliances.contains(&count.id) {
            warn!("Snapshot {} references unknown alliance '{}'", snapshot.time, count.id);
            unknown_alliances.push(count.id.clone());
        }
    }

    SeatColors {
        colors,
        status,
        over_allocations,
        unknown_alliances,
    }
}

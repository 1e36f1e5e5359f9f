//! Global seat index order
//!
//! Seats are numbered spoke by spoke, each spoke row by row from the inner
//! row outward. Alliance seat blocks and every per-seat array depend on this
//! numbering, so it is exposed as a versioned schema that consumers can check
//! against instead of hard-coding offsets.

use serde::Serialize;
use std::ops::Range;

use super::LayoutConfig;

/// Bumped whenever the traversal rule itself changes
pub const SEAT_ORDER_VERSION: u32 = 1;

/// Contiguous index range owned by one spoke
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpokeRange {
    pub spoke: usize,
    pub name: String,
    pub start: usize,
    /// Seat count per row
    pub rows: Vec<usize>,
}

impl SpokeRange {
    pub fn len(&self) -> usize {
        self.rows.iter().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn indices(&self) -> Range<usize> {
        self.start..self.start + self.len()
    }

    /// First global index of a row within this spoke
    pub fn row_start(&self, row: usize) -> Option<usize> {
        (row < self.rows.len()).then(|| self.start + self.rows[..row].iter().sum::<usize>())
    }
}

/// Position of a seat in the layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct SeatAddress {
    pub spoke: usize,
    pub row: usize,
    pub seat: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeatOrder {
    version: u32,
    spokes: Vec<SpokeRange>,
    total: usize,
}

impl SeatOrder {
    pub fn from_config(config: &LayoutConfig) -> Self {
        let mut start = 0;
        let spokes = config
            .spokes
            .iter()
            .enumerate()
            .map(|(spoke, cfg)| {
                let range = SpokeRange {
                    spoke,
                    name: cfg.name.clone(),
                    start,
                    rows: cfg.rows.clone(),
                };
                start += range.len();
                range
            })
            .collect();

        Self {
            version: SEAT_ORDER_VERSION,
            spokes,
            total: start,
        }
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn spokes(&self) -> &[SpokeRange] {
        &self.spokes
    }

    pub fn spoke_by_name(&self, name: &str) -> Option<&SpokeRange> {
        self.spokes.iter().find(|s| s.name == name)
    }

    /// Compact description of the order, e.g. `v1:S1=50,S2=50,...`.
    /// Two orders with equal fingerprints assign identical indices.
    pub fn fingerprint(&self) -> String {
        let parts: Vec<String> = self
            .spokes
            .iter()
            .map(|s| {
                let rows: Vec<String> = s.rows.iter().map(|n| n.to_string()).collect();
                format!("{}={}[{}]", s.name, s.len(), rows.join("/"))
            })
            .collect();
        format!("v{}:{}", self.version, parts.join(","))
    }

    /// Where a global seat index lives
    pub fn locate(&self, index: usize) -> Option<SeatAddress> {
        let spoke = self.spokes.iter().find(|s| s.indices().contains(&index))?;
        let mut offset = index - spoke.start;
        for (row, &count) in spoke.rows.iter().enumerate() {
            if offset < count {
                return Some(SeatAddress {
                    spoke: spoke.spoke,
                    row,
                    seat: offset,
                });
            }
            offset -= count;
        }
        None
    }

    /// Global index of a seat address
    pub fn index_of(&self, address: SeatAddress) -> Option<usize> {
        let spoke = self.spokes.get(address.spoke)?;
        let count = *spoke.rows.get(address.row)?;
        if address.seat >= count {
            return None;
        }
        Some(spoke.row_start(address.row)? + address.seat)
    }

    /// Every seat in index order
    pub fn iter(&self) -> impl Iterator<Item = (usize, SeatAddress)> + '_ {
        self.spokes
            .iter()
            .flat_map(|spoke| {
                spoke.rows.iter().enumerate().flat_map(move |(row, &count)| {
                    (0..count).map(move |seat| SeatAddress {
                        spoke: spoke.spoke,
                        row,
                        seat,
                    })
                })
            })
            .enumerate()
    }
}

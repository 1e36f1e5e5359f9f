//! Alliance Seat-Block Registry
//!
//! Maps each alliance to an ordered list of global seat indices. Blocks are
//! described in terms of the layout's spokes (or explicit ranges) and resolved
//! against the [`SeatOrder`] at startup, so a change to the layout's traversal
//! order fails loudly here instead of silently mis-coloring seats.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;
use tracing::debug;

use crate::color::Rgb;
use crate::layout::SeatOrder;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RegistryError {
    #[error("seat order mismatch: registry expects '{expected}', layout is '{actual}'")]
    OrderMismatch { expected: String, actual: String },
    #[error("alliance '{0}' is declared twice")]
    DuplicateAlliance(String),
    #[error("{owner}: unknown spoke '{spoke}'")]
    UnknownSpoke { owner: String, spoke: String },
    #[error("{owner}: seat {seat} is outside 0..{total}")]
    SeatOutOfRange {
        owner: String,
        seat: usize,
        total: usize,
    },
    #[error("seat {seat} is assigned to both {first} and {second}")]
    DuplicateSeat {
        seat: usize,
        first: String,
        second: String,
    },
    #[error("{missing} seats are not assigned to any block (first: {first_missing})")]
    IncompleteCoverage { missing: usize, first_missing: usize },
}

/// Part of a seat block as written in configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BlockSegment {
    /// Every seat of a spoke, in traversal order
    Spoke { spoke: String },
    /// `len` consecutive indices starting at `start`
    Range { start: usize, len: usize },
    Indices(Vec<usize>),
}

impl BlockSegment {
    pub fn spoke(name: &str) -> Self {
        BlockSegment::Spoke {
            spoke: name.to_string(),
        }
    }

    fn resolve(&self, owner: &str, order: &SeatOrder) -> Result<Vec<usize>, RegistryError> {
        match self {
            BlockSegment::Spoke { spoke } => order
                .spoke_by_name(spoke)
                .map(|range| range.indices().collect())
                .ok_or_else(|| RegistryError::UnknownSpoke {
                    owner: owner.to_string(),
                    spoke: spoke.clone(),
                }),
            BlockSegment::Range { start, len } => {
                let total = order.total();
                match start.checked_add(*len) {
                    Some(end) if end <= total => Ok((*start..end).collect()),
                    _ => Err(RegistryError::SeatOutOfRange {
                        owner: owner.to_string(),
                        seat: if *start >= total { *start } else { total },
                        total,
                    }),
                }
            }
            BlockSegment::Indices(indices) => Ok(indices.clone()),
        }
    }
}

/// Alliance entry as written in configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllianceConfig {
    pub id: String,
    pub name: String,
    pub color: Rgb,
    #[serde(default)]
    pub block: Vec<BlockSegment>,
}

/// Resolved alliance with its seat block
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Alliance {
    pub id: String,
    pub name: String,
    pub color: Rgb,
    pub seats: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeatRegistry {
    alliances: Vec<Alliance>,
    unallocated: Vec<usize>,
    /// Alliance position per seat index
    #[serde(skip)]
    owner: Vec<Option<usize>>,
    order_fingerprint: String,
}

const UNALLOCATED: &str = "unallocated";

impl SeatRegistry {
    /// Resolve and validate seat blocks against a seat order.
    ///
    /// Fails when blocks overlap, reference unknown spokes or out-of-range
    /// seats, leave seats uncovered, or when `expected_order` does not match
    /// the layout's fingerprint.
    pub fn build(
        alliances: &[AllianceConfig],
        unallocated: &[BlockSegment],
        order: &SeatOrder,
        expected_order: Option<&str>,
    ) -> Result<Self, RegistryError> {
        let fingerprint = order.fingerprint();
        if let Some(expected) = expected_order {
            if expected != fingerprint {
                return Err(RegistryError::OrderMismatch {
                    expected: expected.to_string(),
                    actual: fingerprint,
                });
            }
        }

        let total = order.total();
        let mut owner: Vec<Option<usize>> = vec![None; total];
        let mut spare: Vec<bool> = vec![false; total];
        let mut ids = HashSet::new();
        let mut resolved = Vec::with_capacity(alliances.len());

        for (position, cfg) in alliances.iter().enumerate() {
            if !ids.insert(cfg.id.as_str()) {
                return Err(RegistryError::DuplicateAlliance(cfg.id.clone()));
            }

            let mut seats = Vec::new();
            for segment in &cfg.block {
                seats.extend(segment.resolve(&cfg.id, order)?);
            }
            for &seat in &seats {
                let slot = owner.get_mut(seat).ok_or_else(|| RegistryError::SeatOutOfRange {
                    owner: cfg.id.clone(),
                    seat,
                    total,
                })?;
                if let Some(previous) = *slot {
                    return Err(RegistryError::DuplicateSeat {
                        seat,
                        first: alliances[previous].id.clone(),
                        second: cfg.id.clone(),
                    });
                }
                *slot = Some(position);
            }

            debug!("Alliance {} holds {} seats", cfg.id, seats.len());
            resolved.push(Alliance {
                id: cfg.id.clone(),
                name: cfg.name.clone(),
                color: cfg.color,
                seats,
            });
        }

        let mut spare_seats = Vec::new();
        for segment in unallocated {
            spare_seats.extend(segment.resolve(UNALLOCATED, order)?);
        }
        for &seat in &spare_seats {
            if seat >= total {
                return Err(RegistryError::SeatOutOfRange {
                    owner: UNALLOCATED.to_string(),
                    seat,
                    total,
                });
            }
            if let Some(previous) = owner[seat] {
                return Err(RegistryError::DuplicateSeat {
                    seat,
                    first: alliances[previous].id.clone(),
                    second: UNALLOCATED.to_string(),
                });
            }
            if spare[seat] {
                return Err(RegistryError::DuplicateSeat {
                    seat,
                    first: UNALLOCATED.to_string(),
                    second: UNALLOCATED.to_string(),
                });
            }
            spare[seat] = true;
        }

        let missing: Vec<usize> = (0..total)
            .filter(|&seat| owner[seat].is_none() && !spare[seat])
            .collect();
        if let Some(&first_missing) = missing.first() {
            return Err(RegistryError::IncompleteCoverage {
                missing: missing.len(),
                first_missing,
            });
        }

        Ok(Self {
            alliances: resolved,
            unallocated: spare_seats,
            owner,
            order_fingerprint: fingerprint,
        })
    }

    /// Alliances in resolution order
    pub fn alliances(&self) -> &[Alliance] {
        &self.alliances
    }

    pub fn alliance(&self, id: &str) -> Option<&Alliance> {
        self.alliances.iter().find(|a| a.id == id)
    }

    /// Seat block of an alliance, empty for unknown ids
    pub fn block(&self, id: &str) -> &[usize] {
        self.alliance(id).map(|a| a.seats.as_slice()).unwrap_or(&[])
    }

    pub fn owner_of(&self, seat: usize) -> Option<&Alliance> {
        self.owner.get(seat).copied().flatten().map(|i| &self.alliances[i])
    }

    pub fn unallocated(&self) -> &[usize] {
        &self.unallocated
    }

    pub fn total_seats(&self) -> usize {
        self.owner.len()
    }

    pub fn order_fingerprint(&self) -> &str {
        &self.order_fingerprint
    }
}

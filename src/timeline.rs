//! Election Timeline - ordered result snapshots
//!
//! Loaded from a JSON array:
//! `[{ "time": "09:00", "alliances": [{ "id": "NDA", "wins": 0, "leads": 12 }] }]`
//! The last snapshot is the LIVE one.

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TimelineError {
    #[error("timeline has no snapshots")]
    Empty,
    #[error("snapshot {index}: invalid time '{time}', expected HH:MM")]
    InvalidTime { index: usize, time: String },
    #[error("failed to read timeline: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse timeline: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Win/lead counts of one alliance at one point in time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllianceCount {
    pub id: String,
    #[serde(default)]
    pub wins: usize,
    #[serde(default)]
    pub leads: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Wall-clock time, `HH:MM` 24h
    pub time: String,
    #[serde(default)]
    pub alliances: Vec<AllianceCount>,
}

impl Snapshot {
    pub fn new(time: &str, counts: &[(&str, usize, usize)]) -> Self {
        Self {
            time: time.to_string(),
            alliances: counts
                .iter()
                .map(|&(id, wins, leads)| AllianceCount {
                    id: id.to_string(),
                    wins,
                    leads,
                })
                .collect(),
        }
    }

    /// Counts for an alliance; zero when absent. A repeated id takes its last entry.
    pub fn counts_for(&self, id: &str) -> (usize, usize) {
        self.alliances
            .iter()
            .rev()
            .find(|a| a.id == id)
            .map(|a| (a.wins, a.leads))
            .unwrap_or((0, 0))
    }

    pub fn parsed_time(&self) -> Option<NaiveTime> {
        NaiveTime::parse_from_str(&self.time, "%H:%M").ok()
    }

    /// `"9 AM"` style label, only for whole hours
    pub fn hour_label(&self) -> Option<String> {
        let time = self.parsed_time()?;
        if time.minute() != 0 {
            return None;
        }
        let (pm, hour12) = time.hour12();
        Some(format!("{} {}", hour12, if pm { "PM" } else { "AM" }))
    }
}

/// Hour label positioned at a snapshot index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HourLabel {
    pub index: usize,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Timeline {
    snapshots: Vec<Snapshot>,
}

impl Timeline {
    pub fn new(snapshots: Vec<Snapshot>) -> Result<Self, TimelineError> {
        if snapshots.is_empty() {
            return Err(TimelineError::Empty);
        }
        for (index, snap) in snapshots.iter().enumerate() {
            if snap.parsed_time().is_none() {
                return Err(TimelineError::InvalidTime {
                    index,
                    time: snap.time.clone(),
                });
            }
        }
        Ok(Self { snapshots })
    }

    pub fn from_json(json: &str) -> Result<Self, TimelineError> {
        let snapshots: Vec<Snapshot> = serde_json::from_str(json)?;
        Self::new(snapshots)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, TimelineError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn snapshots(&self) -> &[Snapshot] {
        &self.snapshots
    }

    pub fn get(&self, index: usize) -> Option<&Snapshot> {
        self.snapshots.get(index)
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Index of the LIVE (latest) snapshot
    pub fn live_index(&self) -> usize {
        self.snapshots.len() - 1
    }

    /// Whole-hour labels thinned to fit `capacity` slots, one slot reserved
    /// for the LIVE marker. The last hour is always kept.
    pub fn hour_labels(&self, capacity: usize) -> Vec<HourLabel> {
        let hours: Vec<HourLabel> = self
            .snapshots
            .iter()
            .enumerate()
            .filter_map(|(index, snap)| snap.hour_label().map(|label| HourLabel { index, label }))
            .collect();

        let capacity = capacity.max(2);
        if hours.len() < capacity {
            return hours;
        }

        let target = capacity - 1;
        let step = hours.len().div_ceil(target);
        let mut reduced: Vec<HourLabel> = hours.iter().step_by(step).cloned().collect();
        if let Some(last) = hours.last() {
            if reduced.last().map(|h| h.index) != Some(last.index) {
                reduced.push(last.clone());
            }
        }
        reduced
    }
}

//! Viewer State - Single Source of Truth (SSOT)
//!
//! Holds the shared assembly, the loaded timeline and the seat colors for the
//! selected snapshot. Colors are recomputed whenever the index changes.

use std::sync::Arc;

use crate::assembly::Assembly;
use crate::seat_colors::SeatColors;
use crate::timeline::{Snapshot, Timeline};

/// Per-alliance tally shown in the results legend
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct LegendEntry {
    pub id: String,
    pub name: String,
    pub color: crate::color::Rgb,
    pub wins: usize,
    pub leads: usize,
}

#[derive(Debug, Clone)]
pub struct ViewerState {
    pub assembly: Arc<Assembly>,
    timeline: Timeline,
    index: usize,
    colors: SeatColors,
    focused_seat: Option<usize>,
}

impl ViewerState {
    /// Start at the LIVE snapshot
    pub fn new(assembly: Arc<Assembly>, timeline: Timeline) -> Self {
        let index = timeline.live_index();
        let colors = Self::colors_at(&assembly, &timeline, index);
        Self {
            assembly,
            timeline,
            index,
            colors,
            focused_seat: None,
        }
    }

    fn colors_at(assembly: &Assembly, timeline: &Timeline, index: usize) -> SeatColors {
        let empty = Snapshot::new("00:00", &[]);
        assembly.colors_for(timeline.get(index).unwrap_or(&empty))
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn snapshot(&self) -> Option<&Snapshot> {
        self.timeline.get(self.index)
    }

    pub fn colors(&self) -> &SeatColors {
        &self.colors
    }

    pub fn is_live(&self) -> bool {
        self.index == self.timeline.live_index()
    }

    /// Select a snapshot; out-of-range indices clamp to LIVE.
    /// Returns true when the selection changed.
    pub fn set_index(&mut self, index: usize) -> bool {
        let index = index.min(self.timeline.live_index());
        if index == self.index {
            return false;
        }
        self.index = index;
        self.colors = Self::colors_at(&self.assembly, &self.timeline, index);
        tracing::debug!(
            "Timeline index {} ({} declared seats)",
            index,
            self.colors.declared_count()
        );
        true
    }

    pub fn go_live(&mut self) -> bool {
        self.set_index(self.timeline.live_index())
    }

    pub fn focused_seat(&self) -> Option<usize> {
        self.focused_seat
    }

    pub fn focus_seat(&mut self, seat: Option<usize>) {
        self.focused_seat = seat.filter(|&s| s < self.assembly.total_seats());
    }

    /// Wins/leads per alliance as painted for the current snapshot
    pub fn legend(&self) -> Vec<LegendEntry> {
        self.assembly
            .registry()
            .alliances()
            .iter()
            .enumerate()
            .map(|(position, alliance)| {
                let (wins, leads) = self.colors.painted(position);
                LegendEntry {
                    id: alliance.id.clone(),
                    name: alliance.name.clone(),
                    color: alliance.color,
                    wins,
                    leads,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seat_colors::SeatStatus;

    fn state() -> ViewerState {
        let timeline = Timeline::new(vec![
            Snapshot::new("09:00", &[]),
            Snapshot::new("10:00", &[("NDA", 3, 2)]),
            Snapshot::new("14:00", &[("INDIA", 60, 10), ("NDA", 55, 8)]),
        ])
        .unwrap();
        ViewerState::new(Assembly::shared().unwrap(), timeline)
    }

    #[test]
    fn test_starts_live() {
        let state = state();
        assert_eq!(state.index(), 2);
        assert!(state.is_live());
        assert_eq!(state.colors().declared_count(), 133);
    }

    #[test]
    fn test_set_index_recomputes_colors() {
        let mut state = state();
        assert!(state.set_index(1));
        assert!(!state.is_live());
        assert_eq!(state.colors().declared_count(), 5);
        assert_eq!(state.colors().status[100], SeatStatus::Won(0));

        assert!(!state.set_index(1));
        assert!(state.set_index(0));
        assert_eq!(state.colors().declared_count(), 0);

        // Past the end clamps to LIVE
        assert!(state.set_index(99));
        assert!(state.is_live());
        assert!(!state.go_live());
    }

    #[test]
    fn test_legend() {
        let state = state();
        let legend = state.legend();
        let ids: Vec<&str> = legend.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["NDA", "INDIA", "OTHERS"]);
        assert_eq!((legend[0].wins, legend[0].leads), (55, 8));
        assert_eq!((legend[1].wins, legend[1].leads), (60, 10));
        assert_eq!((legend[2].wins, legend[2].leads), (0, 0));
    }

    #[test]
    fn test_focus_seat_bounds() {
        let mut state = state();
        state.focus_seat(Some(17));
        assert_eq!(state.focused_seat(), Some(17));
        state.focus_seat(Some(243));
        assert_eq!(state.focused_seat(), None);
    }
}

//! Assembly Layout
//!
//! Seat layout and arc-packing engine for a 243-seat legislative assembly,
//! with per-snapshot seat coloring from election results.

pub mod assembly;
pub mod bounds;
pub mod camera;
pub mod color;
pub mod config;
pub mod gui;
pub mod layout;
pub mod logging;
pub mod registry;
pub mod render;
pub mod seat_colors;
pub mod state;
pub mod timeline;

pub use assembly::{Assembly, AssemblyError};
pub use config::{Config, Environment};
pub use seat_colors::{resolve_colors, Palette, SeatColors, SeatStatus};
pub use timeline::{Snapshot, Timeline};

//! Plan Renderer
//!
//! Draws a top-down PNG of the assembly: one filled disc per seat in its
//! resolved color, framed from the bounding sphere. `render_timeline` writes
//! one frame per snapshot plus an index.json.

use anyhow::{Context, Result};
use image::{Rgba, RgbaImage};
use serde::Serialize;
use std::path::Path;
use tracing::{info, warn};

use crate::assembly::Assembly;
use crate::bounds::BoundingSphere;
use crate::color::Rgb;
use crate::layout::SeatTransform;
use crate::seat_colors::SeatColors;
use crate::timeline::Timeline;

#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    /// Square image edge in pixels
    pub size: u32,
    pub background: Rgb,
    /// Focal point marker
    pub dais: Rgb,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            size: 768,
            background: Rgb::new(0x12, 0x14, 0x1a),
            dais: Rgb::new(0xe0, 0xe0, 0xe0),
        }
    }
}

/// World XZ plane to pixel mapping. +Z points up the image so the dais sits
/// below the benches.
#[derive(Debug, Clone, Copy)]
pub struct PlanProjection {
    center: [f64; 2],
    scale: f64,
    half: f64,
}

impl PlanProjection {
    pub fn new(sphere: &BoundingSphere, size: u32) -> Self {
        let half = size as f64 / 2.0;
        let radius = sphere.radius.max(1e-6) * 1.05;
        Self {
            center: [sphere.center[0], sphere.center[2]],
            scale: half / radius,
            half,
        }
    }

    /// Pixels per world unit
    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn to_pixel(&self, position: [f64; 3]) -> (f64, f64) {
        let x = self.half + (position[0] - self.center[0]) * self.scale;
        let y = self.half - (position[2] - self.center[1]) * self.scale;
        (x, y)
    }
}

/// Entry in index.json
#[derive(Debug, Clone, Serialize)]
pub struct RenderedFrame {
    pub index: usize,
    pub time: String,
    pub file: String,
    pub declared: usize,
    pub live: bool,
}

pub fn render_plan(
    seats: &[SeatTransform],
    sphere: &BoundingSphere,
    colors: &SeatColors,
    chair_width: f64,
    options: &RenderOptions,
) -> RgbaImage {
    let mut img = RgbaImage::from_pixel(options.size, options.size, rgba(options.background));
    let projection = PlanProjection::new(sphere, options.size);
    let seat_radius = (chair_width / 2.0 * projection.scale()).max(1.5);

    fill_disc(
        &mut img,
        projection.to_pixel([0.0, 0.0, 0.0]),
        seat_radius * 1.5,
        rgba(options.dais),
    );

    for seat in seats {
        let Some(color) = colors.colors.get(seat.index) else {
            continue;
        };
        fill_disc(&mut img, projection.to_pixel(seat.position), seat_radius, rgba(*color));
    }
    img
}

/// Render every snapshot into `output_dir`
pub fn render_timeline(
    assembly: &Assembly,
    timeline: &Timeline,
    output_dir: &Path,
    options: &RenderOptions,
) -> Result<Vec<RenderedFrame>> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("failed to create {}", output_dir.display()))?;

    let seats = assembly.transforms();
    let sphere = assembly.sphere();
    let chair_width = assembly.config().layout.chair_width;
    let mut frames = Vec::with_capacity(timeline.len());

    for (index, snapshot) in timeline.snapshots().iter().enumerate() {
        let colors = assembly.colors_for(snapshot);
        let img = render_plan(&seats, &sphere, &colors, chair_width, options);

        let file = format!("frame_{:03}.png", index);
        let path = output_dir.join(&file);
        img.save(&path)
            .with_context(|| format!("failed to write {}", path.display()))?;

        if !colors.over_allocations.is_empty() {
            warn!("Frame {} ({}) has over-allocated alliances", index, snapshot.time);
        }
        frames.push(RenderedFrame {
            index,
            time: snapshot.time.clone(),
            file,
            declared: colors.declared_count(),
            live: index == timeline.live_index(),
        });
    }

    let index = serde_json::json!({
        "generated": chrono::Local::now().to_rfc3339(),
        "seats": assembly.total_seats(),
        "order": assembly.order().fingerprint(),
        "frames": frames,
    });
    let index_path = output_dir.join("index.json");
    std::fs::write(&index_path, serde_json::to_string_pretty(&index)?)
        .with_context(|| format!("failed to write {}", index_path.display()))?;
    info!("Wrote {} frames + {}", frames.len(), index_path.display());

    Ok(frames)
}

fn rgba(c: Rgb) -> Rgba<u8> {
    Rgba([c.0[0], c.0[1], c.0[2], 255])
}

fn fill_disc(img: &mut RgbaImage, (cx, cy): (f64, f64), radius: f64, color: Rgba<u8>) {
    let (w, h) = (img.width() as i64, img.height() as i64);
    let x0 = ((cx - radius).floor() as i64).max(0);
    let x1 = ((cx + radius).ceil() as i64).min(w - 1);
    let y0 = ((cy - radius).floor() as i64).max(0);
    let y1 = ((cy + radius).ceil() as i64).min(h - 1);

    for y in y0..=y1 {
        for x in x0..=x1 {
            let dx = x as f64 + 0.5 - cx;
            let dy = y as f64 + 0.5 - cy;
            if dx * dx + dy * dy <= radius * radius {
                img.put_pixel(x as u32, y as u32, color);
            }
        }
    }
}

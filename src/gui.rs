//! Native GUI viewer using egui
//!
//! Orthographic view of the assembly with orbit controls, camera presets,
//! a timeline scrubber and a results legend. Double-click a seat to focus it.

use eframe::egui;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

use crate::assembly::Assembly;
use crate::camera::{nearest_seat, CameraPose, OrbitLimits, Preset};
use crate::color::Rgb;
use crate::seat_colors::SeatStatus;
use crate::state::ViewerState;
use crate::timeline::Timeline;

/// Vertical field of view used to frame presets (degrees)
const FOV_Y_DEG: f64 = 50.0;
/// Approximate width of one hour label on the scrubber (points)
const HOUR_LABEL_WIDTH: f32 = 56.0;
/// Double-clicks farther than this from any seat (world units) are ignored
const PICK_RADIUS: f64 = 1.5;

/// Run the native GUI viewer
pub fn run_viewer(assembly: Arc<Assembly>, timeline: Timeline) -> anyhow::Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 820.0])
            .with_title("Assembly Layout"),
        ..Default::default()
    };

    let state = ViewerState::new(assembly, timeline);
    eframe::run_native(
        "Assembly Layout",
        options,
        Box::new(|cc| Ok(Box::new(AssemblyApp::new(cc, state)))),
    )
    .map_err(|e| anyhow::anyhow!("GUI error: {}", e))
}

/// Screen-space position of a world point for an orthographic camera.
/// Returns the 2D point relative to the pose target and the depth toward
/// the camera.
pub fn project(pose: &CameraPose, p: [f64; 3]) -> ([f64; 2], f64) {
    let (_, polar, azimuth) = pose.spherical();
    let (sp, cp) = polar.sin_cos();
    let (sa, ca) = azimuth.sin_cos();

    let right = [ca, 0.0, -sa];
    let up = [-cp * sa, sp, -cp * ca];
    let toward = [sp * sa, cp, sp * ca];

    let d = [p[0] - pose.target[0], p[1] - pose.target[1], p[2] - pose.target[2]];
    let dot = |v: [f64; 3]| v[0] * d[0] + v[1] * d[1] + v[2] * d[2];
    ([dot(right), dot(up)], dot(toward))
}

/// Half height of the visible area at the pose distance
pub fn view_half_height(pose: &CameraPose) -> f64 {
    pose.distance() * (FOV_Y_DEG / 2.0).to_radians().tan()
}

struct AssemblyApp {
    state: ViewerState,
    pose: CameraPose,
    limits: OrbitLimits,
    show_benches: bool,
    show_grid: bool,
    point_size: f32,
}

impl AssemblyApp {
    fn new(cc: &eframe::CreationContext<'_>, state: ViewerState) -> Self {
        cc.egui_ctx.set_visuals(egui::Visuals::dark());
        let pose = CameraPose::preset(Preset::Gallery, &state.assembly.sphere(), FOV_Y_DEG);

        Self {
            state,
            pose,
            limits: OrbitLimits::default(),
            show_benches: true,
            show_grid: false,
            point_size: 4.0,
        }
    }

    fn apply_preset(&mut self, preset: Preset) {
        self.pose = CameraPose::preset(preset, &self.state.assembly.sphere(), FOV_Y_DEG);
        info!("Camera preset {:?}", preset);
    }

    fn focus(&mut self, seat: usize) {
        if let Some(t) = self.state.assembly.seat(seat) {
            self.pose = CameraPose::seat_focus(t.position);
            self.state.focus_seat(Some(seat));
            debug!("Focused seat {}", seat);
        }
    }

    fn orbit(&mut self, d_azimuth: f64, d_polar: f64, zoom: f64) {
        let (distance, polar, azimuth) = self.pose.spherical();
        let pose = CameraPose::from_spherical(
            self.pose.target,
            distance * zoom,
            polar + d_polar,
            azimuth + d_azimuth,
        );
        self.pose = self.limits.clamp(&pose);
    }

    fn handle_input(&mut self, ctx: &egui::Context) {
        let (mut d_az, mut d_polar, mut zoom) = (0.0, 0.0, 1.0);
        let mut escape = false;
        let mut refocus = false;

        ctx.input(|i| {
            if i.key_down(egui::Key::ArrowLeft) { d_az -= 0.03; }
            if i.key_down(egui::Key::ArrowRight) { d_az += 0.03; }
            if i.key_down(egui::Key::ArrowUp) { d_polar -= 0.03; }
            if i.key_down(egui::Key::ArrowDown) { d_polar += 0.03; }
            if i.key_down(egui::Key::Minus) { zoom *= 1.02; }
            if i.key_down(egui::Key::Plus) { zoom *= 0.98; }
            if i.raw_scroll_delta.y != 0.0 {
                zoom *= (-(i.raw_scroll_delta.y as f64) * 0.002).exp();
            }
            if i.pointer.secondary_down() {
                let delta = i.pointer.delta();
                d_az -= delta.x as f64 * 0.005;
                d_polar -= delta.y as f64 * 0.005;
            }
            escape = i.key_pressed(egui::Key::Escape) || i.key_pressed(egui::Key::Home);
            refocus = i.key_pressed(egui::Key::F);
        });

        if escape {
            self.apply_preset(Preset::Gallery);
            self.state.focus_seat(None);
        } else if refocus {
            if let Some(seat) = self.state.focused_seat() {
                self.focus(seat);
            }
        }
        if d_az != 0.0 || d_polar != 0.0 || zoom != 1.0 {
            self.orbit(d_az, d_polar, zoom);
        }
    }

    fn legend_panel(&mut self, ui: &mut egui::Ui) {
        ui.heading("Results");
        if let Some(snapshot) = self.state.snapshot() {
            let live = if self.state.is_live() { " (LIVE)" } else { "" };
            ui.label(format!("{}{}", snapshot.time, live));
        }
        ui.separator();

        egui::Grid::new("legend").num_columns(4).striped(true).show(ui, |ui| {
            ui.label("");
            ui.label("Alliance");
            ui.label("Won");
            ui.label("Lead");
            ui.end_row();
            for entry in self.state.legend() {
                ui.colored_label(color32(entry.color), "●");
                ui.label(&entry.name);
                ui.label(entry.wins.to_string());
                ui.label(entry.leads.to_string());
                ui.end_row();
            }
        });

        let colors = self.state.colors();
        ui.label(format!(
            "{} / {} seats declared",
            colors.declared_count(),
            self.state.assembly.total_seats()
        ));
        for over in &colors.over_allocations {
            ui.colored_label(
                egui::Color32::LIGHT_RED,
                format!(
                    "{}: {} + {} > {} seats",
                    over.alliance, over.wins, over.leads, over.capacity
                ),
            );
        }
        for id in &colors.unknown_alliances {
            ui.colored_label(egui::Color32::YELLOW, format!("Unknown alliance '{}'", id));
        }

        ui.separator();
        ui.heading("Camera");
        ui.horizontal(|ui| {
            if ui.button("Gallery").clicked() {
                self.apply_preset(Preset::Gallery);
            }
            if ui.button("Top-down").clicked() {
                self.apply_preset(Preset::TopDown);
            }
        });
        ui.checkbox(&mut self.show_benches, "Benches");
        ui.checkbox(&mut self.show_grid, "Grid");
        ui.add(egui::Slider::new(&mut self.point_size, 1.0..=10.0).text("Seat size"));

        ui.separator();
        self.seat_panel(ui);
    }

    fn seat_panel(&mut self, ui: &mut egui::Ui) {
        let Some(seat) = self.state.focused_seat() else {
            ui.label("Double-click a seat to focus");
            return;
        };
        let assembly = Arc::clone(&self.state.assembly);
        let Some(address) = assembly.order().locate(seat) else {
            return;
        };
        let spoke = assembly
            .order()
            .spokes()
            .get(address.spoke)
            .map(|s| s.name.as_str())
            .unwrap_or("?");
        let owner = assembly
            .registry()
            .owner_of(seat)
            .map(|a| a.name.as_str())
            .unwrap_or("Unallocated");
        let status = match self.state.colors().status.get(seat) {
            Some(SeatStatus::Won(_)) => "Won",
            Some(SeatStatus::Leading(_)) => "Leading",
            _ => "Undeclared",
        };

        ui.heading(format!("Seat {}", seat));
        egui::Grid::new("seat_info").num_columns(2).show(ui, |ui| {
            ui.label("Spoke");
            ui.label(spoke);
            ui.end_row();
            ui.label("Row");
            ui.label((address.row + 1).to_string());
            ui.end_row();
            ui.label("Position");
            ui.label((address.seat + 1).to_string());
            ui.end_row();
            ui.label("Block");
            ui.label(owner);
            ui.end_row();
            ui.label("State");
            ui.label(status);
            ui.end_row();
        });
        if ui.button("Clear focus").clicked() {
            self.state.focus_seat(None);
            self.apply_preset(Preset::Gallery);
        }
    }

    fn timeline_panel(&mut self, ui: &mut egui::Ui) {
        let live = self.state.timeline().live_index();
        let mut index = self.state.index();

        ui.horizontal(|ui| {
            ui.spacing_mut().slider_width = (ui.available_width() - 80.0).max(100.0);
            ui.add(egui::Slider::new(&mut index, 0..=live).show_value(false));
            let live_button = egui::Button::new("● LIVE").selected(self.state.is_live());
            if ui.add(live_button).clicked() {
                index = live;
            }
        });

        let capacity = (ui.available_width() / HOUR_LABEL_WIDTH) as usize;
        ui.horizontal(|ui| {
            for hour in self.state.timeline().hour_labels(capacity) {
                if ui.small_button(&hour.label).clicked() {
                    index = hour.index;
                }
            }
        });

        if index != self.state.index() {
            self.state.set_index(index);
        }
    }

    fn plot(&mut self, ui: &mut egui::Ui) {
        let assembly = Arc::clone(&self.state.assembly);
        let seats = assembly.transforms();
        let pose = self.pose;

        let mut by_color: HashMap<Rgb, Vec<[f64; 2]>> = HashMap::new();
        let mut projected = Vec::with_capacity(seats.len());
        for (seat, color) in seats.iter().zip(&self.state.colors().colors) {
            let (p, _) = project(&pose, seat.position);
            projected.push(p);
            by_color.entry(*color).or_default().push(p);
        }

        let half_h = view_half_height(&pose);
        let plot = egui_plot::Plot::new("assembly_plot")
            .allow_drag(false)
            .allow_zoom(false)
            .allow_scroll(false)
            .allow_double_click_reset(false)
            .show_axes(self.show_grid)
            .show_grid(self.show_grid);

        let mut picked = None;
        plot.show(ui, |plot_ui| {
            let rect = plot_ui.response().rect;
            let aspect = (rect.width() / rect.height().max(1.0)) as f64;
            plot_ui.set_plot_bounds(egui_plot::PlotBounds::from_min_max(
                [-half_h * aspect, -half_h],
                [half_h * aspect, half_h],
            ));

            if self.show_benches {
                for arc in assembly.bench_arcs() {
                    let points: Vec<[f64; 2]> =
                        arc.points.iter().map(|&p| project(&pose, p).0).collect();
                    plot_ui.line(
                        egui_plot::Line::new(egui_plot::PlotPoints::from(points))
                            .color(egui::Color32::from_gray(70))
                            .width(2.0),
                    );
                }
            }

            for (color, points) in by_color {
                plot_ui.points(
                    egui_plot::Points::new(egui_plot::PlotPoints::from(points))
                        .color(color32(color))
                        .radius(self.point_size)
                        .shape(egui_plot::MarkerShape::Circle)
                        .filled(true),
                );
            }

            if let Some(seat) = self.state.focused_seat().and_then(|s| projected.get(s)) {
                plot_ui.points(
                    egui_plot::Points::new(vec![*seat])
                        .color(egui::Color32::WHITE)
                        .radius(self.point_size * 1.8)
                        .shape(egui_plot::MarkerShape::Circle)
                        .filled(false),
                );
            }

            if plot_ui.response().double_clicked() {
                if let Some(cursor) = plot_ui.pointer_coordinate() {
                    let cursor = [cursor.x, cursor.y];
                    picked = nearest_seat(&projected, cursor).filter(|&i| {
                        let (dx, dy) = (projected[i][0] - cursor[0], projected[i][1] - cursor[1]);
                        (dx * dx + dy * dy).sqrt() <= PICK_RADIUS
                    });
                }
            }
        });

        if let Some(seat) = picked {
            self.focus(seat);
        }
    }
}

impl eframe::App for AssemblyApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_input(ctx);

        egui::SidePanel::right("legend_panel").min_width(240.0).show(ctx, |ui| {
            self.legend_panel(ui);
        });

        egui::TopBottomPanel::bottom("timeline_panel").show(ctx, |ui| {
            self.timeline_panel(ui);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(format!("{} seats | ", self.state.assembly.total_seats()));
                ui.label(
                    "Right-drag: orbit | Scroll: zoom | Double-click: focus seat | Esc: reset | F: refocus",
                );
            });
            self.plot(ui);
        });
    }
}

fn color32(c: Rgb) -> egui::Color32 {
    egui::Color32::from_rgb(c.0[0], c.0[1], c.0[2])
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_project_top_down() {
        let pose = CameraPose::from_spherical([0.0, 0.0, 0.0], 50.0, 0.0, 0.0);
        let (p, depth) = project(&pose, [3.0, 0.0, 0.0]);
        assert_abs_diff_eq!(p[0], 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(p[1], 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(depth, 0.0, epsilon = 1e-12);

        // Looking down from +Z side, farther benches appear higher
        let (p, _) = project(&pose, [0.0, 0.0, -4.0]);
        assert_abs_diff_eq!(p[1], 4.0, epsilon = 1e-12);
    }

    #[test]
    fn test_project_target_is_origin() {
        let pose = CameraPose::from_spherical([1.0, 2.0, 3.0], 20.0, 0.9, 0.4);
        let (p, depth) = project(&pose, pose.target);
        assert_eq!(p, [0.0, 0.0]);
        assert_eq!(depth, 0.0);

        // The camera position itself is straight ahead at full distance
        let (p, depth) = project(&pose, pose.position);
        assert_abs_diff_eq!(p[0], 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(p[1], 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(depth, 20.0, epsilon = 1e-9);
    }

    #[test]
    fn test_view_half_height_scales_with_distance() {
        let near = CameraPose::from_spherical([0.0; 3], 6.0, 0.8, 0.0);
        let far = CameraPose::from_spherical([0.0; 3], 60.0, 0.8, 0.0);
        assert_abs_diff_eq!(view_half_height(&far), 10.0 * view_half_height(&near), epsilon = 1e-9);
    }
}

//! Assembly Layout - CLI
//!
//! CLI commands:
//! - layout: Emit seat transforms as JSON
//! - colors: Resolve seat colors for one snapshot
//! - validate: Check registry coverage, solver report and timeline counts
//! - bounds: Bounding sphere and camera presets
//! - render: Plan-view PNG per snapshot
//! - gui: Launch native viewer

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde_json::json;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use assembly_layout::camera::{CameraPose, OrbitLimits, Preset};
use assembly_layout::render::{render_timeline, RenderOptions};
use assembly_layout::{gui, logging, Assembly, Config, Environment, Timeline};

#[derive(Parser)]
#[command(name = "assembly_layout")]
#[command(about = "Seat layout and election result coloring for a 243-seat assembly")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to assembly.yaml config
    #[arg(short, long, default_value = "assembly.yaml", global = true)]
    config: PathBuf,

    /// Election timeline JSON (defaults to ASSEMBLY_TIMELINE)
    #[arg(short, long, global = true)]
    timeline: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Emit seat transforms as JSON
    Layout {
        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Include bench centerline arcs
        #[arg(long)]
        benches: bool,
    },

    /// Resolve seat colors for a snapshot (hex array)
    Colors {
        /// Snapshot index, defaults to LIVE
        #[arg(short, long)]
        snapshot: Option<usize>,
    },

    /// Validate configuration and timeline
    Validate,

    /// Print bounding sphere and camera presets
    Bounds,

    /// Render plan-view PNGs for every snapshot
    Render {
        /// Output directory (defaults to ASSEMBLY_OUTPUT_DIR)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Image size in pixels
        #[arg(long, default_value = "768")]
        size: u32,
    },

    /// Launch native GUI viewer
    Gui,
}

fn main() -> anyhow::Result<()> {
    let env = Environment::load();
    logging::init_logging(&env.log_dir)?;
    tracing::info!("Assembly Layout starting up");

    let cli = Cli::parse();
    tracing::debug!("CLI args parsed: config={:?}", cli.config);

    let config = Config::load_or_default(&cli.config)?;
    let assembly = Arc::new(Assembly::build(&config).context("invalid assembly configuration")?);
    let timeline_path = cli.timeline.clone().unwrap_or_else(|| env.timeline.clone());

    match cli.command {
        Commands::Layout { output, benches } => {
            let data = if benches {
                json!({
                    "order": assembly.order().fingerprint(),
                    "seats": &*assembly.transforms(),
                    "benches": assembly.bench_arcs(),
                })
            } else {
                json!({
                    "order": assembly.order().fingerprint(),
                    "seats": &*assembly.transforms(),
                })
            };
            write_json(&data, output.as_deref())?;
        }

        Commands::Colors { snapshot } => {
            let timeline = load_timeline(&timeline_path)?;
            let index = snapshot.unwrap_or_else(|| timeline.live_index());
            let snap = timeline.get(index).ok_or_else(|| {
                anyhow::anyhow!("Snapshot {} out of range (0..{})", index, timeline.len())
            })?;
            let colors = assembly.colors_for(snap);
            write_json(&json!(colors.hex()), None)?;
        }

        Commands::Validate => {
            validate(&assembly, &timeline_path)?;
        }

        Commands::Bounds => {
            let sphere = assembly.sphere();
            let data = json!({
                "sphere": sphere,
                "gallery": CameraPose::preset(Preset::Gallery, &sphere, 50.0),
                "top_down": CameraPose::preset(Preset::TopDown, &sphere, 50.0),
                "orbit_limits": OrbitLimits::default(),
            });
            write_json(&data, None)?;
        }

        Commands::Render { output, size } => {
            let timeline = load_timeline(&timeline_path)?;
            let output = output.unwrap_or(env.output_dir);
            let options = RenderOptions {
                size,
                ..RenderOptions::default()
            };
            let frames = render_timeline(&assembly, &timeline, &output, &options)?;
            println!("Rendered {} frames to {}", frames.len(), output.display());
        }

        Commands::Gui => {
            let timeline = load_timeline(&timeline_path)?;
            tracing::info!("Launching native GUI viewer");
            gui::run_viewer(assembly, timeline)?;
        }
    }

    Ok(())
}

fn load_timeline(path: &Path) -> anyhow::Result<Timeline> {
    let timeline = Timeline::load(path)
        .with_context(|| format!("failed to load timeline {}", path.display()))?;
    tracing::info!("Timeline loaded: {} snapshots from {:?}", timeline.len(), path);
    Ok(timeline)
}

fn write_json(data: &serde_json::Value, output: Option<&Path>) -> anyhow::Result<()> {
    let text = serde_json::to_string_pretty(data)?;
    match output {
        Some(path) => {
            std::fs::write(path, text)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("Wrote {}", path.display());
        }
        None => println!("{}", text),
    }
    Ok(())
}

/// Print registry coverage, solver residuals and per-snapshot counts
fn validate(assembly: &Assembly, timeline_path: &Path) -> anyhow::Result<()> {
    let registry = assembly.registry();
    println!("Seat order: {}", assembly.order().fingerprint());
    println!("Seats: {}", assembly.total_seats());
    println!();

    println!("## Blocks");
    for alliance in registry.alliances() {
        println!("  {} ({}): {} seats", alliance.name, alliance.id, alliance.seats.len());
    }
    println!("  Unallocated: {} seats", registry.unallocated().len());
    println!();

    let report = &assembly.solution().report;
    let tolerance = assembly.config().layout.deficit_tolerance;
    println!("## Walkways");
    println!(
        "  converged: {}, max residual {:.6} rad, max seat-edge residual {:.6} rad",
        report.converged,
        report.max_deficit(),
        report.max_seat_deficit()
    );
    for residual in report.unsatisfied(tolerance) {
        println!(
            "  [WARN] row {} pair {}-{}: deficit {:.6} rad{}",
            residual.row,
            residual.a,
            residual.b,
            residual.deficit,
            if residual.slack_exhausted { " (slack exhausted)" } else { "" }
        );
    }
    for residual in report.seat_unsatisfied(tolerance) {
        println!(
            "  [WARN] row {} pair {}-{}: seat-edge deficit {:.6} rad (gap {:.6}, need {:.6})",
            residual.row,
            residual.a,
            residual.b,
            residual.seat_deficit,
            residual.seat_gap,
            residual.seat_required
        );
    }
    for row in &assembly.solution().rows {
        println!(
            "  row {}: trim passes {}, fan-out passes {}, seat nudges {}",
            row.row, row.trim_passes, row.fanout_passes, row.seat_nudges
        );
    }
    println!();

    if !timeline_path.exists() {
        println!("Timeline {} not found, skipping", timeline_path.display());
        return Ok(());
    }

    let timeline = load_timeline(timeline_path)?;
    println!("## Timeline ({} snapshots)", timeline.len());
    for (index, snapshot) in timeline.snapshots().iter().enumerate() {
        let colors = assembly.colors_for(snapshot);
        let live = if index == timeline.live_index() { " LIVE" } else { "" };
        println!("  [{}] {}{}: {} declared", index, snapshot.time, live, colors.declared_count());
        for over in &colors.over_allocations {
            println!(
                "    [WARN] {}: wins {} + leads {} exceed block of {}",
                over.alliance, over.wins, over.leads, over.capacity
            );
        }
        for id in &colors.unknown_alliances {
            println!("    [WARN] unknown alliance '{}'", id);
        }
    }

    Ok(())
}

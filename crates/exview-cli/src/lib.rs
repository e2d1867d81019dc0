//! # Exview CLI
//!
//! Command-line driver for the exview engines over a built-in demo assembly.
//!
//! ## Commands
//! - `explode` - Explode the demo assembly and print part positions
//! - `modes` - List explosion modes
//! - `format` - Format lengths through one hysteresis formatter
//! - `snap-stats` - Build snap structures and print their sizes

pub mod demo;

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use exview_core::{NodeId, SceneGraph};
use exview_explode::{ExplosionConfig, ExplosionEngine, ExplosionMode};
use exview_measure::{MeasurementConfig, MeasurementEngine, MeasurementFormatter, MeasurementKind, UnitMode};
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Exview assembly engine CLI
#[derive(Parser)]
#[command(name = "exview")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// JSON settings file with `explosion` and `measurement` sections
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Explode the demo assembly
    Explode {
        /// Explosion mode
        #[arg(short, long, default_value = "radial")]
        mode: String,

        /// Explosion progress in [0, 1]
        #[arg(short, long, default_value = "1.0")]
        progress: f32,

        /// Distance multiplier in [0.1, 5]
        #[arg(short = 'k', long, default_value = "1.0")]
        multiplier: f32,

        /// Axis for axial mode as `x,y,z`
        #[arg(short, long, allow_hyphen_values = true)]
        axis: Option<String>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// List explosion modes
    Modes,

    /// Format lengths in meters, in order, through one formatter
    Format {
        /// Lengths in meters
        #[arg(required = true)]
        lengths: Vec<f64>,

        /// Measurement kind
        #[arg(short, long, default_value = "linear")]
        kind: String,

        /// Unit mode: auto, mm or m
        #[arg(short, long, default_value = "auto")]
        unit: String,

        /// Mark readings as approximate
        #[arg(long)]
        approx: bool,
    },

    /// Build snap structures over the demo assembly
    SnapStats,
}

/// Settings file contents
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub explosion: ExplosionConfig,
    pub measurement: MeasurementConfig,
}

impl CliConfig {
    /// Load from a JSON file, or defaults when no path is given
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
        let config = serde_json::from_str(&text).with_context(|| format!("Failed to parse {}", path.display()))?;
        log::debug!("Loaded settings from {}", path.display());
        Ok(config)
    }
}

/// One part of an explode report
#[derive(Debug, Clone, Serialize)]
pub struct PartReport {
    pub name: String,
    pub original: Vec3,
    pub exploded: Vec3,
}

/// Parse `x,y,z`
pub fn parse_axis(text: &str) -> Result<Vec3> {
    let parts = text
        .split(',')
        .map(|s| s.trim().parse::<f32>().with_context(|| format!("Invalid axis component '{}'", s)))
        .collect::<Result<Vec<_>>>()?;
    match parts.as_slice() {
        &[x, y, z] => Ok(Vec3::new(x, y, z)),
        _ => bail!("Axis needs three components, got '{}'", text),
    }
}

/// Execute the CLI command
pub fn execute(cli: Cli) -> Result<()> {
    if cli.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    }

    let config = CliConfig::load(cli.config.as_deref())?;
    let stdout = std::io::stdout();
    run(&cli.command, &config, &mut stdout.lock())
}

/// Run a command, writing results to `out`
pub fn run(command: &Commands, config: &CliConfig, out: &mut dyn Write) -> Result<()> {
    match command {
        Commands::Explode {
            mode,
            progress,
            multiplier,
            axis,
            json,
        } => {
            let mode: ExplosionMode = mode.parse()?;
            let axis = axis.as_deref().map(parse_axis).transpose()?;
            let reports = explode_demo(&config.explosion, mode, *progress, *multiplier, axis)?;

            if *json {
                serde_json::to_writer_pretty(&mut *out, &reports)?;
                writeln!(out)?;
            } else {
                writeln!(out, "{:<10} {:>24} {:>24}", "part", "original", "exploded")?;
                for r in &reports {
                    writeln!(
                        out,
                        "{:<10} {:>7.3} {:>7.3} {:>7.3}  {:>7.3} {:>7.3} {:>7.3}",
                        r.name, r.original.x, r.original.y, r.original.z, r.exploded.x, r.exploded.y, r.exploded.z
                    )?;
                }
            }
        }

        Commands::Modes => {
            for mode in ExplosionMode::ALL {
                writeln!(out, "{:<18} {}", mode.as_str(), mode.label())?;
            }
        }

        Commands::Format {
            lengths,
            kind,
            unit,
            approx,
        } => {
            let kind: MeasurementKind = kind.parse()?;
            let unit: UnitMode = unit.parse()?;
            let mut formatter = MeasurementFormatter::new(unit);
            for &meters in lengths {
                writeln!(out, "{}", formatter.format(meters, kind, *approx))?;
            }
        }

        Commands::SnapStats => {
            let mut scene = SceneGraph::new();
            let root = demo::build(&mut scene)?;
            let mut engine = MeasurementEngine::new(config.measurement.clone());
            engine.build_snap_structures(&scene, root);

            let structures = engine.snap_structures();
            let stats = structures.octree_stats();
            writeln!(out, "meshes:       {}", structures.mesh_count())?;
            writeln!(out, "vertices:     {}", structures.vertex_count())?;
            writeln!(out, "edges:        {}", structures.edge_count())?;
            writeln!(out, "hole edges:   {}", structures.hole_edge_count())?;
            writeln!(out, "octree cells: {} ({} leaves, depth {})", stats.cells, stats.leaves, stats.depth)?;
        }
    }

    Ok(())
}

/// Explode the demo assembly and report every part's world position
/// before and after
pub fn explode_demo(
    config: &ExplosionConfig,
    mode: ExplosionMode,
    progress: f32,
    multiplier: f32,
    axis: Option<Vec3>,
) -> Result<Vec<PartReport>> {
    let mut scene = SceneGraph::new();
    let root = demo::build(&mut scene)?;
    let mut engine = ExplosionEngine::new(&mut scene, root, config.clone());
    log::info!(
        "Exploding {} parts around {:?} (radius {:.3})",
        engine.parts().len(),
        engine.assembly_center(),
        engine.assembly_radius()
    );

    let originals: Vec<(NodeId, String, Vec3)> = engine
        .parts()
        .iter()
        .filter_map(|&id| Some((id, scene.get_node(id)?.name.clone(), engine.original_of(id)?.world_position)))
        .collect();

    if let Some(axis) = axis {
        engine.set_axial_vector(&mut scene, axis);
    }
    engine.set_mode(&mut scene, mode);
    engine.set_multiplier(&mut scene, multiplier);
    engine.set_progress(&mut scene, progress);

    let reports = originals
        .into_iter()
        .filter_map(|(id, name, original)| {
            Some(PartReport {
                exploded: scene.get_node(id)?.world_position(),
                name,
                original,
            })
        })
        .collect();
    Ok(reports)
}

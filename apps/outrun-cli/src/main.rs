use anyhow::Context;
use clap::{Parser, Subcommand};
use glam::Vec2;
use outrun_input::{PickController, PointerEvent};
use outrun_kernel::{DriveConfig, FrameScheduler, StandInAssets, Stage};
use outrun_render::DebugTextRenderer;
use outrun_scene::{Camera, MeshIntersector, Scene};
use outrun_terrain::{GridMeshBuilder, WireOverlayBuilder};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "outrun-cli", about = "CLI tool for outrun operations")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print crate versions
    Info,
    /// Build a terrain grid and print its size
    Mesh {
        #[arg(long, default_value = "8")]
        width: u32,
        #[arg(long, default_value = "10")]
        height: u32,
        /// Also build the wire overlay
        #[arg(long)]
        wire: bool,
    },
    /// Run the frame loop headless with stand-in assets
    Simulate {
        /// Number of frames to run
        #[arg(short, long, default_value = "120")]
        frames: u64,
        /// Simulated display refresh rate
        #[arg(long, default_value = "60")]
        fps: f64,
        /// Scene configuration (YAML)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Print the final frame's scene dump
        #[arg(long)]
        dump: bool,
    },
    /// Click at an NDC position on the freshly built scene
    Pick {
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        x: f32,
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        y: f32,
    },
    /// Print the default configuration as YAML
    Config,
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<DriveConfig> {
    match path {
        Some(path) => DriveConfig::load(path).with_context(|| format!("load config {}", path.display())),
        None => Ok(DriveConfig::default()),
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            println!("outrun-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("common: {}", outrun_common::crate_info());
            println!("terrain: {}", outrun_terrain::crate_info());
            println!("scene: {}", outrun_scene::crate_info());
            println!("render: {}", outrun_render::crate_info());
            println!("kernel: {}", outrun_kernel::crate_info());
            println!("input: {}", outrun_input::crate_info());
        }
        Commands::Mesh {
            width,
            height,
            wire,
        } => {
            let grid = GridMeshBuilder::new(width, height)?.build();
            println!(
                "Grid {width}x{height}: vertices={}, triangles={}, indices={}",
                grid.vertex_count(),
                grid.triangle_count(),
                grid.index_count()
            );
            if wire {
                let overlay = WireOverlayBuilder::build(&grid);
                println!("Wire: segments={}", overlay.segment_count());
            }
        }
        Commands::Simulate {
            frames,
            fps,
            config,
            dump,
        } => {
            anyhow::ensure!(fps > 0.0, "fps must be positive");
            let config = load_config(config.as_ref())?;
            let mut scene = Scene::new();
            let handles = Stage::new(&config).build(&mut scene)?;
            let mut assets = StandInAssets::new(config.stand_in_delay);
            let mut scheduler = FrameScheduler::new(config, handles)?;
            let mut renderer = DebugTextRenderer::new();

            let step_ms = 1000.0 / fps;
            for frame in 0..frames {
                if !assets.is_drained() {
                    let attached = scheduler.poll_assets(&mut assets, &mut scene);
                    if attached > 0 {
                        tracing::info!(frame, attached, "assets attached");
                    }
                }
                scheduler.tick(frame as f64 * step_ms, &mut scene, &mut renderer);
            }
            scheduler.stop();
            tracing::debug!(frames = scheduler.frame_count(), "simulation finished");

            let uniforms = scheduler.uniforms();
            println!(
                "Ran {} frames: time={:.3}s travel={:.1} nodes={}",
                scheduler.frame_count(),
                uniforms.time,
                uniforms.travel(),
                scene.len()
            );
            println!(
                "Frame time: avg={:.2}ms min={:.2}ms max={:.2}ms",
                scheduler.timer().average() * 1000.0,
                scheduler.timer().min() * 1000.0,
                scheduler.timer().max() * 1000.0
            );
            if let Some(pool) = scheduler.handles().props.get() {
                println!("Props: {} instances", pool.len());
            }
            if dump {
                print!("{}", renderer.last_output());
            }
        }
        Commands::Pick { x, y } => {
            let config = DriveConfig::default();
            let mut scene = Scene::new();
            Stage::new(&config).build(&mut scene)?;
            let mut picker = PickController::default();
            picker.on_event(PointerEvent::Move(Vec2::new(x, y)));
            picker.on_event(PointerEvent::Down);
            let outcome =
                picker.handle(PointerEvent::Up, &Camera::default(), &mut scene, &MeshIntersector);
            println!("Pick at ({x:.2}, {y:.2}): {outcome:?}");
            if let Some(node) = picker.highlighted().and_then(|id| scene.get(id)) {
                println!("Highlighted: {}", node.name);
            }
        }
        Commands::Config => {
            print!("{}", DriveConfig::default().to_yaml()?);
        }
    }

    Ok(())
}

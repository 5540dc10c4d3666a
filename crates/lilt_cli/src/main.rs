//! Lilt CLI
//!
//! Check and preview animation scenes without a renderer.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod preview;
mod scene;

use preview::{LoadedScene, PreviewOptions};
use scene::Scene;

#[derive(Parser)]
#[command(name = "lilt")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Lilt tweening engine CLI", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a scene headlessly and print node properties per frame
    Preview {
        /// Scene file
        scene: PathBuf,

        /// Frames per second
        #[arg(long, default_value = "60")]
        fps: u32,

        /// Maximum simulated time in seconds
        #[arg(long, default_value = "3.0")]
        seconds: f32,

        /// Print every Nth frame
        #[arg(long, default_value = "1")]
        every: u32,

        /// Seed for randomized effects
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Check a scene for errors without running it
    Check {
        /// Scene file
        scene: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();

    match cli.command {
        Commands::Preview {
            scene,
            fps,
            seconds,
            every,
            seed,
        } => cmd_preview(
            &scene,
            &PreviewOptions {
                fps,
                seconds,
                every,
                seed,
            },
        ),

        Commands::Check { scene } => cmd_check(&scene),
    }
}

fn cmd_preview(path: &Path, options: &PreviewOptions) -> Result<()> {
    let scene = Scene::load(path)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let summary = preview::run(&scene, options, &mut out)?;
    out.flush()?;

    if summary.settled {
        info!(
            "All animations finished after {} frames ({:.3}s)",
            summary.frames, summary.elapsed
        );
    } else {
        warn!(
            "Stopped at {:.3}s with animations still running",
            summary.elapsed
        );
    }

    Ok(())
}

fn cmd_check(path: &Path) -> Result<()> {
    let scene = Scene::load(path)?;
    let loaded = LoadedScene::build(&scene, Some(0))?;

    for (name, &id) in &loaded.animations {
        if let Some(animation) = loaded.scheduler.get(id) {
            info!(
                "{}: {} over {:.3}s (delay {:.3}s)",
                name,
                animation.kind().name(),
                animation.duration(),
                animation.delay()
            );
        }
    }

    let autoplay = loaded.scheduler.active_count();
    info!(
        "{} OK: {} nodes, {} animations, {} playing on start",
        path.display(),
        loaded.nodes.len(),
        loaded.animations.len(),
        autoplay
    );

    Ok(())
}

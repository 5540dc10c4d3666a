//! Headless preview runner
//!
//! Drives the scheduler at a fixed frame rate and prints the animated
//! properties of every node, standing in for a host render loop.

use anyhow::{Context, Result};
use indexmap::IndexMap;
use lilt_animation::{AnimationId, AnimationScheduler};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::io::Write;
use tracing::{debug, info};

use crate::scene::{Scene, SceneNode, SceneNodes};

/// Preview settings
#[derive(Clone, Debug)]
pub struct PreviewOptions {
    pub fps: u32,
    /// Upper bound on simulated time
    pub seconds: f32,
    /// Print every Nth frame
    pub every: u32,
    /// Seed for randomized effect directions; random when unset
    pub seed: Option<u64>,
}

impl Default for PreviewOptions {
    fn default() -> Self {
        Self {
            fps: 60,
            seconds: 3.0,
            every: 1,
            seed: None,
        }
    }
}

/// A scene with its host objects and animations built
pub struct LoadedScene {
    pub scheduler: AnimationScheduler,
    pub nodes: SceneNodes,
    pub animations: IndexMap<String, AnimationId>,
}

impl LoadedScene {
    pub fn build(scene: &Scene, seed: Option<u64>) -> Result<Self> {
        let metrics = scene.viewport.metrics()?;
        let mut scheduler = AnimationScheduler::with_metrics(metrics)?;
        let nodes = scene.build_nodes()?;

        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        let animations = scene
            .sheet()
            .instantiate(&mut scheduler, &nodes, &mut rng)
            .context("Failed to build animations")?;

        debug!(
            "Built {} animations over {} nodes",
            animations.len(),
            nodes.len()
        );

        Ok(Self {
            scheduler,
            nodes,
            animations,
        })
    }
}

/// Outcome of a preview run
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PreviewSummary {
    pub frames: u32,
    pub elapsed: f32,
    /// Whether every animation had finished before the time limit
    pub settled: bool,
}

pub fn run(scene: &Scene, options: &PreviewOptions, out: &mut impl Write) -> Result<PreviewSummary> {
    if options.fps == 0 {
        anyhow::bail!("Frame rate must be positive");
    }

    let mut loaded = LoadedScene::build(scene, options.seed)?;
    let dt = 1.0 / options.fps as f32;
    let max_frames = (options.seconds * options.fps as f32).ceil() as u32;
    let every = options.every.max(1);

    info!(
        "Previewing {} animations at {} fps for up to {}s",
        loaded.animations.len(),
        options.fps,
        options.seconds
    );

    write_frame(out, 0, 0.0, &loaded.nodes)?;

    let mut frames = 0;
    while frames < max_frames && loaded.scheduler.has_active_animations() {
        loaded.scheduler.tick(dt);
        frames += 1;

        let settled = !loaded.scheduler.has_active_animations();
        if frames % every == 0 || settled {
            write_frame(out, frames, frames as f32 * dt, &loaded.nodes)?;
        }
    }

    Ok(PreviewSummary {
        frames,
        elapsed: frames as f32 * dt,
        settled: !loaded.scheduler.has_active_animations(),
    })
}

fn write_frame(out: &mut impl Write, frame: u32, time: f32, nodes: &SceneNodes) -> Result<()> {
    writeln!(out, "frame {frame} t={time:.3}")?;
    for (name, node) in nodes.iter() {
        writeln!(out, "  {name}: {}", describe(node))?;
    }
    Ok(())
}

fn describe(node: &SceneNode) -> String {
    let rect = node.rect.borrow();
    let color = node.graphic.borrow().color;
    format!(
        "pos=({:.2}, {:.2}) scale=({:.3}, {:.3}, {:.3}) rot={:.2} color=({:.3}, {:.3}, {:.3}, {:.3}){}",
        rect.anchored_position.x,
        rect.anchored_position.y,
        rect.scale.x,
        rect.scale.y,
        rect.scale.z,
        rect.rotation.z_angle_degrees(),
        color.r,
        color.g,
        color.b,
        color.a,
        if rect.active { "" } else { " hidden" }
    )
}

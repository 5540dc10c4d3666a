//! Scene file handling
//!
//! A scene bundles a viewport, a set of named host nodes and the animations
//! that drive them:
//!
//! ```toml
//! [viewport]
//! width = 1920
//! height = 1080
//!
//! [[node]]
//! name = "logo"
//! position = [0.0, 0.0]
//!
//! [[animation]]
//! name = "intro"
//! node = "logo"
//! kind = "move"
//! end = [0.5, 0.5, 0.0]
//! play_on_start = true
//! ```

use anyhow::{Context, Result};
use indexmap::IndexMap;
use lilt_animation::{AnimationDescriptor, AnimationSheet, TargetResolver};
use lilt_core::{
    Color, GraphicNode, Quat, RectNode, ScreenMetrics, SharedGraphic, SharedTransform, Vec2, Vec3,
};
use serde::Deserialize;
use std::cell::RefCell;
use std::fs;
use std::path::Path;
use std::rc::Rc;

/// Top-level scene (scene.toml)
#[derive(Debug, Deserialize)]
pub struct Scene {
    pub viewport: ViewportConfig,
    #[serde(default, rename = "node")]
    pub nodes: Vec<NodeConfig>,
    #[serde(default, rename = "animation")]
    pub animations: Vec<AnimationDescriptor>,
}

/// Viewport the scene is previewed in
#[derive(Debug, Deserialize)]
pub struct ViewportConfig {
    pub width: f32,
    pub height: f32,
    #[serde(default = "default_scale_factor")]
    pub scale_factor: f32,
    #[serde(default)]
    pub scale_with_screen: bool,
}

fn default_scale_factor() -> f32 {
    1.0
}

impl ViewportConfig {
    pub fn metrics(&self) -> Result<ScreenMetrics> {
        ScreenMetrics::scaled(
            self.width,
            self.height,
            self.scale_factor,
            self.scale_with_screen,
        )
        .context("Invalid [viewport]")
    }
}

/// A host object the animations can target
#[derive(Debug, Deserialize)]
pub struct NodeConfig {
    pub name: String,
    /// Anchored position, in local units
    #[serde(default)]
    pub position: [f32; 2],
    /// Screen pixel location of anchored position zero
    #[serde(default)]
    pub anchor_origin: [f32; 2],
    #[serde(default = "default_scale")]
    pub scale: [f32; 3],
    /// Z rotation in degrees
    #[serde(default)]
    pub rotation_z: f32,
    #[serde(default = "default_color")]
    pub color: [f32; 4],
}

fn default_scale() -> [f32; 3] {
    [1.0, 1.0, 1.0]
}

fn default_color() -> [f32; 4] {
    [1.0, 1.0, 1.0, 1.0]
}

impl Scene {
    /// Load a scene from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            anyhow::bail!("No scene file found at {}", path.display());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        Self::parse(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        let scene: Scene = toml::from_str(content)?;
        Ok(scene)
    }

    pub fn sheet(&self) -> AnimationSheet {
        AnimationSheet {
            animations: self.animations.clone(),
        }
    }

    /// Create the in-memory host objects for every `[[node]]`
    pub fn build_nodes(&self) -> Result<SceneNodes> {
        let mut nodes = SceneNodes::default();
        for config in &self.nodes {
            let [x, y] = config.position;
            let [ox, oy] = config.anchor_origin;
            let [sx, sy, sz] = config.scale;
            let [r, g, b, a] = config.color;

            let rect = RectNode::new()
                .at(Vec2::new(x, y))
                .with_anchor_origin(Vec2::new(ox, oy))
                .with_scale(Vec3::new(sx, sy, sz))
                .with_rotation(Quat::from_rotation_z(config.rotation_z))
                .shared();
            let graphic = GraphicNode::new(Color::rgba(r, g, b, a)).shared();

            if nodes
                .nodes
                .insert(config.name.clone(), SceneNode { rect, graphic })
                .is_some()
            {
                anyhow::bail!("Duplicate node '{}'", config.name);
            }
        }
        Ok(nodes)
    }
}

/// Transform and graphic halves of one scene node
#[derive(Clone, Debug)]
pub struct SceneNode {
    pub rect: Rc<RefCell<RectNode>>,
    pub graphic: Rc<RefCell<GraphicNode>>,
}

/// Named host objects, in declaration order
#[derive(Debug, Default)]
pub struct SceneNodes {
    nodes: IndexMap<String, SceneNode>,
}

impl SceneNodes {
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SceneNode)> {
        self.nodes.iter().map(|(name, node)| (name.as_str(), node))
    }

    pub fn get(&self, name: &str) -> Option<&SceneNode> {
        self.nodes.get(name)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }
}

impl TargetResolver for SceneNodes {
    fn transform(&self, node: &str) -> Option<SharedTransform> {
        self.get(node).map(|n| n.rect.clone() as SharedTransform)
    }

    fn graphic(&self, node: &str) -> Option<SharedGraphic> {
        self.get(node).map(|n| n.graphic.clone() as SharedGraphic)
    }
}

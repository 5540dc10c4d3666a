//! Host boundary
//!
//! Animations never own the geometry they move. The host (a UI toolkit, a
//! scene graph, a test fixture) owns transform and graphic objects and
//! exposes them through [`TransformTarget`] and [`ColorTarget`]. Viewport
//! metrics come from the host as a [`ScreenMetrics`] value.
//!
//! Targets are shared as `Rc<RefCell<dyn ...>>`: the engine is driven from a
//! single update thread and animations hold the same object the host renders.

use crate::error::{HostError, Result};
use crate::geometry::{Color, Quat, Vec2, Vec3};
use std::cell::RefCell;
use std::rc::Rc;

/// A host object with an anchored position, a local scale and a local
/// orientation.
pub trait TransformTarget {
    /// Position relative to the object's anchor, in local units
    fn anchored_position(&self) -> Vec2;
    fn set_anchored_position(&mut self, position: Vec2);

    /// Pivot position in screen pixels
    fn screen_position(&self) -> Vec2;

    fn local_scale(&self) -> Vec3;
    fn set_local_scale(&mut self, scale: Vec3);

    fn local_rotation(&self) -> Quat;
    fn set_local_rotation(&mut self, rotation: Quat);

    /// Show or hide the object. Hosts without visibility may ignore this.
    fn set_active(&mut self, _active: bool) {}
}

/// A host object with a tint color
pub trait ColorTarget {
    fn color(&self) -> Color;
    fn set_color(&mut self, color: Color);

    fn set_active(&mut self, _active: bool) {}
}

/// Shared handle to a host transform
pub type SharedTransform = Rc<RefCell<dyn TransformTarget>>;

/// Shared handle to a host graphic
pub type SharedGraphic = Rc<RefCell<dyn ColorTarget>>;

/// Viewport metrics supplied by the host
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScreenMetrics {
    pub width: f32,
    pub height: f32,
    /// Canvas scale factor applied by the host's UI scaler
    pub scale_factor: f32,
    /// Whether the UI scales with the screen size
    pub scale_with_screen: bool,
}

impl ScreenMetrics {
    /// Metrics for an unscaled viewport
    pub fn new(width: f32, height: f32) -> Result<Self> {
        Self::scaled(width, height, 1.0, false)
    }

    pub fn scaled(
        width: f32,
        height: f32,
        scale_factor: f32,
        scale_with_screen: bool,
    ) -> Result<Self> {
        let metrics = Self {
            width,
            height,
            scale_factor,
            scale_with_screen,
        };
        metrics.validate()?;
        Ok(metrics)
    }

    /// Reject metrics that would turn coordinates into NaN or infinity
    pub fn validate(&self) -> Result<()> {
        let valid = |v: f32| v.is_finite() && v > 0.0;
        if !valid(self.width) || !valid(self.height) {
            return Err(HostError::InvalidViewport {
                width: self.width,
                height: self.height,
            });
        }
        if !valid(self.scale_factor) {
            return Err(HostError::InvalidScaleFactor(self.scale_factor));
        }
        Ok(())
    }

    pub fn dimension(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    pub fn inverted_dimension(&self) -> Vec2 {
        Vec2::new(1.0 / self.width, 1.0 / self.height)
    }

    /// Multiplier from screen pixels to canvas units
    pub fn canvas_scale(&self) -> f32 {
        if self.scale_with_screen {
            1.0 / self.scale_factor
        } else {
            1.0
        }
    }

    /// Screen pixels to viewport fractions
    pub fn normalize(&self, screen: Vec2) -> Vec2 {
        screen.scale(self.inverted_dimension())
    }

    /// Convert a point in viewport fractions into the anchored space of an
    /// object whose pivot currently sits at `screen_position` with the given
    /// `anchored_position`.
    pub fn to_anchored(&self, normalized: Vec2, screen_position: Vec2, anchored_position: Vec2) -> Vec2 {
        let canvas_scale = self.canvas_scale();
        normalized.scale(self.dimension()) * canvas_scale - screen_position * canvas_scale
            + anchored_position
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// In-memory host objects
// ─────────────────────────────────────────────────────────────────────────────

/// Minimal retained transform.
///
/// The pivot's screen position is derived from the anchored position:
/// `anchor_origin + anchored_position * scale_factor`.
#[derive(Clone, Debug, PartialEq)]
pub struct RectNode {
    pub anchored_position: Vec2,
    /// Screen pixel location of anchored position zero
    pub anchor_origin: Vec2,
    pub scale_factor: f32,
    pub scale: Vec3,
    pub rotation: Quat,
    pub active: bool,
}

impl Default for RectNode {
    fn default() -> Self {
        Self {
            anchored_position: Vec2::ZERO,
            anchor_origin: Vec2::ZERO,
            scale_factor: 1.0,
            scale: Vec3::ONE,
            rotation: Quat::IDENTITY,
            active: true,
        }
    }
}

impl RectNode {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn at(mut self, anchored_position: Vec2) -> Self {
        self.anchored_position = anchored_position;
        self
    }

    pub fn with_anchor_origin(mut self, origin: Vec2) -> Self {
        self.anchor_origin = origin;
        self
    }

    pub fn with_scale_factor(mut self, scale_factor: f32) -> Self {
        self.scale_factor = scale_factor;
        self
    }

    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    /// Wrap into a shared handle, keeping the concrete type for inspection
    pub fn shared(self) -> Rc<RefCell<RectNode>> {
        Rc::new(RefCell::new(self))
    }
}

impl TransformTarget for RectNode {
    fn anchored_position(&self) -> Vec2 {
        self.anchored_position
    }

    fn set_anchored_position(&mut self, position: Vec2) {
        self.anchored_position = position;
    }

    fn screen_position(&self) -> Vec2 {
        self.anchor_origin + self.anchored_position * self.scale_factor
    }

    fn local_scale(&self) -> Vec3 {
        self.scale
    }

    fn set_local_scale(&mut self, scale: Vec3) {
        self.scale = scale;
    }

    fn local_rotation(&self) -> Quat {
        self.rotation
    }

    fn set_local_rotation(&mut self, rotation: Quat) {
        self.rotation = rotation;
    }

    fn set_active(&mut self, active: bool) {
        self.active = active;
    }
}

/// Minimal retained graphic
#[derive(Clone, Debug, PartialEq)]
pub struct GraphicNode {
    pub color: Color,
    pub active: bool,
}

impl Default for GraphicNode {
    fn default() -> Self {
        Self {
            color: Color::WHITE,
            active: true,
        }
    }
}

impl GraphicNode {
    pub fn new(color: Color) -> Self {
        Self {
            color,
            active: true,
        }
    }

    pub fn shared(self) -> Rc<RefCell<GraphicNode>> {
        Rc::new(RefCell::new(self))
    }
}

impl ColorTarget for GraphicNode {
    fn color(&self) -> Color {
        self.color
    }

    fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    fn set_active(&mut self, active: bool) {
        self.active = active;
    }
}

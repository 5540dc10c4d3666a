//! Leaf animation variants
//!
//! Each tween knows how to write one kind of host property: it interpolates
//! between an origin and a destination, layers its effect on top, snaps to
//! the exact destination at the end, and can swap its endpoints.

use crate::easing::Easing;
use crate::effect::{BezierPath, EffectCurve, Perturbation};
use lilt_core::{Color, Quat, ScreenMetrics, SharedGraphic, SharedTransform, Vec2, Vec3};

/// Per-kind behaviour driven by the animation state machine
pub(crate) trait Tween {
    /// Write the value for `progress` in `[0, 1)`
    fn apply(&mut self, progress: f32, easing: &Easing);

    /// Write the exact destination value
    fn snap_end(&mut self);

    /// Swap origin and destination
    fn reverse(&mut self);

    /// Bind an effect curve. Returns `false` when the tween has no effect slot.
    fn set_effect(&mut self, curve: EffectCurve, orientation: Quat) -> bool;
}

// ─────────────────────────────────────────────────────────────────────────────
// Position
// ─────────────────────────────────────────────────────────────────────────────

/// Straight-line move in the target's anchored space
#[derive(Clone)]
pub struct PositionTween {
    target: SharedTransform,
    origin: Vec2,
    destination: Vec2,
    effect: Perturbation,
    /// Viewport height, so effects keep their visual size regardless of
    /// travel distance
    effect_scale: f32,
}

impl PositionTween {
    /// `origin` and `destination` are viewport fractions
    pub fn new(
        target: SharedTransform,
        origin: Vec2,
        destination: Vec2,
        metrics: &ScreenMetrics,
    ) -> Self {
        let (origin, destination) = {
            let node = target.borrow();
            let screen = node.screen_position();
            let anchored = node.anchored_position();
            (
                metrics.to_anchored(origin, screen, anchored),
                metrics.to_anchored(destination, screen, anchored),
            )
        };
        Self {
            target,
            origin,
            destination,
            effect: Perturbation::default(),
            effect_scale: metrics.height,
        }
    }

    pub fn origin(&self) -> Vec2 {
        self.origin
    }

    pub fn destination(&self) -> Vec2 {
        self.destination
    }

    /// Same endpoints and effect, bound to another target
    pub fn retarget(&self, target: SharedTransform) -> Self {
        Self {
            target,
            ..self.clone()
        }
    }
}

impl Tween for PositionTween {
    fn apply(&mut self, progress: f32, easing: &Easing) {
        let base = self.origin.lerp(self.destination, easing.apply(progress));
        self.target
            .borrow_mut()
            .set_anchored_position(base + self.effect.offset(progress));
    }

    fn snap_end(&mut self) {
        self.target
            .borrow_mut()
            .set_anchored_position(self.destination);
    }

    fn reverse(&mut self) {
        std::mem::swap(&mut self.origin, &mut self.destination);
    }

    fn set_effect(&mut self, curve: EffectCurve, orientation: Quat) -> bool {
        let mut direction = (self.destination - self.origin).normalize();
        if direction == Vec2::ZERO {
            direction = Vec2::RIGHT;
        }
        let direction = orientation.rotate_vec2(direction) * self.effect_scale;
        self.effect = Perturbation::new(curve, direction);
        true
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Bezier position
// ─────────────────────────────────────────────────────────────────────────────

/// Move along a quadratic or cubic Bezier curve.
///
/// The curve itself occupies the effect slot: the eased progress is fed
/// straight into the path instead of a lerp plus offset, so there is no
/// room for an additional effect.
#[derive(Clone)]
pub struct BezierTween {
    target: SharedTransform,
    path: BezierPath,
}

impl BezierTween {
    /// Control points are viewport fractions. Two points after the origin
    /// build a quadratic path, three build a cubic one.
    pub fn quadratic(
        target: SharedTransform,
        origin: Vec2,
        control: Vec2,
        destination: Vec2,
        metrics: &ScreenMetrics,
    ) -> Self {
        let local = Self::localizer(&target, metrics);
        let path = BezierPath::Quadratic {
            p0: local(origin),
            p1: local(control),
            p2: local(destination),
        };
        Self { target, path }
    }

    pub fn cubic(
        target: SharedTransform,
        origin: Vec2,
        first: Vec2,
        second: Vec2,
        destination: Vec2,
        metrics: &ScreenMetrics,
    ) -> Self {
        let local = Self::localizer(&target, metrics);
        let path = BezierPath::Cubic {
            p0: local(origin),
            p1: local(first),
            p2: local(second),
            p3: local(destination),
        };
        Self { target, path }
    }

    fn localizer(target: &SharedTransform, metrics: &ScreenMetrics) -> impl Fn(Vec2) -> Vec2 {
        let node = target.borrow();
        let screen = node.screen_position();
        let anchored = node.anchored_position();
        let metrics = *metrics;
        move |p| metrics.to_anchored(p, screen, anchored)
    }

    pub fn path(&self) -> &BezierPath {
        &self.path
    }

    pub fn retarget(&self, target: SharedTransform) -> Self {
        Self {
            target,
            path: self.path,
        }
    }
}

impl Tween for BezierTween {
    fn apply(&mut self, progress: f32, easing: &Easing) {
        let point = self.path.point_at(easing.apply(progress));
        self.target.borrow_mut().set_anchored_position(point);
    }

    fn snap_end(&mut self) {
        let end = self.path.end();
        self.target.borrow_mut().set_anchored_position(end);
    }

    fn reverse(&mut self) {
        self.path = self.path.reversed();
    }

    fn set_effect(&mut self, _curve: EffectCurve, _orientation: Quat) -> bool {
        false
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Scale
// ─────────────────────────────────────────────────────────────────────────────

/// Local scale tween
#[derive(Clone)]
pub struct ScaleTween {
    target: SharedTransform,
    origin: Vec3,
    destination: Vec3,
    effect: Perturbation,
}

impl ScaleTween {
    pub fn new(target: SharedTransform, origin: Vec3, destination: Vec3) -> Self {
        Self {
            target,
            origin,
            destination,
            effect: Perturbation::default(),
        }
    }

    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    pub fn destination(&self) -> Vec3 {
        self.destination
    }

    pub fn retarget(&self, target: SharedTransform) -> Self {
        Self {
            target,
            ..self.clone()
        }
    }
}

impl Tween for ScaleTween {
    fn apply(&mut self, progress: f32, easing: &Easing) {
        let base = self.origin.lerp(self.destination, easing.apply(progress));
        let offset = self.effect.offset(progress).extend(0.0);
        self.target.borrow_mut().set_local_scale(base + offset);
    }

    fn snap_end(&mut self) {
        self.target.borrow_mut().set_local_scale(self.destination);
    }

    fn reverse(&mut self) {
        std::mem::swap(&mut self.origin, &mut self.destination);
    }

    fn set_effect(&mut self, curve: EffectCurve, orientation: Quat) -> bool {
        let direction = orientation
            .rotate_vec3(self.destination - self.origin)
            .truncate();
        self.effect = Perturbation::new(curve, direction);
        true
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Rotation
// ─────────────────────────────────────────────────────────────────────────────

/// How a rotation tween interpolates
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RotationMode {
    /// Shortest-arc interpolation between two orientations
    Clamped { origin: Quat, destination: Quat },
    /// Angle about Z in degrees, not wrapped, so multi-turn spins work
    Unclamped { origin: f32, destination: f32 },
}

/// Local rotation tween.
///
/// The effect adds an extra angle about Z, in degrees.
#[derive(Clone)]
pub struct RotationTween {
    target: SharedTransform,
    mode: RotationMode,
    effect: Perturbation,
}

impl RotationTween {
    pub fn clamped(target: SharedTransform, origin: Quat, destination: Quat) -> Self {
        Self {
            target,
            mode: RotationMode::Clamped {
                origin,
                destination,
            },
            effect: Perturbation::default(),
        }
    }

    pub fn unclamped(target: SharedTransform, origin: f32, destination: f32) -> Self {
        Self {
            target,
            mode: RotationMode::Unclamped {
                origin,
                destination,
            },
            effect: Perturbation::default(),
        }
    }

    pub fn mode(&self) -> RotationMode {
        self.mode
    }

    pub fn retarget(&self, target: SharedTransform) -> Self {
        Self {
            target,
            ..self.clone()
        }
    }
}

impl Tween for RotationTween {
    fn apply(&mut self, progress: f32, easing: &Easing) {
        let t = easing.apply(progress);
        let base = match self.mode {
            RotationMode::Clamped {
                origin,
                destination,
            } => origin.slerp(destination, t),
            RotationMode::Unclamped {
                origin,
                destination,
            } => Quat::from_rotation_z(origin + (destination - origin) * t),
        };
        let wobble = Quat::from_rotation_z(self.effect.offset(progress).x);
        self.target.borrow_mut().set_local_rotation(base * wobble);
    }

    fn snap_end(&mut self) {
        let end = match self.mode {
            RotationMode::Clamped { destination, .. } => destination,
            RotationMode::Unclamped { destination, .. } => Quat::from_rotation_z(destination),
        };
        self.target.borrow_mut().set_local_rotation(end);
    }

    fn reverse(&mut self) {
        self.mode = match self.mode {
            RotationMode::Clamped {
                origin,
                destination,
            } => RotationMode::Clamped {
                origin: destination,
                destination: origin,
            },
            RotationMode::Unclamped {
                origin,
                destination,
            } => RotationMode::Unclamped {
                origin: destination,
                destination: origin,
            },
        };
    }

    fn set_effect(&mut self, curve: EffectCurve, _orientation: Quat) -> bool {
        self.effect = Perturbation::new(curve, Vec2::RIGHT);
        true
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Color
// ─────────────────────────────────────────────────────────────────────────────

/// Graphic tint tween, alpha included
#[derive(Clone)]
pub struct ColorTween {
    target: SharedGraphic,
    origin: Color,
    destination: Color,
}

impl ColorTween {
    pub fn new(target: SharedGraphic, origin: Color, destination: Color) -> Self {
        Self {
            target,
            origin,
            destination,
        }
    }

    pub fn origin(&self) -> Color {
        self.origin
    }

    pub fn destination(&self) -> Color {
        self.destination
    }

    pub fn retarget(&self, target: SharedGraphic) -> Self {
        Self {
            target,
            origin: self.origin,
            destination: self.destination,
        }
    }
}

impl Tween for ColorTween {
    fn apply(&mut self, progress: f32, easing: &Easing) {
        let color = self.origin.lerp(self.destination, easing.apply(progress));
        self.target.borrow_mut().set_color(color);
    }

    fn snap_end(&mut self) {
        self.target.borrow_mut().set_color(self.destination);
    }

    fn reverse(&mut self) {
        std::mem::swap(&mut self.origin, &mut self.destination);
    }

    fn set_effect(&mut self, _curve: EffectCurve, _orientation: Quat) -> bool {
        false
    }
}

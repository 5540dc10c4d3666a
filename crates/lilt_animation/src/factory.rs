//! Convenience constructors
//!
//! Shorthands that read the target's current state to fill in whichever
//! endpoint the caller leaves out. Position coordinates are viewport
//! fractions, so `(0.5, 0.5)` is the middle of the screen.
//!
//! Every constructor stores a detached animation and returns an
//! [`AnimationRef`] for chaining configuration and `play()`.

use crate::animation::{Animation, AnimationKind};
use crate::easing::Easing;
use crate::error::{AnimationError, Result};
use crate::group::GroupTween;
use crate::scheduler::{AnimationId, AnimationRef, AnimationScheduler};
use crate::tween::{BezierTween, ColorTween, PositionTween, RotationTween, ScaleTween};
use lilt_core::{Color, Quat, SharedGraphic, SharedTransform, TransformTarget, Vec2, Vec3};
use std::cell::RefCell;

impl AnimationScheduler {
    /// The target's pivot in viewport fractions
    pub fn center_of<T: TransformTarget + ?Sized>(&self, target: &RefCell<T>) -> Result<Vec2> {
        let metrics = self.metrics()?;
        Ok(metrics.normalize(target.borrow().screen_position()))
    }

    // =========================================================================
    // Move
    // =========================================================================

    pub fn move_between(
        &mut self,
        target: SharedTransform,
        origin: Vec2,
        destination: Vec2,
        duration: f32,
    ) -> Result<AnimationRef<'_>> {
        let metrics = self.metrics()?;
        let tween = PositionTween::new(target, origin, destination, &metrics);
        Ok(self.add(Animation::new(AnimationKind::Position(tween), duration)))
    }

    /// From the current position
    pub fn move_to(
        &mut self,
        target: SharedTransform,
        destination: Vec2,
        duration: f32,
    ) -> Result<AnimationRef<'_>> {
        let center = self.center_of(&*target)?;
        self.move_between(target, center, destination, duration)
    }

    /// Along X, keeping the current Y
    pub fn move_horizontal(
        &mut self,
        target: SharedTransform,
        origin: f32,
        destination: f32,
        duration: f32,
    ) -> Result<AnimationRef<'_>> {
        let center = self.center_of(&*target)?;
        self.move_between(
            target,
            Vec2::new(origin, center.y),
            Vec2::new(destination, center.y),
            duration,
        )
    }

    pub fn move_horizontal_to(
        &mut self,
        target: SharedTransform,
        destination: f32,
        duration: f32,
    ) -> Result<AnimationRef<'_>> {
        let center = self.center_of(&*target)?;
        self.move_between(target, center, Vec2::new(destination, center.y), duration)
    }

    /// Along Y, keeping the current X
    pub fn move_vertical(
        &mut self,
        target: SharedTransform,
        origin: f32,
        destination: f32,
        duration: f32,
    ) -> Result<AnimationRef<'_>> {
        let center = self.center_of(&*target)?;
        self.move_between(
            target,
            Vec2::new(center.x, origin),
            Vec2::new(center.x, destination),
            duration,
        )
    }

    pub fn move_vertical_to(
        &mut self,
        target: SharedTransform,
        destination: f32,
        duration: f32,
    ) -> Result<AnimationRef<'_>> {
        let center = self.center_of(&*target)?;
        self.move_between(target, center, Vec2::new(center.x, destination), duration)
    }

    /// From the current position by `offset` viewport fractions
    pub fn move_offset(
        &mut self,
        target: SharedTransform,
        offset: Vec2,
        duration: f32,
    ) -> Result<AnimationRef<'_>> {
        let center = self.center_of(&*target)?;
        self.move_between(target, center, center + offset, duration)
    }

    pub fn move_bezier_quadratic(
        &mut self,
        target: SharedTransform,
        origin: Vec2,
        control: Vec2,
        destination: Vec2,
        duration: f32,
    ) -> Result<AnimationRef<'_>> {
        let metrics = self.metrics()?;
        let tween = BezierTween::quadratic(target, origin, control, destination, &metrics);
        Ok(self.add(Animation::new(AnimationKind::Bezier(tween), duration)))
    }

    pub fn move_bezier_cubic(
        &mut self,
        target: SharedTransform,
        origin: Vec2,
        first: Vec2,
        second: Vec2,
        destination: Vec2,
        duration: f32,
    ) -> Result<AnimationRef<'_>> {
        let metrics = self.metrics()?;
        let tween = BezierTween::cubic(target, origin, first, second, destination, &metrics);
        Ok(self.add(Animation::new(AnimationKind::Bezier(tween), duration)))
    }

    // =========================================================================
    // Scale
    // =========================================================================

    pub fn scale_between(
        &mut self,
        target: SharedTransform,
        origin: Vec3,
        destination: Vec3,
        duration: f32,
    ) -> AnimationRef<'_> {
        let tween = ScaleTween::new(target, origin, destination);
        self.add(Animation::new(AnimationKind::Scale(tween), duration))
    }

    pub fn scale_to(
        &mut self,
        target: SharedTransform,
        destination: Vec3,
        duration: f32,
    ) -> AnimationRef<'_> {
        let current = target.borrow().local_scale();
        self.scale_between(target, current, destination, duration)
    }

    pub fn scale_offset(
        &mut self,
        target: SharedTransform,
        offset: Vec3,
        duration: f32,
    ) -> AnimationRef<'_> {
        let current = target.borrow().local_scale();
        self.scale_between(target, current, current + offset, duration)
    }

    // =========================================================================
    // Rotation
    // =========================================================================

    /// Shortest-arc rotation between two orientations
    pub fn rotate_between(
        &mut self,
        target: SharedTransform,
        origin: Quat,
        destination: Quat,
        duration: f32,
    ) -> AnimationRef<'_> {
        let tween = RotationTween::clamped(target, origin, destination);
        self.add(Animation::new(AnimationKind::Rotation(tween), duration))
    }

    pub fn rotate_to(
        &mut self,
        target: SharedTransform,
        destination: Quat,
        duration: f32,
    ) -> AnimationRef<'_> {
        let current = target.borrow().local_rotation();
        self.rotate_between(target, current, destination, duration)
    }

    /// Compose `offset` onto the current orientation
    pub fn rotate_offset(
        &mut self,
        target: SharedTransform,
        offset: Quat,
        duration: f32,
    ) -> AnimationRef<'_> {
        let current = target.borrow().local_rotation();
        self.rotate_between(target, current, current * offset, duration)
    }

    /// Spin about Z between two angles in degrees. Not wrapped, so
    /// `0 -> 720` turns twice.
    pub fn rotate_angle_between(
        &mut self,
        target: SharedTransform,
        origin: f32,
        destination: f32,
        duration: f32,
    ) -> AnimationRef<'_> {
        let tween = RotationTween::unclamped(target, origin, destination);
        self.add(Animation::new(AnimationKind::Rotation(tween), duration))
    }

    pub fn rotate_angle_to(
        &mut self,
        target: SharedTransform,
        destination: f32,
        duration: f32,
    ) -> AnimationRef<'_> {
        let current = target.borrow().local_rotation().z_angle_degrees();
        self.rotate_angle_between(target, current, destination, duration)
    }

    pub fn rotate_angle_offset(
        &mut self,
        target: SharedTransform,
        offset: f32,
        duration: f32,
    ) -> AnimationRef<'_> {
        let current = target.borrow().local_rotation().z_angle_degrees();
        self.rotate_angle_between(target, current, current + offset, duration)
    }

    // =========================================================================
    // Color
    // =========================================================================

    pub fn change_color(
        &mut self,
        graphic: SharedGraphic,
        origin: Color,
        destination: Color,
        duration: f32,
    ) -> AnimationRef<'_> {
        let tween = ColorTween::new(graphic, origin, destination);
        self.add(Animation::new(AnimationKind::Color(tween), duration))
    }

    pub fn change_color_to(
        &mut self,
        graphic: SharedGraphic,
        destination: Color,
        duration: f32,
    ) -> AnimationRef<'_> {
        let current = graphic.borrow().color();
        self.change_color(graphic, current, destination, duration)
    }

    /// Alpha 0 to 1, keeping the current RGB
    pub fn fade_in(&mut self, graphic: SharedGraphic, duration: f32) -> AnimationRef<'_> {
        let current = graphic.borrow().color();
        self.change_color(graphic, current.with_alpha(0.0), current.with_alpha(1.0), duration)
    }

    /// Alpha 1 to 0, keeping the current RGB
    pub fn fade_out(&mut self, graphic: SharedGraphic, duration: f32) -> AnimationRef<'_> {
        let current = graphic.borrow().color();
        self.change_color(graphic, current.with_alpha(1.0), current.with_alpha(0.0), duration)
    }

    // =========================================================================
    // Groups
    // =========================================================================

    /// Group already stored animations. The group lasts until its last
    /// member ends (`delay + duration`).
    ///
    /// Members leave the active set and are driven by the group from then
    /// on; an animation belongs to at most one group.
    pub fn group(&mut self, members: &[AnimationId]) -> Result<AnimationRef<'_>> {
        if members.is_empty() {
            return Err(AnimationError::EmptyGroup);
        }
        for (index, &id) in members.iter().enumerate() {
            let member = self
                .get(id)
                .ok_or(AnimationError::UnknownAnimation(id))?;
            if let Some(group) = member.parent_group() {
                return Err(AnimationError::AlreadyGrouped { member: id, group });
            }
            if members[..index].contains(&id) {
                return Err(AnimationError::DuplicateMember(id));
            }
        }
        let duration = self.members_span(members);
        let group = GroupTween::new(members.iter().copied());
        let id = self.insert(Animation::new(AnimationKind::Group(group), duration));
        self.adopt(id, members);
        self.configure(id)
    }

    /// Copy a position, Bezier, scale or rotation template onto every
    /// target. Members share the template's endpoints, easing and effect.
    pub fn group_broadcast(
        &mut self,
        template: AnimationId,
        targets: &[SharedTransform],
    ) -> Result<AnimationRef<'_>> {
        let source = self
            .get(template)
            .ok_or(AnimationError::UnknownAnimation(template))?;
        let retarget = |target: &SharedTransform| -> Result<AnimationKind> {
            let target = target.clone();
            match source.kind() {
                AnimationKind::Position(t) => Ok(AnimationKind::Position(t.retarget(target))),
                AnimationKind::Bezier(t) => Ok(AnimationKind::Bezier(t.retarget(target))),
                AnimationKind::Scale(t) => Ok(AnimationKind::Scale(t.retarget(target))),
                AnimationKind::Rotation(t) => Ok(AnimationKind::Rotation(t.retarget(target))),
                other => Err(AnimationError::NotBroadcastable { kind: other.name() }),
            }
        };
        let kinds = targets.iter().map(retarget).collect::<Result<Vec<_>>>()?;
        let (duration, easing) = (source.duration(), source.easing());
        self.broadcast(kinds, duration, easing)
    }

    /// Copy a color template onto every graphic
    pub fn group_broadcast_color(
        &mut self,
        template: AnimationId,
        graphics: &[SharedGraphic],
    ) -> Result<AnimationRef<'_>> {
        let source = self
            .get(template)
            .ok_or(AnimationError::UnknownAnimation(template))?;
        let AnimationKind::Color(tween) = source.kind() else {
            return Err(AnimationError::NotBroadcastable {
                kind: source.kind().name(),
            });
        };
        let kinds: Vec<_> = graphics
            .iter()
            .map(|graphic| AnimationKind::Color(tween.retarget(graphic.clone())))
            .collect();
        let (duration, easing) = (source.duration(), source.easing());
        self.broadcast(kinds, duration, easing)
    }

    fn broadcast(
        &mut self,
        kinds: Vec<AnimationKind>,
        duration: f32,
        easing: Easing,
    ) -> Result<AnimationRef<'_>> {
        if kinds.is_empty() {
            return Err(AnimationError::EmptyGroup);
        }
        let members: Vec<AnimationId> = kinds
            .into_iter()
            .map(|kind| self.insert(Animation::new(kind, duration).with_easing(easing)))
            .collect();
        let group = GroupTween::new(members.iter().copied());
        let id = self.insert(Animation::new(AnimationKind::Group(group), duration));
        self.adopt(id, &members);
        self.configure(id)
    }
}

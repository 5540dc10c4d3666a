//! Animation scheduler
//!
//! Owns every animation in an arena and drives the registered ones once per
//! frame. Structural changes to the active set never happen while it is
//! being iterated:
//!
//! 1. Stop requests queued since the last frame are applied.
//! 2. Every active animation is advanced with the same delta time. The ones
//!    that finish are queued, the active set is left untouched.
//! 3. Finished animations leave the active set, then their finish callbacks
//!    run in registration order. Anything a callback registers or stops
//!    shows up on the next frame.

use crate::animation::{Animation, AnimationKind, Callbacks, LoopMode, Step, MIN_DURATION};
use crate::easing::Easing;
use crate::effect::EffectCurve;
use crate::error::{AnimationError, Result};
use crate::group::GroupEffect;
use indexmap::IndexSet;
use lilt_core::{Quat, ScreenMetrics};
use rand::Rng;
use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;
use std::cell::{OnceCell, RefCell};
use std::rc::Rc;
use std::time::Instant;

// ============================================================================
// Global Scheduler State
// ============================================================================

thread_local! {
    /// Scheduler for the update thread
    static GLOBAL_SCHEDULER: OnceCell<SchedulerHandle> = const { OnceCell::new() };
}

/// Initialize the update thread's scheduler and return a handle to it.
///
/// Idempotent: later calls return the existing scheduler and ignore
/// `metrics`. Use [`SchedulerHandle::with`] and
/// [`AnimationScheduler::set_metrics`] to change the viewport afterwards.
pub fn init_scheduler(metrics: Option<ScreenMetrics>) -> Result<SchedulerHandle> {
    if let Some(handle) = try_get_scheduler() {
        tracing::debug!("Animation scheduler already initialized");
        return Ok(handle);
    }

    let mut scheduler = AnimationScheduler::new();
    if let Some(metrics) = metrics {
        scheduler.set_metrics(metrics)?;
    }
    let handle = SchedulerHandle::new(scheduler);
    GLOBAL_SCHEDULER.with(|cell| {
        // Nothing between the check above and here can initialize the cell
        let _ = cell.set(handle.clone());
    });
    tracing::debug!("Animation scheduler initialized");
    Ok(handle)
}

/// Get the scheduler (returns None if not initialized on this thread)
pub fn try_get_scheduler() -> Option<SchedulerHandle> {
    GLOBAL_SCHEDULER.with(|cell| cell.get().cloned())
}

/// Check if the scheduler has been initialized on this thread
pub fn is_scheduler_initialized() -> bool {
    GLOBAL_SCHEDULER.with(|cell| cell.get().is_some())
}

new_key_type! {
    /// Handle to an animation stored in a scheduler
    pub struct AnimationId;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Removal {
    Finished,
    Stopped,
}

/// Arena of animations plus the set currently being driven
pub struct AnimationScheduler {
    animations: SlotMap<AnimationId, Animation>,
    active: IndexSet<AnimationId>,
    pending_removal: Vec<(AnimationId, Removal)>,
    metrics: Option<ScreenMetrics>,
    last_frame: Instant,
}

impl AnimationScheduler {
    pub fn new() -> Self {
        Self {
            animations: SlotMap::with_key(),
            active: IndexSet::new(),
            pending_removal: Vec::new(),
            metrics: None,
            last_frame: Instant::now(),
        }
    }

    pub fn with_metrics(metrics: ScreenMetrics) -> Result<Self> {
        let mut scheduler = Self::new();
        scheduler.set_metrics(metrics)?;
        Ok(scheduler)
    }

    /// Install viewport metrics used to build position animations
    pub fn set_metrics(&mut self, metrics: ScreenMetrics) -> Result<()> {
        metrics.validate()?;
        self.metrics = Some(metrics);
        Ok(())
    }

    pub fn metrics(&self) -> Result<ScreenMetrics> {
        self.metrics.ok_or(AnimationError::MissingViewport)
    }

    /// Wrap into a shareable handle
    pub fn into_handle(self) -> SchedulerHandle {
        SchedulerHandle::new(self)
    }

    // =========================================================================
    // Storage
    // =========================================================================

    /// Store a detached animation
    pub fn insert(&mut self, animation: Animation) -> AnimationId {
        self.animations.insert(animation)
    }

    /// Store an animation and return a builder for configuring it
    pub fn add(&mut self, animation: Animation) -> AnimationRef<'_> {
        let id = self.insert(animation);
        AnimationRef { scheduler: self, id }
    }

    /// Builder for an already stored animation
    pub fn configure(&mut self, id: AnimationId) -> Result<AnimationRef<'_>> {
        if !self.animations.contains_key(id) {
            return Err(AnimationError::UnknownAnimation(id));
        }
        Ok(AnimationRef { scheduler: self, id })
    }

    pub fn get(&self, id: AnimationId) -> Option<&Animation> {
        self.animations.get(id)
    }

    pub fn get_mut(&mut self, id: AnimationId) -> Option<&mut Animation> {
        self.animations.get_mut(id)
    }

    pub fn contains(&self, id: AnimationId) -> bool {
        self.animations.contains_key(id)
    }

    /// Drop an animation from storage, deregistering it immediately.
    ///
    /// Must not be called from inside a finish callback for the animation
    /// being finished; stop it there instead.
    pub fn remove(&mut self, id: AnimationId) -> Option<Animation> {
        self.active.shift_remove(&id);
        self.pending_removal.retain(|(pending, _)| *pending != id);
        let removed = self.animations.remove(id)?;
        // Members of a removed group can be played on their own again
        if let AnimationKind::Group(group) = removed.kind() {
            for member in group.members() {
                if let Some(animation) = self.animations.get_mut(member) {
                    animation.parent = None;
                }
            }
        }
        tracing::debug!(?id, "Animation removed");
        Some(removed)
    }

    pub fn animation_count(&self) -> usize {
        self.animations.len()
    }

    /// Iterate over all stored animations
    pub fn iter(&self) -> impl Iterator<Item = (AnimationId, &Animation)> {
        self.animations.iter()
    }

    // =========================================================================
    // Registration
    // =========================================================================

    /// Add an animation to the active set. Idempotent.
    ///
    /// Cancels a stop requested earlier in the same frame. Group members are
    /// refused: their group advances them.
    pub fn register(&mut self, id: AnimationId) -> bool {
        let Some(animation) = self.animations.get(id) else {
            tracing::warn!(?id, "Cannot register unknown animation");
            return false;
        };
        if let Some(group) = animation.parent {
            tracing::warn!(?id, ?group, "Cannot register a group member on its own");
            return false;
        }
        self.pending_removal
            .retain(|(pending, reason)| !(*pending == id && *reason == Removal::Stopped));
        if self.active.insert(id) {
            tracing::debug!(?id, "Animation registered");
        }
        true
    }

    /// Request removal from the active set.
    ///
    /// Takes effect before the next frame advances anything. Stopping an
    /// animation that is not active is a no-op.
    pub fn deregister(&mut self, id: AnimationId) -> bool {
        if !self.active.contains(&id) || self.is_pending_stop(id) {
            return false;
        }
        self.pending_removal.push((id, Removal::Stopped));
        tracing::debug!(?id, "Animation deregistered");
        true
    }

    /// Registered and not waiting to be stopped
    pub fn is_active(&self, id: AnimationId) -> bool {
        self.active.contains(&id) && !self.is_pending_stop(id)
    }

    fn is_pending_stop(&self, id: AnimationId) -> bool {
        self.pending_removal
            .iter()
            .any(|(pending, reason)| *pending == id && *reason == Removal::Stopped)
    }

    /// Number of animations in the active set, including ones with a stop
    /// pending
    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Active animations in registration order
    pub fn active_ids(&self) -> impl Iterator<Item = AnimationId> + '_ {
        self.active.iter().copied()
    }

    pub fn has_active_animations(&self) -> bool {
        self.active.iter().any(|id| !self.is_pending_stop(*id))
    }

    // =========================================================================
    // Playback
    // =========================================================================

    /// Resume a paused animation in place, otherwise restart it
    pub fn play(&mut self, id: AnimationId) -> bool {
        let Some(animation) = self.animations.get_mut(id) else {
            tracing::warn!(?id, "Cannot play unknown animation");
            return false;
        };
        if let Some(group) = animation.parent {
            tracing::warn!(?id, ?group, "Cannot play a group member on its own");
            return false;
        }
        if animation.is_paused() {
            animation.set_paused(false);
            self.register(id)
        } else {
            self.restart(id)
        }
    }

    /// Swap direction, then play
    pub fn play_reverse(&mut self, id: AnimationId) -> bool {
        self.reverse(id) && self.play(id)
    }

    /// Rewind to the start of the delay and make sure the animation is
    /// registered. Group members are rewound too.
    pub fn restart(&mut self, id: AnimationId) -> bool {
        match self.animations.get(id).map(|animation| animation.parent) {
            None => {
                tracing::warn!(?id, "Cannot restart unknown animation");
                return false;
            }
            Some(Some(group)) => {
                tracing::warn!(?id, ?group, "Cannot restart a group member on its own");
                return false;
            }
            Some(None) => {}
        }
        self.rewind(id);
        self.register(id)
    }

    /// Pause, or resume when `resume_if_paused` is set and the animation is
    /// already paused
    pub fn pause(&mut self, id: AnimationId, resume_if_paused: bool) -> bool {
        let Some(animation) = self.animations.get_mut(id) else {
            tracing::warn!(?id, "Cannot pause unknown animation");
            return false;
        };
        if resume_if_paused && animation.is_paused() {
            return self.play(id);
        }
        animation.set_paused(true);
        true
    }

    /// Deregister without touching the timer. Finish callbacks do not fire.
    pub fn stop(&mut self, id: AnimationId) -> bool {
        self.deregister(id)
    }

    /// Swap origin and destination. Groups reverse every member.
    pub fn reverse(&mut self, id: AnimationId) -> bool {
        let members = match self.animations.get_mut(id).map(Animation::kind_mut) {
            None => {
                tracing::warn!(?id, "Cannot reverse unknown animation");
                return false;
            }
            Some(AnimationKind::Group(group)) => group.members().collect::<SmallVec<[_; 8]>>(),
            Some(kind) => {
                if let Some(tween) = kind.as_tween_mut() {
                    tween.reverse();
                }
                return true;
            }
        };
        for member in members {
            self.reverse(member);
        }
        true
    }

    /// Write the value for `progress` without touching the timer.
    ///
    /// Groups map the progress onto each member's own delay and duration.
    pub fn sample(&mut self, id: AnimationId, progress: f32) -> bool {
        let progress = progress.clamp(0.0, 1.0);
        let Some(animation) = self.animations.get_mut(id) else {
            tracing::warn!(?id, "Cannot sample unknown animation");
            return false;
        };
        let easing = animation.easing();
        let elapsed = progress * animation.duration();
        let members = match animation.kind_mut() {
            AnimationKind::Group(group) => group.members().collect::<SmallVec<[_; 8]>>(),
            kind => {
                if let Some(tween) = kind.as_tween_mut() {
                    if progress >= 1.0 {
                        tween.snap_end();
                    } else {
                        tween.apply(progress, &easing);
                    }
                }
                return true;
            }
        };
        for member in members {
            let local = match self.animations.get(member) {
                Some(m) => (elapsed - m.delay()) / m.duration(),
                None => continue,
            };
            self.sample(member, local);
        }
        true
    }

    // =========================================================================
    // Configuration that reaches into the arena
    // =========================================================================

    /// Bind an effect. Groups pass it to every member.
    pub fn set_effect(&mut self, id: AnimationId, curve: EffectCurve, orientation: Quat) -> bool {
        let members = match self.animations.get_mut(id).map(Animation::kind_mut) {
            None => {
                tracing::warn!(?id, "Cannot set effect on unknown animation");
                return false;
            }
            Some(AnimationKind::Group(group)) => group.members().collect::<SmallVec<[_; 8]>>(),
            Some(kind) => {
                let name = kind.name();
                let accepted = kind
                    .as_tween_mut()
                    .is_some_and(|tween| tween.set_effect(curve, orientation));
                if !accepted {
                    tracing::warn!(kind = name, "Effects are not supported on this animation kind");
                }
                return accepted;
            }
        };
        for member in members {
            self.set_effect(member, curve, orientation);
        }
        true
    }

    /// Give every member of a group the same easing
    pub fn set_group_easing(&mut self, id: AnimationId, easing: Easing) -> bool {
        let Some(members) = self.group_members(id) else {
            tracing::warn!(?id, "Group easing needs a group animation");
            return false;
        };
        for member in members {
            if let Some(animation) = self.animations.get_mut(member) {
                animation.set_easing(easing);
            }
        }
        true
    }

    /// Give every member of a group its own randomized effect
    pub fn set_group_effect<R: Rng>(
        &mut self,
        id: AnimationId,
        effect: &GroupEffect,
        rng: &mut R,
    ) -> bool {
        let Some(members) = self.group_members(id) else {
            tracing::warn!(?id, "Group effect needs a group animation");
            return false;
        };
        for member in members {
            let max = if effect.min_max < effect.max_max {
                rng.random_range(effect.min_max..=effect.max_max)
            } else {
                effect.min_max
            };
            let bounce = if effect.min_bounce < effect.max_bounce {
                rng.random_range(effect.min_bounce..effect.max_bounce)
            } else {
                effect.min_bounce
            };
            let angle = if effect.min_angle < effect.max_angle {
                rng.random_range(effect.min_angle..effect.max_angle)
            } else {
                effect.min_angle
            };
            self.set_effect(
                member,
                effect.kind.curve(max, bounce),
                Quat::from_rotation_z(angle),
            );
        }
        true
    }

    fn group_members(&self, id: AnimationId) -> Option<SmallVec<[AnimationId; 8]>> {
        match self.animations.get(id).map(Animation::kind) {
            Some(AnimationKind::Group(group)) => Some(group.members().collect()),
            _ => None,
        }
    }

    // =========================================================================
    // Frame driving
    // =========================================================================

    /// Advance every active animation by `dt` seconds
    pub fn tick(&mut self, dt: f32) {
        // Stops requested since the last frame, including from callbacks
        for (id, _) in std::mem::take(&mut self.pending_removal) {
            self.active.shift_remove(&id);
        }

        let active: SmallVec<[AnimationId; 16]> = self.active.iter().copied().collect();
        for id in active {
            if !self.advance(id, dt) {
                self.pending_removal.push((id, Removal::Finished));
            }
        }

        let finished = std::mem::take(&mut self.pending_removal);
        for (id, _) in &finished {
            self.active.shift_remove(id);
        }
        for (id, _) in finished {
            tracing::debug!(?id, "Animation finished");
            self.run_callbacks(id);
        }
    }

    /// Advance by the wall-clock time since the previous frame. Returns the
    /// delta used.
    pub fn tick_frame(&mut self) -> f32 {
        let now = Instant::now();
        let dt = (now - self.last_frame).as_secs_f32();
        self.last_frame = now;
        self.tick(dt);
        dt
    }

    /// Advance one animation by `dt` seconds and write its value.
    ///
    /// Returns `false` once the animation has finished (the destination has
    /// been snapped), `true` while it should stay scheduled.
    pub fn advance(&mut self, id: AnimationId, dt: f32) -> bool {
        self.fit_group_duration(id);
        let Some(animation) = self.animations.get_mut(id) else {
            return false;
        };
        match animation.step(dt) {
            Step::Paused => true,
            Step::Delayed => {
                self.apply_progress(id, 0.0);
                true
            }
            Step::Running(progress) => {
                self.apply_progress(id, progress);
                true
            }
            Step::Finished => {
                self.snap_end(id);
                false
            }
        }
    }

    fn apply_progress(&mut self, id: AnimationId, progress: f32) {
        let Some(animation) = self.animations.get_mut(id) else {
            return;
        };
        let easing = animation.easing();
        let duration = animation.duration();
        let (delta, pending) = match animation.kind_mut() {
            AnimationKind::Group(group) => (group.take_delta(progress, duration), group.pending()),
            kind => {
                if let Some(tween) = kind.as_tween_mut() {
                    tween.apply(progress, &easing);
                }
                return;
            }
        };

        let mut done: SmallVec<[usize; 8]> = SmallVec::new();
        for (index, member) in pending {
            if !self.advance(member, delta) {
                done.push(index);
            }
        }
        if let Some(AnimationKind::Group(group)) = self.animations.get_mut(id).map(Animation::kind_mut) {
            for index in done {
                group.mark_finished(index);
            }
        }
    }

    /// Snap to the destination. Groups snap every member and get ready for
    /// another run.
    fn snap_end(&mut self, id: AnimationId) {
        let members = match self.animations.get_mut(id).map(Animation::kind_mut) {
            None => return,
            Some(AnimationKind::Group(group)) => {
                group.reset();
                group.members().collect::<SmallVec<[_; 8]>>()
            }
            Some(kind) => {
                if let Some(tween) = kind.as_tween_mut() {
                    tween.snap_end();
                }
                return;
            }
        };
        for member in members {
            self.snap_end(member);
            if let Some(animation) = self.animations.get_mut(member) {
                animation.rewind();
            }
        }
    }

    /// Rewind the timer, recursing into group members. Groups are refitted
    /// to their members before their own timer is rewound.
    fn rewind(&mut self, id: AnimationId) -> bool {
        let Some(members) = self.group_members(id) else {
            let Some(animation) = self.animations.get_mut(id) else {
                return false;
            };
            animation.rewind();
            return true;
        };
        for &member in &members {
            self.rewind(member);
        }
        self.fit_group_duration(id);
        if let Some(animation) = self.animations.get_mut(id) {
            if let AnimationKind::Group(group) = animation.kind_mut() {
                group.reset();
            }
            animation.rewind();
        }
        true
    }

    /// Seconds until the last of `members` ends, delays included
    pub(crate) fn members_span(&self, members: &[AnimationId]) -> f32 {
        members
            .iter()
            .filter_map(|&member| self.animations.get(member))
            .map(|member| member.delay() + member.duration())
            .fold(0.0, f32::max)
    }

    /// Keep a group as long as its longest member, so a member delay
    /// changed after grouping still plays out in full
    fn fit_group_duration(&mut self, id: AnimationId) {
        let Some(members) = self.group_members(id) else {
            return;
        };
        let span = self.members_span(&members).max(MIN_DURATION);
        if let Some(group) = self.animations.get_mut(id) {
            if group.duration() != span {
                tracing::debug!(?id, from = group.duration(), to = span, "Group duration refitted");
                group.set_duration(span);
            }
        }
    }

    /// Hand `members` over to `group`: they leave the active set and can no
    /// longer be played on their own
    pub(crate) fn adopt(&mut self, group: AnimationId, members: &[AnimationId]) {
        for &member in members {
            if let Some(animation) = self.animations.get_mut(member) {
                animation.parent = Some(group);
            }
            self.active.shift_remove(&member);
            self.pending_removal.retain(|(pending, _)| *pending != member);
        }
    }

    fn run_callbacks(&mut self, id: AnimationId) {
        let (mut callbacks, epoch): (Callbacks, u32) = match self.animations.get_mut(id) {
            Some(animation) => (
                std::mem::take(&mut animation.on_finish),
                animation.callback_epoch,
            ),
            None => return,
        };
        for callback in callbacks.iter_mut() {
            callback(self, id);
            if self.callbacks_cleared(id, epoch) {
                break;
            }
        }
        // Keep callbacks added while these ran, after the existing ones,
        // unless one of them cleared the list
        if let Some(animation) = self.animations.get_mut(id) {
            if animation.callback_epoch == epoch {
                let added = std::mem::take(&mut animation.on_finish);
                callbacks.extend(added);
                animation.on_finish = callbacks;
            }
        }
    }

    fn callbacks_cleared(&self, id: AnimationId, epoch: u32) -> bool {
        self.animations
            .get(id)
            .map_or(true, |animation| animation.callback_epoch != epoch)
    }
}

impl Default for AnimationScheduler {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Chainable configuration for a stored animation
pub struct AnimationRef<'a> {
    scheduler: &'a mut AnimationScheduler,
    id: AnimationId,
}

impl<'a> AnimationRef<'a> {
    pub fn id(&self) -> AnimationId {
        self.id
    }

    pub fn delay(self, delay: f32) -> Self {
        if let Some(animation) = self.scheduler.get_mut(self.id) {
            animation.set_delay(delay);
        }
        self
    }

    pub fn easing(self, easing: Easing) -> Self {
        if let Some(animation) = self.scheduler.get_mut(self.id) {
            animation.set_easing(easing);
        }
        self
    }

    pub fn effect(self, curve: EffectCurve, orientation: Quat) -> Self {
        self.scheduler.set_effect(self.id, curve, orientation);
        self
    }

    pub fn looping(self, mode: LoopMode) -> Self {
        if let Some(animation) = self.scheduler.get_mut(self.id) {
            animation.set_loop_mode(mode);
        }
        self
    }

    pub fn on_finish(
        self,
        callback: impl FnMut(&mut AnimationScheduler, AnimationId) + 'static,
    ) -> Self {
        if let Some(animation) = self.scheduler.get_mut(self.id) {
            animation.set_callback(callback);
        }
        self
    }

    /// Start playing and hand back the id
    pub fn play(self) -> AnimationId {
        self.scheduler.play(self.id);
        self.id
    }

    pub fn play_reverse(self) -> AnimationId {
        self.scheduler.play_reverse(self.id);
        self.id
    }

    /// Give back the scheduler borrow
    pub fn scheduler(self) -> &'a mut AnimationScheduler {
        self.scheduler
    }
}

// ============================================================================
// Handle
// ============================================================================

/// Shared handle to a scheduler living on the update thread
#[derive(Clone)]
pub struct SchedulerHandle {
    inner: Rc<RefCell<AnimationScheduler>>,
}

impl SchedulerHandle {
    pub fn new(scheduler: AnimationScheduler) -> Self {
        Self {
            inner: Rc::new(RefCell::new(scheduler)),
        }
    }

    /// Run `f` with exclusive access to the scheduler.
    ///
    /// # Panics
    ///
    /// Panics when called re-entrantly, e.g. from a finish callback. Callbacks
    /// receive the scheduler as an argument; use that instead.
    pub fn with<R>(&self, f: impl FnOnce(&mut AnimationScheduler) -> R) -> R {
        f(&mut self.inner.borrow_mut())
    }

    /// Like [`with`](Self::with), but returns `None` instead of panicking
    /// when the scheduler is already borrowed
    pub fn try_with<R>(&self, f: impl FnOnce(&mut AnimationScheduler) -> R) -> Option<R> {
        let mut guard = self.inner.try_borrow_mut().ok()?;
        Some(f(&mut guard))
    }

    pub fn tick(&self, dt: f32) {
        self.with(|scheduler| scheduler.tick(dt));
    }

    pub fn tick_frame(&self) -> f32 {
        self.with(AnimationScheduler::tick_frame)
    }

    pub fn has_active_animations(&self) -> bool {
        self.inner.borrow().has_active_animations()
    }

    /// True when both handles point at the same scheduler
    pub fn ptr_eq(&self, other: &SchedulerHandle) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

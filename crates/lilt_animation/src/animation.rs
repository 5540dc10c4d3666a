//! Animation state machine
//!
//! An [`Animation`] pairs one variant payload ([`AnimationKind`]) with the
//! timing state every variant shares: duration, delay, normalized timer,
//! pause flag, easing and finish callbacks.
//!
//! The timer is normalized to the duration. A delay is stored as a negative
//! head start, so the timer sits below zero until the delay has elapsed,
//! runs through `[0, 1)` while the animation is live, and reaching `1`
//! finishes the run.

use crate::easing::Easing;
use crate::group::GroupTween;
use crate::scheduler::{AnimationId, AnimationScheduler};
use crate::tween::{BezierTween, ColorTween, PositionTween, RotationTween, ScaleTween, Tween};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

/// Durations are clamped to this floor so the timer never divides by zero
pub const MIN_DURATION: f32 = 1e-7;

/// Callback fired once when an animation finishes inside the scheduler.
///
/// It receives the scheduler and the id of the animation that finished, so it
/// can replay it, start other animations, or touch host objects it captured.
pub type FinishCallback = Box<dyn FnMut(&mut AnimationScheduler, AnimationId)>;

pub(crate) type Callbacks = SmallVec<[FinishCallback; 2]>;

/// How an animation repeats when it finishes
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoopMode {
    #[default]
    None,
    /// Replay from the start
    Loop,
    /// Swap direction, then replay
    PingPong,
}

/// Variant payload of an animation
pub enum AnimationKind {
    Position(PositionTween),
    Bezier(BezierTween),
    Scale(ScaleTween),
    Rotation(RotationTween),
    Color(ColorTween),
    Group(GroupTween),
}

impl AnimationKind {
    pub fn name(&self) -> &'static str {
        match self {
            AnimationKind::Position(_) => "position",
            AnimationKind::Bezier(_) => "bezier",
            AnimationKind::Scale(_) => "scale",
            AnimationKind::Rotation(_) => "rotation",
            AnimationKind::Color(_) => "color",
            AnimationKind::Group(_) => "group",
        }
    }

    pub fn is_group(&self) -> bool {
        matches!(self, AnimationKind::Group(_))
    }

    /// Leaf behaviour, `None` for groups
    pub(crate) fn as_tween_mut(&mut self) -> Option<&mut dyn Tween> {
        match self {
            AnimationKind::Position(t) => Some(t),
            AnimationKind::Bezier(t) => Some(t),
            AnimationKind::Scale(t) => Some(t),
            AnimationKind::Rotation(t) => Some(t),
            AnimationKind::Color(t) => Some(t),
            AnimationKind::Group(_) => None,
        }
    }
}

/// Outcome of advancing an animation's timer
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Step {
    /// Paused, nothing written
    Paused,
    /// Still inside the delay; the origin value should be held
    Delayed,
    /// Live at the given progress in `[0, 1)`
    Running(f32),
    /// Reached the end; the destination should be snapped
    Finished,
}

/// A single animation: timing state plus a variant payload
pub struct Animation {
    kind: AnimationKind,
    duration: f32,
    delay: f32,
    timer: f32,
    paused: bool,
    easing: Easing,
    pub(crate) on_finish: Callbacks,
    /// Bumped by `clear_callbacks`, so a clear issued while the callbacks
    /// are running is not undone when they are put back
    pub(crate) callback_epoch: u32,
    /// Group that drives this animation, if any
    pub(crate) parent: Option<AnimationId>,
}

impl Animation {
    pub fn new(kind: AnimationKind, duration: f32) -> Self {
        Self {
            kind,
            duration: duration.max(MIN_DURATION),
            delay: 0.0,
            timer: 0.0,
            paused: false,
            easing: Easing::Linear,
            on_finish: SmallVec::new(),
            callback_epoch: 0,
            parent: None,
        }
    }

    pub fn kind(&self) -> &AnimationKind {
        &self.kind
    }

    pub fn kind_mut(&mut self) -> &mut AnimationKind {
        &mut self.kind
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }

    pub fn delay(&self) -> f32 {
        self.delay
    }

    /// Normalized timer; negative while delayed
    pub fn timer(&self) -> f32 {
        self.timer
    }

    /// Timer clamped to `[0, 1]`
    pub fn progress(&self) -> f32 {
        self.timer.clamp(0.0, 1.0)
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn easing(&self) -> Easing {
        self.easing
    }

    pub fn callback_count(&self) -> usize {
        self.on_finish.len()
    }

    /// The group this animation is a member of
    pub fn parent_group(&self) -> Option<AnimationId> {
        self.parent
    }

    /// Set the delay before the animation starts moving.
    ///
    /// Rewinds the timer to the start of the delay.
    pub fn set_delay(&mut self, delay: f32) -> &mut Self {
        self.delay = delay.max(0.0);
        self.rewind();
        self
    }

    /// Set the easing (progress modifier)
    pub fn set_easing(&mut self, easing: Easing) -> &mut Self {
        self.easing = easing;
        self
    }

    /// Append a finish callback. Earlier callbacks are kept.
    pub fn set_callback(
        &mut self,
        callback: impl FnMut(&mut AnimationScheduler, AnimationId) + 'static,
    ) -> &mut Self {
        self.on_finish.push(Box::new(callback));
        self
    }

    /// Repeat on finish, swapping direction first when `ping_pong` is set
    pub fn set_loop(&mut self, ping_pong: bool) -> &mut Self {
        self.set_callback(move |scheduler, id| {
            if ping_pong {
                scheduler.reverse(id);
            }
            scheduler.play(id);
        })
    }

    pub fn set_loop_mode(&mut self, mode: LoopMode) -> &mut Self {
        match mode {
            LoopMode::None => self,
            LoopMode::Loop => self.set_loop(false),
            LoopMode::PingPong => self.set_loop(true),
        }
    }

    /// Drop every finish callback, loop behaviour included. Called from a
    /// running callback, the callbacks after it in the same run are skipped.
    pub fn clear_callbacks(&mut self) -> &mut Self {
        self.on_finish.clear();
        self.callback_epoch = self.callback_epoch.wrapping_add(1);
        self
    }

    pub fn with_delay(mut self, delay: f32) -> Self {
        self.set_delay(delay);
        self
    }

    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    pub fn with_loop(mut self, mode: LoopMode) -> Self {
        self.set_loop_mode(mode);
        self
    }

    pub fn with_callback(
        mut self,
        callback: impl FnMut(&mut AnimationScheduler, AnimationId) + 'static,
    ) -> Self {
        self.set_callback(callback);
        self
    }

    /// Put the timer back at the start of the delay
    pub fn rewind(&mut self) {
        self.timer = -self.delay / self.duration;
    }

    pub(crate) fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    /// Change the duration, keeping the seconds already elapsed
    pub(crate) fn set_duration(&mut self, duration: f32) {
        let duration = duration.max(MIN_DURATION);
        let factor = self.duration / duration;
        self.timer *= factor;
        if let AnimationKind::Group(group) = &mut self.kind {
            group.rescale(factor);
        }
        self.duration = duration;
    }

    /// Advance the timer by `dt` seconds
    pub fn step(&mut self, dt: f32) -> Step {
        if self.paused {
            return Step::Paused;
        }
        self.timer += dt / self.duration;
        if self.timer < 0.0 {
            Step::Delayed
        } else if self.timer < 1.0 {
            Step::Running(self.timer)
        } else {
            Step::Finished
        }
    }
}

impl fmt::Debug for Animation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Animation")
            .field("kind", &self.kind.name())
            .field("duration", &self.duration)
            .field("delay", &self.delay)
            .field("timer", &self.timer)
            .field("paused", &self.paused)
            .field("easing", &self.easing)
            .field("callbacks", &self.on_finish.len())
            .field("parent", &self.parent)
            .finish()
    }
}

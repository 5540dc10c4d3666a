//! Lilt Animation System
//!
//! Tweens for 2D transform-like properties, driven by a frame scheduler.
//!
//! # Features
//!
//! - **Tweens**: position (straight or Bezier), scale, rotation (shortest arc
//!   or multi-turn angle) and color, written straight to host objects
//! - **Easing**: CSS-like curves, power and sine families, cubic-bezier
//! - **Effects**: spring, wave and explosion offsets layered on top of a tween
//! - **Playback**: delay, pause, reverse, loop and ping-pong
//! - **Groups**: many animations on one shared timeline
//! - **Deferred removal**: finishing or stopping never disturbs the frame in
//!   progress
//!
//! # Example
//!
//! ```rust
//! use lilt_animation::{AnimationScheduler, Easing};
//! use lilt_core::{RectNode, ScreenMetrics, Vec2};
//!
//! let metrics = ScreenMetrics::new(1000.0, 1000.0).unwrap();
//! let mut scheduler = AnimationScheduler::with_metrics(metrics).unwrap();
//! let node = RectNode::new().shared();
//!
//! scheduler
//!     .move_between(node.clone(), Vec2::ZERO, Vec2::ONE, 1.0)
//!     .unwrap()
//!     .easing(Easing::EaseOut)
//!     .play();
//!
//! scheduler.tick(1.0);
//! assert_eq!(node.borrow().anchored_position, Vec2::new(1000.0, 1000.0));
//! ```

pub mod animation;
pub mod authoring;
pub mod easing;
pub mod effect;
pub mod error;
mod factory;
pub mod group;
pub mod scheduler;
pub mod tween;

pub use animation::{Animation, AnimationKind, FinishCallback, LoopMode, Step, MIN_DURATION};
pub use authoring::{
    AnimationDescriptor, AnimationSheet, AnimationType, EasingKind, EffectChoice, TargetResolver,
};
pub use easing::Easing;
pub use effect::{BezierPath, EffectCurve, EffectKind, Perturbation};
pub use error::{AnimationError, Result};
pub use group::{GroupEffect, GroupTween};
pub use scheduler::{
    init_scheduler, is_scheduler_initialized, try_get_scheduler, AnimationId, AnimationRef,
    AnimationScheduler, SchedulerHandle,
};
pub use tween::{BezierTween, ColorTween, PositionTween, RotationMode, RotationTween, ScaleTween};

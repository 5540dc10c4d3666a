//! Animation error types

use crate::scheduler::AnimationId;
use lilt_core::HostError;
use thiserror::Error;

/// Configuration errors raised while building animations.
///
/// All of these surface synchronously from constructors and factories; the
/// frame loop itself never fails.
#[derive(Error, Debug)]
pub enum AnimationError {
    /// Position animations need viewport metrics to convert coordinates
    #[error("no viewport metrics configured; call set_metrics before building position animations")]
    MissingViewport,

    #[error(transparent)]
    Host(#[from] HostError),

    /// A transform animation was requested without a transform target
    #[error("{kind} animation needs a transform target")]
    MissingTransform { kind: &'static str },

    /// A color animation was requested without a graphic target
    #[error("color animation needs a graphic target")]
    MissingGraphic,

    #[error("group animation needs at least one member")]
    EmptyGroup,

    #[error("unknown animation {0:?}")]
    UnknownAnimation(AnimationId),

    /// A group descriptor names a member that was never declared
    #[error("unknown group member '{0}'")]
    UnknownMember(String),

    /// An animation can be driven by one group at a time
    #[error("animation {member:?} already belongs to group {group:?}")]
    AlreadyGrouped {
        member: AnimationId,
        group: AnimationId,
    },

    #[error("animation {0:?} is listed twice in the same group")]
    DuplicateMember(AnimationId),

    /// Two descriptors in one sheet share a name
    #[error("duplicate animation name '{0}'")]
    DuplicateName(String),

    /// Broadcast groups can only copy single-target tweens
    #[error("animation {kind} cannot be broadcast to other targets")]
    NotBroadcastable { kind: &'static str },

    #[error("failed to parse animation descriptors: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Result type for animation operations
pub type Result<T> = std::result::Result<T, AnimationError>;

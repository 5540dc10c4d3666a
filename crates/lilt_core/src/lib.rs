//! Lilt Core
//!
//! Value types and host-boundary traits shared by the Lilt animation engine:
//!
//! - **Geometry**: `Vec2`, `Vec3`, `Quat` and `Color` with interpolation helpers
//! - **Host boundary**: `TransformTarget` / `ColorTarget` traits that the
//!   rendering host implements, plus `ScreenMetrics` for viewport conversion
//! - **In-memory hosts**: `RectNode` / `GraphicNode` for tests and headless runs
//!
//! # Example
//!
//! ```rust
//! use lilt_core::{RectNode, ScreenMetrics, TransformTarget, Vec2};
//!
//! let metrics = ScreenMetrics::new(1920.0, 1080.0).unwrap();
//! let node = RectNode::new().at(Vec2::new(40.0, 20.0));
//! let center = metrics.normalize(node.screen_position());
//! assert!((center.x - 40.0 / 1920.0).abs() < 1e-6);
//! ```

pub mod error;
pub mod geometry;
pub mod host;

pub use error::HostError;
pub use geometry::{Color, Quat, Vec2, Vec3};
pub use host::{
    ColorTarget, GraphicNode, RectNode, ScreenMetrics, SharedGraphic, SharedTransform,
    TransformTarget,
};

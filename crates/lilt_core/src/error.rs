//! Host boundary error types

use thiserror::Error;

/// Errors raised when the host cannot supply usable state
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HostError {
    /// Viewport dimensions are missing, zero, negative or not finite
    #[error("invalid viewport {width}x{height}: dimensions must be finite and positive")]
    InvalidViewport { width: f32, height: f32 },

    /// UI scale factor is zero, negative or not finite
    #[error("invalid UI scale factor {0}")]
    InvalidScaleFactor(f32),
}

/// Result type for host boundary operations
pub type Result<T> = std::result::Result<T, HostError>;

use thiserror::Error;

// Arithmetic and iteration never fail; only configuration can be rejected.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Resolution must be non-zero, got {0}x{1}")]
    ZeroResolution(u32, u32),
    #[error("Maximum iteration count must be at least 1")]
    ZeroIterations,
    #[error("Escape radius must be finite and positive, got {0}")]
    InvalidEscapeRadius(f64),
    #[error("Viewport is empty or not finite: [{0}, {1}] x [{2}, {3}]")]
    EmptyViewport(f64, f64, f64, f64),
    #[error("Zoom factor must be finite and positive, got {0}")]
    InvalidZoomFactor(f64),
    #[error("Pan offset must be finite, got ({0}, {1}) pixels")]
    InvalidPanOffset(f64, f64),
    #[error("Unknown precision mode: {0}")]
    UnknownPrecision(String),
}

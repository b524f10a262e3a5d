use thiserror::Error;

/// Errors raised by the file and configuration surface.
///
/// The estimators themselves never fail; they report degenerate input through
/// NaN / infinite TTC values instead.
#[derive(Debug, Error)]
pub enum FusionError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid glob pattern: {0}")]
    Pattern(#[from] glob::PatternError),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("need at least 2 frames, got {0}")]
    NotEnoughFrames(usize),
}

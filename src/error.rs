use thiserror::Error;

/// Failures that can surface while loading a chart description or writing output.
///
/// Layout and serialization themselves never fail; degenerate data produces a
/// degenerate but well-formed chart instead.
#[derive(Debug, Error)]
pub enum ChartError {
    #[error("failed to read chart description: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid chart JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid chart JSON5: {0}")]
    Json5(#[from] json5::Error),
    #[error("png rasterization failed: {0}")]
    Png(String),
}

pub type Result<T> = std::result::Result<T, ChartError>;

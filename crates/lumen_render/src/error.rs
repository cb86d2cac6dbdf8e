//! Error type for the output-writing paths.
//!
//! The numeric pipeline itself is infallible; only streaming pixels out
//! and encoding image files can fail.

use thiserror::Error;

/// Errors surfaced while writing render output.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The output stream rejected a write.
    #[error("image output failed: {0}")]
    Io(#[from] std::io::Error),

    /// PNG encoding or saving failed.
    #[error("png output failed: {0}")]
    Png(#[from] image::ImageError),
}

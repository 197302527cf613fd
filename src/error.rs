//! Error types for the engine.

use thiserror::Error;

use crate::registry::SnippetKey;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error("{name} duration must be a positive number of milliseconds, got {value}")]
    InvalidTiming { name: &'static str, value: f32 },

    /// A snippet's paint logic panicked; the rest of the frame was drawn.
    #[error("snippet {key} failed to paint: {message}")]
    SnippetPanicked { key: SnippetKey, message: String },
}

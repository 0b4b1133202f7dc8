//! Error types for Arbor operations.
//!
//! [`ArborError`] covers every failure that can surface from loading a tree
//! document, drawing it, dispatching interaction events, or exporting the
//! result.

use std::io;

use thiserror::Error;

/// Error returned by a card factory when it cannot build a drawable.
pub type FactoryError = Box<dyn std::error::Error>;

/// Error returned by a user event handler.
pub type HandlerError = Box<dyn std::error::Error>;

/// The main error type for Arbor operations.
///
/// # Diagnostic Variants
///
/// The `Source` variant keeps the document text next to the JSON error so
/// that a caller can point at the offending line and column.
#[derive(Debug, Error)]
pub enum ArborError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid tree document: {err}")]
    Source { err: serde_json::Error, src: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Card factory failed: {0}")]
    Factory(FactoryError),

    #[error("Handler for `{event}` failed: {error}")]
    Handler { event: String, error: HandlerError },

    #[error("Diagram has been destroyed")]
    Destroyed,

    #[error("Export error: {0}")]
    Export(Box<dyn std::error::Error>),
}

impl ArborError {
    /// Create a new `Source` error with the associated document text.
    pub fn new_source_error(err: serde_json::Error, src: impl Into<String>) -> Self {
        Self::Source {
            err,
            src: src.into(),
        }
    }
}

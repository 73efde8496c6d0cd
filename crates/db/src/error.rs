//! Error types for the store layer.

use thiserror::Error;

/// User-facing message for a missing book.
pub const BOOK_NOT_FOUND: &str = "Livro não encontrado";
/// User-facing message for a missing writer.
pub const WRITER_NOT_FOUND: &str = "Autor não encontrado";

/// Store error types surfaced to the resolver layer.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The targeted entity does not exist. The message is user-facing.
    #[error("{0}")]
    NotFound(String),

    /// A required field was missing or empty on create.
    #[error("validation error: {0}")]
    Validation(String),

    /// Underlying database failure; surfaced to callers as an internal error.
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl StoreError {
    pub fn book_not_found() -> Self {
        Self::NotFound(BOOK_NOT_FOUND.to_string())
    }

    pub fn writer_not_found() -> Self {
        Self::NotFound(WRITER_NOT_FOUND.to_string())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

use thiserror::Error;

/// Errors produced by the store. Not-found is deliberately not a variant:
/// operations on a missing ticket return `Ok(None)` / `Ok(false)` so callers
/// can render a friendly message instead of unwinding.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Invalid status '{0}'. Must be one of: pending, in_progress, ready_to_test, closed")]
    InvalidStatus(String),

    #[error("Invalid priority '{0}'. Must be one of: high, medium, low")]
    InvalidPriority(String),

    #[error("database error: {0}")]
    Storage(#[from] rusqlite::Error),
}

impl StoreError {
    /// True for the validation variants, false for storage failures.
    pub fn is_validation(&self) -> bool {
        matches!(self, StoreError::InvalidStatus(_) | StoreError::InvalidPriority(_))
    }
}

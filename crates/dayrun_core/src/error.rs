//! Recoverable core errors.
//!
//! Nothing here is fatal: every error leaves the session in a renderable state
//! and callers treat it as a logged no-op.

use thiserror::Error;

use crate::session::SessionState;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoreError {
    /// The requested day has no entry in the level catalog.
    #[error("no level configuration for day {day_id}")]
    ConfigNotFound { day_id: u32 },

    /// The requested transition is not reachable from the current state.
    #[error("invalid session transition from {from}: {request}")]
    InvalidTransition { from: SessionState, request: String },
}

pub type CoreResult<T> = Result<T, CoreError>;

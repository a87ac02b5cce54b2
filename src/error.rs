//! Error type for the scheduling core.
//!
//! Only one kind of failure ever surfaces as a Rust `Error`: a malformed
//! request. Infeasibility and solver anomalies are not exceptional — they
//! are [`crate::model::ScheduleResult`] values with the matching status, so
//! that a caller always gets a value back from [`crate::solve`] rather than
//! having to distinguish "no schedule exists" from "the call failed".

use thiserror::Error;

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur before a solve is even attempted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The request is malformed: an unknown participant reference, a
    /// previous assignment for a non-existent match, a non-positive
    /// duration, etc. Carries every violation found, not just the first.
    #[error("invalid schedule request: {}", .0.join("; "))]
    Validation(Vec<String>),
}

impl Error {
    /// Build a validation error from a single message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(vec![msg.into()])
    }

    /// Build a validation error from a list of messages. Panics in debug
    /// builds if the list is empty, since an empty validation error would
    /// be indistinguishable from success.
    pub fn validation_many(messages: Vec<String>) -> Self {
        debug_assert!(!messages.is_empty(), "validation error with no messages");
        Self::Validation(messages)
    }
}

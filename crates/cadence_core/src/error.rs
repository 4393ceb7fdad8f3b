//! Scheduler error types

use thiserror::Error;

use crate::driver::TweenStatus;

/// Errors returned by scheduler and operation calls
///
/// Stale operation handles never produce an error; every call on an expired
/// handle is a silent no-op.
#[derive(Error, Debug)]
pub enum TweenError {
    /// A lifecycle transition was requested from a state that does not allow it
    #[error("Invalid tween state: expected {expected}, found {actual:?}")]
    InvalidState {
        expected: &'static str,
        actual: TweenStatus,
    },

    /// A builder or operation argument was rejected
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A weak scheduler handle outlived its scheduler
    #[error("Scheduler has been dropped")]
    SchedulerDropped,

    /// Scheduler configuration failed to parse
    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),

    /// Scheduler configuration failed to serialize
    #[error("Config serialization error: {0}")]
    ConfigWrite(#[from] toml::ser::Error),
}

impl TweenError {
    pub(crate) fn invalid_state(expected: &'static str, actual: TweenStatus) -> Self {
        Self::InvalidState { expected, actual }
    }

    /// Shorthand for [`TweenError::InvalidArgument`]
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }
}

/// Result type for scheduler operations
pub type Result<T> = std::result::Result<T, TweenError>;

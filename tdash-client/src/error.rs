//! Error types for the workflow client
//!
//! Three-way taxonomy: `Validation` for preconditions violated before any
//! network call, `Transfer` for network/server failures (including parsed
//! `success: false` bodies), and `Busy` for overlapping operations.

use thiserror::Error;

/// Result type for workflow client operations
pub type WorkflowResult<T> = std::result::Result<T, WorkflowError>;

/// Workflow client errors
#[derive(Debug, Clone, Error)]
pub enum WorkflowError {
    /// Precondition violated before any network call was issued
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Network or server failure. `status` is the HTTP status when one was
    /// received; `None` for connection-level failures.
    #[error("Transfer failed{}: {message}", status_suffix(.status))]
    Transfer {
        status: Option<u16>,
        message: String,
    },

    /// Another workflow operation is in flight
    #[error("Operation rejected, {0} already in progress")]
    Busy(&'static str),
}

impl WorkflowError {
    /// Transfer failure from a server-supplied error message
    pub fn transfer(status: Option<u16>, message: impl Into<String>) -> Self {
        WorkflowError::Transfer {
            status,
            message: message.into(),
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, WorkflowError::Validation(_))
    }

    pub fn is_busy(&self) -> bool {
        matches!(self, WorkflowError::Busy(_))
    }
}

impl From<reqwest::Error> for WorkflowError {
    fn from(err: reqwest::Error) -> Self {
        WorkflowError::Transfer {
            status: err.status().map(|s| s.as_u16()),
            message: err.to_string(),
        }
    }
}

fn status_suffix(status: &Option<u16>) -> String {
    match status {
        Some(code) => format!(" ({})", code),
        None => String::new(),
    }
}

//! tdash-client library interface
//!
//! Client-side workflow controller for the trade-history processing
//! service: typed transfer operations, session-scoped selection state,
//! and the upload → select → process → outputs orchestration.

pub mod error;
pub mod models;
pub mod services;

pub use error::{WorkflowError, WorkflowResult};

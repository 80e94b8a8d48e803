//! Shared API types for the processing service wire contract

pub mod types;

pub use types::*;

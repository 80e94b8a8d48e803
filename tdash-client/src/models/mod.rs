//! Data models for the workflow client

pub mod process;
pub mod selection;
pub mod session;

pub use process::{ProcessConfig, ProcessOutcome, StepStatus, UploadReport, UploadStep};
pub use selection::{
    ConfirmedSelection, LocalFileHandle, PendingSelection, SelectFor, UploadKind,
};
pub use session::{RunState, StateTransition, WorkflowSession};

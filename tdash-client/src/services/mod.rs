//! Service layer for the workflow client

pub mod selection_store;
pub mod transfer_client;
pub mod workflow_controller;

pub use selection_store::SelectionStore;
pub use transfer_client::{CleanupTarget, HttpTransferClient, TransferApi};
pub use workflow_controller::WorkflowController;

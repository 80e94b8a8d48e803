//! Workflow controller
//!
//! Orchestrates the upload → select → process → outputs sequence over a
//! [`TransferApi`], mutating an injected [`SelectionStore`] and exposing
//! read-only snapshots for presentation.
//!
//! One workflow run is active at a time: controller state lives behind an
//! `RwLock`, and operations invoked while a run is in a busy state are
//! rejected with [`WorkflowError::Busy`] rather than interleaved. The
//! controller never retries on its own; every failure reaches the caller
//! with its original message and is logged for diagnostics.

use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::error::{WorkflowError, WorkflowResult};
use crate::models::{
    ConfirmedSelection, LocalFileHandle, PendingSelection, ProcessConfig, ProcessOutcome,
    RunState, SelectFor, StepStatus, UploadKind, UploadReport, UploadStep, WorkflowSession,
};
use crate::services::selection_store::SelectionStore;
use crate::services::transfer_client::{CleanupTarget, TransferApi};
use tdash_common::api::RemoteFileRecord;

/// Session-scoped workflow state guarded by the controller lock
struct ControllerState {
    store: SelectionStore,
    session: WorkflowSession,
    last_inputs: Vec<RemoteFileRecord>,
    last_outputs: Vec<RemoteFileRecord>,
}

/// Orchestrates one client session's workflow runs
pub struct WorkflowController<T: TransferApi> {
    transfer: T,
    inner: RwLock<ControllerState>,
}

impl<T: TransferApi> WorkflowController<T> {
    /// The store is injected so its lifecycle is tied to the session, not
    /// to the process.
    pub fn new(transfer: T, store: SelectionStore) -> Self {
        Self {
            transfer,
            inner: RwLock::new(ControllerState {
                store,
                session: WorkflowSession::new(),
                last_inputs: Vec::new(),
                last_outputs: Vec::new(),
            }),
        }
    }

    pub fn transfer(&self) -> &T {
        &self.transfer
    }

    // ========================================
    // Selection operations (UI-facing)
    // ========================================

    pub async fn set_pending_reference(&self, handle: LocalFileHandle) {
        self.inner.write().await.store.set_pending_reference(handle);
    }

    pub async fn set_pending_trade_history(&self, handles: Vec<LocalFileHandle>) {
        self.inner
            .write()
            .await
            .store
            .set_pending_trade_history(handles);
    }

    pub async fn select_from_listing(&self, name: impl Into<String>, category: SelectFor) {
        self.inner
            .write()
            .await
            .store
            .select_from_listing(name, category);
    }

    // ========================================
    // Snapshots (presentation-facing)
    // ========================================

    pub async fn state(&self) -> RunState {
        self.inner.read().await.session.state
    }

    pub async fn session(&self) -> WorkflowSession {
        self.inner.read().await.session.clone()
    }

    pub async fn selection(&self) -> ConfirmedSelection {
        self.inner.read().await.store.snapshot()
    }

    pub async fn pending(&self) -> PendingSelection {
        self.inner.read().await.store.pending().clone()
    }

    /// Most recently fetched inputs listing
    pub async fn inputs(&self) -> Vec<RemoteFileRecord> {
        self.inner.read().await.last_inputs.clone()
    }

    /// Most recently fetched outputs listing
    pub async fn outputs(&self) -> Vec<RemoteFileRecord> {
        self.inner.read().await.last_outputs.clone()
    }

    // ========================================
    // Workflow operations
    // ========================================

    /// Upload the pending selection: the reference file first, then the
    /// trade-history files strictly in their given order, sequentially.
    ///
    /// Fails fast with a validation error (no network calls) when the
    /// pending selection is incomplete. A failure at step *k* aborts the
    /// remaining steps; files uploaded before it stay persisted
    /// server-side with no rollback attempted, and the caller can re-list
    /// or run cleanup. Each resolved attempt (success or failure)
    /// discards its pending handle; unattempted handles stay pending.
    pub async fn upload_all(&self) -> WorkflowResult<UploadReport> {
        let plan = {
            let mut state = self.inner.write().await;
            if state.session.state.is_busy() {
                return Err(WorkflowError::Busy("a workflow operation"));
            }

            let pending = state.store.pending().clone();
            let Some(reference) = pending.reference else {
                return Err(WorkflowError::Validation(
                    "select a reference-rate file before uploading".to_string(),
                ));
            };
            if pending.trade_history.is_empty() {
                return Err(WorkflowError::Validation(
                    "select at least one trade-history file before uploading".to_string(),
                ));
            }

            state.session.transition_to(RunState::Uploading);
            info!(
                session_id = %state.session.session_id,
                trade_files = pending.trade_history.len(),
                "Upload run started"
            );

            let mut plan = vec![(UploadKind::Reference, reference)];
            plan.extend(
                pending
                    .trade_history
                    .into_iter()
                    .map(|handle| (UploadKind::TradeHistory, handle)),
            );
            plan
        };

        let mut report = UploadReport::default();
        let mut aborted = false;

        for (kind, handle) in plan {
            if aborted {
                report.steps.push(UploadStep {
                    kind,
                    local_name: handle.name,
                    size: handle.size,
                    status: StepStatus::Skipped,
                });
                continue;
            }

            match self.transfer.upload(&handle).await {
                Ok(server_name) => {
                    let mut state = self.inner.write().await;
                    state.store.confirm_upload(kind, server_name.clone());
                    self.discard_resolved(&mut state.store, kind, &handle);
                    report.steps.push(UploadStep {
                        kind,
                        local_name: handle.name,
                        size: handle.size,
                        status: StepStatus::Uploaded { server_name },
                    });
                }
                Err(error) => {
                    warn!(
                        file = %handle.name,
                        error = %error,
                        "Upload failed, aborting remaining uploads"
                    );
                    let mut state = self.inner.write().await;
                    self.discard_resolved(&mut state.store, kind, &handle);
                    report.steps.push(UploadStep {
                        kind,
                        local_name: handle.name,
                        size: handle.size,
                        status: StepStatus::Failed { error },
                    });
                    aborted = true;
                }
            }
        }

        {
            let mut state = self.inner.write().await;
            if report.succeeded() {
                state.session.transition_to(RunState::AwaitingSelection);
            } else {
                state.session.transition_to(RunState::Idle);
            }
        }

        if report.succeeded() {
            info!(files = report.steps.len(), "Upload run completed");
            // Reflect server state, not just local echoes
            self.refresh_inputs_logged().await;
        }

        Ok(report)
    }

    /// Submit a processing run for the confirmed selection.
    ///
    /// The outcome's log is surfaced to the caller whether the run
    /// succeeded or not. The outputs listing is refreshed only after a
    /// successful run.
    pub async fn request_processing(
        &self,
        config: ProcessConfig,
    ) -> WorkflowResult<ProcessOutcome> {
        let (reference, trade_history) = {
            let mut state = self.inner.write().await;
            if state.session.state.is_busy() {
                return Err(WorkflowError::Busy("a workflow operation"));
            }

            config.validate()?;

            let selection = state.store.snapshot();
            let Some(reference) = selection.reference else {
                return Err(WorkflowError::Validation(
                    "a reference-rate file must be selected before processing".to_string(),
                ));
            };
            if selection.trade_history.is_empty() {
                return Err(WorkflowError::Validation(
                    "at least one trade-history file must be selected before processing"
                        .to_string(),
                ));
            }

            state.session.transition_to(RunState::Processing);
            info!(
                session_id = %state.session.session_id,
                reference = %reference,
                trade_files = selection.trade_history.len(),
                "Processing run started"
            );
            (reference, selection.trade_history)
        };

        let result = self
            .transfer
            .process(&reference, &trade_history, &config)
            .await;

        {
            // Done is transient, the run ends back in Idle
            let mut state = self.inner.write().await;
            state.session.transition_to(RunState::Done);
            state.session.transition_to(RunState::Idle);
        }

        match result {
            Ok(outcome) => {
                if outcome.succeeded {
                    info!(log_lines = outcome.logs.len(), "Processing succeeded");
                    self.refresh_outputs_logged().await;
                } else {
                    warn!(
                        error = outcome.error_message.as_deref().unwrap_or("unknown"),
                        "Processing reported failure"
                    );
                }
                Ok(outcome)
            }
            Err(error) => {
                warn!(error = %error, "Processing request failed");
                Err(error)
            }
        }
    }

    /// Delete all uploaded input files. Confirmation is a capability the
    /// caller supplies; a declined confirmation performs nothing and
    /// returns `Ok(None)`. On success the confirmed selection is reset,
    /// since the files it referred to are gone.
    pub async fn cleanup_inputs<F>(&self, confirm: F) -> WorkflowResult<Option<u64>>
    where
        F: FnOnce(&str) -> bool,
    {
        self.cleanup(CleanupTarget::Inputs, confirm).await
    }

    /// Delete all generated output files. The confirmed selection refers
    /// to inputs and is left untouched.
    pub async fn cleanup_outputs<F>(&self, confirm: F) -> WorkflowResult<Option<u64>>
    where
        F: FnOnce(&str) -> bool,
    {
        self.cleanup(CleanupTarget::Outputs, confirm).await
    }

    async fn cleanup<F>(&self, target: CleanupTarget, confirm: F) -> WorkflowResult<Option<u64>>
    where
        F: FnOnce(&str) -> bool,
    {
        let prompt = match target {
            CleanupTarget::Inputs => "Delete ALL uploaded files? This cannot be undone.",
            CleanupTarget::Outputs => "Delete ALL output files? This cannot be undone.",
        };
        if !confirm(prompt) {
            info!(kind = ?target, "Cleanup declined");
            return Ok(None);
        }

        {
            let state = self.inner.read().await;
            if state.session.state.is_busy() {
                return Err(WorkflowError::Busy("a workflow operation"));
            }
        }

        let deleted = self.transfer.cleanup(target).await?;

        match target {
            CleanupTarget::Inputs => {
                self.inner.write().await.store.reset();
                self.refresh_inputs_logged().await;
            }
            CleanupTarget::Outputs => {
                self.refresh_outputs_logged().await;
            }
        }

        Ok(Some(deleted))
    }

    // ========================================
    // Listing refreshes
    // ========================================

    pub async fn refresh_inputs(&self) -> WorkflowResult<Vec<RemoteFileRecord>> {
        let files = self.transfer.list_inputs().await?;
        self.inner.write().await.last_inputs = files.clone();
        Ok(files)
    }

    pub async fn refresh_outputs(&self) -> WorkflowResult<Vec<RemoteFileRecord>> {
        let files = self.transfer.list_outputs().await?;
        self.inner.write().await.last_outputs = files.clone();
        Ok(files)
    }

    /// Post-mutation refresh: failure is logged, never propagated to the
    /// operation that triggered it.
    async fn refresh_inputs_logged(&self) {
        if let Err(error) = self.refresh_inputs().await {
            warn!(error = %error, "Input listing refresh failed");
        }
    }

    async fn refresh_outputs_logged(&self) {
        if let Err(error) = self.refresh_outputs().await {
            warn!(error = %error, "Output listing refresh failed");
        }
    }

    fn discard_resolved(&self, store: &mut SelectionStore, kind: UploadKind, handle: &LocalFileHandle) {
        match kind {
            UploadKind::Reference => store.discard_pending_reference(),
            UploadKind::TradeHistory => store.discard_pending_trade(&handle.name),
        }
    }
}

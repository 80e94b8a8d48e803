//! Selection state container
//!
//! Pure state, no I/O. Holds the locally-chosen pending files and the
//! server-confirmed selection, and enforces the invariants relating them:
//! the trade-history selection is duplicate-free, and processing is only
//! ready once a reference file and at least one trade-history file are
//! confirmed. Inputs arrive pre-constrained by the calling layer, so
//! invariant violations here are programming errors, not user-facing
//! failures.

use tracing::debug;

use crate::models::{
    ConfirmedSelection, LocalFileHandle, PendingSelection, SelectFor, UploadKind,
};

/// Session-scoped selection state, injected into the workflow controller
#[derive(Debug, Default)]
pub struct SelectionStore {
    pending: PendingSelection,
    confirmed: ConfirmedSelection,
}

impl SelectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================
    // Pending (local) side
    // ========================================

    /// Replace the pending reference file. Last write wins: the most
    /// recent choice governs.
    pub fn set_pending_reference(&mut self, handle: LocalFileHandle) {
        debug!(file = %handle.name, size = handle.size, "Pending reference file set");
        self.pending.reference = Some(handle);
    }

    /// Replace the pending trade-history batch wholesale; a re-selection
    /// discards the previous batch.
    pub fn set_pending_trade_history(&mut self, handles: Vec<LocalFileHandle>) {
        debug!(count = handles.len(), "Pending trade-history batch set");
        self.pending.trade_history = handles;
    }

    pub fn pending(&self) -> &PendingSelection {
        &self.pending
    }

    /// Drop the pending reference handle once its upload attempt resolved
    pub(crate) fn discard_pending_reference(&mut self) {
        self.pending.reference = None;
    }

    /// Drop one pending trade handle once its upload attempt resolved.
    /// Handles whose upload was never attempted stay pending.
    pub(crate) fn discard_pending_trade(&mut self, local_name: &str) {
        if let Some(index) = self
            .pending
            .trade_history
            .iter()
            .position(|handle| handle.name == local_name)
        {
            self.pending.trade_history.remove(index);
        }
    }

    // ========================================
    // Confirmed (server) side
    // ========================================

    /// Record a server-confirmed upload. A reference upload overwrites the
    /// confirmed reference; a trade-history upload appends with set
    /// semantics (an already-present name is a no-op).
    pub fn confirm_upload(&mut self, kind: UploadKind, server_name: impl Into<String>) {
        let server_name = server_name.into();
        match kind {
            UploadKind::Reference => {
                debug!(file = %server_name, "Confirmed reference file");
                self.confirmed.reference = Some(server_name);
            }
            UploadKind::TradeHistory => {
                if self.confirmed.add_trade_history(server_name.clone()) {
                    debug!(file = %server_name, "Confirmed trade-history file");
                } else {
                    debug!(file = %server_name, "Trade-history file already selected");
                }
            }
        }
        self.check_invariants();
    }

    /// Adopt a filename from a server listing into the selection. The
    /// category is an explicit choice made at selection time.
    pub fn select_from_listing(&mut self, name: impl Into<String>, category: SelectFor) {
        let name = name.into();
        match category {
            SelectFor::Reference => self.confirm_upload(UploadKind::Reference, name),
            SelectFor::TradeHistory => self.confirm_upload(UploadKind::TradeHistory, name),
        }
    }

    /// Gate for the processing operation: reference confirmed and trade
    /// history non-empty.
    pub fn is_process_ready(&self) -> bool {
        self.confirmed.is_process_ready()
    }

    /// Back to the empty confirmed selection (after server-side cleanup of
    /// the inputs the selection referred to). Pending handles are local
    /// and survive.
    pub fn reset(&mut self) {
        debug!("Confirmed selection reset");
        self.confirmed = ConfirmedSelection::default();
    }

    /// Read-only copy for the presentation layer
    pub fn snapshot(&self) -> ConfirmedSelection {
        self.confirmed.clone()
    }

    fn check_invariants(&self) {
        debug_assert!(
            self.confirmed.is_duplicate_free(),
            "trade-history selection must stay duplicate-free"
        );
    }
}

//! File selection model
//!
//! Two parallel notions of file identity:
//! - `PendingSelection`: files chosen locally, not yet uploaded. Each
//!   handle is discarded exactly when its upload attempt resolves
//!   (success or failure); handles never attempted stay pending.
//! - `ConfirmedSelection`: server-assigned filenames ready to submit for
//!   processing, either freshly uploaded or picked from a listing.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Case-insensitive marker that recognizes a reference-rate file by
/// name. Used only for category inference at the presentation edge; the
/// store API takes an explicit [`SelectFor`].
pub const REFERENCE_MARKER: &str = "jisdor";

/// Which input category an upload or selection targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UploadKind {
    /// The single reference-rate (JISDOR) file
    Reference,
    /// One of the one-or-more trade-history files
    TradeHistory,
}

/// Explicit category choice when picking a file from a server listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectFor {
    Reference,
    TradeHistory,
}

impl SelectFor {
    /// Infer the category from the filename marker. A trade file whose
    /// name happens to contain the marker is misclassified; callers that
    /// know the category should pass it explicitly instead.
    pub fn infer(name: &str) -> Self {
        if name.to_lowercase().contains(REFERENCE_MARKER) {
            SelectFor::Reference
        } else {
            SelectFor::TradeHistory
        }
    }
}

/// A locally-chosen file, known only to this client until uploaded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalFileHandle {
    /// Local filename (the server assigns its own name on upload)
    pub name: String,
    /// Size in bytes at selection time
    pub size: u64,
    /// Where the bytes live on disk
    pub path: PathBuf,
}

impl LocalFileHandle {
    pub fn new(name: impl Into<String>, size: u64, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            size,
            path: path.into(),
        }
    }
}

/// Locally chosen files awaiting upload
#[derive(Debug, Clone, Default)]
pub struct PendingSelection {
    pub reference: Option<LocalFileHandle>,
    pub trade_history: Vec<LocalFileHandle>,
}

impl PendingSelection {
    /// Both categories populated, ready for an upload run
    pub fn is_complete(&self) -> bool {
        self.reference.is_some() && !self.trade_history.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.reference.is_none() && self.trade_history.is_empty()
    }
}

/// Server-confirmed filenames ready to submit for processing
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmedSelection {
    /// Reference-rate file, server-assigned name
    pub reference: Option<String>,

    /// Trade-history files in insertion order, no duplicates
    pub trade_history: Vec<String>,
}

impl ConfirmedSelection {
    /// Processing may be triggered iff the reference is set and at least
    /// one trade-history file is selected.
    pub fn is_process_ready(&self) -> bool {
        self.reference.is_some() && !self.trade_history.is_empty()
    }

    /// Append a trade-history filename with set semantics: a name already
    /// present is a no-op. Returns whether the name was inserted.
    pub fn add_trade_history(&mut self, name: impl Into<String>) -> bool {
        let name = name.into();
        if self.trade_history.iter().any(|existing| *existing == name) {
            return false;
        }
        self.trade_history.push(name);
        true
    }

    /// Duplicate-free check, used by store mutators as a debug assertion
    pub(crate) fn is_duplicate_free(&self) -> bool {
        let mut seen = std::collections::HashSet::new();
        self.trade_history.iter().all(|name| seen.insert(name))
    }
}

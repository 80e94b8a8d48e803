//! Shared API request/response types
//!
//! Wire contract with the trade-history processing service. All endpoints
//! are JSON over HTTP relative to a configured base URL:
//!
//! | Operation    | Method | Path                    |
//! |--------------|--------|-------------------------|
//! | upload       | POST   | `/api/upload`           |
//! | list inputs  | GET    | `/api/files`            |
//! | list outputs | GET    | `/api/outputs`          |
//! | process      | POST   | `/api/process`          |
//! | cleanup      | DELETE | `/api/cleanup`          |
//! | download     | GET    | `/api/download/{name}`  |
//! | health       | GET    | `/api/health`           |
//!
//! The service reports application-level failures as `success: false`
//! inside a 200 body; callers are responsible for normalizing those.

use serde::{Deserialize, Serialize};

// ========================================
// Listing Types
// ========================================

/// One file stored server-side, as returned by the listing endpoints.
///
/// Read-only from the client's perspective: records are redisplayed,
/// never mutated. Inputs carry `uploaded_at`, outputs carry `created_at`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteFileRecord {
    /// Server-assigned filename (canonical identity in all later requests)
    pub name: String,

    /// Size in bytes
    pub size: u64,

    /// Upload time (inputs listing), RFC-3339
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uploaded_at: Option<String>,

    /// Creation time (outputs listing), RFC-3339
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl RemoteFileRecord {
    /// Whichever timestamp the record carries, if any
    pub fn timestamp(&self) -> Option<&str> {
        self.uploaded_at
            .as_deref()
            .or(self.created_at.as_deref())
    }
}

/// Response body of `GET /api/files` and `GET /api/outputs`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileListResponse {
    pub success: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files: Option<Vec<RemoteFileRecord>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

// ========================================
// Upload Types
// ========================================

/// Response body of `POST /api/upload` (multipart field `file`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    pub success: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Server-assigned filename for the stored file (may differ from the
    /// local name; the server prefixes a timestamp)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_file: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

// ========================================
// Processing Types
// ========================================

/// Request body of `POST /api/process`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessRequest {
    /// Server filename of the reference-rate (JISDOR) file
    pub jisdor_file: String,

    /// Server filenames of the trade-history files, in submission order
    pub trade_history_files: Vec<String>,

    /// User-entered rate parameters
    pub config: RateConfigBody,
}

/// Rate parameters as they appear on the wire
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RateConfigBody {
    pub rate_spot: f64,
    pub rate_remote: f64,
}

/// Response body of `POST /api/process`
///
/// `logs` is delivered on success and failure alike and must be surfaced
/// either way.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessResponse {
    pub success: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Name of the generated output file, when processing succeeded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_file: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logs: Option<Vec<String>>,
}

// ========================================
// Cleanup & Health Types
// ========================================

/// Response body of `DELETE /api/cleanup`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleanupResponse {
    pub success: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Number of files deleted (0 when the stores were already empty)
    pub deleted: u64,
}

/// Response body of `GET /api/health`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub time: String,
}

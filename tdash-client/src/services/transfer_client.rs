//! HTTP transfer client
//!
//! Wraps the processing service's remote operations as typed
//! request/response calls. Owns no workflow state; its single job is
//! translating wire-level outcomes (non-2xx statuses, JSON parse
//! failures, `success: false` bodies) into [`WorkflowError::Transfer`].
//!
//! Requests carry no client-enforced timeout: once issued, a request runs
//! to completion or network failure, and cancellation is not supported.

use async_trait::async_trait;
use reqwest::{multipart, Client, Url};
use tracing::{debug, info};

use crate::error::{WorkflowError, WorkflowResult};
use crate::models::{LocalFileHandle, ProcessConfig, ProcessOutcome};
use tdash_common::api::{
    CleanupResponse, FileListResponse, HealthResponse, ProcessRequest, ProcessResponse,
    RateConfigBody, RemoteFileRecord, UploadResponse,
};

const USER_AGENT: &str = "tdash-client/0.1.0";

/// File extensions the service accepts for upload
const ALLOWED_EXTENSIONS: [&str; 3] = ["csv", "xls", "xlsx"];

/// Which server-side store a cleanup run is aimed at.
///
/// The service exposes a single `DELETE /api/cleanup` covering both
/// stores; the target drives client-side consequences only (which listing
/// gets refreshed, whether the confirmed selection resets).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleanupTarget {
    Inputs,
    Outputs,
}

/// Remote operations of the processing service
#[async_trait]
pub trait TransferApi: Send + Sync {
    /// Upload one local file; returns the server-assigned filename
    async fn upload(&self, handle: &LocalFileHandle) -> WorkflowResult<String>;

    /// List uploaded input files
    async fn list_inputs(&self) -> WorkflowResult<Vec<RemoteFileRecord>>;

    /// List generated output files
    async fn list_outputs(&self) -> WorkflowResult<Vec<RemoteFileRecord>>;

    /// Submit a processing run. A parsed response is an outcome even when
    /// the run failed; the accompanying log must reach the caller either way.
    async fn process(
        &self,
        reference: &str,
        trade_history: &[String],
        config: &ProcessConfig,
    ) -> WorkflowResult<ProcessOutcome>;

    /// Delete server-side files; returns the deleted count (0 when the
    /// stores were already empty)
    async fn cleanup(&self, target: CleanupTarget) -> WorkflowResult<u64>;

    /// Connectivity probe
    async fn health(&self) -> WorkflowResult<HealthResponse>;
}

/// Transfer client backed by reqwest
#[derive(Debug)]
pub struct HttpTransferClient {
    http_client: Client,
    base_url: Url,
}

impl HttpTransferClient {
    pub fn new(base_url: &str) -> WorkflowResult<Self> {
        let base_url = Url::parse(base_url).map_err(|e| {
            WorkflowError::Validation(format!("invalid service URL '{}': {}", base_url, e))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(WorkflowError::Validation(format!(
                "service URL '{}' cannot carry request paths",
                base_url
            )));
        }

        // No .timeout(): in-flight requests run to completion or network failure
        let http_client = Client::builder().user_agent(USER_AGENT).build()?;

        Ok(Self {
            http_client,
            base_url,
        })
    }

    /// Download URL for an output file. Pure construction, no network
    /// call; the filename is percent-encoded as a path segment.
    pub fn download_link_for(&self, name: &str) -> Url {
        self.endpoint(&["api", "download", name])
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut parts) = url.path_segments_mut() {
            parts.pop_if_empty().extend(segments);
        }
        url
    }

    async fn fetch_listing(&self, path: &'static str) -> WorkflowResult<Vec<RemoteFileRecord>> {
        let response = self
            .http_client
            .get(self.endpoint(&["api", path]))
            .send()
            .await?;

        let (status, response) = check_status(response).await?;
        let body: FileListResponse = response
            .json()
            .await
            .map_err(|e| WorkflowError::transfer(Some(status), format!("invalid listing response: {}", e)))?;

        if !body.success {
            return Err(WorkflowError::transfer(
                Some(status),
                body.error.unwrap_or_else(|| "listing failed".to_string()),
            ));
        }

        let files = body.files.unwrap_or_default();
        debug!(path, count = files.len(), "Listing fetched");
        Ok(files)
    }
}

#[async_trait]
impl TransferApi for HttpTransferClient {
    async fn upload(&self, handle: &LocalFileHandle) -> WorkflowResult<String> {
        validate_handle(handle).await?;

        let bytes = tokio::fs::read(&handle.path).await.map_err(|e| {
            WorkflowError::Validation(format!("cannot read '{}': {}", handle.path.display(), e))
        })?;

        debug!(file = %handle.name, size = bytes.len(), "Uploading file");

        let part = multipart::Part::bytes(bytes).file_name(handle.name.clone());
        let form = multipart::Form::new().part("file", part);

        let response = self
            .http_client
            .post(self.endpoint(&["api", "upload"]))
            .multipart(form)
            .send()
            .await?;

        let (status, response) = check_status(response).await?;
        let body: UploadResponse = response
            .json()
            .await
            .map_err(|e| WorkflowError::transfer(Some(status), format!("invalid upload response: {}", e)))?;

        if !body.success {
            return Err(WorkflowError::transfer(
                Some(status),
                body.error.unwrap_or_else(|| "upload failed".to_string()),
            ));
        }

        let server_name = body.output_file.ok_or_else(|| {
            WorkflowError::transfer(Some(status), "upload response missing output_file")
        })?;

        info!(local = %handle.name, server = %server_name, "File uploaded");
        Ok(server_name)
    }

    async fn list_inputs(&self) -> WorkflowResult<Vec<RemoteFileRecord>> {
        self.fetch_listing("files").await
    }

    async fn list_outputs(&self) -> WorkflowResult<Vec<RemoteFileRecord>> {
        self.fetch_listing("outputs").await
    }

    async fn process(
        &self,
        reference: &str,
        trade_history: &[String],
        config: &ProcessConfig,
    ) -> WorkflowResult<ProcessOutcome> {
        if reference.is_empty() {
            return Err(WorkflowError::Validation(
                "reference file is required".to_string(),
            ));
        }
        if trade_history.is_empty() {
            return Err(WorkflowError::Validation(
                "at least one trade history file is required".to_string(),
            ));
        }

        let request = ProcessRequest {
            jisdor_file: reference.to_string(),
            trade_history_files: trade_history.to_vec(),
            config: RateConfigBody {
                rate_spot: config.rate_spot,
                rate_remote: config.rate_remote,
            },
        };

        debug!(
            reference = %reference,
            trade_files = trade_history.len(),
            "Submitting processing request"
        );

        let response = self
            .http_client
            .post(self.endpoint(&["api", "process"]))
            .json(&request)
            .send()
            .await?;

        let (status, response) = check_status(response).await?;
        let body: ProcessResponse = response
            .json()
            .await
            .map_err(|e| WorkflowError::transfer(Some(status), format!("invalid process response: {}", e)))?;

        // A parsed body is an outcome either way; the log travels with it
        Ok(ProcessOutcome::from(body))
    }

    async fn cleanup(&self, target: CleanupTarget) -> WorkflowResult<u64> {
        let response = self
            .http_client
            .delete(self.endpoint(&["api", "cleanup"]))
            .send()
            .await?;

        let (status, response) = check_status(response).await?;
        let body: CleanupResponse = response
            .json()
            .await
            .map_err(|e| WorkflowError::transfer(Some(status), format!("invalid cleanup response: {}", e)))?;

        if !body.success {
            return Err(WorkflowError::transfer(
                Some(status),
                body.message.unwrap_or_else(|| "cleanup failed".to_string()),
            ));
        }

        info!(kind = ?target, deleted = body.deleted, "Cleanup completed");
        Ok(body.deleted)
    }

    async fn health(&self) -> WorkflowResult<HealthResponse> {
        let response = self
            .http_client
            .get(self.endpoint(&["api", "health"]))
            .send()
            .await?;

        let (status, response) = check_status(response).await?;
        response
            .json()
            .await
            .map_err(|e| WorkflowError::transfer(Some(status), format!("invalid health response: {}", e)))
    }
}

/// Pre-flight checks before any bytes go on the wire: the handle must
/// still point at a readable, non-empty file of an accepted type.
async fn validate_handle(handle: &LocalFileHandle) -> WorkflowResult<()> {
    let metadata = tokio::fs::metadata(&handle.path).await.map_err(|e| {
        WorkflowError::Validation(format!("'{}' is not readable: {}", handle.path.display(), e))
    })?;

    if metadata.len() == 0 {
        return Err(WorkflowError::Validation(format!(
            "'{}' is empty",
            handle.path.display()
        )));
    }

    if !has_allowed_extension(&handle.name) {
        return Err(WorkflowError::Validation(format!(
            "'{}' is not an accepted file type (expected .csv, .xls or .xlsx)",
            handle.name
        )));
    }

    Ok(())
}

fn has_allowed_extension(name: &str) -> bool {
    std::path::Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_lowercase();
            ALLOWED_EXTENSIONS.iter().any(|allowed| *allowed == ext)
        })
        .unwrap_or(false)
}

/// Split off the status code, turning non-2xx responses into transfer
/// failures carrying whatever body text the server produced.
async fn check_status(
    response: reqwest::Response,
) -> WorkflowResult<(u16, reqwest::Response)> {
    let status = response.status();
    if status.is_success() {
        return Ok((status.as_u16(), response));
    }

    let message = response.text().await.unwrap_or_default();
    let message = if message.trim().is_empty() {
        status.to_string()
    } else {
        message.trim().to_string()
    };
    Err(WorkflowError::transfer(Some(status.as_u16()), message))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn download_link_percent_encodes_filename() {
        let client = HttpTransferClient::new("http://localhost:8080").unwrap();
        let url = client.download_link_for("dashboard 2024 (v6).xlsx");
        assert_eq!(
            url.as_str(),
            "http://localhost:8080/api/download/dashboard%202024%20(v6).xlsx"
        );
    }

    #[test]
    fn endpoints_join_cleanly_with_and_without_trailing_slash() {
        let bare = HttpTransferClient::new("http://host:8080").unwrap();
        assert_eq!(
            bare.endpoint(&["api", "files"]).as_str(),
            "http://host:8080/api/files"
        );

        let trailing = HttpTransferClient::new("http://host:8080/").unwrap();
        assert_eq!(
            trailing.endpoint(&["api", "files"]).as_str(),
            "http://host:8080/api/files"
        );
    }

    #[test]
    fn invalid_base_url_is_a_validation_error() {
        let err = HttpTransferClient::new("not a url").unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn extension_check_accepts_spreadsheet_types_only() {
        assert!(has_allowed_extension("JISDOR_2024.csv"));
        assert!(has_allowed_extension("trades.XLSX"));
        assert!(has_allowed_extension("legacy.xls"));
        assert!(!has_allowed_extension("notes.txt"));
        assert!(!has_allowed_extension("no_extension"));
    }
}

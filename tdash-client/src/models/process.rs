//! Processing parameters and operation results

use crate::error::{WorkflowError, WorkflowResult};
use crate::models::UploadKind;
use tdash_common::api::ProcessResponse;

/// User-entered rate parameters for a processing run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProcessConfig {
    pub rate_spot: f64,
    pub rate_remote: f64,
}

impl ProcessConfig {
    /// Rates must be finite numbers; NaN and infinities come from
    /// unparseable user input and are rejected before submission.
    pub fn validate(&self) -> WorkflowResult<()> {
        if !self.rate_spot.is_finite() {
            return Err(WorkflowError::Validation(
                "rate_spot must be a finite number".to_string(),
            ));
        }
        if !self.rate_remote.is_finite() {
            return Err(WorkflowError::Validation(
                "rate_remote must be a finite number".to_string(),
            ));
        }
        Ok(())
    }
}

/// Outcome of a processing run, surfaced to the caller on success and
/// failure alike. The log always accompanies the outcome.
#[derive(Debug, Clone)]
pub struct ProcessOutcome {
    pub succeeded: bool,
    pub logs: Vec<String>,
    pub error_message: Option<String>,
    /// Name of the generated output file, when the server reported one
    pub output_file: Option<String>,
}

impl From<ProcessResponse> for ProcessOutcome {
    fn from(response: ProcessResponse) -> Self {
        Self {
            succeeded: response.success,
            logs: response.logs.unwrap_or_default(),
            error_message: response.error,
            output_file: response.output_file,
        }
    }
}

/// One step of an upload run
#[derive(Debug, Clone)]
pub struct UploadStep {
    pub kind: UploadKind,
    /// Local filename at selection time
    pub local_name: String,
    pub size: u64,
    pub status: StepStatus,
}

/// Resolution of a single upload step
#[derive(Debug, Clone)]
pub enum StepStatus {
    /// Server persisted the file under this assigned name
    Uploaded { server_name: String },
    /// The upload attempt resolved with a failure
    Failed { error: WorkflowError },
    /// Never attempted: an earlier step failed and aborted the run
    Skipped,
}

/// Per-step record of an upload run. Steps appear in execution order:
/// the reference file first, then trade-history files as given.
#[derive(Debug, Clone, Default)]
pub struct UploadReport {
    pub steps: Vec<UploadStep>,
}

impl UploadReport {
    /// Every step resolved with an upload
    pub fn succeeded(&self) -> bool {
        !self.steps.is_empty()
            && self
                .steps
                .iter()
                .all(|step| matches!(step.status, StepStatus::Uploaded { .. }))
    }

    /// The failure that aborted the run, if any
    pub fn failure(&self) -> Option<&WorkflowError> {
        self.steps.iter().find_map(|step| match &step.status {
            StepStatus::Failed { error } => Some(error),
            _ => None,
        })
    }

    /// Server-assigned names of the files that made it up, in order
    pub fn uploaded_names(&self) -> Vec<&str> {
        self.steps
            .iter()
            .filter_map(|step| match &step.status {
                StepStatus::Uploaded { server_name } => Some(server_name.as_str()),
                _ => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finite_rates_validate() {
        let config = ProcessConfig {
            rate_spot: 15500.0,
            rate_remote: 15600.0,
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn nan_and_infinite_rates_are_rejected() {
        let nan = ProcessConfig {
            rate_spot: f64::NAN,
            rate_remote: 15600.0,
        };
        assert!(nan.validate().unwrap_err().is_validation());

        let inf = ProcessConfig {
            rate_spot: 15500.0,
            rate_remote: f64::INFINITY,
        };
        assert!(inf.validate().unwrap_err().is_validation());
    }

    #[test]
    fn report_failure_and_uploaded_names() {
        let report = UploadReport {
            steps: vec![
                UploadStep {
                    kind: UploadKind::Reference,
                    local_name: "JISDOR_2024.csv".to_string(),
                    size: 10,
                    status: StepStatus::Uploaded {
                        server_name: "jisdor_001.csv".to_string(),
                    },
                },
                UploadStep {
                    kind: UploadKind::TradeHistory,
                    local_name: "trades_jan.csv".to_string(),
                    size: 20,
                    status: StepStatus::Failed {
                        error: WorkflowError::transfer(Some(500), "disk full"),
                    },
                },
                UploadStep {
                    kind: UploadKind::TradeHistory,
                    local_name: "trades_feb.csv".to_string(),
                    size: 30,
                    status: StepStatus::Skipped,
                },
            ],
        };

        assert!(!report.succeeded());
        assert!(report.failure().is_some());
        assert_eq!(report.uploaded_names(), vec!["jisdor_001.csv"]);
    }

    #[test]
    fn empty_report_has_not_succeeded() {
        assert!(!UploadReport::default().succeeded());
    }
}

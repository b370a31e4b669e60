use serde::Serialize;

use voicelead_classify::ClassificationResult;
use voicelead_core::Severity;
use voicelead_geo::DistanceResult;
use voicelead_intake::{CallData, ExtractedFields};

/// Pipeline stage names, used in error results and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Transcript,
    Fields,
    Location,
    Classification,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Transcript => write!(f, "transcript"),
            Stage::Fields => write!(f, "fields"),
            Stage::Location => write!(f, "location"),
            Stage::Classification => write!(f, "classification"),
        }
    }
}

/// Standardized error detail carried on failed results.
///
/// `severity` follows the shared triage taxonomy: connection, timeout, and
/// rate-limit failures are retryable; malformed or missing input is a data
/// error; everything else is a system error.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorInfo {
    pub error_type: String,
    pub error_message: String,
    pub severity: Severity,
}

/// Whatever stage outputs completed before a failure.
///
/// Retained on every error result so triage can see how far the request
/// got and what data it produced.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PartialOutputs {
    pub call_data: Option<CallData>,
    pub extraction: Option<ExtractedFields>,
    pub location: Option<DistanceResult>,
    pub classification: Option<ClassificationResult>,
}

/// The single object returned to the caller for one processed webhook.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ComprehensiveResult {
    Success {
        call_data: CallData,
        extraction: ExtractedFields,
        /// `None` when the call carried no delivery address; a resolution
        /// *failure* produces the `Failure` form instead.
        location: Option<DistanceResult>,
        classification: ClassificationResult,
        processing_time_ms: u64,
    },
    Failure {
        error: ErrorInfo,
        partial: PartialOutputs,
        processing_time_ms: u64,
    },
}

impl ComprehensiveResult {
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, ComprehensiveResult::Success { .. })
    }

    #[must_use]
    pub fn processing_time_ms(&self) -> u64 {
        match self {
            ComprehensiveResult::Success {
                processing_time_ms, ..
            }
            | ComprehensiveResult::Failure {
                processing_time_ms, ..
            } => *processing_time_ms,
        }
    }
}

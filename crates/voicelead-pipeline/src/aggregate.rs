//! Pure result assembly and error-to-severity mapping. No I/O.

use voicelead_classify::{ClassificationResult, ClassifyError};
use voicelead_core::Severity;
use voicelead_geo::{DistanceResult, GeoError};
use voicelead_intake::{CallData, ExtractedFields, IntakeError};

use crate::types::{ComprehensiveResult, ErrorInfo, PartialOutputs, Stage};

/// Merge completed stage outputs into the success form.
#[must_use]
pub fn aggregate(
    call_data: CallData,
    extraction: ExtractedFields,
    location: Option<DistanceResult>,
    classification: ClassificationResult,
    processing_time_ms: u64,
) -> ComprehensiveResult {
    ComprehensiveResult::Success {
        call_data,
        extraction,
        location,
        classification,
        processing_time_ms,
    }
}

/// Wrap a stage failure and whatever outputs did complete into the error
/// form. Completed stage data is always retained for failure triage.
#[must_use]
pub fn error_result(
    error: ErrorInfo,
    partial: PartialOutputs,
    processing_time_ms: u64,
) -> ComprehensiveResult {
    ComprehensiveResult::Failure {
        error,
        partial,
        processing_time_ms,
    }
}

impl ErrorInfo {
    #[must_use]
    pub fn from_geo(stage: Stage, error: &GeoError) -> Self {
        Self {
            error_type: format!("{stage}_resolution"),
            error_message: error.to_string(),
            severity: geo_severity(error),
        }
    }

    #[must_use]
    pub fn from_classify(error: &ClassifyError) -> Self {
        Self {
            error_type: format!("{}_failure", Stage::Classification),
            error_message: error.to_string(),
            severity: classify_severity(error),
        }
    }

    #[must_use]
    pub fn from_intake(error: &IntakeError) -> Self {
        Self {
            error_type: format!("{}_extraction", Stage::Transcript),
            error_message: error.to_string(),
            severity: Severity::DataError,
        }
    }
}

/// Severity is decided by error kind, never by message sniffing.
fn geo_severity(error: &GeoError) -> Severity {
    match error {
        GeoError::Http(e) => {
            if e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error()) {
                Severity::Retryable
            } else {
                Severity::SystemError
            }
        }
        GeoError::RateLimited(_) => Severity::Retryable,
        GeoError::Unresolvable(_) | GeoError::EmptyAddress | GeoError::Deserialize { .. } => {
            Severity::DataError
        }
        GeoError::ApiError(_) | GeoError::Internal(_) => Severity::SystemError,
        GeoError::Shared(inner) => geo_severity(inner),
    }
}

fn classify_severity(error: &ClassifyError) -> Severity {
    if error.is_transient() {
        return Severity::Retryable;
    }
    match error {
        ClassifyError::Deserialize { .. }
        | ClassifyError::Invalid(_)
        | ClassifyError::BelowThreshold { .. } => Severity::DataError,
        _ => Severity::SystemError,
    }
}

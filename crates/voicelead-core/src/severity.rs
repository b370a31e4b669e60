use serde::{Deserialize, Serialize};

/// Failure severity attached to pipeline error results.
///
/// The triage views key their display and retry affordances off this
/// taxonomy, so the mapping is part of the API contract:
/// connection/timeout/rate-limit failures are [`Severity::Retryable`],
/// malformed or missing input is [`Severity::DataError`], and anything
/// unexpected is [`Severity::SystemError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Retryable,
    DataError,
    SystemError,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Retryable => write!(f, "retryable"),
            Severity::DataError => write!(f, "data_error"),
            Severity::SystemError => write!(f, "system_error"),
        }
    }
}

use thiserror::Error;

/// Errors raised during webhook intake.
#[derive(Debug, Error)]
pub enum IntakeError {
    /// The payload carries no transcript-bearing field at all. Non-fatal:
    /// the orchestrator degrades to an empty transcript so variables-only
    /// payloads still produce partial leads.
    #[error("payload contains no transcript-bearing field")]
    MissingTranscript,
}

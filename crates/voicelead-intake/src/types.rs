use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Inbound call webhook from the automated calling platform.
///
/// The platform emits three shapes depending on call outcome and account
/// settings; all transcript-bearing fields are therefore optional and shape
/// detection happens once at ingestion via [`crate::detect_shape`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebhookPayload {
    #[serde(default)]
    pub call_id: Option<String>,
    #[serde(default)]
    pub caller_number: Option<String>,
    #[serde(default)]
    pub duration_seconds: Option<u64>,
    #[serde(default)]
    pub ended_at: Option<DateTime<Utc>>,

    /// Per-turn transcript entries, when the platform provides them.
    #[serde(default)]
    pub transcript: Option<Vec<TranscriptTurnPayload>>,
    /// Pre-flattened transcript text.
    #[serde(default)]
    pub concatenated_transcript: Option<String>,
    /// Platform-generated call summary.
    #[serde(default)]
    pub summary: Option<String>,

    /// Structured variables the platform collected during the call.
    #[serde(default)]
    pub variables: serde_json::Map<String, Value>,
}

/// One transcript turn as sent by the platform.
#[derive(Debug, Clone, Deserialize)]
pub struct TranscriptTurnPayload {
    #[serde(default, alias = "role")]
    pub speaker: Option<String>,
    #[serde(alias = "message")]
    pub text: String,
}

/// Which of the known payload shapes was received.
///
/// Detection precedence is `TurnArray > Concatenated > SummaryOnly`:
/// richer structured data wins whenever both are present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PayloadShape {
    TurnArray,
    Concatenated,
    SummaryOnly,
}

/// Normalized transcript derived from a payload. Never mutated after creation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Transcript {
    pub full_text: String,
    pub turns: Vec<TranscriptTurn>,
    pub summary: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TranscriptTurn {
    pub speaker: String,
    pub text: String,
}

/// Call metadata carried through to the comprehensive result.
#[derive(Debug, Clone, Serialize)]
pub struct CallData {
    pub call_id: Option<String>,
    pub caller_number: Option<String>,
    pub duration_seconds: Option<u64>,
    pub ended_at: Option<DateTime<Utc>>,
    pub payload_shape: Option<PayloadShape>,
}

impl CallData {
    #[must_use]
    pub fn from_payload(payload: &WebhookPayload, shape: Option<PayloadShape>) -> Self {
        Self {
            call_id: payload.call_id.clone(),
            caller_number: payload.caller_number.clone(),
            duration_seconds: payload.duration_seconds,
            ended_at: payload.ended_at,
            payload_shape: shape,
        }
    }
}

//! Transcript extraction: payload shape detection and normalization.

use std::collections::HashMap;

use serde_json::Value;

use crate::error::IntakeError;
use crate::types::{PayloadShape, Transcript, TranscriptTurn, WebhookPayload};

/// Delimiter inserted between turns when flattening to `full_text`.
const TURN_DELIMITER: &str = "\n";

/// Identify which transcript-bearing shape the payload carries.
///
/// Runs once at ingestion; each variant then maps to one deterministic
/// parser in [`extract_transcript`]. Returns `None` when no
/// transcript-bearing field is populated (variables-only payloads).
#[must_use]
pub fn detect_shape(payload: &WebhookPayload) -> Option<PayloadShape> {
    if payload
        .transcript
        .as_ref()
        .is_some_and(|turns| !turns.is_empty())
    {
        return Some(PayloadShape::TurnArray);
    }
    if payload
        .concatenated_transcript
        .as_deref()
        .is_some_and(|t| !t.trim().is_empty())
    {
        return Some(PayloadShape::Concatenated);
    }
    if payload
        .summary
        .as_deref()
        .is_some_and(|s| !s.trim().is_empty())
    {
        return Some(PayloadShape::SummaryOnly);
    }
    None
}

/// Normalize a payload into a [`Transcript`].
///
/// Turn concatenation trims each turn and joins with a newline; the result
/// is idempotent — re-extracting the produced `full_text` as if it were a
/// summary-only payload reproduces the same text.
///
/// # Errors
///
/// Returns [`IntakeError::MissingTranscript`] when no transcript-bearing
/// field exists. Callers treat this as non-fatal and continue with an empty
/// transcript.
pub fn extract_transcript(payload: &WebhookPayload) -> Result<Transcript, IntakeError> {
    let shape = detect_shape(payload).ok_or(IntakeError::MissingTranscript)?;

    let transcript = match shape {
        PayloadShape::TurnArray => {
            let turns: Vec<TranscriptTurn> = payload
                .transcript
                .as_deref()
                .unwrap_or_default()
                .iter()
                .filter(|turn| !turn.text.trim().is_empty())
                .map(|turn| TranscriptTurn {
                    speaker: turn
                        .speaker
                        .as_deref()
                        .map_or_else(|| "unknown".to_string(), str::to_string),
                    text: turn.text.trim().to_string(),
                })
                .collect();
            let full_text = turns
                .iter()
                .map(|t| t.text.as_str())
                .collect::<Vec<_>>()
                .join(TURN_DELIMITER);
            Transcript {
                full_text,
                turns,
                summary: payload.summary.as_deref().map(str::trim).map(String::from),
            }
        }
        PayloadShape::Concatenated => {
            let raw = payload.concatenated_transcript.as_deref().unwrap_or("");
            Transcript {
                full_text: normalize_flat_text(raw),
                turns: Vec::new(),
                summary: payload.summary.as_deref().map(str::trim).map(String::from),
            }
        }
        PayloadShape::SummaryOnly => {
            let summary = payload.summary.as_deref().unwrap_or("").trim().to_string();
            Transcript {
                full_text: normalize_flat_text(&summary),
                turns: Vec::new(),
                summary: Some(summary),
            }
        }
    };

    Ok(transcript)
}

/// Pull the platform's structured key/value variables, flattening scalars
/// to strings. No NLP here: these values are authoritative and later
/// override anything re-derived from free text.
#[must_use]
pub fn extract_variables(payload: &WebhookPayload) -> HashMap<String, String> {
    payload
        .variables
        .iter()
        .filter_map(|(key, value)| {
            let flat = match value {
                Value::String(s) => {
                    let trimmed = s.trim();
                    if trimmed.is_empty() {
                        return None;
                    }
                    trimmed.to_string()
                }
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                Value::Null | Value::Array(_) | Value::Object(_) => return None,
            };
            Some((key.clone(), flat))
        })
        .collect()
}

/// Trim each line, drop empty lines, and rejoin with the turn delimiter.
/// Applying this to its own output is a no-op.
fn normalize_flat_text(raw: &str) -> String {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(TURN_DELIMITER)
}

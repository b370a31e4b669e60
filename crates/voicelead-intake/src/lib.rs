//! Webhook intake: payload model, transcript extraction, field extraction.
//!
//! Everything here is a pure transformation over the inbound call payload.
//! No I/O, no external calls — the same payload always produces the same
//! transcript and fields.

mod error;
mod fields;
mod transcript;
mod types;

pub use error::IntakeError;
pub use fields::{extract_fields, ExtractedFields};
pub use transcript::{detect_shape, extract_transcript, extract_variables};
pub use types::{CallData, PayloadShape, Transcript, TranscriptTurn, WebhookPayload};

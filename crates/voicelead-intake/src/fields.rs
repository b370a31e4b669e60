//! Field extraction: merge structured variables with text-derived inference.

use std::collections::HashMap;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::Serialize;

use crate::types::Transcript;

/// Classification-relevant fields derived from one call.
///
/// Every field is optional; absence is `None`, never an empty string, so the
/// classifier can distinguish "stated false" from "not mentioned."
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExtractedFields {
    pub contact_name: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    /// What the caller wants the trailer for (wedding, construction, ...).
    pub intended_use: Option<String>,
    pub event_start_date: Option<NaiveDate>,
    pub event_end_date: Option<NaiveDate>,
    pub stall_count: Option<u32>,
    pub delivery_address: Option<String>,
    pub product_interest: Vec<String>,
}

impl ExtractedFields {
    /// Event duration in days, inclusive of both endpoints. `None` unless
    /// both dates are present and ordered.
    #[must_use]
    pub fn event_duration_days(&self) -> Option<i64> {
        let (start, end) = (self.event_start_date?, self.event_end_date?);
        let days = (end - start).num_days() + 1;
        (days > 0).then_some(days)
    }
}

/// Derive fields from the transcript and the platform's variables.
///
/// Text inference is best-effort and runs first; variables are authoritative
/// and overwrite anything inferred (structured beats inferred). Pure and
/// deterministic for identical input.
#[must_use]
pub fn extract_fields(
    transcript: &Transcript,
    variables: &HashMap<String, String>,
) -> ExtractedFields {
    let mut fields = infer_from_text(&transcript.full_text);
    apply_variables(&mut fields, variables);
    fields
}

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").expect("valid regex")
});
static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:\+1[\s.-]?)?\(?\d{3}\)?[\s.-]?\d{3}[\s.-]?\d{4}").expect("valid regex")
});
static STALL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d{1,3})[\s-]*(?:stall|station|unit)s?\b").expect("valid regex")
});
static DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{4}-\d{2}-\d{2})\b").expect("valid regex"));

fn infer_from_text(text: &str) -> ExtractedFields {
    if text.trim().is_empty() {
        return ExtractedFields::default();
    }

    let mut fields = ExtractedFields {
        contact_email: EMAIL_RE.find(text).map(|m| m.as_str().to_string()),
        contact_phone: PHONE_RE.find(text).map(|m| m.as_str().to_string()),
        ..ExtractedFields::default()
    };

    if let Some(caps) = STALL_RE.captures(text) {
        fields.stall_count = caps[1].parse().ok();
    }

    // First two ISO dates in the transcript are taken as the event window.
    let mut dates = DATE_RE
        .captures_iter(text)
        .filter_map(|c| NaiveDate::parse_from_str(&c[1], "%Y-%m-%d").ok());
    fields.event_start_date = dates.next();
    fields.event_end_date = dates.next();

    fields
}

fn apply_variables(fields: &mut ExtractedFields, variables: &HashMap<String, String>) {
    let get = |keys: &[&str]| -> Option<String> {
        keys.iter()
            .find_map(|k| variables.get(*k))
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    if let Some(v) = get(&["customer_name", "contact_name", "name"]) {
        fields.contact_name = Some(v);
    }
    if let Some(v) = get(&["email", "contact_email"]) {
        fields.contact_email = Some(v);
    }
    if let Some(v) = get(&["phone", "contact_phone", "phone_number"]) {
        fields.contact_phone = Some(v);
    }
    if let Some(v) = get(&["intended_use", "usage_type", "event_type"]) {
        fields.intended_use = Some(v);
    }
    if let Some(v) = get(&["delivery_address", "delivery_location", "address"]) {
        fields.delivery_address = Some(v);
    }
    if let Some(v) = get(&["stall_count", "unit_count"]) {
        if let Ok(count) = v.parse() {
            fields.stall_count = Some(count);
        }
    }
    if let Some(v) = get(&["event_start_date", "rental_start_date", "start_date"]) {
        if let Ok(date) = NaiveDate::parse_from_str(&v, "%Y-%m-%d") {
            fields.event_start_date = Some(date);
        }
    }
    if let Some(v) = get(&["event_end_date", "rental_end_date", "end_date"]) {
        if let Ok(date) = NaiveDate::parse_from_str(&v, "%Y-%m-%d") {
            fields.event_end_date = Some(date);
        }
    }
    if let Some(v) = get(&["product_interest", "products"]) {
        fields.product_interest = v
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();
    }
}

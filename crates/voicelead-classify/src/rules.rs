//! Deterministic rule-based classifier.
//!
//! A fixed decision table over intended use, stall count, event duration,
//! and the service-area verdict. Total: every well-formed input produces a
//! result, so the fallback path never raises.

use crate::types::{ClassificationInput, ClassificationResult, LeadType};

/// Confidence attached to every rule-path result.
///
/// The table is not a probabilistic model, so a fixed mid-range constant is
/// reported instead of a value callers might mistake for calibrated
/// confidence.
pub const RULE_CONFIDENCE: f32 = 0.6;

#[derive(Debug, Clone, Copy, Default)]
pub struct RuleClassifier;

impl RuleClassifier {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Apply the decision table. Infallible by construction.
    #[must_use]
    pub fn classify(&self, input: &ClassificationInput) -> ClassificationResult {
        let (lead_type, reasoning, routing_suggestion) = decide(input);
        ClassificationResult {
            lead_type,
            confidence: RULE_CONFIDENCE,
            reasoning,
            routing_suggestion,
            used_ai: false,
        }
    }
}

fn decide(input: &ClassificationInput) -> (LeadType, String, String) {
    // Confirmed out-of-area trumps everything else. An unknown verdict
    // (None) falls through: absence of evidence is not out-of-area.
    if input.within_service_area == Some(false) {
        let distance = input
            .distance_miles
            .map_or_else(String::new, |d| format!(" ({d:.0} mi from nearest branch)"));
        return (
            LeadType::OutOfArea,
            format!("delivery point is outside every branch's service radius{distance}"),
            "refer to partner network".to_string(),
        );
    }

    let stalls = input.stall_count.unwrap_or(0);
    let duration = input.event_duration_days.unwrap_or(0);

    if stalls >= 8 || duration >= 30 {
        return (
            LeadType::Hot,
            format!("large order signal: {stalls} stalls over {duration} days"),
            "assign to senior sales".to_string(),
        );
    }

    match input.intended_use.as_deref().map(str::to_lowercase) {
        Some(ref use_case) if use_case.contains("wedding") || use_case.contains("event") => {
            if stalls >= 4 || duration >= 2 {
                (
                    LeadType::Hot,
                    format!("sized {use_case} request: {stalls} stalls, {duration} days"),
                    "assign to event sales".to_string(),
                )
            } else {
                (
                    LeadType::Qualified,
                    format!("{use_case} request without firm sizing"),
                    "standard follow-up within one business day".to_string(),
                )
            }
        }
        Some(ref use_case)
            if use_case.contains("construction") || use_case.contains("industrial") =>
        {
            (
                LeadType::Qualified,
                format!("{use_case} inquiry, {duration} day horizon"),
                "standard follow-up within one business day".to_string(),
            )
        }
        Some(use_case) => (
            LeadType::Qualified,
            format!("stated use '{use_case}' with partial details"),
            "standard follow-up within one business day".to_string(),
        ),
        None if stalls > 0 || input.event_duration_days.is_some() => (
            LeadType::Qualified,
            "sizing details provided without a stated use".to_string(),
            "standard follow-up within one business day".to_string(),
        ),
        None => (
            LeadType::Nurture,
            "no intended use or sizing captured on the call".to_string(),
            "add to nurture sequence".to_string(),
        ),
    }
}

use serde::{Deserialize, Serialize};

/// Everything the classifiers see for one call: extracted fields flattened
/// with the location verdict and the transcript summary.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ClassificationInput {
    pub intended_use: Option<String>,
    pub stall_count: Option<u32>,
    pub event_duration_days: Option<i64>,
    /// Tri-state service-area verdict; `None` means it could not be
    /// evaluated and must not be treated as out-of-area.
    pub within_service_area: Option<bool>,
    pub distance_miles: Option<f64>,
    pub product_interest: Vec<String>,
    pub transcript_summary: Option<String>,
}

/// Sales-priority bucket for a prospective customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadType {
    /// High-value, time-sensitive; route straight to a closer.
    Hot,
    /// Real demand, standard follow-up.
    Qualified,
    /// Vague or incomplete; nurture sequence.
    Nurture,
    /// Delivery point confirmed outside every branch's service radius.
    OutOfArea,
}

impl std::fmt::Display for LeadType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LeadType::Hot => write!(f, "hot"),
            LeadType::Qualified => write!(f, "qualified"),
            LeadType::Nurture => write!(f, "nurture"),
            LeadType::OutOfArea => write!(f, "out_of_area"),
        }
    }
}

/// Uniform classification output, regardless of which path produced it.
///
/// `used_ai` records provenance so downstream analytics can separate
/// model output from rule output. Always populated — the coordinator
/// never fails outward.
#[derive(Debug, Clone, Serialize)]
pub struct ClassificationResult {
    pub lead_type: LeadType,
    /// In `[0.0, 1.0]`. Rule-path results carry the fixed
    /// [`crate::RULE_CONFIDENCE`] since the decision table is not a
    /// calibrated model.
    pub confidence: f32,
    pub reasoning: String,
    pub routing_suggestion: String,
    pub used_ai: bool,
}

//! The per-request orchestrator.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};

use voicelead_classify::{ClassificationInput, Classifier, FallbackClassifier};
use voicelead_geo::{DistanceResult, LocationResolver, Resolved};
use voicelead_intake::{
    detect_shape, extract_fields, extract_transcript, extract_variables, CallData,
    ExtractedFields, IntakeError, Transcript, WebhookPayload,
};

use crate::aggregate::{aggregate, error_result};
use crate::types::{ComprehensiveResult, ErrorInfo, PartialOutputs, Stage};

/// Sequences intake → location → classification → aggregation for one
/// webhook, with all collaborators injected at construction.
///
/// Stage failures are folded into the result rather than raised: a missing
/// transcript degrades to an empty one, a location failure produces the
/// error form with every completed stage retained in `partial`, and
/// classification never fails by construction.
pub struct Pipeline<C: Classifier> {
    resolver: Arc<LocationResolver>,
    classifier: Arc<FallbackClassifier<C>>,
}

impl<C: Classifier> Pipeline<C> {
    #[must_use]
    pub fn new(resolver: Arc<LocationResolver>, classifier: Arc<FallbackClassifier<C>>) -> Self {
        Self {
            resolver,
            classifier,
        }
    }

    /// Process one call webhook end to end. Always returns a result.
    pub async fn process_webhook(&self, payload: &WebhookPayload) -> ComprehensiveResult {
        let started = Instant::now();

        let shape = detect_shape(payload);
        let transcript = match extract_transcript(payload) {
            Ok(t) => t,
            Err(e @ IntakeError::MissingTranscript) => {
                // Variables-only payloads still produce partial leads.
                debug!(error = %e, "no transcript in payload, continuing with empty text");
                Transcript::default()
            }
        };
        let variables = extract_variables(payload);
        let fields = extract_fields(&transcript, &variables);
        let call_data = CallData::from_payload(payload, shape);

        let (location, location_error) = match fields.delivery_address.as_deref() {
            Some(address) => match self.resolver.resolve(address).await {
                Ok(Resolved {
                    distance_result,
                    was_cached,
                }) => {
                    debug!(
                        branch = %distance_result.nearest_branch.id,
                        was_cached,
                        "delivery address resolved"
                    );
                    (Some(distance_result), None)
                }
                Err(e) => {
                    warn!(error = %e, "location resolution failed, continuing without verdict");
                    (None, Some(ErrorInfo::from_geo(Stage::Location, &e)))
                }
            },
            None => (None, None),
        };

        let input = build_classification_input(&fields, location.as_ref(), &transcript);
        let classification = self.classifier.classify_with_fallback(&input).await;

        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        info!(
            call_id = call_data.call_id.as_deref().unwrap_or("unknown"),
            lead_type = %classification.lead_type,
            used_ai = classification.used_ai,
            degraded = location_error.is_some(),
            elapsed_ms,
            "webhook processed"
        );

        match location_error {
            None => aggregate(call_data, fields, location, classification, elapsed_ms),
            Some(error) => error_result(
                error,
                PartialOutputs {
                    call_data: Some(call_data),
                    extraction: Some(fields),
                    location: None,
                    classification: Some(classification),
                },
                elapsed_ms,
            ),
        }
    }

    /// Resolve a delivery address for the standalone location endpoint.
    ///
    /// # Errors
    ///
    /// Propagates [`voicelead_geo::GeoError`] from the resolver.
    pub async fn resolve_location(
        &self,
        delivery_location: &str,
    ) -> Result<Resolved, voicelead_geo::GeoError> {
        self.resolver.resolve(delivery_location).await
    }
}

fn build_classification_input(
    fields: &ExtractedFields,
    location: Option<&DistanceResult>,
    transcript: &Transcript,
) -> ClassificationInput {
    ClassificationInput {
        intended_use: fields.intended_use.clone(),
        stall_count: fields.stall_count,
        event_duration_days: fields.event_duration_days(),
        within_service_area: location.and_then(|l| l.within_service_area),
        distance_miles: location.and_then(|l| l.distance_miles),
        product_interest: fields.product_interest.clone(),
        transcript_summary: transcript.summary.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn classification_input_flattens_fields_and_verdict() {
        let fields = ExtractedFields {
            intended_use: Some("wedding".to_string()),
            stall_count: Some(4),
            event_start_date: NaiveDate::from_ymd_opt(2026, 9, 12),
            event_end_date: NaiveDate::from_ymd_opt(2026, 9, 14),
            ..ExtractedFields::default()
        };
        let transcript = Transcript {
            summary: Some("caller planning a wedding".to_string()),
            ..Transcript::default()
        };

        let input = build_classification_input(&fields, None, &transcript);
        assert_eq!(input.intended_use.as_deref(), Some("wedding"));
        assert_eq!(input.event_duration_days, Some(3));
        assert_eq!(input.within_service_area, None, "no location means unknown");
        assert_eq!(
            input.transcript_summary.as_deref(),
            Some("caller planning a wedding")
        );
    }
}

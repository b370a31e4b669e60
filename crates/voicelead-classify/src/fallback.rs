//! Coordinator that tries the AI path and degrades to the rule table.

use tracing::{debug, info, warn};

use crate::error::ClassifyError;
use crate::rules::RuleClassifier;
use crate::types::{ClassificationInput, ClassificationResult};

/// A classification strategy. Implemented by [`crate::AiClassifier`] in
/// production and by in-memory stubs in tests.
pub trait Classifier {
    fn classify(
        &self,
        input: &ClassificationInput,
    ) -> impl std::future::Future<Output = Result<ClassificationResult, ClassifyError>> + Send;
}

/// AI-first classifier with a total rule fallback.
///
/// The AI path is optional: when no provider is configured (`ai: None`),
/// every call goes straight to the rule table. When it is configured, a
/// transient failure earns bounded retries before falling back, and a
/// successful result under the confidence floor is discarded in favour of
/// the rules. The fallback itself is infallible, so
/// [`FallbackClassifier::classify_with_fallback`] always yields a result.
pub struct FallbackClassifier<C: Classifier> {
    ai: Option<C>,
    rules: RuleClassifier,
    confidence_threshold: f32,
    max_retries: u32,
}

impl<C: Classifier> FallbackClassifier<C> {
    #[must_use]
    pub fn new(ai: Option<C>, confidence_threshold: f32, max_retries: u32) -> Self {
        Self {
            ai,
            rules: RuleClassifier::new(),
            confidence_threshold,
            max_retries,
        }
    }

    /// Classifies the input, never failing outward.
    pub async fn classify_with_fallback(&self, input: &ClassificationInput) -> ClassificationResult {
        let Some(ai) = &self.ai else {
            debug!("no AI provider configured, using rule classifier");
            return self.rules.classify(input);
        };

        match self.try_ai(ai, input).await {
            Ok(result) => result,
            Err(e) => {
                warn!(error = %e, "AI classification failed, falling back to rules");
                self.rules.classify(input)
            }
        }
    }

    async fn try_ai(
        &self,
        ai: &C,
        input: &ClassificationInput,
    ) -> Result<ClassificationResult, ClassifyError> {
        let mut attempt = 0;
        loop {
            match ai.classify(input).await {
                Ok(result) => {
                    if result.confidence < self.confidence_threshold {
                        // Under-floor output is treated like a failure so the
                        // rules produce something actionable instead.
                        return Err(ClassifyError::BelowThreshold {
                            confidence: result.confidence,
                            threshold: self.confidence_threshold,
                        });
                    }
                    info!(
                        lead_type = %result.lead_type,
                        confidence = result.confidence,
                        "AI classification accepted"
                    );
                    return Ok(result);
                }
                Err(e) if e.is_transient() && attempt < self.max_retries => {
                    attempt += 1;
                    warn!(error = %e, attempt, "transient AI failure, retrying");
                }
                Err(e) => return Err(e),
            }
        }
    }
}

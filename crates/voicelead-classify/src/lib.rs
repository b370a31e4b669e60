//! Lead classification: AI-assisted with a deterministic rule fallback.
//!
//! [`FallbackClassifier`] composes two [`Classifier`] implementations: the
//! [`AiClassifier`] HTTP client is tried first (bounded timeout, one retry
//! on transient failure), and the total [`RuleClassifier`] decision table
//! takes over on any AI failure, structural invalidity, or below-threshold
//! confidence. Classification never fails outward.

mod ai;
mod error;
mod fallback;
mod rules;
mod types;

pub use ai::AiClassifier;
pub use error::ClassifyError;
pub use fallback::{Classifier, FallbackClassifier};
pub use rules::{RuleClassifier, RULE_CONFIDENCE};
pub use types::{ClassificationInput, ClassificationResult, LeadType};

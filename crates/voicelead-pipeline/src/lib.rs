//! Request orchestration: sequences intake, location resolution, and
//! classification into one comprehensive lead result, and hosts the
//! cache-backed quote pricing service.

mod aggregate;
mod pipeline;
mod quote;
mod types;

pub use aggregate::{aggregate, error_result};
pub use pipeline::Pipeline;
pub use quote::{
    price_quote, quote_fingerprint, QuoteBreakdown, QuoteError, QuoteLineItem, QuoteOutcome,
    QuotePricer, QuoteRequest,
};
pub use types::{ComprehensiveResult, ErrorInfo, PartialOutputs, Stage};

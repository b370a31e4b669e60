//! Cache-backed quote pricing.
//!
//! The cache key is a sha256 fingerprint over the canonicalized request
//! fields, so formatting differences (whitespace, casing, extras order)
//! hit the same entry. Pricing itself is pure decimal arithmetic; the only
//! I/O is the location resolution feeding the delivery fee.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

use voicelead_cache::{CacheError, MemoCache};
use voicelead_geo::{normalize_address, GeoError, LocationResolver};

const BASE_DELIVERY_FEE: Decimal = Decimal::from_parts(7500, 0, 0, false, 2); // 75.00
const PER_MILE_FEE: Decimal = Decimal::from_parts(250, 0, 0, false, 2); // 2.50
const UNKNOWN_DISTANCE_FEE: Decimal = Decimal::from_parts(15000, 0, 0, false, 2); // 150.00
const FREE_DELIVERY_MILES: f64 = 25.0;

/// Inbound quote request, as posted to the quote endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteRequest {
    pub delivery_location: String,
    pub trailer_type: String,
    pub rental_start_date: NaiveDate,
    pub rental_days: u32,
    #[serde(default)]
    pub usage_type: Option<String>,
    #[serde(default)]
    pub extras: Vec<String>,
}

/// One priced extra on a quote.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuoteLineItem {
    pub name: String,
    pub price: Decimal,
}

/// Full pricing breakdown returned to the caller.
#[derive(Debug, Clone, Serialize)]
pub struct QuoteBreakdown {
    pub trailer_type: String,
    pub rental_days: u32,
    pub day_rate: Decimal,
    pub base_subtotal: Decimal,
    pub duration_discount: Decimal,
    pub delivery_fee: Decimal,
    pub delivery_distance_miles: Option<f64>,
    pub within_service_area: Option<bool>,
    pub extras: Vec<QuoteLineItem>,
    pub total: Decimal,
}

/// A pricing outcome plus cache provenance, mirroring the location
/// resolver's shape.
#[derive(Debug, Clone)]
pub struct QuoteOutcome {
    pub breakdown: QuoteBreakdown,
    pub was_cached: bool,
}

#[derive(Debug, Error)]
pub enum QuoteError {
    #[error("unknown trailer type: {0}")]
    UnknownTrailerType(String),

    #[error("rental_days must be at least 1")]
    ZeroDuration,

    /// Delivery-fee location resolution failed.
    #[error("location resolution failed: {0}")]
    Location(#[from] GeoError),

    /// A failure shared with other waiters of the same cached computation.
    #[error("{0}")]
    Shared(Arc<QuoteError>),

    #[error("internal error: {0}")]
    Internal(String),
}

/// Canonical cache key for a quote request.
///
/// Field order is fixed; the address goes through the same normalization as
/// the location cache key, casing and whitespace are folded, and extras are
/// sorted and deduplicated so their order never changes the key.
#[must_use]
pub fn quote_fingerprint(request: &QuoteRequest) -> String {
    let mut extras: Vec<String> = request
        .extras
        .iter()
        .map(|e| e.trim().to_lowercase())
        .filter(|e| !e.is_empty())
        .collect();
    extras.sort();
    extras.dedup();

    let canonical = format!(
        "{}\n{}\n{}\n{}\n{}\n{}",
        normalize_address(&request.delivery_location),
        request.trailer_type.trim().to_lowercase(),
        request.rental_start_date,
        request.rental_days,
        request
            .usage_type
            .as_deref()
            .map(|u| u.trim().to_lowercase())
            .unwrap_or_default(),
        extras.join(","),
    );
    format!("{:x}", Sha256::digest(canonical.as_bytes()))
}

fn day_rate(trailer_type: &str) -> Result<Decimal, QuoteError> {
    match trailer_type.trim().to_lowercase().as_str() {
        "standard" => Ok(Decimal::new(25000, 2)),
        "luxury" => Ok(Decimal::new(42500, 2)),
        "ada" => Ok(Decimal::new(32500, 2)),
        "shower" => Ok(Decimal::new(39500, 2)),
        other => Err(QuoteError::UnknownTrailerType(other.to_string())),
    }
}

fn extra_price(name: &str) -> Decimal {
    match name.trim().to_lowercase().as_str() {
        "generator" => Decimal::new(17500, 2),
        "hand wash station" => Decimal::new(12500, 2),
        "attendant" => Decimal::new(35000, 2),
        // Unlisted extras are carried at zero so sales can price them
        // manually rather than being silently dropped.
        _ => Decimal::ZERO,
    }
}

fn duration_discount_rate(rental_days: u32) -> Decimal {
    if rental_days >= 28 {
        Decimal::new(15, 2) // 15%
    } else if rental_days >= 7 {
        Decimal::new(10, 2) // 10%
    } else {
        Decimal::ZERO
    }
}

fn delivery_fee(distance_miles: Option<f64>) -> Decimal {
    match distance_miles {
        Some(miles) => {
            let beyond = (miles - FREE_DELIVERY_MILES).max(0.0);
            let beyond = Decimal::from_f64_retain(beyond).unwrap_or(Decimal::ZERO);
            (BASE_DELIVERY_FEE + PER_MILE_FEE * beyond).round_dp(2)
        }
        // Unroutable delivery point: flat fee, trued up at booking.
        None => UNKNOWN_DISTANCE_FEE,
    }
}

/// Price a quote from validated inputs and a resolved delivery distance.
/// Pure; all the I/O lives in [`QuotePricer::quote`].
///
/// # Errors
///
/// [`QuoteError::UnknownTrailerType`] or [`QuoteError::ZeroDuration`] when
/// the request fails validation.
pub fn price_quote(
    request: &QuoteRequest,
    distance_miles: Option<f64>,
    within_service_area: Option<bool>,
) -> Result<QuoteBreakdown, QuoteError> {
    if request.rental_days == 0 {
        return Err(QuoteError::ZeroDuration);
    }
    let rate = day_rate(&request.trailer_type)?;

    let base_subtotal = rate * Decimal::from(request.rental_days);
    let duration_discount =
        (base_subtotal * duration_discount_rate(request.rental_days)).round_dp(2);
    let delivery = delivery_fee(distance_miles);

    let extras: Vec<QuoteLineItem> = request
        .extras
        .iter()
        .map(|name| QuoteLineItem {
            name: name.trim().to_string(),
            price: extra_price(name),
        })
        .collect();
    let extras_total: Decimal = extras.iter().map(|e| e.price).sum();

    Ok(QuoteBreakdown {
        trailer_type: request.trailer_type.trim().to_lowercase(),
        rental_days: request.rental_days,
        day_rate: rate,
        base_subtotal,
        duration_discount,
        delivery_fee: delivery,
        delivery_distance_miles: distance_miles,
        within_service_area,
        extras,
        total: base_subtotal - duration_discount + delivery + extras_total,
    })
}

/// Quote pricing service with the same single-flight caching discipline as
/// the location resolver, keyed by [`quote_fingerprint`].
pub struct QuotePricer {
    resolver: Arc<LocationResolver>,
    cache: MemoCache<QuoteBreakdown, QuoteError>,
    ttl: Duration,
}

impl QuotePricer {
    #[must_use]
    pub fn new(resolver: Arc<LocationResolver>, ttl: Duration) -> Self {
        Self {
            resolver,
            cache: MemoCache::new(),
            ttl,
        }
    }

    /// Price a quote, served from cache when an identical request is fresh.
    ///
    /// # Errors
    ///
    /// Validation failures ([`QuoteError::UnknownTrailerType`],
    /// [`QuoteError::ZeroDuration`]) and location-resolution failures
    /// ([`QuoteError::Location`]).
    pub async fn quote(&self, request: &QuoteRequest) -> Result<QuoteOutcome, QuoteError> {
        // Validate before touching the cache so malformed requests never
        // occupy a slot or trigger provider calls.
        if request.rental_days == 0 {
            return Err(QuoteError::ZeroDuration);
        }
        day_rate(&request.trailer_type)?;

        let key = quote_fingerprint(request);
        let resolver = Arc::clone(&self.resolver);
        let request = request.clone();

        let lookup = self
            .cache
            .get_or_compute(&key, self.ttl, move || compute_quote(resolver, request))
            .await
            .map_err(|e| match e {
                CacheError::Compute(inner) => {
                    Arc::try_unwrap(inner).unwrap_or_else(QuoteError::Shared)
                }
                CacheError::TaskFailed => {
                    QuoteError::Internal("quote computation task aborted".to_string())
                }
            })?;

        Ok(QuoteOutcome {
            breakdown: lookup.value,
            was_cached: lookup.was_cached,
        })
    }
}

async fn compute_quote(
    resolver: Arc<LocationResolver>,
    request: QuoteRequest,
) -> Result<QuoteBreakdown, QuoteError> {
    let resolved = resolver.resolve(&request.delivery_location).await?;
    let distance = resolved.distance_result;
    price_quote(
        &request,
        distance.distance_miles,
        distance.within_service_area,
    )
}

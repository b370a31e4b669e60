//! Nearest-branch resolution backed by the memo cache.

use std::sync::Arc;
use std::time::Duration;

use voicelead_cache::{CacheError, MemoCache};
use voicelead_core::Branch;

use crate::client::GeocoderClient;
use crate::error::GeoError;
use crate::retry::retry_with_backoff;
use crate::types::{DistanceResult, GeoPoint, RouteSummary};

const METERS_PER_MILE: f64 = 1609.344;

/// A resolution outcome plus cache provenance.
///
/// `was_cached` is metadata for the caller (endpoint timing, logging); it is
/// deliberately not stored on [`DistanceResult`] so cached and fresh results
/// compare equal.
#[derive(Debug, Clone)]
pub struct Resolved {
    pub distance_result: DistanceResult,
    pub was_cached: bool,
}

/// Canonicalize a delivery address into the location cache key.
///
/// Trims, collapses internal whitespace, and uppercases. Idempotent:
/// normalizing an already-normalized address is a no-op.
#[must_use]
pub fn normalize_address(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase()
}

/// Resolves delivery addresses to the nearest service branch.
///
/// Geocodes the address, routes to every branch, and picks the branch with
/// minimum driving distance (tie-break: lower duration, then lexicographic
/// branch id, for full determinism). Results are memoized through the
/// single-flight cache so a burst of identical addresses issues exactly one
/// set of provider calls.
pub struct LocationResolver {
    client: Arc<GeocoderClient>,
    branches: Arc<Vec<Branch>>,
    cache: MemoCache<DistanceResult, GeoError>,
    ttl: Duration,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl LocationResolver {
    #[must_use]
    pub fn new(
        client: GeocoderClient,
        branches: Vec<Branch>,
        ttl: Duration,
        max_retries: u32,
        backoff_base_ms: u64,
    ) -> Self {
        Self {
            client: Arc::new(client),
            branches: Arc::new(branches),
            cache: MemoCache::new(),
            ttl,
            max_retries,
            backoff_base_ms,
        }
    }

    /// Resolve a delivery address to a [`DistanceResult`].
    ///
    /// # Errors
    ///
    /// - [`GeoError::EmptyAddress`] when the address normalizes to nothing.
    /// - [`GeoError::Unresolvable`] when the provider cannot geocode it.
    /// - Provider/network errors after the retry budget is exhausted.
    pub async fn resolve(&self, delivery_address: &str) -> Result<Resolved, GeoError> {
        let key = normalize_address(delivery_address);
        if key.is_empty() {
            return Err(GeoError::EmptyAddress);
        }

        let client = Arc::clone(&self.client);
        let branches = Arc::clone(&self.branches);
        let address = key.clone();
        let max_retries = self.max_retries;
        let backoff_base_ms = self.backoff_base_ms;

        let lookup = self
            .cache
            .get_or_compute(&key, self.ttl, move || {
                compute_distance(client, branches, address, max_retries, backoff_base_ms)
            })
            .await
            .map_err(|e| match e {
                CacheError::Compute(inner) => {
                    Arc::try_unwrap(inner).unwrap_or_else(GeoError::Shared)
                }
                CacheError::TaskFailed => {
                    GeoError::Internal("location computation task aborted".to_string())
                }
            })?;

        Ok(Resolved {
            distance_result: lookup.value,
            was_cached: lookup.was_cached,
        })
    }
}

async fn compute_distance(
    client: Arc<GeocoderClient>,
    branches: Arc<Vec<Branch>>,
    address: String,
    max_retries: u32,
    backoff_base_ms: u64,
) -> Result<DistanceResult, GeoError> {
    let point = retry_with_backoff(max_retries, backoff_base_ms, || client.geocode(&address)).await?;

    let mut routed: Vec<(Branch, RouteSummary)> = Vec::new();
    let mut saw_no_route = false;
    let mut last_err: Option<GeoError> = None;

    for branch in branches.iter() {
        let origin = GeoPoint {
            latitude: branch.latitude,
            longitude: branch.longitude,
        };
        match retry_with_backoff(max_retries, backoff_base_ms, || client.route(origin, point)).await
        {
            Ok(Some(route)) => routed.push((branch.clone(), route)),
            Ok(None) => {
                tracing::debug!(branch = %branch.id, "no drivable route to delivery point");
                saw_no_route = true;
            }
            Err(e) => {
                tracing::warn!(branch = %branch.id, error = %e, "route lookup failed");
                last_err = Some(e);
            }
        }
    }

    if let Some((branch, route)) = select_nearest(routed) {
        let distance_miles = route.distance_meters / METERS_PER_MILE;
        let within_service_area = Some(distance_miles <= branch.service_radius_miles);
        return Ok(DistanceResult {
            delivery_location: address,
            distance_miles: Some(distance_miles),
            distance_meters: Some(route.distance_meters),
            duration_seconds: Some(route.duration_seconds),
            within_service_area,
            nearest_branch: branch,
        });
    }

    // No routable branch. If every attempt errored (provider trouble) the
    // failure propagates; a genuine no-route answer degrades to the
    // unknown-distance tri-state against the crow-flight nearest branch.
    if !saw_no_route {
        if let Some(e) = last_err {
            return Err(e);
        }
    }

    let nearest = nearest_by_crow_flight(&branches, point)
        .ok_or_else(|| GeoError::Internal("no branches configured".to_string()))?;
    Ok(DistanceResult {
        delivery_location: address,
        nearest_branch: nearest.clone(),
        distance_miles: None,
        distance_meters: None,
        duration_seconds: None,
        within_service_area: None,
    })
}

/// Pick the branch with minimum driving distance. Ties break on lower
/// duration, then lexicographic branch id.
fn select_nearest(candidates: Vec<(Branch, RouteSummary)>) -> Option<(Branch, RouteSummary)> {
    candidates.into_iter().min_by(|a, b| {
        a.1.distance_meters
            .total_cmp(&b.1.distance_meters)
            .then_with(|| a.1.duration_seconds.cmp(&b.1.duration_seconds))
            .then_with(|| a.0.id.cmp(&b.0.id))
    })
}

fn nearest_by_crow_flight(branches: &[Branch], point: GeoPoint) -> Option<&Branch> {
    branches.iter().min_by(|a, b| {
        let da = haversine_miles(
            GeoPoint {
                latitude: a.latitude,
                longitude: a.longitude,
            },
            point,
        );
        let db = haversine_miles(
            GeoPoint {
                latitude: b.latitude,
                longitude: b.longitude,
            },
            point,
        );
        da.total_cmp(&db).then_with(|| a.id.cmp(&b.id))
    })
}

fn haversine_miles(a: GeoPoint, b: GeoPoint) -> f64 {
    const EARTH_RADIUS_MILES: f64 = 3958.8;
    let (lat1, lon1) = (a.latitude.to_radians(), a.longitude.to_radians());
    let (lat2, lon2) = (b.latitude.to_radians(), b.longitude.to_radians());
    let dlat = lat2 - lat1;
    let dlon = lon2 - lon1;
    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_MILES * h.sqrt().asin()
}

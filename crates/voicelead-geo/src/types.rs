use serde::{Deserialize, Serialize};
use voicelead_core::Branch;

/// A geocoded point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

/// Driving distance and duration between two points.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct RouteSummary {
    pub distance_meters: f64,
    pub duration_seconds: u64,
}

/// Outcome of resolving a delivery address against the branch network.
///
/// The distance fields are `None` when the address geocoded but no driving
/// route could be computed; `within_service_area` is then `None` as well —
/// a distinct tri-state, never coerced to `false`.
#[derive(Debug, Clone, Serialize)]
pub struct DistanceResult {
    pub delivery_location: String,
    pub nearest_branch: Branch,
    pub distance_miles: Option<f64>,
    pub distance_meters: Option<f64>,
    pub duration_seconds: Option<u64>,
    pub within_service_area: Option<bool>,
}

//! Location resolution: geocoding client, nearest-branch selection, and the
//! cache-backed service-area verdict.

mod client;
mod error;
mod resolver;
mod retry;
mod types;

pub use client::GeocoderClient;
pub use error::GeoError;
pub use resolver::{normalize_address, LocationResolver, Resolved};
pub use types::{DistanceResult, GeoPoint, RouteSummary};

//! Core types for the corridor simulation
//!
//! Identifiers, geographic points and the great-circle distance every other
//! component is built on.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A unique identifier for simulation entities
/// This is a simple wrapper around a usize for type safety
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SimId(pub usize);

/// A wrapper type for vehicle IDs
///
/// Ordering follows registration order, which is also the secondary
/// tie-break key when two vehicles share a priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VehicleId(pub SimId);

/// A wrapper type for signal IDs
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SignalId(pub SimId);

impl fmt::Display for VehicleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "V{}", self.0 .0)
    }
}

impl fmt::Display for SignalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SIG_{}", self.0 .0)
    }
}

/// A geographic point in degrees
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Great-circle surface distance in meters (haversine formula)
    ///
    /// Coordinates are not range-checked. Out-of-range input yields a
    /// meaningless but finite distance rather than an error.
    pub fn distance(&self, other: &GeoPoint) -> f64 {
        let d_lat = (other.lat - self.lat).to_radians();
        let d_lng = (other.lng - self.lng).to_radians();
        let a = (d_lat / 2.0).sin().powi(2)
            + self.lat.to_radians().cos()
                * other.lat.to_radians().cos()
                * (d_lng / 2.0).sin().powi(2);
        // Clamp guards against rounding pushing `a` past 1.0
        let a = a.clamp(0.0, 1.0);
        EARTH_RADIUS_METERS * 2.0 * a.sqrt().atan2((1.0 - a).sqrt())
    }

    /// Linear interpolation in degree space
    pub fn lerp(&self, other: &GeoPoint, t: f64) -> GeoPoint {
        GeoPoint {
            lat: self.lat + (other.lat - self.lat) * t,
            lng: self.lng + (other.lng - self.lng) * t,
        }
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.5}, {:.5})", self.lat, self.lng)
    }
}

/// Great-circle distance between two points in meters
pub fn geo_distance(a: &GeoPoint, b: &GeoPoint) -> f64 {
    a.distance(b)
}

/// Mean Earth radius used by the haversine formula
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Default distance within which a vehicle preempts a signal
pub const DEFAULT_ACTIVATION_RADIUS_METERS: f64 = 150.0;

/// Default period between ticks
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 400;

/// Default number of route points skipped before the first signal
pub const DEFAULT_SIGNAL_SAMPLE_OFFSET: usize = 40;

/// Default number of route points between consecutive signals
pub const DEFAULT_SIGNAL_SAMPLE_STRIDE: usize = 50;

/// Default delay a red signal costs a vehicle without preemption
pub const DEFAULT_SIGNAL_DELAY_SECS: f64 = 10.0;

/// Sampled signal candidates closer than this to an existing signal are merged
pub const SIGNAL_MERGE_DISTANCE_METERS: f64 = 1.0;

//! Shared helpers for building routes in tests
#![allow(dead_code)]

use green_corridor::simulation::{GeoPoint, SignalPlacement, SimConfig, EARTH_RADIUS_METERS};

/// Meters per degree of latitude (and of longitude on the equator)
pub fn meters_per_degree() -> f64 {
    EARTH_RADIUS_METERS * std::f64::consts::PI / 180.0
}

pub fn north_of(origin: GeoPoint, meters: f64) -> GeoPoint {
    GeoPoint::new(origin.lat + meters / meters_per_degree(), origin.lng)
}

/// Only exact on the equator, which is where the tests place things
pub fn east_of(origin: GeoPoint, meters: f64) -> GeoPoint {
    GeoPoint::new(origin.lat, origin.lng + meters / meters_per_degree())
}

/// A route heading due north with evenly spaced points
pub fn straight_route(start: GeoPoint, points: usize, step_meters: f64) -> Vec<GeoPoint> {
    (0..points)
        .map(|i| north_of(start, i as f64 * step_meters))
        .collect()
}

/// Config for tests that place signals by hand and tick without waiting
pub fn manual_signals_config() -> SimConfig {
    SimConfig {
        tick_interval_ms: 0,
        auto_place_signals: false,
        ..SimConfig::default()
    }
}

pub fn index_placement(offset: usize, stride: usize) -> SignalPlacement {
    SignalPlacement::ByIndex { offset, stride }
}

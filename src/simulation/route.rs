//! Route progress for a single vehicle
//!
//! A route is the ordered polyline supplied by the routing collaborator plus
//! a cursor marking how far the vehicle has travelled along it.

use super::config::SignalPlacement;
use super::error::{Result, SimError};
use super::types::{GeoPoint, VehicleId};

/// Minimum number of points a route needs before a vehicle can start
pub const MIN_ROUTE_POINTS: usize = 2;

#[derive(Debug, Clone)]
pub struct Route {
    points: Vec<GeoPoint>,
    cursor: usize,
}

impl Route {
    pub fn new(points: Vec<GeoPoint>) -> Self {
        Self { points, cursor: 0 }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[GeoPoint] {
        &self.points
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Index of the final point, or `None` for an empty route
    pub fn last_index(&self) -> Option<usize> {
        self.points.len().checked_sub(1)
    }

    /// Position of the vehicle at the current cursor
    pub fn current_point(&self) -> Option<GeoPoint> {
        self.points.get(self.cursor).copied()
    }

    pub fn is_at_end(&self) -> bool {
        match self.last_index() {
            Some(last) => self.cursor >= last,
            None => true,
        }
    }

    /// Move the cursor forward by exactly one point
    /// Returns false if the cursor was already on the final point
    pub fn advance(&mut self) -> bool {
        if self.is_at_end() {
            return false;
        }
        self.cursor += 1;
        true
    }

    /// Percentage of route points already traversed
    pub fn progress_percent(&self) -> f64 {
        match self.last_index() {
            Some(last) if last > 0 => self.cursor as f64 / last as f64 * 100.0,
            _ => 100.0,
        }
    }

    /// Total polyline length in meters
    pub fn length_meters(&self) -> f64 {
        self.points
            .windows(2)
            .map(|pair| pair[0].distance(&pair[1]))
            .sum()
    }

    /// Check the route can be driven by `vehicle`
    pub fn validate(&self, vehicle: VehicleId) -> Result<()> {
        if self.points.len() < MIN_ROUTE_POINTS {
            return Err(SimError::InvalidRoute {
                vehicle,
                points: self.points.len(),
            });
        }
        Ok(())
    }

    /// Pick the route points where signals should stand
    pub fn sample_signal_points(&self, placement: &SignalPlacement) -> Vec<GeoPoint> {
        match *placement {
            SignalPlacement::ByIndex { offset, stride } => {
                if stride == 0 {
                    return Vec::new();
                }
                self.points
                    .iter()
                    .skip(offset)
                    .step_by(stride)
                    .copied()
                    .collect()
            }
            SignalPlacement::ByArcLength {
                offset_meters,
                spacing_meters,
            } => self.sample_by_arc_length(offset_meters, spacing_meters),
        }
    }

    /// Place a signal at the first point at or beyond each multiple of
    /// `spacing_meters` past `offset_meters`
    fn sample_by_arc_length(&self, offset_meters: f64, spacing_meters: f64) -> Vec<GeoPoint> {
        let mut sampled = Vec::new();
        if spacing_meters.is_nan() || spacing_meters <= 0.0 || self.points.is_empty() {
            return sampled;
        }

        let offset = offset_meters.max(0.0);
        let mut next_mark = offset;
        let mut last_sampled: Option<f64> = None;
        let mut travelled = 0.0;
        let mut previous = self.points[0];

        for point in &self.points {
            travelled += previous.distance(point);
            previous = *point;

            let past_last = last_sampled.map_or(true, |last| travelled > last);
            if travelled >= next_mark && past_last {
                sampled.push(*point);
                last_sampled = Some(travelled);
                // First mark beyond the distance travelled, skipping any a
                // single long segment passed
                let marks_passed = ((travelled - offset) / spacing_meters).floor() + 1.0;
                next_mark = offset + marks_passed * spacing_meters;
            }
        }

        sampled
    }
}

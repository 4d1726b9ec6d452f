//! Emergency vehicle movement
//!
//! Vehicles step one route point per tick; there is no speed model and no
//! interpolation between points.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::priority::Priority;
use super::route::Route;
use super::types::{GeoPoint, SignalId, VehicleId};

/// Lifecycle of a vehicle's trip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TripStatus {
    Pending,
    Active,
    Completed,
}

/// Result of a vehicle update indicating what action should be taken
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VehicleUpdateResult {
    /// Vehicle is not active and did not move
    Idle,
    /// Vehicle moved and is still en route
    Continue,
    /// Vehicle reached the last route point this tick
    Completed,
}

/// An emergency vehicle bound to a route
#[derive(Debug, Clone)]
pub struct SimVehicle {
    pub id: VehicleId,
    /// Human-facing name, e.g. "AMB_001"
    pub label: String,
    pub priority: Priority,
    pub route: Route,
    pub status: TripStatus,
    /// Radius used by the proximity check for this vehicle
    pub activation_radius: f64,
    /// Ticks spent moving
    pub ticks_travelled: u64,
    /// Signals this vehicle held green at least once
    pub signals_preempted: BTreeSet<SignalId>,
    /// Signals this vehicle came within range of, won or lost
    pub signals_encountered: BTreeSet<SignalId>,
    pub conflicts_won: usize,
    pub conflicts_lost: usize,
}

impl SimVehicle {
    pub fn new(
        id: VehicleId,
        label: impl Into<String>,
        priority: Priority,
        route: Route,
        activation_radius: f64,
    ) -> Self {
        Self {
            id,
            label: label.into(),
            priority,
            route,
            status: TripStatus::Pending,
            activation_radius,
            ticks_travelled: 0,
            signals_preempted: BTreeSet::new(),
            signals_encountered: BTreeSet::new(),
            conflicts_won: 0,
            conflicts_lost: 0,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == TripStatus::Active
    }

    pub fn is_completed(&self) -> bool {
        self.status == TripStatus::Completed
    }

    pub fn position(&self) -> Option<GeoPoint> {
        self.route.current_point()
    }

    /// Begin the trip
    pub fn activate(&mut self) {
        if self.status == TripStatus::Pending {
            self.status = TripStatus::Active;
        }
    }

    /// Advance one route point
    /// Completes the trip on the same tick the final point is reached
    pub fn update(&mut self) -> VehicleUpdateResult {
        if !self.is_active() {
            return VehicleUpdateResult::Idle;
        }

        if self.route.advance() {
            self.ticks_travelled += 1;
        }

        if self.route.is_at_end() {
            self.status = TripStatus::Completed;
            return VehicleUpdateResult::Completed;
        }

        VehicleUpdateResult::Continue
    }

    /// Record the arbitration outcome for one signal this tick
    pub fn record_signal(&mut self, signal_id: SignalId, won: bool, contested: bool) {
        self.signals_encountered.insert(signal_id);
        if won {
            self.signals_preempted.insert(signal_id);
        }
        if contested {
            if won {
                self.conflicts_won += 1;
            } else {
                self.conflicts_lost += 1;
            }
        }
    }
}

//! Per-tick snapshots handed to observers

use serde::Serialize;

use super::arbitration::ConflictRecord;
use super::priority::Priority;
use super::signal::{SignalState, SimSignal};
use super::types::{GeoPoint, SignalId, VehicleId};
use super::vehicle::{SimVehicle, TripStatus};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VehicleSnapshot {
    pub id: VehicleId,
    pub label: String,
    pub priority: Priority,
    pub position: Option<GeoPoint>,
    pub cursor: usize,
    pub route_len: usize,
    pub status: TripStatus,
    pub completed: bool,
    pub progress_percent: f64,
}

impl From<&SimVehicle> for VehicleSnapshot {
    fn from(vehicle: &SimVehicle) -> Self {
        Self {
            id: vehicle.id,
            label: vehicle.label.clone(),
            priority: vehicle.priority,
            position: vehicle.position(),
            cursor: vehicle.route.cursor(),
            route_len: vehicle.route.len(),
            status: vehicle.status,
            completed: vehicle.is_completed(),
            progress_percent: vehicle.route.progress_percent(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignalSnapshot {
    pub id: SignalId,
    pub position: GeoPoint,
    pub state: SignalState,
    pub controller: Option<VehicleId>,
}

impl From<&SimSignal> for SignalSnapshot {
    fn from(signal: &SimSignal) -> Self {
        Self {
            id: signal.id,
            position: signal.position,
            state: signal.state(),
            controller: signal.controller(),
        }
    }
}

/// World state after one tick
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub tick: u64,
    pub vehicles: Vec<VehicleSnapshot>,
    pub signals: Vec<SignalSnapshot>,
    pub conflicts: Vec<ConflictRecord>,
}

impl Snapshot {
    pub fn vehicle(&self, id: VehicleId) -> Option<&VehicleSnapshot> {
        self.vehicles.iter().find(|v| v.id == id)
    }

    pub fn signal(&self, id: SignalId) -> Option<&SignalSnapshot> {
        self.signals.iter().find(|s| s.id == id)
    }

    pub fn green_signals(&self) -> usize {
        self.signals
            .iter()
            .filter(|s| s.state == SignalState::Green)
            .count()
    }
}

//! Traffic signal preemption state
//!
//! A signal is green exactly while some vehicle controls it. The state is
//! derived from the controller, so the two can never disagree.

use serde::{Deserialize, Serialize};

use super::types::{GeoPoint, SignalId, VehicleId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalState {
    Red,
    Green,
}

/// A signal in the corridor simulation
#[derive(Debug, Clone)]
pub struct SimSignal {
    pub id: SignalId,
    pub position: GeoPoint,
    /// The vehicle currently holding the signal green (if any)
    controller: Option<VehicleId>,
}

impl SimSignal {
    pub fn new(id: SignalId, position: GeoPoint) -> Self {
        Self {
            id,
            position,
            controller: None,
        }
    }

    pub fn state(&self) -> SignalState {
        match self.controller {
            Some(_) => SignalState::Green,
            None => SignalState::Red,
        }
    }

    pub fn controller(&self) -> Option<VehicleId> {
        self.controller
    }

    pub fn is_green(&self) -> bool {
        self.controller.is_some()
    }

    pub fn is_held_by(&self, vehicle_id: VehicleId) -> bool {
        self.controller == Some(vehicle_id)
    }

    /// Hand the signal to a vehicle (green), or release it (red) with `None`
    /// Returns true if the controller changed
    pub fn assign(&mut self, controller: Option<VehicleId>) -> bool {
        let changed = self.controller != controller;
        self.controller = controller;
        changed
    }
}

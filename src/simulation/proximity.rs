//! Vehicle-to-signal proximity for a single tick
//!
//! The index is rebuilt from scratch every tick. Vehicle and signal counts
//! are small, so every pair is checked.

use ordered_float::OrderedFloat;
use std::collections::BTreeMap;

use super::priority::Priority;
use super::signal::SimSignal;
use super::types::{SignalId, VehicleId};
use super::vehicle::SimVehicle;

/// A vehicle within activation range of a signal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    pub vehicle: VehicleId,
    pub priority: Priority,
    pub distance: OrderedFloat<f64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProximityIndex {
    /// Every signal has an entry, empty when nothing is in range.
    /// Candidates are ordered nearest first.
    in_range: BTreeMap<SignalId, Vec<Candidate>>,
}

impl ProximityIndex {
    /// Compute which active vehicles are within their activation radius of
    /// each signal
    pub fn build<'a, S, V>(signals: S, vehicles: V) -> Self
    where
        S: IntoIterator<Item = &'a SimSignal>,
        V: IntoIterator<Item = &'a SimVehicle>,
    {
        let positioned: Vec<(&SimVehicle, _)> = vehicles
            .into_iter()
            .filter(|v| v.is_active())
            .filter_map(|v| v.position().map(|p| (v, p)))
            .collect();

        let mut in_range = BTreeMap::new();

        for signal in signals {
            let mut candidates: Vec<Candidate> = positioned
                .iter()
                .filter_map(|(vehicle, position)| {
                    let distance = position.distance(&signal.position);
                    (distance <= vehicle.activation_radius).then_some(Candidate {
                        vehicle: vehicle.id,
                        priority: vehicle.priority,
                        distance: OrderedFloat(distance),
                    })
                })
                .collect();

            candidates.sort_by_key(|c| (c.distance, c.vehicle));
            in_range.insert(signal.id, candidates);
        }

        Self { in_range }
    }

    /// Vehicles in range of a signal, nearest first
    pub fn candidates(&self, signal_id: SignalId) -> &[Candidate] {
        self.in_range
            .get(&signal_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = (SignalId, &[Candidate])> {
        self.in_range.iter().map(|(id, c)| (*id, c.as_slice()))
    }
}

//! Priority arbitration between vehicles contending for a signal
//!
//! Each signal is decided on its own from the same proximity snapshot, so a
//! vehicle may win one signal and lose another in the same tick.
//!
//! The most urgent vehicle (lowest priority value) wins. Equal priorities
//! are broken by vehicle id, i.e. the vehicle registered first wins.

use log::debug;
use serde::Serialize;
use std::collections::BTreeMap;

use super::priority::Priority;
use super::proximity::{Candidate, ProximityIndex};
use super::signal::SimSignal;
use super::types::{SignalId, VehicleId};

/// A vehicle taking part in a conflict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Contender {
    pub vehicle: VehicleId,
    pub priority: Priority,
}

impl From<&Candidate> for Contender {
    fn from(candidate: &Candidate) -> Self {
        Self {
            vehicle: candidate.vehicle,
            priority: candidate.priority,
        }
    }
}

/// Outcome of two or more vehicles contending for one signal in one tick
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConflictRecord {
    pub signal: SignalId,
    pub winner: Contender,
    /// Ordered most urgent first
    pub losers: Vec<Contender>,
}

/// The decision for a single signal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    pub winner: Contender,
    pub losers: Vec<Contender>,
}

impl Decision {
    pub fn is_contested(&self) -> bool {
        !self.losers.is_empty()
    }
}

/// Pick the controller among the vehicles in range of one signal
/// Returns `None` when no vehicle is in range
pub fn resolve(candidates: &[Candidate]) -> Option<Decision> {
    let mut ranked: Vec<Contender> = candidates.iter().map(Contender::from).collect();
    ranked.sort_by_key(|c| (c.priority, c.vehicle));

    let mut ranked = ranked.into_iter();
    let winner = ranked.next()?;
    Some(Decision {
        winner,
        losers: ranked.collect(),
    })
}

/// Per-signal decisions for one tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArbitrationOutcome {
    pub decisions: Vec<(SignalId, Option<Decision>)>,
}

impl ArbitrationOutcome {
    /// Winning vehicle per decided signal
    pub fn controllers(&self) -> BTreeMap<SignalId, Option<VehicleId>> {
        self.decisions
            .iter()
            .map(|(signal, decision)| (*signal, decision.as_ref().map(|d| d.winner.vehicle)))
            .collect()
    }

    pub fn conflicts(&self) -> Vec<ConflictRecord> {
        self.decisions
            .iter()
            .filter_map(|(signal, decision)| match decision {
                Some(d) if d.is_contested() => Some(ConflictRecord {
                    signal: *signal,
                    winner: d.winner,
                    losers: d.losers.clone(),
                }),
                _ => None,
            })
            .collect()
    }
}

/// Decide every signal in the index
pub fn arbitrate(index: &ProximityIndex) -> ArbitrationOutcome {
    ArbitrationOutcome {
        decisions: index
            .iter()
            .map(|(signal, candidates)| (signal, resolve(candidates)))
            .collect(),
    }
}

/// Apply the decisions to the signals
/// Signals without a decision entry are turned red
pub fn apply(outcome: &ArbitrationOutcome, signals: &mut [SimSignal]) {
    let controllers = outcome.controllers();

    for signal in signals.iter_mut() {
        let controller = controllers.get(&signal.id).copied().flatten();

        if signal.assign(controller) {
            match controller {
                Some(vehicle) => debug!("Signal {} green for {}", signal.id, vehicle),
                None => debug!("Signal {} back to red", signal.id),
            }
        }
    }
}

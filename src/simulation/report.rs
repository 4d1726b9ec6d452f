//! Trip completion reports
//!
//! Produced once per vehicle when it reaches the end of its route. The
//! persistence layer turns these into record updates; the engine only
//! builds them.

use serde::Serialize;

use super::config::SimConfig;
use super::priority::Priority;
use super::types::VehicleId;
use super::vehicle::SimVehicle;

/// Travel time with the corridor versus stopping at every signal
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TravelTimeComparison {
    pub corridor_secs: f64,
    pub normal_secs: f64,
    pub time_saved_secs: f64,
}

impl TravelTimeComparison {
    pub fn new(ticks: u64, tick_interval_ms: u64, signals: usize, signal_delay_secs: f64) -> Self {
        let corridor_secs = ticks as f64 * tick_interval_ms as f64 / 1000.0;
        let normal_secs = corridor_secs + signals as f64 * signal_delay_secs;
        Self {
            corridor_secs,
            normal_secs,
            time_saved_secs: normal_secs - corridor_secs,
        }
    }
}

/// Completion event for one vehicle
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TripReport {
    pub vehicle: VehicleId,
    pub label: String,
    pub priority: Priority,
    /// Tick on which the vehicle reached its destination
    pub completed_at_tick: u64,
    pub ticks_travelled: u64,
    pub route_length_meters: f64,
    /// Distinct signals the vehicle held green
    pub signals_preempted: usize,
    /// Distinct signals the vehicle came within range of
    pub signals_encountered: usize,
    pub conflicts_won: usize,
    pub conflicts_lost: usize,
    pub travel_time: TravelTimeComparison,
}

impl TripReport {
    pub fn for_vehicle(vehicle: &SimVehicle, tick: u64, config: &SimConfig) -> Self {
        Self {
            vehicle: vehicle.id,
            label: vehicle.label.clone(),
            priority: vehicle.priority,
            completed_at_tick: tick,
            ticks_travelled: vehicle.ticks_travelled,
            route_length_meters: vehicle.route.length_meters(),
            signals_preempted: vehicle.signals_preempted.len(),
            signals_encountered: vehicle.signals_encountered.len(),
            conflicts_won: vehicle.conflicts_won,
            conflicts_lost: vehicle.conflicts_lost,
            travel_time: TravelTimeComparison::new(
                vehicle.ticks_travelled,
                config.tick_interval_ms,
                vehicle.signals_encountered.len(),
                config.signal_delay_secs,
            ),
        }
    }

    /// One-line summary for logs
    pub fn summary(&self) -> String {
        format!(
            "{} ({} {}): {} ticks, {:.0} m, signals preempted {}/{}, conflicts won {} lost {}, saved {:.1}s",
            self.label,
            self.priority,
            self.priority.severity().label(),
            self.ticks_travelled,
            self.route_length_meters,
            self.signals_preempted,
            self.signals_encountered,
            self.conflicts_won,
            self.conflicts_lost,
            self.travel_time.time_saved_secs
        )
    }
}

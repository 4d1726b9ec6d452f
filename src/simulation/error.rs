//! Error types for the corridor simulation

use thiserror::Error;

use super::clock::ClockState;
use super::types::VehicleId;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimError {
    #[error("Invalid route for vehicle {vehicle}: {points} point(s), at least 2 required")]
    InvalidRoute { vehicle: VehicleId, points: usize },

    #[error("Invalid priority {0}: priority levels start at 1")]
    InvalidPriority(u32),

    #[error("No vehicles bound to the simulation")]
    NoVehicles,

    #[error("Simulation is already running")]
    DoubleStart,

    #[error("Simulation is not running (state: {0:?})")]
    NotRunning(ClockState),

    #[error("Simulation has already finished (state: {0:?})")]
    AlreadyFinished(ClockState),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, SimError>;

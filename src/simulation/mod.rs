//! Priority-based signal preemption simulation
//!
//! Emergency vehicles step along precomputed routes; signals within a
//! vehicle's activation radius turn green for it, and contested signals go
//! to the most urgent vehicle. Everything here runs without any rendering,
//! routing or persistence layer.

mod arbitration;
mod clock;
mod config;
mod error;
mod observer;
mod priority;
mod proximity;
mod report;
mod route;
mod scenario;
mod signal;
mod snapshot;
mod types;
mod vehicle;
mod world;

pub use arbitration::{
    apply, arbitrate, resolve, ArbitrationOutcome, ConflictRecord, Contender, Decision,
};
pub use clock::{ClockState, RunOutcome, SimulationClock, StopHandle};
pub use config::{RadiusPolicy, SignalPlacement, SimConfig};
pub use error::{Result, SimError};
pub use observer::{ChannelObserver, JsonLinesObserver, LogObserver, SimEvent, SimObserver};
pub use priority::{Priority, Severity, UrgencyBand};
pub use proximity::{Candidate, ProximityIndex};
pub use report::{TravelTimeComparison, TripReport};
pub use route::{Route, MIN_ROUTE_POINTS};
pub use scenario::{Scenario, ScenarioError, VehicleSpec};
pub use signal::{SignalState, SimSignal};
pub use snapshot::{SignalSnapshot, Snapshot, VehicleSnapshot};
pub use types::{
    geo_distance, GeoPoint, SignalId, SimId, VehicleId, DEFAULT_ACTIVATION_RADIUS_METERS,
    DEFAULT_SIGNAL_DELAY_SECS, DEFAULT_SIGNAL_SAMPLE_OFFSET, DEFAULT_SIGNAL_SAMPLE_STRIDE,
    DEFAULT_TICK_INTERVAL_MS, EARTH_RADIUS_METERS, SIGNAL_MERGE_DISTANCE_METERS,
};
pub use vehicle::{SimVehicle, TripStatus, VehicleUpdateResult};
pub use world::{SimWorld, TickResult, DEMO_ROUTE_POINTS};

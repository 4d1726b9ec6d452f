//! Main simulation world that ties everything together
//!
//! Owns the vehicles and signals of one run and executes the per-tick
//! pipeline: advance vehicles, rebuild proximity, arbitrate, snapshot.

use log::{info, warn};
use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;
use std::collections::BTreeMap;

use super::arbitration::{self, ArbitrationOutcome, ConflictRecord};
use super::config::SimConfig;
use super::error::{Result, SimError};
use super::priority::Priority;
use super::proximity::ProximityIndex;
use super::report::TripReport;
use super::route::Route;
use super::signal::SimSignal;
use super::snapshot::{SignalSnapshot, Snapshot, VehicleSnapshot};
use super::types::{GeoPoint, SignalId, SimId, VehicleId, SIGNAL_MERGE_DISTANCE_METERS};
use super::vehicle::{SimVehicle, VehicleUpdateResult};

/// Number of points in each synthetic demo route
pub const DEMO_ROUTE_POINTS: usize = 200;

/// Maximum per-point jitter applied to seeded demo routes, in degrees
const DEMO_JITTER_DEGREES: f64 = 0.00005;

/// Everything produced by one tick
#[derive(Debug, Clone)]
pub struct TickResult {
    pub snapshot: Snapshot,
    /// Reports for vehicles that completed on this tick
    pub completed: Vec<TripReport>,
}

/// The main simulation world
pub struct SimWorld {
    pub config: SimConfig,

    /// All vehicles, in registration order
    vehicles: BTreeMap<VehicleId, SimVehicle>,

    /// All signals, in placement order
    signals: Vec<SimSignal>,

    /// Next ID to assign
    next_id: usize,

    /// Ticks executed so far
    tick: u64,

    /// Whether route sampling has already run
    signals_placed: bool,

    /// Conflicts resolved over the whole run
    total_conflicts: usize,

    /// Optional seeded RNG for reproducible demo routes
    rng: Option<StdRng>,
}

impl Default for SimWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl SimWorld {
    fn new_internal(config: SimConfig, rng: Option<StdRng>) -> Self {
        Self {
            config,
            vehicles: BTreeMap::new(),
            signals: Vec::new(),
            next_id: 0,
            tick: 0,
            signals_placed: false,
            total_conflicts: 0,
            rng,
        }
    }

    pub fn new() -> Self {
        Self::new_internal(SimConfig::default(), None)
    }

    pub fn with_config(config: SimConfig) -> Self {
        Self::new_internal(config, None)
    }

    /// Create a new SimWorld with a seeded RNG for reproducible demo routes
    pub fn new_with_seed(config: SimConfig, seed: u64) -> Self {
        Self::new_internal(config, Some(StdRng::seed_from_u64(seed)))
    }

    fn next_sim_id(&mut self) -> SimId {
        let id = SimId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Bind a vehicle to a route
    ///
    /// The route is checked when the clock starts, not here, so a malformed
    /// route is reported as `InvalidRoute` at start.
    pub fn add_vehicle(
        &mut self,
        label: impl Into<String>,
        priority: Priority,
        route: Vec<GeoPoint>,
    ) -> VehicleId {
        let id = VehicleId(self.next_sim_id());
        let radius = self.config.radius_for(priority);
        let vehicle = SimVehicle::new(id, label, priority, Route::new(route), radius);
        self.vehicles.insert(id, vehicle);
        id
    }

    /// Place a signal at a fixed point
    pub fn add_signal(&mut self, position: GeoPoint) -> SignalId {
        let id = SignalId(self.next_sim_id());
        self.signals.push(SimSignal::new(id, position));
        id
    }

    pub fn vehicle(&self, id: VehicleId) -> Option<&SimVehicle> {
        self.vehicles.get(&id)
    }

    pub fn vehicles(&self) -> impl Iterator<Item = &SimVehicle> {
        self.vehicles.values()
    }

    pub fn vehicle_count(&self) -> usize {
        self.vehicles.len()
    }

    pub fn signal(&self, id: SignalId) -> Option<&SimSignal> {
        self.signals.iter().find(|s| s.id == id)
    }

    pub fn signals(&self) -> &[SimSignal] {
        &self.signals
    }

    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    pub fn total_conflicts(&self) -> usize {
        self.total_conflicts
    }

    pub fn completed_count(&self) -> usize {
        self.vehicles.values().filter(|v| v.is_completed()).count()
    }

    pub fn active_count(&self) -> usize {
        self.vehicles.values().filter(|v| v.is_active()).count()
    }

    /// True once every bound vehicle has reached its destination
    pub fn all_completed(&self) -> bool {
        !self.vehicles.is_empty() && self.vehicles.values().all(SimVehicle::is_completed)
    }

    /// Sample signals from every vehicle's route
    ///
    /// Runs at most once per world; later calls place nothing. Candidates
    /// that coincide with an existing signal are merged into it.
    pub fn place_signals_along_routes(&mut self) -> usize {
        if self.signals_placed {
            return 0;
        }
        self.signals_placed = true;

        let placement = self.config.signal_placement;
        let sampled: Vec<GeoPoint> = self
            .vehicles
            .values()
            .flat_map(|v| v.route.sample_signal_points(&placement))
            .collect();

        let mut placed = 0;
        for point in sampled {
            let duplicate = self
                .signals
                .iter()
                .any(|s| s.position.distance(&point) < SIGNAL_MERGE_DISTANCE_METERS);
            if !duplicate {
                self.add_signal(point);
                placed += 1;
            }
        }

        info!("Placed {} signal(s) along vehicle routes", placed);
        placed
    }

    /// Check the world can start ticking
    pub fn validate_for_start(&self) -> Result<()> {
        self.config.validate()?;

        if self.vehicles.is_empty() {
            return Err(SimError::NoVehicles);
        }

        for vehicle in self.vehicles.values() {
            vehicle.route.validate(vehicle.id)?;
        }

        Ok(())
    }

    /// Move every pending vehicle onto its route
    pub fn activate_vehicles(&mut self) {
        for vehicle in self.vehicles.values_mut() {
            vehicle.activate();
        }
    }

    /// Advance all active vehicles by one point
    /// Returns the vehicles that completed on this step
    fn advance_vehicles(&mut self) -> Vec<VehicleId> {
        let mut completed = Vec::new();

        for vehicle in self.vehicles.values_mut() {
            if vehicle.update() == VehicleUpdateResult::Completed {
                completed.push(vehicle.id);
            }
        }

        completed
    }

    fn arbitrate_signals(&mut self) -> ArbitrationOutcome {
        let index = ProximityIndex::build(&self.signals, self.vehicles.values());
        let outcome = arbitration::arbitrate(&index);
        arbitration::apply(&outcome, &mut self.signals);
        outcome
    }

    /// Recompute proximity and signal control from the current positions
    /// without advancing anything
    ///
    /// Calling this repeatedly on unchanged positions gives identical signal
    /// states every time.
    pub fn evaluate_signals(&mut self) -> Vec<ConflictRecord> {
        self.arbitrate_signals().conflicts()
    }

    /// Credit each vehicle with the signals it won or lost this tick
    fn record_outcome(&mut self, outcome: &ArbitrationOutcome) {
        for (signal, decision) in &outcome.decisions {
            let Some(decision) = decision else {
                continue;
            };
            let contested = decision.is_contested();

            if let Some(vehicle) = self.vehicles.get_mut(&decision.winner.vehicle) {
                vehicle.record_signal(*signal, true, contested);
            }
            for loser in &decision.losers {
                if let Some(vehicle) = self.vehicles.get_mut(&loser.vehicle) {
                    vehicle.record_signal(*signal, false, contested);
                }
            }
        }
    }

    /// Main simulation tick
    pub fn tick(&mut self) -> TickResult {
        self.tick += 1;

        let completed_ids = self.advance_vehicles();

        let outcome = self.arbitrate_signals();
        self.record_outcome(&outcome);

        let conflicts = outcome.conflicts();
        for conflict in &conflicts {
            warn!(
                "Signal {} contested by {} vehicle(s), granted to {} ({})",
                conflict.signal,
                conflict.losers.len() + 1,
                conflict.winner.vehicle,
                conflict.winner.priority
            );
        }
        self.total_conflicts += conflicts.len();

        let completed: Vec<TripReport> = completed_ids
            .iter()
            .filter_map(|id| self.vehicles.get(id))
            .map(|v| TripReport::for_vehicle(v, self.tick, &self.config))
            .collect();

        for report in &completed {
            info!("Vehicle {} reached destination at tick {}", report.label, self.tick);
        }

        TickResult {
            snapshot: self.snapshot(conflicts),
            completed,
        }
    }

    /// Capture the current state with the given conflict list
    pub fn snapshot(&self, conflicts: Vec<ConflictRecord>) -> Snapshot {
        Snapshot {
            tick: self.tick,
            vehicles: self.vehicles.values().map(VehicleSnapshot::from).collect(),
            signals: self.signals.iter().map(SignalSnapshot::from).collect(),
            conflicts,
        }
    }

    /// Build a straight polyline between two points, jittered when the
    /// world has a seeded RNG
    pub fn synthetic_route(&mut self, start: GeoPoint, end: GeoPoint, points: usize) -> Vec<GeoPoint> {
        let last = points.saturating_sub(1).max(1) as f64;
        let mut route = Vec::with_capacity(points);

        for i in 0..points {
            let mut point = start.lerp(&end, i as f64 / last);
            // Keep endpoints exact so routes still meet at shared points
            if i != 0 && i + 1 != points {
                if let Some(rng) = &mut self.rng {
                    point.lat += rng.random_range(-DEMO_JITTER_DEGREES..DEMO_JITTER_DEGREES);
                    point.lng += rng.random_range(-DEMO_JITTER_DEGREES..DEMO_JITTER_DEGREES);
                }
            }
            route.push(point);
        }

        route
    }

    /// Create the default demo world
    pub fn create_demo_world(config: SimConfig) -> Self {
        Self::build_demo_world(SimWorld::with_config(config))
    }

    /// Create the default demo world with jittered, reproducible routes
    pub fn create_demo_world_with_seed(config: SimConfig, seed: u64) -> Self {
        Self::build_demo_world(SimWorld::new_with_seed(config, seed))
    }

    /// Internal helper to build the demo world structure
    ///
    /// Two ambulances on routes that cross at their midpoints, with a signal
    /// at the crossing so the two contend for it.
    pub fn build_demo_world(mut world: SimWorld) -> Self {
        let cardiac_route = world.synthetic_route(
            GeoPoint::new(17.38, 78.48),
            GeoPoint::new(17.40, 78.50),
            DEMO_ROUTE_POINTS,
        );
        let accident_route = world.synthetic_route(
            GeoPoint::new(17.385, 78.475),
            GeoPoint::new(17.395, 78.505),
            DEMO_ROUTE_POINTS,
        );

        world.add_vehicle("AMB_001", Priority::CARDIAC_ARREST, cardiac_route);
        world.add_vehicle("AMB_002", Priority::ACCIDENT, accident_route);
        world.add_signal(GeoPoint::new(17.39, 78.49));

        world
    }

    /// Print a summary of the world state
    pub fn print_summary(&self) {
        println!("=== Green Corridor Summary ===");
        println!("Tick: {}", self.tick);
        println!(
            "Vehicles: {} ({} active, {} completed)",
            self.vehicles.len(),
            self.active_count(),
            self.completed_count()
        );
        println!(
            "Signals: {} ({} green)",
            self.signals.len(),
            self.signals.iter().filter(|s| s.is_green()).count()
        );
        println!("Conflicts resolved: {}", self.total_conflicts);
        println!();

        println!("--- Vehicles ---");
        for vehicle in self.vehicles.values() {
            let position = vehicle
                .position()
                .map(|p| p.to_string())
                .unwrap_or_else(|| "-".to_string());
            println!(
                "  {} {} [{}]: {:?} at {} ({}/{}, {:.0}%)",
                vehicle.label,
                vehicle.priority,
                vehicle.priority.severity().description(),
                vehicle.status,
                position,
                vehicle.route.cursor(),
                vehicle.route.len(),
                vehicle.route.progress_percent()
            );
        }

        println!("--- Signals ---");
        for signal in &self.signals {
            let controller = signal
                .controller()
                .and_then(|id| self.vehicles.get(&id))
                .map(|v| format!(" held by {}", v.label))
                .unwrap_or_default();
            println!(
                "  {} at {}: {:?}{}",
                signal.id,
                signal.position,
                signal.state(),
                controller
            );
        }
    }
}

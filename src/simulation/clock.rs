//! Fixed-period simulation clock
//!
//! Drives the world tick by tick and fans every snapshot out to the attached
//! observers. A tick always runs to completion; a stop request is only
//! honoured between ticks.

use log::{info, warn};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use super::error::{Result, SimError};
use super::observer::SimObserver;
use super::report::TripReport;
use super::snapshot::Snapshot;
use super::world::SimWorld;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ClockState {
    Idle,
    Running,
    /// Every vehicle reached its destination
    Completed,
    /// Abandoned by a stop command
    Stopped,
}

/// Requests a stop from any thread
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_stop_requested(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Result of driving the clock to the end
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub final_state: ClockState,
    pub ticks: u64,
    pub reports: Vec<TripReport>,
}

pub struct SimulationClock {
    world: SimWorld,
    state: ClockState,
    interval: Duration,
    observers: Vec<Box<dyn SimObserver>>,
    stop: StopHandle,
    reports: Vec<TripReport>,
}

impl SimulationClock {
    pub fn new(world: SimWorld) -> Self {
        let interval = world.config.tick_interval();
        Self {
            world,
            state: ClockState::Idle,
            interval,
            observers: Vec::new(),
            stop: StopHandle::default(),
            reports: Vec::new(),
        }
    }

    /// Override the tick period from the world's configuration
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn add_observer(&mut self, observer: Box<dyn SimObserver>) {
        self.observers.push(observer);
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    pub fn state(&self) -> ClockState {
        self.state
    }

    pub fn world(&self) -> &SimWorld {
        &self.world
    }

    pub fn into_world(self) -> SimWorld {
        self.world
    }

    /// Trip reports emitted so far
    pub fn reports(&self) -> &[TripReport] {
        &self.reports
    }

    /// Idle -> Running
    ///
    /// Every route is checked before anything moves. One route with fewer
    /// than two points fails the whole start with `InvalidRoute` naming that
    /// vehicle; no vehicle starts, no signals are placed and the clock stays
    /// Idle. Remove or fix the vehicle and start again.
    pub fn start(&mut self) -> Result<()> {
        match self.state {
            ClockState::Idle => {}
            ClockState::Running => return Err(SimError::DoubleStart),
            finished => return Err(SimError::AlreadyFinished(finished)),
        }

        self.world.validate_for_start()?;

        if self.world.config.auto_place_signals {
            self.world.place_signals_along_routes();
        }
        self.world.activate_vehicles();
        self.state = ClockState::Running;

        info!(
            "Simulation started: {} vehicle(s), {} signal(s), tick every {:?}",
            self.world.vehicle_count(),
            self.world.signals().len(),
            self.interval
        );
        Ok(())
    }

    /// Abandon the run; no completion events are emitted for vehicles still
    /// en route
    pub fn stop(&mut self) -> Result<()> {
        if self.state != ClockState::Running {
            return Err(SimError::NotRunning(self.state));
        }

        self.state = ClockState::Stopped;
        let tick = self.world.tick_count();
        for observer in &mut self.observers {
            observer.on_stopped(tick);
        }
        info!("Simulation stopped at tick {}", tick);
        Ok(())
    }

    /// Run exactly one tick
    ///
    /// Returns `None` when a pending stop request was applied instead.
    pub fn step(&mut self) -> Result<Option<Snapshot>> {
        if self.state != ClockState::Running {
            return Err(SimError::NotRunning(self.state));
        }

        if self.stop.is_stop_requested() {
            self.stop()?;
            return Ok(None);
        }

        let result = self.world.tick();

        for observer in &mut self.observers {
            observer.on_snapshot(&result.snapshot);
        }
        for report in &result.completed {
            for observer in &mut self.observers {
                observer.on_trip_completed(report);
            }
        }
        self.reports.extend(result.completed);

        if self.world.all_completed() {
            self.state = ClockState::Completed;
            info!(
                "All {} vehicle(s) arrived after {} tick(s)",
                self.world.vehicle_count(),
                self.world.tick_count()
            );
        }

        Ok(Some(result.snapshot))
    }

    /// Start if needed, then tick at the fixed period until every vehicle
    /// arrives or the run is stopped
    ///
    /// Hitting `max_ticks` counts as a stop.
    pub fn run(&mut self, max_ticks: Option<u64>) -> Result<RunOutcome> {
        if self.state == ClockState::Idle {
            self.start()?;
        }

        while self.state == ClockState::Running {
            if max_ticks.is_some_and(|limit| self.world.tick_count() >= limit) {
                warn!("Tick limit reached before all vehicles arrived");
                self.stop()?;
                break;
            }

            self.step()?;

            if self.state == ClockState::Running && !self.interval.is_zero() {
                std::thread::sleep(self.interval);
            }
        }

        Ok(RunOutcome {
            final_state: self.state,
            ticks: self.world.tick_count(),
            reports: self.reports.clone(),
        })
    }
}

//! Observers notified by the simulation clock
//!
//! Rendering, persistence and logging all consume the same snapshots; none
//! of them can reach back into the world.

use log::{debug, info, warn};
use serde::Serialize;
use std::io::Write;
use std::sync::mpsc::Sender;

use super::report::TripReport;
use super::snapshot::Snapshot;

pub trait SimObserver {
    /// Called after every tick
    fn on_snapshot(&mut self, snapshot: &Snapshot);

    /// Called exactly once per vehicle when it reaches its destination
    fn on_trip_completed(&mut self, _report: &TripReport) {}

    /// Called when the run is abandoned before every vehicle arrived
    fn on_stopped(&mut self, _tick: u64) {}
}

/// Forwards simulation events to the `log` facade
#[derive(Debug, Default)]
pub struct LogObserver;

impl SimObserver for LogObserver {
    fn on_snapshot(&mut self, snapshot: &Snapshot) {
        debug!(
            "Tick {}: {} vehicle(s), {}/{} signal(s) green",
            snapshot.tick,
            snapshot.vehicles.len(),
            snapshot.green_signals(),
            snapshot.signals.len()
        );

        for conflict in &snapshot.conflicts {
            let losers: Vec<String> = conflict
                .losers
                .iter()
                .map(|l| format!("{} ({})", l.vehicle, l.priority))
                .collect();
            warn!(
                "Tick {}: signal {} contested, {} ({}) wins over {}",
                snapshot.tick,
                conflict.signal,
                conflict.winner.vehicle,
                conflict.winner.priority,
                losers.join(", ")
            );
        }
    }

    fn on_trip_completed(&mut self, report: &TripReport) {
        info!("Trip completed: {}", report.summary());
    }

    fn on_stopped(&mut self, tick: u64) {
        warn!("Simulation stopped at tick {} before all trips completed", tick);
    }
}

#[derive(Debug, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
enum JsonEvent<'a> {
    Snapshot(&'a Snapshot),
    TripCompleted(&'a TripReport),
    Stopped { tick: u64 },
}

/// Writes one JSON object per event, one per line
pub struct JsonLinesObserver<W: Write> {
    writer: W,
}

impl<W: Write> JsonLinesObserver<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_event(&mut self, event: &JsonEvent<'_>) {
        let result = serde_json::to_writer(&mut self.writer, event)
            .map_err(std::io::Error::from)
            .and_then(|_| self.writer.write_all(b"\n"));
        if let Err(e) = result {
            warn!("Failed to write simulation event: {}", e);
        }
    }
}

impl<W: Write> SimObserver for JsonLinesObserver<W> {
    fn on_snapshot(&mut self, snapshot: &Snapshot) {
        self.write_event(&JsonEvent::Snapshot(snapshot));
    }

    fn on_trip_completed(&mut self, report: &TripReport) {
        self.write_event(&JsonEvent::TripCompleted(report));
    }

    fn on_stopped(&mut self, tick: u64) {
        self.write_event(&JsonEvent::Stopped { tick });
    }
}

/// Owned simulation event, for consumers on other threads
#[derive(Debug, Clone, PartialEq)]
pub enum SimEvent {
    Snapshot(Snapshot),
    TripCompleted(TripReport),
    Stopped { tick: u64 },
}

/// Sends every event over a channel
///
/// A dropped receiver is not an error; later events are discarded.
pub struct ChannelObserver {
    sender: Sender<SimEvent>,
}

impl ChannelObserver {
    pub fn new(sender: Sender<SimEvent>) -> Self {
        Self { sender }
    }
}

impl SimObserver for ChannelObserver {
    fn on_snapshot(&mut self, snapshot: &Snapshot) {
        let _ = self.sender.send(SimEvent::Snapshot(snapshot.clone()));
    }

    fn on_trip_completed(&mut self, report: &TripReport) {
        let _ = self.sender.send(SimEvent::TripCompleted(report.clone()));
    }

    fn on_stopped(&mut self, tick: u64) {
        let _ = self.sender.send(SimEvent::Stopped { tick });
    }
}

//! Simulation clock state machine tests

mod common;

use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use green_corridor::simulation::{
    ChannelObserver, ClockState, GeoPoint, JsonLinesObserver, Priority, SignalState, SimConfig,
    SignalPlacement, SimError, SimEvent, SimObserver, SimWorld, SimulationClock, SimId, TripStatus,
    VehicleId,
};

use common::{east_of, manual_signals_config, straight_route};

fn priority(level: u32) -> Priority {
    Priority::new(level).unwrap()
}

/// Clock over a world with one vehicle per route length
fn clock_with_routes(lengths: &[usize]) -> SimulationClock {
    let mut world = SimWorld::with_config(manual_signals_config());
    for (i, len) in lengths.iter().enumerate() {
        let start = east_of(GeoPoint::new(0.0, 0.0), i as f64 * 1_000.0);
        world.add_vehicle(format!("AMB_{}", i), priority(1), straight_route(start, *len, 10.0));
    }
    SimulationClock::new(world)
}

fn drain(receiver: &mpsc::Receiver<SimEvent>) -> Vec<SimEvent> {
    receiver.try_iter().collect()
}

#[test]
fn test_single_vehicle_run_to_completion() {
    // Priority 5, 100 route points, 400 ms period, 150 m radius, default
    // signal sampling plus one signal far from the route
    let config = SimConfig {
        tick_interval_ms: 400,
        ..SimConfig::default()
    };
    let mut world = SimWorld::with_config(config);
    let origin = GeoPoint::new(0.0, 0.0);
    let vehicle = world.add_vehicle("AMB_005", priority(5), straight_route(origin, 100, 10.0));
    let remote = world.add_signal(east_of(origin, 5_000.0));

    let (sender, receiver) = mpsc::channel();
    let mut clock = SimulationClock::new(world).with_interval(Duration::ZERO);
    clock.add_observer(Box::new(ChannelObserver::new(sender)));

    let outcome = clock.run(None).unwrap();

    assert_eq!(outcome.final_state, ClockState::Completed);
    assert_eq!(outcome.ticks, 99);
    assert_eq!(outcome.reports.len(), 1);
    assert_eq!(outcome.reports[0].vehicle, vehicle);
    assert_eq!(outcome.reports[0].ticks_travelled, 99);
    // 99 ticks at 400 ms
    assert!((outcome.reports[0].travel_time.corridor_secs - 39.6).abs() < 1e-9);

    let events = drain(&receiver);
    let snapshots: Vec<_> = events
        .iter()
        .filter_map(|e| match e {
            SimEvent::Snapshot(s) => Some(s),
            _ => None,
        })
        .collect();
    assert_eq!(snapshots.len(), 99);
    for snapshot in &snapshots {
        assert_eq!(snapshot.signal(remote).unwrap().state, SignalState::Red);
    }

    // Sampled signals at points 40 and 90 went green while passed
    let sampled: Vec<_> = clock
        .world()
        .signals()
        .iter()
        .map(|s| s.id)
        .filter(|id| *id != remote)
        .collect();
    assert_eq!(sampled.len(), 2);
    for id in sampled {
        assert!(snapshots
            .iter()
            .any(|s| s.signal(id).unwrap().state == SignalState::Green));
    }
    assert_eq!(outcome.reports[0].signals_preempted, 2);
}

#[test]
fn test_single_point_route_is_rejected() {
    let mut world = SimWorld::with_config(manual_signals_config());
    let vehicle = world.add_vehicle("AMB_BAD", priority(1), vec![GeoPoint::new(0.0, 0.0)]);
    let mut clock = SimulationClock::new(world);

    assert_eq!(
        clock.start(),
        Err(SimError::InvalidRoute { vehicle, points: 1 })
    );
    assert_eq!(clock.state(), ClockState::Idle);
    assert_eq!(clock.world().tick_count(), 0);
    assert!(matches!(clock.run(None), Err(SimError::InvalidRoute { .. })));
    assert_eq!(clock.state(), ClockState::Idle);
}

#[test]
fn test_empty_route_is_rejected() {
    let config = SimConfig {
        signal_placement: SignalPlacement::ByIndex {
            offset: 0,
            stride: 1,
        },
        ..SimConfig::default()
    };
    let mut world = SimWorld::with_config(config);
    let origin = GeoPoint::new(0.0, 0.0);
    let good = world.add_vehicle("AMB_OK", priority(1), straight_route(origin, 5, 10.0));
    let bad = world.add_vehicle("AMB_EMPTY", priority(2), vec![]);
    let mut clock = SimulationClock::new(world);

    assert_eq!(
        clock.start(),
        Err(SimError::InvalidRoute {
            vehicle: bad,
            points: 0
        })
    );
    assert_eq!(clock.state(), ClockState::Idle);

    // The valid vehicle does not start on its own either
    let world = clock.world();
    assert_eq!(world.vehicle(good).unwrap().status, TripStatus::Pending);
    assert_eq!(world.active_count(), 0);
    assert!(world.signals().is_empty());
}

#[test]
fn test_start_without_vehicles_fails() {
    let mut clock = SimulationClock::new(SimWorld::with_config(manual_signals_config()));
    assert_eq!(clock.start(), Err(SimError::NoVehicles));
    assert_eq!(clock.state(), ClockState::Idle);
}

#[test]
fn test_invalid_config_fails_start() {
    let config = SimConfig {
        activation_radius_meters: 0.0,
        ..manual_signals_config()
    };
    let mut world = SimWorld::with_config(config);
    world.add_vehicle("AMB_001", priority(1), straight_route(GeoPoint::new(0.0, 0.0), 5, 10.0));
    let mut clock = SimulationClock::new(world);

    assert!(matches!(clock.start(), Err(SimError::InvalidConfig(_))));
    assert_eq!(clock.state(), ClockState::Idle);
}

#[test]
fn test_double_start_keeps_progress() {
    let mut clock = clock_with_routes(&[10]);
    clock.start().unwrap();
    clock.step().unwrap();
    clock.step().unwrap();

    assert_eq!(clock.start(), Err(SimError::DoubleStart));
    assert_eq!(clock.state(), ClockState::Running);
    assert_eq!(clock.world().tick_count(), 2);
    let vehicle = clock.world().vehicle(VehicleId(SimId(0))).unwrap();
    assert_eq!(vehicle.route.cursor(), 2);
}

#[test]
fn test_step_requires_running_clock() {
    let mut clock = clock_with_routes(&[10]);
    assert_eq!(clock.step(), Err(SimError::NotRunning(ClockState::Idle)));
}

#[test]
fn test_completes_only_when_every_vehicle_arrives() {
    let (sender, receiver) = mpsc::channel();
    let mut clock = clock_with_routes(&[5, 10]);
    clock.add_observer(Box::new(ChannelObserver::new(sender)));
    clock.start().unwrap();

    for _ in 0..4 {
        clock.step().unwrap();
    }
    assert_eq!(clock.state(), ClockState::Running);
    assert_eq!(clock.world().completed_count(), 1);
    assert_eq!(clock.reports().len(), 1);

    for _ in 0..5 {
        clock.step().unwrap();
    }
    assert_eq!(clock.state(), ClockState::Completed);
    assert_eq!(clock.world().tick_count(), 9);

    // One completion event per vehicle
    let completed: Vec<VehicleId> = drain(&receiver)
        .into_iter()
        .filter_map(|e| match e {
            SimEvent::TripCompleted(report) => Some(report.vehicle),
            _ => None,
        })
        .collect();
    assert_eq!(completed, vec![VehicleId(SimId(0)), VehicleId(SimId(1))]);

    assert_eq!(clock.step(), Err(SimError::NotRunning(ClockState::Completed)));
    assert_eq!(
        clock.start(),
        Err(SimError::AlreadyFinished(ClockState::Completed))
    );
}

#[test]
fn test_stop_request_is_applied_at_tick_boundary() {
    let (sender, receiver) = mpsc::channel();
    let mut clock = clock_with_routes(&[10]);
    clock.add_observer(Box::new(ChannelObserver::new(sender)));
    clock.start().unwrap();
    clock.step().unwrap();

    let handle = clock.stop_handle();
    handle.stop();
    assert_eq!(clock.step(), Ok(None));

    assert_eq!(clock.state(), ClockState::Stopped);
    assert_eq!(clock.world().tick_count(), 1);
    assert!(clock.reports().is_empty());

    let events = drain(&receiver);
    assert!(matches!(events.last(), Some(SimEvent::Stopped { tick: 1 })));
    assert!(!events
        .iter()
        .any(|e| matches!(e, SimEvent::TripCompleted(_))));

    assert_eq!(
        clock.start(),
        Err(SimError::AlreadyFinished(ClockState::Stopped))
    );
}

#[test]
fn test_stop_from_another_thread() {
    let mut clock = clock_with_routes(&[100_000]).with_interval(Duration::from_millis(1));
    let handle = clock.stop_handle();

    let stopper = thread::spawn(move || {
        thread::sleep(Duration::from_millis(30));
        handle.stop();
    });

    let outcome = clock.run(None).unwrap();
    stopper.join().unwrap();

    assert_eq!(outcome.final_state, ClockState::Stopped);
    assert!(outcome.ticks > 0);
    assert!(outcome.reports.is_empty());
    let vehicle = clock.world().vehicle(VehicleId(SimId(0))).unwrap();
    assert_eq!(vehicle.route.cursor() as u64, outcome.ticks);
}

#[test]
fn test_tick_limit_stops_run() {
    let mut clock = clock_with_routes(&[50]).with_interval(Duration::ZERO);
    let outcome = clock.run(Some(10)).unwrap();

    assert_eq!(outcome.final_state, ClockState::Stopped);
    assert_eq!(outcome.ticks, 10);
    assert!(outcome.reports.is_empty());
}

#[test]
fn test_explicit_stop_needs_running_clock() {
    let mut clock = clock_with_routes(&[10]);
    assert_eq!(clock.stop(), Err(SimError::NotRunning(ClockState::Idle)));
}

#[test]
fn test_dropped_receiver_does_not_break_run() {
    let (sender, receiver) = mpsc::channel();
    drop(receiver);

    let mut clock = clock_with_routes(&[5]).with_interval(Duration::ZERO);
    clock.add_observer(Box::new(ChannelObserver::new(sender)));

    let outcome = clock.run(None).unwrap();
    assert_eq!(outcome.final_state, ClockState::Completed);
}

#[test]
fn test_json_lines_observer_writes_one_event_per_line() {
    let mut world = SimWorld::with_config(manual_signals_config());
    let origin = GeoPoint::new(0.0, 0.0);
    let route = straight_route(origin, 2, 10.0);
    world.add_signal(route[1]);
    world.add_vehicle("AMB_001", priority(1), route);
    world.activate_vehicles();

    let result = world.tick();
    assert_eq!(result.completed.len(), 1);

    let mut observer = JsonLinesObserver::new(Vec::new());
    observer.on_snapshot(&result.snapshot);
    for report in &result.completed {
        observer.on_trip_completed(report);
    }
    observer.on_stopped(result.snapshot.tick);

    let output = String::from_utf8(observer.into_inner()).unwrap();
    let events: Vec<serde_json::Value> = output
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();

    assert_eq!(events.len(), 3);
    assert_eq!(events[0]["event"], "snapshot");
    assert_eq!(events[0]["tick"], 1);
    assert_eq!(events[0]["vehicles"][0]["label"], "AMB_001");
    assert_eq!(events[0]["vehicles"][0]["priority"], 1);
    assert_eq!(events[0]["vehicles"][0]["status"], "completed");
    assert_eq!(events[1]["event"], "trip_completed");
    assert_eq!(events[1]["ticks_travelled"], 1);
    assert_eq!(events[2]["event"], "stopped");
    assert_eq!(events[2]["tick"], 1);
}

#[test]
fn test_signal_is_held_by_its_controller() {
    let mut world = SimWorld::with_config(manual_signals_config());
    let origin = GeoPoint::new(0.0, 0.0);
    let signal = world.add_signal(origin);
    let near = world.add_vehicle("AMB_NEAR", priority(2), straight_route(origin, 10, 10.0));
    let far = world.add_vehicle(
        "AMB_FAR",
        priority(1),
        straight_route(east_of(origin, 1_000.0), 10, 10.0),
    );
    world.activate_vehicles();
    world.evaluate_signals();

    let signal = world.signal(signal).unwrap();
    assert!(signal.is_held_by(near));
    assert!(!signal.is_held_by(far));
}

#[test]
fn test_sub_meter_arc_length_spacing_fails_start() {
    let config = SimConfig {
        signal_placement: SignalPlacement::ByArcLength {
            offset_meters: 1e6,
            spacing_meters: 1e-12,
        },
        ..manual_signals_config()
    };
    assert!(matches!(config.validate(), Err(SimError::InvalidConfig(_))));

    let config = SimConfig {
        auto_place_signals: true,
        ..config
    };
    let mut world = SimWorld::with_config(config);
    world.add_vehicle("AMB_001", priority(1), straight_route(GeoPoint::new(0.0, 0.0), 200, 10.0));
    let mut clock = SimulationClock::new(world);

    assert!(matches!(clock.start(), Err(SimError::InvalidConfig(_))));
    assert_eq!(clock.state(), ClockState::Idle);
    assert!(clock.world().signals().is_empty());
}

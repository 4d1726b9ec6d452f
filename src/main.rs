use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use std::path::PathBuf;

use green_corridor::simulation::{
    ClockState, JsonLinesObserver, LogObserver, RadiusPolicy, Scenario, SignalPlacement,
    SimConfig, SimWorld, SimulationClock, DEFAULT_SIGNAL_SAMPLE_OFFSET,
    DEFAULT_SIGNAL_SAMPLE_STRIDE,
};

#[derive(Parser)]
#[command(name = "green_corridor")]
#[command(about = "Emergency vehicle green corridor simulation")]
struct Cli {
    /// Scenario file (JSON); the built-in two-ambulance demo runs when omitted
    #[arg(long)]
    scenario: Option<PathBuf>,

    /// Distance in meters within which a vehicle turns a signal green
    #[arg(long)]
    activation_radius: Option<f64>,

    /// Milliseconds between ticks (0 runs as fast as possible)
    #[arg(long)]
    tick_interval_ms: Option<u64>,

    /// Route points skipped before the first sampled signal
    #[arg(long)]
    signal_offset: Option<usize>,

    /// Route points between sampled signals
    #[arg(long)]
    signal_stride: Option<usize>,

    /// Sample signals every N meters of route instead of every N points
    #[arg(long)]
    arc_length_spacing: Option<f64>,

    /// Meters travelled before the first arc-length sampled signal
    #[arg(long, default_value = "0")]
    arc_length_offset: f64,

    /// Shrink the activation radius for less urgent vehicles
    #[arg(long)]
    radius_by_severity: bool,

    /// Stop the run after this many ticks
    #[arg(long)]
    max_ticks: Option<u64>,

    /// Write snapshots as JSON lines to stdout
    #[arg(long)]
    json: bool,

    /// Seed for jittering the demo routes
    #[arg(long)]
    seed: Option<u64>,
}

impl Cli {
    /// Apply command line overrides on top of a base configuration
    fn apply_overrides(&self, mut config: SimConfig) -> SimConfig {
        if let Some(radius) = self.activation_radius {
            config.activation_radius_meters = radius;
        }
        if let Some(interval) = self.tick_interval_ms {
            config.tick_interval_ms = interval;
        }
        if self.radius_by_severity {
            config.radius_policy = RadiusPolicy::BySeverity;
        }

        if let Some(spacing) = self.arc_length_spacing {
            config.signal_placement = SignalPlacement::ByArcLength {
                offset_meters: self.arc_length_offset,
                spacing_meters: spacing,
            };
        } else if self.signal_offset.is_some() || self.signal_stride.is_some() {
            let (offset, stride) = match config.signal_placement {
                SignalPlacement::ByIndex { offset, stride } => (offset, stride),
                SignalPlacement::ByArcLength { .. } => {
                    (DEFAULT_SIGNAL_SAMPLE_OFFSET, DEFAULT_SIGNAL_SAMPLE_STRIDE)
                }
            };
            config.signal_placement = SignalPlacement::ByIndex {
                offset: self.signal_offset.unwrap_or(offset),
                stride: self.signal_stride.unwrap_or(stride),
            };
        }

        config
    }

    fn build_world(&self) -> Result<SimWorld> {
        match &self.scenario {
            Some(path) => {
                let mut scenario = Scenario::load(path)
                    .with_context(|| format!("Failed to load scenario {}", path.display()))?;
                scenario.config = self.apply_overrides(scenario.config);
                Ok(scenario.into_world())
            }
            None => {
                let config = self.apply_overrides(SimConfig::default());
                Ok(match self.seed {
                    Some(seed) => SimWorld::create_demo_world_with_seed(config, seed),
                    None => SimWorld::create_demo_world(config),
                })
            }
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("warn,green_corridor=info"),
    )
    .init();

    let cli = Cli::parse();
    let world = cli.build_world()?;

    let mut clock = SimulationClock::new(world);
    clock.add_observer(Box::new(LogObserver));
    if cli.json {
        clock.add_observer(Box::new(JsonLinesObserver::new(std::io::stdout())));
    }

    let outcome = clock
        .run(cli.max_ticks)
        .context("Simulation failed to start")?;

    let world = clock.world();
    match outcome.final_state {
        ClockState::Completed => info!("=== SIMULATION COMPLETE ==="),
        _ => info!("=== SIMULATION STOPPED ==="),
    }
    info!("Ticks run: {}", outcome.ticks);
    info!(
        "Vehicles completed: {}/{}",
        world.completed_count(),
        world.vehicle_count()
    );
    info!("Signals placed: {}", world.signals().len());
    info!("Conflicts resolved: {}", world.total_conflicts());
    for report in &outcome.reports {
        info!("Trip: {}", report.summary());
    }

    if !cli.json {
        world.print_summary();
    }

    Ok(())
}

//! Simulation configuration
//!
//! Every field has a default, so a scenario file only needs to name the
//! values it wants to change.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::error::{Result, SimError};
use super::priority::Priority;
use super::types::{
    DEFAULT_ACTIVATION_RADIUS_METERS, DEFAULT_SIGNAL_DELAY_SECS, DEFAULT_SIGNAL_SAMPLE_OFFSET,
    DEFAULT_SIGNAL_SAMPLE_STRIDE, DEFAULT_TICK_INTERVAL_MS, SIGNAL_MERGE_DISTANCE_METERS,
};

/// How signals are sampled from a route's geometry
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum SignalPlacement {
    /// Every `stride` points, starting at point `offset`
    ByIndex { offset: usize, stride: usize },
    /// Every `spacing_meters` of travelled distance, starting `offset_meters` in
    ByArcLength {
        offset_meters: f64,
        spacing_meters: f64,
    },
}

impl Default for SignalPlacement {
    fn default() -> Self {
        SignalPlacement::ByIndex {
            offset: DEFAULT_SIGNAL_SAMPLE_OFFSET,
            stride: DEFAULT_SIGNAL_SAMPLE_STRIDE,
        }
    }
}

/// How a vehicle's activation radius is chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RadiusPolicy {
    /// Every vehicle uses the configured radius
    #[default]
    Fixed,
    /// The configured radius is scaled down for less urgent vehicles
    BySeverity,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub activation_radius_meters: f64,
    pub tick_interval_ms: u64,
    pub signal_placement: SignalPlacement,
    pub radius_policy: RadiusPolicy,
    /// Sample signals from every vehicle's route when the clock starts
    pub auto_place_signals: bool,
    /// Time a red signal would have cost a vehicle, for the travel-time report
    pub signal_delay_secs: f64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            activation_radius_meters: DEFAULT_ACTIVATION_RADIUS_METERS,
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
            signal_placement: SignalPlacement::default(),
            radius_policy: RadiusPolicy::default(),
            auto_place_signals: true,
            signal_delay_secs: DEFAULT_SIGNAL_DELAY_SECS,
        }
    }
}

impl SimConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Activation radius for a vehicle of the given priority
    pub fn radius_for(&self, priority: Priority) -> f64 {
        match self.radius_policy {
            RadiusPolicy::Fixed => self.activation_radius_meters,
            RadiusPolicy::BySeverity => {
                self.activation_radius_meters * priority.urgency().radius_factor()
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.activation_radius_meters.is_finite() || self.activation_radius_meters <= 0.0 {
            return Err(SimError::InvalidConfig(format!(
                "activation radius must be a positive number of meters, got {}",
                self.activation_radius_meters
            )));
        }

        if !self.signal_delay_secs.is_finite() || self.signal_delay_secs < 0.0 {
            return Err(SimError::InvalidConfig(format!(
                "signal delay must be non-negative, got {}",
                self.signal_delay_secs
            )));
        }

        match self.signal_placement {
            SignalPlacement::ByIndex { stride, .. } if stride == 0 => Err(SimError::InvalidConfig(
                "signal sample stride must be at least 1".to_string(),
            )),
            SignalPlacement::ByArcLength {
                offset_meters,
                spacing_meters,
            } if !spacing_meters.is_finite()
                || spacing_meters < SIGNAL_MERGE_DISTANCE_METERS
                || !offset_meters.is_finite() =>
            {
                Err(SimError::InvalidConfig(format!(
                    "signal spacing must be at least {} m, got {}",
                    SIGNAL_MERGE_DISTANCE_METERS, spacing_meters
                )))
            }
            _ => Ok(()),
        }
    }
}

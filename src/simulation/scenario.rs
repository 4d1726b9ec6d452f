//! Load simulation scenarios from JSON
//!
//! A scenario carries the routes the routing collaborator resolved, the
//! vehicles' priorities, optional fixed signals and optional config overrides.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use super::config::SimConfig;
use super::priority::{Priority, UrgencyBand};
use super::types::GeoPoint;
use super::world::SimWorld;

/// Errors that can occur when loading a scenario
#[derive(Debug, Error)]
pub enum ScenarioError {
    /// JSON parsing failed
    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),
    /// File I/O error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleSpec {
    pub label: String,
    /// Explicit priority level; wins over `urgency` when both are given
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    /// Free-form urgency classification such as "HIGH" or "low"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub urgency: Option<String>,
    pub route: Vec<GeoPoint>,
}

impl VehicleSpec {
    /// Priority the vehicle runs with
    ///
    /// A vehicle with neither a level nor a classification is unclassified.
    pub fn resolved_priority(&self) -> Priority {
        match (self.priority, &self.urgency) {
            (Some(priority), _) => priority,
            (None, Some(text)) => UrgencyBand::classify(text).default_priority(),
            (None, None) => Priority::OTHER,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub config: SimConfig,
    pub vehicles: Vec<VehicleSpec>,
    #[serde(default)]
    pub signals: Vec<GeoPoint>,
}

impl Scenario {
    /// Load a scenario from a JSON string
    pub fn from_json(json: &str) -> Result<Self, ScenarioError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a scenario from a JSON file on disk
    pub fn load(path: &Path) -> Result<Self, ScenarioError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn to_json(&self) -> Result<String, ScenarioError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Build a world holding this scenario's vehicles and signals
    pub fn into_world(self) -> SimWorld {
        let mut world = SimWorld::with_config(self.config);
        for vehicle in self.vehicles {
            let priority = vehicle.resolved_priority();
            world.add_vehicle(vehicle.label, priority, vehicle.route);
        }
        for signal in self.signals {
            world.add_signal(signal);
        }
        world
    }
}

//! Emergency priority levels
//!
//! Lower numbers are more urgent. The canonical scale runs from 1 (cardiac
//! arrest) to 5 (other / unclassified); anything above 5 is treated as
//! unclassified.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::error::{Result, SimError};

/// Priority level of a vehicle's emergency
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Priority(u32);

impl Priority {
    pub const CARDIAC_ARREST: Priority = Priority(1);
    pub const STROKE: Priority = Priority(2);
    pub const ACCIDENT: Priority = Priority(3);
    pub const CRITICAL_TRANSFER: Priority = Priority(4);
    pub const OTHER: Priority = Priority(5);

    pub fn new(level: u32) -> Result<Self> {
        if level == 0 {
            return Err(SimError::InvalidPriority(level));
        }
        Ok(Self(level))
    }

    pub fn level(&self) -> u32 {
        self.0
    }

    pub fn severity(&self) -> Severity {
        Severity::from_level(self.0)
    }

    pub fn urgency(&self) -> UrgencyBand {
        self.severity().urgency()
    }
}

impl TryFrom<u32> for Priority {
    type Error = SimError;

    fn try_from(level: u32) -> Result<Self> {
        Priority::new(level)
    }
}

impl From<Priority> for u32 {
    fn from(priority: Priority) -> u32 {
        priority.0
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0)
    }
}

/// Emergency category behind a priority level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    CardiacArrest,
    Stroke,
    Accident,
    CriticalTransfer,
    Other,
}

impl Severity {
    pub fn from_level(level: u32) -> Self {
        match level {
            1 => Severity::CardiacArrest,
            2 => Severity::Stroke,
            3 => Severity::Accident,
            4 => Severity::CriticalTransfer,
            _ => Severity::Other,
        }
    }

    /// Short label shown next to a vehicle
    pub fn label(&self) -> &'static str {
        match self {
            Severity::CardiacArrest => "CRITICAL",
            Severity::Stroke => "HIGH",
            Severity::Accident => "MEDIUM",
            Severity::CriticalTransfer => "LOW",
            Severity::Other => "NORMAL",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Severity::CardiacArrest => "Cardiac Arrest",
            Severity::Stroke => "Stroke",
            Severity::Accident => "Accident",
            Severity::CriticalTransfer => "Critical Transfer",
            Severity::Other => "Other",
        }
    }

    pub fn urgency(&self) -> UrgencyBand {
        match self {
            Severity::CardiacArrest | Severity::Stroke => UrgencyBand::High,
            Severity::Accident => UrgencyBand::Medium,
            Severity::CriticalTransfer | Severity::Other => UrgencyBand::Low,
        }
    }
}

/// Coarse three-level urgency classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UrgencyBand {
    High,
    Medium,
    Low,
}

impl UrgencyBand {
    /// Parse a free-form classification, falling back to `High` when the
    /// text is not recognised
    pub fn classify(text: &str) -> Self {
        text.parse().unwrap_or(UrgencyBand::High)
    }

    /// Priority assigned to a vehicle created from this classification
    pub fn default_priority(&self) -> Priority {
        match self {
            UrgencyBand::High => Priority::CARDIAC_ARREST,
            UrgencyBand::Medium => Priority::ACCIDENT,
            UrgencyBand::Low => Priority::OTHER,
        }
    }

    /// Fraction of the configured activation radius used by this band
    /// (150 m / 100 m / 70 m at the default radius)
    pub fn radius_factor(&self) -> f64 {
        match self {
            UrgencyBand::High => 1.0,
            UrgencyBand::Medium => 100.0 / 150.0,
            UrgencyBand::Low => 70.0 / 150.0,
        }
    }
}

impl FromStr for UrgencyBand {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "HIGH" => Ok(UrgencyBand::High),
            "MEDIUM" => Ok(UrgencyBand::Medium),
            "LOW" => Ok(UrgencyBand::Low),
            other => Err(format!("unknown urgency '{}'", other)),
        }
    }
}

//! Green Corridor Simulation Library
//!
//! Simulates emergency vehicles preempting traffic signals along their routes,
//! arbitrating contested signals by emergency priority.

pub mod simulation;

//! # loadgen-core
//!
//! Programmable CPU load generation for cpuloadgen.
//!
//! This crate provides:
//! - A per-unit load controller that modulates a CPU's busy/idle ratio
//!   toward a target percentage (PWM principle applied to synthetic work)
//! - An opaque [`Workload`] capability plus a builtin Dhrystone-flavored
//!   CPU-bound kernel
//! - Request/validation types and per-run reports
//!
//! Each controller owns its run exclusively; the caller spawns one thread
//! per target unit and moves that unit's [`LoadRequest`] into it.

pub mod controller;
pub mod request;
pub mod workload;

// Re-export commonly used types at the crate root
pub use controller::{LoadController, RunReport};
pub use request::{LoadRequest, RunDuration};
pub use workload::{Dhrystone, Workload};

// Error handling
#[derive(Debug, thiserror::Error)]
pub enum LoadgenError {
    /// Load percentage or duration outside the accepted range
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Target unit index does not exist on this system
    #[error("unsupported unit: cpu{0}")]
    UnsupportedUnit(u32),

    /// Worker thread could not be created for a unit
    #[error("failed to launch worker for cpu{unit}: {reason}")]
    LaunchFailure { unit: u32, reason: String },
}

pub type Result<T> = std::result::Result<T, LoadgenError>;

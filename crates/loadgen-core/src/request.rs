//! Load request types and validation

use crate::{LoadgenError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// How long a load generation run should last
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunDuration {
    /// Run for the given number of whole seconds
    Bounded(u64),
    /// Run until the process is terminated
    Unbounded,
}

impl RunDuration {
    /// Whole seconds for a bounded run, `None` when unbounded
    pub fn seconds(&self) -> Option<u64> {
        match self {
            RunDuration::Bounded(secs) => Some(*secs),
            RunDuration::Unbounded => None,
        }
    }
}

impl fmt::Display for RunDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunDuration::Bounded(secs) => write!(f, "{}s", secs),
            RunDuration::Unbounded => write!(f, "unbounded"),
        }
    }
}

/// One unit's load assignment, immutable once a run starts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadRequest {
    /// Target CPU core index
    pub unit_id: u32,

    /// Average load to deliver on that core, in [1, 100]
    pub target_load_percent: u32,

    /// Run length
    pub duration: RunDuration,
}

impl LoadRequest {
    /// Create a validated request
    pub fn new(unit_id: u32, target_load_percent: u32, duration: RunDuration) -> Result<Self> {
        let request = Self { unit_id, target_load_percent, duration };
        request.validate()?;
        Ok(request)
    }

    /// Validate the load percentage and duration ranges
    pub fn validate(&self) -> Result<()> {
        if self.target_load_percent < 1 || self.target_load_percent > 100 {
            return Err(LoadgenError::InvalidArgument(format!(
                "load must be in [1, 100], got {}",
                self.target_load_percent
            )));
        }
        if let RunDuration::Bounded(secs) = self.duration {
            if secs < 1 {
                return Err(LoadgenError::InvalidArgument(
                    "duration must be at least 1 second".to_string(),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_requests() {
        assert!(LoadRequest::new(0, 1, RunDuration::Unbounded).is_ok());
        assert!(LoadRequest::new(3, 100, RunDuration::Bounded(1)).is_ok());
        assert!(LoadRequest::new(7, 50, RunDuration::Bounded(3600)).is_ok());
    }

    #[test]
    fn test_load_out_of_range() {
        let err = LoadRequest::new(0, 0, RunDuration::Unbounded).unwrap_err();
        assert!(matches!(err, LoadgenError::InvalidArgument(_)));

        let err = LoadRequest::new(0, 101, RunDuration::Unbounded).unwrap_err();
        assert!(matches!(err, LoadgenError::InvalidArgument(_)));
    }

    #[test]
    fn test_zero_duration_rejected() {
        let err = LoadRequest::new(0, 50, RunDuration::Bounded(0)).unwrap_err();
        assert!(matches!(err, LoadgenError::InvalidArgument(_)));
    }

    #[test]
    fn test_duration_display() {
        assert_eq!(RunDuration::Bounded(10).to_string(), "10s");
        assert_eq!(RunDuration::Unbounded.to_string(), "unbounded");
        assert_eq!(RunDuration::Bounded(10).seconds(), Some(10));
        assert_eq!(RunDuration::Unbounded.seconds(), None);
    }
}

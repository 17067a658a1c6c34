//! Assignment grammar for the cpuloadgen command line
//!
//! Arguments are free-form `cpu<N>=<percent>` assignments plus an optional
//! `duration=<seconds>`, accepted in any order. With no cpu assignment,
//! every online core gets 100%.

use loadgen_core::{LoadRequest, LoadgenError, Result, RunDuration};

/// Build one validated request per selected unit.
///
/// `unit_count` is the number of online cores; `cpu<N>` with `N` at or past
/// it is rejected as unsupported. A repeated assignment to the same core
/// keeps the last value.
pub fn build_requests(assignments: &[String], unit_count: u32) -> Result<Vec<LoadRequest>> {
    let mut loads: Vec<Option<u32>> = vec![None; unit_count as usize];
    let mut duration = RunDuration::Unbounded;
    let mut any_cpu_assignment = false;

    for assignment in assignments {
        let (key, value) = assignment.split_once('=').ok_or_else(|| {
            LoadgenError::InvalidArgument(format!("malformed assignment: {}", assignment))
        })?;

        if key == "duration" {
            let secs: u64 = value.parse().map_err(|_| {
                LoadgenError::InvalidArgument(format!("bad duration: {}", value))
            })?;
            if secs < 1 {
                return Err(LoadgenError::InvalidArgument(
                    "duration must be at least 1 second".to_string(),
                ));
            }
            duration = RunDuration::Bounded(secs);
        } else if let Some(index) = key.strip_prefix("cpu") {
            let unit: u32 = index.parse().map_err(|_| {
                LoadgenError::InvalidArgument(format!("bad unit index: {}", key))
            })?;
            if unit >= unit_count {
                return Err(LoadgenError::UnsupportedUnit(unit));
            }
            let percent: u32 = value.parse().map_err(|_| {
                LoadgenError::InvalidArgument(format!("bad load value: {}", value))
            })?;
            loads[unit as usize] = Some(percent);
            any_cpu_assignment = true;
        } else {
            return Err(LoadgenError::InvalidArgument(format!(
                "unrecognized assignment: {}",
                assignment
            )));
        }
    }

    let mut requests = Vec::new();
    for unit in 0..unit_count {
        let percent = match (loads[unit as usize], any_cpu_assignment) {
            (Some(percent), _) => percent,
            // Default: saturate every core
            (None, false) => 100,
            (None, true) => continue,
        };
        requests.push(LoadRequest::new(unit, percent, duration)?);
    }
    Ok(requests)
}

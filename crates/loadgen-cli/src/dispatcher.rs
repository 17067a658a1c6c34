//! Thread-per-unit dispatch
//!
//! Each request is moved by value into its own worker thread, so a worker
//! never reads dispatcher-owned loop state. Units are fully independent:
//! a launch or run failure on one is reported and the others proceed.

use loadgen_core::{Dhrystone, LoadController, LoadRequest, LoadgenError, RunReport};
use std::thread;
use tracing::{error, warn};

/// Outcome of dispatching a set of requests
#[derive(Debug, Default)]
pub struct DispatchSummary {
    /// Reports from units that ran to completion
    pub reports: Vec<RunReport>,
    /// Units that failed to launch or failed during their run
    pub failed_units: Vec<u32>,
}

impl DispatchSummary {
    pub fn all_succeeded(&self) -> bool {
        self.failed_units.is_empty()
    }
}

/// Spawn one worker per request, join them all, and aggregate the outcome.
pub fn run_all(requests: Vec<LoadRequest>) -> DispatchSummary {
    let mut summary = DispatchSummary::default();
    let mut handles = Vec::new();

    for request in requests {
        let unit = request.unit_id;
        let spawned = thread::Builder::new()
            .name(format!("loadgen-cpu{}", unit))
            .spawn(move || {
                let controller = LoadController::new(Dhrystone);
                controller.run(&request)
            });

        match spawned {
            Ok(handle) => handles.push((unit, handle)),
            Err(e) => {
                let failure = LoadgenError::LaunchFailure { unit, reason: e.to_string() };
                warn!("{}, skipping unit", failure);
                summary.failed_units.push(unit);
            }
        }
    }

    for (unit, handle) in handles {
        match handle.join() {
            Ok(Ok(report)) => summary.reports.push(report),
            Ok(Err(e)) => {
                error!("cpu{}: {}", unit, e);
                summary.failed_units.push(unit);
            }
            Err(_) => {
                error!("cpu{}: worker panicked", unit);
                summary.failed_units.push(unit);
            }
        }
    }

    summary
}

//! Per-request stage timings and process resource sampling.

use std::sync::Mutex;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use sysinfo::{Pid, System};
use tracing::warn;

/// Wall-clock seconds per pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StageTimings {
    pub context_retrieval: f64,
    pub prompt_building: f64,
    pub response_generation: f64,
    pub total: f64,
}

impl StageTimings {
    pub fn from_durations(
        context_retrieval: Duration,
        prompt_building: Duration,
        response_generation: Duration,
        total: Duration,
    ) -> Self {
        Self {
            context_retrieval: context_retrieval.as_secs_f64(),
            prompt_building: prompt_building.as_secs_f64(),
            response_generation: response_generation.as_secs_f64(),
            total: total.as_secs_f64(),
        }
    }
}

/// Process CPU and resident memory at one checkpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceSample {
    /// CPU usage since the previous refresh of the same probe, where 100 is
    /// one full core. The first sample of a probe has no reference point and
    /// reads 0, and samples taken a few milliseconds apart usually read 0 too.
    pub cpu_percent: f32,
    /// Resident set size in MiB.
    pub memory_mb: f64,
}

/// Samples taken at request start, after retrieval and after generation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResourceReport {
    pub start: ResourceSample,
    pub after_retrieval: ResourceSample,
    pub after_generation: ResourceSample,
}

/// Reads CPU and memory of the current process.
///
/// Sampling never fails: when the process cannot be inspected the
/// sample is zeroed.
pub struct ResourceProbe {
    pid: Option<Pid>,
    system: Mutex<System>,
}

impl ResourceProbe {
    pub fn new() -> Self {
        let pid = match sysinfo::get_current_pid() {
            Ok(pid) => Some(pid),
            Err(e) => {
                warn!(error = e, "cannot resolve current pid; resource samples will be zero");
                None
            }
        };
        Self {
            pid,
            system: Mutex::new(System::new()),
        }
    }

    /// Refreshes the process entry and returns its current usage.
    pub fn sample(&self) -> ResourceSample {
        let Some(pid) = self.pid else {
            return ResourceSample::default();
        };

        let mut system = self.system.lock().unwrap_or_else(|p| p.into_inner());
        if !system.refresh_process(pid) {
            return ResourceSample::default();
        }

        system
            .process(pid)
            .map(|p| ResourceSample {
                cpu_percent: p.cpu_usage(),
                memory_mb: p.memory() as f64 / (1024.0 * 1024.0),
            })
            .unwrap_or_default()
    }
}

impl Default for ResourceProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ResourceProbe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceProbe").field("pid", &self.pid).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn samples_current_process() {
        let probe = ResourceProbe::new();
        let sample = probe.sample();
        assert!(sample.memory_mb > 0.0);
        assert!(sample.cpu_percent >= 0.0);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn first_sample_has_no_cpu_reference() {
        let probe = ResourceProbe::new();
        assert_eq!(probe.sample().cpu_percent, 0.0);
        assert!(probe.sample().cpu_percent >= 0.0);
    }

    #[test]
    fn timings_serialize_in_stage_order() {
        let t = StageTimings::from_durations(
            Duration::from_millis(1500),
            Duration::from_millis(250),
            Duration::from_secs(3),
            Duration::from_millis(4750),
        );
        let json = serde_json::to_string(&t).unwrap();
        assert_eq!(
            json,
            r#"{"context_retrieval":1.5,"prompt_building":0.25,"response_generation":3.0,"total":4.75}"#
        );
    }
}

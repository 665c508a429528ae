use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Wall-clock duration of one healing stage.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageTiming {
    pub label: String,
    pub elapsed_ms: f64,
}

/// Per-stage timings of one healing call, in execution order.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimingBreakdown {
    pub total_ms: f64,
    pub stages: Vec<StageTiming>,
}

impl TimingBreakdown {
    /// Run `stage`, recording its duration under `label`.
    pub fn time<T>(&mut self, label: &str, stage: impl FnOnce() -> T) -> T {
        let start = Instant::now();
        let out = stage();
        self.stages.push(StageTiming {
            label: label.to_owned(),
            elapsed_ms: elapsed_ms(start),
        });
        out
    }

    pub fn stage_ms(&self, label: &str) -> Option<f64> {
        self.stages
            .iter()
            .find(|s| s.label == label)
            .map(|s| s.elapsed_ms)
    }

    /// Sum of the recorded stages; `total_ms` also covers validation.
    pub fn stages_ms(&self) -> f64 {
        self.stages.iter().map(|s| s.elapsed_ms).sum()
    }
}

#[inline]
pub fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

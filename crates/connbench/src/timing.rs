//! Wall-clock timing records

use connbench_kernel::ExtractionStrategy;
use std::time::Duration;

/// One timed phase
#[derive(Debug, Clone, PartialEq)]
pub struct PhaseTiming {
    /// Phase label as printed
    pub label: String,
    /// Elapsed wall-clock time
    pub elapsed: Duration,
}

/// Repeated-trial durations grouped by extraction strategy
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrialBuckets {
    /// Trials run with the custom path
    pub custom: Vec<Duration>,
    /// Trials run with the standard path
    pub standard: Vec<Duration>,
}

impl TrialBuckets {
    /// Add one trial to the bucket for `strategy`
    pub fn push(&mut self, strategy: ExtractionStrategy, elapsed: Duration) {
        match strategy {
            ExtractionStrategy::Custom => self.custom.push(elapsed),
            ExtractionStrategy::Standard => self.standard.push(elapsed),
        }
    }

    /// Total number of trials recorded
    pub fn len(&self) -> usize {
        self.custom.len() + self.standard.len()
    }

    /// True when no trial has been recorded
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Mean custom-path duration in seconds (NaN when empty)
    pub fn custom_mean_secs(&self) -> f64 {
        mean_secs(&self.custom)
    }

    /// Mean standard-path duration in seconds (NaN when empty)
    pub fn standard_mean_secs(&self) -> f64 {
        mean_secs(&self.standard)
    }
}

/// Arithmetic mean in seconds; NaN for an empty slice
pub fn mean_secs(samples: &[Duration]) -> f64 {
    if samples.is_empty() {
        return f64::NAN;
    }
    samples.iter().map(Duration::as_secs_f64).sum::<f64>() / samples.len() as f64
}

/// Ordered phase timings plus trial buckets for one run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimingRecord {
    phases: Vec<PhaseTiming>,
    trials: TrialBuckets,
}

impl TimingRecord {
    /// Empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a phase
    pub fn record(&mut self, label: impl Into<String>, elapsed: Duration) {
        self.phases.push(PhaseTiming {
            label: label.into(),
            elapsed,
        });
    }

    /// Append a trial to its bucket
    pub fn record_trial(&mut self, strategy: ExtractionStrategy, elapsed: Duration) {
        self.trials.push(strategy, elapsed);
    }

    /// Phases in recording order
    pub fn phases(&self) -> &[PhaseTiming] {
        &self.phases
    }

    /// First phase named `label`
    pub fn phase(&self, label: &str) -> Option<Duration> {
        self.phases.iter().find(|p| p.label == label).map(|p| p.elapsed)
    }

    /// Trial buckets
    pub fn trials(&self) -> &TrialBuckets {
        &self.trials
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_of_empty_is_nan() {
        assert!(mean_secs(&[]).is_nan());
        assert!(TrialBuckets::default().custom_mean_secs().is_nan());
    }

    #[test]
    fn test_mean() {
        let samples = [Duration::from_millis(100), Duration::from_millis(300)];
        assert!((mean_secs(&samples) - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_buckets_by_strategy() {
        let mut record = TimingRecord::new();
        record.record_trial(ExtractionStrategy::Custom, Duration::from_millis(2));
        record.record_trial(ExtractionStrategy::Standard, Duration::from_millis(4));
        record.record_trial(ExtractionStrategy::Standard, Duration::from_millis(6));

        let trials = record.trials();
        assert_eq!(trials.len(), 3);
        assert_eq!(trials.custom.len(), 1);
        assert!((trials.standard_mean_secs() - 0.005).abs() < 1e-12);
    }

    #[test]
    fn test_phase_order() {
        let mut record = TimingRecord::new();
        record.record("Create", Duration::from_secs(1));
        record.record("Connect", Duration::from_secs(2));
        let labels: Vec<_> = record.phases().iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, ["Create", "Connect"]);
        assert_eq!(record.phase("Connect"), Some(Duration::from_secs(2)));
        assert_eq!(record.phase("Simulate"), None);
    }
}

//! Run summaries: printed lines and JSON

use crate::timing::TimingRecord;
use serde::Serialize;
use std::fmt;

/// Elapsed seconds for one phase
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhaseReport {
    /// Phase label
    pub label: String,
    /// Elapsed wall-clock seconds
    pub secs: f64,
}

/// Summary of one scenario run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    /// Scenario name
    pub scenario: String,
    /// Backend thread count used
    pub threads: usize,
    /// Edges returned by the query
    pub edges: usize,
    /// Phases in execution order
    pub phases: Vec<PhaseReport>,
    /// Whether the scenario runs extraction trials; averages are printed even for zero trials
    pub trial_run: bool,
    /// Trials run
    pub trials: usize,
    /// Mean custom-path extraction time (NaN, or null in JSON, without trials)
    pub custom_avg_secs: f64,
    /// Mean standard-path extraction time (NaN, or null in JSON, without trials)
    pub standard_avg_secs: f64,
}

impl RunReport {
    /// Summarise `timings`
    pub fn new(scenario: &str, threads: usize, edges: usize, timings: &TimingRecord) -> Self {
        let trials = timings.trials();
        Self {
            scenario: scenario.to_string(),
            threads,
            edges,
            phases: timings
                .phases()
                .iter()
                .map(|p| PhaseReport {
                    label: p.label.clone(),
                    secs: p.elapsed.as_secs_f64(),
                })
                .collect(),
            trial_run: false,
            trials: trials.len(),
            custom_avg_secs: trials.custom_mean_secs(),
            standard_avg_secs: trials.standard_mean_secs(),
        }
    }

    /// Mark the run as a repeated-trial run
    pub fn with_trial_run(mut self) -> Self {
        self.trial_run = true;
        self
    }

    /// Seconds for the first phase named `label`
    pub fn phase_secs(&self, label: &str) -> Option<f64> {
        self.phases.iter().find(|p| p.label == label).map(|p| p.secs)
    }

    /// Pretty JSON encoding
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for phase in &self.phases {
            writeln!(f, "{}: {} seconds", phase.label, phase.secs)?;
        }
        if self.trial_run {
            writeln!(f, "custom avg:\t{}", self.custom_avg_secs)?;
            writeln!(f, "standard avg:\t{}", self.standard_avg_secs)?;
        }
        Ok(())
    }
}

//! Progress notification port
//!
//! Defines the interface for reporting progress while a simulation runs.

use socialsim_domain::{PairKey, PairOutcome, StepPlan};

/// Callback for progress updates during a simulation
///
/// Implementations live in the presentation layer and can display
/// progress in various ways (progress bars, plain log lines, etc.)
pub trait SimulationProgress: Send + Sync {
    /// Called once before the first step
    fn on_simulation_start(&self, _agents: usize, _total_pairs: usize, _max_steps: usize) {}

    /// Called when a step's pairs have been formed
    fn on_step_start(&self, plan: &StepPlan);

    /// Called after every utterance
    fn on_utterance(&self, _speaker: &str, _listener: &str, _degraded: bool) {}

    /// Called when a pair's conversation concludes
    fn on_pair_complete(&self, pair: &PairKey, outcome: PairOutcome, completed: usize, total: usize);

    /// Called when a step finishes
    fn on_step_complete(&self, step: usize, completed: usize, total: usize);

    /// Called once after the last step
    fn on_simulation_complete(&self, _completed: usize, _total: usize) {}
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl SimulationProgress for NoProgress {
    fn on_step_start(&self, _plan: &StepPlan) {}
    fn on_pair_complete(
        &self,
        _pair: &PairKey,
        _outcome: PairOutcome,
        _completed: usize,
        _total: usize,
    ) {
    }
    fn on_step_complete(&self, _step: usize, _completed: usize, _total: usize) {}
}

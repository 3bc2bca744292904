//! Progress reporting for simulation runs

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use socialsim_application::SimulationProgress;
use socialsim_domain::{PairKey, PairOutcome, PairOrigin, StepPlan};
use std::sync::Mutex;

fn outcome_label(outcome: PairOutcome) -> &'static str {
    match outcome {
        PairOutcome::Suspended => "continues next step",
        PairOutcome::EndedBySentinel => "said goodbye",
        PairOutcome::EndedByBudget => "ran out of messages",
    }
}

/// Reports progress with a conversation bar and a per-step message
pub struct ProgressReporter {
    bar: Mutex<Option<ProgressBar>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            bar: Mutex::new(None),
        }
    }

    fn bar_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-")
    }

    fn with_bar(&self, f: impl FnOnce(&ProgressBar)) {
        if let Ok(guard) = self.bar.lock()
            && let Some(bar) = guard.as_ref()
        {
            f(bar);
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulationProgress for ProgressReporter {
    fn on_simulation_start(&self, agents: usize, total_pairs: usize, _max_steps: usize) {
        let bar = ProgressBar::new(total_pairs as u64);
        bar.set_style(Self::bar_style());
        bar.set_prefix("Conversations");
        bar.set_message(format!("{} agents", agents));
        if let Ok(mut guard) = self.bar.lock() {
            *guard = Some(bar);
        }
    }

    fn on_step_start(&self, plan: &StepPlan) {
        self.with_bar(|bar| {
            bar.set_message(format!("step {} ({} pairs)", plan.step, plan.pairs.len()));
        });
    }

    fn on_utterance(&self, speaker: &str, _listener: &str, degraded: bool) {
        if degraded {
            self.with_bar(|bar| {
                bar.println(format!("  {} {} got no reply from the model", "!".yellow(), speaker));
            });
        } else {
            self.with_bar(|bar| bar.tick());
        }
    }

    fn on_pair_complete(&self, pair: &PairKey, outcome: PairOutcome, _completed: usize, _total: usize) {
        self.with_bar(|bar| {
            if outcome.is_concluded() {
                bar.inc(1);
            }
            bar.set_message(format!("{} {}", pair, outcome_label(outcome)));
        });
    }

    fn on_step_complete(&self, step: usize, completed: usize, _total: usize) {
        self.with_bar(|bar| {
            bar.set_position(completed as u64);
            bar.set_message(format!("step {} done", step));
        });
    }

    fn on_simulation_complete(&self, completed: usize, total: usize) {
        if let Ok(mut guard) = self.bar.lock()
            && let Some(bar) = guard.take()
        {
            let message = if completed == total {
                "all conversations complete!".green().to_string()
            } else {
                format!("{} of {} conversations", completed, total)
                    .yellow()
                    .to_string()
            };
            bar.finish_with_message(message);
        }
    }
}

/// Simple text-based progress (no fancy UI)
pub struct SimpleProgress;

impl SimulationProgress for SimpleProgress {
    fn on_simulation_start(&self, agents: usize, total_pairs: usize, max_steps: usize) {
        println!(
            "{} {} agents, {} possible conversations, up to {} time steps",
            "->".cyan(),
            agents,
            total_pairs,
            max_steps
        );
    }

    fn on_step_start(&self, plan: &StepPlan) {
        println!("{} {}", "->".cyan(), format!("Time step {}", plan.step).bold());
        for pair in &plan.pairs {
            let origin = match pair.origin {
                PairOrigin::New => "new",
                PairOrigin::Resumed => "resumed",
                PairOrigin::CarriedOver => "continuing",
            };
            println!("  {} ({})", pair.key, origin);
        }
    }

    fn on_pair_complete(&self, pair: &PairKey, outcome: PairOutcome, completed: usize, total: usize) {
        if outcome.is_concluded() {
            println!(
                "  {} {} {} [{}/{}]",
                "v".green(),
                pair,
                outcome_label(outcome),
                completed,
                total
            );
        } else {
            println!("  {} {} {}", "~".yellow(), pair, outcome_label(outcome));
        }
    }

    fn on_step_complete(&self, _step: usize, _completed: usize, _total: usize) {
        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_labels_are_distinct() {
        let labels = [
            outcome_label(PairOutcome::Suspended),
            outcome_label(PairOutcome::EndedBySentinel),
            outcome_label(PairOutcome::EndedByBudget),
        ];
        assert_ne!(labels[0], labels[1]);
        assert_ne!(labels[1], labels[2]);
    }

    #[test]
    fn test_reporter_without_start_is_noop() {
        let reporter = ProgressReporter::new();
        let pair = PairKey::new("alice", "bob").unwrap();
        reporter.on_pair_complete(&pair, PairOutcome::EndedByBudget, 1, 1);
        reporter.on_simulation_complete(1, 1);
    }
}

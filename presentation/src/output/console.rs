//! Console output formatter for simulation reports

use crate::output::formatter::OutputFormatter;
use colored::Colorize;
use socialsim_application::{SimulationReport, TerminationReason};
use socialsim_domain::{AgentSnapshot, AgentStatus};

/// Formats simulation reports for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Format the complete report
    pub fn format(report: &SimulationReport) -> String {
        let mut output = String::new();

        output.push_str(&Self::header("Simulation Results"));
        output.push('\n');

        output.push_str(&format!(
            "{} {}\n",
            "Experiment:".cyan().bold(),
            report.experiment_id
        ));
        output.push_str(&format!(
            "{} {}\n",
            "Environment:".cyan().bold(),
            report.policy
        ));
        output.push_str(&format!(
            "{} {}\n",
            "Time steps:".cyan().bold(),
            report.steps_executed
        ));
        output.push_str(&format!(
            "{} {} of {}\n",
            "Conversations:".cyan().bold(),
            report.completed_conversations,
            report.total_possible_conversations
        ));
        output.push_str(&format!(
            "{} {}\n",
            "Finished because:".cyan().bold(),
            Self::termination(report.termination)
        ));
        output.push_str(&format!(
            "{} {:.1}s\n",
            "Elapsed:".cyan().bold(),
            report.elapsed.as_secs_f64()
        ));

        output.push_str(&Self::section_header("Agent Statistics"));
        output.push_str(&Self::agent_table(&report.agents));

        if !report.bingo.is_empty() {
            output.push_str(&Self::section_header("Bingo Progress"));
            for (agent, summary) in &report.bingo {
                output.push_str(&format!(
                    "  {:<16} {}/{} squares filled\n",
                    agent,
                    summary.filled_squares,
                    summary.total()
                ));
            }
        }

        output.push_str(&Self::footer());
        output
    }

    /// Format as JSON
    pub fn format_json(report: &SimulationReport) -> String {
        serde_json::to_string_pretty(report).unwrap_or_else(|_| "{}".to_string())
    }

    /// One-line summary
    pub fn format_summary(report: &SimulationReport) -> String {
        format!(
            "{} {}/{} conversations in {} time steps ({})",
            if report.is_complete() {
                "v".green()
            } else {
                "!".yellow()
            },
            report.completed_conversations,
            report.total_possible_conversations,
            report.steps_executed,
            report.termination
        )
    }

    /// `Agent | Status | Conversations | Available Partners`
    pub fn agent_table(agents: &[AgentSnapshot]) -> String {
        const HEADERS: [&str; 4] = ["Agent", "Status", "Conversations", "Available Partners"];

        let name_width = agents
            .iter()
            .map(|a| a.name.chars().count())
            .chain(std::iter::once(HEADERS[0].len()))
            .max()
            .unwrap_or(HEADERS[0].len());

        let mut output = format!(
            "{:<name_width$} | {:<10} | {:<13} | {}\n",
            HEADERS[0], HEADERS[1], HEADERS[2], HEADERS[3],
        );
        output.push_str(&format!(
            "{}-+-{}-+-{}-+-{}\n",
            "-".repeat(name_width),
            "-".repeat(10),
            "-".repeat(13),
            "-".repeat(HEADERS[3].len())
        ));

        for agent in agents {
            let status = format!("{:<10}", agent.status.as_str());
            let status = match agent.status {
                AgentStatus::Idle => status.normal(),
                AgentStatus::Conversing => status.yellow(),
            };
            output.push_str(&format!(
                "{:<name_width$} | {} | {:<13} | {}\n",
                agent.name, status, agent.total_conversations, agent.available_partners,
            ));
        }

        output
    }

    fn termination(reason: TerminationReason) -> String {
        match reason {
            TerminationReason::AllPairsCompleted => reason.as_str().green().to_string(),
            TerminationReason::Deadlock => reason.as_str().red().to_string(),
            _ => reason.as_str().yellow().to_string(),
        }
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format(&self, report: &SimulationReport) -> String {
        Self::format(report)
    }

    fn format_json(&self, report: &SimulationReport) -> String {
        Self::format_json(report)
    }

    fn format_summary(&self, report: &SimulationReport) -> String {
        Self::format_summary(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use socialsim_domain::{BoardSummary, PolicyKind};
    use std::collections::BTreeMap;
    use std::time::Duration;

    fn snapshot(name: &str, status: AgentStatus, done: usize, left: usize) -> AgentSnapshot {
        AgentSnapshot {
            name: name.to_string(),
            status,
            current_partner: None,
            total_conversations: done,
            past_partners: vec![],
            available_partners: left,
        }
    }

    fn report() -> SimulationReport {
        let mut bingo = BTreeMap::new();
        bingo.insert(
            "alice".to_string(),
            BoardSummary {
                filled_squares: 2,
                unfilled_squares: 7,
            },
        );
        SimulationReport {
            experiment_id: "exp-1".to_string(),
            policy: PolicyKind::RoundRobin,
            steps_executed: 3,
            completed_conversations: 6,
            total_possible_conversations: 6,
            termination: TerminationReason::AllPairsCompleted,
            agents: vec![
                snapshot("alice", AgentStatus::Idle, 3, 0),
                snapshot("bartholomew", AgentStatus::Idle, 3, 0),
            ],
            bingo,
            conversations: vec![],
            elapsed: Duration::from_millis(1500),
        }
    }

    #[test]
    fn test_agent_table_layout() {
        colored::control::set_override(false);
        let table = ConsoleFormatter::agent_table(&[
            snapshot("alice", AgentStatus::Idle, 2, 1),
            snapshot("bartholomew", AgentStatus::Conversing, 1, 2),
        ]);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("Agent       | Status"));
        assert!(lines[0].ends_with("Available Partners"));
        assert!(lines[2].starts_with("alice       | idle"));
        assert!(lines[3].contains("conversing"));
        assert!(lines[3].ends_with("| 2"));
    }

    #[test]
    fn test_format_full_report() {
        colored::control::set_override(false);
        let text = ConsoleFormatter::format(&report());
        assert!(text.contains("Experiment: exp-1"));
        assert!(text.contains("Environment: round_robin"));
        assert!(text.contains("Conversations: 6 of 6"));
        assert!(text.contains("all pairs completed"));
        assert!(text.contains("2/9 squares filled"));
    }

    #[test]
    fn test_format_summary_and_json() {
        colored::control::set_override(false);
        let summary = ConsoleFormatter::format_summary(&report());
        assert_eq!(summary, "v 6/6 conversations in 3 time steps (all pairs completed)");

        let json: serde_json::Value =
            serde_json::from_str(&ConsoleFormatter::format_json(&report())).unwrap();
        assert_eq!(json["experiment_id"], "exp-1");
        assert_eq!(json["policy"], "round_robin");
    }
}

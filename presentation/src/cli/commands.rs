//! CLI command definitions

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Output format for the final run report
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Run summary, agent table and bingo progress
    #[default]
    Full,
    /// One-line summary only
    Summary,
    /// JSON report
    Json,
}

/// CLI arguments for socialsim
#[derive(Parser, Debug)]
#[command(name = "socialsim")]
#[command(author, version, about = "Social mixer simulation - LLM agents meet each other pair by pair")]
#[command(long_about = r#"
socialsim runs a simulated social event. Every agent persona is voiced by a
language model; the scheduler pairs agents up time step by time step until
every pair has talked once (or a step/conversation limit is reached).

Each agent keeps a short-term transcript of its current conversation and a
long-term note about everyone it has met. Optional bingo boards give agents
conversational goals.

Configuration files are loaded from (in priority order):
1. SOCIALSIM_* environment variables
2. --config <path>          Explicit config file
3. ./socialsim.toml         Project-level config
4. ~/.config/socialsim/config.toml   Global config

Example:
  socialsim --agents-dir agents --environment round_robin
  socialsim --offline --max-time-steps 5 -v
  socialsim --split-boards bingo_boards/master.json
"#)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Directory of `<name>.txt` agent personas
    #[arg(long, value_name = "DIR")]
    pub agents_dir: Option<PathBuf>,

    /// Directory for transcripts, event logs and usage summaries
    #[arg(long, value_name = "DIR")]
    pub outputs_dir: Option<PathBuf>,

    /// Scheduling environment: time_dependent, round_robin or random_pairs
    #[arg(short, long, value_name = "NAME")]
    pub environment: Option<String>,

    /// Upper bound on time steps
    #[arg(long, value_name = "N")]
    pub max_time_steps: Option<usize>,

    /// Messages a pair may exchange per time step
    #[arg(long, value_name = "N")]
    pub messages_per_step: Option<usize>,

    /// Messages per conversation before it ends
    #[arg(long, value_name = "N")]
    pub messages_per_conversation: Option<usize>,

    /// Stop after this many completed conversations
    #[arg(long, value_name = "N")]
    pub max_conversations: Option<usize>,

    /// Seed for the random_pairs shuffle
    #[arg(long, value_name = "N")]
    pub seed: Option<u64>,

    /// Use the offline scripted model instead of the network provider
    #[arg(long)]
    pub offline: bool,

    /// Split a master bingo file into per-agent boards and exit
    #[arg(long, value_name = "MASTER")]
    pub split_boards: Option<PathBuf>,

    /// Also write diagnostic logs to daily files in this directory
    #[arg(long, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,

    /// Report format
    #[arg(short, long, value_enum, default_value = "full")]
    pub output: OutputFormat,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long)]
    pub quiet: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,
}

//! CLI entrypoint for socialsim
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, bail};
use clap::Parser;
use socialsim_application::{
    ConversationLogger, ConversationOrchestrator, NoConversationLogger, RunSimulationUseCase,
    SimulationProgress, UsageTelemetry,
};
use socialsim_infrastructure::{
    ConfigLoader, ConfigurationError, FileConfig, JsonBingoBoards, JsonMemoryStore,
    JsonTranscriptStore, JsonlConversationLogger, PersonaLoader, ProviderKind, build_gateway,
    split_master_boards, try_write_usage_report,
};
use socialsim_presentation::{Cli, ConsoleFormatter, OutputFormat, ProgressReporter, SimpleProgress};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, prelude::*};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_ref());
        return Ok(());
    }

    // === Configuration ===
    let mut config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref()).context("Failed to load configuration")?
    };
    apply_overrides(&mut config, &cli);

    let log_dir = cli.log_dir.clone().or_else(|| config.logging.dir.clone());
    let _log_guard = init_tracing(cli.verbose, log_dir)?;

    let issues = config.validate();
    for issue in issues.iter().filter(|i| !i.is_error()) {
        warn!("{}", issue.message);
        if !cli.quiet {
            eprintln!("{}", issue);
        }
    }
    let errors: Vec<String> = issues
        .iter()
        .filter(|i| i.is_error())
        .map(|i| i.message.clone())
        .collect();
    if !errors.is_empty() {
        return Err(ConfigurationError::Invalid(errors.join("; ")).into());
    }

    if let Some(master) = &cli.split_boards {
        let written = split_master_boards(master, &config.paths.bingo_board_dir)?;
        for (owner, path) in &written {
            println!("{} -> {}", owner, path.display());
        }
        println!("Wrote {} boards", written.len());
        return Ok(());
    }

    info!("Starting socialsim");

    // === Dependency Injection ===
    let registry = Arc::new(PersonaLoader::new(&config.paths.agents_dir).load()?);
    let memory = Arc::new(JsonMemoryStore::open(&config.paths.memory_dir).map_err(|source| {
        ConfigurationError::Directory {
            path: config.paths.memory_dir.clone(),
            source,
        }
    })?);

    let provider = if cli.offline {
        ProviderKind::Offline
    } else {
        config.model.parse_provider().0.unwrap_or_default()
    };
    let gateway = build_gateway(&config.model, provider)?;

    let (params, _) = config.simulation.to_params();
    let (retry, _) = config.retry.to_retry_policy();
    let telemetry = Arc::new(UsageTelemetry::new());

    let experiment_id = uuid::Uuid::new_v4().to_string();
    let logger: Arc<dyn ConversationLogger> = if config.logging.event_log {
        match JsonlConversationLogger::for_run(&config.paths.outputs_dir, &experiment_id) {
            Ok(logger) => {
                info!(path = %logger.path().display(), "Writing event log");
                Arc::new(logger)
            }
            Err(e) => {
                warn!(error = %e, "Could not open event log, continuing without it");
                Arc::new(NoConversationLogger)
            }
        }
    } else {
        Arc::new(NoConversationLogger)
    };

    let orchestrator = ConversationOrchestrator::new(gateway, registry.clone(), memory)
        .with_bingo(Arc::new(JsonBingoBoards::new(&config.paths.bingo_board_dir)))
        .with_logger(logger)
        .with_telemetry(telemetry.clone())
        .with_retry_policy(retry)
        .with_inter_call_delay(params.inter_call_delay);

    let use_case = RunSimulationUseCase::new(orchestrator, params)
        .with_transcripts(Arc::new(JsonTranscriptStore::new(&config.paths.outputs_dir)))
        .with_experiment_id(experiment_id);

    if !cli.quiet && cli.output == OutputFormat::Full {
        println!();
        println!("+============================================================+");
        println!("|            socialsim - Social Mixer Simulation             |");
        println!("+============================================================+");
        println!();
        println!("Agents: {}", registry.names().join(", "));
        println!("Environment: {}", use_case.params().policy);
        println!();
    }

    // Execute
    let report = if cli.quiet || cli.output == OutputFormat::Json {
        use_case.execute().await?
    } else {
        let progress: Box<dyn SimulationProgress> = if cli.verbose > 0 {
            Box::new(SimpleProgress)
        } else {
            Box::new(ProgressReporter::new())
        };
        use_case.execute_with_progress(progress.as_ref()).await?
    };

    // Output results
    let output = match cli.output {
        OutputFormat::Full => ConsoleFormatter::format(&report),
        OutputFormat::Summary => ConsoleFormatter::format_summary(&report),
        OutputFormat::Json => ConsoleFormatter::format_json(&report),
    };
    println!("{}", output);

    if let Some(path) = try_write_usage_report(&config.paths.outputs_dir, &telemetry.summary()) {
        info!(path = %path.display(), "Wrote token usage summary");
    }

    Ok(())
}

/// Command-line flags win over every configuration layer.
fn apply_overrides(config: &mut FileConfig, cli: &Cli) {
    if let Some(dir) = &cli.agents_dir {
        config.paths.agents_dir = dir.clone();
    }
    if let Some(dir) = &cli.outputs_dir {
        config.paths.outputs_dir = dir.clone();
    }
    if let Some(environment) = &cli.environment {
        config.simulation.environment = environment.clone();
    }
    if let Some(steps) = cli.max_time_steps {
        config.simulation.max_time_steps = steps;
    }
    if let Some(n) = cli.messages_per_step {
        config.simulation.messages_per_time_step = n;
    }
    if let Some(n) = cli.messages_per_conversation {
        config.simulation.messages_per_conversation = n;
    }
    if let Some(cap) = cli.max_conversations {
        config.simulation.max_total_conversations = Some(cap);
    }
    if let Some(seed) = cli.seed {
        config.simulation.seed = Some(seed);
    }
    if cli.offline {
        config.model.provider = ProviderKind::Offline.as_str().to_string();
    }
}

/// Console logging by verbosity (`RUST_LOG` takes precedence), plus an
/// optional daily-rotated file.
fn init_tracing(verbose: u8, log_dir: Option<PathBuf>) -> Result<Option<WorkerGuard>> {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace", // -vvv or more
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let console_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
            let appender = tracing_appender::rolling::daily(&dir, "socialsim.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    if tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .is_err()
    {
        bail!("tracing already initialized");
    }

    Ok(guard)
}

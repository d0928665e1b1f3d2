//! LiveGate command line: run a registration session end to end.

mod scenario;

use anyhow::Context;
use clap::Parser;
use livegate_crypto::MemoryKeyStore;
use livegate_nullables::{NullNetwork, NullRuntime};
use livegate_types::{Clock, SystemClock};
use livegate_utils::{format_duration, init_logging, LogFormat};
use livegate_verification::{Classifiers, RegistrationConfig, RegistrationOrchestrator};
use scenario::Scenario;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "livegate", about = "LiveGate proof-of-personhood registration")]
struct Cli {
    /// Path to a TOML configuration file. CLI flags and env vars override it.
    #[arg(long, env = "LIVEGATE_CONFIG")]
    config: Option<PathBuf>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "LIVEGATE_LOG_LEVEL")]
    log_level: Option<String>,

    /// Emit logs as newline-delimited JSON.
    #[arg(long, env = "LIVEGATE_LOG_JSON")]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Drive a full session against a simulated user and print the outcome as JSON.
    Simulate {
        #[arg(long, value_enum, default_value_t = Scenario::Human)]
        scenario: Scenario,

        /// Module tick period in milliseconds.
        #[arg(long, env = "LIVEGATE_TICK_MS")]
        tick_ms: Option<u64>,
    },
    /// Print the effective configuration as TOML.
    Config,
}

fn load_config(cli: &Cli) -> anyhow::Result<RegistrationConfig> {
    let mut config = match &cli.config {
        Some(path) => RegistrationConfig::from_toml_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => RegistrationConfig::default(),
    };
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    if cli.log_json {
        config.log_format = LogFormat::Json;
    }
    if let Command::Simulate {
        tick_ms: Some(ms), ..
    } = cli.command
    {
        config.tick_interval_ms = ms;
    }
    config.validate()?;
    Ok(config)
}

async fn simulate(config: RegistrationConfig, scenario: Scenario) -> anyhow::Result<()> {
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let keys = Arc::new(MemoryKeyStore::new());
    let public_key = keys.generate(config.key_id.clone())?;
    tracing::info!(key_id = %config.key_id, public_key = %public_key.to_hex(), "signing key ready");

    let phase = config.tick_interval() * config.voice.phase_ticks;
    let classifiers = Classifiers::adaptive(
        NullRuntime::unloaded(),
        NullRuntime::unloaded(),
        config.classifier.min_model_confidence,
    );
    let (mut orchestrator, handle) = RegistrationOrchestrator::new(
        config,
        scenario.sensors(phase),
        classifiers,
        NullNetwork::new(clock.clone()),
        keys,
        clock,
    );
    let _actor = scenario.act(handle.clone());

    let mut rx = handle.subscribe();
    let reporter = tokio::spawn(async move {
        let mut last = String::new();
        while rx.changed().await.is_ok() {
            let state = rx.borrow_and_update().clone();
            if let Some(progress) = state.progress() {
                if progress.status.text != last {
                    tracing::info!(
                        module = progress.module.as_str(),
                        remaining_secs = progress.time_remaining_secs,
                        "{}",
                        progress.status.text
                    );
                    last.clone_from(&progress.status.text);
                }
            }
            if state.is_terminal() {
                break;
            }
        }
    });

    tracing::info!(?scenario, "starting registration");
    let started = Instant::now();
    let result = orchestrator.run().await;
    reporter.abort();
    tracing::info!(
        elapsed = %format_duration(started.elapsed()),
        attempts = orchestrator.stats().get("attempts"),
        skips = orchestrator.skips(),
        "registration finished"
    );

    println!("{}", serde_json::to_string_pretty(&orchestrator.state())?);
    match result {
        Ok(_) => Ok(()),
        Err(e) => anyhow::bail!("registration failed: {}", e.user_message()),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    init_logging(config.log_format, &config.log_level);

    match cli.command {
        Command::Simulate { scenario, .. } => simulate(config, scenario).await,
        Command::Config => {
            print!("{}", config.to_toml_string()?);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn cli_overrides_config() {
        let cli = Cli::parse_from([
            "livegate",
            "--log-level",
            "debug",
            "simulate",
            "--scenario",
            "skip-all",
            "--tick-ms",
            "50",
        ]);
        let config = load_config(&cli).unwrap();
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.tick_interval(), Duration::from_millis(50));
        assert!(matches!(
            cli.command,
            Command::Simulate {
                scenario: Scenario::SkipAll,
                ..
            }
        ));
    }

    #[test]
    fn zero_tick_is_rejected() {
        let cli = Cli::parse_from(["livegate", "simulate", "--tick-ms", "0"]);
        assert!(load_config(&cli).is_err());
    }
}

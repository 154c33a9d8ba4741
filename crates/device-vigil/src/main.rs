mod cli;
mod config;
mod service;

use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{error, info};

use rule_engine::{loader, DecisionEngine};

use crate::cli::{Cli, Command};
use crate::config::{Config, LoggingConfig};

/// Directory the executable lives in; defaults for the rules file and log
/// files are resolved against it.
fn executable_dir() -> Result<PathBuf> {
    let exe = std::env::current_exe().context("failed to locate executable")?;
    exe.parent()
        .map(Path::to_path_buf)
        .context("executable has no parent directory")
}

fn init_logging(logging: &LoggingConfig, directory: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(directory)
        .with_context(|| format!("failed to create log directory {}", directory.display()))?;
    let path = directory.join(logging.file_name(chrono::Local::now().date_naive()));
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&logging.level));

    tracing_subscriber::fmt()
        .json()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_thread_ids(true)
        .with_writer(Arc::new(file))
        .init();

    Ok(path)
}

/// Load the rules once. A missing or invalid file is fatal: the service must
/// not answer any request without a rule set.
fn load_engine(rules_path: &Path) -> Result<DecisionEngine> {
    info!(path = %rules_path.display(), "looking for rules definition file");

    if !rules_path.exists() {
        error!(path = %rules_path.display(), "rules file not found, can't continue");
        bail!("{} is missing", rules_path.display());
    }

    let rules = loader::load_rules(rules_path).map_err(|e| {
        error!(path = %rules_path.display(), error = %e, "rules file rejected");
        e
    })?;

    Ok(DecisionEngine::new(rules))
}

fn main() -> Result<ExitCode> {
    // 1. Parse CLI args.
    let cli = Cli::parse();
    let base_dir = executable_dir()?;

    // 2. Load config, then merge CLI overrides.
    let mut cfg: Config = config::load(&cli.config)?;
    if let Some(ref rules) = cli.rules {
        let cwd = std::env::current_dir().context("failed to read current directory")?;
        cfg.override_rules_file(rules, &cwd);
    }

    // 3. Init tracing-subscriber writing JSON to today's log file.
    let log_path = init_logging(&cfg.logging, &cfg.log_directory(&base_dir))
        .context("failed to initialize logging")?;
    info!(
        config_file = %cli.config.display(),
        log_file = %log_path.display(),
        "device-vigil starting"
    );

    // 4. Load the rule set.
    let rules_path = cfg.rules_path(&base_dir);
    let engine = load_engine(&rules_path)
        .with_context(|| format!("failed to load rules file {}", rules_path.display()))?;
    info!(?engine, "decision engine ready");

    // 5. Dispatch.
    match cli.command {
        Command::Check {
            hardware_id,
            device_id,
            instance_id,
            process_id,
        } => {
            let decision =
                engine.process_access_request(&hardware_id, &device_id, &instance_id, process_id);
            info!(
                hardware_id = %hardware_id,
                device_id = %device_id,
                instance_id = %instance_id,
                process_id,
                matched = decision.matched,
                allowed = decision.is_allowed,
                permanent = decision.is_permanent,
                "access request decided"
            );
            println!(
                "{}",
                serde_json::to_string(&decision).context("failed to encode decision")?
            );
            Ok(if decision.is_allowed {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Command::Validate => {
            println!(
                "{}: {} rules",
                rules_path.display(),
                engine.rule_set().len()
            );
            for (index, rule) in engine.rule_set().into_iter().enumerate() {
                println!(
                    "  #{index} {} filter={} allowed={} permanent={}",
                    rule.name().unwrap_or("-"),
                    rule.filter(),
                    rule.is_allowed(),
                    rule.is_permanent()
                );
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Serve => {
            let stdin = io::stdin().lock();
            let stdout = io::stdout().lock();
            service::serve(&engine, stdin, stdout)?;
            info!("device-vigil shutting down");
            Ok(ExitCode::SUCCESS)
        }
    }
}

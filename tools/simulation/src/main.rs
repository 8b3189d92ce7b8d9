//! `custody-sim`: drive the custody vault from the command line.
//!
//! Logs go to stderr; reports go to stdout or to `--export`.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use simulation::config::SimConfig;
use simulation::engine::SimEngine;
use simulation::export::{build_export, export_json, write_to_file, SimulationExport};
use simulation::replay::{
    export_step_log, import_step_log, replay_and_snapshot, replay_step_log, StepLog,
};
use simulation::scenarios;
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "custody-sim", about = "Custody vault simulator", version)]
struct Cli {
    /// Simulation configuration file (JSON). Defaults apply when omitted.
    #[arg(long, short = 'c', env = "CUSTODY_SIM_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Log output format.
    #[arg(long, value_enum, default_value_t = LogFormat::Pretty, global = true)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run seeded random operations against the vault and its model.
    Run {
        /// Override the configured seed.
        #[arg(long)]
        seed: Option<u64>,
        /// Override the configured step count.
        #[arg(long)]
        steps: Option<u64>,
        /// Also run the scripted scenarios.
        #[arg(long)]
        with_scenarios: bool,
        /// Write the step log here for later replay.
        #[arg(long)]
        step_log: Option<PathBuf>,
        /// Write the JSON report here instead of stdout.
        #[arg(long)]
        export: Option<PathBuf>,
    },
    /// Run the scripted scenarios only.
    Scenarios {
        /// Run just this scenario.
        #[arg(long)]
        only: Option<String>,
        #[arg(long)]
        export: Option<PathBuf>,
    },
    /// Replay a step log under the configuration recorded in it and check
    /// that it reproduces every outcome.
    Replay {
        /// Step log written by `run --step-log`.
        step_log: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Pretty,
    Json,
}

fn init_logging(format: LogFormat) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(env_filter);
    match format {
        LogFormat::Pretty => registry.with(fmt::layer().with_writer(std::io::stderr)).init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init(),
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<SimConfig> {
    match path {
        Some(path) => SimConfig::from_file(path)
            .with_context(|| format!("loading {}", path.display())),
        None => Ok(SimConfig::default()),
    }
}

fn emit(export: &SimulationExport, path: Option<&PathBuf>) -> Result<()> {
    match path {
        Some(path) => {
            write_to_file(export, path).with_context(|| format!("writing {}", path.display()))?;
            info!(path = %path.display(), "Report written");
        }
        None => println!("{}", export_json(export)?),
    }
    if !export.is_clean() {
        bail!("simulation found failures");
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_format);
    let mut config = load_config(cli.config.as_ref())?;

    match cli.command {
        Commands::Run {
            seed,
            steps,
            with_scenarios,
            step_log,
            export,
        } => {
            if let Some(seed) = seed {
                config.seed = seed;
            }
            if let Some(steps) = steps {
                config.steps = steps;
            }
            config.validate()?;
            info!(seed = config.seed, steps = config.steps, "Starting random run");

            let started = Instant::now();
            let mut engine = SimEngine::new(config.clone())?;
            engine.run_configured();
            let elapsed = u64::try_from(started.elapsed().as_nanos()).unwrap_or(u64::MAX);
            info!(summary = %engine.metrics().summary(), "Random run finished");

            if let Some(path) = step_log {
                std::fs::write(&path, export_step_log(&StepLog::from_engine(&engine))?)
                    .with_context(|| format!("writing {}", path.display()))?;
            }

            let scenario_results = if with_scenarios {
                scenarios::run_all(&config.custody)
            } else {
                Vec::new()
            };
            let mut report = build_export(Some(&engine), scenario_results);
            if let Some(metrics) = report.metrics.as_mut() {
                metrics.set_elapsed(elapsed);
            }
            emit(&report, export.as_ref())
        }
        Commands::Scenarios { only, export } => {
            let results = match only {
                Some(name) => match scenarios::run_named(&name, &config.custody) {
                    Some(result) => vec![result],
                    None => bail!(
                        "unknown scenario {name:?}, expected one of {:?}",
                        scenarios::SCENARIO_NAMES
                    ),
                },
                None => scenarios::run_all(&config.custody),
            };
            let report = build_export(None, results);
            emit(&report, export.as_ref())
        }
        Commands::Replay { step_log } => {
            let json = std::fs::read_to_string(&step_log)
                .with_context(|| format!("reading {}", step_log.display()))?;
            let log = import_step_log(&json)?;
            info!(seed = log.config.seed, steps = log.steps.len(), "Replaying recorded run");

            let snapshot = replay_step_log(&log)?;
            if replay_and_snapshot(&log.config, &log.ops())? != snapshot {
                bail!("replay is not deterministic");
            }
            info!(steps = log.steps.len(), "Replay reproduced every outcome");
            Ok(())
        }
    }
}

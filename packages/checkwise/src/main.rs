#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::path::{Path, PathBuf};

use checkwise::{CheckContext, install_interrupt_cleanup, new_run_record, run_check};
use checkwise_config::{
    CONFIG_FILE_NAME, CheckwiseConfig, CliOverrides, RunLogSettings, load_config, resolve_run_log,
};
use checkwise_insights::insights_for_dir;
use checkwise_run_log::{ClearOutcome, Recorder, clear_all};
use checkwise_tools::ProcessExecutor;
use clap::{Parser, Subcommand, ValueEnum};

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
#[clap(rename_all = "kebab_case")]
pub enum OutputType {
    Json,
    Raw,
}

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug, Clone)]
enum Commands {
    /// Run every applicable tool on a project
    Check {
        #[arg(index = 1, default_value = ".")]
        path: PathBuf,

        #[arg(long)]
        log_dir: Option<PathBuf>,

        /// Do not write a run log for this run
        #[arg(long)]
        no_log: bool,
    },
    /// Summarize past runs
    Logs {
        #[arg(long)]
        log_dir: Option<PathBuf>,

        #[arg(short, long, value_enum, default_value_t=OutputType::Raw)]
        output: OutputType,
    },
    /// Delete every run log
    ClearLogs {
        #[arg(long)]
        log_dir: Option<PathBuf>,
    },
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

/// Log directory settings for the commands that read or clear run logs.
///
/// A broken `checkwise.toml` only costs its `log-dir` setting here.
fn run_log_settings(root: &Path, log_dir: Option<PathBuf>) -> RunLogSettings {
    let config = load_config(root).unwrap_or_else(|e| {
        log::warn!("Ignoring {CONFIG_FILE_NAME} in {}: {e}", root.display());
        CheckwiseConfig::default()
    });
    let cli = CliOverrides {
        log_dir,
        no_run_log: false,
    };

    resolve_run_log(root, &config, &cli, env_var)
}

fn check(
    path: &Path,
    log_dir: Option<PathBuf>,
    no_log: bool,
) -> Result<i32, Box<dyn std::error::Error>> {
    let root = std::fs::canonicalize(path)?;
    let config = load_config(&root)?;
    let settings = resolve_run_log(
        &root,
        &config,
        &CliOverrides {
            log_dir,
            no_run_log: no_log,
        },
        env_var,
    );
    let context = CheckContext::from_config(&root, &config);

    let mut recorder = Recorder::start(settings.recording_dir(), new_run_record(&root));

    let cleanup_installed = recorder.scratch_dir().is_some_and(install_interrupt_cleanup);
    log::trace!("Interrupt cleanup installed: {cleanup_installed}");

    if let Some(path) = recorder.path() {
        log::info!("Recording run to {}", path.display());
    }

    let result = run_check(&context, &ProcessExecutor, &mut recorder);

    let exit_code = if result.is_ok() {
        recorder.exit_code()
    } else {
        1
    };
    let record = recorder.finalize(exit_code);
    log::debug!(
        "Run {} finished with exit code {exit_code} in {:?}s",
        record.run_id,
        record.duration_seconds
    );

    result?;

    Ok(exit_code)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    checkwise_logging::init().expect("Failed to initialize logging");

    let args = Args::parse();

    match args.cmd {
        Commands::Check {
            path,
            log_dir,
            no_log,
        } => {
            let exit_code = check(&path, log_dir, no_log)?;
            std::process::exit(exit_code);
        }
        Commands::Logs { log_dir, output } => {
            let root = std::env::current_dir()?;
            let settings = run_log_settings(&root, log_dir);
            let insights = insights_for_dir(&settings.log_dir);

            match output {
                OutputType::Json => {
                    println!("{}", serde_json::to_string_pretty(&insights)?);
                }
                OutputType::Raw => {
                    print!("{insights}");
                }
            }
        }
        Commands::ClearLogs { log_dir } => {
            let root = std::env::current_dir()?;
            let settings = run_log_settings(&root, log_dir);

            match clear_all(&settings.log_dir)? {
                ClearOutcome::Cleared { files } => {
                    println!(
                        "Removed {files} run logs from {}",
                        settings.log_dir.display()
                    );
                }
                ClearOutcome::NothingToClear => {
                    println!("No run logs to clear");
                }
            }
        }
    }

    Ok(())
}

#![warn(clippy::pedantic)]

mod paths;
mod term;

use std::io::{stdout, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use schedule::cache::{AssetCache, CacheError, DirNetwork, Origin};
use schedule::config::{Config, ConfigError};
use schedule::report::Output;
use schedule::state::FileStore;
use schedule::tracker::{self, Tracker};
use schedule::{Date, MonthKey};
use thiserror::Error;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(version, about = "Weekly installment tracker")]
struct Cli {
    /// Configuration file, defaults to `config.toml` in the config directory
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory of the payment state, defaults to the data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the schedule grouped by month (default)
    Report {
        /// Also list the weeks of paid months
        #[arg(long)]
        all: bool,
    },
    /// Mark a month as paid, e.g. `2025-9` for October 2025
    Pay { month: MonthKey },
    /// Mark a month as not paid
    Unpay { month: MonthKey },
    /// Interactive view
    Tui,
    /// Offline copy of the static assets
    #[command(subcommand)]
    Cache(CacheCommand),
}

#[derive(Debug, Subcommand)]
enum CacheCommand {
    /// Download every asset into the current cache version
    Install {
        #[arg(long)]
        source: PathBuf,
    },
    /// Delete all other cache versions
    Activate,
    /// Print an asset, preferring the cached copy
    Fetch {
        path: String,
        #[arg(long)]
        source: PathBuf,
    },
}

#[derive(Error, Debug)]
enum Error {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Tracker(#[from] tracker::Error),
    #[error(transparent)]
    Cache(#[from] CacheError),
    #[error("Failed to write output: {0}")]
    Output(std::io::Error),
    #[error("Failed to set up logging: {0}")]
    Logging(String),
    #[error("{0:#}")]
    Term(#[from] anyhow::Error),
}

fn init_logging(log_dir: Option<&Path>) -> Result<Option<WorkerGuard>, Error> {
    let builder = tracing_subscriber::fmt();
    if let Some(dir) = log_dir {
        fs_err::create_dir_all(dir).map_err(|e| Error::Logging(e.to_string()))?;
        let (writer, guard) =
            tracing_appender::non_blocking(tracing_appender::rolling::never(dir, "installments.log"));
        builder
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .with_ansi(false)
            .with_writer(writer)
            .try_init()
            .map_err(|e| Error::Logging(e.to_string()))?;
        Ok(Some(guard))
    } else {
        builder
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
            )
            .with_writer(std::io::stderr)
            .try_init()
            .map_err(|e| Error::Logging(e.to_string()))?;
        Ok(None)
    }
}

fn open(config: Config, data_dir: &Path) -> Result<Tracker<FileStore>, Error> {
    // Storage warnings are already logged by the tracker.
    let (tracker, _) = Tracker::open(config, FileStore::new(data_dir))?;
    Ok(tracker)
}

fn print_report(tracker: &Tracker<FileStore>, all: bool) -> Result<(), Error> {
    let view = tracker.view(Date::today());
    let config = tracker.config();
    let output = Output::new(&view, &config.payers, config.rates).expand_paid(all);
    write!(&mut stdout(), "{output}").map_err(Error::Output)
}

fn toggle(tracker: &mut Tracker<FileStore>, month: MonthKey, paid: bool) -> Result<(), Error> {
    tracker.handle(tracker::Command::ToggleMonthPaid { month, paid })?;
    let summary = tracker.view(Date::today()).summary;
    println!(
        "{} {}. Dibayar {} • Baki {} • {}/{} Minggu",
        month.name(),
        if paid { "dibayar" } else { "belum dibayar" },
        summary.total_paid,
        summary.remaining,
        summary.paid_weeks,
        summary.target_weeks
    );
    Ok(())
}

fn cache(command: CacheCommand, config: &Config, data_dir: &Path) -> Result<(), Error> {
    let cache = AssetCache::from_config(data_dir.join("cache"), &config.cache);
    match command {
        CacheCommand::Install { source } => {
            let count = cache.install(&DirNetwork::new(source))?;
            println!("Installed {count} assets into {}", cache.name());
        }
        CacheCommand::Activate => {
            for name in cache.activate()? {
                println!("Deleted {name}");
            }
        }
        CacheCommand::Fetch { path, source } => {
            let (body, origin) = cache.fetch(&path, &DirNetwork::new(source))?;
            info!(path = %path, from_cache = origin == Origin::Cache, "fetched asset");
            stdout().write_all(&body).map_err(Error::Output)?;
        }
    }
    Ok(())
}

fn run(cli: Cli) -> Result<(), Error> {
    let Cli {
        config,
        data_dir,
        command,
    } = cli;
    let command = command.unwrap_or(Command::Report { all: false });
    let data_dir = data_dir.unwrap_or_else(paths::data_dir);
    let config_path = config.unwrap_or_else(paths::config_file);

    let _guard = init_logging(matches!(command, Command::Tui).then_some(data_dir.as_path()))?;
    let config = Config::load(&config_path)?;

    match command {
        Command::Report { all } => print_report(&open(config, &data_dir)?, all),
        Command::Pay { month } => toggle(&mut open(config, &data_dir)?, month, true),
        Command::Unpay { month } => toggle(&mut open(config, &data_dir)?, month, false),
        Command::Tui => {
            let (tracker, warning) = Tracker::open(config, FileStore::new(&data_dir))?;
            term::run_term(tracker, config_path, warning)?;
            Ok(())
        }
        Command::Cache(command) => cache(command, &config, &data_dir),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

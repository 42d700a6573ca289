//! CLI entry point for the gotests test skeleton generator.
//!
//! This binary generates table-driven Go test skeletons for the functions
//! and methods of the given source files or directories.
//!
//! # Usage
//!
//! ```bash
//! gotests [OPTIONS] <PATH>...
//!
//! # Print tests for every exported function of a file
//! gotests --exported calc.go
//!
//! # Write tests for all untested functions of a package tree
//! gotests --all -w -r ./pkg
//!
//! # Only methods of Calc, as subtests
//! gotests --only '^Calc\.' --subtests calc.go
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

mod output;

use std::io::IsTerminal;
use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use camino::Utf8PathBuf;
use clap::Parser;
use gt_core::{ColorChoice, Config, ConfigError};
use gt_gen::{GenerateOptions, GenerateUpdate, Generator};
use tokio::sync::mpsc;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use output::{Emitter, StatusWriter};

/// Channel capacity for generation updates.
const UPDATE_CHANNEL_CAPACITY: usize = 64;

// =============================================================================
// CLI ARGUMENT TYPES
// =============================================================================

/// Generate table-driven Go tests for existing functions.
///
/// Prints the generated `_test.go` content to stdout unless `--write` is
/// given. Status lines go to stderr.
#[derive(Parser)]
#[command(name = "gotests", version, about, long_about = None)]
struct Cli {
    /// Go source files or directories.
    paths: Vec<Utf8PathBuf>,

    /// Generate tests for functions and methods matching the regex.
    #[arg(long, value_name = "REGEX")]
    only: Option<String>,

    /// Skip functions and methods matching the regex.
    #[arg(long, value_name = "REGEX")]
    excl: Option<String>,

    /// Generate tests for exported functions and methods only.
    #[arg(long)]
    exported: bool,

    /// Generate tests for all functions and methods without a test.
    #[arg(long)]
    all: bool,

    /// Print test inputs in error messages.
    #[arg(short = 'i', long)]
    print_inputs: bool,

    /// Run table cases as subtests with `t.Run`.
    #[arg(long)]
    subtests: bool,

    /// Write output to `<file>_test.go` instead of stdout.
    #[arg(short, long)]
    write: bool,

    /// Keep processing later paths after a path fails.
    #[arg(long)]
    allow_error: bool,

    /// Descend into subdirectories of directory inputs.
    #[arg(short, long)]
    recursive: bool,

    /// Maximum number of worker threads.
    #[arg(short = 'j', long, value_name = "N")]
    jobs: Option<usize>,

    /// JSON configuration file; flags override its values.
    #[arg(short, long, value_name = "FILE", env = "GOTESTS_CONFIG")]
    config: Option<Utf8PathBuf>,

    /// Enable verbose logging (debug level).
    #[arg(short, long)]
    verbose: bool,

    /// Disable colored output.
    #[arg(long)]
    no_color: bool,
}

// =============================================================================
// INITIALIZATION FUNCTIONS
// =============================================================================

/// Initializes the tracing subscriber for logging.
///
/// Respects the `RUST_LOG` environment variable if set. Otherwise, uses
/// `debug` level if `--verbose` is set, or `warn` level by default so that
/// logs do not drown the status lines.
fn init_tracing(verbose: bool, color: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = if verbose { "debug" } else { "warn" };
        EnvFilter::new(format!("{level},ignore=warn,globset=warn"))
    });

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .with_ansi(color)
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

/// Builds the run [`Config`] from an optional config file and the flags.
///
/// # Errors
///
/// Returns a [`ConfigError`] if the config file cannot be read or parsed.
fn build_config(cli: &Cli) -> Result<Config, ConfigError> {
    let mut config = match &cli.config {
        Some(path) => Config::from_json_file(path)?,
        None => Config::default(),
    };

    if !cli.paths.is_empty() {
        config.paths.clone_from(&cli.paths);
    }

    if cli.only.is_some() {
        config.filter.only.clone_from(&cli.only);
    }
    if cli.excl.is_some() {
        config.filter.exclude.clone_from(&cli.excl);
    }
    config.filter.exported |= cli.exported;
    config.filter.all |= cli.all;

    config.generate.print_inputs |= cli.print_inputs;
    config.generate.subtests |= cli.subtests;
    config.generate.recursive |= cli.recursive;
    if cli.jobs.is_some() {
        config.generate.max_parallel_jobs = cli.jobs;
    }

    config.output.write |= cli.write;
    config.output.allow_error |= cli.allow_error;
    if cli.no_color {
        config.output.color = ColorChoice::Never;
    }

    Ok(config)
}

/// Resolves whether status lines and logs are colored.
fn use_color(choice: ColorChoice) -> bool {
    match choice {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        _ => std::env::var_os("NO_COLOR").is_none() && std::io::stderr().is_terminal(),
    }
}

// =============================================================================
// RUN
// =============================================================================

/// Resolves when SIGINT or SIGTERM arrives.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = sigterm.recv() => {}
                }
            }
            Err(_) => {
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

/// Runs generation and emits results.
///
/// Returns `true` if any path failed.
///
/// # Errors
///
/// Returns an error if the generation task panics.
async fn run(config: Config, options: GenerateOptions, color: bool) -> color_eyre::Result<bool> {
    info!(paths = config.paths.len(), write = config.output.write, "Starting gotests");

    let generator = Arc::new(Generator::new(options));
    let cancel = Arc::new(AtomicBool::new(false));
    let (tx, mut rx) = mpsc::channel(UPDATE_CHANNEL_CAPACITY);

    let task = tokio::task::spawn_blocking({
        let generator = Arc::clone(&generator);
        let cancel = Arc::clone(&cancel);
        let paths = config.paths.clone();
        move || generator.generate_streaming(&paths, &tx, &cancel)
    });

    let mut emitter = Emitter::new(
        std::io::stdout().lock(),
        StatusWriter::new(std::io::stderr(), color),
        &config.output,
    );

    let signal = shutdown_signal();
    tokio::pin!(signal);
    let mut signalled = false;

    loop {
        tokio::select! {
            update = rx.recv() => match update {
                Some(GenerateUpdate::PathsQueued(count)) => debug!(count, "paths queued"),
                Some(GenerateUpdate::PathFinished { index, outcome }) => {
                    if emitter.accept(index, outcome) {
                        cancel.store(true, Ordering::Relaxed);
                    }
                }
                Some(GenerateUpdate::Complete(stats)) => {
                    info!(
                        paths = stats.paths,
                        tests = stats.tests,
                        errors = stats.errors,
                        "gotests completed"
                    );
                }
                None => break,
            },
            () = &mut signal, if !signalled => {
                signalled = true;
                cancel.store(true, Ordering::Relaxed);
                emitter.error("interrupted; finishing paths already started");
            }
        }
    }

    emitter.finish();
    task.await?;
    Ok(emitter.failed() || signalled)
}

// =============================================================================
// MAIN ENTRY POINT
// =============================================================================

/// Application entry point.
#[tokio::main]
async fn main() -> color_eyre::Result<ExitCode> {
    // 1. Install color-eyre FIRST (before any potential panics)
    color_eyre::install()?;

    // 2. Parse CLI arguments
    let cli = Cli::parse();

    // 3. Load configuration; flags override the file
    let config = build_config(&cli);
    let color = use_color(match &config {
        Ok(config) => config.output.color,
        Err(_) if cli.no_color => ColorChoice::Never,
        Err(_) => ColorChoice::Auto,
    });

    // 4. Initialize tracing (handles --no-color for log output)
    init_tracing(cli.verbose, color);

    // 5. Validate everything before touching any path
    let prepared = config.and_then(|config| {
        let options = GenerateOptions::from_config(&config)?;
        Ok((config, options))
    });
    let (config, options) = match prepared {
        Ok(prepared) => prepared,
        Err(e) => {
            StatusWriter::new(std::io::stderr(), color).error(e);
            return Ok(ExitCode::from(2));
        }
    };

    // 6. Generate
    let failed = run(config, options, color).await?;
    Ok(if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

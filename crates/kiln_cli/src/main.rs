//! Kiln CLI: host for the Kiln diagnostics subsystem.
//!
//! Provides `kiln replay`, which feeds recorded JSON-lines diagnostic streams
//! through a freshly configured aggregator and its listeners, prints the build
//! summary, and exits non-zero if the replayed run failed.

#![warn(missing_docs)]

mod pipeline;
mod replay;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use kiln_diagnostics::Severity;
use tracing_subscriber::{fmt, EnvFilter};

/// Kiln: documentation site builder diagnostics.
#[derive(Parser, Debug)]
#[command(name = "kiln", version, about = "Kiln diagnostics host")]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose (debug-level) output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Control colored output.
    #[arg(long, global = true, value_enum, default_value_t = ColorChoice::Auto)]
    pub color: ColorChoice,

    /// Path to a custom `kiln.toml` configuration file or its directory.
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Replay recorded diagnostics through the configured listeners.
    Replay(ReplayArgs),
}

/// Arguments for the `kiln replay` subcommand.
#[derive(Parser, Debug)]
pub struct ReplayArgs {
    /// JSON-lines files to replay; each file is replayed on its own worker.
    #[arg(required = true, num_args = 1..)]
    pub files: Vec<PathBuf>,

    /// Minimum severity to count and report (overrides `kiln.toml`).
    #[arg(long, value_parser = parse_severity)]
    pub threshold: Option<Severity>,

    /// Fail the run on any warning (overrides `kiln.toml`).
    #[arg(long)]
    pub warnings_as_errors: bool,

    /// Number of warnings reported before the rest are suppressed.
    #[arg(long)]
    pub throttle_limit: Option<usize>,

    /// Output format of the default console listener.
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,
}

/// Controls whether colored output is produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ColorChoice {
    /// Detect from terminal capabilities.
    Auto,
    /// Always produce colored output.
    Always,
    /// Never produce colored output.
    Never,
}

/// Diagnostic output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Human-readable terminal output on stderr.
    Text,
    /// One JSON object per line on stdout.
    Json,
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Whether to suppress non-error output.
    pub quiet: bool,
    /// Whether to print verbose/debug information.
    pub verbose: bool,
    /// Whether to use colored output.
    pub color: bool,
    /// Optional path to a custom config file.
    pub config: Option<String>,
}

fn parse_severity(value: &str) -> Result<Severity, kiln_diagnostics::DiagnosticsError> {
    value.parse()
}

fn main() {
    let cli = Cli::parse();

    let color = match cli.color {
        ColorChoice::Auto => atty_is_terminal(),
        ColorChoice::Always => true,
        ColorChoice::Never => false,
    };

    let global = GlobalArgs {
        quiet: cli.quiet,
        verbose: cli.verbose,
        color,
        config: cli.config,
    };

    init_tracing(&global);

    let result = match cli.command {
        Command::Replay(ref args) => replay::run(args, &global),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}

/// Installs the stderr `tracing` subscriber. `RUST_LOG` wins over the flags.
fn init_tracing(global: &GlobalArgs) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_log_directive(global)));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_ansi(global.color)
        .init();
}

fn default_log_directive(global: &GlobalArgs) -> &'static str {
    if global.quiet {
        "error"
    } else if global.verbose {
        "debug"
    } else {
        "warn"
    }
}

/// Rough terminal detection; checks if stderr is a terminal.
fn atty_is_terminal() -> bool {
    use std::io::IsTerminal;
    std::io::stderr().is_terminal()
}

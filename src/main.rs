use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use tally::app::{self, App};
use tally::config::{Config, OutputFormat, Verbosity};
use tally::listener::{FanOut, Quiet, SequenceCheck, Verbose};
use tally::reporter::{Finish, Report, StandardReporter};
use tally::runner;
use tally::sink::{ConsoleSink, DiagnosticSink, JsonSink};

/// Turn a test engine's event stream into build diagnostics
#[derive(Parser, Debug)]
#[command(name = "tally", version, long_about = None)]
struct Cli {
    /// Read NDJSON events from a file (`-` for stdin)
    #[arg(long, value_name = "PATH", conflicts_with = "command")]
    input: Option<PathBuf>,

    /// Diagnostic output format
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,

    /// Which informational messages to print
    #[arg(long, value_enum)]
    verbosity: Option<Verbosity>,

    /// Hide passing tests and their captured output
    #[arg(long)]
    quiet_passes: bool,

    /// Announce every test as it starts
    #[arg(long)]
    verbose: bool,

    /// Also write every diagnostic as NDJSON to this file
    #[arg(long, value_name = "PATH")]
    log: Option<PathBuf>,

    /// Engine command to spawn; its stdout carries the event stream
    #[arg(last = true, value_name = "ENGINE COMMAND")]
    command: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    init_logging();

    let cli = Cli::parse();
    let workdir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let config = Config::load(&workdir);

    let source = runner::detect(
        workdir,
        cli.input.as_deref(),
        cli.command.clone(),
        config.engine.command.as_deref(),
    )?;

    let mut app = App::new(build_listener(&cli, &config), build_observers(&cli, &config)?);
    let streamed = app::drive(&mut app, source).await;
    let outcome = app.listener.finish();

    if let Err(e) = streamed {
        tracing::error!("{:#}", e);
        return Ok(ExitCode::from(2));
    }
    if app.source_failed() {
        return Ok(ExitCode::from(2));
    }
    if !outcome.is_success() {
        return Ok(ExitCode::from(1));
    }
    Ok(ExitCode::SUCCESS)
}

/// The primary reporter, wrapped in whatever verbosity decorators were asked for.
fn build_listener(cli: &Cli, config: &Config) -> Box<dyn Report> {
    let format = cli.format.unwrap_or(config.output.format);
    let verbosity = cli.verbosity.unwrap_or(config.output.verbosity);

    let sink: Box<dyn DiagnosticSink> = match format {
        OutputFormat::Msbuild => Box::new(ConsoleSink::stdout(verbosity.min_importance())),
        OutputFormat::Json => Box::new(JsonSink::stdout()),
    };
    let reporter = StandardReporter::new(sink);

    let quiet = cli.quiet_passes || config.output.quiet_passes;
    let verbose = cli.verbose || config.output.verbose;
    match (quiet, verbose) {
        (false, false) => Box::new(reporter),
        (true, false) => Box::new(Quiet::new(reporter)),
        (false, true) => Box::new(Verbose::new(reporter)),
        (true, true) => Box::new(Verbose::new(Quiet::new(reporter))),
    }
}

/// Side listeners: protocol-order checking, plus the optional NDJSON log.
fn build_observers(cli: &Cli, config: &Config) -> Result<FanOut> {
    let mut observers = FanOut::new().with(SequenceCheck::new());

    if let Some(path) = cli.log.as_ref().or(config.output.log.as_ref()) {
        let file = File::create(path)
            .with_context(|| format!("failed to create diagnostic log {}", path.display()))?;
        observers.push(StandardReporter::new(JsonSink::new(BufWriter::new(file))));
    }

    Ok(observers)
}

/// `TALLY_LOG` filters stderr logging; `TALLY_DEBUG=<path>` sends a debug log to a file instead.
fn init_logging() {
    if let Ok(path) = std::env::var("TALLY_DEBUG")
        && let Ok(file) = File::create(&path)
    {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::new("debug"))
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .try_init();
        return;
    }

    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("TALLY_LOG").unwrap_or_else(|_| EnvFilter::new("warn,engine=info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

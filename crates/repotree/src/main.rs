mod cli;

use std::io::{self, IsTerminal};
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use clap::{CommandFactory, Parser};
use repotree::tracker::{self, SpinnerTrackerBuilder, TrackerBuilder};
use repotree::{Config, OutputMode, Pipeline, ReqwestTransport, Request, output, progress};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::cli::App;

const LOG_ENV: &str = "REPOTREE_LOG";

/// Pause between mapped files so the spinner output stays readable.
const STAGGER: Duration = Duration::from_millis(25);

fn main() -> ExitCode {
    init_tracing();

    let Some(request) = App::parse().request() else {
        return match App::command().print_help() {
            Ok(()) => ExitCode::SUCCESS,
            Err(_) => ExitCode::FAILURE,
        };
    };

    match run(request) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(request: Request) -> Result<ExitCode> {
    let config = Config::resolve(request)?;
    debug!(url = %config.url, scope = %config.scope, "resolved configuration");

    let transport = ReqwestTransport::new().context("failed to build http client")?;

    match config.output {
        OutputMode::Stdout => print_tree(config, transport),
        OutputMode::File(_) => run_interactive(config, transport),
    }
}

fn print_tree(config: Config, transport: ReqwestTransport) -> Result<ExitCode> {
    let extraction = Pipeline::new(config, transport).run()?;
    output::write_json(io::stdout().lock(), &extraction.tree)
        .context("failed to write tree to stdout")?;
    Ok(ExitCode::SUCCESS)
}

fn run_interactive(config: Config, transport: ReqwestTransport) -> Result<ExitCode> {
    let tracker = SpinnerTrackerBuilder::default()
        .with_prefix(&config.repo)
        .hidden(!io::stderr().is_terminal())
        .build();

    let (reporter, rx) = progress::channel();
    let worker = Pipeline::new(config, transport)
        .reporter(reporter)
        .stagger(STAGGER)
        .spawn()
        .context("failed to start extraction worker")?;

    let ok = tracker::follow(rx, tracker);
    let outcome = worker
        .join()
        .map_err(|_| anyhow!("extraction worker panicked"))?;

    // A failure has already been rendered by the tracker.
    match outcome {
        Ok(extraction) => {
            debug!(counts = ?extraction.counts, report = ?extraction.report, "run finished");
            Ok(ExitCode::SUCCESS)
        }
        Err(err) if !ok => {
            debug!("run failed: {err}");
            Ok(ExitCode::FAILURE)
        }
        Err(err) => Err(err.into()),
    }
}

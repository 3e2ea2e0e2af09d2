//! simcheck CLI - simulator verification harness

mod cli;
mod commands;
mod terminal;

use clap::Parser;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;

use cli::Cli;

fn main() {
    let cli = Cli::parse();
    terminal::set_plain(cli.plain);

    let metrics_handle = if cli.metrics {
        simcheck::metrics::CliRecorder::new().install()
    } else {
        None
    };
    simcheck::metrics::init();

    let default_level = if cli.verbose {
        "simcheck=debug"
    } else {
        "simcheck=warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(default_level.parse().unwrap()),
        )
        .with_target(false)
        .with_ansi(!cli.plain)
        .with_writer(std::io::stderr)
        .with_span_events(FmtSpan::CLOSE)
        .init();

    let exit_code = commands::run_command(&cli);

    if let Some(handle) = metrics_handle {
        handle.print_summary();
    }

    std::process::exit(exit_code);
}

use std::io;
use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use tracing::error;
use tracing_subscriber::EnvFilter;

use locustgen_cli::{exit_code, run, Cli, Config, EXIT_FAILURE, EXIT_NO_INPUT};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() -> ExitCode {
    init_tracing();

    let config = match Config::from_cli(Cli::parse()) {
        Ok(config) => config,
        Err(err) => {
            error!("{err}");
            return ExitCode::from(EXIT_FAILURE);
        }
    };

    if config.paths.is_empty() {
        error!("No input paths provided.");
        eprintln!("{}", Cli::command().render_usage());
        return ExitCode::from(EXIT_NO_INPUT);
    }

    let stdout = io::stdout();
    match run(&config, &mut stdout.lock()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:#}");
            ExitCode::from(exit_code(&err))
        }
    }
}

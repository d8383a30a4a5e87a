//! Command-line entry-point: loads settings, wires adapters, runs one command.

mod cli;

use std::ffi::OsString;
use std::process::ExitCode;

use backend::config::MeetsyncSettings;
use clap::Parser;
use ortho_config::OrthoConfig;
use tracing::{error, warn};
use tracing_subscriber::{EnvFilter, fmt};

use cli::{Cli, CliError};

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .with_writer(std::io::stderr)
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let args = Cli::parse();
    // Settings come from the environment and config files only; the argument
    // list belongs to clap.
    let outcome = match MeetsyncSettings::load_from_iter([OsString::from("meetsync")]) {
        Ok(settings) => cli::run(args.command, &settings).await,
        Err(err) => Err(CliError::Config(err.to_string())),
    };

    match outcome.and_then(|value| serde_json::to_string_pretty(&value).map_err(CliError::from)) {
        Ok(rendered) => {
            println!("{rendered}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            let payload = err.into_domain();
            error!(code = ?payload.code(), message = payload.message(), "command failed");
            match serde_json::to_string(&payload) {
                Ok(rendered) => eprintln!("{rendered}"),
                Err(_) => eprintln!("{}", payload.message()),
            }
            ExitCode::FAILURE
        }
    }
}

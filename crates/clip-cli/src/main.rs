mod cli;
mod commands;
mod config;
mod error;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.global.verbose, cli.global.quiet);

    // Dispatch and handle errors with proper exit codes
    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8, quiet: bool) {
    let filter = match (quiet, verbosity) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, 2) => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(mut cli: Cli) -> Result<(), CliError> {
    match cli.command {
        // Config commands work without a reachable daemon
        Command::Config(args) => commands::config_cmd::handle(args, &mut cli.global),

        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "clipctl", &mut std::io::stdout());
            Ok(())
        }

        cmd => {
            let cfg = config::load()?;
            config::apply_defaults(&mut cli.global, &cfg)?;
            let daemon_config = config::daemon_config(&cli.global, &cfg)?;

            tracing::debug!(command = ?cmd, url = %daemon_config.url, "dispatching command");
            commands::dispatch(cmd, daemon_config, &cli.global).await
        }
    }
}

mod cli;
mod commands;
mod config;
mod error;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use uprotect_core::ProtectInstance;

use crate::cli::{CamerasCommand, Cli, Command, SensorsCommand};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.global.verbose, cli.global.quiet);

    match run(cli).await {
        Ok(()) => {}
        Err(err) => report_and_exit(err),
    }
}

/// Print a rendered diagnostic and terminate with the error's exit code.
fn report_and_exit(err: CliError) -> ! {
    let code = err.exit_code();
    eprintln!("{:?}", miette::Report::new(err));
    std::process::exit(code);
}

fn init_tracing(verbosity: u8, quiet: bool) {
    // `--quiet` silences warnings too; RUST_LOG always wins. Logs go to
    // stderr so `--output json` stays pipeable.
    let fallback = match (quiet, verbosity) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, 2) => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        // Config commands work without an NVR connection
        Command::Config(args) => commands::config_cmd::handle(args, &cli.global),

        Command::Completions(args) => {
            use clap::CommandFactory;

            let mut tree = Cli::command();
            clap_complete::generate(args.shell, &mut tree, "uprotect", &mut std::io::stdout());
            Ok(())
        }

        // Everything else talks to an NVR
        cmd => {
            let interval = watch_interval(&cmd);
            if interval == Some(0) {
                return Err(CliError::Validation {
                    field: "interval".into(),
                    reason: "must be at least 1 second".into(),
                });
            }

            let (name, mut connect) = config::build_connect_config(&cli.global)?;
            if let Some(secs) = interval {
                connect.scan_interval = std::time::Duration::from_secs(secs);
            }

            tracing::debug!(command = ?cmd, profile = %name, "dispatching command");
            let instance = ProtectInstance::connect(name, &connect).await?;
            let result = commands::dispatch(cmd, &instance, &cli.global).await;
            instance.shutdown().await;
            result
        }
    }
}

/// `--interval` from a watch subcommand, if this is one. Applied to the
/// connect config before the coordinator exists.
fn watch_interval(cmd: &Command) -> Option<u64> {
    match cmd {
        Command::Cameras(args) => match args.command {
            CamerasCommand::Watch { interval, .. } => interval,
            _ => None,
        },
        Command::Sensors(args) => match args.command {
            SensorsCommand::Watch { interval, .. } => interval,
            _ => None,
        },
        _ => None,
    }
}

use clap::{Parser, Subcommand};
use portal_server::PortalConfig;
use portal_server::frameworks::{config::DEFAULT_CONFIG_FILE, report, server};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(
    name = "portal_server",
    version,
    about = "Captive-portal gateway for guest Wi-Fi"
)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, env = "PORTAL_CONFIG_FILE", default_value = DEFAULT_CONFIG_FILE, global = true)]
    config_file: PathBuf,

    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the guest portal (default).
    Serve,

    /// Export contact addresses collected over the last N days as CSV.
    Report {
        /// Length of the reporting window, counted back from now.
        #[arg(long, default_value_t = 7, value_parser = clap::value_parser!(u32).range(1..=36500))]
        days: u32,

        /// Write to this file instead of stdout.
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env locally; safe to ignore when not present.
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    server::init_tracing(cli.verbose);

    let config = match PortalConfig::load(&cli.config_file) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "failed to load configuration");
            return ExitCode::FAILURE;
        }
    };

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => match server::run_with_config(&config).await {
            Ok(()) => ExitCode::SUCCESS,
            Err(_) => ExitCode::FAILURE,
        },
        Command::Report { days, output } => {
            match report::run_report(&config, days, output.as_deref()).await {
                Ok(()) => ExitCode::SUCCESS,
                Err(e) => {
                    tracing::error!(error = %e, "report failed");
                    ExitCode::FAILURE
                }
            }
        }
    }
}

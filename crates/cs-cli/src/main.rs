//! # cs CLI entry point
//!
//! Parses command-line arguments, sets up logging and dispatches to the
//! subcommand handlers.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use cs_cli::certificate::{run_certificate, CertificateArgs};
use cs_cli::participants::{run_participants, ParticipantsArgs};
use cs_cli::relations::{run_relations, RelationsArgs};

/// Corona School certificate tool.
///
/// Requests tutoring certificates for matches and downloads the rendered
/// document. Credentials come from `CS_API_TOKEN` and `CS_USER_ID`.
#[derive(Parser, Debug)]
#[command(name = "cs", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,

    /// Backend base URL. Overrides `CS_API_URL`.
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compose and submit a certificate request, then download it.
    Certificate(CertificateArgs),

    /// List the matches a certificate can be requested for.
    Relations(RelationsArgs),

    /// Sort a course participant list read from a JSON file.
    Participants(ParticipantsArgs),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    if cli.log_json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .init();
    }

    let result = match &cli.command {
        Commands::Certificate(args) => match cs_cli::api_client(cli.api_url.as_deref()) {
            Ok(client) => run_certificate(args, &client).await,
            Err(e) => Err(e),
        },
        Commands::Relations(args) => match cs_cli::api_client(cli.api_url.as_deref()) {
            Ok(client) => run_relations(args, &client).await,
            Err(e) => Err(e),
        },
        Commands::Participants(args) => run_participants(args),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            eprintln!("error: {e:#}");
            ExitCode::from(1)
        }
    }
}

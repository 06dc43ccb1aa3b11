mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use thiserror::Error;
use tracing::Level;

use ticketgrep::logger::{init_tracing, parse_level};
use ticketgrep::{ConfigError, GeneratorConfig, InputValidationError, ParseError};

#[derive(Parser)]
#[command(
    name = "ticketgrep",
    version,
    about = "Link tracker tickets to their changes and propose tests from ticket text and changed source."
)]
struct Cli {
    #[arg(long, global = true, help = "Config file (default: <config dir>/ticketgrep/config.toml)")]
    config: Option<PathBuf>,

    #[arg(long, global = true, default_value_t = false, help = "Emit logs as JSON lines")]
    log_json: bool,

    #[arg(
        short,
        long,
        global = true,
        action = clap::ArgAction::Count,
        help = "More logging (-v debug, -vv trace)"
    )]
    verbose: u8,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Subcommand)]
enum CliCommand {
    /// Print the structural fingerprint of one source file
    Structure(commands::StructureArgs),
    /// Extract change references from text and/or a development payload
    Links(commands::LinksArgs),
    /// Generate test proposals, file suggestions and skeletons for a ticket
    Generate(commands::GenerateArgs),
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Validation(#[from] InputValidationError),

    #[error(transparent)]
    Parse(#[from] ParseError),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let mut config = GeneratorConfig::load(cli.config.as_deref())?;
    config.log_json |= cli.log_json;

    let level = match cli.verbose {
        0 => parse_level(&config.log_level),
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    init_tracing(config.log_json, level);

    match cli.command {
        CliCommand::Structure(args) => commands::structure(args),
        CliCommand::Links(args) => commands::links(args, &config),
        CliCommand::Generate(args) => commands::generate(args, config),
    }
}

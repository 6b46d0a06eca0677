use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use xrates::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl From<Commands> for xrates::AppCommand {
    fn from(cmd: Commands) -> xrates::AppCommand {
        match cmd {
            Commands::Rates { keys } => xrates::AppCommand::Rates { keys },
            Commands::Convert {
                from,
                amount,
                to,
                date,
            } => xrates::AppCommand::Convert {
                from,
                amount,
                to,
                date,
            },
            Commands::Currencies => xrates::AppCommand::Currencies,
            Commands::Watch => xrates::AppCommand::Watch,
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Display rate tables for dates (YYYY-MM-DD) or "latest"
    Rates {
        #[arg(required = true)]
        keys: Vec<String>,
    },
    /// Convert an amount between two currencies
    Convert {
        from: String,
        amount: f64,
        to: String,
        /// Date of the rates to use (YYYY-MM-DD) or "latest"
        #[arg(short, long, default_value = "latest")]
        date: String,
    },
    /// List currencies known to the provider
    Currencies,
    /// Keep refreshing the latest rates until interrupted
    Watch,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => xrates::cli::setup::setup(),
        Some(cmd) => xrates::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}

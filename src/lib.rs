pub mod cli;
pub mod client;
pub mod converter;
pub mod core;
pub mod providers;
pub mod resolver;
pub mod store;
pub mod updater;

#[cfg(test)]
pub(crate) mod testing;

pub use client::ExchangeRates;

use anyhow::Result;
use tracing::{debug, info};

pub enum AppCommand {
    Rates {
        keys: Vec<String>,
    },
    Convert {
        from: String,
        amount: f64,
        to: String,
        date: String,
    },
    Currencies,
    Watch,
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("xrates starting...");

    let config = match config_path {
        Some(path) => core::config::RatesConfig::load_from_path(path)?,
        None => core::config::RatesConfig::load()?,
    };
    debug!(
        history_folder = %config.history_folder.display(),
        database = config.database_path.is_some(),
        "Loaded config"
    );

    // currencies listing needs neither the cache nor the updater
    if let AppCommand::Currencies = command {
        return cli::currencies::run(&config).await;
    }

    let mut rates = ExchangeRates::initialize(&config).await?;
    let result = run_with_rates(&rates, command).await;
    rates.teardown().await;
    result
}

async fn run_with_rates(rates: &ExchangeRates, command: AppCommand) -> Result<()> {
    match command {
        AppCommand::Rates { keys } => cli::rates::run(rates, &keys).await,
        AppCommand::Convert {
            from,
            amount,
            to,
            date,
        } => cli::convert::run(rates, &date, &from, amount, &to).await,
        AppCommand::Watch => cli::watch::run(rates).await,
        AppCommand::Currencies => Ok(()),
    }
}

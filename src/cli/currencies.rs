use super::ui;
use crate::core::config::RatesConfig;
use crate::providers::OpenExchangeRates;
use anyhow::Result;
use comfy_table::Cell;

pub async fn run(config: &RatesConfig) -> Result<()> {
    let provider =
        OpenExchangeRates::new(&config.provider.base_url, config.api_key()?, &config.base)?;
    let currencies = provider.fetch_currencies().await?;

    let mut table = ui::new_styled_table();
    table.set_header(vec![ui::header_cell("Code"), ui::header_cell("Name")]);
    for (code, name) in &currencies {
        table.add_row(vec![Cell::new(code), Cell::new(name)]);
    }
    println!("{table}");
    Ok(())
}

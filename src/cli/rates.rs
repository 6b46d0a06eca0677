use super::ui;
use crate::client::ExchangeRates;
use crate::core::{RateKey, RateTable};
use anyhow::{Result, anyhow};
use comfy_table::Cell;
use futures::future::join_all;
use tracing::info;

impl RateTable {
    pub fn display_as_table(&self) -> String {
        let mut table = ui::new_styled_table();
        table.set_header(vec![
            ui::header_cell("Currency"),
            ui::header_cell(&format!("Units per {}", self.base)),
        ]);
        for (code, rate) in &self.rates {
            table.add_row(vec![Cell::new(code), ui::number_cell(*rate)]);
        }

        format!(
            "Rates for {} {}\n\n{}",
            ui::style_text(&self.key, ui::StyleType::Title),
            ui::style_text(&format!("(base {})", self.base), ui::StyleType::Subtle),
            table
        )
    }
}

/// Resolves every key concurrently and prints the tables in input order.
pub async fn run(rates: &ExchangeRates, keys: &[String]) -> Result<()> {
    info!("Resolving {} rate table(s)", keys.len());

    let results = join_all(keys.iter().map(|key| async move {
        match RateKey::parse(key) {
            Ok(parsed) => rates.get_rate_table(parsed.request_type(), key).await,
            Err(e) => Err(e),
        }
    }))
    .await;

    let mut failed = 0;
    for (key, result) in keys.iter().zip(results) {
        match result {
            Ok(table) => println!("{}\n", table.display_as_table()),
            Err(e) => {
                failed += 1;
                eprintln!(
                    "{}",
                    ui::style_text(&format!("{key}: {e}"), ui::StyleType::Error)
                );
            }
        }
    }

    if failed > 0 {
        return Err(anyhow!("{} of {} lookups failed", failed, keys.len()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::testing::sample_table;

    #[test]
    fn test_display_as_table() {
        let output = sample_table("2016-01-16", 0.917).display_as_table();

        assert!(output.contains("2016-01-16"));
        assert!(output.contains("Units per USD"));
        assert!(output.contains("MXN"));
        assert!(output.contains("18.219450"));
    }
}

use super::ui;
use crate::client::ExchangeRates;
use crate::core::RateKey;
use anyhow::Result;

pub async fn run(
    rates: &ExchangeRates,
    date: &str,
    from: &str,
    amount: f64,
    to: &str,
) -> Result<()> {
    let key = RateKey::parse(date)?;
    let converted = rates
        .convert(key.request_type(), date, from, amount, to)
        .await?;

    println!(
        "{amount} {from} = {} {}",
        ui::style_text(&format!("{converted:.4} {to}"), ui::StyleType::Value),
        ui::style_text(&format!("({key})"), ui::StyleType::Subtle)
    );
    Ok(())
}

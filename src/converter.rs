//! Currency conversion over resolved rate tables

use crate::core::{RateKey, RateTable, RatesError, RequestType};
use crate::resolver::RateResolver;

/// Converts `amount` of `from` into `to` through the table's base currency.
pub fn convert_with_table(
    table: &RateTable,
    from: &str,
    amount: f64,
    to: &str,
) -> Result<f64, RatesError> {
    let from_rate = table
        .rate(from)
        .ok_or_else(|| RatesError::UnknownCurrencyCode(from.to_string()))?;
    let to_rate = table
        .rate(to)
        .ok_or_else(|| RatesError::UnknownCurrencyCode(to.to_string()))?;

    let amount_in_base = amount / from_rate;
    Ok(amount_in_base * to_rate)
}

pub async fn convert(
    resolver: &RateResolver,
    request: RequestType,
    key: &RateKey,
    from: &str,
    amount: f64,
    to: &str,
) -> Result<f64, RatesError> {
    let table = resolver
        .resolve(request, key)
        .await
        .map_err(|e| RatesError::RateResolution(Box::new(e)))?;
    convert_with_table(&table, from, amount, to)
}

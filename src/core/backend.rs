//! Persistence abstraction shared by the database and filesystem stores

use async_trait::async_trait;

use super::error::RatesError;
use super::rates::{RateKey, RateTable};

/// Outcome of a backend lookup.
///
/// `Miss` and `Failed` are kept apart so callers can log them differently,
/// the resolver treats both as a reason to fetch.
#[derive(Debug)]
pub enum Lookup {
    Hit(RateTable),
    Miss,
    Failed(String),
}

#[async_trait]
pub trait RateBackend: Send + Sync {
    fn name(&self) -> &'static str;

    async fn get(&self, key: &RateKey) -> Lookup;

    /// Insert or overwrite the table stored under `key`.
    async fn put(&self, key: &RateKey, table: &RateTable) -> Result<(), RatesError>;
}

//! Remote rate source abstraction

use anyhow::Result;
use async_trait::async_trait;

use super::rates::{RateKey, RateTable, RequestType};

#[async_trait]
pub trait RateSource: Send + Sync {
    async fn fetch(&self, request: RequestType, key: &RateKey) -> Result<RateTable>;
}

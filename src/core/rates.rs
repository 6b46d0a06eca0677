//! Rate tables and the keys they are stored under

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::error::RatesError;

const LATEST: &str = "latest";
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Which provider endpoint a table comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestType {
    Historical,
    Latest,
}

impl fmt::Display for RequestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestType::Historical => write!(f, "historical"),
            RequestType::Latest => write!(f, "latest"),
        }
    }
}

/// Identifier of a rate table: either `latest` or a calendar date.
///
/// Keys double as file names in the filesystem backend, so anything that is
/// not one of those two shapes is rejected up front.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RateKey(String);

impl RateKey {
    pub fn latest() -> Self {
        RateKey(LATEST.to_string())
    }

    pub fn parse(raw: &str) -> Result<Self, RatesError> {
        if raw == LATEST {
            return Ok(Self::latest());
        }
        let date = NaiveDate::parse_from_str(raw, DATE_FORMAT)
            .map_err(|_| RatesError::InvalidKey(raw.to_string()))?;
        // chrono accepts unpadded fields, keys must be canonical
        if date.format(DATE_FORMAT).to_string() != raw {
            return Err(RatesError::InvalidKey(raw.to_string()));
        }
        Ok(RateKey(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_latest(&self) -> bool {
        self.0 == LATEST
    }

    /// The endpoint a key is naturally fetched from.
    pub fn request_type(&self) -> RequestType {
        if self.is_latest() {
            RequestType::Latest
        } else {
            RequestType::Historical
        }
    }

    /// Fails unless `request` is the endpoint this key is fetched from. A
    /// `latest` payload must never be stored under a date, nor the reverse.
    pub fn check_request(&self, request: RequestType) -> Result<(), RatesError> {
        if request != self.request_type() {
            return Err(RatesError::RequestMismatch {
                request,
                key: self.0.clone(),
            });
        }
        Ok(())
    }
}

impl fmt::Display for RateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Currency values relative to `base` for one key.
///
/// The provider payload carries no key, it is stamped by the resolver before
/// the table is persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateTable {
    #[serde(rename = "_id", default)]
    pub key: String,
    pub base: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
    pub rates: BTreeMap<String, f64>,
}

impl RateTable {
    pub fn rate(&self, code: &str) -> Option<f64> {
        self.rates.get(code).copied()
    }
}

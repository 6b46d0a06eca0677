//! Core types and abstractions

pub mod backend;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod log;
pub mod rates;
pub mod source;

// Re-export main types for cleaner imports
pub use backend::{Lookup, RateBackend};
pub use diagnostics::{Diagnostic, Diagnostics};
pub use error::RatesError;
pub use rates::{RateKey, RateTable, RequestType};
pub use source::RateSource;

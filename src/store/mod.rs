//! Persistence backends for rate tables

pub mod database;
pub mod files;
#[cfg(test)]
pub(crate) mod memory;

pub use database::DatabaseBackend;
pub use files::FileBackend;

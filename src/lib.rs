//! Movie catalog data-access layer
//!
//! Filtered listings compiled to parameterized SQLite queries, tri-state
//! partial updates, sidecar image storage and transactional multi-table writes.

pub mod catalog;
pub mod changeset;
pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod models;
pub mod orm;

pub use catalog::Catalog;
pub use error::{CatalogError, Result};

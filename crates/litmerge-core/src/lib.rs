//! Litmerge core: source records, merged books, reports, config and JSON storage.

pub mod config;
pub mod error;
pub mod models;
pub mod storage;

pub use config::{AppConfig, MatchingConfig, PrimaryOrder};
pub use error::{LitmergeError, Result};
pub use models::*;

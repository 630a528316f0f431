//! LitShelf Common Library
//!
//! Shared code for the LitShelf service including:
//! - Database models and repository
//! - JSON import pipeline
//! - Chat upstream client
//! - Error types and handling
//! - Configuration management

pub mod chat;
pub mod config;
pub mod db;
pub mod errors;
pub mod import;

// Re-export commonly used types
pub use config::AppConfig;
pub use db::{DbPool, Mark, RankingStats, Repository};
pub use errors::{AppError, Result};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Project id whose dataset is gated on a non-empty trust_dimensions field
pub const TRUST_LITERATURE_PROJECT: &str = "trust-literature";

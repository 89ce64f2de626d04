//! # SMES Common Library
//!
//! Shared code for the Student Media Ethics Survey services including:
//! - Survey schema registry (questions, options, validation)
//! - Answer value model and key normalization
//! - Database models and queries
//! - Event types (StoreEvent enum) and EventBus
//! - Configuration loading
//! - SSE utilities
//! - API authentication helpers

pub mod answers;
pub mod api;
pub mod config;
#[cfg(feature = "sqlx")]
pub mod db;
pub mod error;
pub mod events;
pub mod schema;
pub mod sse;

pub use error::{Error, Result};

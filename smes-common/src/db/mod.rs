//! Database access layer
//!
//! SQLite via sqlx. Two document collections (`users`, `responses`) plus a
//! key-value `settings` table. All mutations go through this module; change
//! notification is the caller's concern (service layer emits on the
//! EventBus after the write commits).

pub mod init;
pub mod models;
pub mod responses;
pub mod settings;
pub mod users;

pub use init::init_database;
pub use models::{ResponseRecord, UserRecord};

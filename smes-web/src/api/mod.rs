//! HTTP API handlers for smes-web

pub mod admin;
pub mod auth;
pub mod dashboard;
pub mod export;
pub mod health;
pub mod identity;
pub mod sse;
pub mod survey;
pub mod ui;

pub use auth::auth_middleware;
pub use health::health_routes;

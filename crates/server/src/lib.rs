pub mod api;
pub mod auth;
pub mod backend_factory;
pub mod config;
pub mod crypto;
pub mod error;
pub mod telemetry;

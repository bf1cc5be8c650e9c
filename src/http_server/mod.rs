//! # HTTP Server Module
//!
//! Axum server for the blog JSON API.

pub mod config;
pub mod server;
pub mod state;

pub use config::HttpServerConfig;
pub use server::HttpServer;
pub use state::AppState;

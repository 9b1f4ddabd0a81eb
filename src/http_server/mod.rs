//! # HTTP Server Module
//!
//! Serves the storefront REST API over axum.
//!
//! # Endpoints
//!
//! - `/health` - Health check
//! - `/wc/blocks/products` - Product listing for editor blocks
//! - `/wc/blocks/products/:id` - Single product
//! - `/wc/store/cart` - Current cart snapshot

pub mod config;
pub mod health_routes;
pub mod server;

pub use config::HttpServerConfig;
pub use server::HttpServer;

//! storefront-blocks - read-only storefront REST API over a host commerce
//! platform
//!
//! Product listing and detail for editor blocks, plus the current cart
//! snapshot. Pricing, tax, visibility and cart state belong to the host;
//! this crate validates requests, translates filters into host queries and
//! projects results into schema-described JSON.

pub mod cli;
pub mod http_server;
pub mod observability;
pub mod platform;
pub mod rest_api;
pub mod schema;

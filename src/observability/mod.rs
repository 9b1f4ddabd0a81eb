//! Observability
//!
//! Structured logging through `tracing`. Request spans come from the HTTP
//! layer; the REST and CLI layers emit events at their boundaries.

mod logger;

pub use logger::{default_directive, init_logger, LogFormat};

//! Response schemas
//!
//! Every resource publishes a JSON Schema for its item shape. The same
//! declaration drives documentation, context filtering, and conformance
//! checks on rendered responses.

mod errors;
mod types;
mod validator;

pub use errors::{SchemaResult, SchemaViolation, ViolationKind};
pub use types::{Context, ItemSchema, JsonType, SchemaProperty, DRAFT_04};
pub use validator::{filter_by_context, SchemaValidator};

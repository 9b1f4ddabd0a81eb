//! Schema conformance errors

use std::fmt;

use thiserror::Error;

/// What went wrong at a given path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViolationKind {
    /// Declared field absent from the response
    MissingField,
    /// Response field not declared by the schema
    ExtraField,
    /// Null where the schema does not allow it
    NullValue,
    /// Wrong JSON type
    TypeMismatch {
        expected: &'static str,
        actual: &'static str,
    },
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViolationKind::MissingField => write!(f, "missing declared field"),
            ViolationKind::ExtraField => write!(f, "undeclared field"),
            ViolationKind::NullValue => write!(f, "null value not allowed"),
            ViolationKind::TypeMismatch { expected, actual } => {
                write!(f, "expected {}, found {}", expected, actual)
            }
        }
    }
}

/// A response that does not match its declared schema
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Schema violation at '{path}': {kind}")]
pub struct SchemaViolation {
    pub path: String,
    pub kind: ViolationKind,
}

impl SchemaViolation {
    pub fn new(path: impl Into<String>, kind: ViolationKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }
}

pub type SchemaResult<T> = Result<T, SchemaViolation>;

//! # Response Formatting
//!
//! Collection pages carry their totals in headers, the body is a bare
//! array of items.

use axum::http::{HeaderName, HeaderValue};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::Value;

pub const TOTAL_HEADER: &str = "x-wp-total";
pub const TOTAL_PAGES_HEADER: &str = "x-wp-totalpages";

/// One page of a collection
#[derive(Debug, Clone, Serialize)]
pub struct CollectionPage {
    pub items: Vec<Value>,
    /// Matches across all pages
    pub total: usize,
    pub total_pages: usize,
}

impl CollectionPage {
    pub fn new(items: Vec<Value>, total: usize, total_pages: usize) -> Self {
        Self {
            items,
            total,
            total_pages,
        }
    }
}

impl IntoResponse for CollectionPage {
    fn into_response(self) -> Response {
        let headers = [
            (HeaderName::from_static(TOTAL_HEADER), HeaderValue::from(self.total)),
            (
                HeaderName::from_static(TOTAL_PAGES_HEADER),
                HeaderValue::from(self.total_pages),
            ),
        ];
        (headers, Json(self.items)).into_response()
    }
}

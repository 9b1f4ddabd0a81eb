//! Shared fixture and request helpers for the HTTP-level tests.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{HeaderMap, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use storefront_blocks::platform::{
    Fixture, InMemorySessions, Platform, SessionManager, StoreSettings, TokenViewers, Viewer,
    EDIT_POSTS,
};
use storefront_blocks::rest_api::RestServer;

pub const EDITOR: &str = "editor-token";
pub const SUBSCRIBER: &str = "subscriber-token";

/// Catalog with a category tree, one attribute, every product type and a
/// seeded cart under session `abc`.
pub fn fixture() -> Fixture {
    serde_json::from_value(json!({
        "terms": [
            {"id": 10, "taxonomy": "product_cat", "slug": "clothing", "name": "Clothing"},
            {"id": 11, "taxonomy": "product_cat", "slug": "hoodies", "name": "Hoodies", "parent": 10},
            {"id": 12, "taxonomy": "product_cat", "slug": "music", "name": "Music"},
            {"id": 20, "taxonomy": "product_tag", "slug": "winter", "name": "Winter"},
            {"id": 30, "taxonomy": "pa_color", "slug": "blue", "name": "Blue"},
            {"id": 31, "taxonomy": "pa_color", "slug": "red", "name": "Red"}
        ],
        "attribute_taxonomies": ["pa_color"],
        "attachments": [
            {
                "id": 100,
                "title": "Beanie front",
                "alt": "A blue beanie",
                "full": {"url": "https://shop.test/beanie.jpg", "width": 800, "height": 800},
                "thumbnail": {"url": "https://shop.test/beanie-300.jpg", "width": 300, "height": 300},
                "sources": [{"url": "https://shop.test/beanie-300.jpg", "width": 300, "height": 300}]
            },
            {
                "id": 101,
                "title": "Beanie back",
                "full": {"url": "https://shop.test/beanie-back.jpg", "width": 800, "height": 800}
            }
        ],
        "products": [
            {
                "id": 1, "kind": "simple", "name": "Beanie", "slug": "beanie",
                "permalink": "https://shop.test/product/beanie", "sku": "BN-1",
                "short_description": "Warm and woolly.",
                "regular_price": "20.00", "sale_price": "18.00",
                "categories": [10], "tags": [20], "attributes": {"pa_color": [30]},
                "image_id": 100, "gallery_image_ids": [101, 100, 404],
                "average_rating": "4.50", "review_count": 2,
                "date_created": "2024-01-01T10:00:00Z"
            },
            {
                "id": 2, "kind": "simple", "name": "Hoodie", "slug": "hoodie",
                "permalink": "https://shop.test/product/hoodie",
                "regular_price": "45.00",
                "categories": [11], "attributes": {"pa_color": [31]},
                "visibility": ["exclude-from-search"],
                "date_created": "2024-02-01T10:00:00Z"
            },
            {
                "id": 3, "kind": "variable", "name": "V-Neck", "slug": "v-neck",
                "permalink": "https://shop.test/product/v-neck",
                "categories": [10, 11], "children": [4, 5],
                "visibility": ["exclude-from-catalog", "exclude-from-search"],
                "date_created": "2024-03-01T10:00:00Z"
            },
            {
                "id": 4, "kind": "variation", "name": "V-Neck - Small", "parent_id": 3,
                "permalink": "https://shop.test/product/v-neck?size=small",
                "regular_price": "15.00",
                "variation_attributes": [{"name": "Size", "value": "Small"}]
            },
            {
                "id": 5, "kind": "variation", "name": "V-Neck - Large", "parent_id": 3,
                "permalink": "https://shop.test/product/v-neck?size=large",
                "regular_price": "20.00",
                "variation_attributes": [{"name": "Size", "value": "Large"}]
            },
            {
                "id": 6, "kind": "grouped", "name": "Logo Collection", "slug": "logo-collection",
                "permalink": "https://shop.test/product/logo-collection",
                "categories": [12], "children": [1, 2],
                "visibility": ["featured"],
                "date_created": "2024-04-01T10:00:00Z"
            }
        ],
        "carts": {
            "abc": {
                "items": [{
                    "key": "k1", "product_id": 1, "quantity": 2, "name": "Beanie",
                    "sku": "BN-1", "permalink": "https://shop.test/product/beanie",
                    "weight": "0.25", "needs_shipping": true,
                    "line_subtotal": "36.00", "line_total": "36.00"
                }],
                "applied_coupons": [],
                "totals": {"total_items": "36.00", "total_price": "36.00"},
                "needs_payment": true
            }
        }
    }))
    .expect("valid fixture")
}

pub fn viewers() -> TokenViewers {
    TokenViewers::new()
        .with(EDITOR, Viewer::user(1, [EDIT_POSTS, "read"]))
        .with(SUBSCRIBER, Viewer::user(2, ["read"]))
}

pub fn platform() -> Platform {
    Platform::in_memory(fixture(), StoreSettings::default(), viewers())
}

/// Platform whose session store stays reachable from the test
pub fn platform_with_sessions() -> (Platform, Arc<InMemorySessions>) {
    let fixture = fixture();
    let sessions = Arc::new(InMemorySessions::new(fixture.carts.clone()));
    let mut platform = Platform::in_memory(fixture, StoreSettings::default(), viewers());
    platform.sessions = Arc::clone(&sessions) as Arc<dyn SessionManager>;
    (platform, sessions)
}

pub fn router() -> Router {
    RestServer::new(platform()).router()
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

pub async fn send(router: Router, method: Method, uri: &str, headers: &[(&str, &str)]) -> TestResponse {
    let mut request = Request::builder().method(method).uri(uri);
    for (name, value) in headers {
        request = request.header(*name, *value);
    }
    let response = router
        .oneshot(request.body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let headers = response.headers().clone();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    TestResponse {
        status,
        headers,
        body,
    }
}

pub async fn get_as(uri: &str, token: &str) -> TestResponse {
    let auth = format!("Bearer {}", token);
    send(router(), Method::GET, uri, &[("authorization", auth.as_str())]).await
}

/// Ids of a listing response, in order
pub fn ids(body: &Value) -> Vec<u64> {
    body.as_array()
        .unwrap()
        .iter()
        .map(|item| item["id"].as_u64().unwrap())
        .collect()
}

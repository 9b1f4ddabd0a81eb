//! # REST API HTTP Server
//!
//! Axum routes for the product and cart resources.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    routing::get,
    Json, Router,
};
use serde_json::Value;

use crate::platform::{CartSchema, Platform, Viewer, ViewerResolver};

use super::cart::CartController;
use super::cart_schema::StoreCartSchema;
use super::controller::ResourceController;
use super::errors::{RestError, RestResult};
use super::products::{self, BlockProducts};
use super::response::CollectionPage;

/// Header carrying the storefront session key
pub const SESSION_HEADER: &str = "x-wc-session";

/// REST API server state
pub struct RestServer {
    products: ResourceController,
    cart: CartController,
    viewers: Arc<dyn ViewerResolver>,
}

impl RestServer {
    pub fn new(platform: Platform) -> Self {
        Self::with_cart_schema(platform, Arc::new(StoreCartSchema))
    }

    pub fn with_cart_schema(platform: Platform, cart_schema: Arc<dyn CartSchema>) -> Self {
        Self {
            viewers: platform.viewers.clone(),
            products: ResourceController::new(
                products::NAMESPACE,
                products::REST_BASE,
                Arc::new(BlockProducts),
                platform.clone(),
            ),
            cart: CartController::new(platform, cart_schema),
        }
    }

    /// Build the Axum router
    pub fn router(self) -> Router {
        let state = Arc::new(self);

        Router::new()
            .route(
                "/wc/blocks/products",
                get(list_products_handler).options(describe_products_handler),
            )
            .route(
                "/wc/blocks/products/:id",
                get(get_product_handler).options(describe_product_handler),
            )
            .route(
                "/wc/store/cart",
                get(get_cart_handler).options(describe_cart_handler),
            )
            .with_state(state)
    }
}

/// Shared state type
type ServerState = Arc<RestServer>;

/// Resolve the acting user from the bearer token, if any
fn extract_viewer(server: &RestServer, headers: &HeaderMap) -> Viewer {
    let bearer = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|auth| auth.strip_prefix("Bearer "));
    server.viewers.resolve(bearer)
}

fn extract_session(headers: &HeaderMap) -> Option<&str> {
    headers.get(SESSION_HEADER).and_then(|v| v.to_str().ok())
}

fn parse_id(raw: &str) -> RestResult<u64> {
    raw.parse().map_err(|_| RestError::InvalidProductId)
}

/// List products handler
async fn list_products_handler(
    State(server): State<ServerState>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Result<CollectionPage, RestError> {
    let viewer = extract_viewer(&server, &headers);
    server
        .products
        .list(&viewer, &query, &products::list_permission())
}

/// Single product handler
async fn get_product_handler(
    State(server): State<ServerState>,
    Path(id): Path<String>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Result<Json<Value>, RestError> {
    let viewer = extract_viewer(&server, &headers);
    let id = parse_id(&id)?;
    let product = server
        .products
        .get(&viewer, id, &query, &products::item_permission())?;
    Ok(Json(product))
}

/// Cart snapshot handler
async fn get_cart_handler(
    State(server): State<ServerState>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Result<Json<Value>, RestError> {
    let cart = server.cart.get(extract_session(&headers), &query)?;
    Ok(Json(cart))
}

async fn describe_products_handler(State(server): State<ServerState>) -> Json<Value> {
    Json(server.products.describe_collection())
}

async fn describe_product_handler(State(server): State<ServerState>) -> Json<Value> {
    Json(server.products.describe_item())
}

async fn describe_cart_handler(State(server): State<ServerState>) -> Json<Value> {
    Json(server.cart.describe())
}

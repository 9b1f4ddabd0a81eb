//! # Storefront REST API Module
//!
//! Read-only endpoints for editor blocks and the storefront: product
//! listing and detail under `wc/blocks`, the cart snapshot under
//! `wc/store`. Each request is validated against declared parameters,
//! translated into a host query and projected into a schema-described
//! response.

pub mod cart;
pub mod cart_schema;
pub mod controller;
pub mod errors;
pub mod params;
pub mod products;
pub mod projection;
pub mod query;
pub mod response;
pub mod server;

pub use cart::CartController;
pub use cart_schema::StoreCartSchema;
pub use controller::{Permission, ResourceController, ResourceHooks};
pub use errors::{ErrorResponse, RestError, RestResult};
pub use params::{sanitize_key, CollectionParams, ParamSpec, ParamType, RequestParams};
pub use products::BlockProducts;
pub use projection::{ProductProjection, ProjectionContext};
pub use query::{augment_query, build_base_query, CatalogVisibility, FilterRequest, TaxonomyOperator};
pub use response::CollectionPage;
pub use server::RestServer;

//! # Resource Controller
//!
//! List, get-by-id and schema for a catalog-backed resource. What varies
//! between resources (parameters, query augmentation, item shape) comes in
//! through [`ResourceHooks`]; the permission check is handed to each call.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{json, Value};

use crate::platform::{Catalog, ObjectsQuery, Platform, Product, ProductId, Viewer};
use crate::schema::{filter_by_context, Context, ItemSchema};

use super::errors::{RestError, RestResult};
use super::params::{CollectionParams, RequestParams};
use super::projection::ProjectionContext;
use super::query::build_base_query;
use super::response::CollectionPage;

/// Who may call a route, and what they are told otherwise
#[derive(Debug, Clone, Copy)]
pub struct Permission {
    pub check: fn(&Viewer) -> bool,
    pub denied: &'static str,
}

impl Permission {
    pub fn new(check: fn(&Viewer) -> bool, denied: &'static str) -> Self {
        Self { check, denied }
    }

    /// Anyone may call
    pub fn public() -> Self {
        Self::new(|_| true, "")
    }

    pub fn authorize(&self, viewer: &Viewer) -> RestResult<()> {
        if (self.check)(viewer) {
            Ok(())
        } else {
            Err(RestError::cannot_view(viewer, self.denied))
        }
    }
}

/// Resource-specific behavior plugged into a [`ResourceController`]
pub trait ResourceHooks: Send + Sync {
    /// Parameters accepted by the list route
    fn collection_params(&self) -> CollectionParams {
        CollectionParams::base_products()
    }

    /// Parameters accepted by the single-item route
    fn item_params(&self) -> CollectionParams {
        CollectionParams::context_only()
    }

    /// Adjust the query built from the inherited parameters
    fn augment_query(
        &self,
        base: ObjectsQuery,
        _params: &RequestParams,
        _catalog: &dyn Catalog,
    ) -> RestResult<ObjectsQuery> {
        Ok(base)
    }

    fn item_schema(&self) -> ItemSchema;

    /// Full (unfiltered) representation of one item
    fn prepare_item(&self, ctx: &ProjectionContext<'_>, product: &Product) -> RestResult<Value>;
}

/// Generic catalog resource
pub struct ResourceController {
    namespace: &'static str,
    rest_base: &'static str,
    hooks: Arc<dyn ResourceHooks>,
    platform: Platform,
}

impl ResourceController {
    pub fn new(
        namespace: &'static str,
        rest_base: &'static str,
        hooks: Arc<dyn ResourceHooks>,
        platform: Platform,
    ) -> Self {
        Self {
            namespace,
            rest_base,
            hooks,
            platform,
        }
    }

    pub fn namespace(&self) -> &'static str {
        self.namespace
    }

    /// Route path of the collection, e.g. `/wc/blocks/products`
    pub fn collection_path(&self) -> String {
        format!("/{}/{}", self.namespace, self.rest_base)
    }

    /// One page of items matching the request
    pub fn list(
        &self,
        viewer: &Viewer,
        raw: &HashMap<String, String>,
        permission: &Permission,
    ) -> RestResult<CollectionPage> {
        let params = self.hooks.collection_params().parse(raw)?;
        permission.authorize(viewer)?;

        let catalog = self.platform.catalog.as_ref();
        let base = build_base_query(&params)?;
        let query = self.hooks.augment_query(base, &params, catalog)?;
        tracing::debug!(
            resource = self.rest_base,
            page = query.page,
            per_page = query.per_page,
            clauses = query.tax_query.len(),
            "listing"
        );

        let page = catalog.query(&query)?;

        let settings = self.platform.settings_snapshot();
        let ctx = ProjectionContext::new(&self.platform, &settings);
        let schema = self.hooks.item_schema();
        let context = request_context(&params);

        let items = page
            .products
            .iter()
            .map(|product| {
                self.hooks
                    .prepare_item(&ctx, product)
                    .map(|item| filter_by_context(item, &schema, context))
            })
            .collect::<RestResult<Vec<_>>>()?;

        Ok(CollectionPage::new(items, page.total, page.total_pages))
    }

    /// A single item by id
    pub fn get(
        &self,
        viewer: &Viewer,
        id: ProductId,
        raw: &HashMap<String, String>,
        permission: &Permission,
    ) -> RestResult<Value> {
        let params = self.hooks.item_params().parse(raw)?;
        permission.authorize(viewer)?;

        let product = self
            .platform
            .catalog
            .product(id)?
            .ok_or(RestError::InvalidProductId)?;

        let settings = self.platform.settings_snapshot();
        let ctx = ProjectionContext::new(&self.platform, &settings);
        let item = self.hooks.prepare_item(&ctx, &product)?;

        Ok(filter_by_context(
            item,
            &self.hooks.item_schema(),
            request_context(&params),
        ))
    }

    /// Item schema as a JSON Schema document
    pub fn schema(&self) -> Value {
        self.hooks.item_schema().to_json()
    }

    /// Route description answered to `OPTIONS`
    pub fn describe_collection(&self) -> Value {
        describe_route(
            self.namespace,
            self.hooks.collection_params().to_json(),
            self.schema(),
        )
    }

    pub fn describe_item(&self) -> Value {
        let mut args = self.hooks.item_params().to_json();
        if let Value::Object(map) = &mut args {
            map.insert(
                "id".to_string(),
                json!({
                    "description": "Unique identifier for the resource.",
                    "type": "integer",
                    "required": false,
                }),
            );
        }
        describe_route(self.namespace, args, self.schema())
    }
}

/// `{namespace, methods, endpoints, schema}` for a read-only route
pub fn describe_route(namespace: &str, args: Value, schema: Value) -> Value {
    json!({
        "namespace": namespace,
        "methods": ["GET"],
        "endpoints": [{
            "methods": ["GET"],
            "args": args,
        }],
        "schema": schema,
    })
}

pub(crate) fn request_context(params: &RequestParams) -> Context {
    params
        .get_str("context")
        .and_then(Context::parse)
        .unwrap_or_default()
}

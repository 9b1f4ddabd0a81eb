//! # Block Products Resource
//!
//! `wc/blocks/products`: the product listing used by editor blocks. Adds
//! the taxonomy operators and catalog visibility filter to the standard
//! product parameters.

use serde_json::Value;

use crate::platform::{Catalog, ObjectsQuery, Product, Viewer, EDIT_POSTS};
use crate::schema::ItemSchema;

use super::controller::{Permission, ResourceHooks};
use super::errors::RestResult;
use super::params::{CollectionParams, ParamSpec, RequestParams};
use super::projection::{product_response, product_schema, ProjectionContext};
use super::query::{augment_query, CatalogVisibility, FilterRequest, TaxonomyOperator};

pub const NAMESPACE: &str = "wc/blocks";
pub const REST_BASE: &str = "products";

fn can_edit_posts(viewer: &Viewer) -> bool {
    viewer.can(EDIT_POSTS)
}

/// Permission for the list route
pub fn list_permission() -> Permission {
    Permission::new(can_edit_posts, "Sorry, you cannot list resources.")
}

/// Permission for the single-product route
pub fn item_permission() -> Permission {
    Permission::new(can_edit_posts, "Sorry, you cannot view this resource.")
}

#[derive(Debug, Default, Clone, Copy)]
pub struct BlockProducts;

impl ResourceHooks for BlockProducts {
    fn collection_params(&self) -> CollectionParams {
        let mut params = CollectionParams::base_products();
        params.extend_enum("orderby", &["menu_order", "comment_count"]);

        params.insert(
            "category_operator",
            ParamSpec::enumerated_key(
                "Operator to compare product category terms.",
                TaxonomyOperator::VALUES,
            )
            .default_value("in"),
        );
        params.insert(
            "tag_operator",
            ParamSpec::enumerated_key("Operator to compare product tags.", TaxonomyOperator::VALUES)
                .default_value("in"),
        );
        params.insert(
            "attribute_operator",
            ParamSpec::enumerated_key(
                "Operator to compare product attribute terms.",
                TaxonomyOperator::VALUES,
            )
            .default_value("in"),
        );
        params.insert(
            "catalog_visibility",
            ParamSpec::enumerated_key(
                "Determines if hidden or visible catalog products are shown.",
                CatalogVisibility::VALUES,
            ),
        );

        params
    }

    fn augment_query(
        &self,
        base: ObjectsQuery,
        params: &RequestParams,
        catalog: &dyn Catalog,
    ) -> RestResult<ObjectsQuery> {
        let filter = FilterRequest::from_params(params)?;
        Ok(augment_query(
            base,
            &filter,
            &catalog.attribute_taxonomy_names(),
        ))
    }

    fn item_schema(&self) -> ItemSchema {
        product_schema()
    }

    fn prepare_item(&self, ctx: &ProjectionContext<'_>, product: &Product) -> RestResult<Value> {
        product_response(ctx, product)
    }
}

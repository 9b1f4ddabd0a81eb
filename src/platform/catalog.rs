//! # Catalog Read API

use super::errors::PlatformResult;
use super::product::{Product, ProductId};
use super::query::ObjectsQuery;

/// One page of query results
#[derive(Debug, Clone, Default)]
pub struct QueryPage {
    pub products: Vec<Product>,
    /// Matches across all pages
    pub total: usize,
    pub total_pages: usize,
}

impl QueryPage {
    pub fn new(products: Vec<Product>, total: usize, per_page: usize) -> Self {
        let total_pages = if per_page == 0 {
            0
        } else {
            total.div_ceil(per_page)
        };
        Self {
            products,
            total,
            total_pages,
        }
    }
}

pub trait Catalog: Send + Sync {
    /// Run a product query
    fn query(&self, query: &ObjectsQuery) -> PlatformResult<QueryPage>;

    /// Fetch any product or variation by id
    fn product(&self, id: ProductId) -> PlatformResult<Option<Product>>;

    /// Variations of a variable product or members of a grouped product
    fn children(&self, product: &Product) -> PlatformResult<Vec<Product>>;

    /// Registered attribute taxonomy names, e.g. `pa_color`
    fn attribute_taxonomy_names(&self) -> Vec<String>;
}

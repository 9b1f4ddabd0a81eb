//! # Host Catalog Query
//!
//! The host's native product query: pagination, ordering, scalar filters
//! and an ordered list of taxonomy clauses.

use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::product::ProductId;

pub const TAXONOMY_CATEGORY: &str = "product_cat";
pub const TAXONOMY_TAG: &str = "product_tag";
pub const TAXONOMY_TYPE: &str = "product_type";
pub const TAXONOMY_VISIBILITY: &str = "product_visibility";

/// Boolean operator of a taxonomy clause
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaxOperator {
    /// Item bears at least one of the terms
    #[serde(rename = "IN")]
    In,

    /// Item bears none of the terms
    #[serde(rename = "NOT IN")]
    NotIn,

    /// Item bears every term
    #[serde(rename = "AND")]
    And,
}

impl TaxOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaxOperator::In => "IN",
            TaxOperator::NotIn => "NOT IN",
            TaxOperator::And => "AND",
        }
    }
}

/// How clause terms are matched against the taxonomy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TermField {
    TermId,
    Slug,
    Name,
}

/// A single taxonomy condition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxClause {
    pub taxonomy: String,
    pub field: TermField,
    pub terms: Vec<String>,
    pub operator: TaxOperator,
    pub include_children: bool,
}

impl TaxClause {
    pub fn new(
        taxonomy: impl Into<String>,
        field: TermField,
        terms: Vec<String>,
        operator: TaxOperator,
    ) -> Self {
        Self {
            taxonomy: taxonomy.into(),
            field,
            terms,
            operator,
            include_children: true,
        }
    }

    /// Clause matching any of the given term ids
    pub fn term_ids(taxonomy: impl Into<String>, ids: &[u64]) -> Self {
        Self::new(
            taxonomy,
            TermField::TermId,
            ids.iter().map(|id| id.to_string()).collect(),
            TaxOperator::In,
        )
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderBy {
    #[default]
    Date,
    Id,
    Include,
    Title,
    Slug,
    Price,
    Popularity,
    Rating,
    MenuOrder,
    CommentCount,
}

impl OrderBy {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "date" => Some(OrderBy::Date),
            "id" => Some(OrderBy::Id),
            "include" => Some(OrderBy::Include),
            "title" => Some(OrderBy::Title),
            "slug" => Some(OrderBy::Slug),
            "price" => Some(OrderBy::Price),
            "popularity" => Some(OrderBy::Popularity),
            "rating" => Some(OrderBy::Rating),
            "menu_order" => Some(OrderBy::MenuOrder),
            "comment_count" => Some(OrderBy::CommentCount),
            _ => None,
        }
    }
}

/// Product query handed to the catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectsQuery {
    pub page: usize,
    pub per_page: usize,
    pub offset: Option<usize>,
    pub order: SortOrder,
    pub orderby: OrderBy,
    pub search: Option<String>,
    pub include: Vec<ProductId>,
    pub exclude: Vec<ProductId>,
    pub parent: Vec<ProductId>,
    pub slug: Option<String>,
    /// `None` matches any status
    pub status: Option<String>,
    pub sku: Option<String>,
    pub on_sale: Option<bool>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub stock_status: Option<String>,
    pub after: Option<DateTime<FixedOffset>>,
    pub before: Option<DateTime<FixedOffset>>,
    pub tax_query: Vec<TaxClause>,
}

impl Default for ObjectsQuery {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: 10,
            offset: None,
            order: SortOrder::default(),
            orderby: OrderBy::default(),
            search: None,
            include: Vec::new(),
            exclude: Vec::new(),
            parent: Vec::new(),
            slug: None,
            status: None,
            sku: None,
            on_sale: None,
            min_price: None,
            max_price: None,
            stock_status: None,
            after: None,
            before: None,
            tax_query: Vec::new(),
        }
    }
}

impl ObjectsQuery {
    /// Number of records to skip
    pub fn skip(&self) -> usize {
        self.offset
            .unwrap_or_else(|| self.page.saturating_sub(1).saturating_mul(self.per_page))
    }

    /// Clauses on the given taxonomy
    pub fn clauses_for<'a>(&'a self, taxonomy: &'a str) -> impl Iterator<Item = &'a TaxClause> {
        self.tax_query.iter().filter(move |c| c.taxonomy == taxonomy)
    }
}

//! # Query Translation
//!
//! Turns validated request parameters into the host's native product query.
//! `build_base_query` handles the inherited pagination, sort and filter
//! parameters; `augment_query` then applies the taxonomy operators and the
//! catalog visibility clause on top.

use serde::{Deserialize, Serialize};

use crate::platform::query::{
    OrderBy, SortOrder, TAXONOMY_CATEGORY, TAXONOMY_TAG, TAXONOMY_TYPE, TAXONOMY_VISIBILITY,
};
use crate::platform::{ObjectsQuery, TaxClause, TaxOperator, TermField};

use super::errors::{RestError, RestResult};
use super::params::RequestParams;

const EXCLUDE_FROM_CATALOG: &str = "exclude-from-catalog";
const EXCLUDE_FROM_SEARCH: &str = "exclude-from-search";

/// Taxonomy operator as accepted on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxonomyOperator {
    In,
    NotIn,
    And,
}

impl TaxonomyOperator {
    pub const VALUES: &'static [&'static str] = &["in", "not_in", "and"];

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "in" => Some(TaxonomyOperator::In),
            "not_in" => Some(TaxonomyOperator::NotIn),
            "and" => Some(TaxonomyOperator::And),
            _ => None,
        }
    }

    /// Host operator this maps to
    pub fn to_tax_operator(self) -> TaxOperator {
        match self {
            TaxonomyOperator::In => TaxOperator::In,
            TaxonomyOperator::NotIn => TaxOperator::NotIn,
            TaxonomyOperator::And => TaxOperator::And,
        }
    }
}

/// Where a product may appear
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogVisibility {
    Any,
    Visible,
    Catalog,
    Search,
    Hidden,
}

impl CatalogVisibility {
    pub const VALUES: &'static [&'static str] = &["any", "visible", "catalog", "search", "hidden"];

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "any" => Some(CatalogVisibility::Any),
            "visible" => Some(CatalogVisibility::Visible),
            "catalog" => Some(CatalogVisibility::Catalog),
            "search" => Some(CatalogVisibility::Search),
            "hidden" => Some(CatalogVisibility::Hidden),
            _ => None,
        }
    }

    /// Clause restricting results to this visibility, `None` for `any`
    pub fn clause(self) -> Option<TaxClause> {
        if self == CatalogVisibility::Any {
            return None;
        }

        let from_catalog = if self == CatalogVisibility::Search {
            ""
        } else {
            EXCLUDE_FROM_CATALOG
        };
        let from_search = if self == CatalogVisibility::Catalog {
            ""
        } else {
            EXCLUDE_FROM_SEARCH
        };
        let operator = if self == CatalogVisibility::Hidden {
            TaxOperator::And
        } else {
            TaxOperator::NotIn
        };

        Some(TaxClause::new(
            TAXONOMY_VISIBILITY,
            TermField::Name,
            vec![from_catalog.to_string(), from_search.to_string()],
            operator,
        ))
    }
}

/// The listing-specific filter parameters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterRequest {
    pub category_operator: Option<TaxonomyOperator>,
    pub tag_operator: Option<TaxonomyOperator>,
    pub attribute_operator: Option<TaxonomyOperator>,
    pub catalog_visibility: Option<CatalogVisibility>,
}

impl FilterRequest {
    /// Read the filter parameters; values were validated during parsing
    pub fn from_params(params: &RequestParams) -> RestResult<Self> {
        Ok(Self {
            category_operator: operator_param(params, "category_operator")?,
            tag_operator: operator_param(params, "tag_operator")?,
            attribute_operator: operator_param(params, "attribute_operator")?,
            catalog_visibility: params
                .get_str("catalog_visibility")
                .map(|value| {
                    CatalogVisibility::parse(value).ok_or_else(|| {
                        RestError::invalid_param(
                            "catalog_visibility",
                            format!(
                                "catalog_visibility is not one of {}.",
                                CatalogVisibility::VALUES.join(", ")
                            ),
                        )
                    })
                })
                .transpose()?,
        })
    }
}

fn operator_param(params: &RequestParams, name: &str) -> RestResult<Option<TaxonomyOperator>> {
    params
        .get_str(name)
        .map(|value| {
            TaxonomyOperator::parse(value).ok_or_else(|| {
                RestError::invalid_param(
                    name,
                    format!("{} is not one of {}.", name, TaxonomyOperator::VALUES.join(", ")),
                )
            })
        })
        .transpose()
}

/// Build the host query from the inherited collection parameters
pub fn build_base_query(params: &RequestParams) -> RestResult<ObjectsQuery> {
    let mut query = ObjectsQuery::default();

    if let Some(page) = params.get_int("page") {
        query.page = to_count(page);
    }
    if let Some(per_page) = params.get_int("per_page") {
        query.per_page = to_count(per_page);
    }
    query.offset = params.get_int("offset").map(to_count);

    query.order = match params.get_str("order") {
        Some("asc") => SortOrder::Asc,
        _ => SortOrder::Desc,
    };
    if let Some(orderby) = params.get_str("orderby") {
        query.orderby = OrderBy::parse(orderby).ok_or_else(|| {
            RestError::invalid_param("orderby", format!("orderby does not support {}.", orderby))
        })?;
    }

    query.search = params.get_non_empty("search").map(str::to_string);
    query.include = params.get_ids("include").to_vec();
    query.exclude = params.get_ids("exclude").to_vec();
    query.parent = params.get_ids("parent").to_vec();
    query.slug = params.get_non_empty("slug").map(str::to_string);
    query.status = params
        .get_str("status")
        .filter(|status| *status != "any")
        .map(str::to_string);
    query.sku = params.get_non_empty("sku").map(str::to_string);
    query.after = params.get_datetime("after");
    query.before = params.get_datetime("before");

    if let Some(kind) = params.get_non_empty("type") {
        query.tax_query.push(TaxClause::new(
            TAXONOMY_TYPE,
            TermField::Slug,
            vec![kind.to_string()],
            TaxOperator::In,
        ));
    }

    if let Some(featured) = params.get_bool("featured") {
        query.tax_query.push(TaxClause::new(
            TAXONOMY_VISIBILITY,
            TermField::Name,
            vec!["featured".to_string()],
            if featured {
                TaxOperator::In
            } else {
                TaxOperator::NotIn
            },
        ));
    }

    let categories = params.get_ids("category");
    if !categories.is_empty() {
        query
            .tax_query
            .push(TaxClause::term_ids(TAXONOMY_CATEGORY, categories));
    }

    let tags = params.get_ids("tag");
    if !tags.is_empty() {
        query.tax_query.push(TaxClause::term_ids(TAXONOMY_TAG, tags));
    }

    let attribute_terms = params.get_ids("attribute_term");
    if let (Some(attribute), false) = (params.get_non_empty("attribute"), attribute_terms.is_empty()) {
        query
            .tax_query
            .push(TaxClause::term_ids(attribute, attribute_terms));
    }

    query.on_sale = params.get_bool("on_sale");
    query.min_price = params.get_decimal("min_price");
    query.max_price = params.get_decimal("max_price");
    query.stock_status = params.get_non_empty("stock_status").map(str::to_string);

    Ok(query)
}

fn to_count(value: i64) -> usize {
    usize::try_from(value).unwrap_or(0)
}

/// Apply operator overrides and the visibility clause to a base query
///
/// Clauses already present keep their position; only their operator (and,
/// for categories, `include_children`) changes. At most one clause is
/// appended.
pub fn augment_query(
    mut query: ObjectsQuery,
    filter: &FilterRequest,
    attribute_taxonomies: &[String],
) -> ObjectsQuery {
    if let Some(operator) = filter.category_operator.map(TaxonomyOperator::to_tax_operator) {
        for clause in query
            .tax_query
            .iter_mut()
            .filter(|c| c.taxonomy == TAXONOMY_CATEGORY)
        {
            clause.operator = operator;
            clause.include_children = operator != TaxOperator::And;
        }
    }

    if let Some(operator) = filter.tag_operator.map(TaxonomyOperator::to_tax_operator) {
        for clause in query
            .tax_query
            .iter_mut()
            .filter(|c| c.taxonomy == TAXONOMY_TAG)
        {
            clause.operator = operator;
        }
    }

    if let Some(operator) = filter.attribute_operator.map(TaxonomyOperator::to_tax_operator) {
        for clause in query
            .tax_query
            .iter_mut()
            .filter(|c| attribute_taxonomies.contains(&c.taxonomy))
        {
            clause.operator = operator;
        }
    }

    if let Some(clause) = filter.catalog_visibility.and_then(CatalogVisibility::clause) {
        query.tax_query.push(clause);
    }

    query
}

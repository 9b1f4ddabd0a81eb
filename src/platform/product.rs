//! # Host Product Entities
//!
//! Read-side view of the host platform's products. Everything here is owned
//! by the host; the REST layer only calls the accessors.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub type ProductId = u64;
pub type AttachmentId = u64;
pub type TermId = u64;

/// Product type as registered with the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductKind {
    Simple,
    Variable,
    Variation,
    Grouped,
    External,
}

impl ProductKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductKind::Simple => "simple",
            ProductKind::Variable => "variable",
            ProductKind::Variation => "variation",
            ProductKind::Grouped => "grouped",
            ProductKind::External => "external",
        }
    }
}

/// Publication status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    #[default]
    Publish,
    Draft,
    Pending,
    Private,
}

impl PostStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostStatus::Publish => "publish",
            PostStatus::Draft => "draft",
            PostStatus::Pending => "pending",
            PostStatus::Private => "private",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StockStatus {
    #[default]
    Instock,
    Outofstock,
    Onbackorder,
}

impl StockStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StockStatus::Instock => "instock",
            StockStatus::Outofstock => "outofstock",
            StockStatus::Onbackorder => "onbackorder",
        }
    }
}

/// One distinguishing attribute of a variation, e.g. `Color: Blue`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariationAttribute {
    pub name: String,
    pub value: String,
}

/// A product, variation, or grouped/variable parent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub kind: ProductKind,
    pub name: String,
    pub permalink: String,

    #[serde(default)]
    pub parent_id: Option<ProductId>,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub sku: String,
    #[serde(default)]
    pub status: PostStatus,
    #[serde(default)]
    pub short_description: String,
    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub regular_price: Option<Decimal>,
    #[serde(default)]
    pub sale_price: Option<Decimal>,
    #[serde(default)]
    pub tax_class: String,
    #[serde(default)]
    pub stock_status: StockStatus,

    #[serde(default)]
    pub image_id: Option<AttachmentId>,
    #[serde(default)]
    pub gallery_image_ids: Vec<AttachmentId>,

    /// Category term ids (`product_cat`)
    #[serde(default)]
    pub categories: Vec<TermId>,
    /// Tag term ids (`product_tag`)
    #[serde(default)]
    pub tags: Vec<TermId>,
    /// Attribute taxonomy name (e.g. `pa_color`) to term ids
    #[serde(default)]
    pub attributes: BTreeMap<String, Vec<TermId>>,
    /// Attributes that identify a variation
    #[serde(default)]
    pub variation_attributes: Vec<VariationAttribute>,
    /// `product_visibility` term names, e.g. `exclude-from-search`, `featured`
    #[serde(default)]
    pub visibility: Vec<String>,

    /// Variations of a variable product, members of a grouped product
    #[serde(default)]
    pub children: Vec<ProductId>,

    #[serde(default)]
    pub average_rating: Decimal,
    #[serde(default)]
    pub review_count: u32,
    #[serde(default)]
    pub total_sales: u64,
    #[serde(default)]
    pub menu_order: i32,
    #[serde(default)]
    pub comment_count: u32,
    #[serde(default)]
    pub date_created: Option<DateTime<Utc>>,

    /// Button label for external products
    #[serde(default)]
    pub button_text: Option<String>,
}

impl Product {
    pub fn is_type(&self, kind: ProductKind) -> bool {
        self.kind == kind
    }

    pub fn is_on_sale(&self) -> bool {
        match (self.sale_price, self.regular_price) {
            (Some(sale), Some(regular)) => sale < regular,
            (Some(_), None) => true,
            _ => false,
        }
    }

    /// The active price: sale price while on sale, regular price otherwise
    pub fn price(&self) -> Option<Decimal> {
        if self.is_on_sale() {
            self.sale_price
        } else {
            self.regular_price
        }
    }

    pub fn is_purchasable(&self) -> bool {
        self.status == PostStatus::Publish && self.price().is_some()
    }

    pub fn is_in_stock(&self) -> bool {
        self.stock_status != StockStatus::Outofstock
    }

    /// Visible as a member of a grouped product
    pub fn is_visible_in_group(&self) -> bool {
        self.status == PostStatus::Publish
    }

    pub fn has_visibility_term(&self, term: &str) -> bool {
        self.visibility.iter().any(|t| t == term)
    }

    pub fn is_featured(&self) -> bool {
        self.has_visibility_term("featured")
    }

    pub fn add_to_cart_text(&self) -> String {
        match self.kind {
            ProductKind::Simple | ProductKind::Variation => {
                if self.is_purchasable() && self.is_in_stock() {
                    "Add to cart".to_string()
                } else {
                    "Read more".to_string()
                }
            }
            ProductKind::Variable => {
                if self.is_purchasable() {
                    "Select options".to_string()
                } else {
                    "Read more".to_string()
                }
            }
            ProductKind::Grouped => "View products".to_string(),
            ProductKind::External => self
                .button_text
                .clone()
                .unwrap_or_else(|| "Buy product".to_string()),
        }
    }

    pub fn add_to_cart_description(&self) -> String {
        match self.kind {
            ProductKind::Simple | ProductKind::Variation => {
                if self.is_purchasable() && self.is_in_stock() {
                    format!("Add \u{201c}{}\u{201d} to your cart", self.name)
                } else {
                    format!("Read more about \u{201c}{}\u{201d}", self.name)
                }
            }
            ProductKind::Variable => {
                if self.is_purchasable() {
                    format!("Select options for \u{201c}{}\u{201d}", self.name)
                } else {
                    format!("Read more about \u{201c}{}\u{201d}", self.name)
                }
            }
            ProductKind::Grouped => {
                format!("View products in the \u{201c}{}\u{201d} group", self.name)
            }
            ProductKind::External => self
                .button_text
                .clone()
                .unwrap_or_else(|| format!("Buy \u{201c}{}\u{201d}", self.name)),
        }
    }

    /// Whether the storefront may add this item to the cart without a page load
    pub fn supports_ajax_add_to_cart(&self) -> bool {
        matches!(self.kind, ProductKind::Simple)
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn simple(id: ProductId, price: Option<Decimal>) -> Product {
        Product {
            id,
            kind: ProductKind::Simple,
            name: format!("Product {}", id),
            permalink: format!("https://shop.test/product/{}", id),
            parent_id: None,
            slug: format!("product-{}", id),
            sku: String::new(),
            status: PostStatus::Publish,
            short_description: String::new(),
            description: String::new(),
            regular_price: price,
            sale_price: None,
            tax_class: String::new(),
            stock_status: StockStatus::Instock,
            image_id: None,
            gallery_image_ids: Vec::new(),
            categories: Vec::new(),
            tags: Vec::new(),
            attributes: BTreeMap::new(),
            variation_attributes: Vec::new(),
            visibility: Vec::new(),
            children: Vec::new(),
            average_rating: Decimal::ZERO,
            review_count: 0,
            total_sales: 0,
            menu_order: 0,
            comment_count: 0,
            date_created: None,
            button_text: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::simple;
    use super::*;

    #[test]
    fn test_active_price_prefers_sale() {
        let mut product = simple(1, Some(Decimal::from(20)));
        assert_eq!(product.price(), Some(Decimal::from(20)));
        assert!(!product.is_on_sale());

        product.sale_price = Some(Decimal::from(15));
        assert!(product.is_on_sale());
        assert_eq!(product.price(), Some(Decimal::from(15)));
    }

    #[test]
    fn test_sale_price_above_regular_is_not_a_sale() {
        let mut product = simple(1, Some(Decimal::from(20)));
        product.sale_price = Some(Decimal::from(25));
        assert!(!product.is_on_sale());
        assert_eq!(product.price(), Some(Decimal::from(20)));
    }

    #[test]
    fn test_add_to_cart_text_by_kind() {
        let product = simple(1, Some(Decimal::from(5)));
        assert_eq!(product.add_to_cart_text(), "Add to cart");
        assert!(product.supports_ajax_add_to_cart());

        let unpriced = simple(2, None);
        assert_eq!(unpriced.add_to_cart_text(), "Read more");

        let mut grouped = simple(3, None);
        grouped.kind = ProductKind::Grouped;
        assert_eq!(grouped.add_to_cart_text(), "View products");
        assert!(!grouped.supports_ajax_add_to_cart());

        let mut external = simple(4, Some(Decimal::from(5)));
        external.kind = ProductKind::External;
        external.button_text = Some("Buy on vendor site".to_string());
        assert_eq!(external.add_to_cart_text(), "Buy on vendor site");
    }

    #[test]
    fn test_out_of_stock_reads_more() {
        let mut product = simple(1, Some(Decimal::from(5)));
        product.stock_status = StockStatus::Outofstock;
        assert_eq!(product.add_to_cart_text(), "Read more");
        assert!(product.add_to_cart_description().starts_with("Read more about"));
    }
}

//! # Cart Session
//!
//! The cart entity as held by the host session, plus the collaborators that
//! fetch it and shape it for output.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::pricing::StoreSettings;
use super::product::ProductId;
use crate::schema::ItemSchema;

/// A line in the cart; amounts are computed by the host
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartItem {
    pub key: String,
    pub product_id: ProductId,
    #[serde(default)]
    pub variation_id: Option<ProductId>,
    pub quantity: u32,
    pub name: String,
    #[serde(default)]
    pub sku: String,
    #[serde(default)]
    pub permalink: String,
    /// Weight of a single unit
    #[serde(default)]
    pub weight: Option<Decimal>,
    #[serde(default)]
    pub needs_shipping: bool,
    #[serde(default)]
    pub line_subtotal: Decimal,
    #[serde(default)]
    pub line_subtotal_tax: Decimal,
    #[serde(default)]
    pub line_total: Decimal,
    #[serde(default)]
    pub line_tax: Decimal,
}

/// Host-computed cart totals
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CartTotals {
    #[serde(default)]
    pub total_items: Decimal,
    #[serde(default)]
    pub total_items_tax: Decimal,
    #[serde(default)]
    pub total_fees: Decimal,
    #[serde(default)]
    pub total_fees_tax: Decimal,
    #[serde(default)]
    pub total_discount: Decimal,
    #[serde(default)]
    pub total_discount_tax: Decimal,
    /// `None` until shipping has been calculated
    #[serde(default)]
    pub total_shipping: Option<Decimal>,
    #[serde(default)]
    pub total_shipping_tax: Option<Decimal>,
    #[serde(default)]
    pub total_price: Decimal,
    #[serde(default)]
    pub total_tax: Decimal,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Cart {
    #[serde(default)]
    pub items: Vec<CartItem>,
    #[serde(default)]
    pub applied_coupons: Vec<String>,
    #[serde(default)]
    pub totals: CartTotals,
    #[serde(default)]
    pub needs_payment: bool,
}

impl Cart {
    pub fn items_count(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }

    pub fn items_weight(&self) -> Decimal {
        self.items
            .iter()
            .filter_map(|item| item.weight.map(|w| w * Decimal::from(item.quantity)))
            .sum()
    }

    pub fn needs_shipping(&self) -> bool {
        self.items.iter().any(|item| item.needs_shipping)
    }
}

/// Whatever the session holds under the cart slot
#[derive(Debug, Clone)]
pub enum SessionObject {
    Cart(Cart),
    /// Something other than a cart, identified by its kind
    Other(String),
}

pub trait SessionManager: Send + Sync {
    /// Cart instance for the session, if the session can provide one
    fn cart_instance(&self, session: Option<&str>) -> Option<SessionObject>;
}

/// Owns the output shape of the cart resource
pub trait CartSchema: Send + Sync {
    fn item_schema(&self) -> ItemSchema;

    fn item_response(&self, cart: &Cart, settings: &StoreSettings) -> Value;
}

//! # Pricing and Store Settings
//!
//! Currency formatting settings, the tax display mode, and the host's
//! price transformation service.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::product::Product;

/// Whether shop prices are displayed with or without tax
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaxDisplayMode {
    Incl,
    #[default]
    Excl,
}

/// Where the currency symbol sits relative to the amount
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CurrencyPosition {
    #[default]
    Left,
    Right,
    LeftSpace,
    RightSpace,
}

/// Currency formatting metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencySettings {
    #[serde(default = "default_code")]
    pub code: String,

    #[serde(default = "default_symbol")]
    pub symbol: String,

    #[serde(default)]
    pub position: CurrencyPosition,

    #[serde(default = "default_decimal_separator")]
    pub decimal_separator: String,

    #[serde(default = "default_thousand_separator")]
    pub thousand_separator: String,

    #[serde(default = "default_decimals")]
    pub decimals: u32,
}

fn default_code() -> String {
    "USD".to_string()
}
fn default_symbol() -> String {
    "$".to_string()
}
fn default_decimal_separator() -> String {
    ".".to_string()
}
fn default_thousand_separator() -> String {
    ",".to_string()
}
fn default_decimals() -> u32 {
    2
}

impl Default for CurrencySettings {
    fn default() -> Self {
        Self {
            code: default_code(),
            symbol: default_symbol(),
            position: CurrencyPosition::default(),
            decimal_separator: default_decimal_separator(),
            thousand_separator: default_thousand_separator(),
            decimals: default_decimals(),
        }
    }
}

impl CurrencySettings {
    /// Prefix and suffix wrapped around a formatted amount
    pub fn affixes(&self) -> (String, String) {
        match self.position {
            CurrencyPosition::Left => (self.symbol.clone(), String::new()),
            CurrencyPosition::LeftSpace => (format!("{} ", self.symbol), String::new()),
            CurrencyPosition::Right => (String::new(), self.symbol.clone()),
            CurrencyPosition::RightSpace => (String::new(), format!(" {}", self.symbol)),
        }
    }

    /// Format an amount with the configured separators and decimals
    pub fn format_amount(&self, amount: Decimal) -> String {
        let rounded = amount.round_dp(self.decimals);
        let negative = rounded.is_sign_negative() && !rounded.is_zero();
        let text = format!("{:.*}", self.decimals as usize, rounded.abs());

        let (whole, fraction) = match text.split_once('.') {
            Some((w, f)) => (w.to_string(), Some(f.to_string())),
            None => (text, None),
        };

        let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
        for (i, ch) in whole.chars().enumerate() {
            if i > 0 && (whole.len() - i) % 3 == 0 {
                grouped.push_str(&self.thousand_separator);
            }
            grouped.push(ch);
        }

        let mut out = String::new();
        if negative {
            out.push('-');
        }
        out.push_str(&grouped);
        if let Some(fraction) = fraction {
            out.push_str(&self.decimal_separator);
            out.push_str(&fraction);
        }
        out
    }

    /// Amount with currency symbol
    pub fn format_price(&self, amount: Decimal) -> String {
        let (prefix, suffix) = self.affixes();
        format!("{}{}{}", prefix, self.format_amount(amount), suffix)
    }
}

/// Process-wide store configuration, read-only for the REST layer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSettings {
    #[serde(default)]
    pub tax_display_shop: TaxDisplayMode,

    /// Whether catalog prices are entered inclusive of tax
    #[serde(default)]
    pub prices_include_tax: bool,

    #[serde(default)]
    pub currency: CurrencySettings,
}

/// Host price service
///
/// `price` of `None` means "use the product's active price". The result is
/// `None` only when there is no price at all.
pub trait PriceCalculator: Send + Sync {
    fn price_including_tax(&self, product: &Product, price: Option<Decimal>) -> Option<Decimal>;

    fn price_excluding_tax(&self, product: &Product, price: Option<Decimal>) -> Option<Decimal>;

    /// Rendered price markup for the storefront
    fn price_html(&self, product: &Product, settings: &StoreSettings) -> String;

    /// Price as displayed under the given tax mode
    fn display_price(
        &self,
        product: &Product,
        price: Option<Decimal>,
        mode: TaxDisplayMode,
    ) -> Option<Decimal> {
        match mode {
            TaxDisplayMode::Incl => self.price_including_tax(product, price),
            TaxDisplayMode::Excl => self.price_excluding_tax(product, price),
        }
    }
}

//! Store cart schema
//!
//! Default output shape of the cart resource. Amounts are host-computed and
//! only rounded to the store's decimals here.

use rust_decimal::Decimal;
use serde_json::{json, Value};

use crate::platform::{Cart, CartItem, CartSchema, StoreSettings};
use crate::schema::{ItemSchema, SchemaProperty};

#[derive(Debug, Default, Clone, Copy)]
pub struct StoreCartSchema;

fn amount(value: Decimal, settings: &StoreSettings) -> String {
    value.round_dp(settings.currency.decimals).to_string()
}

fn money(description: &'static str) -> SchemaProperty {
    SchemaProperty::string(description).readonly()
}

impl StoreCartSchema {
    fn item(item: &CartItem, settings: &StoreSettings) -> Value {
        json!({
            "key": item.key,
            "id": item.variation_id.unwrap_or(item.product_id),
            "quantity": item.quantity,
            "name": item.name,
            "sku": item.sku,
            "permalink": item.permalink,
            "totals": {
                "line_subtotal": amount(item.line_subtotal, settings),
                "line_subtotal_tax": amount(item.line_subtotal_tax, settings),
                "line_total": amount(item.line_total, settings),
                "line_total_tax": amount(item.line_tax, settings),
            },
        })
    }

    fn totals(cart: &Cart, settings: &StoreSettings) -> Value {
        let currency = &settings.currency;
        let (prefix, suffix) = currency.affixes();
        let totals = &cart.totals;
        json!({
            "currency_code": currency.code,
            "currency_symbol": currency.symbol,
            "currency_minor_unit": currency.decimals,
            "currency_decimal_separator": currency.decimal_separator,
            "currency_thousand_separator": currency.thousand_separator,
            "currency_prefix": prefix,
            "currency_suffix": suffix,
            "total_items": amount(totals.total_items, settings),
            "total_items_tax": amount(totals.total_items_tax, settings),
            "total_fees": amount(totals.total_fees, settings),
            "total_fees_tax": amount(totals.total_fees_tax, settings),
            "total_discount": amount(totals.total_discount, settings),
            "total_discount_tax": amount(totals.total_discount_tax, settings),
            "total_shipping": totals.total_shipping.map(|v| amount(v, settings)),
            "total_shipping_tax": totals.total_shipping_tax.map(|v| amount(v, settings)),
            "total_price": amount(totals.total_price, settings),
            "total_tax": amount(totals.total_tax, settings),
        })
    }
}

impl CartSchema for StoreCartSchema {
    fn item_schema(&self) -> ItemSchema {
        ItemSchema::new(
            "cart",
            [
                (
                    "coupons",
                    SchemaProperty::array(
                        "List of applied cart coupons.",
                        SchemaProperty::string("Coupon code."),
                    )
                    .readonly(),
                ),
                (
                    "items",
                    SchemaProperty::array(
                        "List of cart items.",
                        SchemaProperty::object(
                            "Cart item.",
                            [
                                (
                                    "key",
                                    SchemaProperty::string("Unique identifier for the item within the cart.")
                                        .readonly(),
                                ),
                                (
                                    "id",
                                    SchemaProperty::integer("The cart item product or variation ID.")
                                        .readonly(),
                                ),
                                (
                                    "quantity",
                                    SchemaProperty::integer("Quantity of this item in the cart."),
                                ),
                                ("name", SchemaProperty::string("Product name.").readonly()),
                                (
                                    "sku",
                                    SchemaProperty::string(
                                        "Stock keeping unit, if applicable.",
                                    )
                                    .readonly(),
                                ),
                                (
                                    "permalink",
                                    SchemaProperty::string("Product URL.")
                                        .format("uri")
                                        .readonly(),
                                ),
                                (
                                    "totals",
                                    SchemaProperty::object(
                                        "Item total amounts provided using the smallest unit of the currency.",
                                        [
                                            ("line_subtotal", money("Line subtotal (the price of the product before coupon discounts have been applied).")),
                                            ("line_subtotal_tax", money("Line subtotal tax.")),
                                            ("line_total", money("Line total (the price of the product after coupon discounts have been applied).")),
                                            ("line_total_tax", money("Line total tax.")),
                                        ],
                                    )
                                    .readonly(),
                                ),
                            ],
                        ),
                    )
                    .readonly(),
                ),
                (
                    "items_count",
                    SchemaProperty::integer("Number of items in the cart.").readonly(),
                ),
                (
                    "items_weight",
                    SchemaProperty::string("Total weight of items in the cart.").readonly(),
                ),
                (
                    "needs_payment",
                    SchemaProperty::boolean("True if the cart needs payment. False for carts with only free products and no shipping costs.")
                        .readonly(),
                ),
                (
                    "needs_shipping",
                    SchemaProperty::boolean("True if the cart needs shipping. False for carts with only digital goods or stores with no shipping methods set-up.")
                        .readonly(),
                ),
                (
                    "totals",
                    SchemaProperty::object(
                        "Cart total amounts provided using the smallest unit of the currency.",
                        [
                            ("currency_code", money("Currency code (in ISO format) for returned prices.")),
                            ("currency_symbol", money("Currency symbol for the currency which can be used to format returned prices.")),
                            (
                                "currency_minor_unit",
                                SchemaProperty::integer("Currency minor unit (number of digits after the decimal separator) for returned prices.")
                                    .readonly(),
                            ),
                            ("currency_decimal_separator", money("Decimal separator for the currency which can be used to format returned prices.")),
                            ("currency_thousand_separator", money("Thousand separator for the currency which can be used to format returned prices.")),
                            ("currency_prefix", money("Price prefix for the currency which can be used to format returned prices.")),
                            ("currency_suffix", money("Price suffix for the currency which can be used to format returned prices.")),
                            ("total_items", money("Total price of items in the cart.")),
                            ("total_items_tax", money("Total tax on items in the cart.")),
                            ("total_fees", money("Total price of any applied fees.")),
                            ("total_fees_tax", money("Total tax on fees.")),
                            ("total_discount", money("Total discount from applied coupons.")),
                            ("total_discount_tax", money("Total tax removed due to discount from applied coupons.")),
                            ("total_shipping", money("Total price of shipping. If shipping has not been calculated, a null response will be sent.").nullable()),
                            ("total_shipping_tax", money("Total tax on shipping. If shipping has not been calculated, a null response will be sent.").nullable()),
                            ("total_price", money("Total price the customer will pay.")),
                            ("total_tax", money("Total tax applied to items and shipping.")),
                        ],
                    )
                    .readonly(),
                ),
            ],
        )
    }

    fn item_response(&self, cart: &Cart, settings: &StoreSettings) -> Value {
        json!({
            "coupons": cart.applied_coupons,
            "items": cart
                .items
                .iter()
                .map(|item| Self::item(item, settings))
                .collect::<Vec<_>>(),
            "items_count": cart.items_count(),
            "items_weight": cart.items_weight().normalize().to_string(),
            "needs_payment": cart.needs_payment,
            "needs_shipping": cart.needs_shipping(),
            "totals": Self::totals(cart, settings),
        })
    }
}

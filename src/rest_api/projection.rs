//! # Product Projection
//!
//! Flattens a host product into the response shape published by the
//! product routes, together with the schema describing that shape.
//! Projection only reads from the host; every figure comes from the
//! catalog, pricing and media collaborators.

use rust_decimal::Decimal;
use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::platform::{
    Catalog, ImageSize, MediaLibrary, Platform, PriceCalculator, Product, ProductKind,
    StoreSettings,
};
use crate::schema::{Context, ItemSchema, SchemaProperty};

use super::errors::{RestError, RestResult};

/// Longest generated excerpt, suffix included
pub const DESCRIPTION_LENGTH: usize = 400;

const TRIM_SUFFIX: &str = "...";

/// Collaborators and settings a projection reads from
pub struct ProjectionContext<'a> {
    pub settings: &'a StoreSettings,
    pub catalog: &'a dyn Catalog,
    pub pricing: &'a dyn PriceCalculator,
    pub media: &'a dyn MediaLibrary,
}

impl<'a> ProjectionContext<'a> {
    pub fn new(platform: &'a Platform, settings: &'a StoreSettings) -> Self {
        Self {
            settings,
            catalog: platform.catalog.as_ref(),
            pricing: platform.pricing.as_ref(),
            media: platform.media.as_ref(),
        }
    }

    fn display_price(&self, product: &Product, price: Option<Decimal>) -> Option<Decimal> {
        self.pricing
            .display_price(product, price, self.settings.tax_display_shop)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProductProjection {
    pub id: u64,
    pub name: String,
    pub variation: String,
    pub permalink: String,
    pub sku: String,
    pub description: String,
    pub onsale: bool,
    #[serde(serialize_with = "amount_or_empty")]
    pub price: Option<Decimal>,
    pub price_html: String,
    pub prices: PriceBlock,
    pub images: Vec<ImageRecord>,
    pub average_rating: String,
    pub review_count: u32,
    pub add_to_cart: AddToCart,
}

#[derive(Debug, Clone, Serialize)]
pub struct PriceBlock {
    pub currency_code: String,
    pub decimal_separator: String,
    pub thousand_separator: String,
    pub decimals: u32,
    pub price_prefix: String,
    pub price_suffix: String,
    #[serde(serialize_with = "amount_or_empty")]
    pub price: Option<Decimal>,
    #[serde(serialize_with = "amount_or_empty")]
    pub regular_price: Option<Decimal>,
    #[serde(serialize_with = "amount_or_empty")]
    pub sale_price: Option<Decimal>,
    pub price_range: Option<PriceRange>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PriceRange {
    pub min_amount: Decimal,
    pub max_amount: Decimal,
}

impl PriceRange {
    /// Range over the given amounts, `None` when empty
    fn spanning(amounts: impl IntoIterator<Item = Decimal>) -> Option<Self> {
        amounts.into_iter().fold(None, |range, amount| match range {
            None => Some(PriceRange {
                min_amount: amount,
                max_amount: amount,
            }),
            Some(PriceRange {
                min_amount,
                max_amount,
            }) => Some(PriceRange {
                min_amount: min_amount.min(amount),
                max_amount: max_amount.max(amount),
            }),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageRecord {
    pub id: u64,
    pub src: String,
    pub thumbnail: String,
    pub srcset: String,
    pub sizes: String,
    pub name: String,
    pub alt: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddToCart {
    pub text: String,
    pub description: String,
    pub supports_ajax: bool,
}

fn amount_or_empty<S: Serializer>(value: &Option<Decimal>, serializer: S) -> Result<S::Ok, S::Error> {
    match value {
        Some(amount) => serializer.collect_str(amount),
        None => serializer.serialize_str(""),
    }
}

/// Project a product into its response shape
pub fn project_product(ctx: &ProjectionContext<'_>, product: &Product) -> RestResult<ProductProjection> {
    Ok(ProductProjection {
        id: product.id,
        name: product.name.clone(),
        variation: format_variation(product),
        permalink: product.permalink.clone(),
        sku: product.sku.clone(),
        description: describe(product),
        onsale: product.is_on_sale(),
        price: product.price(),
        price_html: ctx.pricing.price_html(product, ctx.settings),
        prices: price_block(ctx, product)?,
        images: images(ctx.media, product),
        average_rating: product.average_rating.to_string(),
        review_count: product.review_count,
        add_to_cart: AddToCart {
            text: product.add_to_cart_text(),
            description: product.add_to_cart_description(),
            supports_ajax: product.supports_ajax_add_to_cart(),
        },
    })
}

/// Project a product straight to JSON
pub fn product_response(ctx: &ProjectionContext<'_>, product: &Product) -> RestResult<Value> {
    let projection = project_product(ctx, product)?;
    serde_json::to_value(projection).map_err(|e| RestError::Internal(e.to_string()))
}

/// `Name: Value, Name: Value` for variations, empty otherwise
pub fn format_variation(product: &Product) -> String {
    if !product.is_type(ProductKind::Variation) {
        return String::new();
    }
    product
        .variation_attributes
        .iter()
        .map(|attr| format!("{}: {}", attr.name, attr.value))
        .collect::<Vec<_>>()
        .join(", ")
}

fn describe(product: &Product) -> String {
    if product.short_description.is_empty() {
        trim_description(&product.description, DESCRIPTION_LENGTH)
    } else {
        product.short_description.clone()
    }
}

/// Shorten text to at most `max_chars` characters, breaking at whitespace
pub fn trim_description(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }

    let budget = max_chars.saturating_sub(TRIM_SUFFIX.len());
    let cut: String = text.chars().take(budget).collect();

    // Back up to the last whitespace when the cut lands inside a word
    let next_is_space = text.chars().nth(budget).map_or(true, char::is_whitespace);
    let kept = match cut.rfind(char::is_whitespace) {
        Some(at) if !next_is_space => &cut[..at],
        _ => cut.as_str(),
    };

    format!("{}{}", kept.trim_end(), TRIM_SUFFIX)
}

/// Currency metadata plus prices under the store's tax display mode
pub fn price_block(ctx: &ProjectionContext<'_>, product: &Product) -> RestResult<PriceBlock> {
    let currency = &ctx.settings.currency;
    let (price_prefix, price_suffix) = currency.affixes();

    Ok(PriceBlock {
        currency_code: currency.code.clone(),
        decimal_separator: currency.decimal_separator.clone(),
        thousand_separator: currency.thousand_separator.clone(),
        decimals: currency.decimals,
        price_prefix,
        price_suffix,
        price: ctx.display_price(product, None),
        regular_price: ctx.display_price(product, product.regular_price),
        sale_price: ctx.display_price(product, product.sale_price),
        price_range: price_range(ctx, product)?,
    })
}

/// Display price range of a variable or grouped product
pub fn price_range(ctx: &ProjectionContext<'_>, product: &Product) -> RestResult<Option<PriceRange>> {
    match product.kind {
        ProductKind::Variable => {
            let children = ctx.catalog.children(product)?;
            let range = PriceRange::spanning(
                children
                    .iter()
                    .filter(|child| child.is_purchasable())
                    .filter_map(|child| ctx.display_price(child, None)),
            );
            Ok(range.filter(|r| r.min_amount != r.max_amount))
        }
        ProductKind::Grouped => {
            let children = ctx.catalog.children(product)?;
            Ok(PriceRange::spanning(
                children
                    .iter()
                    .filter(|child| child.is_visible_in_group() && child.price().is_some())
                    .filter_map(|child| ctx.display_price(child, None)),
            ))
        }
        _ => Ok(None),
    }
}

/// Primary image first, then the gallery, each id once
pub fn collect_image_ids(product: &Product) -> Vec<u64> {
    let mut ids: Vec<u64> = Vec::with_capacity(product.gallery_image_ids.len() + 1);
    for id in product
        .image_id
        .into_iter()
        .chain(product.gallery_image_ids.iter().copied())
    {
        if id != 0 && !ids.contains(&id) {
            ids.push(id);
        }
    }
    ids
}

/// Image records for every attachment with a resolvable full-size source
pub fn images(media: &dyn MediaLibrary, product: &Product) -> Vec<ImageRecord> {
    collect_image_ids(product)
        .into_iter()
        .filter_map(|id| {
            let src = media.image_src(id, ImageSize::Full)?;
            Some(ImageRecord {
                id,
                thumbnail: media.image_src(id, ImageSize::Thumbnail).unwrap_or_else(|| src.clone()),
                src,
                srcset: media.image_srcset(id),
                sizes: media.image_sizes(id),
                name: media.title(id),
                alt: media.alt_text(id),
            })
        })
        .collect()
}

/// Schema of the product item
pub fn product_schema() -> ItemSchema {
    let amount = |description: &'static str| SchemaProperty::string(description).readonly();
    let image_field = |prop: SchemaProperty| prop.in_contexts(Context::ALL);

    ItemSchema::new(
        "product_block_product",
        [
            (
                "id",
                SchemaProperty::integer("Unique identifier for the resource.")
                    .in_contexts(Context::ALL)
                    .readonly(),
            ),
            (
                "name",
                SchemaProperty::string("Product name.").in_contexts(Context::ALL),
            ),
            (
                "variation",
                SchemaProperty::string("Product variation attributes, if applicable.")
                    .in_contexts(Context::ALL),
            ),
            (
                "permalink",
                SchemaProperty::string("Product URL.")
                    .format("uri")
                    .in_contexts(Context::ALL)
                    .readonly(),
            ),
            (
                "description",
                SchemaProperty::string("Short description or excerpt from description.")
                    .in_contexts(Context::ALL),
            ),
            ("sku", SchemaProperty::string("Unique identifier.")),
            ("price", SchemaProperty::string("Current product price.")),
            (
                "onsale",
                SchemaProperty::boolean("Is the product on sale?").readonly(),
            ),
            (
                "prices",
                SchemaProperty::object(
                    "Price data.",
                    [
                        ("currency_code", amount("Currency code.")),
                        ("decimal_separator", amount("Decimal separator.")),
                        ("thousand_separator", amount("Thousand separator.")),
                        (
                            "decimals",
                            SchemaProperty::integer("Number of decimal places.").readonly(),
                        ),
                        ("price_prefix", amount("Price prefix, e.g. currency.")),
                        ("price_suffix", amount("Price suffix, e.g. currency.")),
                        ("price", amount("Current product price.")),
                        ("regular_price", amount("Regular product price.")),
                        ("sale_price", amount("Sale product price, if applicable.")),
                        (
                            "price_range",
                            SchemaProperty::object(
                                "Price range, if applicable.",
                                [
                                    ("min_amount", amount("Price amount.")),
                                    ("max_amount", amount("Price amount.")),
                                ],
                            )
                            .nullable()
                            .readonly(),
                        ),
                    ],
                )
                .readonly(),
            ),
            (
                "price_html",
                SchemaProperty::string("Price formatted in HTML.").readonly(),
            ),
            (
                "average_rating",
                SchemaProperty::string("Reviews average rating.").readonly(),
            ),
            (
                "review_count",
                SchemaProperty::integer("Amount of reviews that the product has.").readonly(),
            ),
            (
                "images",
                SchemaProperty::array(
                    "List of images.",
                    image_field(SchemaProperty::object(
                        "Image.",
                        [
                            ("id", image_field(SchemaProperty::integer("Image ID."))),
                            (
                                "src",
                                image_field(SchemaProperty::string("Full size image URL.").format("uri")),
                            ),
                            (
                                "thumbnail",
                                image_field(SchemaProperty::string("Thumbnail URL.").format("uri")),
                            ),
                            (
                                "srcset",
                                image_field(SchemaProperty::string(
                                    "Thumbnail srcset for responsive images.",
                                )),
                            ),
                            (
                                "sizes",
                                image_field(SchemaProperty::string(
                                    "Thumbnail sizes for responsive images.",
                                )),
                            ),
                            ("name", image_field(SchemaProperty::string("Image name."))),
                            (
                                "alt",
                                image_field(SchemaProperty::string("Image alternative text.")),
                            ),
                        ],
                    )),
                )
                .in_contexts(Context::ALL),
            ),
            (
                "add_to_cart",
                SchemaProperty::object(
                    "Add to cart button parameters.",
                    [
                        ("text", SchemaProperty::string("Button text.").readonly()),
                        (
                            "description",
                            SchemaProperty::string("Button description.").readonly(),
                        ),
                        (
                            "supports_ajax",
                            SchemaProperty::boolean("Whether or not AJAX is supported.").readonly(),
                        ),
                    ],
                )
                .readonly(),
            ),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::memory::{Attachment, ImageVariant};
    use crate::platform::product::fixtures::simple;
    use crate::platform::product::{PostStatus, VariationAttribute};
    use crate::platform::{
        CurrencyPosition, InMemoryCatalog, InMemoryMedia, InMemoryPricing, TaxDisplayMode,
    };
    use crate::schema::{filter_by_context, SchemaValidator};
    use std::collections::BTreeMap;

    fn dec(value: i64) -> Decimal {
        Decimal::from(value)
    }

    fn parent(id: u64, kind: ProductKind, children: &[u64]) -> Product {
        let mut product = simple(id, None);
        product.kind = kind;
        product.children = children.to_vec();
        product
    }

    fn child(id: u64, parent_id: u64, kind: ProductKind, price: Option<Decimal>) -> Product {
        let mut product = simple(id, price);
        product.kind = kind;
        product.parent_id = Some(parent_id);
        product
    }

    fn attachment(id: u64, url: &str) -> Attachment {
        Attachment {
            id,
            title: format!("Image {}", id),
            alt: String::new(),
            full: ImageVariant {
                url: url.to_string(),
                width: 800,
                height: 600,
            },
            thumbnail: None,
            sources: Vec::new(),
        }
    }

    struct Host {
        catalog: InMemoryCatalog,
        pricing: InMemoryPricing,
        media: InMemoryMedia,
        settings: StoreSettings,
    }

    impl Host {
        fn new(products: Vec<Product>) -> Self {
            let settings = StoreSettings::default();
            Self {
                catalog: InMemoryCatalog::new(products, Vec::new(), Vec::new()),
                pricing: InMemoryPricing::new(BTreeMap::new(), &settings),
                media: InMemoryMedia::new(vec![
                    attachment(7, "https://shop.test/7.jpg"),
                    attachment(8, "https://shop.test/8.jpg"),
                ]),
                settings,
            }
        }

        fn ctx(&self) -> ProjectionContext<'_> {
            ProjectionContext {
                settings: &self.settings,
                catalog: &self.catalog,
                pricing: &self.pricing,
                media: &self.media,
            }
        }
    }

    #[test]
    fn test_variable_with_equal_prices_has_no_range() {
        let variable = parent(1, ProductKind::Variable, &[2, 3, 4]);
        let host = Host::new(vec![
            variable.clone(),
            child(2, 1, ProductKind::Variation, Some(dec(10))),
            child(3, 1, ProductKind::Variation, Some(dec(10))),
            child(4, 1, ProductKind::Variation, Some(dec(10))),
        ]);
        assert_eq!(price_range(&host.ctx(), &variable).unwrap(), None);
    }

    #[test]
    fn test_variable_range_spans_variations() {
        let variable = parent(1, ProductKind::Variable, &[2, 3]);
        let host = Host::new(vec![
            variable.clone(),
            child(2, 1, ProductKind::Variation, Some(dec(15))),
            child(3, 1, ProductKind::Variation, Some(dec(10))),
        ]);
        assert_eq!(
            price_range(&host.ctx(), &variable).unwrap(),
            Some(PriceRange {
                min_amount: dec(10),
                max_amount: dec(15)
            })
        );
    }

    #[test]
    fn test_grouped_range_skips_unpriced_children() {
        let grouped = parent(1, ProductKind::Grouped, &[2, 3, 4]);
        let host = Host::new(vec![
            grouped.clone(),
            child(2, 1, ProductKind::Simple, Some(dec(5))),
            child(3, 1, ProductKind::Simple, None),
            child(4, 1, ProductKind::Simple, Some(dec(8))),
        ]);
        assert_eq!(
            price_range(&host.ctx(), &grouped).unwrap(),
            Some(PriceRange {
                min_amount: dec(5),
                max_amount: dec(8)
            })
        );
    }

    #[test]
    fn test_grouped_without_prices_has_no_range() {
        let grouped = parent(1, ProductKind::Grouped, &[2, 3]);
        let host = Host::new(vec![
            grouped.clone(),
            child(2, 1, ProductKind::Simple, None),
            child(3, 1, ProductKind::Simple, None),
        ]);
        assert_eq!(price_range(&host.ctx(), &grouped).unwrap(), None);
    }

    #[test]
    fn test_grouped_skips_hidden_children() {
        let grouped = parent(1, ProductKind::Grouped, &[2, 3]);
        let mut draft = child(3, 1, ProductKind::Simple, Some(dec(1)));
        draft.status = PostStatus::Draft;
        let host = Host::new(vec![
            grouped.clone(),
            child(2, 1, ProductKind::Simple, Some(dec(5))),
            draft,
        ]);
        let range = price_range(&host.ctx(), &grouped).unwrap().unwrap();
        assert_eq!(range.min_amount, dec(5));
    }

    #[test]
    fn test_image_ids_primary_first_without_duplicates() {
        let mut product = simple(1, None);
        product.image_id = Some(7);
        product.gallery_image_ids = vec![8, 7, 9, 8];
        assert_eq!(collect_image_ids(&product), vec![7, 8, 9]);
    }

    #[test]
    fn test_unresolvable_images_dropped() {
        let host = Host::new(Vec::new());
        let mut product = simple(1, None);
        product.image_id = Some(7);
        product.gallery_image_ids = vec![99, 8];

        let records = images(&host.media, &product);
        let ids: Vec<u64> = records.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![7, 8]);
        assert_eq!(records[0].thumbnail, "https://shop.test/7.jpg");
        assert_eq!(records[0].name, "Image 7");
    }

    #[test]
    fn test_variation_label() {
        let mut variation = child(2, 1, ProductKind::Variation, Some(dec(10)));
        variation.variation_attributes = vec![
            VariationAttribute {
                name: "Color".into(),
                value: "Blue".into(),
            },
            VariationAttribute {
                name: "Size".into(),
                value: "Large".into(),
            },
        ];
        assert_eq!(format_variation(&variation), "Color: Blue, Size: Large");

        variation.kind = ProductKind::Simple;
        assert_eq!(format_variation(&variation), "");
    }

    #[test]
    fn test_trim_description_breaks_on_whitespace() {
        let text = "word ".repeat(100);
        let trimmed = trim_description(&text, 400);
        assert!(trimmed.chars().count() <= 400);
        assert!(trimmed.ends_with("word..."));

        assert_eq!(trim_description("short", 400), "short");
        assert_eq!(trim_description("abcdef ghijklmnop", 12), "abcdef...");
        assert_eq!(trim_description("abcdefghijklmnop", 12), "abcdefghi...");
    }

    #[test]
    fn test_short_description_preferred() {
        let mut product = simple(1, None);
        product.short_description = "Short".into();
        product.description = "Long".into();
        assert_eq!(describe(&product), "Short");

        product.short_description.clear();
        assert_eq!(describe(&product), "Long");
    }

    #[test]
    fn test_price_block_uses_settings() {
        let mut host = Host::new(Vec::new());
        host.settings.currency.position = CurrencyPosition::RightSpace;
        host.settings.currency.symbol = "\u{20ac}".into();
        host.settings.tax_display_shop = TaxDisplayMode::Incl;

        let mut product = simple(1, Some(Decimal::new(2000, 2)));
        product.sale_price = Some(Decimal::new(1500, 2));

        let block = price_block(&host.ctx(), &product).unwrap();
        assert_eq!(block.price_prefix, "");
        assert_eq!(block.price_suffix, " \u{20ac}");
        assert_eq!(block.price, Some(Decimal::new(1500, 2)));
        assert_eq!(block.regular_price, Some(Decimal::new(2000, 2)));
        assert_eq!(block.sale_price, Some(Decimal::new(1500, 2)));
    }

    #[test]
    fn test_missing_price_renders_empty() {
        let host = Host::new(Vec::new());
        let product = simple(1, None);
        let value = product_response(&host.ctx(), &product).unwrap();
        assert_eq!(value["price"], "");
        assert_eq!(value["prices"]["price"], "");
        assert_eq!(value["prices"]["regular_price"], "");
        assert!(value["prices"]["price_range"].is_null());
    }

    #[test]
    fn test_projection_conforms_to_schema() {
        let variable = parent(1, ProductKind::Variable, &[2, 3]);
        let mut with_images = simple(5, Some(dec(12)));
        with_images.image_id = Some(7);
        let host = Host::new(vec![
            variable.clone(),
            child(2, 1, ProductKind::Variation, Some(dec(15))),
            child(3, 1, ProductKind::Variation, Some(dec(10))),
            with_images.clone(),
        ]);
        let schema = product_schema();
        let validator = SchemaValidator::new(&schema);

        for product in [&variable, &with_images] {
            let value = product_response(&host.ctx(), product).unwrap();
            validator.validate(&value).unwrap();
        }
    }

    #[test]
    fn test_embed_context_keeps_public_fields() {
        let mut product = simple(5, Some(dec(12)));
        product.image_id = Some(7);
        let host = Host::new(vec![product.clone()]);

        let value = product_response(&host.ctx(), &product).unwrap();
        let embedded = filter_by_context(value, &product_schema(), Context::Embed);
        let mut keys: Vec<&str> = embedded
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        keys.sort_unstable();
        assert_eq!(
            keys,
            vec!["description", "id", "images", "name", "permalink", "variation"]
        );
        assert_eq!(embedded["images"][0]["src"], "https://shop.test/7.jpg");
    }
}

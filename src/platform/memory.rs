//! # In-Memory Host
//!
//! Fixture-backed implementations of every host collaborator. Used by the
//! stand-alone server and by tests.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fs;
use std::path::Path;
use std::sync::RwLock;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::cart::{Cart, SessionManager, SessionObject};
use super::catalog::{Catalog, QueryPage};
use super::errors::{PlatformError, PlatformResult};
use super::media::{ImageSize, MediaLibrary};
use super::pricing::{PriceCalculator, StoreSettings};
use super::product::{AttachmentId, Product, ProductId, ProductKind, TermId};
use super::query::{
    ObjectsQuery, OrderBy, SortOrder, TaxClause, TaxOperator, TermField, TAXONOMY_CATEGORY,
    TAXONOMY_TAG, TAXONOMY_TYPE, TAXONOMY_VISIBILITY,
};
use super::viewer::{Viewer, ViewerResolver};

// ==================
// Fixture
// ==================

/// A taxonomy term
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Term {
    pub id: TermId,
    pub taxonomy: String,
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub parent: Option<TermId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageVariant {
    pub url: String,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attachment {
    pub id: AttachmentId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub alt: String,
    pub full: ImageVariant,
    #[serde(default)]
    pub thumbnail: Option<ImageVariant>,
    /// Additional responsive sources besides `full`
    #[serde(default)]
    pub sources: Vec<ImageVariant>,
}

/// Seed data for the in-memory host
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Fixture {
    #[serde(default)]
    pub products: Vec<Product>,
    #[serde(default)]
    pub terms: Vec<Term>,
    #[serde(default)]
    pub attribute_taxonomies: Vec<String>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    /// Tax class (empty string for standard) to percentage rate
    #[serde(default)]
    pub tax_rates: BTreeMap<String, Decimal>,
    /// Session key to cart
    #[serde(default)]
    pub carts: BTreeMap<String, Cart>,
}

impl Fixture {
    pub fn load(path: &Path) -> PlatformResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            PlatformError::InvalidFixture(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let fixture: Fixture = serde_json::from_str(&content)
            .map_err(|e| PlatformError::InvalidFixture(format!("Invalid fixture JSON: {}", e)))?;
        fixture.validate()?;
        Ok(fixture)
    }

    fn validate(&self) -> PlatformResult<()> {
        let mut seen = BTreeSet::new();
        for product in &self.products {
            if !seen.insert(product.id) {
                return Err(PlatformError::InvalidFixture(format!(
                    "Duplicate product id {}",
                    product.id
                )));
            }
        }
        for product in &self.products {
            if let Some(missing) = product.children.iter().find(|id| !seen.contains(*id)) {
                return Err(PlatformError::InvalidFixture(format!(
                    "Product {} references unknown child {}",
                    product.id, missing
                )));
            }
        }
        Ok(())
    }
}

// ==================
// Catalog
// ==================

pub struct InMemoryCatalog {
    products: BTreeMap<ProductId, Product>,
    terms: Vec<Term>,
    attribute_taxonomies: Vec<String>,
}

impl InMemoryCatalog {
    pub fn new(products: Vec<Product>, terms: Vec<Term>, attribute_taxonomies: Vec<String>) -> Self {
        let mut products: BTreeMap<ProductId, Product> =
            products.into_iter().map(|p| (p.id, p)).collect();
        Self::price_variable_parents(&mut products);
        Self {
            products,
            terms,
            attribute_taxonomies,
        }
    }

    /// Unpriced variable products take the lowest regular and sale prices
    /// of their purchasable variations, so their active price is the
    /// cheapest variation's.
    fn price_variable_parents(products: &mut BTreeMap<ProductId, Product>) {
        let derived: Vec<(ProductId, Option<Decimal>, Option<Decimal>)> = products
            .values()
            .filter(|p| p.kind == ProductKind::Variable)
            .filter(|p| p.regular_price.is_none() && p.sale_price.is_none())
            .map(|parent| {
                let variations: Vec<&Product> = parent
                    .children
                    .iter()
                    .filter_map(|id| products.get(id))
                    .filter(|child| child.is_purchasable())
                    .collect();
                let regular = variations.iter().filter_map(|v| v.regular_price).min();
                let sale = variations
                    .iter()
                    .filter(|v| v.is_on_sale())
                    .filter_map(|v| v.sale_price)
                    .min();
                (parent.id, regular, sale)
            })
            .collect();

        for (id, regular, sale) in derived {
            if let Some(parent) = products.get_mut(&id) {
                parent.regular_price = regular;
                parent.sale_price = sale;
            }
        }
    }

    fn matches(&self, product: &Product, query: &ObjectsQuery) -> bool {
        if let Some(status) = query.status.as_deref() {
            if status != "any" && product.status.as_str() != status {
                return false;
            }
        }
        if !query.include.is_empty() && !query.include.contains(&product.id) {
            return false;
        }
        if query.exclude.contains(&product.id) {
            return false;
        }
        if !query.parent.is_empty()
            && !product.parent_id.is_some_and(|p| query.parent.contains(&p))
        {
            return false;
        }
        if let Some(slug) = query.slug.as_deref() {
            if product.slug != slug {
                return false;
            }
        }
        if let Some(search) = query.search.as_deref() {
            let needle = search.to_lowercase();
            let haystacks = [&product.name, &product.short_description, &product.description];
            if !haystacks.iter().any(|h| h.to_lowercase().contains(&needle)) {
                return false;
            }
        }
        if let Some(sku) = query.sku.as_deref() {
            if !sku.split(',').map(str::trim).any(|s| s == product.sku) {
                return false;
            }
        }
        if let Some(on_sale) = query.on_sale {
            if product.is_on_sale() != on_sale {
                return false;
            }
        }
        if query.min_price.is_some() || query.max_price.is_some() {
            let Some(price) = product.price() else {
                return false;
            };
            if query.min_price.is_some_and(|min| price < min)
                || query.max_price.is_some_and(|max| price > max)
            {
                return false;
            }
        }
        if let Some(stock) = query.stock_status.as_deref() {
            if product.stock_status.as_str() != stock {
                return false;
            }
        }
        if query.after.is_some() || query.before.is_some() {
            let Some(created) = product.date_created else {
                return false;
            };
            if query.after.is_some_and(|after| created <= after)
                || query.before.is_some_and(|before| created >= before)
            {
                return false;
            }
        }

        query
            .tax_query
            .iter()
            .all(|clause| self.clause_matches(product, clause))
    }

    fn clause_matches(&self, product: &Product, clause: &TaxClause) -> bool {
        let with_children = clause.include_children && clause.operator != TaxOperator::And;
        let wanted = self.resolve_terms(clause, with_children);
        let have = self.product_terms(product, &clause.taxonomy);

        match clause.operator {
            TaxOperator::In => wanted.iter().any(|t| have.contains(t)),
            TaxOperator::NotIn => !wanted.iter().any(|t| have.contains(t)),
            TaxOperator::And => wanted.iter().all(|t| have.contains(t)),
        }
    }

    /// Clause terms as the keys `product_terms` produces. Empty and unknown
    /// terms resolve to nothing.
    fn resolve_terms(&self, clause: &TaxClause, with_children: bool) -> BTreeSet<String> {
        let terms = clause.terms.iter().filter(|t| !t.is_empty());

        if !self.is_term_backed(&clause.taxonomy) {
            return terms.cloned().collect();
        }

        let mut ids = BTreeSet::new();
        for term in terms {
            let found = self.terms.iter().find(|t| {
                t.taxonomy == clause.taxonomy
                    && match clause.field {
                        TermField::TermId => term.parse::<TermId>().ok() == Some(t.id),
                        TermField::Slug => &t.slug == term,
                        TermField::Name => &t.name == term,
                    }
            });
            let id = match (found, clause.field) {
                (Some(t), _) => t.id,
                // Ids that are not registered as terms still match product data
                (None, TermField::TermId) => match term.parse::<TermId>() {
                    Ok(id) => id,
                    Err(_) => continue,
                },
                (None, _) => continue,
            };
            ids.insert(id);
            if with_children {
                ids.extend(self.descendants(&clause.taxonomy, id));
            }
        }
        ids.into_iter().map(|id| id.to_string()).collect()
    }

    fn is_term_backed(&self, taxonomy: &str) -> bool {
        taxonomy != TAXONOMY_TYPE && taxonomy != TAXONOMY_VISIBILITY
    }

    fn product_terms(&self, product: &Product, taxonomy: &str) -> BTreeSet<String> {
        let ids = |ids: &[TermId]| -> BTreeSet<String> {
            ids.iter().map(|id| id.to_string()).collect()
        };
        match taxonomy {
            TAXONOMY_CATEGORY => ids(product.categories.as_slice()),
            TAXONOMY_TAG => ids(product.tags.as_slice()),
            TAXONOMY_TYPE => BTreeSet::from([product.kind.as_str().to_string()]),
            TAXONOMY_VISIBILITY => product.visibility.iter().cloned().collect(),
            other => product
                .attributes
                .get(other)
                .map(|terms| ids(terms.as_slice()))
                .unwrap_or_default(),
        }
    }

    fn descendants(&self, taxonomy: &str, root: TermId) -> Vec<TermId> {
        let mut found = Vec::new();
        let mut frontier = vec![root];
        while let Some(parent) = frontier.pop() {
            for term in &self.terms {
                if term.taxonomy == taxonomy
                    && term.parent == Some(parent)
                    && !found.contains(&term.id)
                {
                    found.push(term.id);
                    frontier.push(term.id);
                }
            }
        }
        found
    }

    fn sort(products: &mut [&Product], query: &ObjectsQuery) {
        products.sort_by(|a, b| {
            let cmp = match query.orderby {
                OrderBy::Date => a.date_created.cmp(&b.date_created),
                OrderBy::Id => a.id.cmp(&b.id),
                OrderBy::Include => {
                    let pos = |id: ProductId| query.include.iter().position(|i| *i == id);
                    return pos(a.id).cmp(&pos(b.id));
                }
                OrderBy::Title => a.name.cmp(&b.name),
                OrderBy::Slug => a.slug.cmp(&b.slug),
                OrderBy::Price => a.price().cmp(&b.price()),
                OrderBy::Popularity => a.total_sales.cmp(&b.total_sales),
                OrderBy::Rating => a.average_rating.cmp(&b.average_rating),
                OrderBy::MenuOrder => a.menu_order.cmp(&b.menu_order),
                OrderBy::CommentCount => a.comment_count.cmp(&b.comment_count),
            }
            .then_with(|| a.id.cmp(&b.id));

            match query.order {
                SortOrder::Asc => cmp,
                SortOrder::Desc => cmp.reverse(),
            }
        });
    }
}

impl Catalog for InMemoryCatalog {
    fn query(&self, query: &ObjectsQuery) -> PlatformResult<QueryPage> {
        let mut matches: Vec<&Product> = self
            .products
            .values()
            .filter(|p| p.kind != ProductKind::Variation)
            .filter(|p| self.matches(p, query))
            .collect();

        Self::sort(&mut matches, query);

        let total = matches.len();
        let page = matches
            .into_iter()
            .skip(query.skip())
            .take(query.per_page)
            .cloned()
            .collect();

        Ok(QueryPage::new(page, total, query.per_page))
    }

    fn product(&self, id: ProductId) -> PlatformResult<Option<Product>> {
        Ok(self.products.get(&id).cloned())
    }

    fn children(&self, product: &Product) -> PlatformResult<Vec<Product>> {
        Ok(product
            .children
            .iter()
            .filter_map(|id| self.products.get(id).cloned())
            .collect())
    }

    fn attribute_taxonomy_names(&self) -> Vec<String> {
        self.attribute_taxonomies.clone()
    }
}

// ==================
// Pricing
// ==================

pub struct InMemoryPricing {
    /// Tax class to percentage rate; the empty class is the standard rate
    rates: BTreeMap<String, Decimal>,
    prices_include_tax: bool,
    decimals: u32,
}

impl InMemoryPricing {
    pub fn new(rates: BTreeMap<String, Decimal>, settings: &StoreSettings) -> Self {
        Self {
            rates,
            prices_include_tax: settings.prices_include_tax,
            decimals: settings.currency.decimals,
        }
    }

    fn rate(&self, product: &Product) -> Decimal {
        self.rates
            .get(&product.tax_class)
            .or_else(|| self.rates.get(""))
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    fn multiplier(&self, product: &Product) -> Decimal {
        Decimal::ONE + self.rate(product) / Decimal::ONE_HUNDRED
    }
}

impl PriceCalculator for InMemoryPricing {
    fn price_including_tax(&self, product: &Product, price: Option<Decimal>) -> Option<Decimal> {
        let base = price.or_else(|| product.price())?;
        let amount = if self.prices_include_tax {
            base
        } else {
            base * self.multiplier(product)
        };
        Some(amount.round_dp(self.decimals))
    }

    fn price_excluding_tax(&self, product: &Product, price: Option<Decimal>) -> Option<Decimal> {
        let base = price.or_else(|| product.price())?;
        let amount = if self.prices_include_tax {
            base / self.multiplier(product)
        } else {
            base
        };
        Some(amount.round_dp(self.decimals))
    }

    fn price_html(&self, product: &Product, settings: &StoreSettings) -> String {
        let mode = settings.tax_display_shop;
        let currency = &settings.currency;
        let amount = |value: Decimal| {
            format!(
                "<span class=\"amount\">{}</span>",
                currency.format_price(value)
            )
        };

        let Some(price) = self.display_price(product, None, mode) else {
            return String::new();
        };

        if product.is_on_sale() {
            if let Some(regular) = self.display_price(product, product.regular_price, mode) {
                return format!("<del>{}</del> <ins>{}</ins>", amount(regular), amount(price));
            }
        }
        amount(price)
    }
}

// ==================
// Media
// ==================

pub struct InMemoryMedia {
    attachments: BTreeMap<AttachmentId, Attachment>,
}

impl InMemoryMedia {
    pub fn new(attachments: Vec<Attachment>) -> Self {
        Self {
            attachments: attachments.into_iter().map(|a| (a.id, a)).collect(),
        }
    }
}

impl MediaLibrary for InMemoryMedia {
    fn image_src(&self, id: AttachmentId, size: ImageSize) -> Option<String> {
        let attachment = self.attachments.get(&id)?;
        let variant = match size {
            ImageSize::Full => &attachment.full,
            ImageSize::Thumbnail => attachment.thumbnail.as_ref().unwrap_or(&attachment.full),
        };
        Some(variant.url.clone())
    }

    fn image_srcset(&self, id: AttachmentId) -> String {
        let Some(attachment) = self.attachments.get(&id) else {
            return String::new();
        };
        let sources: Vec<&ImageVariant> = std::iter::once(&attachment.full)
            .chain(attachment.sources.iter())
            .filter(|v| v.width > 0)
            .collect();
        if sources.len() < 2 {
            return String::new();
        }
        sources
            .iter()
            .map(|v| format!("{} {}w", v.url, v.width))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn image_sizes(&self, id: AttachmentId) -> String {
        match self.attachments.get(&id) {
            Some(a) if a.full.width > 0 => {
                format!("(max-width: {w}px) 100vw, {w}px", w = a.full.width)
            }
            _ => String::new(),
        }
    }

    fn title(&self, id: AttachmentId) -> String {
        self.attachments
            .get(&id)
            .map(|a| a.title.clone())
            .unwrap_or_default()
    }

    fn alt_text(&self, id: AttachmentId) -> String {
        self.attachments
            .get(&id)
            .map(|a| a.alt.clone())
            .unwrap_or_default()
    }
}

// ==================
// Sessions
// ==================

/// Session store; unknown or missing sessions start with an empty cart
pub struct InMemorySessions {
    objects: RwLock<HashMap<String, SessionObject>>,
}

impl InMemorySessions {
    pub fn new(carts: BTreeMap<String, Cart>) -> Self {
        Self {
            objects: RwLock::new(
                carts
                    .into_iter()
                    .map(|(key, cart)| (key, SessionObject::Cart(cart)))
                    .collect(),
            ),
        }
    }

    /// Replace whatever the session holds under the cart slot
    pub fn insert(&self, session: impl Into<String>, object: SessionObject) {
        if let Ok(mut objects) = self.objects.write() {
            objects.insert(session.into(), object);
        }
    }
}

impl SessionManager for InMemorySessions {
    fn cart_instance(&self, session: Option<&str>) -> Option<SessionObject> {
        let objects = self.objects.read().ok()?;
        match session.and_then(|key| objects.get(key)) {
            Some(object) => Some(object.clone()),
            None => Some(SessionObject::Cart(Cart::default())),
        }
    }
}

// ==================
// Viewers
// ==================

/// Static bearer-token to viewer table
#[derive(Default)]
pub struct TokenViewers {
    tokens: HashMap<String, Viewer>,
}

impl TokenViewers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, token: impl Into<String>, viewer: Viewer) -> Self {
        self.tokens.insert(token.into(), viewer);
        self
    }
}

impl ViewerResolver for TokenViewers {
    fn resolve(&self, bearer: Option<&str>) -> Viewer {
        bearer
            .and_then(|token| self.tokens.get(token))
            .cloned()
            .unwrap_or_else(Viewer::anonymous)
    }
}

//! # Host Platform
//!
//! Collaborator contracts for the commerce platform the REST layer sits on:
//! catalog reads, price transforms, media lookups, the cart session and the
//! acting user. Nothing in here is computed by the REST layer itself.

pub mod cart;
pub mod catalog;
pub mod errors;
pub mod media;
pub mod memory;
pub mod pricing;
pub mod product;
pub mod query;
pub mod viewer;

use std::fmt;
use std::sync::Arc;

pub use cart::{Cart, CartItem, CartSchema, CartTotals, SessionManager, SessionObject};
pub use catalog::{Catalog, QueryPage};
pub use errors::{PlatformError, PlatformResult};
pub use media::{ImageSize, MediaLibrary};
pub use memory::{Fixture, InMemoryCatalog, InMemoryMedia, InMemoryPricing, InMemorySessions, TokenViewers};
pub use pricing::{CurrencyPosition, CurrencySettings, PriceCalculator, StoreSettings, TaxDisplayMode};
pub use product::{Product, ProductId, ProductKind};
pub use query::{ObjectsQuery, TaxClause, TaxOperator, TermField};
pub use viewer::{Viewer, ViewerResolver, EDIT_POSTS};

/// Handles to every host collaborator
#[derive(Clone)]
pub struct Platform {
    pub catalog: Arc<dyn Catalog>,
    pub pricing: Arc<dyn PriceCalculator>,
    pub media: Arc<dyn MediaLibrary>,
    pub sessions: Arc<dyn SessionManager>,
    pub viewers: Arc<dyn ViewerResolver>,
    pub settings: Arc<StoreSettings>,
}

impl Platform {
    /// Wire the in-memory host from seed data
    pub fn in_memory(fixture: Fixture, settings: StoreSettings, viewers: TokenViewers) -> Self {
        let pricing = InMemoryPricing::new(fixture.tax_rates, &settings);
        Self {
            catalog: Arc::new(InMemoryCatalog::new(
                fixture.products,
                fixture.terms,
                fixture.attribute_taxonomies,
            )),
            pricing: Arc::new(pricing),
            media: Arc::new(InMemoryMedia::new(fixture.attachments)),
            sessions: Arc::new(InMemorySessions::new(fixture.carts)),
            viewers: Arc::new(viewers),
            settings: Arc::new(settings),
        }
    }

    /// Store settings as of this request
    pub fn settings_snapshot(&self) -> StoreSettings {
        self.settings.as_ref().clone()
    }
}

impl fmt::Debug for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Platform")
            .field("attribute_taxonomies", &self.catalog.attribute_taxonomy_names())
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

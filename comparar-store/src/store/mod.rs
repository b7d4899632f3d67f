//! Catalog Store
//!
//! The single in-process holder of the four catalog collections. The
//! backing store is the source of truth: every mutation triggers a full
//! reload, and consumers only ever see complete snapshots. A failed load
//! keeps the previous snapshot visible rather than flashing empty lists.

mod admin;
pub mod search;

use std::sync::Arc;

use parking_lot::RwLock;
use shared::models::{Establishment, EstablishmentKind, Offer, Price, Product};
use shared::search::{
    CatalogStats, EstablishmentDetail, ProductDetail, ProductMatch, SearchFilters,
};

use crate::backend::Backend;
use crate::config::StoreConfig;
use crate::error::StoreError;

#[derive(Default)]
struct StoreState {
    products: Vec<Product>,
    establishments: Vec<Establishment>,
    prices: Vec<Price>,
    offers: Vec<Offer>,
    search_query: String,
    search_results: Vec<ProductMatch>,
    filters: SearchFilters,
    loading: bool,
    error: Option<String>,
}

/// Authoritative in-process catalog state with an injectable backend
pub struct CatalogStore {
    backend: Arc<dyn Backend>,
    config: StoreConfig,
    state: RwLock<StoreState>,
}

impl CatalogStore {
    /// Create a store over the given backend; call [`load_data`] next
    ///
    /// [`load_data`]: CatalogStore::load_data
    pub fn new(backend: Arc<dyn Backend>, config: StoreConfig) -> Self {
        Self {
            backend,
            config,
            state: RwLock::new(StoreState::default()),
        }
    }

    /// The injected backend, for auth pass-through
    pub fn backend(&self) -> &Arc<dyn Backend> {
        &self.backend
    }

    // ========== Load ==========

    /// Fetch all four collections from the backing store.
    ///
    /// Products and establishments arrive ordered by `nombre` ascending.
    /// The first fetch failure aborts the whole load and records the error
    /// in state; the previous snapshot stays visible. Concurrent calls are
    /// not deduplicated; the later-completing load wins.
    pub async fn load_data(&self) {
        self.state.write().loading = true;

        let products = match self.backend.list_products().await {
            Ok(rows) => rows,
            Err(e) => return self.fail_load("products", e),
        };
        let establishments = match self.backend.list_establishments().await {
            Ok(rows) => rows,
            Err(e) => return self.fail_load("establishments", e),
        };
        let prices = match self.backend.list_prices().await {
            Ok(rows) => rows,
            Err(e) => return self.fail_load("prices", e),
        };
        let offers = match self.backend.list_offers().await {
            Ok(rows) => rows,
            Err(e) => return self.fail_load("offers", e),
        };

        tracing::info!(
            products = products.len(),
            establishments = establishments.len(),
            prices = prices.len(),
            offers = offers.len(),
            "catalog loaded"
        );

        let mut state = self.state.write();
        state.products = products;
        state.establishments = establishments;
        state.prices = prices;
        state.offers = offers;
        state.loading = false;
        state.error = None;
    }

    fn fail_load(&self, collection: &str, error: StoreError) {
        tracing::error!(collection, error = %error, "catalog load failed");
        let mut state = self.state.write();
        state.error = Some(error.to_string());
        state.loading = false;
    }

    // ========== Search ==========

    /// Run the search pipeline against the current snapshot.
    ///
    /// Records the query and its results in state and returns them. An
    /// empty or whitespace-only query yields an empty result set ("no
    /// search performed", distinct from "no matches").
    pub fn search_products(&self, query: &str) -> Vec<ProductMatch> {
        let mut state = self.state.write();
        state.search_query = query.to_string();
        let results = search::search_products(&state.products, &state.prices, &state.filters, query);
        tracing::debug!(query, results = results.len(), "search executed");
        state.search_results = results.clone();
        results
    }

    // ========== Snapshot accessors ==========

    pub fn products(&self) -> Vec<Product> {
        self.state.read().products.clone()
    }

    pub fn establishments(&self) -> Vec<Establishment> {
        self.state.read().establishments.clone()
    }

    pub fn prices(&self) -> Vec<Price> {
        self.state.read().prices.clone()
    }

    pub fn offers(&self) -> Vec<Offer> {
        self.state.read().offers.clone()
    }

    pub fn search_query(&self) -> String {
        self.state.read().search_query.clone()
    }

    /// Results of the last search, as recorded by [`search_products`]
    ///
    /// [`search_products`]: CatalogStore::search_products
    pub fn search_results(&self) -> Vec<ProductMatch> {
        self.state.read().search_results.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state.read().loading
    }

    /// Error recorded by the most recent failed load, cleared on success
    pub fn last_error(&self) -> Option<String> {
        self.state.read().error.clone()
    }

    // ========== Filters ==========

    pub fn filters(&self) -> SearchFilters {
        self.state.read().filters.clone()
    }

    /// Replace the whole filter configuration
    pub fn set_filters(&self, filters: SearchFilters) {
        self.state.write().filters = filters;
    }

    /// Partially update the filter configuration in place
    pub fn update_filters(&self, apply: impl FnOnce(&mut SearchFilters)) {
        apply(&mut self.state.write().filters);
    }

    // ========== Derived views ==========

    /// Product detail: prices joined with their establishment, sorted
    /// ascending, plus min/max/average statistics
    pub fn product_detail(&self, id: i64) -> Option<ProductDetail> {
        let state = self.state.read();
        search::product_detail(&state.products, &state.prices, &state.establishments, id)
    }

    /// Establishment detail: carried products and active offers
    pub fn establishment_detail(&self, id: i64) -> Option<EstablishmentDetail> {
        let state = self.state.read();
        search::establishment_detail(
            &state.establishments,
            &state.products,
            &state.prices,
            &state.offers,
            id,
        )
    }

    /// All offers currently flagged active
    pub fn active_offers(&self) -> Vec<Offer> {
        let state = self.state.read();
        search::active_offers(&state.offers)
    }

    /// Active offers at establishments of the given kind
    pub fn active_offers_by_kind(&self, kind: EstablishmentKind) -> Vec<Offer> {
        let state = self.state.read();
        search::active_offers_by_kind(&state.offers, &state.establishments, kind)
    }

    /// Row counts for the four collections
    pub fn stats(&self) -> CatalogStats {
        let state = self.state.read();
        CatalogStats {
            products: state.products.len(),
            establishments: state.establishments.len(),
            prices: state.prices.len(),
            offers: state.offers.len(),
        }
    }
}

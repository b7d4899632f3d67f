//! Backend client traits
//!
//! The backing store is external: a hosted relational API, an object
//! storage service, and an auth provider. The store consumes them through
//! these traits so tests and demos can inject [`MemoryBackend`] while the
//! real application wires up [`RestBackend`].

pub mod memory;
pub mod rest;

pub use memory::MemoryBackend;
pub use rest::RestBackend;

use async_trait::async_trait;
use shared::models::{
    Establishment, EstablishmentCreate, EstablishmentUpdate, Offer, OfferCreate, OfferUpdate,
    Price, PriceCreate, PriceUpdate, Product, ProductCreate, ProductUpdate,
};

use crate::error::StoreResult;

/// Typed operations over the four hosted tables
///
/// Listings of products and establishments are ordered by `nombre`
/// ascending; prices and offers have no ordering contract. Deletes of
/// absent rows are no-ops, not errors.
#[async_trait]
pub trait DataBackend: Send + Sync {
    // ========== Products ==========
    async fn list_products(&self) -> StoreResult<Vec<Product>>;
    async fn insert_product(&self, data: ProductCreate) -> StoreResult<Product>;
    async fn update_product(&self, id: i64, data: ProductUpdate) -> StoreResult<()>;
    async fn delete_product(&self, id: i64) -> StoreResult<()>;

    // ========== Establishments ==========
    async fn list_establishments(&self) -> StoreResult<Vec<Establishment>>;
    async fn insert_establishment(&self, data: EstablishmentCreate) -> StoreResult<Establishment>;
    async fn update_establishment(&self, id: i64, data: EstablishmentUpdate) -> StoreResult<()>;
    async fn delete_establishment(&self, id: i64) -> StoreResult<()>;

    // ========== Prices ==========
    async fn list_prices(&self) -> StoreResult<Vec<Price>>;
    async fn insert_price(&self, data: PriceCreate) -> StoreResult<Price>;
    async fn update_price(&self, id: i64, data: PriceUpdate) -> StoreResult<()>;
    async fn delete_price(&self, id: i64) -> StoreResult<()>;
    async fn delete_prices_by_product(&self, producto_id: i64) -> StoreResult<()>;
    async fn delete_prices_by_establishment(&self, establecimiento_id: i64) -> StoreResult<()>;

    // ========== Offers ==========
    async fn list_offers(&self) -> StoreResult<Vec<Offer>>;
    async fn insert_offer(&self, data: OfferCreate) -> StoreResult<Offer>;
    async fn update_offer(&self, id: i64, data: OfferUpdate) -> StoreResult<()>;
    async fn delete_offer(&self, id: i64) -> StoreResult<()>;
    async fn delete_offers_by_establishment(&self, establecimiento_id: i64) -> StoreResult<()>;
}

/// Object storage for images
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Upload an object and return its public URL
    async fn upload_image(
        &self,
        bucket: &str,
        object: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> StoreResult<String>;
}

/// Hosted auth provider
///
/// The store itself only consumes the current user id, attached to
/// inserted rows as an ownership tag; it performs no authorization checks.
#[async_trait]
pub trait AuthBackend: Send + Sync {
    async fn current_user(&self) -> StoreResult<Option<String>>;
    async fn sign_in(&self, email: &str, password: &str) -> StoreResult<()>;
    async fn sign_up(&self, email: &str, password: &str, redirect_to: Option<&str>)
    -> StoreResult<()>;
    async fn sign_out(&self) -> StoreResult<()>;
}

/// Full backend: data, storage, and auth
pub trait Backend: DataBackend + StorageBackend + AuthBackend {}

impl<T: DataBackend + StorageBackend + AuthBackend> Backend for T {}

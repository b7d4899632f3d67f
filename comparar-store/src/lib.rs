//! ComparAR Store - catalog client for the hosted ComparAR backend
//!
//! Owns the in-process copies of the four catalog collections, the
//! search/filter/sort pipeline, and the admin CRUD operations with their
//! cascading-delete rules. Persistence, authentication, and image storage
//! are delegated to a hosted backend reached through the [`Backend`]
//! traits; [`backend::RestBackend`] talks to the real service and
//! [`backend::MemoryBackend`] backs tests and demos.

pub mod backend;
pub mod config;
pub mod error;
pub mod images;
pub mod store;

pub use backend::{AuthBackend, Backend, DataBackend, MemoryBackend, RestBackend, StorageBackend};
pub use config::StoreConfig;
pub use error::{StoreError, StoreResult};
pub use images::ImageFile;
pub use store::CatalogStore;

// Re-export shared types for convenience
pub use shared::{
    CatalogStats, Establishment, EstablishmentCreate, EstablishmentDetail, EstablishmentKind,
    EstablishmentUpdate, Offer, OfferCreate, OfferUpdate, Price, PriceCreate, PriceInput,
    PriceStats, PriceUpdate, Product, ProductCreate, ProductDetail, ProductMatch, ProductUpdate,
    SearchFilters, SortBy,
};

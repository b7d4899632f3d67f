//! Shared types for ComparAR
//!
//! Data models for the four catalog tables, search/filter types, derived
//! view types, and the formatting/lookup utilities. Consumed by the store
//! crate and by anything that renders catalog data.

pub mod models;
pub mod search;
pub mod util;

// Re-exports
pub use models::*;
pub use search::{
    CatalogStats, EstablishmentDetail, PriceStats, PriceWithEstablishment, PriceWithProduct,
    ProductDetail, ProductMatch, SearchFilters, SortBy,
};
pub use serde::{Deserialize, Serialize};

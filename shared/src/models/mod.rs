//! Data models
//!
//! Rows of the four hosted tables (`products`, `establishments`, `prices`,
//! `offers`) plus the typed create/update payloads per entity. Field names
//! match the table columns 1:1, so these serialize straight onto the wire.
//! All ids are `i64`, assigned by the backing store.

pub mod establishment;
pub mod offer;
pub mod price;
pub mod product;

// Re-exports
pub use establishment::*;
pub use offer::*;
pub use price::*;
pub use product::*;

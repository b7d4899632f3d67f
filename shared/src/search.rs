//! Search and derived-view types
//!
//! The filter configuration consumed by the search pipeline and the shapes
//! it produces. Result types flatten the underlying entity so they
//! serialize to the same shape the tables use, with the computed fields
//! alongside.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{Establishment, Offer, Price, Product};

/// Sort key for search results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SortBy {
    #[default]
    #[serde(rename = "price_asc")]
    PriceAsc,
    #[serde(rename = "price_desc")]
    PriceDesc,
}

impl SortBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortBy::PriceAsc => "price_asc",
            SortBy::PriceDesc => "price_desc",
        }
    }

    /// Parse a sort key; any unrecognized key falls back to ascending.
    pub fn parse(s: &str) -> Self {
        match s {
            "price_desc" => SortBy::PriceDesc,
            _ => SortBy::PriceAsc,
        }
    }
}

/// Active filter configuration for product search
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchFilters {
    /// Keep only products with exactly this category, when set
    pub category: Option<String>,
    /// Inclusive `[min, max]` bounds applied to each result's minimum price
    pub price_range: (Decimal, Decimal),
    /// Keep only products priced at this establishment, when set
    pub establishment: Option<i64>,
    pub sort_by: SortBy,
}

impl Default for SearchFilters {
    fn default() -> Self {
        Self {
            category: None,
            price_range: (Decimal::ZERO, Decimal::from(10_000)),
            establishment: None,
            sort_by: SortBy::default(),
        }
    }
}

/// One search result: a product with its attached prices and minimum price
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductMatch {
    #[serde(flatten)]
    pub product: Product,
    pub prices: Vec<Price>,
    /// Minimum amount among the attached prices, 0 when there are none
    #[serde(with = "rust_decimal::serde::float")]
    pub min_price: Decimal,
}

/// Aggregate price statistics for one product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceStats {
    #[serde(with = "rust_decimal::serde::float")]
    pub min: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub max: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub average: Decimal,
    /// `max - min`
    #[serde(with = "rust_decimal::serde::float")]
    pub spread: Decimal,
    /// `(max - min) / max * 100`, 0 when max is 0
    #[serde(with = "rust_decimal::serde::float")]
    pub max_savings_pct: Decimal,
}

impl PriceStats {
    pub fn zero() -> Self {
        Self {
            min: Decimal::ZERO,
            max: Decimal::ZERO,
            average: Decimal::ZERO,
            spread: Decimal::ZERO,
            max_savings_pct: Decimal::ZERO,
        }
    }
}

/// A price row joined with its establishment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceWithEstablishment {
    #[serde(flatten)]
    pub price: Price,
    pub establishment: Establishment,
}

/// A price row joined with its product
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceWithProduct {
    #[serde(flatten)]
    pub price: Price,
    pub product: Product,
}

/// Product detail view: joined prices sorted ascending plus statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductDetail {
    #[serde(flatten)]
    pub product: Product,
    /// Sorted by amount ascending; rows whose establishment is gone are dropped
    pub prices: Vec<PriceWithEstablishment>,
    pub stats: PriceStats,
}

/// Establishment detail view: carried products and active offers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EstablishmentDetail {
    #[serde(flatten)]
    pub establishment: Establishment,
    /// Rows whose product is gone are dropped
    pub prices: Vec<PriceWithProduct>,
    /// Active offers only
    pub offers: Vec<Offer>,
}

/// Row counts for the four collections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogStats {
    pub products: usize,
    pub establishments: usize,
    pub prices: usize,
    pub offers: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_by_falls_back_to_ascending() {
        assert_eq!(SortBy::parse("price_desc"), SortBy::PriceDesc);
        assert_eq!(SortBy::parse("price_asc"), SortBy::PriceAsc);
        assert_eq!(SortBy::parse("newest"), SortBy::PriceAsc);
        assert_eq!(SortBy::parse(""), SortBy::PriceAsc);
    }

    #[test]
    fn default_filters() {
        let filters = SearchFilters::default();
        assert_eq!(filters.category, None);
        assert_eq!(filters.establishment, None);
        assert_eq!(filters.price_range.0, Decimal::ZERO);
        assert_eq!(filters.price_range.1, Decimal::from(10_000));
        assert_eq!(filters.sort_by, SortBy::PriceAsc);
    }
}

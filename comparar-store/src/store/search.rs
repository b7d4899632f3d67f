//! Search, filter, and sort pipeline
//!
//! Pure functions over snapshot slices. The pipeline order is fixed:
//! substring match, price attachment, category filter, establishment
//! filter, price-range filter, sort. A product with no prices carries
//! `min_price = 0` and therefore passes any range that includes 0; that
//! behavior is kept as-is (see DESIGN.md).

use rust_decimal::Decimal;
use shared::models::{Establishment, EstablishmentKind, Offer, Price, Product};
use shared::search::{
    EstablishmentDetail, PriceStats, PriceWithEstablishment, PriceWithProduct, ProductDetail,
    ProductMatch, SearchFilters, SortBy,
};

/// Run the full search pipeline for one query
pub fn search_products(
    products: &[Product],
    prices: &[Price],
    filters: &SearchFilters,
    query: &str,
) -> Vec<ProductMatch> {
    let query = query.trim();
    if query.is_empty() {
        return Vec::new();
    }

    let needle = query.to_lowercase();
    let mut results: Vec<ProductMatch> = products
        .iter()
        .filter(|p| {
            p.nombre.to_lowercase().contains(&needle)
                || p.categoria.to_lowercase().contains(&needle)
        })
        .map(|p| attach_prices(p, prices))
        .collect();

    if let Some(category) = &filters.category {
        results.retain(|m| &m.product.categoria == category);
    }

    if let Some(establishment) = filters.establishment {
        results.retain(|m| {
            m.prices
                .iter()
                .any(|p| p.establecimiento_id == establishment)
        });
    }

    let (min, max) = filters.price_range;
    results.retain(|m| m.min_price >= min && m.min_price <= max);

    match filters.sort_by {
        SortBy::PriceAsc => results.sort_by(|a, b| a.min_price.cmp(&b.min_price)),
        SortBy::PriceDesc => results.sort_by(|a, b| b.min_price.cmp(&a.min_price)),
    }

    results
}

/// Attach a product's price rows and compute its minimum price
fn attach_prices(product: &Product, prices: &[Price]) -> ProductMatch {
    let attached: Vec<Price> = prices
        .iter()
        .filter(|p| p.producto_id == product.id)
        .cloned()
        .collect();
    let min_price = attached
        .iter()
        .map(|p| p.precio)
        .min()
        .unwrap_or(Decimal::ZERO);
    ProductMatch {
        product: product.clone(),
        prices: attached,
        min_price,
    }
}

/// Aggregate statistics over a set of amounts; all zeros when empty
pub fn price_stats(amounts: &[Decimal]) -> PriceStats {
    let (Some(min), Some(max)) = (
        amounts.iter().copied().min(),
        amounts.iter().copied().max(),
    ) else {
        return PriceStats::zero();
    };

    let sum: Decimal = amounts.iter().copied().sum();
    let average = sum / Decimal::from(amounts.len());
    let spread = max - min;
    let max_savings_pct = if max.is_zero() {
        Decimal::ZERO
    } else {
        spread / max * Decimal::from(100)
    };

    PriceStats {
        min,
        max,
        average,
        spread,
        max_savings_pct,
    }
}

/// Build the product detail view.
///
/// Price rows are joined with their establishment; rows whose
/// establishment no longer exists are dropped before sorting and before
/// the statistics, so a dangling row never skews the numbers.
pub fn product_detail(
    products: &[Product],
    prices: &[Price],
    establishments: &[Establishment],
    id: i64,
) -> Option<ProductDetail> {
    let product = products.iter().find(|p| p.id == id)?.clone();

    let mut joined: Vec<PriceWithEstablishment> = prices
        .iter()
        .filter(|p| p.producto_id == id)
        .filter_map(|p| {
            establishments
                .iter()
                .find(|e| e.id == p.establecimiento_id)
                .map(|e| PriceWithEstablishment {
                    price: p.clone(),
                    establishment: e.clone(),
                })
        })
        .collect();
    joined.sort_by(|a, b| a.price.precio.cmp(&b.price.precio));

    let amounts: Vec<Decimal> = joined.iter().map(|p| p.price.precio).collect();
    let stats = price_stats(&amounts);

    Some(ProductDetail {
        product,
        prices: joined,
        stats,
    })
}

/// Build the establishment detail view: carried products (rows whose
/// product is gone are dropped) and active offers
pub fn establishment_detail(
    establishments: &[Establishment],
    products: &[Product],
    prices: &[Price],
    offers: &[Offer],
    id: i64,
) -> Option<EstablishmentDetail> {
    let establishment = establishments.iter().find(|e| e.id == id)?.clone();

    let joined: Vec<PriceWithProduct> = prices
        .iter()
        .filter(|p| p.establecimiento_id == id)
        .filter_map(|p| {
            products
                .iter()
                .find(|prod| prod.id == p.producto_id)
                .map(|prod| PriceWithProduct {
                    price: p.clone(),
                    product: prod.clone(),
                })
        })
        .collect();

    let offers = offers
        .iter()
        .filter(|o| o.establecimiento_id == id && o.activa)
        .cloned()
        .collect();

    Some(EstablishmentDetail {
        establishment,
        prices: joined,
        offers,
    })
}

/// Offers currently flagged active
pub fn active_offers(offers: &[Offer]) -> Vec<Offer> {
    offers.iter().filter(|o| o.activa).cloned().collect()
}

/// Active offers at establishments of the given kind
pub fn active_offers_by_kind(
    offers: &[Offer],
    establishments: &[Establishment],
    kind: EstablishmentKind,
) -> Vec<Offer> {
    offers
        .iter()
        .filter(|o| o.activa)
        .filter(|o| {
            establishments
                .iter()
                .find(|e| e.id == o.establecimiento_id)
                .is_some_and(|e| e.tipo == kind)
        })
        .cloned()
        .collect()
}

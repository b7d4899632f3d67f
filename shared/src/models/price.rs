//! Price Model

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Price entity (row in the `prices` table)
///
/// Associates one product with one establishment and an amount at a point
/// in time. Uniqueness per (product, establishment) is conventional, not
/// enforced; duplicate rows are accepted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Price {
    pub id: i64,
    pub producto_id: i64,
    pub establecimiento_id: i64,
    /// Amount in ARS, non-negative
    #[serde(with = "rust_decimal::serde::float")]
    pub precio: Decimal,
    pub fecha_actualizacion: NaiveDate,
    #[serde(default)]
    pub user_id: Option<String>,
}

/// Create price payload (standalone path, for an existing product)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceCreate {
    pub producto_id: i64,
    pub establecimiento_id: i64,
    #[serde(with = "rust_decimal::serde::float")]
    pub precio: Decimal,
    pub fecha_actualizacion: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

/// Price fields captured alongside a new product
///
/// The product id does not exist yet; the store fills it in after the
/// product row has been inserted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceInput {
    pub establecimiento_id: i64,
    #[serde(with = "rust_decimal::serde::float")]
    pub precio: Decimal,
}

/// Update price payload (amount + refreshed date)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceUpdate {
    #[serde(with = "rust_decimal::serde::float")]
    pub precio: Decimal,
    pub fecha_actualizacion: NaiveDate,
}

//! Offer Model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Offer entity (row in the `offers` table)
///
/// A time-bounded percentage discount scoped to one establishment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Offer {
    pub id: i64,
    pub establecimiento_id: i64,
    #[serde(default)]
    pub descripcion: Option<String>,
    /// Discount in percent (0-100)
    pub descuento: i32,
    pub fecha_inicio: NaiveDate,
    pub fecha_fin: NaiveDate,
    pub activa: bool,
    #[serde(default)]
    pub user_id: Option<String>,
}

/// Create offer payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OfferCreate {
    pub establecimiento_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub descripcion: Option<String>,
    pub descuento: i32,
    pub fecha_inicio: NaiveDate,
    pub fecha_fin: NaiveDate,
    pub activa: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

/// Update offer payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OfferUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub descripcion: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub descuento: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fecha_inicio: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fecha_fin: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activa: Option<bool>,
}

//! Formatting and lookup helpers

use rust_decimal::Decimal;

use crate::models::{Establishment, Product};

/// Display name used when a referenced row no longer exists
pub const UNKNOWN_NAME: &str = "Desconocido";

/// Format an amount as an es-AR currency string.
///
/// `$ ` prefix, `.` as the thousands separator, `,` as the decimal
/// separator, always two decimals: `format_price(1234.5) == "$ 1.234,50"`.
pub fn format_price(amount: Decimal) -> String {
    let rounded = amount.round_dp(2);
    let negative = rounded.is_sign_negative();
    let text = rounded.abs().to_string();
    let (whole, frac) = match text.split_once('.') {
        Some((w, f)) => (w.to_string(), format!("{f:0<2}")),
        None => (text, "00".to_string()),
    };

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, c) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }

    if negative {
        format!("-$ {grouped},{frac}")
    } else {
        format!("$ {grouped},{frac}")
    }
}

/// Resolve an establishment id to its display name
pub fn establishment_name(id: i64, establishments: &[Establishment]) -> String {
    establishments
        .iter()
        .find(|e| e.id == id)
        .map(|e| e.nombre.clone())
        .unwrap_or_else(|| UNKNOWN_NAME.to_string())
}

/// Resolve a product id to its display name
pub fn product_name(id: i64, products: &[Product]) -> String {
    products
        .iter()
        .find(|p| p.id == id)
        .map(|p| p.nombre.clone())
        .unwrap_or_else(|| UNKNOWN_NAME.to_string())
}

//! Catalog demo over the in-memory backend.
//!
//! Seeds a few establishments, products, and prices, then walks through a
//! load, a search, a price update, and a cascading delete.
//!
//! ```sh
//! cargo run -p comparar-store --example catalog_demo
//! ```

use std::sync::Arc;

use comparar_store::{
    AuthBackend, CatalogStore, DataBackend, EstablishmentCreate, EstablishmentKind, MemoryBackend,
    PriceCreate, PriceInput, ProductCreate, StoreConfig,
};
use rust_decimal::Decimal;
use shared::util::format_price;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let backend = Arc::new(MemoryBackend::new());
    backend.sign_in("demo@comparar.ar", "demo").await?;

    // Seed two establishments and one product with two prices
    let carrefour = backend
        .insert_establishment(EstablishmentCreate {
            nombre: "Carrefour".to_string(),
            direccion: Some("Av. Corrientes 1234, CABA".to_string()),
            tipo: EstablishmentKind::Supermercado,
            horarios: Some("Lun-Dom 8:00-22:00".to_string()),
            ..Default::default()
        })
        .await?;
    let mayorista = backend
        .insert_establishment(EstablishmentCreate {
            nombre: "Mayorista Central".to_string(),
            direccion: Some("Av. Warnes 4567, CABA".to_string()),
            tipo: EstablishmentKind::Mayorista,
            horarios: Some("Lun-Vie 6:00-18:00".to_string()),
            ..Default::default()
        })
        .await?;
    let aceite = backend
        .insert_product(ProductCreate {
            nombre: "Aceite de Girasol".to_string(),
            descripcion: Some("Botella 1.5L".to_string()),
            categoria: "Aceites".to_string(),
            ..Default::default()
        })
        .await?;
    for (establecimiento_id, precio) in [(carrefour.id, 850), (mayorista.id, 750)] {
        backend
            .insert_price(PriceCreate {
                producto_id: aceite.id,
                establecimiento_id,
                precio: Decimal::from(precio),
                fecha_actualizacion: chrono::Utc::now().date_naive(),
                user_id: None,
            })
            .await?;
    }

    let store = CatalogStore::new(backend.clone(), StoreConfig::default());
    store.load_data().await;
    println!("loaded: {:?}", store.stats());

    for result in store.search_products("aceite") {
        println!(
            "{} — desde {} ({} precios)",
            result.product.nombre,
            format_price(result.min_price),
            result.prices.len()
        );
    }

    if let Some(detail) = store.product_detail(aceite.id) {
        println!(
            "min {} / max {} / promedio {} / ahorro máximo {}%",
            format_price(detail.stats.min),
            format_price(detail.stats.max),
            format_price(detail.stats.average),
            detail.stats.max_savings_pct.round_dp(1)
        );
    }

    // Add another product through the store, then cascade-delete it
    let yerba = store
        .add_product_and_price(
            ProductCreate {
                nombre: "Yerba Mate".to_string(),
                categoria: "Almacén".to_string(),
                ..Default::default()
            },
            PriceInput {
                establecimiento_id: mayorista.id,
                precio: Decimal::from(1200),
            },
            None,
        )
        .await?;
    println!("created product {} (id {})", yerba.nombre, yerba.id);

    store.delete_product(yerba.id).await?;
    println!("after cascade delete: {:?}", store.stats());

    Ok(())
}

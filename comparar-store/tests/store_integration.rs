// comparar-store/tests/store_integration.rs
// Full-store integration tests over the in-memory backend.

use std::sync::Arc;

use chrono::NaiveDate;
use comparar_store::{
    AuthBackend, CatalogStore, DataBackend, EstablishmentCreate, EstablishmentKind, ImageFile,
    MemoryBackend, OfferCreate, PriceCreate, PriceInput, ProductCreate, ProductUpdate, SortBy,
    StoreConfig, StoreError,
};
use rust_decimal::Decimal;

fn png_bytes() -> Vec<u8> {
    let img = image::RgbImage::from_pixel(1, 1, image::Rgb([200, 160, 40]));
    let mut buffer = std::io::Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut buffer, image::ImageFormat::Png)
        .unwrap();
    buffer.into_inner()
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

struct Seed {
    carrefour: i64,
    coto: i64,
    mayorista: i64,
    aceite: i64,
    leche: i64,
    yerba: i64,
}

async fn establishment(backend: &MemoryBackend, nombre: &str, tipo: EstablishmentKind) -> i64 {
    backend
        .insert_establishment(EstablishmentCreate {
            nombre: nombre.to_string(),
            tipo,
            ..Default::default()
        })
        .await
        .unwrap()
        .id
}

async fn product(backend: &MemoryBackend, nombre: &str, categoria: &str) -> i64 {
    backend
        .insert_product(ProductCreate {
            nombre: nombre.to_string(),
            categoria: categoria.to_string(),
            ..Default::default()
        })
        .await
        .unwrap()
        .id
}

async fn price(backend: &MemoryBackend, producto_id: i64, establecimiento_id: i64, precio: i64) {
    backend
        .insert_price(PriceCreate {
            producto_id,
            establecimiento_id,
            precio: Decimal::from(precio),
            fecha_actualizacion: date(2025, 11, 15),
            user_id: None,
        })
        .await
        .unwrap();
}

async fn offer(backend: &MemoryBackend, establecimiento_id: i64, descuento: i32, activa: bool) -> i64 {
    backend
        .insert_offer(OfferCreate {
            establecimiento_id,
            descripcion: Some(format!("{descuento}% de descuento")),
            descuento,
            fecha_inicio: date(2025, 11, 1),
            fecha_fin: date(2025, 11, 30),
            activa,
            user_id: None,
        })
        .await
        .unwrap()
        .id
}

/// Three supermarkets-and-a-wholesaler fixture mirroring the public data set
async fn seed(backend: &MemoryBackend) -> Seed {
    let carrefour = establishment(backend, "Carrefour", EstablishmentKind::Supermercado).await;
    let coto = establishment(backend, "Coto", EstablishmentKind::Supermercado).await;
    let _disco = establishment(backend, "Disco", EstablishmentKind::Supermercado).await;
    let mayorista = establishment(backend, "Mayorista Central", EstablishmentKind::Mayorista).await;

    let aceite = product(backend, "Aceite de Girasol", "Aceites").await;
    let leche = product(backend, "Leche Entera", "Lácteos").await;
    let yerba = product(backend, "Yerba Mate", "Almacén").await;

    price(backend, aceite, carrefour, 850).await;
    price(backend, aceite, mayorista, 750).await;
    price(backend, leche, carrefour, 500).await;
    price(backend, leche, coto, 520).await;
    price(backend, yerba, mayorista, 1200).await;

    offer(backend, mayorista, 20, true).await;
    offer(backend, carrefour, 10, true).await;
    offer(backend, carrefour, 50, false).await;

    Seed {
        carrefour,
        coto,
        mayorista,
        aceite,
        leche,
        yerba,
    }
}

fn store_over(backend: &Arc<MemoryBackend>) -> CatalogStore {
    CatalogStore::new(backend.clone(), StoreConfig::default())
}

#[tokio::test]
async fn load_populates_ordered_snapshot() {
    let backend = Arc::new(MemoryBackend::new());
    seed(&backend).await;
    let store = store_over(&backend);

    assert!(store.products().is_empty());
    store.load_data().await;

    let products = store.products();
    let names: Vec<&str> = products.iter().map(|p| p.nombre.as_str()).collect();
    assert_eq!(names, vec!["Aceite de Girasol", "Leche Entera", "Yerba Mate"]);

    let establishments = store.establishments();
    assert_eq!(establishments[0].nombre, "Carrefour");
    assert_eq!(establishments.last().unwrap().nombre, "Mayorista Central");

    let stats = store.stats();
    assert_eq!(stats.products, 3);
    assert_eq!(stats.establishments, 4);
    assert_eq!(stats.prices, 5);
    assert_eq!(stats.offers, 3);
    assert!(!store.is_loading());
    assert!(store.last_error().is_none());
}

#[tokio::test]
async fn failed_load_keeps_previous_snapshot_and_recovers() {
    let backend = Arc::new(MemoryBackend::new());
    seed(&backend).await;
    let store = store_over(&backend);
    store.load_data().await;

    backend.fail_once("list_prices");
    store.load_data().await;

    // the whole load aborted, the prior snapshot stays visible
    assert!(store.last_error().is_some());
    assert_eq!(store.products().len(), 3);
    assert_eq!(store.prices().len(), 5);

    // a later load recovers and clears the error
    store.load_data().await;
    assert!(store.last_error().is_none());
}

#[tokio::test]
async fn empty_query_is_no_search() {
    let backend = Arc::new(MemoryBackend::new());
    seed(&backend).await;
    let store = store_over(&backend);
    store.load_data().await;

    assert!(store.search_products("").is_empty());
    assert!(store.search_products("   ").is_empty());
    assert!(store.search_results().is_empty());
}

#[tokio::test]
async fn search_attaches_prices_and_min_price() {
    let backend = Arc::new(MemoryBackend::new());
    let seeded = seed(&backend).await;
    let store = store_over(&backend);
    store.load_data().await;

    let results = store.search_products("aceite");
    assert_eq!(results.len(), 1);
    let result = &results[0];
    assert_eq!(result.product.id, seeded.aceite);
    assert_eq!(result.prices.len(), 2);
    assert_eq!(result.min_price, Decimal::from(750));
    assert_eq!(store.search_query(), "aceite");
    assert_eq!(store.search_results().len(), 1);
}

#[tokio::test]
async fn filters_compose_and_sort_orders_results() {
    let backend = Arc::new(MemoryBackend::new());
    let seeded = seed(&backend).await;
    let store = store_over(&backend);
    store.load_data().await;

    // establishment + price range (spec scenario: est 4, [0, 800])
    store.update_filters(|f| {
        f.establishment = Some(seeded.mayorista);
        f.price_range = (Decimal::ZERO, Decimal::from(800));
    });
    let results = store.search_products("aceite");
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].product.id, seeded.aceite);

    // "e" matches every product name; check both sort directions
    store.set_filters(Default::default());
    let ascending = store.search_products("e");
    assert_eq!(ascending.len(), 3);
    for pair in ascending.windows(2) {
        assert!(pair[0].min_price <= pair[1].min_price);
    }

    store.update_filters(|f| f.sort_by = SortBy::PriceDesc);
    let descending = store.search_products("e");
    for pair in descending.windows(2) {
        assert!(pair[0].min_price >= pair[1].min_price);
    }

    // category filter keeps exact matches only
    store.set_filters(Default::default());
    store.update_filters(|f| f.category = Some("Lácteos".to_string()));
    let results = store.search_products("e");
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].product.id, seeded.leche);
}

#[tokio::test]
async fn add_product_uploads_image_and_inserts_price() {
    let backend = Arc::new(MemoryBackend::with_user("user-1"));
    let seeded = seed(&backend).await;
    let store = store_over(&backend);
    store.load_data().await;

    let created = store
        .add_product_and_price(
            ProductCreate {
                nombre: "Arroz Largo Fino".to_string(),
                categoria: "Almacén".to_string(),
                ..Default::default()
            },
            PriceInput {
                establecimiento_id: seeded.coto,
                precio: Decimal::from(980),
            },
            Some(ImageFile::new("arroz.png", png_bytes())),
        )
        .await
        .unwrap();

    let uploads = backend.uploads();
    assert_eq!(uploads.len(), 1);
    assert_eq!(uploads[0].0, "product-images");
    assert_eq!(
        created.imagen_url.as_deref(),
        Some(format!("memory://product-images/{}", uploads[0].1).as_str())
    );
    assert_eq!(created.user_id.as_deref(), Some("user-1"));

    // the store reloaded itself: new product and its price are visible
    assert_eq!(store.stats().products, 4);
    let attached: Vec<_> = store
        .prices()
        .into_iter()
        .filter(|p| p.producto_id == created.id)
        .collect();
    assert_eq!(attached.len(), 1);
    assert_eq!(attached[0].precio, Decimal::from(980));
    assert_eq!(attached[0].user_id.as_deref(), Some("user-1"));
}

#[tokio::test]
async fn add_product_without_image_makes_no_upload_call() {
    let backend = Arc::new(MemoryBackend::new());
    let seeded = seed(&backend).await;
    let store = store_over(&backend);
    store.load_data().await;

    let created = store
        .add_product_and_price(
            ProductCreate {
                nombre: "Azúcar".to_string(),
                categoria: "Endulzantes".to_string(),
                imagen_url: Some("https://example.com/azucar.jpg".to_string()),
                ..Default::default()
            },
            PriceInput {
                establecimiento_id: seeded.carrefour,
                precio: Decimal::from(430),
            },
            None,
        )
        .await
        .unwrap();

    assert!(backend.uploads().is_empty());
    assert_eq!(
        created.imagen_url.as_deref(),
        Some("https://example.com/azucar.jpg")
    );
}

#[tokio::test]
async fn create_validation_rejects_before_any_backend_call() {
    let backend = Arc::new(MemoryBackend::new());
    let seeded = seed(&backend).await;
    let store = store_over(&backend);
    store.load_data().await;

    let result = store
        .add_product_and_price(
            ProductCreate {
                nombre: "  ".to_string(),
                categoria: "Aceites".to_string(),
                ..Default::default()
            },
            PriceInput {
                establecimiento_id: seeded.carrefour,
                precio: Decimal::from(100),
            },
            None,
        )
        .await;
    assert!(matches!(result, Err(StoreError::Validation(_))));

    let result = store
        .add_product_and_price(
            ProductCreate {
                nombre: "Vinagre".to_string(),
                categoria: "Aceites".to_string(),
                ..Default::default()
            },
            PriceInput {
                establecimiento_id: seeded.carrefour,
                precio: Decimal::from(-1),
            },
            None,
        )
        .await;
    assert!(matches!(result, Err(StoreError::Validation(_))));

    assert_eq!(backend.list_products().await.unwrap().len(), 3);
}

#[tokio::test]
async fn upload_failure_aborts_before_any_row_mutation() {
    let backend = Arc::new(MemoryBackend::new());
    let seeded = seed(&backend).await;
    let store = store_over(&backend);
    store.load_data().await;

    backend.fail_once("upload_image");
    let result = store
        .add_product_and_price(
            ProductCreate {
                nombre: "Harina".to_string(),
                categoria: "Almacén".to_string(),
                ..Default::default()
            },
            PriceInput {
                establecimiento_id: seeded.coto,
                precio: Decimal::from(350),
            },
            Some(ImageFile::new("harina.png", png_bytes())),
        )
        .await;

    assert!(matches!(result, Err(StoreError::Storage(_))));
    assert_eq!(backend.list_products().await.unwrap().len(), 3);
    assert_eq!(backend.list_prices().await.unwrap().len(), 5);
}

#[tokio::test]
async fn price_insert_failure_leaves_product_without_rollback() {
    let backend = Arc::new(MemoryBackend::new());
    let seeded = seed(&backend).await;
    let store = store_over(&backend);
    store.load_data().await;

    backend.fail_once("insert_price");
    let result = store
        .add_product_and_price(
            ProductCreate {
                nombre: "Fideos".to_string(),
                categoria: "Pastas".to_string(),
                ..Default::default()
            },
            PriceInput {
                establecimiento_id: seeded.coto,
                precio: Decimal::from(600),
            },
            None,
        )
        .await;

    // the product insert already happened; no compensating delete
    assert!(matches!(result, Err(StoreError::Backend(_))));
    assert_eq!(backend.list_products().await.unwrap().len(), 4);
    assert_eq!(backend.list_prices().await.unwrap().len(), 5);
}

#[tokio::test]
async fn update_product_keeps_or_replaces_image() {
    let backend = Arc::new(MemoryBackend::new());
    let seeded = seed(&backend).await;
    let store = store_over(&backend);
    store.load_data().await;

    // no new file: the payload's URL is written as-is, no upload happens
    store
        .update_product(
            seeded.aceite,
            ProductUpdate {
                descripcion: Some("Botella 1.5L".to_string()),
                ..Default::default()
            },
            None,
        )
        .await
        .unwrap();
    assert!(backend.uploads().is_empty());

    // new file: re-upload and overwrite the URL
    store
        .update_product(
            seeded.aceite,
            ProductUpdate::default(),
            Some(ImageFile::new("aceite.png", png_bytes())),
        )
        .await
        .unwrap();
    assert_eq!(backend.uploads().len(), 1);

    let products = store.products();
    let aceite = products.iter().find(|p| p.id == seeded.aceite).unwrap();
    assert_eq!(aceite.descripcion.as_deref(), Some("Botella 1.5L"));
    assert!(
        aceite
            .imagen_url
            .as_deref()
            .unwrap()
            .starts_with("memory://product-images/")
    );
}

#[tokio::test]
async fn update_price_defaults_and_overrides_date() {
    let backend = Arc::new(MemoryBackend::new());
    let seeded = seed(&backend).await;
    let store = store_over(&backend);
    store.load_data().await;

    let target = store
        .prices()
        .into_iter()
        .find(|p| p.producto_id == seeded.aceite && p.precio == Decimal::from(850))
        .unwrap();

    store
        .update_price(target.id, Decimal::from(820), Some(date(2025, 12, 1)))
        .await
        .unwrap();
    let updated = store
        .prices()
        .into_iter()
        .find(|p| p.id == target.id)
        .unwrap();
    assert_eq!(updated.precio, Decimal::from(820));
    assert_eq!(updated.fecha_actualizacion, date(2025, 12, 1));

    store
        .update_price(target.id, Decimal::from(799), None)
        .await
        .unwrap();
    let updated = store
        .prices()
        .into_iter()
        .find(|p| p.id == target.id)
        .unwrap();
    assert_eq!(updated.fecha_actualizacion, chrono::Utc::now().date_naive());
}

#[tokio::test]
async fn delete_product_cascades_prices_first_without_rollback() {
    let backend = Arc::new(MemoryBackend::new());
    let seeded = seed(&backend).await;
    let store = store_over(&backend);
    store.load_data().await;

    // inject a failure at the parent-row step: the two price rows must
    // already be gone and must stay gone
    backend.fail_once("delete_product");
    let result = store.delete_product(seeded.aceite).await;
    assert!(result.is_err());

    let prices = backend.list_prices().await.unwrap();
    assert!(prices.iter().all(|p| p.producto_id != seeded.aceite));
    assert!(
        backend
            .list_products()
            .await
            .unwrap()
            .iter()
            .any(|p| p.id == seeded.aceite)
    );

    // re-running the delete finishes the job: zero price rows, row removed
    store.delete_product(seeded.aceite).await.unwrap();
    assert!(
        backend
            .list_products()
            .await
            .unwrap()
            .iter()
            .all(|p| p.id != seeded.aceite)
    );
    assert_eq!(store.stats().products, 2);
}

#[tokio::test]
async fn delete_establishment_cascades_in_fixed_order() {
    let backend = Arc::new(MemoryBackend::new());
    let seeded = seed(&backend).await;
    let store = store_over(&backend);
    store.load_data().await;

    store.delete_establishment(seeded.mayorista).await.unwrap();

    assert!(
        store
            .prices()
            .iter()
            .all(|p| p.establecimiento_id != seeded.mayorista)
    );
    assert!(
        store
            .offers()
            .iter()
            .all(|o| o.establecimiento_id != seeded.mayorista)
    );
    assert!(
        store
            .establishments()
            .iter()
            .all(|e| e.id != seeded.mayorista)
    );

    // idempotence: a second delete removes zero rows and still succeeds
    store.delete_establishment(seeded.mayorista).await.unwrap();
}

#[tokio::test]
async fn establishment_cascade_halts_midway_and_is_retryable() {
    let backend = Arc::new(MemoryBackend::new());
    let seeded = seed(&backend).await;
    let store = store_over(&backend);
    store.load_data().await;

    backend.fail_once("delete_offers_by_establishment");
    let result = store.delete_establishment(seeded.carrefour).await;
    assert!(result.is_err());

    // prices were deleted before the failing step; offers and the row remain
    let prices = backend.list_prices().await.unwrap();
    assert!(prices.iter().all(|p| p.establecimiento_id != seeded.carrefour));
    let offers = backend.list_offers().await.unwrap();
    assert!(offers.iter().any(|o| o.establecimiento_id == seeded.carrefour));

    store.delete_establishment(seeded.carrefour).await.unwrap();
    let offers = backend.list_offers().await.unwrap();
    assert!(offers.iter().all(|o| o.establecimiento_id != seeded.carrefour));
}

#[tokio::test]
async fn delete_price_removes_single_row() {
    let backend = Arc::new(MemoryBackend::new());
    let seeded = seed(&backend).await;
    let store = store_over(&backend);
    store.load_data().await;

    let target = store
        .prices()
        .into_iter()
        .find(|p| p.producto_id == seeded.yerba)
        .unwrap();
    store.delete_price(target.id).await.unwrap();

    assert_eq!(store.stats().prices, 4);
    let results = store.search_products("yerba");
    assert_eq!(results[0].min_price, Decimal::ZERO);
}

#[tokio::test]
async fn offer_crud_round_trip() {
    let backend = Arc::new(MemoryBackend::new());
    let seeded = seed(&backend).await;
    let store = store_over(&backend);
    store.load_data().await;

    let created = store
        .add_offer(OfferCreate {
            establecimiento_id: seeded.coto,
            descripcion: Some("2x1 en lácteos".to_string()),
            descuento: 50,
            fecha_inicio: date(2025, 12, 1),
            fecha_fin: date(2025, 12, 15),
            activa: true,
            user_id: None,
        })
        .await
        .unwrap();
    assert_eq!(store.stats().offers, 4);

    let rejected = store
        .add_offer(OfferCreate {
            establecimiento_id: seeded.coto,
            descripcion: None,
            descuento: 120,
            fecha_inicio: date(2025, 12, 1),
            fecha_fin: date(2025, 12, 15),
            activa: true,
            user_id: None,
        })
        .await;
    assert!(matches!(rejected, Err(StoreError::Validation(_))));

    store
        .update_offer(
            created.id,
            comparar_store::OfferUpdate {
                activa: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(
        store
            .offers()
            .iter()
            .find(|o| o.id == created.id)
            .is_some_and(|o| !o.activa)
    );

    store.delete_offer(created.id).await.unwrap();
    assert_eq!(store.stats().offers, 3);
}

#[tokio::test]
async fn derived_views_join_and_filter() {
    let backend = Arc::new(MemoryBackend::new());
    let seeded = seed(&backend).await;
    let store = store_over(&backend);
    store.load_data().await;

    let detail = store.product_detail(seeded.aceite).unwrap();
    let amounts: Vec<Decimal> = detail.prices.iter().map(|p| p.price.precio).collect();
    assert_eq!(amounts, vec![Decimal::from(750), Decimal::from(850)]);
    assert_eq!(detail.stats.average, Decimal::from(800));
    assert_eq!(detail.stats.max_savings_pct.round_dp(1), Decimal::new(118, 1));

    let detail = store.establishment_detail(seeded.carrefour).unwrap();
    assert_eq!(detail.prices.len(), 2);
    // only the active offer at Carrefour shows up
    assert_eq!(detail.offers.len(), 1);
    assert_eq!(detail.offers[0].descuento, 10);

    assert_eq!(store.active_offers().len(), 2);
    let wholesale = store.active_offers_by_kind(EstablishmentKind::Mayorista);
    assert_eq!(wholesale.len(), 1);
    assert_eq!(wholesale[0].establecimiento_id, seeded.mayorista);
}

#[tokio::test]
async fn sign_in_tags_subsequent_inserts() {
    let backend = Arc::new(MemoryBackend::new());
    let seeded = seed(&backend).await;
    let store = store_over(&backend);
    store.load_data().await;

    store
        .backend()
        .sign_in("ana@example.com", "secret")
        .await
        .unwrap();
    let created = store
        .add_establishment(
            EstablishmentCreate {
                nombre: "Vea".to_string(),
                tipo: EstablishmentKind::Supermercado,
                ..Default::default()
            },
            None,
        )
        .await
        .unwrap();
    assert_eq!(created.user_id.as_deref(), Some("ana@example.com"));

    store.backend().sign_out().await.unwrap();
    let price = store
        .add_price(
            seeded.yerba,
            PriceInput {
                establecimiento_id: created.id,
                precio: Decimal::from(1150),
            },
        )
        .await
        .unwrap();
    assert!(price.user_id.is_none());
}

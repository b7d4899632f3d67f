//! Admin data manager
//!
//! Create/update/delete operations for the four entity types, with image
//! upload side effects and cascading deletes. Dependents are always
//! deleted strictly before their parent, prices before offers when both
//! cascade. Each step is a separate backend call with no transaction
//! across steps: a mid-cascade failure halts the sequence, surfaces that
//! step's error, and leaves prior deletions in place. Re-running the
//! operation is the recovery path, since deleting absent rows is a no-op.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use shared::models::{
    Establishment, EstablishmentCreate, EstablishmentUpdate, Offer, OfferCreate, OfferUpdate,
    Price, PriceCreate, PriceInput, PriceUpdate, Product, ProductCreate, ProductUpdate,
};

use super::CatalogStore;
use crate::error::{StoreError, StoreResult};
use crate::images::{self, ImageFile};

fn require(field: &str, value: &str) -> StoreResult<()> {
    if value.trim().is_empty() {
        return Err(StoreError::Validation(format!("{field} is required")));
    }
    Ok(())
}

fn require_non_negative(precio: Decimal) -> StoreResult<()> {
    if precio < Decimal::ZERO {
        return Err(StoreError::Validation(
            "precio must be non-negative".to_string(),
        ));
    }
    Ok(())
}

fn require_percentage(descuento: i32) -> StoreResult<()> {
    if !(0..=100).contains(&descuento) {
        return Err(StoreError::Validation(
            "descuento must be between 0 and 100".to_string(),
        ));
    }
    Ok(())
}

impl CatalogStore {
    /// Validate and upload an image, returning its public URL
    async fn upload(&self, file: ImageFile, bucket: &str) -> StoreResult<String> {
        images::validate_image(&file)?;
        let object = images::object_name(&file.filename);
        let content_type = file.content_type();
        tracing::debug!(bucket, object = %object, size = file.bytes.len(), "uploading image");
        self.backend
            .upload_image(bucket, &object, file.bytes, &content_type)
            .await
    }

    /// Ownership tag for inserted rows; auth failures read as signed-out
    async fn owner_tag(&self) -> Option<String> {
        self.backend.current_user().await.ok().flatten()
    }

    fn update_date(date: Option<NaiveDate>) -> NaiveDate {
        date.unwrap_or_else(|| Utc::now().date_naive())
    }

    // ========== Products ==========

    /// Create a product together with its initial price.
    ///
    /// The image (when given) is uploaded first and its URL replaces the
    /// payload's `imagen_url`; without a file, no upload call is made and
    /// the payload's URL is inserted as supplied. The price row references
    /// the freshly inserted product id. The first failing step aborts the
    /// rest.
    pub async fn add_product_and_price(
        &self,
        mut product: ProductCreate,
        price: PriceInput,
        image: Option<ImageFile>,
    ) -> StoreResult<Product> {
        require("nombre", &product.nombre)?;
        require("categoria", &product.categoria)?;
        require_non_negative(price.precio)?;

        let user = self.owner_tag().await;
        if let Some(file) = image {
            product.imagen_url = Some(self.upload(file, &self.config.product_bucket).await?);
        }
        product.user_id = user.clone();

        let created = self.backend.insert_product(product).await?;
        tracing::info!(id = created.id, nombre = %created.nombre, "product created");

        self.backend
            .insert_price(PriceCreate {
                producto_id: created.id,
                establecimiento_id: price.establecimiento_id,
                precio: price.precio,
                fecha_actualizacion: Self::update_date(None),
                user_id: user,
            })
            .await?;

        self.load_data().await;
        Ok(created)
    }

    /// Update a product, re-uploading its image only when a new file is given
    pub async fn update_product(
        &self,
        id: i64,
        mut data: ProductUpdate,
        image: Option<ImageFile>,
    ) -> StoreResult<()> {
        if let Some(file) = image {
            data.imagen_url = Some(self.upload(file, &self.config.product_bucket).await?);
        }
        self.backend.update_product(id, data).await?;
        tracing::info!(id, "product updated");
        self.load_data().await;
        Ok(())
    }

    /// Delete a product and every price referencing it.
    ///
    /// Prices go first; if that step fails the product row is untouched.
    /// If the product deletion fails afterwards, the prices stay deleted.
    pub async fn delete_product(&self, id: i64) -> StoreResult<()> {
        self.backend.delete_prices_by_product(id).await?;
        self.backend.delete_product(id).await?;
        tracing::info!(id, "product deleted with its prices");
        self.load_data().await;
        Ok(())
    }

    // ========== Establishments ==========

    /// Create an establishment, uploading its logo to the logo bucket
    pub async fn add_establishment(
        &self,
        mut data: EstablishmentCreate,
        image: Option<ImageFile>,
    ) -> StoreResult<Establishment> {
        require("nombre", &data.nombre)?;

        let user = self.owner_tag().await;
        if let Some(file) = image {
            data.imagen_url = Some(self.upload(file, &self.config.establishment_bucket).await?);
        }
        data.user_id = user;

        let created = self.backend.insert_establishment(data).await?;
        tracing::info!(id = created.id, nombre = %created.nombre, "establishment created");
        self.load_data().await;
        Ok(created)
    }

    /// Update an establishment, same image pattern as products
    pub async fn update_establishment(
        &self,
        id: i64,
        mut data: EstablishmentUpdate,
        image: Option<ImageFile>,
    ) -> StoreResult<()> {
        if let Some(file) = image {
            data.imagen_url = Some(self.upload(file, &self.config.establishment_bucket).await?);
        }
        self.backend.update_establishment(id, data).await?;
        tracing::info!(id, "establishment updated");
        self.load_data().await;
        Ok(())
    }

    /// Delete an establishment and everything referencing it, in fixed
    /// order: prices, then offers, then the establishment row.
    pub async fn delete_establishment(&self, id: i64) -> StoreResult<()> {
        self.backend.delete_prices_by_establishment(id).await?;
        self.backend.delete_offers_by_establishment(id).await?;
        self.backend.delete_establishment(id).await?;
        tracing::info!(id, "establishment deleted with its prices and offers");
        self.load_data().await;
        Ok(())
    }

    // ========== Prices ==========

    /// Add a price for an existing product
    pub async fn add_price(&self, producto_id: i64, price: PriceInput) -> StoreResult<Price> {
        require_non_negative(price.precio)?;

        let user = self.owner_tag().await;
        let created = self
            .backend
            .insert_price(PriceCreate {
                producto_id,
                establecimiento_id: price.establecimiento_id,
                precio: price.precio,
                fecha_actualizacion: Self::update_date(None),
                user_id: user,
            })
            .await?;
        tracing::info!(id = created.id, producto_id, "price created");
        self.load_data().await;
        Ok(created)
    }

    /// Update a price amount; the date defaults to today unless overridden
    pub async fn update_price(
        &self,
        id: i64,
        precio: Decimal,
        fecha: Option<NaiveDate>,
    ) -> StoreResult<()> {
        require_non_negative(precio)?;
        self.backend
            .update_price(
                id,
                PriceUpdate {
                    precio,
                    fecha_actualizacion: Self::update_date(fecha),
                },
            )
            .await?;
        tracing::info!(id, %precio, "price updated");
        self.load_data().await;
        Ok(())
    }

    /// Delete a single price row
    pub async fn delete_price(&self, id: i64) -> StoreResult<()> {
        self.backend.delete_price(id).await?;
        tracing::info!(id, "price deleted");
        self.load_data().await;
        Ok(())
    }

    // ========== Offers ==========

    /// Create an offer
    pub async fn add_offer(&self, mut data: OfferCreate) -> StoreResult<Offer> {
        require_percentage(data.descuento)?;

        data.user_id = self.owner_tag().await;
        let created = self.backend.insert_offer(data).await?;
        tracing::info!(id = created.id, "offer created");
        self.load_data().await;
        Ok(created)
    }

    /// Update an offer
    pub async fn update_offer(&self, id: i64, data: OfferUpdate) -> StoreResult<()> {
        if let Some(descuento) = data.descuento {
            require_percentage(descuento)?;
        }
        self.backend.update_offer(id, data).await?;
        tracing::info!(id, "offer updated");
        self.load_data().await;
        Ok(())
    }

    /// Delete a single offer
    pub async fn delete_offer(&self, id: i64) -> StoreResult<()> {
        self.backend.delete_offer(id).await?;
        tracing::info!(id, "offer deleted");
        self.load_data().await;
        Ok(())
    }
}

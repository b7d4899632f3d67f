//! In-memory backend
//!
//! A complete in-process stand-in for the hosted service, used by the
//! integration tests and the demo example. Ids are assigned from a single
//! counter; listings are ordered the way the hosted API orders them;
//! deletes of absent rows delete zero rows and succeed, matching the
//! hosted behavior the cascade recovery path relies on.

use std::collections::HashSet;

use async_trait::async_trait;
use parking_lot::Mutex;
use shared::models::{
    Establishment, EstablishmentCreate, EstablishmentUpdate, Offer, OfferCreate, OfferUpdate,
    Price, PriceCreate, PriceUpdate, Product, ProductCreate, ProductUpdate,
};

use super::{AuthBackend, DataBackend, StorageBackend};
use crate::error::{StoreError, StoreResult};

#[derive(Default)]
struct Inner {
    products: Vec<Product>,
    establishments: Vec<Establishment>,
    prices: Vec<Price>,
    offers: Vec<Offer>,
    next_id: i64,
    user: Option<String>,
    uploads: Vec<(String, String)>,
    fail_once: HashSet<String>,
}

impl Inner {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// In-memory implementation of the backend traits
#[derive(Default)]
pub struct MemoryBackend {
    inner: Mutex<Inner>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Preset the signed-in user
    pub fn with_user(user: impl Into<String>) -> Self {
        let backend = Self::new();
        backend.inner.lock().user = Some(user.into());
        backend
    }

    /// Arrange for the named operation to fail once with a backend error
    pub fn fail_once(&self, operation: &str) {
        self.inner.lock().fail_once.insert(operation.to_string());
    }

    /// Uploaded objects as `(bucket, object)` pairs, in upload order
    pub fn uploads(&self) -> Vec<(String, String)> {
        self.inner.lock().uploads.clone()
    }

    fn take_failure(&self, operation: &str) -> StoreResult<()> {
        if self.inner.lock().fail_once.remove(operation) {
            return Err(StoreError::Backend(format!(
                "injected failure: {operation}"
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl DataBackend for MemoryBackend {
    // ========== Products ==========

    async fn list_products(&self) -> StoreResult<Vec<Product>> {
        self.take_failure("list_products")?;
        let mut products = self.inner.lock().products.clone();
        products.sort_by(|a, b| a.nombre.cmp(&b.nombre));
        Ok(products)
    }

    async fn insert_product(&self, data: ProductCreate) -> StoreResult<Product> {
        self.take_failure("insert_product")?;
        let mut inner = self.inner.lock();
        let product = Product {
            id: inner.next_id(),
            nombre: data.nombre,
            descripcion: data.descripcion,
            categoria: data.categoria,
            imagen_url: data.imagen_url,
            codigo_barras: data.codigo_barras,
            user_id: data.user_id,
        };
        inner.products.push(product.clone());
        Ok(product)
    }

    async fn update_product(&self, id: i64, data: ProductUpdate) -> StoreResult<()> {
        self.take_failure("update_product")?;
        let mut inner = self.inner.lock();
        if let Some(product) = inner.products.iter_mut().find(|p| p.id == id) {
            if let Some(nombre) = data.nombre {
                product.nombre = nombre;
            }
            if let Some(descripcion) = data.descripcion {
                product.descripcion = Some(descripcion);
            }
            if let Some(categoria) = data.categoria {
                product.categoria = categoria;
            }
            if let Some(imagen_url) = data.imagen_url {
                product.imagen_url = Some(imagen_url);
            }
            if let Some(codigo_barras) = data.codigo_barras {
                product.codigo_barras = Some(codigo_barras);
            }
        }
        Ok(())
    }

    async fn delete_product(&self, id: i64) -> StoreResult<()> {
        self.take_failure("delete_product")?;
        self.inner.lock().products.retain(|p| p.id != id);
        Ok(())
    }

    // ========== Establishments ==========

    async fn list_establishments(&self) -> StoreResult<Vec<Establishment>> {
        self.take_failure("list_establishments")?;
        let mut establishments = self.inner.lock().establishments.clone();
        establishments.sort_by(|a, b| a.nombre.cmp(&b.nombre));
        Ok(establishments)
    }

    async fn insert_establishment(&self, data: EstablishmentCreate) -> StoreResult<Establishment> {
        self.take_failure("insert_establishment")?;
        let mut inner = self.inner.lock();
        let establishment = Establishment {
            id: inner.next_id(),
            nombre: data.nombre,
            direccion: data.direccion,
            telefono: data.telefono,
            tipo: data.tipo,
            horarios: data.horarios,
            imagen_url: data.imagen_url,
            user_id: data.user_id,
        };
        inner.establishments.push(establishment.clone());
        Ok(establishment)
    }

    async fn update_establishment(&self, id: i64, data: EstablishmentUpdate) -> StoreResult<()> {
        self.take_failure("update_establishment")?;
        let mut inner = self.inner.lock();
        if let Some(establishment) = inner.establishments.iter_mut().find(|e| e.id == id) {
            if let Some(nombre) = data.nombre {
                establishment.nombre = nombre;
            }
            if let Some(direccion) = data.direccion {
                establishment.direccion = Some(direccion);
            }
            if let Some(telefono) = data.telefono {
                establishment.telefono = Some(telefono);
            }
            if let Some(tipo) = data.tipo {
                establishment.tipo = tipo;
            }
            if let Some(horarios) = data.horarios {
                establishment.horarios = Some(horarios);
            }
            if let Some(imagen_url) = data.imagen_url {
                establishment.imagen_url = Some(imagen_url);
            }
        }
        Ok(())
    }

    async fn delete_establishment(&self, id: i64) -> StoreResult<()> {
        self.take_failure("delete_establishment")?;
        self.inner.lock().establishments.retain(|e| e.id != id);
        Ok(())
    }

    // ========== Prices ==========

    async fn list_prices(&self) -> StoreResult<Vec<Price>> {
        self.take_failure("list_prices")?;
        Ok(self.inner.lock().prices.clone())
    }

    async fn insert_price(&self, data: PriceCreate) -> StoreResult<Price> {
        self.take_failure("insert_price")?;
        let mut inner = self.inner.lock();
        let price = Price {
            id: inner.next_id(),
            producto_id: data.producto_id,
            establecimiento_id: data.establecimiento_id,
            precio: data.precio,
            fecha_actualizacion: data.fecha_actualizacion,
            user_id: data.user_id,
        };
        inner.prices.push(price.clone());
        Ok(price)
    }

    async fn update_price(&self, id: i64, data: PriceUpdate) -> StoreResult<()> {
        self.take_failure("update_price")?;
        let mut inner = self.inner.lock();
        if let Some(price) = inner.prices.iter_mut().find(|p| p.id == id) {
            price.precio = data.precio;
            price.fecha_actualizacion = data.fecha_actualizacion;
        }
        Ok(())
    }

    async fn delete_price(&self, id: i64) -> StoreResult<()> {
        self.take_failure("delete_price")?;
        self.inner.lock().prices.retain(|p| p.id != id);
        Ok(())
    }

    async fn delete_prices_by_product(&self, producto_id: i64) -> StoreResult<()> {
        self.take_failure("delete_prices_by_product")?;
        self.inner
            .lock()
            .prices
            .retain(|p| p.producto_id != producto_id);
        Ok(())
    }

    async fn delete_prices_by_establishment(&self, establecimiento_id: i64) -> StoreResult<()> {
        self.take_failure("delete_prices_by_establishment")?;
        self.inner
            .lock()
            .prices
            .retain(|p| p.establecimiento_id != establecimiento_id);
        Ok(())
    }

    // ========== Offers ==========

    async fn list_offers(&self) -> StoreResult<Vec<Offer>> {
        self.take_failure("list_offers")?;
        Ok(self.inner.lock().offers.clone())
    }

    async fn insert_offer(&self, data: OfferCreate) -> StoreResult<Offer> {
        self.take_failure("insert_offer")?;
        let mut inner = self.inner.lock();
        let offer = Offer {
            id: inner.next_id(),
            establecimiento_id: data.establecimiento_id,
            descripcion: data.descripcion,
            descuento: data.descuento,
            fecha_inicio: data.fecha_inicio,
            fecha_fin: data.fecha_fin,
            activa: data.activa,
            user_id: data.user_id,
        };
        inner.offers.push(offer.clone());
        Ok(offer)
    }

    async fn update_offer(&self, id: i64, data: OfferUpdate) -> StoreResult<()> {
        self.take_failure("update_offer")?;
        let mut inner = self.inner.lock();
        if let Some(offer) = inner.offers.iter_mut().find(|o| o.id == id) {
            if let Some(descripcion) = data.descripcion {
                offer.descripcion = Some(descripcion);
            }
            if let Some(descuento) = data.descuento {
                offer.descuento = descuento;
            }
            if let Some(fecha_inicio) = data.fecha_inicio {
                offer.fecha_inicio = fecha_inicio;
            }
            if let Some(fecha_fin) = data.fecha_fin {
                offer.fecha_fin = fecha_fin;
            }
            if let Some(activa) = data.activa {
                offer.activa = activa;
            }
        }
        Ok(())
    }

    async fn delete_offer(&self, id: i64) -> StoreResult<()> {
        self.take_failure("delete_offer")?;
        self.inner.lock().offers.retain(|o| o.id != id);
        Ok(())
    }

    async fn delete_offers_by_establishment(&self, establecimiento_id: i64) -> StoreResult<()> {
        self.take_failure("delete_offers_by_establishment")?;
        self.inner
            .lock()
            .offers
            .retain(|o| o.establecimiento_id != establecimiento_id);
        Ok(())
    }
}

#[async_trait]
impl StorageBackend for MemoryBackend {
    async fn upload_image(
        &self,
        bucket: &str,
        object: &str,
        _bytes: Vec<u8>,
        _content_type: &str,
    ) -> StoreResult<String> {
        self.take_failure("upload_image")
            .map_err(|e| StoreError::Storage(e.to_string()))?;
        let mut inner = self.inner.lock();
        inner.uploads.push((bucket.to_string(), object.to_string()));
        Ok(format!("memory://{bucket}/{object}"))
    }
}

#[async_trait]
impl AuthBackend for MemoryBackend {
    async fn current_user(&self) -> StoreResult<Option<String>> {
        Ok(self.inner.lock().user.clone())
    }

    async fn sign_in(&self, email: &str, _password: &str) -> StoreResult<()> {
        self.take_failure("sign_in")?;
        self.inner.lock().user = Some(email.to_string());
        Ok(())
    }

    async fn sign_up(
        &self,
        email: &str,
        _password: &str,
        _redirect_to: Option<&str>,
    ) -> StoreResult<()> {
        self.take_failure("sign_up")?;
        self.inner.lock().user = Some(email.to_string());
        Ok(())
    }

    async fn sign_out(&self) -> StoreResult<()> {
        self.inner.lock().user = None;
        Ok(())
    }
}

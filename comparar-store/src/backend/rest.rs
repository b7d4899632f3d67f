//! Hosted REST backend
//!
//! Talks to the hosted service over three surfaces: a PostgREST-style
//! relational API (`/rest/v1`), a GoTrue-style auth API (`/auth/v1`), and
//! a bucket storage API (`/storage/v1`). Every request carries the project
//! API key; the bearer token is the signed-in user's access token when one
//! exists, the API key otherwise.

use async_trait::async_trait;
use parking_lot::RwLock;
use reqwest::{Client, StatusCode, header};
use serde::Serialize;
use serde::de::DeserializeOwned;
use shared::models::{
    Establishment, EstablishmentCreate, EstablishmentUpdate, Offer, OfferCreate, OfferUpdate,
    Price, PriceCreate, PriceUpdate, Product, ProductCreate, ProductUpdate,
};

use super::{AuthBackend, DataBackend, StorageBackend};
use crate::config::StoreConfig;
use crate::error::{StoreError, StoreResult};

/// REST client for the hosted backend
pub struct RestBackend {
    client: Client,
    base_url: String,
    api_key: String,
    token: RwLock<Option<String>>,
}

#[derive(Debug, serde::Deserialize)]
struct AuthUser {
    id: String,
}

#[derive(Debug, serde::Deserialize)]
struct TokenResponse {
    access_token: String,
}

impl RestBackend {
    /// Create a new REST backend from configuration
    pub fn new(config: &StoreConfig) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            token: RwLock::new(None),
        }
    }

    /// Bearer value: user token when signed in, project key otherwise
    fn bearer(&self) -> String {
        let token = self.token.read();
        format!("Bearer {}", token.as_deref().unwrap_or(&self.api_key))
    }

    fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    /// Handle a JSON-bearing response
    async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> StoreResult<T> {
        let status = response.status();

        if !status.is_success() {
            let text = response.text().await?;
            return Err(Self::status_error(status, text));
        }

        response.json().await.map_err(Into::into)
    }

    /// Handle a response whose body is irrelevant
    async fn check_response(response: reqwest::Response) -> StoreResult<()> {
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await?;
            return Err(Self::status_error(status, text));
        }
        Ok(())
    }

    fn status_error(status: StatusCode, text: String) -> StoreError {
        match status {
            StatusCode::UNAUTHORIZED => StoreError::Unauthorized,
            StatusCode::FORBIDDEN => StoreError::Forbidden(text),
            StatusCode::NOT_FOUND => StoreError::NotFound(text),
            StatusCode::BAD_REQUEST => StoreError::Validation(text),
            _ => StoreError::Backend(text),
        }
    }

    /// Select rows: `GET /rest/v1/{table}?select=*&…`
    async fn select_rows<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &[(&str, &str)],
    ) -> StoreResult<Vec<T>> {
        let response = self
            .client
            .get(self.rest_url(table))
            .query(&[("select", "*")])
            .query(query)
            .header("apikey", &self.api_key)
            .header(header::AUTHORIZATION, self.bearer())
            .send()
            .await?;
        Self::handle_response(response).await
    }

    /// Insert one row and return it: `POST /rest/v1/{table}`
    async fn insert_row<T: DeserializeOwned, B: Serialize>(
        &self,
        table: &str,
        body: &B,
    ) -> StoreResult<T> {
        let response = self
            .client
            .post(self.rest_url(table))
            .header("apikey", &self.api_key)
            .header(header::AUTHORIZATION, self.bearer())
            .header("Prefer", "return=representation")
            .json(body)
            .send()
            .await?;
        let rows: Vec<T> = Self::handle_response(response).await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| StoreError::InvalidResponse(format!("{table} insert returned no row")))
    }

    /// Update rows by id: `PATCH /rest/v1/{table}?id=eq.{id}`
    async fn update_rows<B: Serialize>(&self, table: &str, id: i64, body: &B) -> StoreResult<()> {
        let response = self
            .client
            .patch(self.rest_url(table))
            .query(&[("id", format!("eq.{id}"))])
            .header("apikey", &self.api_key)
            .header(header::AUTHORIZATION, self.bearer())
            .json(body)
            .send()
            .await?;
        Self::check_response(response).await
    }

    /// Delete rows matching a column filter:
    /// `DELETE /rest/v1/{table}?{column}=eq.{value}`
    async fn delete_rows(&self, table: &str, column: &str, value: i64) -> StoreResult<()> {
        let response = self
            .client
            .delete(self.rest_url(table))
            .query(&[(column, format!("eq.{value}"))])
            .header("apikey", &self.api_key)
            .header(header::AUTHORIZATION, self.bearer())
            .send()
            .await?;
        Self::check_response(response).await
    }
}

#[async_trait]
impl DataBackend for RestBackend {
    // ========== Products ==========

    async fn list_products(&self) -> StoreResult<Vec<Product>> {
        self.select_rows("products", &[("order", "nombre.asc")]).await
    }

    async fn insert_product(&self, data: ProductCreate) -> StoreResult<Product> {
        self.insert_row("products", &data).await
    }

    async fn update_product(&self, id: i64, data: ProductUpdate) -> StoreResult<()> {
        self.update_rows("products", id, &data).await
    }

    async fn delete_product(&self, id: i64) -> StoreResult<()> {
        self.delete_rows("products", "id", id).await
    }

    // ========== Establishments ==========

    async fn list_establishments(&self) -> StoreResult<Vec<Establishment>> {
        self.select_rows("establishments", &[("order", "nombre.asc")])
            .await
    }

    async fn insert_establishment(&self, data: EstablishmentCreate) -> StoreResult<Establishment> {
        self.insert_row("establishments", &data).await
    }

    async fn update_establishment(&self, id: i64, data: EstablishmentUpdate) -> StoreResult<()> {
        self.update_rows("establishments", id, &data).await
    }

    async fn delete_establishment(&self, id: i64) -> StoreResult<()> {
        self.delete_rows("establishments", "id", id).await
    }

    // ========== Prices ==========

    async fn list_prices(&self) -> StoreResult<Vec<Price>> {
        self.select_rows("prices", &[]).await
    }

    async fn insert_price(&self, data: PriceCreate) -> StoreResult<Price> {
        self.insert_row("prices", &data).await
    }

    async fn update_price(&self, id: i64, data: PriceUpdate) -> StoreResult<()> {
        self.update_rows("prices", id, &data).await
    }

    async fn delete_price(&self, id: i64) -> StoreResult<()> {
        self.delete_rows("prices", "id", id).await
    }

    async fn delete_prices_by_product(&self, producto_id: i64) -> StoreResult<()> {
        self.delete_rows("prices", "producto_id", producto_id).await
    }

    async fn delete_prices_by_establishment(&self, establecimiento_id: i64) -> StoreResult<()> {
        self.delete_rows("prices", "establecimiento_id", establecimiento_id)
            .await
    }

    // ========== Offers ==========

    async fn list_offers(&self) -> StoreResult<Vec<Offer>> {
        self.select_rows("offers", &[]).await
    }

    async fn insert_offer(&self, data: OfferCreate) -> StoreResult<Offer> {
        self.insert_row("offers", &data).await
    }

    async fn update_offer(&self, id: i64, data: OfferUpdate) -> StoreResult<()> {
        self.update_rows("offers", id, &data).await
    }

    async fn delete_offer(&self, id: i64) -> StoreResult<()> {
        self.delete_rows("offers", "id", id).await
    }

    async fn delete_offers_by_establishment(&self, establecimiento_id: i64) -> StoreResult<()> {
        self.delete_rows("offers", "establecimiento_id", establecimiento_id)
            .await
    }
}

#[async_trait]
impl StorageBackend for RestBackend {
    async fn upload_image(
        &self,
        bucket: &str,
        object: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> StoreResult<String> {
        let url = format!("{}/storage/v1/object/{}/{}", self.base_url, bucket, object);
        let response = self
            .client
            .post(&url)
            .header("apikey", &self.api_key)
            .header(header::AUTHORIZATION, self.bearer())
            .header(header::CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await?;
            return Err(StoreError::Storage(format!(
                "upload to {bucket}/{object} failed ({status}): {text}"
            )));
        }

        Ok(format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url, bucket, object
        ))
    }
}

#[async_trait]
impl AuthBackend for RestBackend {
    async fn current_user(&self) -> StoreResult<Option<String>> {
        if self.token.read().is_none() {
            return Ok(None);
        }

        let response = self
            .client
            .get(format!("{}/auth/v1/user", self.base_url))
            .header("apikey", &self.api_key)
            .header(header::AUTHORIZATION, self.bearer())
            .send()
            .await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            return Ok(None);
        }
        let user: AuthUser = Self::handle_response(response).await?;
        Ok(Some(user.id))
    }

    async fn sign_in(&self, email: &str, password: &str) -> StoreResult<()> {
        #[derive(Serialize)]
        struct SignInRequest<'a> {
            email: &'a str,
            password: &'a str,
        }

        let response = self
            .client
            .post(format!("{}/auth/v1/token", self.base_url))
            .query(&[("grant_type", "password")])
            .header("apikey", &self.api_key)
            .json(&SignInRequest { email, password })
            .send()
            .await?;

        let token: TokenResponse = Self::handle_response(response).await?;
        *self.token.write() = Some(token.access_token);
        Ok(())
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        redirect_to: Option<&str>,
    ) -> StoreResult<()> {
        #[derive(Serialize)]
        struct SignUpRequest<'a> {
            email: &'a str,
            password: &'a str,
        }

        let mut request = self
            .client
            .post(format!("{}/auth/v1/signup", self.base_url))
            .header("apikey", &self.api_key)
            .json(&SignUpRequest { email, password });
        if let Some(redirect) = redirect_to {
            request = request.query(&[("redirect_to", redirect)]);
        }

        Self::check_response(request.send().await?).await
    }

    async fn sign_out(&self) -> StoreResult<()> {
        let response = self
            .client
            .post(format!("{}/auth/v1/logout", self.base_url))
            .header("apikey", &self.api_key)
            .header(header::AUTHORIZATION, self.bearer())
            .send()
            .await?;
        Self::check_response(response).await?;
        *self.token.write() = None;
        Ok(())
    }
}

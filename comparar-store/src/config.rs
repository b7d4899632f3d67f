//! Store configuration

/// Configuration for connecting to the hosted backend
///
/// # Environment variables
///
/// All fields can be set through the environment:
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | COMPARAR_API_URL | http://localhost:54321 | Backend base URL |
/// | COMPARAR_API_KEY | (empty) | Project API key |
/// | COMPARAR_TIMEOUT_SECS | 30 | Request timeout in seconds |
/// | COMPARAR_PRODUCT_BUCKET | product-images | Bucket for product images |
/// | COMPARAR_ESTABLISHMENT_BUCKET | establishment-logos | Bucket for establishment logos |
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Backend base URL (e.g. "https://xyz.supabase.co")
    pub base_url: String,

    /// Project API key sent with every request
    pub api_key: String,

    /// Request timeout in seconds
    pub timeout: u64,

    /// Storage bucket for product images
    pub product_bucket: String,

    /// Storage bucket for establishment logos
    pub establishment_bucket: String,
}

impl StoreConfig {
    /// Create a new configuration for the given base URL
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: String::new(),
            timeout: 30,
            product_bucket: "product-images".to_string(),
            establishment_bucket: "establishment-logos".to_string(),
        }
    }

    /// Load configuration from environment variables, using defaults for
    /// anything unset
    pub fn from_env() -> Self {
        let mut config = Self::new(
            std::env::var("COMPARAR_API_URL")
                .unwrap_or_else(|_| "http://localhost:54321".to_string()),
        );
        if let Ok(key) = std::env::var("COMPARAR_API_KEY") {
            config.api_key = key;
        }
        if let Some(timeout) = std::env::var("COMPARAR_TIMEOUT_SECS")
            .ok()
            .and_then(|t| t.parse().ok())
        {
            config.timeout = timeout;
        }
        if let Ok(bucket) = std::env::var("COMPARAR_PRODUCT_BUCKET") {
            config.product_bucket = bucket;
        }
        if let Ok(bucket) = std::env::var("COMPARAR_ESTABLISHMENT_BUCKET") {
            config.establishment_bucket = bucket;
        }
        config
    }

    /// Set the API key
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = key.into();
        self
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout = seconds;
        self
    }

    /// Set the storage buckets
    pub fn with_buckets(
        mut self,
        product_bucket: impl Into<String>,
        establishment_bucket: impl Into<String>,
    ) -> Self {
        self.product_bucket = product_bucket.into();
        self.establishment_bucket = establishment_bucket.into();
        self
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::new("http://localhost:54321")
    }
}

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::domain::{CartError, ProductInfo, StockRecord};
use crate::ports::StockService;

/// StockService adapter backed by the storefront HTTP API.
///
/// Expects JSON endpoints `GET {base}/stock/{id}` and
/// `GET {base}/products/{id}`.
pub struct HttpStockService {
    client: Client,
    base_url: Url,
}

impl HttpStockService {
    /// Create a new HttpStockService against the given API base URL.
    pub fn new(base_url: &str) -> Result<Self, CartError> {
        // A trailing slash keeps Url::join from eating the last path segment.
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{base_url}/")
        };
        let base_url =
            Url::parse(&normalized).map_err(|e| CartError::Http(e.to_string()))?;

        let client = Client::builder()
            .use_rustls_tls()
            .user_agent(format!("storecart/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| CartError::Http(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, base_url })
    }

    fn endpoint(&self, path: &str) -> Result<Url, CartError> {
        self.base_url
            .join(path)
            .map_err(|e| CartError::Http(e.to_string()))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        product_id: u64,
    ) -> Result<T, CartError> {
        let url = self.endpoint(path)?;
        debug!(url = %url, "Fetching from storefront API");

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| CartError::Http(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(CartError::ProductNotFound { product_id });
        }
        if !status.is_success() {
            return Err(CartError::Http(format!("HTTP {} for {}", status, url)));
        }

        response
            .json()
            .await
            .map_err(|e| CartError::Http(e.to_string()))
    }
}

#[async_trait]
impl StockService for HttpStockService {
    async fn stock(&self, product_id: u64) -> Result<StockRecord, CartError> {
        self.get_json(&format!("stock/{product_id}"), product_id)
            .await
    }

    async fn product(&self, product_id: u64) -> Result<ProductInfo, CartError> {
        self.get_json(&format!("products/{product_id}"), product_id)
            .await
    }
}

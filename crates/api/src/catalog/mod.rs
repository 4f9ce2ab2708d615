//! Upstream product catalog client.
//!
//! # Architecture
//!
//! - Plain JSON over HTTP with `reqwest`; the upstream serves a JSON array of
//!   products (fake-store style: `title`, `image`, `price`, ...)
//! - No caching here: the local `products` table is the mirror, see
//!   [`crate::services::products`]
//! - No retries; failures surface as [`CatalogError`] and map to 502
//!
//! # Example
//!
//! ```rust,ignore
//! let client = CatalogClient::new(&config.catalog)?;
//! let first_ten = client.fetch_products(10).await?;
//! ```

use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;
use tracing::instrument;
use url::Url;

use crate::config::CatalogConfig;

/// Errors that can occur when talking to the upstream catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// HTTP request failed (connect, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Upstream answered with a non-success status.
    #[error("upstream returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// A product in the payload could not be mapped.
    #[error("invalid product in upstream payload: {0}")]
    InvalidProduct(String),
}

/// A product as served by the upstream catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamProduct {
    pub name: String,
    pub image: String,
    pub price: Decimal,
}

/// Wire shape of an upstream product. Extra fields are ignored.
#[derive(Debug, Deserialize)]
struct RawProduct {
    title: String,
    image: String,
    price: serde_json::Value,
}

/// Largest price in cents that fits the `NUMERIC(10, 2)` column.
const MAX_PRICE_CENTS: i64 = 9_999_999_999;

impl TryFrom<RawProduct> for UpstreamProduct {
    type Error = CatalogError;

    fn try_from(raw: RawProduct) -> Result<Self, Self::Error> {
        let price = match &raw.price {
            serde_json::Value::Number(n) => Decimal::from_str(&n.to_string()),
            serde_json::Value::String(s) => Decimal::from_str(s.trim()),
            other => {
                return Err(CatalogError::InvalidProduct(format!(
                    "price of '{}' is not numeric: {other}",
                    raw.title
                )));
            }
        }
        .map_err(|e| CatalogError::InvalidProduct(format!("price of '{}': {e}", raw.title)))?;

        if price.is_sign_negative() {
            return Err(CatalogError::InvalidProduct(format!(
                "price of '{}' is negative",
                raw.title
            )));
        }

        let price = price.round_dp(2);
        let max = Decimal::new(MAX_PRICE_CENTS, 2);
        if price > max {
            return Err(CatalogError::InvalidProduct(format!(
                "price of '{}' exceeds {max}",
                raw.title
            )));
        }

        Ok(Self {
            name: raw.title,
            image: raw.image,
            price,
        })
    }
}

/// Parse an upstream payload, keeping at most `limit` products.
///
/// # Errors
///
/// Returns [`CatalogError::Parse`] if the body is not a JSON array of
/// products, or [`CatalogError::InvalidProduct`] if a kept item is unusable.
pub fn parse_products(body: &str, limit: usize) -> Result<Vec<UpstreamProduct>, CatalogError> {
    let raw: Vec<RawProduct> = serde_json::from_str(body)?;
    raw.into_iter()
        .take(limit)
        .map(UpstreamProduct::try_from)
        .collect()
}

/// Source of catalog products.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Fetch the first `limit` products offered upstream.
    async fn fetch_products(&self, limit: usize) -> Result<Vec<UpstreamProduct>, CatalogError>;
}

/// HTTP client for the upstream product catalog.
#[derive(Clone)]
pub struct CatalogClient {
    inner: Arc<CatalogClientInner>,
}

struct CatalogClientInner {
    client: reqwest::Client,
    endpoint: Url,
}

impl CatalogClient {
    /// Create a new catalog client.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Http`] if the HTTP client cannot be built.
    pub fn new(config: &CatalogConfig) -> Result<Self, CatalogError> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            inner: Arc::new(CatalogClientInner {
                client,
                endpoint: config.products_api_url.clone(),
            }),
        })
    }

    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.inner.endpoint
    }
}

#[async_trait]
impl CatalogSource for CatalogClient {
    #[instrument(skip(self), fields(endpoint = %self.inner.endpoint))]
    async fn fetch_products(&self, limit: usize) -> Result<Vec<UpstreamProduct>, CatalogError> {
        let response = self
            .inner
            .client
            .get(self.inner.endpoint.clone())
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status();
        // Read as text first for better error diagnostics
        let body = response.text().await?;

        if !status.is_success() {
            let snippet: String = body.chars().take(200).collect();
            tracing::error!(status = %status, body = %snippet, "Catalog API returned non-success status");
            return Err(CatalogError::Status {
                status: status.as_u16(),
                body: snippet,
            });
        }

        let products = parse_products(&body, limit).inspect_err(|e| {
            tracing::error!(
                error = %e,
                body = %body.chars().take(500).collect::<String>(),
                "Failed to parse catalog response"
            );
        })?;

        tracing::debug!(count = products.len(), "Fetched products from catalog");
        Ok(products)
    }
}

//! Tienda REST API client.
//!
//! Plain JSON over HTTP with a bearer token. Response bodies are read as
//! text first so that a non-JSON error page still produces a usable error
//! message. Product listings are cached with `moka` (5-minute TTL) and
//! invalidated after a confirmed order, since stock levels change.

pub mod types;

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, instrument};

use tienda_core::{OrderId, ProductId, Quantity};

use crate::config::ClientConfig;
use crate::session::AuthToken;

use types::{
    AddToCartRequest, ApiErrorBody, AuthResponse, CartItem, Invoice, LoginRequest,
    OrderConfirmation, OrderDetail, OrderPreview, OrderRequest, OrderSummary, Product,
    ProductsResponse, RegisterRequest, UpdateCartRequest, UserProfile,
};

const PRODUCTS_CACHE_KEY: &str = "products";

/// Errors that can occur when talking to the Tienda API.
///
/// All three variants are transport-class failures as far as the checkout
/// flow is concerned: network error, non-success status, malformed body.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a response (connect, timeout, ...).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("API error (status {status}): {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Message from the response body, or the raw body text.
        message: String,
    },

    /// The response body could not be parsed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Client for the Tienda commerce API.
///
/// Cheaply cloneable; all clones share one connection pool and one product
/// cache. Authenticated endpoints take the token explicitly, so an
/// anonymous caller cannot reach them at all.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    http: reqwest::Client,
    base_url: String,
    products_cache: Cache<String, Vec<Product>>,
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        let products_cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                http,
                base_url: config.api_base_url.as_str().trim_end_matches('/').to_owned(),
                products_cache,
            }),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.inner.base_url)
    }

    /// Send a request and parse a JSON response body.
    async fn execute<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ApiError> {
        let body = self.execute_raw(request).await?;
        match serde_json::from_str(&body) {
            Ok(value) => Ok(value),
            Err(e) => {
                tracing::error!(
                    error = %e,
                    body = %body.chars().take(500).collect::<String>(),
                    "Failed to parse Tienda API response"
                );
                Err(ApiError::Parse(e))
            }
        }
    }

    /// Send a request, check the status, and return the body text.
    async fn execute_raw(&self, request: reqwest::RequestBuilder) -> Result<String, ApiError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %body.chars().take(500).collect::<String>(),
                "Tienda API returned non-success status"
            );
            return Err(ApiError::Status {
                status: status.as_u16(),
                message: extract_message(&body, status.as_u16()),
            });
        }

        Ok(body)
    }

    fn authed(&self, request: reqwest::RequestBuilder, token: &AuthToken) -> reqwest::RequestBuilder {
        request.bearer_auth(token.expose())
    }

    // =========================================================================
    // Auth
    // =========================================================================

    /// Register a new account.
    ///
    /// # Errors
    ///
    /// Returns an error if the API rejects the registration or the request
    /// fails.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse, ApiError> {
        self.execute(self.post_json("auth/register", request)).await
    }

    /// Log in with email and password.
    ///
    /// # Errors
    ///
    /// Returns an error if the credentials are rejected or the request
    /// fails.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn login(&self, request: &LoginRequest) -> Result<AuthResponse, ApiError> {
        self.execute(self.post_json("auth/login", request)).await
    }

    /// Fetch the current user's profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is no longer valid or the request
    /// fails.
    #[instrument(skip(self, token))]
    pub async fn profile(&self, token: &AuthToken) -> Result<UserProfile, ApiError> {
        let request = self.authed(self.inner.http.get(self.endpoint("auth/profile")), token);
        self.execute(request).await
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// List the product catalog (cached for 5 minutes).
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn products(&self) -> Result<Vec<Product>, ApiError> {
        if let Some(products) = self.inner.products_cache.get(PRODUCTS_CACHE_KEY).await {
            debug!("Cache hit for products");
            return Ok(products);
        }

        let response: ProductsResponse = self
            .execute(self.inner.http.get(self.endpoint("products")))
            .await?;
        let products = response.into_items();

        self.inner
            .products_cache
            .insert(PRODUCTS_CACHE_KEY.to_owned(), products.clone())
            .await;

        Ok(products)
    }

    /// Drop the cached product listing (stock changes after an order).
    pub async fn invalidate_products(&self) {
        self.inner.products_cache.invalidate(PRODUCTS_CACHE_KEY).await;
    }

    // =========================================================================
    // Cart
    // =========================================================================

    /// Fetch the server-side cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token))]
    pub async fn cart(&self, token: &AuthToken) -> Result<Vec<CartItem>, ApiError> {
        let request = self.authed(self.inner.http.get(self.endpoint("cart")), token);
        self.execute(request).await
    }

    /// Add a product to the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the API rejects the addition (e.g., no stock) or
    /// the request fails.
    #[instrument(skip(self, token), fields(product_id = %product_id))]
    pub async fn add_to_cart(
        &self,
        token: &AuthToken,
        product_id: ProductId,
        quantity: Quantity,
    ) -> Result<(), ApiError> {
        let body = AddToCartRequest {
            product_id,
            quantity: quantity.get(),
        };
        let request = self.authed(self.post_json("cart", &body), token);
        self.execute_raw(request).await.map(drop)
    }

    /// Set the quantity of a cart line.
    ///
    /// # Errors
    ///
    /// Returns an error if the API rejects the update or the request fails.
    #[instrument(skip(self, token), fields(product_id = %product_id))]
    pub async fn update_cart_item(
        &self,
        token: &AuthToken,
        product_id: ProductId,
        quantity: Quantity,
    ) -> Result<(), ApiError> {
        let body = UpdateCartRequest {
            quantity: quantity.get(),
        };
        let request = self.authed(
            self.inner
                .http
                .put(self.endpoint(&format!("cart/{product_id}")))
                .json(&body),
            token,
        );
        self.execute_raw(request).await.map(drop)
    }

    /// Remove a line from the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the API rejects the removal or the request fails.
    #[instrument(skip(self, token), fields(product_id = %product_id))]
    pub async fn remove_from_cart(
        &self,
        token: &AuthToken,
        product_id: ProductId,
    ) -> Result<(), ApiError> {
        let request = self.authed(
            self.inner
                .http
                .delete(self.endpoint(&format!("cart/{product_id}"))),
            token,
        );
        self.execute_raw(request).await.map(drop)
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// Stage an order preview for the given shipping address.
    ///
    /// # Errors
    ///
    /// Returns an error if the API rejects the preview or the request fails.
    #[instrument(skip(self, token))]
    pub async fn preview_order(
        &self,
        token: &AuthToken,
        address: &str,
    ) -> Result<OrderPreview, ApiError> {
        let body = OrderRequest {
            address: address.to_owned(),
        };
        let request = self.authed(self.post_json("orders/preview", &body), token);
        self.execute(request).await
    }

    /// Commit an order for the given shipping address.
    ///
    /// # Errors
    ///
    /// Returns an error if the API rejects the order (e.g., stock changed)
    /// or the request fails.
    #[instrument(skip(self, token))]
    pub async fn confirm_order(
        &self,
        token: &AuthToken,
        address: &str,
    ) -> Result<OrderConfirmation, ApiError> {
        let body = OrderRequest {
            address: address.to_owned(),
        };
        let request = self.authed(self.post_json("orders", &body), token);
        self.execute(request).await
    }

    /// Fetch the user's order history.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token))]
    pub async fn order_history(&self, token: &AuthToken) -> Result<Vec<OrderSummary>, ApiError> {
        let request = self.authed(self.inner.http.get(self.endpoint("orders/history")), token);
        self.execute(request).await
    }

    /// Fetch the detail of one order.
    ///
    /// # Errors
    ///
    /// Returns an error if the order does not exist or the request fails.
    #[instrument(skip(self, token), fields(order_id = %order_id))]
    pub async fn order_detail(
        &self,
        token: &AuthToken,
        order_id: OrderId,
    ) -> Result<OrderDetail, ApiError> {
        let request = self.authed(
            self.inner
                .http
                .get(self.endpoint(&format!("orders/{order_id}"))),
            token,
        );
        self.execute(request).await
    }

    /// Fetch the invoice document of one order.
    ///
    /// # Errors
    ///
    /// Returns an error if the order has no invoice or the request fails.
    #[instrument(skip(self, token), fields(order_id = %order_id))]
    pub async fn order_invoice(
        &self,
        token: &AuthToken,
        order_id: OrderId,
    ) -> Result<Invoice, ApiError> {
        let request = self.authed(
            self.inner
                .http
                .get(self.endpoint(&format!("orders/{order_id}/invoice"))),
            token,
        );
        self.execute(request).await
    }

    fn post_json<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> reqwest::RequestBuilder {
        self.inner.http.post(self.endpoint(path)).json(body)
    }
}

/// Extract a human-readable message from an error response body.
///
/// The API usually sends `{"message": "..."}`, but proxies and crashes can
/// produce anything; fall back to the raw text, then to the status code.
fn extract_message(body: &str, status: u16) -> String {
    let fallback = || format!("request failed with status {status}");

    match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(parsed) => parsed
            .message
            .filter(|m| !m.is_empty())
            .unwrap_or_else(fallback),
        Err(_) => {
            let trimmed = body.trim();
            if trimmed.is_empty() {
                fallback()
            } else {
                trimmed.chars().take(200).collect()
            }
        }
    }
}

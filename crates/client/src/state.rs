//! Application state owned by the client.
//!
//! One object holds the configuration, the API client, and the session,
//! with accessor and mutator methods - there is no module-level mutable
//! state anywhere in the crate. The cart and the catalog live on the
//! server; the methods here fetch fresh snapshots.

use tracing::instrument;

use tienda_core::{Email, OrderId, ProductId, Quantity};

use crate::api::ApiClient;
use crate::api::types::{
    Invoice, LoginRequest, OrderDetail, OrderSummary, Product, RegisterRequest, UserProfile,
};
use crate::cart::Cart;
use crate::checkout::{CheckoutFlow, EventSink};
use crate::config::ClientConfig;
use crate::error::Result;
use crate::session::{AuthToken, Session, SessionStore};

/// The Tienda client application state.
pub struct AppState {
    config: ClientConfig,
    api: ApiClient,
    store: SessionStore,
    session: Session,
}

impl AppState {
    /// Build the state from configuration, restoring any persisted session.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built or the session
    /// file is unreadable.
    pub fn load(config: ClientConfig) -> Result<Self> {
        let api = ApiClient::new(&config)?;
        let store = SessionStore::new(config.session_file.clone());
        let session = store.load()?;

        Ok(Self {
            config,
            api,
            store,
            session,
        })
    }

    /// The loaded configuration.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The shared API client.
    #[must_use]
    pub const fn api(&self) -> &ApiClient {
        &self.api
    }

    /// The current session.
    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    /// A checkout flow over this state's API client.
    pub fn checkout<S: EventSink>(&self, sink: S) -> CheckoutFlow<ApiClient, S> {
        CheckoutFlow::new(self.api.clone(), sink)
    }

    // =========================================================================
    // Auth
    // =========================================================================

    /// Register a new account and establish a session.
    ///
    /// # Errors
    ///
    /// Returns an error if the API rejects the registration or the session
    /// cannot be persisted.
    #[instrument(skip_all, fields(email = %email))]
    pub async fn register(
        &mut self,
        name: &str,
        email: Email,
        password: &str,
        address: &str,
    ) -> Result<UserProfile> {
        let request = RegisterRequest {
            name: name.to_owned(),
            email,
            password: password.to_owned(),
            address: address.to_owned(),
        };
        let auth = self.api.register(&request).await?;
        self.establish(auth.token, auth.user)
    }

    /// Log in and establish a session.
    ///
    /// # Errors
    ///
    /// Returns an error if the credentials are rejected or the session
    /// cannot be persisted.
    #[instrument(skip_all, fields(email = %email))]
    pub async fn login(&mut self, email: Email, password: &str) -> Result<UserProfile> {
        let request = LoginRequest {
            email,
            password: password.to_owned(),
        };
        let auth = self.api.login(&request).await?;
        self.establish(auth.token, auth.user)
    }

    fn establish(&mut self, token: String, user: UserProfile) -> Result<UserProfile> {
        self.session = Session::authenticated(AuthToken::new(token), user.clone());
        self.store.save(&self.session)?;
        Ok(user)
    }

    /// Re-fetch the profile for the current token and cache it.
    ///
    /// # Errors
    ///
    /// Returns an error when anonymous, or if the token is no longer valid.
    pub async fn refresh_profile(&mut self) -> Result<UserProfile> {
        let token = self.session.require_token()?;
        let user = self.api.profile(token).await?;
        self.session.set_user(user.clone());
        self.store.save(&self.session)?;
        Ok(user)
    }

    /// Destroy the session, locally and on disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the session file cannot be removed.
    pub fn logout(&mut self) -> Result<()> {
        self.session.clear();
        self.store.clear()?;
        Ok(())
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    /// The product catalog, optionally filtered by a search term over name
    /// and description (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    pub async fn products(&self, search: Option<&str>) -> Result<Vec<Product>> {
        let products = self.api.products().await?;

        let Some(term) = search.map(str::to_lowercase).filter(|t| !t.is_empty()) else {
            return Ok(products);
        };

        Ok(products
            .into_iter()
            .filter(|p| {
                p.name.to_lowercase().contains(&term)
                    || p.description
                        .as_ref()
                        .is_some_and(|d| d.to_lowercase().contains(&term))
            })
            .collect())
    }

    // =========================================================================
    // Cart
    // =========================================================================

    /// Fetch the current cart snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error when anonymous or if the API request fails.
    pub async fn cart(&self) -> Result<Cart> {
        let token = self.session.require_token()?;
        Ok(Cart::from(self.api.cart(token).await?))
    }

    /// Add a product to the cart and return the refreshed snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error when anonymous or if the API rejects the addition.
    pub async fn add_to_cart(&self, product_id: ProductId, quantity: Quantity) -> Result<Cart> {
        let token = self.session.require_token()?;
        self.api.add_to_cart(token, product_id, quantity).await?;
        self.cart().await
    }

    /// Set a line's quantity; zero removes the line.
    ///
    /// # Errors
    ///
    /// Returns an error when anonymous or if the API rejects the update.
    pub async fn set_cart_quantity(&self, product_id: ProductId, quantity: u32) -> Result<Cart> {
        let token = self.session.require_token()?;
        match Quantity::new(quantity) {
            Ok(quantity) => {
                self.api
                    .update_cart_item(token, product_id, quantity)
                    .await?;
            }
            Err(_) => self.api.remove_from_cart(token, product_id).await?,
        }
        self.cart().await
    }

    /// Remove a line from the cart and return the refreshed snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error when anonymous or if the API rejects the removal.
    pub async fn remove_from_cart(&self, product_id: ProductId) -> Result<Cart> {
        let token = self.session.require_token()?;
        self.api.remove_from_cart(token, product_id).await?;
        self.cart().await
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// Fetch the order history.
    ///
    /// # Errors
    ///
    /// Returns an error when anonymous or if the API request fails.
    pub async fn order_history(&self) -> Result<Vec<OrderSummary>> {
        let token = self.session.require_token()?;
        Ok(self.api.order_history(token).await?)
    }

    /// Fetch one order's detail.
    ///
    /// # Errors
    ///
    /// Returns an error when anonymous or if the order does not exist.
    pub async fn order_detail(&self, order_id: OrderId) -> Result<OrderDetail> {
        let token = self.session.require_token()?;
        Ok(self.api.order_detail(token, order_id).await?)
    }

    /// Fetch one order's invoice document.
    ///
    /// # Errors
    ///
    /// Returns an error when anonymous or if the order has no invoice.
    pub async fn order_invoice(&self, order_id: OrderId) -> Result<Invoice> {
        let token = self.session.require_token()?;
        Ok(self.api.order_invoice(token, order_id).await?)
    }

    /// Invalidate caches that go stale once an order is placed.
    ///
    /// Call after a confirmed checkout, before re-rendering the catalog.
    pub async fn order_was_placed(&self) {
        self.api.invalidate_products().await;
    }
}

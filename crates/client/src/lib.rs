//! Tienda headless client library.
//!
//! Everything the storefront surface needs to talk to the Tienda commerce
//! API: configuration, an authenticated HTTP client, a durable session, the
//! server-side cart view, and the checkout preview/confirm flow.
//!
//! # Architecture
//!
//! - The remote API is the source of truth for products, the cart, and
//!   orders - no local sync, direct calls via [`api::ApiClient`]
//! - Session state (bearer token + profile) persists across runs through
//!   [`session::SessionStore`]
//! - [`checkout::CheckoutFlow`] is the only stateful piece: it owns the
//!   single pending-preview slot between the preview and confirm steps and
//!   reports to the user surface through [`checkout::EventSink`]
//!
//! # Example
//!
//! ```rust,ignore
//! use tienda_client::{config::ClientConfig, state::AppState};
//!
//! let config = ClientConfig::from_env()?;
//! let mut app = AppState::load(config)?;
//!
//! app.login(email, &password).await?;
//! let cart = app.cart().await?;
//!
//! let mut flow = app.checkout(sink);
//! if flow.request_preview(app.session(), &cart, Some("Main 123")).await {
//!     flow.confirm(app.session()).await;
//! }
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod cart;
pub mod checkout;
pub mod config;
pub mod error;
pub mod session;
pub mod state;

pub use error::{AppError, Result};

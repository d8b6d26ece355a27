//! Tienda Core - Shared types library.
//!
//! This crate provides common types used across the Tienda client components:
//! - `client` - Library crate: API client, session, checkout flow
//! - `cli` - Command-line storefront surface
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients. This keeps
//! it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, quantities,
//!   emails, and order statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;

//! Client-side view of the server cart.
//!
//! The API owns the cart; this is the snapshot the UI renders and the
//! checkout flow validates against. Line order is whatever the server
//! returned. The cart is refreshed after every mutation and emptied by the
//! server on logout and on a confirmed order.

use tienda_core::Price;

use crate::api::types::CartItem;

/// An ordered snapshot of the cart.
#[derive(Debug, Clone, Default)]
pub struct Cart {
    lines: Vec<CartItem>,
}

impl Cart {
    /// An empty cart.
    #[must_use]
    pub const fn empty() -> Self {
        Self { lines: Vec::new() }
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// The cart lines, in server order.
    #[must_use]
    pub fn lines(&self) -> &[CartItem] {
        &self.lines
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn total_units(&self) -> u32 {
        self.lines.iter().map(|l| l.quantity.get()).sum()
    }

    /// Total price of the cart.
    #[must_use]
    pub fn total(&self) -> Price {
        self.lines
            .iter()
            .map(|l| l.unit_price.times(l.quantity.get()))
            .sum()
    }
}

impl From<Vec<CartItem>> for Cart {
    fn from(lines: Vec<CartItem>) -> Self {
        Self { lines }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use tienda_core::{ProductId, Quantity};

    fn line(id: i64, pesos: i64, qty: u32) -> CartItem {
        CartItem {
            product_id: ProductId::new(id),
            name: format!("product-{id}"),
            unit_price: Price::from_pesos(pesos),
            quantity: Quantity::new(qty).unwrap(),
            image_url: None,
        }
    }

    #[test]
    fn empty_cart_has_zero_totals() {
        let cart = Cart::empty();
        assert!(cart.is_empty());
        assert_eq!(cart.total_units(), 0);
        assert_eq!(cart.total(), Price::ZERO);
    }

    #[test]
    fn totals_sum_over_lines() {
        let cart = Cart::from(vec![line(7, 9990, 2), line(8, 500, 3)]);
        assert!(!cart.is_empty());
        assert_eq!(cart.total_units(), 5);
        assert_eq!(cart.total(), Price::from_pesos(2 * 9990 + 3 * 500));
    }

    #[test]
    fn preserves_server_order() {
        let cart = Cart::from(vec![line(9, 100, 1), line(3, 200, 1)]);
        let ids: Vec<i64> = cart.lines().iter().map(|l| l.product_id.get()).collect();
        assert_eq!(ids, vec![9, 3]);
    }
}

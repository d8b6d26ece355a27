//! Terminal rendering: the presentation adapter of the client.
//!
//! Renders catalog, cart, and order views, prints notifications with their
//! severity tier, and turns checkout events into output and downloads. All
//! decisions stay in `tienda_client`; this module only displays what it is
//! handed.

use std::path::Path;

use tienda_client::api::types::{OrderDetail, OrderSummary, Product};
use tienda_client::cart::Cart;
use tienda_client::checkout::{CheckoutEvent, EventSink, Severity};

/// Print a notification with its severity tag.
pub fn notice(severity: Severity, message: &str) {
    let tag = match severity {
        Severity::Info => "info",
        Severity::Success => "ok",
        Severity::Warning => "warn",
        Severity::Error => "error",
    };
    println!("[{tag}] {message}");
}

/// Render the product catalog.
pub fn products(products: &[Product]) {
    if products.is_empty() {
        println!("No products available");
        return;
    }

    for product in products {
        let stock = match product.stock {
            Some(s) if s <= 0 => "out of stock".to_owned(),
            Some(s) => format!("stock {s}"),
            None => "stock n/a".to_owned(),
        };
        println!("#{:<4} {} - {} ({stock})", product.id, product.name, product.price);
        if let Some(description) = &product.description {
            println!("      {description}");
        }
    }
}

/// Render the cart with line totals.
pub fn cart(cart: &Cart) {
    if cart.is_empty() {
        println!("Your cart is empty");
        return;
    }

    for line in cart.lines() {
        println!(
            "#{:<4} {} - {} x{} = {}",
            line.product_id,
            line.name,
            line.unit_price,
            line.quantity,
            line.unit_price.times(line.quantity.get()),
        );
    }
    println!(
        "{} product(s), total {}",
        cart.lines().len(),
        cart.total()
    );
}

/// Render the order history.
pub fn orders(orders: &[OrderSummary]) {
    if orders.is_empty() {
        println!("No previous orders");
        return;
    }

    for order in orders {
        println!(
            "order #{:<4} {} - {} [{}]",
            order.id,
            order.placed_at.format("%Y-%m-%d %H:%M"),
            order.total,
            order.status,
        );
    }
}

/// Render one order's detail.
pub fn order_detail(detail: &OrderDetail) {
    for item in &detail.items {
        println!(
            "{} - {} x{}",
            item.product.name, item.unit_price, item.quantity
        );
    }
    println!("Total: {}", detail.total);
    println!("Shipping address: {}", detail.shipping_address);
    if detail.has_invoice {
        println!("Invoice available (orders invoice <id>)");
    }
}

/// Write a downloaded document into the current directory.
pub fn save_document(filename: &str, document: &[u8]) -> std::io::Result<()> {
    std::fs::write(Path::new(filename), document)?;
    println!("Saved {filename}");
    Ok(())
}

/// [`EventSink`] that renders checkout events to the terminal.
///
/// A confirmed order's receipt is written as `pedido-<orderId>.pdf`, the
/// same download the web store triggers.
pub struct ConsoleSink;

impl EventSink for ConsoleSink {
    fn emit(&self, event: CheckoutEvent) {
        match event {
            CheckoutEvent::PreviewReady(preview) => {
                println!("Shipping address: {}", preview.address);
                for item in &preview.line_items {
                    println!("  {} x{} - {}", item.name, item.quantity, item.unit_price);
                }
                println!("Total: {}", preview.total);
                println!("(receipt preview: {} bytes)", preview.document.len());
            }
            CheckoutEvent::Confirmed { order_id, document } => {
                let filename = format!("pedido-{order_id}.pdf");
                if let Err(e) = save_document(&filename, &document) {
                    tracing::error!(error = %e, filename, "Failed to save order document");
                }
            }
            CheckoutEvent::Notice { severity, message } => notice(severity, &message),
        }
    }
}

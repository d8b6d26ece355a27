//! Cart commands: show, add, update, remove.

use tienda_client::state::AppState;
use tienda_core::{ProductId, Quantity};

use crate::render;

type CommandResult = Result<(), Box<dyn std::error::Error>>;

pub async fn show(app: &AppState) -> CommandResult {
    render::cart(&app.cart().await?);
    Ok(())
}

pub async fn add(app: &AppState, product_id: i64, quantity: u32) -> CommandResult {
    let quantity = Quantity::new(quantity)?;
    let cart = app.add_to_cart(ProductId::new(product_id), quantity).await?;
    render::notice(
        tienda_client::checkout::Severity::Success,
        "Product added to the cart",
    );
    render::cart(&cart);
    Ok(())
}

pub async fn update(app: &AppState, product_id: i64, quantity: u32) -> CommandResult {
    let cart = app
        .set_cart_quantity(ProductId::new(product_id), quantity)
        .await?;
    render::cart(&cart);
    Ok(())
}

pub async fn remove(app: &AppState, product_id: i64) -> CommandResult {
    let cart = app.remove_from_cart(ProductId::new(product_id)).await?;
    render::notice(
        tienda_client::checkout::Severity::Info,
        "Product removed from the cart",
    );
    render::cart(&cart);
    Ok(())
}

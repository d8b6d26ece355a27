//! Order history, details, and invoice download.

use tienda_client::state::AppState;
use tienda_core::OrderId;

use crate::render;

type CommandResult = Result<(), Box<dyn std::error::Error>>;

pub async fn list(app: &AppState) -> CommandResult {
    let orders = app.order_history().await?;
    render::orders(&orders);
    Ok(())
}

pub async fn details(app: &AppState, order_id: i64) -> CommandResult {
    let detail = app.order_detail(OrderId::new(order_id)).await?;
    render::order_detail(&detail);
    Ok(())
}

pub async fn invoice(app: &AppState, order_id: i64) -> CommandResult {
    let order_id = OrderId::new(order_id);
    let invoice = app.order_invoice(order_id).await?;
    let filename = invoice
        .filename
        .unwrap_or_else(|| format!("pedido-{order_id}.pdf"));
    render::save_document(&filename, &invoice.document)?;
    Ok(())
}

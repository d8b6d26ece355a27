//! The checkout command: preview, review, confirm or cancel.
//!
//! Drives `tienda_client::checkout::CheckoutFlow` end to end. The flow does
//! every check itself (session, cart, address) and reports through the
//! sink; this command only fetches the cart snapshot, prompts, and
//! refreshes the views after a confirmed order.

use std::io::{self, BufRead, Write};

use tienda_client::cart::Cart;
use tienda_client::state::AppState;

use crate::render;

pub async fn run(
    app: &AppState,
    address: Option<&str>,
    yes: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let cart = if app.session().is_authenticated() {
        app.cart().await?
    } else {
        // The flow rejects anonymous checkout itself, with a proper notice.
        Cart::empty()
    };

    let mut flow = app.checkout(render::ConsoleSink);

    if !flow.request_preview(app.session(), &cart, address).await {
        return Ok(());
    }

    if yes || prompt_confirm()? {
        if flow.confirm(app.session()).await.is_some() {
            refresh_views(app).await?;
        }
    } else {
        flow.cancel();
        println!("Checkout cancelled");
    }

    Ok(())
}

/// Ask the user to confirm the rendered preview.
fn prompt_confirm() -> io::Result<bool> {
    print!("Confirm order? [y/N] ");
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

/// Re-render the views that go stale after a purchase, the way the store
/// reloads cart, history, and catalog.
async fn refresh_views(app: &AppState) -> Result<(), Box<dyn std::error::Error>> {
    app.order_was_placed().await;

    render::cart(&app.cart().await?);
    render::orders(&app.order_history().await?);
    Ok(())
}

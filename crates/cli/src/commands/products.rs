//! Catalog listing and search.

use tienda_client::state::AppState;

use crate::render;

pub async fn list(app: &AppState, search: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let products = app.products(search).await?;
    render::products(&products);
    Ok(())
}

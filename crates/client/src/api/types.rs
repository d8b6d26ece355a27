//! Wire types for the Tienda API.
//!
//! The API speaks Spanish on the wire (`Nombre`, `Cantidad`, `Precio`, ...);
//! these models rename fields so the rest of the codebase stays in English.
//! PDF documents arrive as base64 (`pdfBase64`) and are decoded to bytes at
//! parse time - a payload that fails to decode is a malformed response.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use tienda_core::{Email, OrderId, OrderStatus, Price, ProductId, Quantity, UserId};

// ─────────────────────────────────────────────────────────────────────────────
// Auth
// ─────────────────────────────────────────────────────────────────────────────

/// Registration request body.
#[derive(Debug, Serialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: Email,
    pub password: String,
    pub address: String,
}

/// Login request body.
#[derive(Debug, Serialize)]
pub struct LoginRequest {
    pub email: Email,
    pub password: String,
}

/// Response from login and registration: a bearer token plus the profile.
#[derive(Debug, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserProfile,
}

/// A user profile as returned by `/auth/profile`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(rename = "Id", default)]
    pub id: Option<UserId>,
    #[serde(rename = "Nombre")]
    pub name: String,
    #[serde(rename = "Correo", default)]
    pub email: Option<String>,
    /// Saved shipping address; the checkout flow falls back to this when no
    /// address is supplied.
    #[serde(rename = "Direccion", default)]
    pub address: Option<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Products
// ─────────────────────────────────────────────────────────────────────────────

/// A product in the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    #[serde(rename = "Id")]
    pub id: ProductId,
    #[serde(rename = "Nombre")]
    pub name: String,
    #[serde(rename = "Precio")]
    pub price: Price,
    #[serde(rename = "Descripcion", default)]
    pub description: Option<String>,
    #[serde(rename = "Stock", default)]
    pub stock: Option<i64>,
    #[serde(rename = "ImagenUrl", default)]
    pub image_url: Option<String>,
}

impl Product {
    /// Whether the product can currently be added to a cart.
    ///
    /// A product with no reported stock level is treated as available, the
    /// way the store renders it.
    #[must_use]
    pub fn in_stock(&self) -> bool {
        self.stock.is_none_or(|s| s > 0)
    }
}

/// `/products` returns either a bare array or `{"items": [...]}`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ProductsResponse {
    List(Vec<Product>),
    Wrapped { items: Vec<Product> },
}

impl ProductsResponse {
    /// Flatten to the product list regardless of envelope shape.
    #[must_use]
    pub fn into_items(self) -> Vec<Product> {
        match self {
            Self::List(items) | Self::Wrapped { items } => items,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Cart
// ─────────────────────────────────────────────────────────────────────────────

/// One cart line as the API reports it.
#[derive(Debug, Clone, Deserialize)]
pub struct CartItem {
    #[serde(rename = "ProductoId")]
    pub product_id: ProductId,
    #[serde(rename = "Nombre")]
    pub name: String,
    #[serde(rename = "Precio")]
    pub unit_price: Price,
    #[serde(rename = "Cantidad")]
    pub quantity: Quantity,
    #[serde(rename = "ImagenUrl", default)]
    pub image_url: Option<String>,
}

/// Body for `POST /cart`.
#[derive(Debug, Serialize)]
pub struct AddToCartRequest {
    #[serde(rename = "productId")]
    pub product_id: ProductId,
    pub quantity: u32,
}

/// Body for `PUT /cart/{productId}`.
#[derive(Debug, Serialize)]
pub struct UpdateCartRequest {
    pub quantity: u32,
}

// ─────────────────────────────────────────────────────────────────────────────
// Orders
// ─────────────────────────────────────────────────────────────────────────────

/// Body for `POST /orders/preview` and `POST /orders`.
#[derive(Debug, Serialize)]
pub struct OrderRequest {
    pub address: String,
}

/// One line of an order preview.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PreviewItem {
    #[serde(rename = "Nombre")]
    pub name: String,
    #[serde(rename = "Cantidad")]
    pub quantity: Quantity,
    #[serde(rename = "Precio")]
    pub unit_price: Price,
}

/// A server-computed, unsaved projection of what an order would be.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderPreview {
    pub total: Price,
    pub items: Vec<PreviewItem>,
    /// Rendered receipt, decoded from `pdfBase64`.
    #[serde(rename = "pdfBase64", deserialize_with = "decode_base64")]
    pub document: Vec<u8>,
}

/// The result of committing a preview.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderConfirmation {
    #[serde(rename = "orderId")]
    pub order_id: OrderId,
    /// Final receipt, decoded from `pdfBase64`.
    #[serde(rename = "pdfBase64", deserialize_with = "decode_base64")]
    pub document: Vec<u8>,
}

/// One order in `/orders/history`.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderSummary {
    #[serde(rename = "Id")]
    pub id: OrderId,
    #[serde(rename = "FechaPedido")]
    pub placed_at: DateTime<Utc>,
    #[serde(rename = "Total")]
    pub total: Price,
    #[serde(rename = "Estado")]
    pub status: OrderStatus,
}

/// Full detail of one order.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderDetail {
    #[serde(rename = "Items")]
    pub items: Vec<OrderDetailItem>,
    #[serde(rename = "Total")]
    pub total: Price,
    #[serde(rename = "DireccionEnvio")]
    pub shipping_address: String,
    #[serde(rename = "hasInvoice", default)]
    pub has_invoice: bool,
}

/// One line of an order detail, with its product reference.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderDetailItem {
    #[serde(rename = "Precio")]
    pub unit_price: Price,
    #[serde(rename = "Cantidad")]
    pub quantity: Quantity,
    #[serde(rename = "Productos")]
    pub product: ProductRef,
}

/// The product fields embedded in an order detail line.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductRef {
    #[serde(rename = "Nombre")]
    pub name: String,
    #[serde(rename = "ImagenUrl", default)]
    pub image_url: Option<String>,
}

/// Response from `/orders/{id}/invoice`.
#[derive(Debug, Clone, Deserialize)]
pub struct Invoice {
    #[serde(rename = "pdfBase64", deserialize_with = "decode_base64")]
    pub document: Vec<u8>,
    #[serde(default)]
    pub filename: Option<String>,
}

/// Error body the API sends alongside non-success statuses.
#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    pub message: Option<String>,
}

fn decode_base64<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    let encoded = String::deserialize(deserializer)?;
    BASE64
        .decode(encoded.as_bytes())
        .map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_products_from_bare_array() {
        let json = r#"[{"Id": 7, "Nombre": "Widget", "Precio": 9990, "Stock": 3}]"#;
        let products: ProductsResponse = serde_json::from_str(json).unwrap();
        let products = products.into_items();
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].id, ProductId::new(7));
        assert_eq!(products[0].price, Price::from_pesos(9990));
        assert!(products[0].in_stock());
    }

    #[test]
    fn deserializes_products_from_items_envelope() {
        let json = r#"{"items": [{"Id": 1, "Nombre": "Taza", "Precio": 4990, "Stock": 0}]}"#;
        let products: ProductsResponse = serde_json::from_str(json).unwrap();
        let products = products.into_items();
        assert_eq!(products.len(), 1);
        assert!(!products[0].in_stock());
    }

    #[test]
    fn deserializes_cart_items() {
        let json = r#"[{"ProductoId": 7, "Nombre": "Widget", "Precio": 9990, "Cantidad": 2}]"#;
        let items: Vec<CartItem> = serde_json::from_str(json).unwrap();
        assert_eq!(items[0].quantity.get(), 2);
        assert_eq!(items[0].unit_price, Price::from_pesos(9990));
    }

    #[test]
    fn deserializes_preview_and_decodes_document() {
        let json = r#"{
            "total": 19980,
            "items": [{"Nombre": "Widget", "Cantidad": 2, "Precio": 9990}],
            "pdfBase64": "JVBERi0="
        }"#;
        let preview: OrderPreview = serde_json::from_str(json).unwrap();
        assert_eq!(preview.total, Price::from_pesos(19980));
        assert_eq!(preview.document, b"%PDF-");
    }

    #[test]
    fn rejects_malformed_document_payloads() {
        let json = r#"{"total": 1, "items": [], "pdfBase64": "not base64!!"}"#;
        assert!(serde_json::from_str::<OrderPreview>(json).is_err());
    }

    #[test]
    fn deserializes_confirmation() {
        let json = r#"{"orderId": 55, "pdfBase64": "JVBERi0="}"#;
        let confirmation: OrderConfirmation = serde_json::from_str(json).unwrap();
        assert_eq!(confirmation.order_id, OrderId::new(55));
        assert_eq!(confirmation.document, b"%PDF-");
    }

    #[test]
    fn deserializes_order_history_and_detail() {
        let summary: OrderSummary = serde_json::from_str(
            r#"{"Id": 3, "FechaPedido": "2026-08-01T12:30:00Z", "Total": 19980, "Estado": "Enviado"}"#,
        )
        .unwrap();
        assert_eq!(summary.status, OrderStatus::Shipped);

        let detail: OrderDetail = serde_json::from_str(
            r#"{
                "Items": [{"Precio": 9990, "Cantidad": 2, "Productos": {"Nombre": "Widget"}}],
                "Total": 19980,
                "DireccionEnvio": "Main 123"
            }"#,
        )
        .unwrap();
        assert_eq!(detail.shipping_address, "Main 123");
        assert!(!detail.has_invoice);
    }
}

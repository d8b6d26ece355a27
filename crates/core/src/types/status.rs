//! Order status as reported by the Tienda API.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle status of a placed order.
///
/// The API reports statuses as Spanish strings in the `Estado` field
/// (`"Pendiente"`, `"Enviado"`, ...). Unrecognized values are preserved in
/// [`OrderStatus::Other`] rather than failing deserialization, since the
/// server may grow states the client has not seen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OrderStatus {
    Pending,
    Paid,
    Shipped,
    Delivered,
    Cancelled,
    /// A status string this client does not know about.
    Other(String),
}

impl OrderStatus {
    /// The wire value (`Estado`) for this status.
    #[must_use]
    pub fn as_estado(&self) -> &str {
        match self {
            Self::Pending => "Pendiente",
            Self::Paid => "Pagado",
            Self::Shipped => "Enviado",
            Self::Delivered => "Entregado",
            Self::Cancelled => "Cancelado",
            Self::Other(s) => s,
        }
    }
}

impl From<String> for OrderStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "Pendiente" => Self::Pending,
            "Pagado" => Self::Paid,
            "Enviado" => Self::Shipped,
            "Entregado" => Self::Delivered,
            "Cancelado" => Self::Cancelled,
            _ => Self::Other(s),
        }
    }
}

impl From<OrderStatus> for String {
    fn from(status: OrderStatus) -> Self {
        status.as_estado().to_owned()
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_estado())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_estados_map_to_variants() {
        let status: OrderStatus = serde_json::from_str("\"Pendiente\"").unwrap();
        assert_eq!(status, OrderStatus::Pending);
        assert_eq!(serde_json::to_string(&status).unwrap(), "\"Pendiente\"");
    }

    #[test]
    fn unknown_estados_are_preserved() {
        let status: OrderStatus = serde_json::from_str("\"En bodega\"").unwrap();
        assert_eq!(status, OrderStatus::Other("En bodega".to_owned()));
        assert_eq!(status.to_string(), "En bodega");
    }
}

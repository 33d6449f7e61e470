//! Order domain model

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    #[serde(rename = "Pendiente")]
    Pending,
    #[serde(rename = "Procesando")]
    Processing,
    #[serde(rename = "Enviado")]
    Shipped,
    #[serde(rename = "Entregado")]
    Delivered,
    #[serde(rename = "Cancelado")]
    Cancelled,
}

/// One order line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    /// `None` when the referenced product could not be resolved
    #[serde(default, deserialize_with = "super::optional_ref")]
    pub product_id: Option<String>,
    pub quantity: f64,
}

impl OrderItem {
    pub fn new(product_id: impl Into<String>, quantity: f64) -> Self {
        Self {
            product_id: Some(product_id.into()),
            quantity,
        }
    }
}

/// Buyer details captured by the public store checkout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerDetails {
    pub name: String,
    pub last_name: String,
    pub address: String,
    pub email: String,
    pub id_card: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub entity_id: String,
    /// `None` when the referenced user could not be resolved
    #[serde(default, deserialize_with = "super::optional_ref")]
    pub user_id: Option<String>,
    pub order_date: DateTime<Utc>,
    pub status: OrderStatus,
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub total: Decimal,
    pub items: Vec<OrderItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_details: Option<CustomerDetails>,
}

impl Order {
    pub fn new(
        id: impl Into<String>,
        entity_id: impl Into<String>,
        user_id: impl Into<String>,
        items: Vec<OrderItem>,
        total: Decimal,
    ) -> Self {
        Self {
            id: id.into(),
            entity_id: entity_id.into(),
            user_id: Some(user_id.into()),
            order_date: Utc::now(),
            status: OrderStatus::Pending,
            total,
            items,
            customer_details: None,
        }
    }
}

//! Product domain model

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnitOfMeasure {
    #[serde(rename = "unidades")]
    Units,
    #[serde(rename = "litros")]
    Liters,
    #[serde(rename = "kilogramos")]
    Kilograms,
}

/// Where a product sits in the warehouse
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WarehouseLocation {
    pub warehouse_type: String,
    pub section: String,
    pub row: String,
}

/// An inventory item owned by one entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub entity_id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serial_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inventory_number: Option<String>,
    #[serde(default, deserialize_with = "super::optional_ref")]
    pub category_id: Option<String>,
    pub quantity: f64,
    pub unit_of_measure: UnitOfMeasure,
    #[serde(default)]
    pub location: WarehouseLocation,
    #[serde(default, deserialize_with = "super::optional_ref")]
    pub supplier_id: Option<String>,
    pub added_date: DateTime<Utc>,
    #[serde(default)]
    pub image_url: String,
    /// Base price in USD
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub price: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reorder_point: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    /// Kept as written by the console (date or full timestamp)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_published: Option<bool>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::arbitrary_precision_option"
    )]
    pub store_price: Option<Decimal>,
}

impl Product {
    pub fn new(
        id: impl Into<String>,
        entity_id: impl Into<String>,
        name: impl Into<String>,
        price: Decimal,
        quantity: f64,
    ) -> Self {
        Self {
            id: id.into(),
            entity_id: entity_id.into(),
            name: name.into(),
            sku: None,
            serial_number: None,
            inventory_number: None,
            category_id: None,
            quantity,
            unit_of_measure: UnitOfMeasure::Units,
            location: WarehouseLocation::default(),
            supplier_id: None,
            added_date: Utc::now(),
            image_url: String::new(),
            price,
            reorder_point: None,
            rating: None,
            expiration_date: None,
            is_published: None,
            store_price: None,
        }
    }
}

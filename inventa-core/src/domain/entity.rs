//! Entity (tenant) domain model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Legal form of a tenant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityType {
    #[serde(rename = "TCP")]
    Tcp,
    #[serde(rename = "MyPime")]
    MyPime,
    #[serde(rename = "Empresa Estatal")]
    Estatal,
}

/// A tenant of the console and its store configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entity {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub entity_type: EntityType,
    /// CUP per USD
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub exchange_rate: Decimal,
    pub is_store_enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_logo_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_cover_url: Option<String>,
    /// Percentage added to base prices in the public store
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::arbitrary_precision_option"
    )]
    pub store_price_markup: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_slug: Option<String>,
}

impl Entity {
    pub fn new(id: impl Into<String>, name: impl Into<String>, entity_type: EntityType) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            entity_type,
            exchange_rate: Decimal::ONE,
            is_store_enabled: false,
            store_logo_url: None,
            store_cover_url: None,
            store_price_markup: None,
            store_slug: None,
        }
    }
}

//! Product categories and suppliers

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub entity_id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Supplier {
    pub id: String,
    pub entity_id: String,
    pub name: String,
}

impl Category {
    pub fn new(id: impl Into<String>, entity_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            entity_id: entity_id.into(),
            name: name.into(),
        }
    }
}

impl Supplier {
    pub fn new(id: impl Into<String>, entity_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            entity_id: entity_id.into(),
            name: name.into(),
        }
    }
}

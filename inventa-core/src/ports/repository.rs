//! Repository port - application state abstraction

use serde::{Deserialize, Serialize};

use crate::domain::result::Result;
use crate::domain::{Category, Entity, Order, Product, Supplier, User};

/// A set of records, usually all belonging to one entity
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityRecords {
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub products: Vec<Product>,
    #[serde(default)]
    pub orders: Vec<Order>,
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub suppliers: Vec<Supplier>,
}

impl EntityRecords {
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
            && self.products.is_empty()
            && self.orders.is_empty()
            && self.categories.is_empty()
            && self.suppliers.is_empty()
    }

    /// Only the records whose `entityId` matches
    pub fn for_entity(&self, entity_id: &str) -> EntityRecords {
        EntityRecords {
            users: self
                .users
                .iter()
                .filter(|u| u.entity_id == entity_id)
                .cloned()
                .collect(),
            products: self
                .products
                .iter()
                .filter(|p| p.entity_id == entity_id)
                .cloned()
                .collect(),
            orders: self
                .orders
                .iter()
                .filter(|o| o.entity_id == entity_id)
                .cloned()
                .collect(),
            categories: self
                .categories
                .iter()
                .filter(|c| c.entity_id == entity_id)
                .cloned()
                .collect(),
            suppliers: self
                .suppliers
                .iter()
                .filter(|s| s.entity_id == entity_id)
                .cloned()
                .collect(),
        }
    }
}

/// Application state abstraction
///
/// The export/import services only talk to state through this trait.
/// Implementations (adapters) decide where the records live.
pub trait Repository: Send + Sync {
    // === Entities ===

    /// Get all entities
    fn get_entities(&self) -> Result<Vec<Entity>>;

    /// Get entity by ID
    fn get_entity(&self, id: &str) -> Result<Option<Entity>>;

    /// Add a new entity together with its records, all or nothing.
    /// Fails if the entity id or any record id is already taken.
    fn insert_entity(&self, entity: &Entity, records: EntityRecords) -> Result<()>;

    /// Add a new entity with no records
    fn add_entity(&self, entity: &Entity) -> Result<()> {
        self.insert_entity(entity, EntityRecords::default())
    }

    // === Records ===

    /// Every user, product, order, category and supplier across entities
    fn get_records(&self) -> Result<EntityRecords>;

    /// Records owned by one entity
    fn get_entity_records(&self, entity_id: &str) -> Result<EntityRecords> {
        Ok(self.get_records()?.for_entity(entity_id))
    }

    /// Append records. Fails without change if any id is already taken.
    fn append_records(&self, records: EntityRecords) -> Result<()>;

    /// Delete every record owned by `entity_id`, then append `records`
    ///
    /// Runs as one step: either the old data is fully replaced or nothing
    /// changes.
    fn replace_entity_records(&self, entity_id: &str, records: EntityRecords) -> Result<()>;
}

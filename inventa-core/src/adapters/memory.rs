//! In-memory repository
//!
//! Holds the whole console state behind one lock. The CLI loads it from and
//! saves it to a JSON working file; the core never touches that file itself.

use std::collections::HashSet;
use std::path::Path;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::{Deserialize, Serialize};

use crate::domain::result::{Error, Result};
use crate::domain::{Category, Entity, Order, Product, Supplier, User};
use crate::ports::{EntityRecords, Repository};

/// Serializable copy of the store
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreSnapshot {
    #[serde(default)]
    pub entities: Vec<Entity>,
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

impl StoreSnapshot {
    /// Read a snapshot file. A missing file is an empty store.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    fn records(&self) -> EntityRecords {
        EntityRecords {
            users: self.users.clone(),
            products: self.products.clone(),
            orders: self.orders.clone(),
            categories: self.categories.clone(),
            suppliers: self.suppliers.clone(),
        }
    }

    fn taken_ids(&self) -> HashSet<&str> {
        self.users
            .iter()
            .map(|u| u.id.as_str())
            .chain(self.products.iter().map(|p| p.id.as_str()))
            .chain(self.orders.iter().map(|o| o.id.as_str()))
            .chain(self.categories.iter().map(|c| c.id.as_str()))
            .chain(self.suppliers.iter().map(|s| s.id.as_str()))
            .collect()
    }

    fn check_free(&self, records: &EntityRecords) -> Result<()> {
        let taken = self.taken_ids();
        let incoming = records
            .users
            .iter()
            .map(|u| u.id.as_str())
            .chain(records.products.iter().map(|p| p.id.as_str()))
            .chain(records.orders.iter().map(|o| o.id.as_str()))
            .chain(records.categories.iter().map(|c| c.id.as_str()))
            .chain(records.suppliers.iter().map(|s| s.id.as_str()));

        let mut seen = HashSet::new();
        for id in incoming {
            if taken.contains(id) || !seen.insert(id) {
                return Err(Error::validation(format!("record id {} is already in use", id)));
            }
        }
        Ok(())
    }

    fn remove_entity_records(&mut self, entity_id: &str) {
        self.users.retain(|u| u.entity_id != entity_id);
        self.products.retain(|p| p.entity_id != entity_id);
        self.orders.retain(|o| o.entity_id != entity_id);
        self.categories.retain(|c| c.entity_id != entity_id);
        self.suppliers.retain(|s| s.entity_id != entity_id);
    }

    fn extend(&mut self, records: EntityRecords) {
        self.users.extend(records.users);
        self.products.extend(records.products);
        self.orders.extend(records.orders);
        self.categories.extend(records.categories);
        self.suppliers.extend(records.suppliers);
    }
}

/// Repository over a [`StoreSnapshot`] held in memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<StoreSnapshot>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: StoreSnapshot) -> Self {
        Self {
            state: RwLock::new(snapshot),
        }
    }

    /// Copy of the current state
    pub fn snapshot(&self) -> Result<StoreSnapshot> {
        Ok(self.read()?.clone())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, StoreSnapshot>> {
        self.state
            .read()
            .map_err(|e| Error::Io(std::io::Error::other(format!("Lock poisoned: {}", e))))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, StoreSnapshot>> {
        self.state
            .write()
            .map_err(|e| Error::Io(std::io::Error::other(format!("Lock poisoned: {}", e))))
    }
}

impl Repository for MemoryStore {
    fn get_entities(&self) -> Result<Vec<Entity>> {
        Ok(self.read()?.entities.clone())
    }

    fn get_entity(&self, id: &str) -> Result<Option<Entity>> {
        Ok(self.read()?.entities.iter().find(|e| e.id == id).cloned())
    }

    fn insert_entity(&self, entity: &Entity, records: EntityRecords) -> Result<()> {
        let mut state = self.write()?;
        if state.entities.iter().any(|e| e.id == entity.id) {
            return Err(Error::validation(format!(
                "entity id {} is already in use",
                entity.id
            )));
        }
        state.check_free(&records)?;
        state.entities.push(entity.clone());
        state.extend(records);
        Ok(())
    }

    fn get_records(&self) -> Result<EntityRecords> {
        Ok(self.read()?.records())
    }

    fn append_records(&self, records: EntityRecords) -> Result<()> {
        let mut state = self.write()?;
        state.check_free(&records)?;
        state.extend(records);
        Ok(())
    }

    fn replace_entity_records(&self, entity_id: &str, records: EntityRecords) -> Result<()> {
        let mut state = self.write()?;
        if !state.entities.iter().any(|e| e.id == entity_id) {
            return Err(Error::not_found(format!("entity {}", entity_id)));
        }

        // Check against the state as it will be after deletion
        let mut next = state.clone();
        next.remove_entity_records(entity_id);
        next.check_free(&records)?;
        next.extend(records);
        *state = next;
        Ok(())
    }
}

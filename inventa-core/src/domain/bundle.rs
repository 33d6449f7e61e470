//! Export bundle - the plaintext payload inside an envelope

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::result::{Error, Result};
use super::{Category, Entity, Order, Product, Supplier, User};

/// Maximum number of violations spelled out in a validation error
const MAX_REPORTED_VIOLATIONS: usize = 5;

/// One entity and every record it owns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportBundle {
    pub entity: Entity,
    pub users: Vec<User>,
    pub products: Vec<Product>,
    pub orders: Vec<Order>,
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub suppliers: Vec<Supplier>,
}

/// Record counts, used for reporting
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleCounts {
    pub users: usize,
    pub products: usize,
    pub orders: usize,
    pub categories: usize,
    pub suppliers: usize,
}

impl ExportBundle {
    pub fn new(entity: Entity) -> Self {
        Self {
            entity,
            users: Vec::new(),
            products: Vec::new(),
            orders: Vec::new(),
            categories: Vec::new(),
            suppliers: Vec::new(),
        }
    }

    pub fn counts(&self) -> BundleCounts {
        BundleCounts {
            users: self.users.len(),
            products: self.products.len(),
            orders: self.orders.len(),
            categories: self.categories.len(),
            suppliers: self.suppliers.len(),
        }
    }

    /// List every broken invariant: foreign `entityId`s and references that
    /// do not resolve inside the bundle.
    pub fn violations(&self) -> Vec<String> {
        let entity_id = self.entity.id.as_str();
        let mut violations = Vec::new();

        let owned = self
            .users
            .iter()
            .map(|u| ("user", u.id.as_str(), u.entity_id.as_str()))
            .chain(
                self.products
                    .iter()
                    .map(|p| ("product", p.id.as_str(), p.entity_id.as_str())),
            )
            .chain(
                self.orders
                    .iter()
                    .map(|o| ("order", o.id.as_str(), o.entity_id.as_str())),
            )
            .chain(
                self.categories
                    .iter()
                    .map(|c| ("category", c.id.as_str(), c.entity_id.as_str())),
            )
            .chain(
                self.suppliers
                    .iter()
                    .map(|s| ("supplier", s.id.as_str(), s.entity_id.as_str())),
            );
        for (kind, id, owner) in owned {
            if owner != entity_id {
                violations.push(format!(
                    "{} {} belongs to entity {}, not {}",
                    kind, id, owner, entity_id
                ));
            }
        }

        let user_ids: HashSet<&str> = self.users.iter().map(|u| u.id.as_str()).collect();
        let product_ids: HashSet<&str> = self.products.iter().map(|p| p.id.as_str()).collect();
        let category_ids: HashSet<&str> = self.categories.iter().map(|c| c.id.as_str()).collect();
        let supplier_ids: HashSet<&str> = self.suppliers.iter().map(|s| s.id.as_str()).collect();

        for order in &self.orders {
            match order.user_id.as_deref() {
                Some(user_id) if !user_ids.contains(user_id) => violations.push(format!(
                    "order {} references missing user {}",
                    order.id, user_id
                )),
                None => violations.push(format!("order {} has no user", order.id)),
                _ => {}
            }
            for item in &order.items {
                match item.product_id.as_deref() {
                    Some(product_id) if !product_ids.contains(product_id) => {
                        violations.push(format!(
                            "order {} references missing product {}",
                            order.id, product_id
                        ))
                    }
                    None => violations.push(format!("order {} has an item without product", order.id)),
                    _ => {}
                }
            }
        }

        for product in &self.products {
            if let Some(category_id) = product.category_id.as_deref() {
                if !category_ids.contains(category_id) {
                    violations.push(format!(
                        "product {} references missing category {}",
                        product.id, category_id
                    ));
                }
            }
            if let Some(supplier_id) = product.supplier_id.as_deref() {
                if !supplier_ids.contains(supplier_id) {
                    violations.push(format!(
                        "product {} references missing supplier {}",
                        product.id, supplier_id
                    ));
                }
            }
        }

        violations
    }

    /// Check ownership and referential closure
    pub fn validate(&self) -> Result<()> {
        let violations = self.violations();
        if violations.is_empty() {
            return Ok(());
        }

        let mut msg = violations
            .iter()
            .take(MAX_REPORTED_VIOLATIONS)
            .cloned()
            .collect::<Vec<_>>()
            .join("; ");
        if violations.len() > MAX_REPORTED_VIOLATIONS {
            msg.push_str(&format!(
                " (and {} more)",
                violations.len() - MAX_REPORTED_VIOLATIONS
            ));
        }
        Err(Error::validation(msg))
    }
}

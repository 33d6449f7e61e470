//! Id generator port

use serde::{Deserialize, Serialize};

/// Record kind an id is minted for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdKind {
    Entity,
    User,
    Product,
    Order,
    Category,
    Supplier,
}

impl IdKind {
    /// Prefix the console uses for ids of this kind
    pub fn prefix(&self) -> &'static str {
        match self {
            IdKind::Entity => "ent",
            IdKind::User => "user",
            IdKind::Product => "prod",
            IdKind::Order => "ord",
            IdKind::Category => "cat",
            IdKind::Supplier => "sup",
        }
    }
}

/// Source of fresh record ids
///
/// Implementations must never hand out the same id twice within a process,
/// however fast they are called.
pub trait IdGenerator: Send + Sync {
    fn next_id(&self, kind: IdKind) -> String;
}

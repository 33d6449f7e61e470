//! Core domain entities
//!
//! Tenant records, the plaintext export bundle and the encrypted envelope.
//! These are pure data structures with validation logic - no I/O.

mod bundle;
mod catalog;
mod encryption;
mod entity;
mod order;
mod product;
pub mod result;
mod user;

pub use bundle::{BundleCounts, ExportBundle};
pub use catalog::{Category, Supplier};
pub use encryption::{
    Argon2Params, DecodedEnvelope, EncryptedEnvelope, KdfParams, DEFAULT_PBKDF2_ITERATIONS, IV_LEN, SALT_LEN,
    TAG_LEN,
};
pub use entity::{Entity, EntityType};
pub use order::{CustomerDetails, Order, OrderItem, OrderStatus};
pub use product::{Product, UnitOfMeasure, WarehouseLocation};
pub use user::{User, UserRole};

use serde::{Deserialize, Deserializer};

/// Read an optional record reference, treating `""` as unset.
///
/// Older exports wrote an empty string where a reference could not be
/// resolved; those must not survive as ids.
pub(crate) fn optional_ref<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.is_empty()))
}

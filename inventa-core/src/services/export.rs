//! Export service - build and encrypt an entity backup

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::result::{Error, Result};
use crate::domain::{BundleCounts, Category, Entity, ExportBundle, Order, Product, Supplier, User};
use crate::ports::Repository;

use super::codec::{CancelFlag, Codec};

/// Assemble the bundle for one entity from the full record collections
///
/// Pure: filters by `entityId`, clones the matches, keeps input order.
pub fn build_export_bundle(
    entity: &Entity,
    users: &[User],
    products: &[Product],
    orders: &[Order],
) -> ExportBundle {
    build_export_bundle_with_catalog(entity, users, products, orders, &[], &[])
}

/// [`build_export_bundle`] including categories and suppliers
pub fn build_export_bundle_with_catalog(
    entity: &Entity,
    users: &[User],
    products: &[Product],
    orders: &[Order],
    categories: &[Category],
    suppliers: &[Supplier],
) -> ExportBundle {
    let id = entity.id.as_str();
    ExportBundle {
        entity: entity.clone(),
        users: users.iter().filter(|u| u.entity_id == id).cloned().collect(),
        products: products
            .iter()
            .filter(|p| p.entity_id == id)
            .cloned()
            .collect(),
        orders: orders.iter().filter(|o| o.entity_id == id).cloned().collect(),
        categories: categories
            .iter()
            .filter(|c| c.entity_id == id)
            .cloned()
            .collect(),
        suppliers: suppliers
            .iter()
            .filter(|s| s.entity_id == id)
            .cloned()
            .collect(),
    }
}

/// `<entity-name>_backup_<YYYY-MM-DD>.json`
///
/// Path separators, control characters and characters Windows rejects are
/// replaced with `_`.
pub fn backup_file_name(entity_name: &str, date: NaiveDate) -> String {
    let safe: String = entity_name
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let safe = if safe.is_empty() || safe.chars().all(|c| c == '.') {
        "entity".to_string()
    } else {
        safe
    };
    format!("{}_backup_{}.json", safe, date.format("%Y-%m-%d"))
}

/// An encrypted backup ready to be written out
#[derive(Debug, Clone, Serialize)]
pub struct ExportArtifact {
    pub entity_id: String,
    pub file_name: String,
    /// Envelope JSON
    #[serde(skip)]
    pub contents: String,
    pub counts: BundleCounts,
    /// Broken references found in the exported data (non-strict mode)
    pub warnings: Vec<String>,
}

/// Export service - entity backups
pub struct ExportService {
    codec: Codec,
    strict: bool,
}

impl ExportService {
    /// `strict` refuses to export bundles that fail validation
    pub fn new(codec: Codec, strict: bool) -> Self {
        Self { codec, strict }
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Build the bundle for `entity_id` from the repository
    pub fn bundle_for(&self, repository: &dyn Repository, entity_id: &str) -> Result<ExportBundle> {
        let entity = repository
            .get_entity(entity_id)?
            .ok_or_else(|| Error::not_found(format!("entity {}", entity_id)))?;
        let records = repository.get_entity_records(entity_id)?;
        Ok(build_export_bundle_with_catalog(
            &entity,
            &records.users,
            &records.products,
            &records.orders,
            &records.categories,
            &records.suppliers,
        ))
    }

    /// Encrypt an already built bundle
    pub fn seal(
        &self,
        bundle: &ExportBundle,
        password: &str,
        today: NaiveDate,
        cancel: &CancelFlag,
    ) -> Result<ExportArtifact> {
        let warnings = if self.strict {
            bundle.validate()?;
            Vec::new()
        } else {
            bundle.violations()
        };

        let contents = self.codec.encrypt_cancellable(bundle, password, cancel)?;
        Ok(ExportArtifact {
            entity_id: bundle.entity.id.clone(),
            file_name: backup_file_name(&bundle.entity.name, today),
            contents,
            counts: bundle.counts(),
            warnings,
        })
    }

    /// Build and encrypt the backup of one entity
    pub fn export_entity(
        &self,
        repository: &dyn Repository,
        entity_id: &str,
        password: &str,
    ) -> Result<ExportArtifact> {
        let bundle = self.bundle_for(repository, entity_id)?;
        self.seal(
            &bundle,
            password,
            chrono::Local::now().date_naive(),
            &CancelFlag::new(),
        )
    }
}

//! Import service - decrypt an entity backup and merge it
//!
//! Two modes:
//! - new entity: every id is regenerated and every cross-reference rewritten
//!   through an old-id -> new-id table, so the result cannot collide with any
//!   other tenant's records
//! - replace: ids are kept, only `entityId` is rewritten; the caller drops the
//!   target entity's old records first

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::domain::result::{Error, Result};
use crate::domain::{BundleCounts, DecodedEnvelope, Entity, ExportBundle, Order, Product};
use crate::ports::{EntityRecords, IdGenerator, IdKind, Repository};

use super::codec::{CancelFlag, Codec};
use super::credentials;

/// Legacy id prefix the web console gave entity administrators
const LEGACY_ADMIN_PREFIX: &str = "user_admin";

/// Kind of record a reference points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferenceKind {
    User,
    Product,
    Category,
    Supplier,
}

/// A reference whose target is not in the bundle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DanglingReference {
    /// Source id of the order or product holding the reference
    pub record_id: String,
    pub kind: ReferenceKind,
    pub missing_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportReport {
    pub dangling: Vec<DanglingReference>,
}

impl ImportReport {
    /// True when every reference resolved
    pub fn is_complete(&self) -> bool {
        self.dangling.is_empty()
    }

    pub fn count(&self, kind: ReferenceKind) -> usize {
        self.dangling.iter().filter(|d| d.kind == kind).count()
    }

    fn push(&mut self, record_id: &str, kind: ReferenceKind, missing_id: &str) {
        self.dangling.push(DanglingReference {
            record_id: record_id.to_string(),
            kind,
            missing_id: missing_id.to_string(),
        });
    }
}

/// Records ready to be merged into application state
#[derive(Debug, Clone, PartialEq)]
pub struct ImportOutcome {
    /// The new entity; `None` in replace mode
    pub entity: Option<Entity>,
    pub records: EntityRecords,
    pub report: ImportReport,
}

/// Where imported data goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportMode {
    NewEntity,
    Replace { target_entity_id: String },
}

/// Progress of one import operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportStage {
    Decrypting,
    Remapping,
    Merging,
    Ready,
    Failed,
}

/// Result of a completed import
#[derive(Debug, Clone, Serialize)]
pub struct ImportSummary {
    pub mode: &'static str,
    pub entity_id: String,
    pub entity_name: String,
    pub counts: BundleCounts,
    pub report: ImportReport,
}

/// Old-id -> new-id table. The first record with a given source id wins.
#[derive(Debug, Default)]
struct IdMap(HashMap<String, String>);

impl IdMap {
    fn insert(&mut self, old: &str, new: &str) {
        self.0
            .entry(old.to_string())
            .or_insert_with(|| new.to_string());
    }

    fn get(&self, old: &str) -> Option<&String> {
        self.0.get(old)
    }
}

/// Id source that never hands out an id already present in the bundle
struct FreshIds<'a> {
    ids: &'a dyn IdGenerator,
    source: HashSet<String>,
}

impl<'a> FreshIds<'a> {
    fn new(ids: &'a dyn IdGenerator, bundle: &ExportBundle) -> Self {
        let source = std::iter::once(&bundle.entity.id)
            .chain(bundle.users.iter().map(|u| &u.id))
            .chain(bundle.products.iter().map(|p| &p.id))
            .chain(bundle.orders.iter().map(|o| &o.id))
            .chain(bundle.categories.iter().map(|c| &c.id))
            .chain(bundle.suppliers.iter().map(|s| &s.id))
            .cloned()
            .collect();
        Self { ids, source }
    }

    /// Terminates because the generator never repeats an id.
    fn next(&self, kind: IdKind) -> String {
        loop {
            let id = self.ids.next_id(kind);
            if !self.source.contains(&id) {
                return id;
            }
        }
    }
}

/// Rewrite one optional reference through `map`
///
/// Unresolved references become `None` and are added to the report.
fn remap_ref(
    reference: Option<String>,
    map: &IdMap,
    report: &mut ImportReport,
    record_id: &str,
    kind: ReferenceKind,
) -> Option<String> {
    let old = reference?;
    match map.get(&old) {
        Some(new) => Some(new.clone()),
        None => {
            report.push(record_id, kind, &old);
            None
        }
    }
}

/// Rebuild a bundle as a brand-new entity with fresh ids everywhere
///
/// The returned records share no id with the bundle, and no two source
/// records share a new id.
pub fn import_as_new_entity(bundle: ExportBundle, ids: &dyn IdGenerator) -> ImportOutcome {
    let ids = FreshIds::new(ids, &bundle);
    let ExportBundle {
        mut entity,
        users,
        products,
        orders,
        categories,
        suppliers,
    } = bundle;

    let entity_id = ids.next(IdKind::Entity);
    entity.id = entity_id.clone();

    let mut report = ImportReport::default();
    let mut user_ids = IdMap::default();
    let mut product_ids = IdMap::default();
    let mut category_ids = IdMap::default();
    let mut supplier_ids = IdMap::default();

    let categories = categories
        .into_iter()
        .map(|mut c| {
            let new_id = ids.next(IdKind::Category);
            category_ids.insert(&c.id, &new_id);
            c.id = new_id;
            c.entity_id = entity_id.clone();
            c
        })
        .collect();

    let suppliers = suppliers
        .into_iter()
        .map(|mut s| {
            let new_id = ids.next(IdKind::Supplier);
            supplier_ids.insert(&s.id, &new_id);
            s.id = new_id;
            s.entity_id = entity_id.clone();
            s
        })
        .collect();

    let users = users
        .into_iter()
        .map(|mut u| {
            let new_id = ids.next(IdKind::User);
            user_ids.insert(&u.id, &new_id);
            u.id = new_id;
            u.entity_id = entity_id.clone();
            u
        })
        .collect();

    let products: Vec<Product> = products
        .into_iter()
        .map(|mut p| {
            let source_id = std::mem::take(&mut p.id);
            let new_id = ids.next(IdKind::Product);
            product_ids.insert(&source_id, &new_id);
            p.category_id = remap_ref(
                p.category_id.take(),
                &category_ids,
                &mut report,
                &source_id,
                ReferenceKind::Category,
            );
            p.supplier_id = remap_ref(
                p.supplier_id.take(),
                &supplier_ids,
                &mut report,
                &source_id,
                ReferenceKind::Supplier,
            );
            p.id = new_id;
            p.entity_id = entity_id.clone();
            p
        })
        .collect();

    let orders: Vec<Order> = orders
        .into_iter()
        .map(|mut o| {
            let source_id = std::mem::take(&mut o.id);
            o.user_id = remap_ref(
                o.user_id.take(),
                &user_ids,
                &mut report,
                &source_id,
                ReferenceKind::User,
            );
            for item in &mut o.items {
                item.product_id = remap_ref(
                    item.product_id.take(),
                    &product_ids,
                    &mut report,
                    &source_id,
                    ReferenceKind::Product,
                );
            }
            o.id = ids.next(IdKind::Order);
            o.entity_id = entity_id.clone();
            o
        })
        .collect();

    ImportOutcome {
        entity: Some(entity),
        records: EntityRecords {
            users,
            products,
            orders,
            categories,
            suppliers,
        },
        report,
    }
}

/// Move every record of a bundle under `target_entity_id`, keeping ids
///
/// Pure and idempotent. References are left untouched; unresolved ones are
/// only reported.
pub fn import_replacing_entity(bundle: ExportBundle, target_entity_id: &str) -> ImportOutcome {
    let report = dangling_references(&bundle);
    let ExportBundle {
        users,
        products,
        orders,
        categories,
        suppliers,
        ..
    } = bundle;

    let target = target_entity_id.to_string();
    let records = EntityRecords {
        users: users
            .into_iter()
            .map(|mut u| {
                u.entity_id = target.clone();
                u
            })
            .collect(),
        products: products
            .into_iter()
            .map(|mut p| {
                p.entity_id = target.clone();
                p
            })
            .collect(),
        orders: orders
            .into_iter()
            .map(|mut o| {
                o.entity_id = target.clone();
                o
            })
            .collect(),
        categories: categories
            .into_iter()
            .map(|mut c| {
                c.entity_id = target.clone();
                c
            })
            .collect(),
        suppliers: suppliers
            .into_iter()
            .map(|mut s| {
                s.entity_id = target.clone();
                s
            })
            .collect(),
    };

    ImportOutcome {
        entity: None,
        records,
        report,
    }
}

/// References in `bundle` that do not resolve inside it
pub fn dangling_references(bundle: &ExportBundle) -> ImportReport {
    let users: HashSet<&str> = bundle.users.iter().map(|u| u.id.as_str()).collect();
    let products: HashSet<&str> = bundle.products.iter().map(|p| p.id.as_str()).collect();
    let categories: HashSet<&str> = bundle.categories.iter().map(|c| c.id.as_str()).collect();
    let suppliers: HashSet<&str> = bundle.suppliers.iter().map(|s| s.id.as_str()).collect();

    let mut report = ImportReport::default();
    for p in &bundle.products {
        if let Some(id) = p.category_id.as_deref().filter(|id| !categories.contains(id)) {
            report.push(&p.id, ReferenceKind::Category, id);
        }
        if let Some(id) = p.supplier_id.as_deref().filter(|id| !suppliers.contains(id)) {
            report.push(&p.id, ReferenceKind::Supplier, id);
        }
    }
    for o in &bundle.orders {
        if let Some(id) = o.user_id.as_deref().filter(|id| !users.contains(id)) {
            report.push(&o.id, ReferenceKind::User, id);
        }
        for item in &o.items {
            if let Some(id) = item.product_id.as_deref().filter(|id| !products.contains(id)) {
                report.push(&o.id, ReferenceKind::Product, id);
            }
        }
    }
    report
}

/// Upgrade records written by the browser console
///
/// Cleartext passwords are replaced by Argon2 hashes, and the admin flag is
/// recovered from the legacy id prefix on files that predate `isAdmin`.
/// Returns the number of passwords hashed.
pub fn normalize_legacy(bundle: &mut ExportBundle) -> Result<usize> {
    let mut hashed = 0;
    for user in &mut bundle.users {
        if user.is_admin.is_none() {
            user.is_admin = Some(user.id.starts_with(LEGACY_ADMIN_PREFIX));
        }
        if let Some(cleartext) = user.legacy_password.take() {
            if user.password_hash.is_none() {
                user.password_hash = Some(credentials::hash_password(&cleartext)?);
                hashed += 1;
            }
        }
    }
    Ok(hashed)
}

/// Import service: decrypt, remap and merge
pub struct ImportService {
    codec: Codec,
}

impl ImportService {
    pub fn new(codec: Codec) -> Self {
        Self { codec }
    }

    /// Decrypt an envelope into a normalized bundle
    pub fn decrypt_bundle(&self, envelope_text: &str, password: &str) -> Result<ExportBundle> {
        self.decrypt_bundle_cancellable(envelope_text, password, &CancelFlag::new())
    }

    pub fn decrypt_bundle_cancellable(
        &self,
        envelope_text: &str,
        password: &str,
        cancel: &CancelFlag,
    ) -> Result<ExportBundle> {
        let mut bundle: ExportBundle = self
            .codec
            .decrypt_cancellable(envelope_text, password, cancel)?;
        normalize_legacy(&mut bundle)?;
        Ok(bundle)
    }

    /// Same as `decrypt_bundle`, for an envelope the caller already decoded
    pub fn decrypt_decoded_bundle(
        &self,
        envelope: &DecodedEnvelope,
        password: &str,
    ) -> Result<ExportBundle> {
        let mut bundle: ExportBundle =
            self.codec
                .decrypt_decoded(envelope, password, &CancelFlag::new())?;
        normalize_legacy(&mut bundle)?;
        Ok(bundle)
    }

    /// Remap a decrypted bundle for `mode` without touching any state
    pub fn prepare(
        &self,
        bundle: ExportBundle,
        mode: &ImportMode,
        ids: &dyn IdGenerator,
    ) -> ImportOutcome {
        match mode {
            ImportMode::NewEntity => import_as_new_entity(bundle, ids),
            ImportMode::Replace { target_entity_id } => {
                import_replacing_entity(bundle, target_entity_id)
            }
        }
    }

    /// Full pipeline: decrypt, remap, merge into `repository`
    pub fn import(
        &self,
        repository: &dyn Repository,
        envelope_text: &str,
        password: &str,
        mode: &ImportMode,
        ids: &dyn IdGenerator,
    ) -> Result<ImportSummary> {
        self.import_with_progress(repository, envelope_text, password, mode, ids, &mut |_| {})
    }

    /// [`ImportService::import`], reporting each stage to `progress`
    pub fn import_with_progress(
        &self,
        repository: &dyn Repository,
        envelope_text: &str,
        password: &str,
        mode: &ImportMode,
        ids: &dyn IdGenerator,
        progress: &mut dyn FnMut(ImportStage),
    ) -> Result<ImportSummary> {
        let result = self.run_import(repository, envelope_text, password, mode, ids, progress);
        progress(if result.is_ok() {
            ImportStage::Ready
        } else {
            ImportStage::Failed
        });
        result
    }

    fn run_import(
        &self,
        repository: &dyn Repository,
        envelope_text: &str,
        password: &str,
        mode: &ImportMode,
        ids: &dyn IdGenerator,
        progress: &mut dyn FnMut(ImportStage),
    ) -> Result<ImportSummary> {
        // Resolve the target before paying for key derivation
        let target = match mode {
            ImportMode::NewEntity => None,
            ImportMode::Replace { target_entity_id } => Some(
                repository
                    .get_entity(target_entity_id)?
                    .ok_or_else(|| Error::not_found(format!("entity {}", target_entity_id)))?,
            ),
        };

        progress(ImportStage::Decrypting);
        let bundle = self.decrypt_bundle(envelope_text, password)?;

        progress(ImportStage::Remapping);
        let outcome = self.prepare(bundle, mode, ids);
        let counts = BundleCounts {
            users: outcome.records.users.len(),
            products: outcome.records.products.len(),
            orders: outcome.records.orders.len(),
            categories: outcome.records.categories.len(),
            suppliers: outcome.records.suppliers.len(),
        };

        progress(ImportStage::Merging);
        let ImportOutcome {
            entity,
            records,
            report,
        } = outcome;
        let (mode_name, entity) = match (entity, target) {
            (Some(entity), _) => {
                repository.insert_entity(&entity, records)?;
                ("new_entity", entity)
            }
            (None, Some(target)) => {
                repository.replace_entity_records(&target.id, records)?;
                ("replace", target)
            }
            (None, None) => {
                return Err(Error::validation("replace import without a target entity"))
            }
        };

        Ok(ImportSummary {
            mode: mode_name,
            entity_id: entity.id,
            entity_name: entity.name,
            counts,
            report,
        })
    }
}

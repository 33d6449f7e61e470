//! Integration tests for inventa-core export/import
//!
//! Every test goes through the public API only: a MemoryStore as the
//! application state, the real codec, and the two import modes.
//!
//! Run with: cargo test --test integration_tests -- --nocapture

use std::collections::HashSet;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use inventa_core::adapters::demo::{generate_demo_snapshot, DEMO_GROCERY_ENTITY, DEMO_HARDWARE_ENTITY};
use inventa_core::adapters::ids::{SequentialIdGenerator, UuidIdGenerator};
use inventa_core::adapters::memory::MemoryStore;
use inventa_core::domain::{
    EncryptedEnvelope, Entity, EntityType, ExportBundle, KdfParams, Order, OrderItem, Product, User,
    UserRole,
};
use inventa_core::ports::Repository;
use inventa_core::services::credentials::verify_password;
use inventa_core::services::{
    CancelFlag, Codec, ExportService, ImportMode, ImportService, ReferenceKind,
};
use inventa_core::Error;

// ============================================================================
// Test Helpers
// ============================================================================

/// Codec with a cheap KDF so tests stay fast
fn fast_codec() -> Codec {
    Codec::new(KdfParams::Pbkdf2Sha256 { iterations: 1_000 })
}

fn demo_store() -> MemoryStore {
    MemoryStore::from_snapshot(generate_demo_snapshot())
}

fn export_text(store: &MemoryStore, entity_id: &str, password: &str) -> String {
    ExportService::new(fast_codec(), true)
        .export_entity(store, entity_id, password)
        .expect("export failed")
        .contents
}

fn all_record_ids(store: &MemoryStore) -> Vec<String> {
    let records = store.get_records().unwrap();
    records
        .users
        .iter()
        .map(|u| u.id.clone())
        .chain(records.products.iter().map(|p| p.id.clone()))
        .chain(records.orders.iter().map(|o| o.id.clone()))
        .chain(records.categories.iter().map(|c| c.id.clone()))
        .chain(records.suppliers.iter().map(|s| s.id.clone()))
        .collect()
}

// ============================================================================
// Round trips
// ============================================================================

/// Exporting and importing as a new entity duplicates the tenant in the
/// same store without touching the original and without id collisions
#[test]
fn test_export_then_import_as_new_entity() {
    let store = demo_store();
    let before = store.get_entity_records(DEMO_HARDWARE_ENTITY).unwrap();
    let text = export_text(&store, DEMO_HARDWARE_ENTITY, "s3cret");

    let service = ImportService::new(fast_codec());
    let summary = service
        .import(&store, &text, "s3cret", &ImportMode::NewEntity, &UuidIdGenerator)
        .unwrap();

    assert_eq!(summary.mode, "new_entity");
    assert_ne!(summary.entity_id, DEMO_HARDWARE_ENTITY);
    assert!(summary.report.is_complete());
    assert_eq!(store.get_entities().unwrap().len(), 3);

    // Original untouched
    assert_eq!(store.get_entity_records(DEMO_HARDWARE_ENTITY).unwrap(), before);

    let copy = store.get_entity_records(&summary.entity_id).unwrap();
    assert_eq!(copy.users.len(), before.users.len());
    assert_eq!(copy.products.len(), before.products.len());
    assert_eq!(copy.orders.len(), before.orders.len());
    assert_eq!(copy.categories.len(), before.categories.len());

    // Ids are unique across the whole store
    let ids = all_record_ids(&store);
    let unique: HashSet<&String> = ids.iter().collect();
    assert_eq!(unique.len(), ids.len());

    // References in the copy point at the copy's own records
    let copy_users: HashSet<&str> = copy.users.iter().map(|u| u.id.as_str()).collect();
    let copy_products: HashSet<&str> = copy.products.iter().map(|p| p.id.as_str()).collect();
    for order in &copy.orders {
        assert!(copy_users.contains(order.user_id.as_deref().unwrap()));
        for item in &order.items {
            assert!(copy_products.contains(item.product_id.as_deref().unwrap()));
        }
    }
    // ... and at the same relative position as in the source
    for (source_order, order) in before.orders.iter().zip(&copy.orders) {
        let user_pos = before
            .users
            .iter()
            .position(|u| Some(&u.id) == source_order.user_id.as_ref())
            .unwrap();
        assert_eq!(order.user_id.as_ref(), Some(&copy.users[user_pos].id));
        for (source_item, item) in source_order.items.iter().zip(&order.items) {
            let product_pos = before
                .products
                .iter()
                .position(|p| Some(&p.id) == source_item.product_id.as_ref())
                .unwrap();
            assert_eq!(item.product_id.as_ref(), Some(&copy.products[product_pos].id));
        }
    }
    let copy_categories: HashSet<&str> = copy.categories.iter().map(|c| c.id.as_str()).collect();
    for product in &copy.products {
        assert!(copy_categories.contains(product.category_id.as_deref().unwrap()));
    }

    // Admin flag travels with the user
    assert_eq!(
        copy.users.iter().filter(|u| u.is_admin()).count(),
        before.users.iter().filter(|u| u.is_admin()).count()
    );
}

/// Restoring a backup over its own tenant leaves the store as it was
#[test]
fn test_export_then_replace_restores_data() {
    let store = demo_store();
    let before = store.snapshot().unwrap();
    let text = export_text(&store, DEMO_GROCERY_ENTITY, "pw");

    // Damage the tenant, then restore
    store
        .replace_entity_records(DEMO_GROCERY_ENTITY, Default::default())
        .unwrap();
    assert!(store.get_entity_records(DEMO_GROCERY_ENTITY).unwrap().is_empty());

    let summary = ImportService::new(fast_codec())
        .import(
            &store,
            &text,
            "pw",
            &ImportMode::Replace {
                target_entity_id: DEMO_GROCERY_ENTITY.to_string(),
            },
            &UuidIdGenerator,
        )
        .unwrap();
    assert_eq!(summary.mode, "replace");

    let after = store.snapshot().unwrap();
    assert_eq!(after.entities, before.entities);
    let mut restored = after.products.clone();
    let mut original = before.products.clone();
    restored.sort_by(|a, b| a.id.cmp(&b.id));
    original.sort_by(|a, b| a.id.cmp(&b.id));
    assert_eq!(restored, original);
    assert_eq!(after.orders.len(), before.orders.len());
}

/// Replacing one tenant with another tenant's backup moves the records
/// under the target but keeps their ids
#[test]
fn test_replace_with_foreign_backup_keeps_ids() {
    let source = demo_store();
    let text = export_text(&source, DEMO_GROCERY_ENTITY, "pw");
    let source_ids: HashSet<String> = source
        .get_entity_records(DEMO_GROCERY_ENTITY)
        .unwrap()
        .products
        .into_iter()
        .map(|p| p.id)
        .collect();

    let target = MemoryStore::new();
    target
        .add_entity(&Entity::new("ent_other", "Otra", EntityType::Estatal))
        .unwrap();

    ImportService::new(fast_codec())
        .import(
            &target,
            &text,
            "pw",
            &ImportMode::Replace {
                target_entity_id: "ent_other".to_string(),
            },
            &UuidIdGenerator,
        )
        .unwrap();

    let records = target.get_entity_records("ent_other").unwrap();
    let ids: HashSet<String> = records.products.into_iter().map(|p| p.id).collect();
    assert_eq!(ids, source_ids);
    assert_eq!(target.get_entity("ent_other").unwrap().unwrap().name, "Otra");
}

// ============================================================================
// Failure paths leave state untouched
// ============================================================================

#[test]
fn test_wrong_password_changes_nothing() {
    let store = demo_store();
    let before = store.snapshot().unwrap();
    let text = export_text(&store, DEMO_HARDWARE_ENTITY, "right");

    let err = ImportService::new(fast_codec())
        .import(&store, &text, "wrong", &ImportMode::NewEntity, &UuidIdGenerator)
        .unwrap_err();
    assert!(matches!(err, Error::AuthenticationFailure));
    assert_eq!(err.user_message(), "Incorrect password or corrupted file.");
    assert_eq!(store.snapshot().unwrap(), before);
}

#[test]
fn test_replace_unknown_target_fails_before_decrypt() {
    let store = demo_store();
    // Not even a valid envelope: the target check must come first
    let err = ImportService::new(fast_codec())
        .import(
            &store,
            "garbage",
            "pw",
            &ImportMode::Replace {
                target_entity_id: "ent_missing".to_string(),
            },
            &UuidIdGenerator,
        )
        .unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[test]
fn test_truncated_file_is_malformed() {
    let store = demo_store();
    let text = export_text(&store, DEMO_HARDWARE_ENTITY, "pw");
    let truncated = &text[..text.len() / 2];

    let err = ImportService::new(fast_codec())
        .decrypt_bundle(truncated, "pw")
        .unwrap_err();
    assert!(matches!(err, Error::MalformedEnvelope(_)));
    assert_eq!(err.user_message(), "Corrupted or invalid file.");
}

#[test]
fn test_cancelled_export_produces_nothing() {
    let store = demo_store();
    let service = ExportService::new(fast_codec(), false);
    let bundle = service.bundle_for(&store, DEMO_HARDWARE_ENTITY).unwrap();

    let cancel = CancelFlag::new();
    cancel.cancel();
    let err = service
        .seal(
            &bundle,
            "pw",
            NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            &cancel,
        )
        .unwrap_err();
    assert!(matches!(err, Error::Cancelled));
}

// ============================================================================
// Legacy files
// ============================================================================

/// A file as the web console wrote it: no `kdf` field (PBKDF2, 100k
/// iterations), cleartext passwords, no `isAdmin`, empty-string references
#[test]
fn test_legacy_console_backup_imports() {
    let bundle_json = r#"{
        "entity": {"id": "ent_1", "name": "Legado", "type": "TCP", "exchangeRate": 120, "isStoreEnabled": false},
        "users": [
            {"id": "user_admin_ent_1", "entityId": "ent_1", "name": "Jefe", "email": "j@x.com",
             "role": "Administrador", "avatarUrl": "", "password": "hunter2"},
            {"id": "user_7", "entityId": "ent_1", "name": "Eva", "email": "e@x.com",
             "role": "Usuario", "avatarUrl": "", "password": "pw"}
        ],
        "products": [
            {"id": "prod_1", "entityId": "ent_1", "name": "Sal", "quantity": 5, "unitOfMeasure": "kilogramos",
             "location": {"warehouseType": "A", "section": "1", "row": "2"},
             "addedDate": "2024-03-01T10:00:00.000Z", "imageUrl": "", "price": 1.5, "categoryId": ""}
        ],
        "orders": [
            {"id": "ord_1", "entityId": "ent_1", "userId": "", "orderDate": "2024-03-02T10:00:00.000Z",
             "status": "Entregado", "total": 3.0, "items": [{"productId": "prod_1", "quantity": 2}]}
        ]
    }"#;
    // Sealed as raw JSON: the typed bundle would drop the cleartext field
    let bundle: serde_json::Value = serde_json::from_str(bundle_json).unwrap();

    // Seal with the legacy parameters, then strip the kdf field
    let text = Codec::new(KdfParams::legacy()).encrypt(&bundle, "pw").unwrap();
    let mut envelope = EncryptedEnvelope::parse(&text).unwrap();
    envelope.kdf = None;
    let legacy_text = envelope.to_json().unwrap();
    assert!(!legacy_text.contains("kdf"));

    let store = MemoryStore::new();
    let summary = ImportService::new(fast_codec())
        .import(&store, &legacy_text, "pw", &ImportMode::NewEntity, &SequentialIdGenerator::new())
        .unwrap();

    let records = store.get_entity_records(&summary.entity_id).unwrap();
    let admin = records.users.iter().find(|u| u.name == "Jefe").unwrap();
    let plain = records.users.iter().find(|u| u.name == "Eva").unwrap();
    assert!(admin.is_admin());
    assert!(!plain.is_admin());
    assert!(admin.legacy_password.is_none());
    assert!(verify_password(admin, "hunter2"));

    // Empty references came in as unset, not as dangling ids
    assert_eq!(records.orders[0].user_id, None);
    assert_eq!(records.products[0].category_id, None);
    assert!(summary.report.is_complete());

    // Cleartext never reaches the store file
    let stored = serde_json::to_string(&store.snapshot().unwrap()).unwrap();
    assert!(!stored.contains("hunter2"));
}

// ============================================================================
// Dangling references
// ============================================================================

#[test]
fn test_dangling_references_are_cleared_and_reported() {
    let store = MemoryStore::new();
    let entity = Entity::new("ent_1", "Uno", EntityType::Tcp);
    store.add_entity(&entity).unwrap();
    store
        .append_records(inventa_core::ports::EntityRecords {
            users: vec![User::new("user_1", "ent_1", "Ana", "a@x.com", UserRole::Admin)],
            products: vec![Product::new("prod_1", "ent_1", "Sal", Decimal::ONE, 3.0)],
            orders: vec![Order::new(
                "ord_1",
                "ent_1",
                "user_deleted",
                vec![
                    OrderItem::new("prod_1", 1.0),
                    OrderItem::new("prod_deleted", 1.0),
                ],
                Decimal::new(2, 0),
            )],
            ..Default::default()
        })
        .unwrap();

    // Non-strict export carries the broken references through
    let artifact = ExportService::new(fast_codec(), false)
        .export_entity(&store, "ent_1", "pw")
        .unwrap();
    assert_eq!(artifact.warnings.len(), 2);

    let summary = ImportService::new(fast_codec())
        .import(
            &store,
            &artifact.contents,
            "pw",
            &ImportMode::NewEntity,
            &SequentialIdGenerator::with_namespace("copy"),
        )
        .unwrap();
    assert_eq!(summary.report.count(ReferenceKind::User), 1);
    assert_eq!(summary.report.count(ReferenceKind::Product), 1);

    let order = &store.get_entity_records(&summary.entity_id).unwrap().orders[0];
    assert_eq!(order.user_id, None);
    assert!(order.items[0].product_id.is_some());
    assert_eq!(order.items[1].product_id, None);
}

#[test]
fn test_strict_export_refuses_broken_bundle() {
    let store = MemoryStore::new();
    store
        .add_entity(&Entity::new("ent_1", "Uno", EntityType::Tcp))
        .unwrap();
    store
        .append_records(inventa_core::ports::EntityRecords {
            orders: vec![Order::new("ord_1", "ent_1", "user_x", vec![], Decimal::ZERO)],
            ..Default::default()
        })
        .unwrap();

    let err = ExportService::new(fast_codec(), true)
        .export_entity(&store, "ent_1", "pw")
        .unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
}

// ============================================================================
// Property tests
// ============================================================================

mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn bundle_with(users: usize, products: usize, orders: usize) -> ExportBundle {
        let mut bundle = ExportBundle::new(Entity::new("ent_src", "Origen", EntityType::MyPime));
        for i in 0..users {
            bundle.users.push(User::new(
                format!("user_{}", i),
                "ent_src",
                format!("U{}", i),
                format!("u{}@x.com", i),
                UserRole::User,
            ));
        }
        for i in 0..products {
            bundle.products.push(Product::new(
                format!("prod_{}", i),
                "ent_src",
                format!("P{}", i),
                Decimal::new(i as i64 * 25, 2),
                i as f64,
            ));
        }
        for i in 0..orders {
            let items = (0..products.min(3))
                .map(|p| OrderItem::new(format!("prod_{}", p), 1.0))
                .collect();
            let user = if users == 0 {
                "user_none".to_string()
            } else {
                format!("user_{}", i % users)
            };
            bundle.orders.push(Order::new(
                format!("ord_{}", i),
                "ent_src",
                user,
                items,
                Decimal::ONE,
            ));
        }
        bundle
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn codec_round_trips_bundles(users in 0usize..5, products in 0usize..6, orders in 0usize..5,
                                     password in "[ -~]{1,24}") {
            let bundle = bundle_with(users, products, orders);
            let codec = fast_codec();
            let text = codec.encrypt(&bundle, &password).unwrap();
            let decoded: ExportBundle = codec.decrypt(&text, &password).unwrap();
            prop_assert_eq!(decoded, bundle);
        }

        #[test]
        fn new_entity_ids_are_disjoint_from_source(users in 0usize..5, products in 0usize..6,
                                                   orders in 0usize..5) {
            let bundle = bundle_with(users, products, orders);
            let source: HashSet<String> = bundle.users.iter().map(|u| u.id.clone())
                .chain(bundle.products.iter().map(|p| p.id.clone()))
                .chain(bundle.orders.iter().map(|o| o.id.clone()))
                .collect();

            let outcome =
                inventa_core::services::import_as_new_entity(bundle, &SequentialIdGenerator::new());
            let fresh: Vec<String> = outcome.records.users.iter().map(|u| u.id.clone())
                .chain(outcome.records.products.iter().map(|p| p.id.clone()))
                .chain(outcome.records.orders.iter().map(|o| o.id.clone()))
                .collect();

            let unique: HashSet<&String> = fresh.iter().collect();
            prop_assert_eq!(unique.len(), fresh.len());
            prop_assert!(fresh.iter().all(|id| !source.contains(id)));
            let entity = outcome.entity.unwrap();
            prop_assert!(!source.contains(&entity.id));
            prop_assert!(outcome.records.orders.iter().all(|o| o.entity_id == entity.id));

            // Every reference lands on the record at the same position
            let records = &outcome.records;
            for (i, order) in records.orders.iter().enumerate() {
                if users > 0 {
                    prop_assert_eq!(order.user_id.as_ref(), Some(&records.users[i % users].id));
                } else {
                    prop_assert!(order.user_id.is_none());
                }
                for (p, item) in order.items.iter().enumerate() {
                    prop_assert_eq!(item.product_id.as_ref(), Some(&records.products[p].id));
                }
            }
        }

        #[test]
        fn codec_keeps_decimal_amounts_exact(lo in any::<u32>(), mid in any::<u32>(), hi in any::<u32>(),
                                             negative in any::<bool>(), scale in 0u32..=28) {
            let amount = Decimal::from_parts(lo, mid, hi, negative, scale);
            let mut bundle = bundle_with(1, 1, 1);
            bundle.entity.exchange_rate = amount;
            bundle.products[0].price = amount;
            bundle.products[0].store_price = Some(amount);
            bundle.orders[0].total = amount;

            let codec = fast_codec();
            let text = codec.encrypt(&bundle, "pw").unwrap();
            let decoded: ExportBundle = codec.decrypt(&text, "pw").unwrap();
            prop_assert_eq!(decoded.products[0].price, amount);
            prop_assert_eq!(decoded.entity.exchange_rate, amount);
            prop_assert_eq!(decoded, bundle);
        }
    }
}

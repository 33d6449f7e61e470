//! Concurrent import tests
//!
//! Several threads import the same backup into one shared store at once.
//! Every import must land as its own entity with its own ids.
//!
//! Run with: cargo test --test concurrent_access_test -- --nocapture

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

use inventa_core::adapters::demo::{generate_demo_snapshot, DEMO_HARDWARE_ENTITY};
use inventa_core::adapters::ids::UuidIdGenerator;
use inventa_core::adapters::memory::MemoryStore;
use inventa_core::domain::KdfParams;
use inventa_core::ports::Repository;
use inventa_core::services::{Codec, ExportService, ImportMode, ImportService};

/// Number of concurrent importers
const THREAD_COUNT: usize = 6;

/// Imports per thread
const ITERATIONS_PER_THREAD: usize = 3;

fn fast_codec() -> Codec {
    Codec::new(KdfParams::Pbkdf2Sha256 { iterations: 1_000 })
}

#[test]
fn test_concurrent_new_entity_imports() {
    let store = Arc::new(MemoryStore::from_snapshot(generate_demo_snapshot()));
    let text = Arc::new(
        ExportService::new(fast_codec(), true)
            .export_entity(store.as_ref(), DEMO_HARDWARE_ENTITY, "pw")
            .unwrap()
            .contents,
    );
    let records_per_import = store
        .get_entity_records(DEMO_HARDWARE_ENTITY)
        .unwrap()
        .products
        .len();

    let barrier = Arc::new(Barrier::new(THREAD_COUNT));
    let success_count = Arc::new(AtomicUsize::new(0));
    let mut handles = vec![];

    for _ in 0..THREAD_COUNT {
        let barrier = Arc::clone(&barrier);
        let store = Arc::clone(&store);
        let text = Arc::clone(&text);
        let success_count = Arc::clone(&success_count);

        handles.push(thread::spawn(move || {
            barrier.wait();
            let service = ImportService::new(fast_codec());
            for _ in 0..ITERATIONS_PER_THREAD {
                let result = service.import(
                    store.as_ref(),
                    &text,
                    "pw",
                    &ImportMode::NewEntity,
                    &UuidIdGenerator,
                );
                if result.is_ok() {
                    success_count.fetch_add(1, Ordering::SeqCst);
                }
            }
        }));
    }

    for handle in handles {
        handle.join().unwrap();
    }

    let expected = THREAD_COUNT * ITERATIONS_PER_THREAD;
    assert_eq!(success_count.load(Ordering::SeqCst), expected);
    assert_eq!(store.get_entities().unwrap().len(), 2 + expected);

    let records = store.get_records().unwrap();
    let product_ids: HashSet<&str> = records.products.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(product_ids.len(), records.products.len());
    assert!(records.products.len() >= records_per_import * (expected + 1));
}

#[test]
fn test_concurrent_replace_is_all_or_nothing() {
    let store = Arc::new(MemoryStore::from_snapshot(generate_demo_snapshot()));
    let text = Arc::new(
        ExportService::new(fast_codec(), true)
            .export_entity(store.as_ref(), DEMO_HARDWARE_ENTITY, "pw")
            .unwrap()
            .contents,
    );
    let before = store.get_entity_records(DEMO_HARDWARE_ENTITY).unwrap();

    let barrier = Arc::new(Barrier::new(THREAD_COUNT));
    let mut handles = vec![];
    for _ in 0..THREAD_COUNT {
        let barrier = Arc::clone(&barrier);
        let store = Arc::clone(&store);
        let text = Arc::clone(&text);
        handles.push(thread::spawn(move || {
            barrier.wait();
            ImportService::new(fast_codec())
                .import(
                    store.as_ref(),
                    &text,
                    "pw",
                    &ImportMode::Replace {
                        target_entity_id: DEMO_HARDWARE_ENTITY.to_string(),
                    },
                    &UuidIdGenerator,
                )
                .is_ok()
        }));
    }
    for handle in handles {
        assert!(handle.join().unwrap());
    }

    // Replaying the same backup any number of times converges to one copy
    let after = store.get_entity_records(DEMO_HARDWARE_ENTITY).unwrap();
    assert_eq!(after.products.len(), before.products.len());
    assert_eq!(after.orders.len(), before.orders.len());
    assert_eq!(after.users.len(), before.users.len());
}

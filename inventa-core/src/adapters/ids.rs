//! Id generators

use std::sync::atomic::{AtomicU64, Ordering};

use uuid::Uuid;

use crate::ports::{IdGenerator, IdKind};

/// Random v4 UUID ids, e.g. `prod_5b0c...`
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidIdGenerator;

impl IdGenerator for UuidIdGenerator {
    fn next_id(&self, kind: IdKind) -> String {
        format!("{}_{}", kind.prefix(), Uuid::new_v4().simple())
    }
}

/// Counter-based ids for deterministic tests, e.g. `user_import_3`
#[derive(Debug, Default)]
pub struct SequentialIdGenerator {
    namespace: Option<String>,
    counter: AtomicU64,
}

impl SequentialIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ids of the form `<prefix>_<namespace>_<n>`
    pub fn with_namespace(namespace: impl Into<String>) -> Self {
        Self {
            namespace: Some(namespace.into()),
            counter: AtomicU64::new(0),
        }
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn next_id(&self, kind: IdKind) -> String {
        let n = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        match &self.namespace {
            Some(ns) => format!("{}_{}_{}", kind.prefix(), ns, n),
            None => format!("{}_{}", kind.prefix(), n),
        }
    }
}

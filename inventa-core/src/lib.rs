//! Inventa Core - encrypted entity backups for the Inventa inventory console
//!
//! This crate follows hexagonal architecture:
//!
//! - **domain**: Tenant records, the export bundle, the encrypted envelope
//! - **ports**: Trait definitions for state and id generation
//! - **services**: Codec, export, import/remapping, credentials, logging
//! - **adapters**: In-memory store, id generators, demo data

pub mod adapters;
pub mod config;
pub mod domain;
pub mod log_migrations;
pub mod ports;
pub mod services;

use std::path::Path;

use anyhow::{Context, Result};

use config::Config;
use services::{Codec, ExportService, ImportService};

// Re-export commonly used types at crate root
pub use domain::result::{Error, OperationResult};
pub use domain::{EncryptedEnvelope, Entity, ExportBundle, KdfParams, Order, Product, User};

/// Main context for Inventa operations
///
/// Holds the configuration and the services built from it.
pub struct InventaContext {
    pub config: Config,
    pub export_service: ExportService,
    pub import_service: ImportService,
}

impl InventaContext {
    /// Create a context from the settings in `inventa_dir`
    pub fn new(inventa_dir: &Path) -> Result<Self> {
        let config = Config::load(inventa_dir).context("Failed to load settings")?;
        let codec = Codec::new(config.kdf_params()?);

        Ok(Self {
            export_service: ExportService::new(codec, config.strict_export),
            import_service: ImportService::new(codec),
            config,
        })
    }
}

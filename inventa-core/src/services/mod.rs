//! Service layer - business logic orchestration
//!
//! Services coordinate domain logic and port interactions. The codec is the
//! only place that touches key material.

pub mod codec;
pub mod credentials;
pub mod export;
pub mod import;
pub mod logging;

pub use codec::{decrypt_in_background, encrypt_in_background, CancelFlag, Codec};
pub use export::{backup_file_name, build_export_bundle, ExportArtifact, ExportService};
pub use import::{
    import_as_new_entity, import_replacing_entity, DanglingReference, ImportMode, ImportOutcome,
    ImportReport, ImportService, ImportStage, ImportSummary, ReferenceKind,
};
pub use logging::{EntryPoint, LogEntry, LogEvent, LoggingService};

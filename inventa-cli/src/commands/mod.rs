//! CLI command implementations

pub mod demo;
pub mod entities;
pub mod export;
pub mod import;
pub mod inspect;
pub mod logs;

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use dialoguer::Password;
use indicatif::{ProgressBar, ProgressStyle};
use inventa_core::adapters::memory::{MemoryStore, StoreSnapshot};
use inventa_core::services::{EntryPoint, LogEvent, LoggingService};
use inventa_core::InventaContext;

/// Get the logging service for CLI operations
///
/// Returns None if logging fails to initialize (shouldn't block operations)
pub fn get_logger() -> Option<LoggingService> {
    let inventa_dir = get_inventa_dir();
    std::fs::create_dir_all(&inventa_dir).ok()?;
    LoggingService::new(&inventa_dir, EntryPoint::Cli, env!("CARGO_PKG_VERSION")).ok()
}

/// Log an event, ignoring any errors (logging should never break the app)
pub fn log_event(logger: &Option<LoggingService>, event: LogEvent) {
    if let Some(l) = logger {
        let _ = l.log(event);
    }
}

/// Log a failed command. Core errors are logged by kind; anything else by message.
pub fn log_failure(logger: &Option<LoggingService>, event: &str, command: &str, error: &anyhow::Error) {
    let entry = LogEvent::new(event).with_command(command);
    let entry = match error.downcast_ref::<inventa_core::Error>() {
        Some(core) => entry.with_core_error(core),
        None => entry.with_error(format!("{:#}", error)),
    };
    log_event(logger, entry);
}

/// Get the Inventa directory from environment or default
pub fn get_inventa_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("INVENTA_DIR") {
        PathBuf::from(dir)
    } else {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".inventa")
    }
}

/// Build the context from settings in the Inventa directory
pub fn get_context() -> Result<InventaContext> {
    let inventa_dir = get_inventa_dir();
    std::fs::create_dir_all(&inventa_dir)
        .with_context(|| format!("Failed to create inventa directory: {:?}", inventa_dir))?;
    InventaContext::new(&inventa_dir).context("Failed to initialize inventa context")
}

/// Store file given on the command line, or `store.json` in the Inventa directory
pub fn resolve_store_path(store: Option<PathBuf>) -> PathBuf {
    store.unwrap_or_else(|| get_inventa_dir().join("store.json"))
}

pub fn load_store(path: &Path) -> Result<MemoryStore> {
    let snapshot = StoreSnapshot::load(path)
        .with_context(|| format!("Failed to read store file {}", path.display()))?;
    Ok(MemoryStore::from_snapshot(snapshot))
}

pub fn save_store(store: &MemoryStore, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    store
        .snapshot()?
        .save(path)
        .with_context(|| format!("Failed to write store file {}", path.display()))
}

/// Password from --password flag, INVENTA_PASSWORD env var, or prompt
pub fn get_password_or_prompt(password_flag: Option<String>, prompt: &str) -> Result<String> {
    if let Some(p) = password_flag {
        return Ok(p);
    }
    if let Ok(p) = std::env::var("INVENTA_PASSWORD") {
        return Ok(p);
    }
    let p = Password::new().with_prompt(prompt).interact()?;
    Ok(p)
}

/// Like [`get_password_or_prompt`], but an interactive prompt asks twice
pub fn get_password_with_confirm(password_flag: Option<String>) -> Result<String> {
    if let Some(p) = password_flag {
        return Ok(p);
    }
    if let Ok(p) = std::env::var("INVENTA_PASSWORD") {
        return Ok(p);
    }
    let p = Password::new()
        .with_prompt("Backup password")
        .with_confirmation("Confirm backup password", "Passwords do not match")
        .interact()?;
    if p.is_empty() {
        anyhow::bail!("Password must not be empty");
    }
    Ok(p)
}

/// Spinner shown while the key derivation runs. Hidden for JSON output.
pub fn spinner(message: &str, json: bool) -> ProgressBar {
    if json || atty::isnt(atty::Stream::Stderr) {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
        bar.set_style(style);
    }
    bar.set_message(message.to_string());
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}

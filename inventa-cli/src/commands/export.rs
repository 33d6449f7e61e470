//! Export command - write an encrypted backup of one entity

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use colored::Colorize;
use inventa_core::services::{CancelFlag, LogEvent};
use inventa_core::OperationResult;

use super::{get_context, get_logger, get_password_with_confirm, load_store, log_event, log_failure, spinner};
use crate::output;

pub struct ExportArgs {
    pub entity_id: String,
    pub store: PathBuf,
    pub out: Option<PathBuf>,
    pub strict: bool,
    pub force: bool,
    pub password: Option<String>,
    pub json: bool,
}

pub fn run(args: ExportArgs) -> Result<()> {
    let logger = get_logger();
    log_event(&logger, LogEvent::new("export_started").with_command("export"));
    let started = Instant::now();

    match export(&args) {
        Ok(()) => {
            log_event(
                &logger,
                LogEvent::new("export_completed")
                    .with_command("export")
                    .with_duration(started.elapsed()),
            );
            Ok(())
        }
        Err(e) => {
            log_failure(&logger, "export_failed", "export", &e);
            Err(e)
        }
    }
}

/// `out` may name a directory (the backup file name is appended) or a file
fn target_path(out: Option<&Path>, file_name: &str) -> PathBuf {
    match out {
        None => PathBuf::from(file_name),
        Some(dir) if dir.is_dir() => dir.join(file_name),
        Some(path) => path.to_path_buf(),
    }
}

fn export(args: &ExportArgs) -> Result<()> {
    let ctx = get_context()?;
    let store = load_store(&args.store)?;
    let service = if args.strict {
        ctx.export_service.with_strict(true)
    } else {
        ctx.export_service
    };

    let bundle = service.bundle_for(&store, &args.entity_id)?;
    let password = get_password_with_confirm(args.password.clone())?;

    let bar = spinner("Encrypting backup...", args.json);
    let sealed = service.seal(
        &bundle,
        &password,
        chrono::Local::now().date_naive(),
        &CancelFlag::new(),
    );
    bar.finish_and_clear();
    let artifact = sealed?;

    let path = target_path(args.out.as_deref(), &artifact.file_name);
    if path.exists() && !args.force {
        anyhow::bail!("{} already exists (use --force to overwrite)", path.display());
    }
    std::fs::write(&path, &artifact.contents)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    if args.json {
        let mut context = std::collections::HashMap::new();
        context.insert("path".to_string(), serde_json::json!(path.to_string_lossy()));
        let result = OperationResult::ok_with_context(&artifact, context);
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    output::success(&format!("Backup written to {}", path.display()));
    println!(
        "  {} users, {} products, {} orders, {} categories, {} suppliers",
        artifact.counts.users,
        artifact.counts.products,
        artifact.counts.orders,
        artifact.counts.categories,
        artifact.counts.suppliers
    );
    if !artifact.warnings.is_empty() {
        output::warning(&format!(
            "{} broken reference(s) exported as-is:",
            artifact.warnings.len()
        ));
        for warning in artifact.warnings.iter().take(10) {
            println!("  {} {}", "-".dimmed(), warning);
        }
    }
    println!(
        "{}",
        "Keep the password safe: the backup cannot be opened without it.".dimmed()
    );

    Ok(())
}

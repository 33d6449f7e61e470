//! Import command - restore an encrypted backup into the store

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use colored::Colorize;
use inventa_core::adapters::ids::UuidIdGenerator;
use inventa_core::services::{ImportMode, ImportReport, ImportStage, ImportSummary, LogEvent};
use inventa_core::OperationResult;

use super::{
    get_context, get_logger, get_password_or_prompt, load_store, log_event, log_failure, save_store,
    spinner,
};
use crate::output;

pub struct ImportArgs {
    pub file: PathBuf,
    pub store: PathBuf,
    pub replace: Option<String>,
    pub dry_run: bool,
    pub password: Option<String>,
    pub json: bool,
}

pub fn run(args: ImportArgs) -> Result<()> {
    let logger = get_logger();
    log_event(&logger, LogEvent::new("import_started").with_command("import"));
    let started = Instant::now();

    match import(&args) {
        Ok(summary) => {
            if !summary.report.is_complete() {
                log_event(
                    &logger,
                    LogEvent::new("import_dangling_references")
                        .with_command("import")
                        .with_count(summary.report.dangling.len()),
                );
            }
            log_event(
                &logger,
                LogEvent::new("import_completed")
                    .with_command("import")
                    .with_duration(started.elapsed())
                    .with_count(
                        summary.counts.users
                            + summary.counts.products
                            + summary.counts.orders
                            + summary.counts.categories
                            + summary.counts.suppliers,
                    ),
            );
            print_summary(&summary, args.dry_run, args.json)
        }
        Err(e) => {
            log_failure(&logger, "import_failed", "import", &e);
            Err(e)
        }
    }
}

fn stage_message(stage: ImportStage) -> &'static str {
    match stage {
        ImportStage::Decrypting => "Decrypting backup...",
        ImportStage::Remapping => "Rewriting identifiers...",
        ImportStage::Merging => "Saving records...",
        ImportStage::Ready => "Done",
        ImportStage::Failed => "Failed",
    }
}

fn import(args: &ImportArgs) -> Result<ImportSummary> {
    let ctx = get_context()?;
    let envelope = std::fs::read_to_string(&args.file)
        .with_context(|| format!("Failed to read {}", args.file.display()))?;
    let store = load_store(&args.store)?;
    let ids = UuidIdGenerator;

    let mode = match &args.replace {
        Some(target) => ImportMode::Replace {
            target_entity_id: target.clone(),
        },
        None => ImportMode::NewEntity,
    };

    let password = get_password_or_prompt(args.password.clone(), "Backup password")?;
    let bar = spinner(stage_message(ImportStage::Decrypting), args.json);
    let summary = ctx.import_service.import_with_progress(
        &store,
        &envelope,
        &password,
        &mode,
        &ids,
        &mut |stage| bar.set_message(stage_message(stage)),
    );
    bar.finish_and_clear();
    let summary = summary?;

    // Dry runs go through the same merge on an in-memory copy, then drop it
    if !args.dry_run {
        save_store(&store, &args.store)?;
    }
    Ok(summary)
}

fn print_report(report: &ImportReport) {
    output::warning(&format!(
        "{} reference(s) pointed outside the backup and were cleared:",
        report.dangling.len()
    ));
    let mut table = output::create_table();
    table.set_header(vec!["Record", "Kind", "Missing id"]);
    for d in report.dangling.iter().take(20) {
        table.add_row(vec![
            d.record_id.clone(),
            format!("{:?}", d.kind).to_lowercase(),
            d.missing_id.clone(),
        ]);
    }
    println!("{}", table);
}

fn print_summary(summary: &ImportSummary, dry_run: bool, json: bool) -> Result<()> {
    if json {
        let mut context = std::collections::HashMap::new();
        context.insert("dry_run".to_string(), serde_json::json!(dry_run));
        let result = OperationResult::ok_with_context(summary, context);
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    let verb = match (summary.mode, dry_run) {
        (_, true) => "Would import",
        ("replace", false) => "Replaced data of",
        _ => "Imported",
    };
    output::success(&format!(
        "{} {} ({})",
        verb,
        summary.entity_name.bold(),
        summary.entity_id
    ));
    println!(
        "  {} users, {} products, {} orders, {} categories, {} suppliers",
        summary.counts.users,
        summary.counts.products,
        summary.counts.orders,
        summary.counts.categories,
        summary.counts.suppliers
    );
    if !summary.report.is_complete() {
        print_report(&summary.report);
    }
    if dry_run {
        output::info("Dry run: the store file was not changed.");
    }
    Ok(())
}

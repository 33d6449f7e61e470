//! Inspect command - decrypt a backup and describe it without importing

use std::path::PathBuf;

use anyhow::{Context, Result};
use colored::Colorize;
use inventa_core::domain::{BundleCounts, EncryptedEnvelope, KdfParams};
use inventa_core::services::import::dangling_references;
use inventa_core::services::ImportReport;
use serde::Serialize;

use super::{get_context, get_password_or_prompt, spinner};
use crate::output;

#[derive(Serialize)]
struct Inspection {
    entity_id: String,
    entity_name: String,
    entity_type: String,
    kdf: KdfParams,
    legacy_format: bool,
    counts: BundleCounts,
    violations: Vec<String>,
    dangling: ImportReport,
}

pub fn run(file: PathBuf, password: Option<String>, json: bool) -> Result<()> {
    let ctx = get_context()?;
    let text = std::fs::read_to_string(&file)
        .with_context(|| format!("Failed to read {}", file.display()))?;

    // Parse first so an unreadable file fails before the password prompt
    let envelope = EncryptedEnvelope::parse(&text)?;
    let decoded = envelope.decode()?;

    let password = get_password_or_prompt(password, "Backup password")?;
    let bar = spinner("Decrypting backup...", json);
    let bundle = ctx.import_service.decrypt_decoded_bundle(&decoded, &password);
    bar.finish_and_clear();
    let bundle = bundle?;

    let inspection = Inspection {
        entity_id: bundle.entity.id.clone(),
        entity_name: bundle.entity.name.clone(),
        entity_type: serde_json::to_value(&bundle.entity.entity_type)?
            .as_str()
            .unwrap_or_default()
            .to_string(),
        kdf: decoded.kdf,
        legacy_format: envelope.kdf.is_none(),
        counts: bundle.counts(),
        violations: bundle.violations(),
        dangling: dangling_references(&bundle),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&inspection)?);
        return Ok(());
    }

    println!("{}", inspection.entity_name.bold());
    println!("  Id:    {}", inspection.entity_id);
    println!("  Type:  {}", inspection.entity_type);
    let kdf = match inspection.kdf {
        KdfParams::Pbkdf2Sha256 { iterations } => format!("PBKDF2-SHA256, {} iterations", iterations),
        KdfParams::Argon2id(p) => format!(
            "Argon2id, t={} m={} KiB p={}",
            p.time_cost, p.memory_cost, p.parallelism
        ),
    };
    println!(
        "  Key:   {}{}",
        kdf,
        if inspection.legacy_format {
            " (legacy file)".dimmed().to_string()
        } else {
            String::new()
        }
    );

    let mut table = output::create_table();
    table.set_header(vec!["Records", "Count"]);
    let c = inspection.counts;
    for (name, count) in [
        ("Users", c.users),
        ("Products", c.products),
        ("Orders", c.orders),
        ("Categories", c.categories),
        ("Suppliers", c.suppliers),
    ] {
        table.add_row(vec![name.to_string(), count.to_string()]);
    }
    println!("{}", table);

    if inspection.violations.is_empty() {
        output::success("All references resolve inside the backup.");
    } else {
        output::warning(&format!("{} consistency issue(s):", inspection.violations.len()));
        for v in inspection.violations.iter().take(10) {
            println!("  {} {}", "-".dimmed(), v);
        }
    }

    Ok(())
}

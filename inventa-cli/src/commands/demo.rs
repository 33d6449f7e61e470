//! Demo command - write a store file with sample tenants

use std::path::PathBuf;

use anyhow::Result;
use colored::Colorize;
use inventa_core::adapters::demo::{generate_demo_snapshot, DEMO_HARDWARE_ENTITY};
use inventa_core::adapters::memory::MemoryStore;

use super::save_store;

pub fn run(store: PathBuf, force: bool) -> Result<()> {
    if store.exists() && !force {
        anyhow::bail!(
            "{} already exists (use --force to overwrite)",
            store.display()
        );
    }

    save_store(&MemoryStore::from_snapshot(generate_demo_snapshot()), &store)?;

    println!("{}", "Demo store created".green());
    println!("  {}", store.display());
    println!(
        "Try 'inv export {} --store {}' next.",
        DEMO_HARDWARE_ENTITY,
        store.display()
    );
    Ok(())
}

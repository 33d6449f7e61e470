//! Entities command - list the tenants in a store file

use std::path::PathBuf;

use anyhow::Result;
use inventa_core::ports::Repository;
use serde::Serialize;

use super::load_store;
use crate::output;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EntityRow {
    id: String,
    name: String,
    users: usize,
    products: usize,
    orders: usize,
}

pub fn run(store: PathBuf, json: bool) -> Result<()> {
    let repository = load_store(&store)?;
    let records = repository.get_records()?;

    let rows: Vec<EntityRow> = repository
        .get_entities()?
        .into_iter()
        .map(|e| {
            let owned = records.for_entity(&e.id);
            EntityRow {
                users: owned.users.len(),
                products: owned.products.len(),
                orders: owned.orders.len(),
                id: e.id,
                name: e.name,
            }
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    if rows.is_empty() {
        output::info(&format!("No entities in {}", store.display()));
        return Ok(());
    }

    let mut table = output::create_table();
    table.set_header(vec!["Id", "Name", "Users", "Products", "Orders"]);
    for row in rows {
        table.add_row(vec![
            row.id,
            row.name,
            row.users.to_string(),
            row.products.to_string(),
            row.orders.to_string(),
        ]);
    }
    println!("{}", table);
    Ok(())
}

//! Event log migrations - embedded SQL files
//!
//! Each entry is `(file name, sql)`, applied in order. `000_migrations.sql`
//! bootstraps the bookkeeping table and always comes first.

pub const LOG_MIGRATIONS: &[(&str, &str)] = &[
    ("000_migrations.sql", include_str!("000_migrations.sql")),
    (
        "001_initial_schema.sql",
        include_str!("001_initial_schema.sql"),
    ),
];

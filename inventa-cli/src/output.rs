//! Output formatting utilities

use colored::Colorize;
use comfy_table::{presets::UTF8_FULL_CONDENSED, ContentArrangement, Table};

pub fn success(msg: &str) {
    println!("{}", msg.green());
}

pub fn error(msg: &str) {
    eprintln!("{}", msg.red());
}

pub fn warning(msg: &str) {
    println!("{}", msg.yellow());
}

pub fn info(msg: &str) {
    println!("{}", msg.cyan());
}

/// Report a failed command on stderr
///
/// Codec failures get the fixed operator wording only: the underlying cause
/// (which might be a parser message quoting decrypted bytes) is not shown.
pub fn failure(err: &anyhow::Error, json: bool) {
    let (message, kind) = match err.downcast_ref::<inventa_core::Error>() {
        Some(core) if core.is_codec_failure() => (core.user_message(), core.kind()),
        Some(core) => (format!("{:#}", err), core.kind()),
        None => (format!("{:#}", err), "error"),
    };

    if json {
        println!(
            "{}",
            serde_json::json!({"success": false, "error": message, "kind": kind})
        );
    } else {
        error(&message);
    }
}

/// Create a styled table
pub fn create_table() -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Format bytes as human-readable size
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;

    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}

//! Configuration management
//!
//! Settings live in `settings.json` in the Inventa directory:
//! ```json
//! {
//!   "export": {
//!     "kdf": { "algorithm": "argon2id", "timeCost": 3, "memoryCost": 65536, "parallelism": 4 },
//!     "strict": false
//!   }
//! }
//! ```
//! Keys this crate doesn't manage are kept as-is on save.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::result::{Error, Result};
use crate::domain::{Argon2Params, KdfParams, DEFAULT_PBKDF2_ITERATIONS};

/// Lowest Argon2 memory cost accepted for new backups (KiB)
pub const MIN_ARGON2_MEMORY_KIB: u32 = 19 * 1024;
/// Lowest Argon2 time cost accepted for new backups
pub const MIN_ARGON2_TIME_COST: u32 = 2;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsFile {
    #[serde(default)]
    export: ExportSettings,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExportSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    kdf: Option<KdfParams>,
    #[serde(default)]
    strict: bool,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

/// Inventa configuration
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// KDF for new backups; `None` means the built-in default
    pub kdf: Option<KdfParams>,
    /// Refuse to export entities with broken references
    pub strict_export: bool,
}

fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "true" | "1" | "yes" | "TRUE" | "YES" => Some(true),
        "false" | "0" | "no" | "FALSE" | "NO" => Some(false),
        _ => None,
    }
}

fn read_settings(settings_path: &Path) -> Result<SettingsFile> {
    if !settings_path.exists() {
        return Ok(SettingsFile::default());
    }
    let content = std::fs::read_to_string(settings_path)?;
    serde_json::from_str(&content)
        .map_err(|e| Error::Config(format!("{}: {}", settings_path.display(), e)))
}

impl Config {
    /// Load config from the Inventa directory
    ///
    /// Environment overrides:
    /// - `INVENTA_KDF`: `argon2id` or `pbkdf2` (default parameters)
    /// - `INVENTA_STRICT_EXPORT`: boolean
    pub fn load(inventa_dir: &Path) -> Result<Self> {
        Self::load_with_env(inventa_dir, |key| std::env::var(key).ok())
    }

    fn load_with_env(inventa_dir: &Path, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let raw = read_settings(&inventa_dir.join("settings.json"))?;

        let kdf = match env("INVENTA_KDF").as_deref() {
            Some("argon2id" | "argon2") => Some(KdfParams::Argon2id(Argon2Params::default())),
            Some("pbkdf2" | "pbkdf2-sha256") => Some(KdfParams::Pbkdf2Sha256 {
                iterations: DEFAULT_PBKDF2_ITERATIONS,
            }),
            Some(other) => {
                return Err(Error::Config(format!("unknown INVENTA_KDF value: {}", other)))
            }
            None => raw.export.kdf,
        };

        let strict_export = env("INVENTA_STRICT_EXPORT")
            .as_deref()
            .and_then(parse_bool)
            .unwrap_or(raw.export.strict);

        Ok(Self { kdf, strict_export })
    }

    /// Save config to the Inventa directory, keeping unmanaged keys
    pub fn save(&self, inventa_dir: &Path) -> Result<()> {
        let settings_path = inventa_dir.join("settings.json");
        let mut settings = read_settings(&settings_path)?;

        settings.export.kdf = self.kdf;
        settings.export.strict = self.strict_export;

        let content = serde_json::to_string_pretty(&settings)?;
        std::fs::write(&settings_path, content)?;
        Ok(())
    }

    /// KDF parameters for new backups
    ///
    /// Configured values below the floors are rejected rather than clamped.
    pub fn kdf_params(&self) -> Result<KdfParams> {
        let params = self.kdf.unwrap_or_default();
        match params {
            KdfParams::Pbkdf2Sha256 { iterations } if iterations < DEFAULT_PBKDF2_ITERATIONS => {
                Err(Error::Config(format!(
                    "pbkdf2 iterations must be at least {}",
                    DEFAULT_PBKDF2_ITERATIONS
                )))
            }
            KdfParams::Argon2id(p) if p.memory_cost < MIN_ARGON2_MEMORY_KIB => Err(Error::Config(
                format!("argon2 memoryCost must be at least {} KiB", MIN_ARGON2_MEMORY_KIB),
            )),
            KdfParams::Argon2id(p) if p.time_cost < MIN_ARGON2_TIME_COST => Err(Error::Config(
                format!("argon2 timeCost must be at least {}", MIN_ARGON2_TIME_COST),
            )),
            _ => {
                params
                    .check_bounds()
                    .map_err(|e| Error::Config(e.to_string()))?;
                Ok(params)
            }
        }
    }
}

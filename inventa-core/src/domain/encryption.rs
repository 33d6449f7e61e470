//! Encryption domain models
//!
//! The envelope is the only form an export ever takes outside the process:
//! ```json
//! { "salt": "<base64>", "iv": "<base64>", "data": "<base64>", "kdf": { ... } }
//! ```
//! `kdf` is absent in files written by the browser console; those were
//! always PBKDF2-SHA256 with 100,000 iterations.

use base64::Engine;
use serde::{Deserialize, Serialize};

use super::result::{Error, Result};

/// Salt length in bytes
pub const SALT_LEN: usize = 16;
/// AES-GCM nonce length in bytes
pub const IV_LEN: usize = 12;
/// AES-GCM authentication tag length in bytes
pub const TAG_LEN: usize = 16;

/// Default Argon2id parameters
pub const DEFAULT_TIME_COST: u32 = 3;
pub const DEFAULT_MEMORY_COST: u32 = 65536; // 64 MiB
pub const DEFAULT_PARALLELISM: u32 = 4;

/// Iteration count used by legacy envelopes
pub const DEFAULT_PBKDF2_ITERATIONS: u32 = 100_000;

// Upper bounds accepted when reading an envelope
const MAX_PBKDF2_ITERATIONS: u32 = 10_000_000;
const MAX_MEMORY_COST: u32 = 1_048_576; // 1 GiB
const MAX_TIME_COST: u32 = 64;
const MAX_PARALLELISM: u32 = 16;

/// Argon2id parameters for key derivation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Argon2Params {
    pub time_cost: u32,
    /// KiB
    pub memory_cost: u32,
    pub parallelism: u32,
}

impl Default for Argon2Params {
    fn default() -> Self {
        Self {
            time_cost: DEFAULT_TIME_COST,
            memory_cost: DEFAULT_MEMORY_COST,
            parallelism: DEFAULT_PARALLELISM,
        }
    }
}

/// Key derivation function and its cost parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "algorithm")]
pub enum KdfParams {
    #[serde(rename = "pbkdf2-sha256")]
    Pbkdf2Sha256 { iterations: u32 },
    #[serde(rename = "argon2id")]
    Argon2id(Argon2Params),
}

impl Default for KdfParams {
    fn default() -> Self {
        KdfParams::Argon2id(Argon2Params::default())
    }
}

impl KdfParams {
    /// Parameters of envelopes that carry no `kdf` field
    pub fn legacy() -> Self {
        KdfParams::Pbkdf2Sha256 {
            iterations: DEFAULT_PBKDF2_ITERATIONS,
        }
    }

    pub fn algorithm(&self) -> &'static str {
        match self {
            KdfParams::Pbkdf2Sha256 { .. } => "pbkdf2-sha256",
            KdfParams::Argon2id(_) => "argon2id",
        }
    }

    /// Reject parameters no legitimate export would use.
    ///
    /// Applied to envelopes read from disk, before any key is derived.
    pub fn check_bounds(&self) -> Result<()> {
        match *self {
            KdfParams::Pbkdf2Sha256 { iterations } => {
                if iterations == 0 || iterations > MAX_PBKDF2_ITERATIONS {
                    return Err(Error::malformed(format!(
                        "pbkdf2 iteration count {} out of range",
                        iterations
                    )));
                }
            }
            KdfParams::Argon2id(p) => {
                if p.parallelism == 0 || p.parallelism > MAX_PARALLELISM {
                    return Err(Error::malformed("argon2 parallelism out of range"));
                }
                if p.time_cost == 0 || p.time_cost > MAX_TIME_COST {
                    return Err(Error::malformed("argon2 time cost out of range"));
                }
                if p.memory_cost < 8 * p.parallelism || p.memory_cost > MAX_MEMORY_COST {
                    return Err(Error::malformed("argon2 memory cost out of range"));
                }
            }
        }
        Ok(())
    }
}

/// Serialized container holding salt, IV and ciphertext
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedEnvelope {
    /// Base64-encoded random salt
    pub salt: String,
    /// Base64-encoded AES-GCM nonce
    pub iv: String,
    /// Base64-encoded ciphertext with the tag appended
    pub data: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kdf: Option<KdfParams>,
}

/// Envelope with every field decoded and checked
#[derive(Debug, Clone)]
pub struct DecodedEnvelope {
    pub salt: [u8; SALT_LEN],
    pub iv: [u8; IV_LEN],
    pub ciphertext: Vec<u8>,
    pub kdf: KdfParams,
}

impl EncryptedEnvelope {
    pub fn new(salt: &[u8], iv: &[u8], ciphertext: &[u8], kdf: KdfParams) -> Self {
        let engine = base64::engine::general_purpose::STANDARD;
        Self {
            salt: engine.encode(salt),
            iv: engine.encode(iv),
            data: engine.encode(ciphertext),
            kdf: Some(kdf),
        }
    }

    /// Parse envelope text. Any structural problem is a malformed envelope.
    pub fn parse(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| Error::malformed(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decode base64 fields and check lengths and KDF bounds
    pub fn decode(&self) -> Result<DecodedEnvelope> {
        let engine = base64::engine::general_purpose::STANDARD;

        let salt = engine
            .decode(self.salt.trim())
            .map_err(|_| Error::malformed("salt is not valid base64"))?;
        let salt: [u8; SALT_LEN] = salt
            .try_into()
            .map_err(|_| Error::malformed(format!("salt must be {} bytes", SALT_LEN)))?;

        let iv = engine
            .decode(self.iv.trim())
            .map_err(|_| Error::malformed("iv is not valid base64"))?;
        let iv: [u8; IV_LEN] = iv
            .try_into()
            .map_err(|_| Error::malformed(format!("iv must be {} bytes", IV_LEN)))?;

        let ciphertext = engine
            .decode(self.data.trim())
            .map_err(|_| Error::malformed("data is not valid base64"))?;
        if ciphertext.len() < TAG_LEN {
            return Err(Error::malformed("data is shorter than the authentication tag"));
        }

        let kdf = self.kdf.unwrap_or_else(KdfParams::legacy);
        kdf.check_bounds()?;

        Ok(DecodedEnvelope {
            salt,
            iv,
            ciphertext,
            kdf,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> EncryptedEnvelope {
        EncryptedEnvelope::new(&[7u8; SALT_LEN], &[9u8; IV_LEN], &[1u8; 40], KdfParams::default())
    }

    #[test]
    fn test_envelope_wire_format() {
        let json = sample().to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(value["salt"].is_string());
        assert!(value["iv"].is_string());
        assert!(value["data"].is_string());
        assert_eq!(value["kdf"]["algorithm"], "argon2id");
        assert_eq!(value["kdf"]["memoryCost"], 65536);
    }

    #[test]
    fn test_legacy_envelope_defaults_to_pbkdf2() {
        let mut env = sample();
        env.kdf = None;
        let json = env.to_json().unwrap();
        assert!(!json.contains("kdf"));

        let decoded = EncryptedEnvelope::parse(&json).unwrap().decode().unwrap();
        assert_eq!(
            decoded.kdf,
            KdfParams::Pbkdf2Sha256 {
                iterations: 100_000
            }
        );
    }

    #[test]
    fn test_parse_rejects_non_json() {
        assert!(matches!(
            EncryptedEnvelope::parse("not json"),
            Err(Error::MalformedEnvelope(_))
        ));
        assert!(matches!(
            EncryptedEnvelope::parse(r#"{"salt": "AAAA"}"#),
            Err(Error::MalformedEnvelope(_))
        ));
    }

    #[test]
    fn test_decode_rejects_bad_lengths() {
        let mut env = sample();
        env.iv = base64::engine::general_purpose::STANDARD.encode([0u8; 16]);
        assert!(matches!(env.decode(), Err(Error::MalformedEnvelope(_))));

        let mut env = sample();
        env.data = base64::engine::general_purpose::STANDARD.encode([0u8; 4]);
        assert!(matches!(env.decode(), Err(Error::MalformedEnvelope(_))));

        let mut env = sample();
        env.salt = "%%%".to_string();
        assert!(matches!(env.decode(), Err(Error::MalformedEnvelope(_))));
    }

    #[test]
    fn test_decode_rejects_hostile_kdf_params() {
        let mut env = sample();
        env.kdf = Some(KdfParams::Argon2id(Argon2Params {
            time_cost: 3,
            memory_cost: 64 * 1024 * 1024,
            parallelism: 4,
        }));
        assert!(matches!(env.decode(), Err(Error::MalformedEnvelope(_))));

        env.kdf = Some(KdfParams::Pbkdf2Sha256 { iterations: 0 });
        assert!(matches!(env.decode(), Err(Error::MalformedEnvelope(_))));
    }
}

//! Encryption codec - password-protected envelopes
//!
//! Key derivation is Argon2id or PBKDF2-SHA256, the cipher is AES-256-GCM.
//! Every call to `encrypt` draws a fresh salt and nonce from the OS CSPRNG,
//! so a key/nonce pair is never reused.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use rand::rngs::OsRng;
use rand::RngCore;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sha2::Sha256;
use zeroize::Zeroizing;

use crate::domain::result::{Error, Result};
use crate::domain::{DecodedEnvelope, EncryptedEnvelope, KdfParams, IV_LEN, SALT_LEN};

/// AES-256 key length in bytes
pub const KEY_LEN: usize = 32;

/// Cooperative cancellation for long-running codec calls
///
/// Checked between the stages of a call; an in-progress key derivation
/// runs to completion before the flag is seen.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(Error::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Password-based envelope codec
#[derive(Debug, Clone, Copy, Default)]
pub struct Codec {
    kdf: KdfParams,
}

impl Codec {
    /// Codec that derives keys for new envelopes with `kdf`
    ///
    /// Decryption always uses the parameters recorded in the envelope.
    pub fn new(kdf: KdfParams) -> Self {
        Self { kdf }
    }

    pub fn kdf(&self) -> KdfParams {
        self.kdf
    }

    /// Serialize `payload` to JSON and seal it under `password`
    pub fn encrypt<T: Serialize + ?Sized>(&self, payload: &T, password: &str) -> Result<String> {
        self.encrypt_cancellable(payload, password, &CancelFlag::new())
    }

    /// Open an envelope produced by [`Codec::encrypt`]
    pub fn decrypt<T: DeserializeOwned>(&self, envelope_text: &str, password: &str) -> Result<T> {
        self.decrypt_cancellable(envelope_text, password, &CancelFlag::new())
    }

    pub fn encrypt_cancellable<T: Serialize + ?Sized>(
        &self,
        payload: &T,
        password: &str,
        cancel: &CancelFlag,
    ) -> Result<String> {
        cancel.check()?;

        let mut salt = [0u8; SALT_LEN];
        let mut iv = [0u8; IV_LEN];
        OsRng.fill_bytes(&mut salt);
        OsRng.fill_bytes(&mut iv);

        let plaintext = Zeroizing::new(serde_json::to_vec(payload)?);
        let key = derive_key(password, &salt, &self.kdf)?;
        cancel.check()?;

        let cipher = build_cipher(&key)?;
        let ciphertext = cipher
            .encrypt(Nonce::from_slice(&iv), plaintext.as_slice())
            .map_err(|_| Error::Encryption("AES-GCM encryption failed".to_string()))?;

        let text = EncryptedEnvelope::new(&salt, &iv, &ciphertext, self.kdf).to_json()?;
        cancel.check()?;
        Ok(text)
    }

    pub fn decrypt_cancellable<T: DeserializeOwned>(
        &self,
        envelope_text: &str,
        password: &str,
        cancel: &CancelFlag,
    ) -> Result<T> {
        cancel.check()?;
        let envelope = EncryptedEnvelope::parse(envelope_text)?.decode()?;
        self.decrypt_decoded(&envelope, password, cancel)
    }

    /// Decrypt an envelope that was already parsed and decoded
    pub fn decrypt_decoded<T: DeserializeOwned>(
        &self,
        envelope: &DecodedEnvelope,
        password: &str,
        cancel: &CancelFlag,
    ) -> Result<T> {
        cancel.check()?;

        let key = derive_key(password, &envelope.salt, &envelope.kdf)?;
        cancel.check()?;

        let cipher = build_cipher(&key)?;
        let plaintext = Zeroizing::new(
            cipher
                .decrypt(Nonce::from_slice(&envelope.iv), envelope.ciphertext.as_slice())
                .map_err(|_| Error::AuthenticationFailure)?,
        );

        let payload = serde_json::from_slice(&plaintext)
            .map_err(|e| Error::Deserialization(e.to_string()))?;
        cancel.check()?;
        Ok(payload)
    }
}

/// Derive a 256-bit key from `password` and `salt`
pub fn derive_key(password: &str, salt: &[u8], kdf: &KdfParams) -> Result<Zeroizing<[u8; KEY_LEN]>> {
    let mut key = Zeroizing::new([0u8; KEY_LEN]);

    match kdf {
        KdfParams::Pbkdf2Sha256 { iterations } => {
            pbkdf2::pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, *iterations, &mut key[..]);
        }
        KdfParams::Argon2id(params) => {
            let argon2_params = argon2::Params::new(
                params.memory_cost,
                params.time_cost,
                params.parallelism,
                Some(KEY_LEN),
            )
            .map_err(|e| Error::KeyDerivation(format!("invalid argon2 params: {}", e)))?;

            let argon2 = argon2::Argon2::new(
                argon2::Algorithm::Argon2id,
                argon2::Version::V0x13,
                argon2_params,
            );
            argon2
                .hash_password_into(password.as_bytes(), salt, &mut key[..])
                .map_err(|e| Error::KeyDerivation(format!("failed to derive key: {}", e)))?;
        }
    }

    Ok(key)
}

fn build_cipher(key: &[u8; KEY_LEN]) -> Result<Aes256Gcm> {
    Aes256Gcm::new_from_slice(key).map_err(|_| Error::Encryption("invalid key length".to_string()))
}

/// Run [`Codec::encrypt_cancellable`] on the blocking thread pool
pub async fn encrypt_in_background<T>(
    codec: Codec,
    payload: T,
    password: String,
    cancel: CancelFlag,
) -> Result<String>
where
    T: Serialize + Send + 'static,
{
    let password = Zeroizing::new(password);
    tokio::task::spawn_blocking(move || codec.encrypt_cancellable(&payload, &password, &cancel))
        .await
        .map_err(|e| Error::Encryption(format!("background task failed: {}", e)))?
}

/// Run [`Codec::decrypt_cancellable`] on the blocking thread pool
pub async fn decrypt_in_background<T>(
    codec: Codec,
    envelope_text: String,
    password: String,
    cancel: CancelFlag,
) -> Result<T>
where
    T: DeserializeOwned + Send + 'static,
{
    let password = Zeroizing::new(password);
    tokio::task::spawn_blocking(move || {
        codec.decrypt_cancellable(&envelope_text, &password, &cancel)
    })
    .await
    .map_err(|e| Error::Encryption(format!("background task failed: {}", e)))?
}

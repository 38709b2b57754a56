//! Identity provider abstraction.
//!
//! Signing, encryption, and decryption belong to an external identity
//! provider; this crate only calls it and never reimplements cryptography.
//! [`MockIdentity`] gives tests a deterministic stand-in.

use async_trait::async_trait;
use thiserror::Error;

use relay_types::{MessageId, MessageTemplate, SignedMessage};

/// Identity provider errors.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// Encryption failed.
    #[error("encryption failed: {0}")]
    EncryptionFailed(String),

    /// Decryption failed.
    #[error("decryption failed: {0}")]
    DecryptionFailed(String),

    /// Signing failed.
    #[error("signing failed: {0}")]
    SigningFailed(String),
}

/// The external identity provider.
///
/// Holds the key material; signs message templates (assigning the final
/// message id and authentication proof) and encrypts/decrypts message
/// bodies addressed to a public identity.
#[async_trait]
pub trait Identity: Send + Sync {
    /// This identity's public key.
    fn public_key(&self) -> &str;

    /// Sign a template, assigning the message id and proof.
    async fn sign(&self, template: MessageTemplate) -> Result<SignedMessage, IdentityError>;

    /// Encrypt plaintext addressed to `recipient`.
    async fn encrypt(&self, plaintext: &str, recipient: &str) -> Result<String, IdentityError>;

    /// Decrypt ciphertext from `sender`.
    async fn decrypt(&self, ciphertext: &str, sender: &str) -> Result<String, IdentityError>;
}

/// Mock identity for testing.
///
/// Encrypt/decrypt use a reversible base64 envelope; signing derives the
/// message id from a SHA-256 of the signed fields, so ids are stable for
/// identical input. Call counters let tests assert which capabilities were
/// exercised.
#[derive(Debug)]
pub struct MockIdentity {
    public_key: String,
    counters: std::sync::Mutex<CallCounters>,
    fail_next_encrypt: std::sync::Mutex<Option<String>>,
}

/// Number of times each capability was invoked.
#[derive(Debug, Default, Clone, Copy)]
pub struct CallCounters {
    /// `encrypt` invocations.
    pub encrypt: usize,
    /// `decrypt` invocations.
    pub decrypt: usize,
    /// `sign` invocations.
    pub sign: usize,
}

impl MockIdentity {
    /// Create a mock identity with the given public key.
    pub fn new(public_key: impl Into<String>) -> Self {
        Self {
            public_key: public_key.into(),
            counters: std::sync::Mutex::new(CallCounters::default()),
            fail_next_encrypt: std::sync::Mutex::new(None),
        }
    }

    /// Snapshot of the call counters.
    pub fn calls(&self) -> CallCounters {
        *self.counters.lock().unwrap()
    }

    /// Cause the next `encrypt` to fail with the given error.
    pub fn fail_next_encrypt(&self, error: &str) {
        *self.fail_next_encrypt.lock().unwrap() = Some(error.to_string());
    }
}

impl Default for MockIdentity {
    fn default() -> Self {
        Self::new("a".repeat(64))
    }
}

#[async_trait]
impl Identity for MockIdentity {
    fn public_key(&self) -> &str {
        &self.public_key
    }

    async fn sign(&self, template: MessageTemplate) -> Result<SignedMessage, IdentityError> {
        self.counters.lock().unwrap().sign += 1;

        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(self.public_key.as_bytes());
        hasher.update(template.kind.to_be_bytes());
        hasher.update(template.created_at.to_be_bytes());
        hasher.update(template.content.as_bytes());
        let id = hex::encode(hasher.finalize());

        Ok(SignedMessage {
            id: MessageId::new(id.as_str()),
            pubkey: self.public_key.clone(),
            kind: template.kind,
            created_at: template.created_at,
            tags: template.tags,
            content: template.content,
            sig: format!("mock-sig-{}", &id[..16]),
        })
    }

    async fn encrypt(&self, plaintext: &str, _recipient: &str) -> Result<String, IdentityError> {
        self.counters.lock().unwrap().encrypt += 1;

        if let Some(error) = self.fail_next_encrypt.lock().unwrap().take() {
            return Err(IdentityError::EncryptionFailed(error));
        }

        use base64::{engine::general_purpose::STANDARD, Engine};
        Ok(format!("enc:{}", STANDARD.encode(plaintext)))
    }

    async fn decrypt(&self, ciphertext: &str, _sender: &str) -> Result<String, IdentityError> {
        self.counters.lock().unwrap().decrypt += 1;

        use base64::{engine::general_purpose::STANDARD, Engine};
        let encoded = ciphertext
            .strip_prefix("enc:")
            .ok_or_else(|| IdentityError::DecryptionFailed("not mock ciphertext".into()))?;
        let bytes = STANDARD
            .decode(encoded)
            .map_err(|e| IdentityError::DecryptionFailed(e.to_string()))?;
        String::from_utf8(bytes).map_err(|e| IdentityError::DecryptionFailed(e.to_string()))
    }
}

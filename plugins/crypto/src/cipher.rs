//! AES-256-GCM session built from the configured key and IV.
//!
//! Ciphertext layout: `version(1) | nonce(12) | sealed(payload) | tag(16)`,
//! where the payload is `kind(1) | value`. The configured IV is bound as
//! associated data, a fresh random nonce is drawn for every value.
use ring::aead::{AES_256_GCM, Aad, LessSafeKey, NONCE_LEN, Nonce, UnboundKey};
use ring::rand::{SecureRandom, SystemRandom};

use kdb_core::KeyValue;

const FORMAT_VERSION: u8 = 1;
const KIND_STRING: u8 = 1;
const KIND_BINARY: u8 = 2;

#[derive(Debug, thiserror::Error)]
pub enum CipherError {
    #[error("cryptographic key rejected")]
    InvalidKey,
    #[error("no randomness available for nonce")]
    Random,
    #[error("value could not be encrypted")]
    Seal,
    #[error("value could not be decrypted (wrong key or tampered data)")]
    Open,
    #[error("ciphertext has an unknown format")]
    Format,
}

pub struct Session {
    key: LessSafeKey,
    iv: Vec<u8>,
    rng: SystemRandom,
}

impl Session {
    pub fn new(key: &[u8], iv: &[u8]) -> Result<Self, CipherError> {
        let unbound = UnboundKey::new(&AES_256_GCM, key).map_err(|_| CipherError::InvalidKey)?;
        Ok(Self {
            key: LessSafeKey::new(unbound),
            iv: iv.to_vec(),
            rng: SystemRandom::new(),
        })
    }

    /// Encrypts a string or binary value; other values are not encryptable.
    pub fn encrypt(&self, value: &KeyValue) -> Result<Option<Vec<u8>>, CipherError> {
        let (kind, payload) = match value {
            KeyValue::String(s) => (KIND_STRING, s.as_bytes()),
            KeyValue::Binary(b) => (KIND_BINARY, b.as_slice()),
            KeyValue::None | KeyValue::Function(_) => return Ok(None),
        };
        let mut in_out = Vec::with_capacity(1 + payload.len() + AES_256_GCM.tag_len());
        in_out.push(kind);
        in_out.extend_from_slice(payload);

        let mut nonce_bytes = [0u8; NONCE_LEN];
        self.rng.fill(&mut nonce_bytes).map_err(|_| CipherError::Random)?;
        self.key
            .seal_in_place_append_tag(
                Nonce::assume_unique_for_key(nonce_bytes),
                Aad::from(self.iv.as_slice()),
                &mut in_out,
            )
            .map_err(|_| CipherError::Seal)?;

        let mut out = Vec::with_capacity(1 + NONCE_LEN + in_out.len());
        out.push(FORMAT_VERSION);
        out.extend_from_slice(&nonce_bytes);
        out.extend_from_slice(&in_out);
        Ok(Some(out))
    }

    pub fn decrypt(&self, data: &[u8]) -> Result<KeyValue, CipherError> {
        let min_len = 1 + NONCE_LEN + AES_256_GCM.tag_len() + 1;
        if data.len() < min_len || data[0] != FORMAT_VERSION {
            return Err(CipherError::Format);
        }
        let nonce = Nonce::try_assume_unique_for_key(&data[1..1 + NONCE_LEN]).map_err(|_| CipherError::Format)?;
        let mut in_out = data[1 + NONCE_LEN..].to_vec();
        let plain = self
            .key
            .open_in_place(nonce, Aad::from(self.iv.as_slice()), &mut in_out)
            .map_err(|_| CipherError::Open)?;

        match plain.split_first() {
            Some((&KIND_STRING, text)) => String::from_utf8(text.to_vec())
                .map(KeyValue::String)
                .map_err(|_| CipherError::Format),
            Some((&KIND_BINARY, bytes)) => Ok(KeyValue::Binary(bytes.to_vec())),
            _ => Err(CipherError::Format),
        }
    }
}

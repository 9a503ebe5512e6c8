//! Encrypted configuration secrets.
//!
//! A sealed value looks like `ENC[AES256-GCM,data:<b64>,iv:<b64>,tag:<b64>]`
//! and is produced by the `encrypt` subcommand. Opened values come back as
//! [`SecretString`].

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use aes_gcm::aead::{Aead, KeyInit, OsRng};
use aes_gcm::{AeadCore, Aes256Gcm, Nonce};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as B64;
use regex::Regex;
use secrecy::SecretString;
use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Environment variable holding the master key.
pub const MASTER_KEY_ENV: &str = "BLOBVAULT_MASTER_KEY";

const NONCE_LEN: usize = 12;
const TAG_LEN: usize = 16;

static SEALED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^ENC\[AES256-GCM,data:(?P<data>[A-Za-z0-9+/=]+),iv:(?P<iv>[A-Za-z0-9+/=]+),tag:(?P<tag>[A-Za-z0-9+/=]+)\]$",
    )
    .expect("sealed secret pattern compiles")
});

/// 256-bit key used to seal and open configuration secrets. Wiped on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct MasterKey([u8; 32]);

impl MasterKey {
    fn cipher(&self) -> Aes256Gcm {
        Aes256Gcm::new((&self.0).into())
    }
}

impl fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("MasterKey([REDACTED])")
    }
}

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("{MASTER_KEY_ENV} must be 32 bytes as 64 hex chars or base64")]
    BadMasterKey,

    #[error("malformed sealed secret: {0}")]
    Malformed(String),

    /// Wrong key, or the sealed value was altered.
    #[error("sealed secret could not be opened with this master key")]
    OpenFailed,

    #[error("sealing failed")]
    SealFailed,

    #[error("secret is sealed but {MASTER_KEY_ENV} is not set")]
    MissingKey,
}

/// Parse a master key from 64 hex characters or from base64.
pub fn parse_master_key(raw: &str) -> Result<MasterKey, CryptoError> {
    let raw = raw.trim();
    let decoded = match hex::decode(raw) {
        Ok(bytes) if raw.len() == 64 => bytes,
        _ => B64.decode(raw).map_err(|_| CryptoError::BadMasterKey)?,
    };
    <[u8; 32]>::try_from(decoded)
        .map(MasterKey)
        .map_err(|_| CryptoError::BadMasterKey)
}

/// The parts of an `ENC[AES256-GCM,...]` value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealedSecret {
    ciphertext: Vec<u8>,
    nonce: [u8; NONCE_LEN],
    tag: [u8; TAG_LEN],
}

impl SealedSecret {
    /// Encrypt `plaintext` under `key` with a fresh random nonce.
    pub fn seal(plaintext: &str, key: &MasterKey) -> Result<Self, CryptoError> {
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let mut ciphertext = key
            .cipher()
            .encrypt(&nonce, plaintext.as_bytes())
            .map_err(|_| CryptoError::SealFailed)?;

        // aes-gcm appends the tag to the ciphertext.
        let split = ciphertext.len().saturating_sub(TAG_LEN);
        let tag = <[u8; TAG_LEN]>::try_from(&ciphertext[split..])
            .map_err(|_| CryptoError::SealFailed)?;
        ciphertext.truncate(split);

        Ok(Self {
            ciphertext,
            nonce: fixed("iv", nonce.to_vec())?,
            tag,
        })
    }

    /// Decrypt and authenticate with `key`.
    pub fn open(&self, key: &MasterKey) -> Result<SecretString, CryptoError> {
        let mut sealed = Vec::with_capacity(self.ciphertext.len() + TAG_LEN);
        sealed.extend_from_slice(&self.ciphertext);
        sealed.extend_from_slice(&self.tag);

        let plaintext = key
            .cipher()
            .decrypt(Nonce::from_slice(&self.nonce), sealed.as_slice())
            .map_err(|_| CryptoError::OpenFailed)?;
        String::from_utf8(plaintext)
            .map(SecretString::new)
            .map_err(|_| CryptoError::Malformed("plaintext is not UTF-8".to_owned()))
    }
}

impl FromStr for SealedSecret {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let caps = SEALED_RE
            .captures(s.trim())
            .ok_or_else(|| CryptoError::Malformed("not an ENC[AES256-GCM,...] value".to_owned()))?;
        let field = |name: &str| {
            B64.decode(&caps[name])
                .map_err(|_| CryptoError::Malformed(format!("{name} is not valid base64")))
        };
        Ok(Self {
            ciphertext: field("data")?,
            nonce: fixed("iv", field("iv")?)?,
            tag: fixed("tag", field("tag")?)?,
        })
    }
}

fn fixed<const N: usize>(name: &str, bytes: Vec<u8>) -> Result<[u8; N], CryptoError> {
    let len = bytes.len();
    bytes
        .try_into()
        .map_err(|_| CryptoError::Malformed(format!("{name} must be {N} bytes, got {len}")))
}

impl fmt::Display for SealedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ENC[AES256-GCM,data:{},iv:{},tag:{}]",
            B64.encode(&self.ciphertext),
            B64.encode(self.nonce),
            B64.encode(self.tag),
        )
    }
}

/// Returns `true` if `value` has the `ENC[AES256-GCM,...]` shape.
pub fn is_encrypted(value: &str) -> bool {
    SEALED_RE.is_match(value.trim())
}

/// Seal `plaintext` and render it for a config file.
pub fn encrypt_value(plaintext: &str, key: &MasterKey) -> Result<String, CryptoError> {
    SealedSecret::seal(plaintext, key).map(|sealed| sealed.to_string())
}

/// Resolve a configured secret. Sealed values are opened with `key`;
/// plaintext passes through without one.
pub fn resolve_secret(value: &str, key: Option<&MasterKey>) -> Result<SecretString, CryptoError> {
    if !is_encrypted(value) {
        return Ok(SecretString::new(value.to_owned()));
    }
    let sealed: SealedSecret = value.parse()?;
    sealed.open(key.ok_or(CryptoError::MissingKey)?)
}

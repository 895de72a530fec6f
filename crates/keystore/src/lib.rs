//! RewardSync Keystore
//!
//! Locates and loads the claim signer's private key, and resolves the
//! platform-aware config/data directories the other crates use.
//!
//! Keys are never generated here. The operator provisions one, either as an
//! environment variable or as a key file holding hex text (`0x` optional) or
//! the raw 32 bytes.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Environment variable read when no key source is configured.
pub const DEFAULT_KEY_ENV: &str = "AUTO_CLAIM_PRIVATE_KEY";

#[derive(Error, Debug)]
pub enum KeystoreError {
    #[error("Signing key not provided: {0}")]
    Missing(String),
    #[error("Failed to read key file: {0}")]
    ReadError(String),
    #[error("Invalid key format")]
    InvalidFormat,
}

pub type Result<T> = std::result::Result<T, KeystoreError>;

/// Where the signing key comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeySource {
    /// Name of an environment variable holding the hex key.
    Env(String),
    /// Path to a key file (`~` is expanded).
    File(PathBuf),
}

impl Default for KeySource {
    fn default() -> Self {
        Self::Env(DEFAULT_KEY_ENV.to_string())
    }
}

impl fmt::Display for KeySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Env(name) => write!(f, "env:{name}"),
            Self::File(path) => write!(f, "file:{}", path.display()),
        }
    }
}

/// 32-byte secp256k1 secret. Debug output is redacted.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretKeyBytes([u8; 32]);

impl SecretKeyBytes {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Debug for SecretKeyBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKeyBytes(<redacted>)")
    }
}

/// Load the signing key from its configured source, reading the process
/// environment for `KeySource::Env`.
pub fn load_signing_key(source: &KeySource) -> Result<SecretKeyBytes> {
    load_signing_key_with(source, |name| std::env::var(name).ok())
}

/// Like [`load_signing_key`] with an injectable environment lookup.
pub fn load_signing_key_with<F>(source: &KeySource, env: F) -> Result<SecretKeyBytes>
where
    F: Fn(&str) -> Option<String>,
{
    match source {
        KeySource::Env(name) => {
            let value = env(name)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| KeystoreError::Missing(format!("environment variable {name} is not set")))?;
            parse_hex_key(&value)
        }
        KeySource::File(path) => {
            let path = expand_path(&path.to_string_lossy());
            load_key_file(&path)
        }
    }
}

/// Read a key file holding hex text or the raw 32 bytes.
pub fn load_key_file(path: &Path) -> Result<SecretKeyBytes> {
    if !path.exists() {
        return Err(KeystoreError::Missing(format!(
            "key file {} does not exist",
            path.display()
        )));
    }
    debug!("Loading signing key from {}", path.display());
    let bytes = fs::read(path).map_err(|e| KeystoreError::ReadError(e.to_string()))?;

    match std::str::from_utf8(&bytes) {
        Ok(text) if looks_like_hex(text) => parse_hex_key(text),
        _ if bytes.len() == 32 => {
            let mut secret = [0u8; 32];
            secret.copy_from_slice(&bytes);
            Ok(SecretKeyBytes(secret))
        }
        _ => Err(KeystoreError::InvalidFormat),
    }
}

/// Parse a hex private key, with or without `0x`.
pub fn parse_hex_key(text: &str) -> Result<SecretKeyBytes> {
    let trimmed = text.trim();
    let hex_part = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    let decoded = hex::decode(hex_part).map_err(|_| KeystoreError::InvalidFormat)?;
    let secret: [u8; 32] = decoded
        .as_slice()
        .try_into()
        .map_err(|_| KeystoreError::InvalidFormat)?;
    if secret == [0u8; 32] {
        return Err(KeystoreError::InvalidFormat);
    }
    Ok(SecretKeyBytes(secret))
}

fn looks_like_hex(text: &str) -> bool {
    let trimmed = text.trim();
    let body = trimmed.strip_prefix("0x").unwrap_or(trimmed);
    !body.is_empty() && body.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Get the default config directory for a given service name.
///
/// - macOS: `~/Library/Application Support/{ServiceName}`
/// - Linux: `~/.config/{service_name}`
/// - Windows: `%APPDATA%\{ServiceName}`
pub fn default_config_dir_for(service: &str) -> PathBuf {
    #[cfg(target_os = "macos")]
    {
        home_dir().join("Library").join("Application Support").join(capitalize(service))
    }
    #[cfg(target_os = "linux")]
    {
        let xdg = std::env::var("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| home_dir().join(".config"));
        xdg.join(service.to_lowercase())
    }
    #[cfg(target_os = "windows")]
    {
        let appdata = std::env::var("APPDATA")
            .map(PathBuf::from)
            .unwrap_or_else(|_| home_dir().join("AppData").join("Roaming"));
        appdata.join(capitalize(service))
    }
    #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
    {
        home_dir().join(format!(".{}", service.to_lowercase()))
    }
}

/// Expand `~` in paths to the home directory.
pub fn expand_path(path: &str) -> PathBuf {
    match path.strip_prefix("~/") {
        Some(rest) => home_dir().join(rest),
        None if path == "~" => home_dir(),
        None => PathBuf::from(path),
    }
}

fn home_dir() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

#[cfg(any(target_os = "macos", target_os = "windows"))]
fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(c) => c.to_uppercase().to_string() + &chars.as_str().to_lowercase(),
    }
}

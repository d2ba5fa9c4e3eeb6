use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

const SHA256_HEX_LEN: usize = 64;

/// Certificate fingerprint.
///
/// The text is kept exactly as stored or presented (trimmed), so a pin
/// round-trips unchanged. Comparison goes through the normalized form:
/// lowercase hex with `:` separators, whitespace, and an optional `sha256:`
/// prefix removed. `AA:BB` and `aabb` are the same fingerprint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Returns `None` for blank input.
    pub fn new(raw: impl AsRef<str>) -> Option<Self> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_owned()))
        }
    }

    /// SHA-256 over a DER-encoded certificate, rendered as uppercase
    /// colon-separated hex.
    pub fn of_der(der: &[u8]) -> Self {
        let digest = Sha256::digest(der);
        let hex: Vec<String> = digest.iter().map(|byte| format!("{byte:02X}")).collect();
        Self(hex.join(":"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn normalized(&self) -> String {
        let text = self.0.trim();
        let text = match text.get(..7) {
            Some(prefix) if prefix.eq_ignore_ascii_case("sha256:") => text.get(7..).unwrap_or(""),
            _ => text,
        };
        text.chars()
            .filter(|ch| *ch != ':' && !ch.is_whitespace())
            .map(|ch| ch.to_ascii_lowercase())
            .collect()
    }

    /// Whether the normalized form is a full SHA-256 digest.
    pub fn is_sha256(&self) -> bool {
        let normalized = self.normalized();
        normalized.len() == SHA256_HEX_LEN && normalized.chars().all(|ch| ch.is_ascii_hexdigit())
    }

    /// Case-insensitive hex comparison.
    pub fn matches(&self, other: &Self) -> bool {
        self.normalized() == other.normalized()
    }
}

impl PartialEq for Fingerprint {
    fn eq(&self, other: &Self) -> bool {
        self.matches(other)
    }
}

impl Eq for Fingerprint {}

impl Hash for Fingerprint {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.normalized().hash(state);
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

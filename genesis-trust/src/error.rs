use std::io;
use std::path::PathBuf;

use crate::endpoint::StableId;
use crate::fingerprint::Fingerprint;

/// Rejected endpoint data. These are caller errors raised before any trust
/// decision is attempted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EndpointError {
    #[error("endpoint stable id must not be empty")]
    EmptyStableId,

    #[error("endpoint stable id {0:?} contains surrounding whitespace or control characters")]
    MalformedStableId(String),

    #[error("endpoint host must not be empty")]
    EmptyHost,
}

/// Failures reading or writing persisted pins.
#[derive(Debug, thiserror::Error)]
pub enum TrustStoreError {
    #[error("failed to read trust store {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("trust store {} is corrupt", path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("trust store {} has unsupported version {found}", path.display())]
    UnsupportedVersion { path: PathBuf, found: u32 },

    #[error("failed to write trust store {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to lock trust store {}", path.display())]
    Lock {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to encode trust store")]
    Encode(#[source] serde_json::Error),
}

/// Certificate trust failures surfaced to the user.
#[derive(Debug, thiserror::Error)]
pub enum TrustError {
    #[error(
        "certificate for {stable_id} does not match the pinned fingerprint \
         (expected {expected}, presented {presented})"
    )]
    FingerprintMismatch {
        stable_id: StableId,
        expected: Fingerprint,
        presented: Fingerprint,
    },

    #[error("pinned fingerprint {pin} for {stable_id} is not a SHA-256 digest")]
    InvalidPin { stable_id: StableId, pin: Fingerprint },

    #[error("certificate {presented} for {stable_id} was not confirmed")]
    Unconfirmed {
        stable_id: StableId,
        presented: Fingerprint,
    },

    #[error(transparent)]
    Store(#[from] TrustStoreError),
}

impl TrustError {
    /// Fatal errors abort the connection and must not be retried silently.
    /// A declined confirmation is the user's own choice and is not fatal.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::Unconfirmed { .. })
    }
}

use serde::{Deserialize, Serialize};

use crate::endpoint::StableId;
use crate::fingerprint::Fingerprint;

/// Outcome of trust resolution for one connection attempt.
///
/// `Plaintext` means no TLS decision is being made; it does not forbid TLS.
/// Both required variants disallow trust-on-first-use: `Unpinned` only says
/// TLS must be negotiated and the certificate still needs explicit
/// confirmation before it can be trusted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TlsDecision {
    Plaintext,
    Pinned {
        stable_id: StableId,
        fingerprint: Fingerprint,
    },
    Unpinned {
        stable_id: StableId,
    },
}

impl TlsDecision {
    pub fn required(&self) -> bool {
        !matches!(self, Self::Plaintext)
    }

    pub fn expected_fingerprint(&self) -> Option<&Fingerprint> {
        match self {
            Self::Pinned { fingerprint, .. } => Some(fingerprint),
            Self::Plaintext | Self::Unpinned { .. } => None,
        }
    }

    /// Always `false`: silent trust-on-first-use is never authorized here.
    pub fn allow_tofu(&self) -> bool {
        false
    }

    pub fn stable_id(&self) -> Option<&StableId> {
        match self {
            Self::Pinned { stable_id, .. } | Self::Unpinned { stable_id } => Some(stable_id),
            Self::Plaintext => None,
        }
    }

    /// Flat parameters for the TLS transport, `None` when no TLS decision is
    /// made.
    pub fn to_params(&self) -> Option<TlsParams> {
        let stable_id = self.stable_id()?.clone();
        Some(TlsParams {
            required: true,
            expected_fingerprint: self.expected_fingerprint().cloned(),
            allow_tofu: self.allow_tofu(),
            stable_id,
        })
    }
}

/// Transport-facing form of a required [`TlsDecision`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TlsParams {
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_fingerprint: Option<Fingerprint>,
    #[serde(rename = "allowTOFU")]
    pub allow_tofu: bool,
    pub stable_id: StableId,
}

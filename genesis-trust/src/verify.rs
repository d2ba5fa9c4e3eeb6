//! Checking the certificate a TLS transport actually received.
//!
//! The transport hands over the presented leaf certificate (DER). A pinned
//! decision either matches byte for byte or aborts the connection; an
//! unpinned one is never auto-accepted and must go through
//! [`confirm_and_pin`].

use tracing::{info, warn};

use crate::decision::TlsDecision;
use crate::endpoint::StableId;
use crate::error::TrustError;
use crate::fingerprint::Fingerprint;
use crate::store::TrustStore;

/// Result of comparing a presented certificate with a [`TlsDecision`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CertificateCheck {
    /// No TLS decision was made for this connection.
    NotApplicable,
    /// The presented certificate matches the pin.
    Verified {
        stable_id: StableId,
        fingerprint: Fingerprint,
    },
    /// TLS is required but nothing is pinned yet. The connection must not
    /// proceed until the user confirms `presented`.
    NeedsConfirmation {
        stable_id: StableId,
        presented: Fingerprint,
    },
}

impl CertificateCheck {
    pub fn is_trusted(&self) -> bool {
        matches!(self, Self::Verified { .. })
    }
}

pub fn verify_presented_certificate(
    decision: &TlsDecision,
    certificate_der: &[u8],
) -> Result<CertificateCheck, TrustError> {
    let presented = Fingerprint::of_der(certificate_der);
    match decision {
        TlsDecision::Plaintext => Ok(CertificateCheck::NotApplicable),
        TlsDecision::Pinned {
            stable_id,
            fingerprint,
        } => {
            if !fingerprint.is_sha256() {
                warn!(stable_id = %stable_id, "stored pin is not a SHA-256 digest");
                return Err(TrustError::InvalidPin {
                    stable_id: stable_id.clone(),
                    pin: fingerprint.clone(),
                });
            }
            if !fingerprint.matches(&presented) {
                warn!(
                    stable_id = %stable_id,
                    expected = %fingerprint,
                    presented = %presented,
                    "gateway certificate does not match pin"
                );
                return Err(TrustError::FingerprintMismatch {
                    stable_id: stable_id.clone(),
                    expected: fingerprint.clone(),
                    presented,
                });
            }
            Ok(CertificateCheck::Verified {
                stable_id: stable_id.clone(),
                fingerprint: presented,
            })
        }
        TlsDecision::Unpinned { stable_id } => Ok(CertificateCheck::NeedsConfirmation {
            stable_id: stable_id.clone(),
            presented,
        }),
    }
}

/// Hook through which the user confirms an unpinned certificate.
pub trait TrustPrompt {
    fn confirm(&self, stable_id: &StableId, presented: &Fingerprint) -> bool;
}

impl<F> TrustPrompt for F
where
    F: Fn(&StableId, &Fingerprint) -> bool,
{
    fn confirm(&self, stable_id: &StableId, presented: &Fingerprint) -> bool {
        self(stable_id, presented)
    }
}

/// Prompt for non-interactive contexts: declines everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct DenyAllPrompt;

impl TrustPrompt for DenyAllPrompt {
    fn confirm(&self, _stable_id: &StableId, _presented: &Fingerprint) -> bool {
        false
    }
}

/// Resolve a [`CertificateCheck::NeedsConfirmation`] through `prompt`.
///
/// A confirmed certificate is written to `store` and reported as verified;
/// a declined one fails with [`TrustError::Unconfirmed`]. Other checks pass
/// through unchanged and nothing is written.
pub fn confirm_and_pin<S, P>(
    store: &S,
    prompt: &P,
    check: CertificateCheck,
) -> Result<CertificateCheck, TrustError>
where
    S: TrustStore + ?Sized,
    P: TrustPrompt + ?Sized,
{
    let (stable_id, presented) = match check {
        CertificateCheck::NeedsConfirmation {
            stable_id,
            presented,
        } => (stable_id, presented),
        other => return Ok(other),
    };

    if !prompt.confirm(&stable_id, &presented) {
        return Err(TrustError::Unconfirmed {
            stable_id,
            presented,
        });
    }

    store.pin(&stable_id, &presented)?;
    info!(stable_id = %stable_id, "user confirmed gateway certificate");
    Ok(CertificateCheck::Verified {
        stable_id,
        fingerprint: presented,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryTrustStore;

    const CERT: &[u8] = b"0\x82\x01\x0a-test-certificate";

    fn stable_id() -> StableId {
        StableId::parse("bonjour|abc").unwrap()
    }

    #[test]
    fn matching_pin_verifies_case_insensitively() {
        let pin = Fingerprint::new(Fingerprint::of_der(CERT).as_str().to_lowercase()).unwrap();
        let decision = TlsDecision::Pinned {
            stable_id: stable_id(),
            fingerprint: pin,
        };
        let check = verify_presented_certificate(&decision, CERT).unwrap();
        assert!(check.is_trusted());
    }

    #[test]
    fn mismatch_is_fatal() {
        let decision = TlsDecision::Pinned {
            stable_id: stable_id(),
            fingerprint: Fingerprint::of_der(b"other"),
        };
        let error = verify_presented_certificate(&decision, CERT).unwrap_err();
        assert!(matches!(error, TrustError::FingerprintMismatch { .. }));
        assert!(error.is_fatal());
    }

    #[test]
    fn truncated_pin_fails_closed() {
        let decision = TlsDecision::Pinned {
            stable_id: stable_id(),
            fingerprint: Fingerprint::new("11:22").unwrap(),
        };
        let error = verify_presented_certificate(&decision, CERT).unwrap_err();
        assert!(matches!(error, TrustError::InvalidPin { .. }));
        assert!(error.is_fatal());
    }

    #[test]
    fn plaintext_is_not_applicable() {
        let check = verify_presented_certificate(&TlsDecision::Plaintext, CERT).unwrap();
        assert_eq!(check, CertificateCheck::NotApplicable);
    }

    #[test]
    fn unpinned_requires_confirmation_and_declines_by_default() {
        let decision = TlsDecision::Unpinned {
            stable_id: stable_id(),
        };
        let check = verify_presented_certificate(&decision, CERT).unwrap();
        assert!(!check.is_trusted());

        let store = MemoryTrustStore::default();
        let error = confirm_and_pin(&store, &DenyAllPrompt, check).unwrap_err();
        assert!(matches!(error, TrustError::Unconfirmed { .. }));
        assert!(!error.is_fatal());
        assert!(store.records().unwrap().is_empty());
    }

    #[test]
    fn confirmed_certificate_is_pinned() {
        let decision = TlsDecision::Unpinned {
            stable_id: stable_id(),
        };
        let check = verify_presented_certificate(&decision, CERT).unwrap();
        let store = MemoryTrustStore::default();
        let accept = |_: &StableId, _: &Fingerprint| true;

        let confirmed = confirm_and_pin(&store, &accept, check).unwrap();
        assert!(confirmed.is_trusted());
        assert_eq!(
            store.fingerprint(&stable_id()).unwrap(),
            Some(Fingerprint::of_der(CERT))
        );
    }
}

use tracing::debug;

use crate::decision::TlsDecision;
use crate::endpoint::Endpoint;
use crate::error::TrustStoreError;
use crate::fingerprint::Fingerprint;
use crate::store::TrustStore;

/// Decide the TLS requirement for `endpoint`.
///
/// Decision order, first match wins:
/// 1. Manual endpoints are plaintext unless manual TLS is enabled, in which
///    case TLS is required and the stored pin (if any) is expected.
/// 2. A stored pin for a discovered endpoint always wins over discovery data.
/// 3. A TLS hint from discovery requires TLS without a pin. Advertised
///    fingerprints are unauthenticated and never become the expected pin.
/// 4. Otherwise no TLS decision is made.
pub fn resolve_tls_decision(
    endpoint: &Endpoint,
    stored_fingerprint: Option<&str>,
    manual_tls_enabled: bool,
) -> TlsDecision {
    let stable_id = endpoint.stable_id().clone();
    let stored = stored_fingerprint.and_then(Fingerprint::new);

    if endpoint.is_manual() {
        if !manual_tls_enabled {
            return TlsDecision::Plaintext;
        }
        return match stored {
            Some(fingerprint) => TlsDecision::Pinned {
                stable_id,
                fingerprint,
            },
            None => TlsDecision::Unpinned { stable_id },
        };
    }

    if let Some(fingerprint) = stored {
        return TlsDecision::Pinned {
            stable_id,
            fingerprint,
        };
    }

    if endpoint.is_tls_hinted() {
        return TlsDecision::Unpinned { stable_id };
    }

    TlsDecision::Plaintext
}

/// Pairs [`resolve_tls_decision`] with a pin lookup. The resolver only ever
/// reads from the store.
#[derive(Debug, Clone)]
pub struct TrustResolver<S> {
    store: S,
    manual_tls_enabled: bool,
}

impl<S: TrustStore> TrustResolver<S> {
    pub fn new(store: S, manual_tls_enabled: bool) -> Self {
        Self {
            store,
            manual_tls_enabled,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn manual_tls_enabled(&self) -> bool {
        self.manual_tls_enabled
    }

    /// Store failures propagate; an unreadable store must not be mistaken for
    /// "no pin", which would weaken a pinned endpoint.
    pub fn resolve(&self, endpoint: &Endpoint) -> Result<TlsDecision, TrustStoreError> {
        let stored = self.store.fingerprint(endpoint.stable_id())?;
        let decision = resolve_tls_decision(
            endpoint,
            stored.as_ref().map(Fingerprint::as_str),
            self.manual_tls_enabled,
        );
        debug!(
            stable_id = %endpoint.stable_id(),
            manual = endpoint.is_manual(),
            required = decision.required(),
            pinned = decision.expected_fingerprint().is_some(),
            "resolved gateway TLS decision"
        );
        Ok(decision)
    }
}

//! Transport trust for gateway connections.
//!
//! The crate answers one question for the connection layer: given an
//! endpoint and whatever certificate pin was previously confirmed for it,
//! must the connection use TLS, and if so which certificate is acceptable?
//!
//! - [`Endpoint`] and [`StableId`] describe the connection target.
//! - [`TrustStore`] persists confirmed pins keyed by stable id. Only an
//!   explicit confirmation ([`confirm_and_pin`]) or a migration writes to it.
//! - [`resolve_tls_decision`] is the pure decision function; [`TrustResolver`]
//!   pairs it with a store lookup.
//! - [`verify_presented_certificate`] checks the certificate the transport
//!   received against the decision.
//!
//! ```
//! use genesis_trust::{Endpoint, StableId, TlsDecision, resolve_tls_decision};
//!
//! let id = StableId::parse("bonjour|abc").unwrap();
//! let endpoint = Endpoint::discovered(id, "gateway.local", 18789)
//!     .with_tls_hint(true)
//!     .with_advertised_fingerprint(Some("AA:BB".into()));
//!
//! let decision = resolve_tls_decision(&endpoint, None, false);
//! assert!(matches!(decision, TlsDecision::Unpinned { .. }));
//! assert!(decision.expected_fingerprint().is_none());
//! ```

mod decision;
mod endpoint;
mod error;
mod fingerprint;
mod resolver;
mod store;
mod verify;

pub use decision::{TlsDecision, TlsParams};
pub use endpoint::{Endpoint, MANUAL_PREFIX, StableId};
pub use error::{EndpointError, TrustError, TrustStoreError};
pub use fingerprint::Fingerprint;
pub use resolver::{TrustResolver, resolve_tls_decision};
pub use store::{
    FileTrustStore, MemoryTrustStore, TRUST_STORE_VERSION, TrustRecord, TrustStore,
    migrate_legacy_pins,
};
pub use verify::{
    CertificateCheck, DenyAllPrompt, TrustPrompt, confirm_and_pin, verify_presented_certificate,
};

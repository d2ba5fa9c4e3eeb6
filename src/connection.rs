//! Assembly of everything a gateway connection attempt needs before the
//! transport opens: the TLS decision for the endpoint and the handshake
//! options for the requested role.

use genesis_caps::{
    ClientIdentity, ConnectOptions, ConnectRole, FeatureFlagSource, build_connect_options,
};
use genesis_trust::{
    CertificateCheck, Endpoint, StableId, TlsDecision, TlsParams, TrustError, TrustPrompt,
    TrustResolver, TrustStore, TrustStoreError, confirm_and_pin, verify_presented_certificate,
};
use serde::Serialize;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("failed to read the trust store for gateway {stable_id}")]
    TrustStore {
        stable_id: StableId,
        #[source]
        source: TrustStoreError,
    },
    #[error(transparent)]
    Trust(#[from] TrustError),
}

impl ConnectionError {
    /// Whether the attempt must be abandoned rather than retried after user
    /// input.
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::TrustStore { .. } => true,
            Self::Trust(err) => err.is_fatal(),
        }
    }
}

/// One connection attempt, ready to hand to the transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionDescriptor {
    pub endpoint: Endpoint,
    pub tls: TlsDecision,
    pub options: ConnectOptions,
}

impl ConnectionDescriptor {
    /// `wss://` when TLS is required, `ws://` otherwise.
    pub fn url(&self) -> String {
        let scheme = if self.tls.required() { "wss" } else { "ws" };
        let host = self.endpoint.host();
        if host.contains(':') && !host.starts_with('[') {
            format!("{scheme}://[{host}]:{}", self.endpoint.port())
        } else {
            format!("{scheme}://{host}:{}", self.endpoint.port())
        }
    }

    pub fn tls_params(&self) -> Option<TlsParams> {
        self.tls.to_params()
    }

    /// Compare the certificate the transport received with the decision.
    pub fn check_certificate(&self, certificate_der: &[u8]) -> Result<CertificateCheck, TrustError> {
        verify_presented_certificate(&self.tls, certificate_der)
    }
}

/// Builds [`ConnectionDescriptor`]s from a trust store and the current
/// feature flags.
pub struct ConnectionAssembler<S, F> {
    resolver: TrustResolver<S>,
    flags: F,
    identity: ClientIdentity,
}

impl<S: TrustStore, F: FeatureFlagSource> ConnectionAssembler<S, F> {
    pub fn new(store: S, flags: F, identity: ClientIdentity, manual_tls_enabled: bool) -> Self {
        Self {
            resolver: TrustResolver::new(store, manual_tls_enabled),
            flags,
            identity,
        }
    }

    pub fn store(&self) -> &S {
        self.resolver.store()
    }

    pub fn identity(&self) -> &ClientIdentity {
        &self.identity
    }

    /// Resolve trust and negotiate options for one attempt. Flags are
    /// snapshotted here, so every attempt sees the current device state.
    pub fn assemble(
        &self,
        endpoint: &Endpoint,
        role: ConnectRole,
    ) -> Result<ConnectionDescriptor, ConnectionError> {
        let tls = self
            .resolver
            .resolve(endpoint)
            .map_err(|source| ConnectionError::TrustStore {
                stable_id: endpoint.stable_id().clone(),
                source,
            })?;
        let flags = self.flags.snapshot();
        let options = build_connect_options(role, &flags, &self.identity);
        info!(
            stable_id = %endpoint.stable_id(),
            role = %role,
            tls_required = tls.required(),
            pinned = tls.expected_fingerprint().is_some(),
            "assembled gateway connection"
        );
        Ok(ConnectionDescriptor {
            endpoint: endpoint.clone(),
            tls,
            options,
        })
    }

    /// Check the presented certificate and, for an unpinned endpoint, ask
    /// `prompt` before pinning it.
    pub fn accept_certificate<P: TrustPrompt + ?Sized>(
        &self,
        descriptor: &ConnectionDescriptor,
        certificate_der: &[u8],
        prompt: &P,
    ) -> Result<CertificateCheck, ConnectionError> {
        let check = descriptor.check_certificate(certificate_der)?;
        Ok(confirm_and_pin(self.store(), prompt, check)?)
    }
}

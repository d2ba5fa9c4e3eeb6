use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::EndpointError;

/// Prefix carried by stable ids of user-entered endpoints.
pub const MANUAL_PREFIX: &str = "manual|";

/// Identifier of a connection target that survives rediscovery. It is the
/// key under which certificate pins are stored.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StableId(String);

impl StableId {
    pub fn parse(raw: impl Into<String>) -> Result<Self, EndpointError> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(EndpointError::EmptyStableId);
        }
        if raw.trim() != raw || raw.chars().any(char::is_control) {
            return Err(EndpointError::MalformedStableId(raw));
        }
        Ok(Self(raw))
    }

    /// Stable id for a user-entered `host:port` target.
    pub fn manual(host: &str, port: u16) -> Result<Self, EndpointError> {
        let host = host.trim();
        if host.is_empty() {
            return Err(EndpointError::EmptyHost);
        }
        Self::parse(format!("{MANUAL_PREFIX}{host}|{port}"))
    }

    pub fn is_manual(&self) -> bool {
        self.0.starts_with(MANUAL_PREFIX)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for StableId {
    type Err = EndpointError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for StableId {
    type Error = EndpointError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<StableId> for String {
    fn from(value: StableId) -> Self {
        value.0
    }
}

/// A connection target as reported by one discovery event (or entered by
/// the user). A rediscovery produces a new value rather than mutating this one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Endpoint {
    stable_id: StableId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    host: String,
    port: u16,
    #[serde(default)]
    tls_hinted: bool,
    /// Unauthenticated hint from discovery metadata; never used as a pin.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    advertised_fingerprint: Option<String>,
}

impl Endpoint {
    pub fn discovered(stable_id: StableId, host: impl Into<String>, port: u16) -> Self {
        Self {
            stable_id,
            name: None,
            host: host.into(),
            port,
            tls_hinted: false,
            advertised_fingerprint: None,
        }
    }

    /// A user-entered endpoint, keyed as `manual|<host>|<port>`.
    pub fn manual(host: &str, port: u16) -> Result<Self, EndpointError> {
        let stable_id = StableId::manual(host, port)?;
        Ok(Self::discovered(stable_id, host.trim(), port))
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_tls_hint(mut self, hinted: bool) -> Self {
        self.tls_hinted = hinted;
        self
    }

    #[must_use]
    pub fn with_advertised_fingerprint(mut self, fingerprint: Option<String>) -> Self {
        self.advertised_fingerprint = fingerprint;
        self
    }

    pub fn stable_id(&self) -> &StableId {
        &self.stable_id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn is_manual(&self) -> bool {
        self.stable_id.is_manual()
    }

    pub fn advertised_fingerprint(&self) -> Option<&str> {
        self.advertised_fingerprint.as_deref()
    }

    /// TLS is hinted either by the discovery flag or by the presence of an
    /// advertised fingerprint.
    pub fn is_tls_hinted(&self) -> bool {
        self.tls_hinted
            || self
                .advertised_fingerprint
                .as_deref()
                .is_some_and(|fingerprint| !fingerprint.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_ids_carry_prefix() {
        let id = StableId::manual("10.0.0.2", 18789).unwrap();
        assert_eq!(id.as_str(), "manual|10.0.0.2|18789");
        assert!(id.is_manual());
        assert!(!StableId::parse("bonjour|abc").unwrap().is_manual());
    }

    #[test]
    fn malformed_ids_are_rejected() {
        assert_eq!(StableId::parse("  "), Err(EndpointError::EmptyStableId));
        assert!(matches!(
            StableId::parse(" bonjour|abc"),
            Err(EndpointError::MalformedStableId(_))
        ));
        assert!(matches!(
            StableId::parse("bonjour|a\nb"),
            Err(EndpointError::MalformedStableId(_))
        ));
        assert_eq!(StableId::manual(" ", 1), Err(EndpointError::EmptyHost));
    }

    #[test]
    fn advertised_fingerprint_counts_as_hint() {
        let id = StableId::parse("bonjour|abc").unwrap();
        let plain = Endpoint::discovered(id.clone(), "gw.local", 18789);
        assert!(!plain.is_tls_hinted());

        let blank = plain.clone().with_advertised_fingerprint(Some("  ".into()));
        assert!(!blank.is_tls_hinted());

        let advertised = plain.with_advertised_fingerprint(Some("AA:BB".into()));
        assert!(advertised.is_tls_hinted());
    }

    #[test]
    fn stable_id_deserialization_validates() {
        let parsed: Result<StableId, _> = serde_json::from_str("\"\"");
        assert!(parsed.is_err());
        let parsed: StableId = serde_json::from_str("\"tailnet|gw\"").unwrap();
        assert_eq!(parsed.as_str(), "tailnet|gw");
    }
}

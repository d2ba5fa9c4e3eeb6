//! # genesis-gate
//!
//! Authorization pipeline for clients of a genesis gateway. Before a socket
//! opens, three decisions are made and combined here:
//!
//! - **Transport trust** ([`trust`]): whether the endpoint needs TLS and
//!   which certificate fingerprint, if any, is pinned for it.
//! - **Capability negotiation** ([`caps`]): the role, scopes, capabilities
//!   and commands the client advertises in the handshake.
//! - **Execution isolation** ([`sandbox`]): whether an agent session runs in
//!   its real workspace or in a provisioned sandbox directory.
//!
//! ## Quickstart
//!
//! ```bash
//! # TLS parameters for a discovered gateway
//! genesis-gate tls --stable-id "bonjour|desk" --tls-hint
//!
//! # Handshake options for a node with camera access
//! genesis-gate connect-options --role node --camera
//!
//! # Sandbox decision for a chat session
//! genesis-gate sandbox --session-key "agent:main:discord:42" --ensure
//! ```
//!
//! Settings live in `genesis.toml`:
//!
//! ```toml
//! [gateway]
//! manual_tls = true
//!
//! [agents.defaults.sandbox]
//! mode = "non-main"
//! scope = "session"
//! ```
//!
//! ## Library use
//!
//! ```
//! use genesis_gate::caps::{BuildInfo, ClientIdentity, ConnectRole, DeviceMetadata, FeatureFlags};
//! use genesis_gate::trust::{Endpoint, MemoryTrustStore, StableId};
//! use genesis_gate::ConnectionAssembler;
//!
//! let identity = ClientIdentity::new(
//!     "Desk",
//!     "instance-1",
//!     BuildInfo::new("GenesisGate", "0.4.2", false),
//!     DeviceMetadata::default(),
//! );
//! let assembler =
//!     ConnectionAssembler::new(MemoryTrustStore::default(), FeatureFlags::default(), identity, false);
//! let endpoint = Endpoint::discovered(StableId::parse("bonjour|desk").unwrap(), "desk.local", 18789);
//! let descriptor = assembler.assemble(&endpoint, ConnectRole::Operator).unwrap();
//! assert_eq!(descriptor.url(), "ws://desk.local:18789");
//! ```

pub mod connection;

pub use genesis_caps as caps;
pub use genesis_config as config;
pub use genesis_sandbox as sandbox;
pub use genesis_trust as trust;

pub use connection::{ConnectionAssembler, ConnectionDescriptor, ConnectionError};

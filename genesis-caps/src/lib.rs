//! Capability negotiation for gateway connections.
//!
//! A connecting client advertises what it is (`node` device or `operator`
//! control surface) and, for nodes, which commands and capabilities it can
//! serve. The advertised surface is computed from a [`FeatureFlags`]
//! snapshot taken at connect time and is fully deterministic: identical
//! inputs produce identical, identically ordered lists.

mod flags;
mod identity;
mod negotiate;
mod surface;

pub use flags::{FeatureFlagSource, FeatureFlags, LocationMode, ParseFlagError, VoiceWakeMode};
pub use identity::{
    BuildInfo, ClientIdentity, ClientInfo, DeviceMetadata, IdentityError, NODE_CLIENT_ID,
    OPERATOR_CLIENT_ID, UNKNOWN_PLACEHOLDER, load_or_create_instance_id,
};
pub use negotiate::{
    ConnectOptions, ConnectRole, build_capabilities, build_connect_options, build_invoke_commands,
    operator_scopes,
};
pub use surface::{Capability, NodeCommand, OperatorScope};

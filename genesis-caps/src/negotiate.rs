use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::flags::{FeatureFlags, ParseFlagError};
use crate::identity::{ClientIdentity, ClientInfo, NODE_CLIENT_ID, OPERATOR_CLIENT_ID};
use crate::surface::{Capability, NodeCommand, OperatorScope};

/// Role a client negotiates with the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectRole {
    /// A device the gateway can invoke commands on.
    Node,
    /// A control surface that drives nodes and exposes nothing itself.
    Operator,
}

impl ConnectRole {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Node => "node",
            Self::Operator => "operator",
        }
    }
}

impl fmt::Display for ConnectRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConnectRole {
    type Err = ParseFlagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "node" => Ok(Self::Node),
            "operator" => Ok(Self::Operator),
            _ => Err(ParseFlagError::new("role", s, "node, operator")),
        }
    }
}

/// Everything a client advertises in the connect handshake. Built fresh for
/// each connection attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectOptions {
    pub role: ConnectRole,
    pub scopes: Vec<OperatorScope>,
    pub caps: Vec<Capability>,
    pub commands: Vec<NodeCommand>,
    pub permissions: BTreeMap<String, bool>,
    pub client: ClientInfo,
    pub user_agent: String,
}

/// Commands a node advertises: the fixed baseline, then feature-gated
/// segments in a fixed order, with `app.update` always last.
pub fn build_invoke_commands(flags: &FeatureFlags) -> Vec<NodeCommand> {
    let mut commands = NodeCommand::BASELINE.to_vec();
    if flags.camera_enabled {
        commands.extend([NodeCommand::CameraSnap, NodeCommand::CameraClip]);
    }
    if flags.location_mode.is_enabled() {
        commands.push(NodeCommand::LocationGet);
    }
    if flags.sms_available {
        commands.push(NodeCommand::SmsSend);
    }
    if flags.debug_build {
        commands.extend([NodeCommand::DebugLogs, NodeCommand::DebugEd25519]);
    }
    commands.push(NodeCommand::AppUpdate);
    commands
}

/// Capabilities a node advertises. Voice wake requires both a configured
/// mode and a granted microphone permission.
pub fn build_capabilities(flags: &FeatureFlags) -> Vec<Capability> {
    let mut caps = vec![Capability::Canvas, Capability::Screen];
    if flags.camera_enabled {
        caps.push(Capability::Camera);
    }
    if flags.sms_available {
        caps.push(Capability::Sms);
    }
    if flags.voice_wake_usable() {
        caps.push(Capability::VoiceWake);
    }
    if flags.location_mode.is_enabled() {
        caps.push(Capability::Location);
    }
    caps
}

pub fn operator_scopes() -> Vec<OperatorScope> {
    OperatorScope::ALL.to_vec()
}

pub fn build_connect_options(
    role: ConnectRole,
    flags: &FeatureFlags,
    identity: &ClientIdentity,
) -> ConnectOptions {
    let options = match role {
        ConnectRole::Node => ConnectOptions {
            role,
            scopes: Vec::new(),
            caps: build_capabilities(flags),
            commands: build_invoke_commands(flags),
            permissions: BTreeMap::new(),
            client: identity.client_info(NODE_CLIENT_ID, "node"),
            user_agent: identity.user_agent(),
        },
        ConnectRole::Operator => ConnectOptions {
            role,
            scopes: operator_scopes(),
            caps: Vec::new(),
            commands: Vec::new(),
            permissions: BTreeMap::new(),
            client: identity.client_info(OPERATOR_CLIENT_ID, "ui"),
            user_agent: identity.user_agent(),
        },
    };
    debug!(
        role = %role,
        caps = options.caps.len(),
        commands = options.commands.len(),
        "built connect options"
    );
    options
}

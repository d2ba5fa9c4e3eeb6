use std::collections::BTreeSet;
use std::path::PathBuf;

use anyhow::{Result, bail};
use genesis_commons::expand_home;
use genesis_sandbox::{
    DEFAULT_AGENT_ID, MainSessionAliases, SandboxMode, SandboxPolicy, SandboxScope,
    SessionIdentity, WorkspaceAccess, normalize_agent_id,
};
use serde::{Deserialize, Serialize};

use crate::state::StatePaths;

/// Root of `genesis.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenesisConfig {
    pub gateway: GatewayConfig,
    pub session: SessionConfig,
    pub client: ClientConfig,
    pub agents: AgentsConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Opt in to TLS for manually entered endpoints.
    pub manual_tls: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Additional session key treated as the main session.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub main_key: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentsConfig {
    pub defaults: AgentDefaults,
    pub list: Vec<AgentEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentDefaults {
    pub sandbox: SandboxSettings,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentEntry {
    pub id: String,
    pub default: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Real workspace directory; `~` is expanded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workspace: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sandbox: Option<SandboxSettings>,
}

/// Sandbox settings as written in configuration. Every field is optional so
/// per-agent tables can override individual defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SandboxSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<SandboxMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<SandboxScope>,
    /// Legacy switch, consulted only when `scope` is unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_session: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workspace_access: Option<WorkspaceAccess>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workspace_root: Option<String>,
}

impl SandboxSettings {
    /// Fields set in `overlay` replace the ones in `self`.
    pub fn merged_with(&self, overlay: &Self) -> Self {
        Self {
            mode: overlay.mode.or(self.mode),
            scope: overlay.scope.or(self.scope),
            per_session: overlay.per_session.or(self.per_session),
            workspace_access: overlay.workspace_access.or(self.workspace_access),
            workspace_root: overlay
                .workspace_root
                .clone()
                .or_else(|| self.workspace_root.clone()),
        }
    }

    pub fn to_policy(&self) -> SandboxPolicy {
        SandboxPolicy::from_parts(
            self.mode,
            self.scope,
            self.per_session,
            self.workspace_access,
            self.workspace_root.clone(),
        )
    }
}

impl GenesisConfig {
    pub fn validate(&self) -> Result<()> {
        let mut seen = BTreeSet::new();
        for agent in &self.agents.list {
            let id = normalize_agent_id(&agent.id);
            if !seen.insert(id.clone()) {
                bail!("agents.list contains duplicate agent id `{id}`");
            }
        }
        let defaults = self.agents.list.iter().filter(|agent| agent.default).count();
        if defaults > 1 {
            bail!("agents.list marks {defaults} agents as default; at most one is allowed");
        }
        if let Some(main_key) = &self.session.main_key
            && main_key.trim().is_empty()
        {
            bail!("session.main_key must not be blank");
        }
        Ok(())
    }

    /// The agent marked `default`, else the first listed agent, else `main`.
    pub fn default_agent_id(&self) -> String {
        self.agents
            .list
            .iter()
            .find(|agent| agent.default)
            .or_else(|| self.agents.list.first())
            .map_or_else(
                || DEFAULT_AGENT_ID.to_owned(),
                |agent| normalize_agent_id(&agent.id),
            )
    }

    pub fn agent(&self, agent_id: &str) -> Option<&AgentEntry> {
        let wanted = normalize_agent_id(agent_id);
        self.agents
            .list
            .iter()
            .find(|agent| normalize_agent_id(&agent.id) == wanted)
    }

    /// Effective sandbox policy: the agent's own settings merged over
    /// `agents.defaults.sandbox`.
    pub fn sandbox_policy_for(&self, agent_id: &str) -> SandboxPolicy {
        let defaults = &self.agents.defaults.sandbox;
        match self.agent(agent_id).and_then(|agent| agent.sandbox.as_ref()) {
            Some(overrides) => defaults.merged_with(overrides).to_policy(),
            None => defaults.to_policy(),
        }
    }

    /// The agent's real workspace directory.
    pub fn agent_workspace_dir(&self, agent_id: &str, state: &StatePaths) -> PathBuf {
        if let Some(workspace) = self
            .agent(agent_id)
            .and_then(|agent| agent.workspace.as_deref())
            .filter(|workspace| !workspace.trim().is_empty())
        {
            return expand_home(workspace);
        }
        let id = normalize_agent_id(agent_id);
        if id == self.default_agent_id() {
            state.default_workspace_dir()
        } else {
            state.agent_workspace_dir(&id)
        }
    }

    pub fn main_session_aliases(&self) -> MainSessionAliases {
        MainSessionAliases::new(self.session.main_key.as_deref())
    }

    pub fn session_identity(&self, session_key: &str) -> SessionIdentity {
        SessionIdentity::from_session_key(session_key, &self.default_agent_id())
    }
}

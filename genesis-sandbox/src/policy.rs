use serde::{Deserialize, Serialize};

/// When sessions are sandboxed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SandboxMode {
    /// Never sandbox.
    #[default]
    Off,
    /// Sandbox everything except the agent's main session.
    #[serde(alias = "non_main", alias = "nonmain")]
    NonMain,
    /// Sandbox every session, including main.
    All,
}

/// Granularity at which sandbox workspaces are shared.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SandboxScope {
    /// One workspace per session.
    Session,
    /// One workspace per agent, shared by its sessions.
    #[default]
    Agent,
    /// A single workspace shared by every agent.
    Shared,
}

impl SandboxScope {
    /// Resolve the effective scope. An explicit scope wins; otherwise the
    /// legacy `per_session` flag maps `true` to `Session` and `false` to
    /// `Shared`. Neither given means `Agent`.
    pub fn resolve(scope: Option<Self>, per_session: Option<bool>) -> Self {
        match (scope, per_session) {
            (Some(scope), _) => scope,
            (None, Some(true)) => Self::Session,
            (None, Some(false)) => Self::Shared,
            (None, None) => Self::Agent,
        }
    }
}

/// Access the sandbox gets to the agent's real workspace.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkspaceAccess {
    #[default]
    None,
    Ro,
    Rw,
}

impl WorkspaceAccess {
    pub fn exposes_agent_workspace(self) -> bool {
        self != Self::None
    }
}

/// Effective sandbox policy for one agent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SandboxPolicy {
    pub mode: SandboxMode,
    pub scope: SandboxScope,
    pub workspace_access: WorkspaceAccess,
    /// Root under which sandbox workspaces are created. `~` is expanded at
    /// resolution time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workspace_root: Option<String>,
}

impl SandboxPolicy {
    pub fn new(mode: SandboxMode, scope: SandboxScope) -> Self {
        Self {
            mode,
            scope,
            ..Self::default()
        }
    }

    /// Build a policy from optional configuration values, applying defaults
    /// and the legacy `per_session` mapping.
    pub fn from_parts(
        mode: Option<SandboxMode>,
        scope: Option<SandboxScope>,
        per_session: Option<bool>,
        workspace_access: Option<WorkspaceAccess>,
        workspace_root: Option<String>,
    ) -> Self {
        Self {
            mode: mode.unwrap_or_default(),
            scope: SandboxScope::resolve(scope, per_session),
            workspace_access: workspace_access.unwrap_or_default(),
            workspace_root: workspace_root.filter(|root| !root.trim().is_empty()),
        }
    }

    pub fn with_workspace_access(mut self, access: WorkspaceAccess) -> Self {
        self.workspace_access = access;
        self
    }

    pub fn with_workspace_root(mut self, root: impl Into<String>) -> Self {
        self.workspace_root = Some(root.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_per_session_maps_to_scope() {
        assert_eq!(SandboxScope::resolve(None, Some(true)), SandboxScope::Session);
        assert_eq!(SandboxScope::resolve(None, Some(false)), SandboxScope::Shared);
        assert_eq!(SandboxScope::resolve(None, None), SandboxScope::Agent);
        assert_eq!(
            SandboxScope::resolve(Some(SandboxScope::Agent), Some(true)),
            SandboxScope::Agent
        );
    }

    #[test]
    fn from_parts_applies_defaults() {
        let policy = SandboxPolicy::from_parts(None, None, None, None, Some("  ".into()));
        assert_eq!(policy, SandboxPolicy::default());
        assert_eq!(policy.mode, SandboxMode::Off);
        assert_eq!(policy.workspace_access, WorkspaceAccess::None);
    }

    #[test]
    fn modes_use_kebab_case() {
        let mode: SandboxMode = serde_json::from_str("\"non-main\"").unwrap();
        assert_eq!(mode, SandboxMode::NonMain);
        let legacy: SandboxMode = serde_json::from_str("\"non_main\"").unwrap();
        assert_eq!(legacy, SandboxMode::NonMain);
        assert_eq!(serde_json::to_string(&WorkspaceAccess::Ro).unwrap(), "\"ro\"");
    }
}

use std::io;
use std::path::{Path, PathBuf};

use genesis_commons::{expand_home, slugify_key};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::SandboxError;
use crate::policy::{SandboxMode, SandboxPolicy, SandboxScope, WorkspaceAccess};
use crate::session::{
    AGENT_KEY_PREFIX, DEFAULT_MAIN_KEY, MainSessionAliases, SessionIdentity, SessionRole,
    classify_session, normalize_agent_id, parse_agent_session_key,
};

/// Scope key used when every agent shares one workspace.
pub const SHARED_SCOPE_KEY: &str = "shared";

/// Where and how a sandboxed session executes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SandboxContext {
    pub agent_id: String,
    pub session_key: String,
    pub scope: SandboxScope,
    pub scope_key: String,
    pub workspace_dir: PathBuf,
    /// The agent's real workspace, present only when the policy grants
    /// access to it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_workspace_dir: Option<PathBuf>,
    pub access: WorkspaceAccess,
}

/// Resolves sandbox contexts relative to a default workspace root.
#[derive(Debug, Clone)]
pub struct SandboxResolver {
    default_root: PathBuf,
}

impl SandboxResolver {
    pub fn new(default_root: impl Into<PathBuf>) -> Self {
        Self {
            default_root: default_root.into(),
        }
    }

    pub fn default_root(&self) -> &Path {
        &self.default_root
    }

    /// Decide whether `identity` runs sandboxed. `None` means commands run
    /// directly in the agent's real workspace.
    pub fn resolve_sandbox_context(
        &self,
        policy: &SandboxPolicy,
        identity: &SessionIdentity,
        aliases: &MainSessionAliases,
        agent_workspace_dir: Option<&Path>,
    ) -> Option<SandboxContext> {
        let role = classify_session(identity, aliases);
        let sandboxed = match policy.mode {
            SandboxMode::Off => false,
            SandboxMode::NonMain => role == SessionRole::NonMain,
            SandboxMode::All => true,
        };
        if !sandboxed {
            debug!(
                session_key = %identity.session_key,
                agent_id = %identity.agent_id,
                mode = ?policy.mode,
                role = ?role,
                "session runs unsandboxed"
            );
            return None;
        }

        let scope_key = scope_key(policy.scope, identity);
        let root = self.workspace_root(policy);
        let workspace_dir = match policy.scope {
            SandboxScope::Shared => root,
            SandboxScope::Session | SandboxScope::Agent => root.join(slugify_key(&scope_key)),
        };
        let agent_workspace_dir = agent_workspace_dir
            .filter(|_| policy.workspace_access.exposes_agent_workspace())
            .map(Path::to_path_buf);

        debug!(
            session_key = %identity.session_key,
            agent_id = %identity.agent_id,
            scope_key = %scope_key,
            workspace = %workspace_dir.display(),
            "session runs sandboxed"
        );
        Some(SandboxContext {
            agent_id: identity.agent_id.clone(),
            session_key: identity.session_key.clone(),
            scope: policy.scope,
            scope_key,
            workspace_dir,
            agent_workspace_dir,
            access: policy.workspace_access,
        })
    }

    /// Resolve and, when sandboxed, create the workspace directory. Safe to
    /// call concurrently for the same session.
    pub async fn ensure_sandbox_workspace_for_session(
        &self,
        policy: &SandboxPolicy,
        identity: &SessionIdentity,
        aliases: &MainSessionAliases,
        agent_workspace_dir: Option<&Path>,
    ) -> Result<Option<SandboxContext>, SandboxError> {
        let Some(context) =
            self.resolve_sandbox_context(policy, identity, aliases, agent_workspace_dir)
        else {
            return Ok(None);
        };
        let dir = &context.workspace_dir;
        let provision_error = |source: io::Error| SandboxError::Provision {
            path: dir.clone(),
            source,
        };

        let existed = tokio::fs::try_exists(dir).await.unwrap_or(false);
        tokio::fs::create_dir_all(dir).await.map_err(provision_error)?;
        let metadata = tokio::fs::metadata(dir).await.map_err(provision_error)?;
        if !metadata.is_dir() {
            return Err(provision_error(io::Error::new(
                io::ErrorKind::NotADirectory,
                "sandbox workspace path exists and is not a directory",
            )));
        }
        if !existed {
            info!(
                session_key = %context.session_key,
                workspace = %dir.display(),
                "created sandbox workspace"
            );
        }
        Ok(Some(context))
    }

    fn workspace_root(&self, policy: &SandboxPolicy) -> PathBuf {
        policy
            .workspace_root
            .as_deref()
            .map_or_else(|| self.default_root.clone(), expand_home)
    }
}

fn scope_key(scope: SandboxScope, identity: &SessionIdentity) -> String {
    match scope {
        SandboxScope::Session => match parse_agent_session_key(&identity.session_key) {
            Some((agent, rest)) => {
                format!("{AGENT_KEY_PREFIX}:{}:{rest}", normalize_agent_id(agent))
            }
            None => {
                let key = identity.session_key.trim();
                let key = if key.is_empty() { DEFAULT_MAIN_KEY } else { key };
                format!("{AGENT_KEY_PREFIX}:{}:{key}", identity.agent_id)
            }
        },
        SandboxScope::Agent => format!("{AGENT_KEY_PREFIX}:{}", identity.agent_id),
        SandboxScope::Shared => SHARED_SCOPE_KEY.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn resolver() -> SandboxResolver {
        SandboxResolver::new("/state/sandboxes")
    }

    fn identity(key: &str) -> SessionIdentity {
        SessionIdentity::from_session_key(key, "main")
    }

    fn resolve(policy: &SandboxPolicy, key: &str) -> Option<SandboxContext> {
        resolver().resolve_sandbox_context(policy, &identity(key), &MainSessionAliases::default(), None)
    }

    #[test]
    fn context_serializes_camel_case() {
        let policy = SandboxPolicy::new(SandboxMode::All, SandboxScope::Session)
            .with_workspace_access(WorkspaceAccess::Rw);
        let context = resolver()
            .resolve_sandbox_context(
                &policy,
                &identity("agent:main:discord:42"),
                &MainSessionAliases::default(),
                Some(Path::new("/state/workspace")),
            )
            .unwrap();
        let value = serde_json::to_value(&context).unwrap();
        assert_eq!(value["agentId"], "main");
        assert_eq!(value["scopeKey"], "agent:main:discord:42");
        assert_eq!(value["agentWorkspaceDir"], "/state/workspace");
        assert!(value["workspaceDir"].as_str().unwrap().starts_with("/state/sandboxes"));
        assert!(value.get("workspace_dir").is_none());

        let policy_value = serde_json::to_value(&policy).unwrap();
        assert_eq!(policy_value["workspaceAccess"], "rw");
    }

    #[test]
    fn off_never_sandboxes() {
        let policy = SandboxPolicy::new(SandboxMode::Off, SandboxScope::Session);
        assert_eq!(resolve(&policy, "main"), None);
        assert_eq!(resolve(&policy, "discord:42"), None);
    }

    #[test]
    fn non_main_skips_main_session_only() {
        let policy = SandboxPolicy::new(SandboxMode::NonMain, SandboxScope::Session);
        assert_eq!(resolve(&policy, "agent:main:main"), None);
        assert_eq!(resolve(&policy, "main"), None);
        assert!(resolve(&policy, "agent:main:discord:42").is_some());
    }

    #[test]
    fn all_sandboxes_main_too() {
        let policy = SandboxPolicy::new(SandboxMode::All, SandboxScope::Agent);
        let context = resolve(&policy, "main").unwrap();
        assert_eq!(context.scope_key, "agent:main");
        assert_eq!(context.access, WorkspaceAccess::None);
    }

    #[test]
    fn session_scope_canonicalizes_plain_keys() {
        let policy = SandboxPolicy::new(SandboxMode::All, SandboxScope::Session);
        let plain = resolve(&policy, "discord:42").unwrap();
        let composite = resolve(&policy, "agent:main:discord:42").unwrap();
        assert_eq!(plain.scope_key, "agent:main:discord:42");
        assert_eq!(plain.workspace_dir, composite.workspace_dir);
        assert!(
            plain
                .workspace_dir
                .starts_with(Path::new("/state/sandboxes"))
        );
    }

    #[test]
    fn agent_scope_shares_directory_across_sessions() {
        let policy = SandboxPolicy::new(SandboxMode::All, SandboxScope::Agent);
        let first = resolve(&policy, "agent:ops:slack:1").unwrap();
        let second = resolve(&policy, "agent:ops:slack:2").unwrap();
        assert_eq!(first.workspace_dir, second.workspace_dir);
        assert_eq!(
            first.workspace_dir,
            Path::new("/state/sandboxes").join(slugify_key("agent:ops"))
        );
    }

    #[test]
    fn shared_scope_uses_root() {
        let policy = SandboxPolicy::new(SandboxMode::All, SandboxScope::Shared)
            .with_workspace_root("/srv/sandbox");
        let context = resolve(&policy, "agent:ops:slack:1").unwrap();
        assert_eq!(context.scope_key, SHARED_SCOPE_KEY);
        assert_eq!(context.workspace_dir, Path::new("/srv/sandbox"));
    }

    #[test]
    fn agent_workspace_exposed_only_with_access() {
        let real = Path::new("/home/me/work");
        let policy = SandboxPolicy::new(SandboxMode::All, SandboxScope::Agent);
        let hidden = resolver()
            .resolve_sandbox_context(&policy, &identity("x"), &MainSessionAliases::default(), Some(real))
            .unwrap();
        assert_eq!(hidden.agent_workspace_dir, None);

        let policy = policy.with_workspace_access(WorkspaceAccess::Ro);
        let exposed = resolver()
            .resolve_sandbox_context(&policy, &identity("x"), &MainSessionAliases::default(), Some(real))
            .unwrap();
        assert_eq!(exposed.agent_workspace_dir.as_deref(), Some(real));
        assert_eq!(exposed.access, WorkspaceAccess::Ro);
    }

    #[tokio::test]
    async fn ensure_creates_workspace() {
        let temp = tempfile::tempdir().unwrap();
        let resolver = SandboxResolver::new(temp.path());
        let policy = SandboxPolicy::new(SandboxMode::NonMain, SandboxScope::Session);
        let context = resolver
            .ensure_sandbox_workspace_for_session(
                &policy,
                &identity("agent:main:discord:42"),
                &MainSessionAliases::default(),
                None,
            )
            .await
            .unwrap()
            .unwrap();
        assert!(context.workspace_dir.is_dir());
        assert!(context.workspace_dir.starts_with(temp.path()));
    }

    #[tokio::test]
    async fn ensure_skips_unsandboxed_sessions() {
        let temp = tempfile::tempdir().unwrap();
        let resolver = SandboxResolver::new(temp.path().join("sandboxes"));
        let policy = SandboxPolicy::new(SandboxMode::NonMain, SandboxScope::Session);
        let aliases = MainSessionAliases::new(Some("work"));
        for key in ["agent:main:main", "work"] {
            let result = resolver
                .ensure_sandbox_workspace_for_session(&policy, &identity(key), &aliases, None)
                .await
                .unwrap();
            assert_eq!(result, None);
        }
        assert!(!temp.path().join("sandboxes").exists());
    }

    #[tokio::test]
    async fn ensure_fails_when_path_is_a_file() {
        let temp = tempfile::tempdir().unwrap();
        let file = temp.path().join("occupied");
        std::fs::write(&file, b"x").unwrap();
        let resolver = SandboxResolver::new(temp.path());
        let policy = SandboxPolicy::new(SandboxMode::All, SandboxScope::Shared)
            .with_workspace_root(file.to_string_lossy());
        let err = resolver
            .ensure_sandbox_workspace_for_session(
                &policy,
                &identity("discord:1"),
                &MainSessionAliases::default(),
                None,
            )
            .await
            .unwrap_err();
        let SandboxError::Provision { path, .. } = err;
        assert_eq!(path, file);
    }
}

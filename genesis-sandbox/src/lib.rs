//! Sandbox policy resolution for agent sessions.
//!
//! Given a session key and the policy that applies to its agent, decide
//! whether commands run directly in the real workspace or inside a
//! per-scope sandbox directory, and provision that directory on demand.
//!
//! Resolution is pure. [`SandboxResolver::ensure_sandbox_workspace_for_session`]
//! is the only operation with a side effect.

mod context;
mod error;
mod policy;
mod session;

pub use context::{SHARED_SCOPE_KEY, SandboxContext, SandboxResolver};
pub use error::SandboxError;
pub use genesis_commons::slugify_key as slugify_scope_key;
pub use policy::{SandboxMode, SandboxPolicy, SandboxScope, WorkspaceAccess};
pub use session::{
    AGENT_KEY_PREFIX, DEFAULT_AGENT_ID, DEFAULT_MAIN_KEY, MainSessionAliases, SessionIdentity,
    SessionRole, classify_session, normalize_agent_id, parse_agent_session_key,
};

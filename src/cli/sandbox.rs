use anyhow::{Context, Result};
use genesis_gate::sandbox::{
    SandboxContext, SandboxPolicy, SandboxResolver, SessionIdentity, SessionRole,
    classify_session,
};
use serde::Serialize;

use super::args::SandboxArgs;
use super::{AppContext, print_json};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SandboxReport {
    agent_id: String,
    session_key: String,
    role: SessionRole,
    policy: SandboxPolicy,
    sandbox: Option<SandboxContext>,
}

pub(super) async fn handle(context: &AppContext, args: &SandboxArgs) -> Result<()> {
    let config = &context.config;
    let identity = match &args.agent {
        Some(agent) => SessionIdentity::from_session_key(&args.session_key, agent),
        None => config.session_identity(&args.session_key),
    };
    let aliases = config.main_session_aliases();
    let policy = config.sandbox_policy_for(&identity.agent_id);
    let agent_workspace = config.agent_workspace_dir(&identity.agent_id, &context.state);
    let resolver = SandboxResolver::new(context.state.sandboxes_dir());

    let sandbox = if args.ensure {
        resolver
            .ensure_sandbox_workspace_for_session(
                &policy,
                &identity,
                &aliases,
                Some(agent_workspace.as_path()),
            )
            .await
            .context("failed to provision the sandbox workspace")?
    } else {
        resolver.resolve_sandbox_context(&policy, &identity, &aliases, Some(agent_workspace.as_path()))
    };

    print_json(&SandboxReport {
        role: classify_session(&identity, &aliases),
        agent_id: identity.agent_id,
        session_key: identity.session_key,
        policy,
        sandbox,
    })
}

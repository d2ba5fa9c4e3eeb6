use genesis_sandbox::{
    MainSessionAliases, SandboxMode, SandboxPolicy, SandboxResolver, SandboxScope,
    SessionIdentity, slugify_scope_key,
};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_ensure_yields_one_directory() {
    let temp = tempfile::tempdir().unwrap();
    let resolver = SandboxResolver::new(temp.path());
    let policy = SandboxPolicy::new(SandboxMode::All, SandboxScope::Agent);
    let identity = SessionIdentity::from_session_key("agent:main:discord:42", "main");
    let aliases = MainSessionAliases::default();

    let ensure = || resolver.ensure_sandbox_workspace_for_session(&policy, &identity, &aliases, None);
    let (a, b, c) = tokio::join!(ensure(), ensure(), ensure());
    let a = a.unwrap().unwrap();
    let b = b.unwrap().unwrap();
    let c = c.unwrap().unwrap();

    assert_eq!(a, b);
    assert_eq!(b, c);
    assert!(a.workspace_dir.is_dir());
    let entries = std::fs::read_dir(temp.path()).unwrap().count();
    assert_eq!(entries, 1);
}

#[tokio::test]
async fn ensure_is_idempotent() {
    let temp = tempfile::tempdir().unwrap();
    let resolver = SandboxResolver::new(temp.path());
    let policy = SandboxPolicy::new(SandboxMode::NonMain, SandboxScope::Agent);
    let identity = SessionIdentity::from_session_key("telegram:9", "Work");
    let aliases = MainSessionAliases::new(Some("desk"));

    let first = resolver
        .ensure_sandbox_workspace_for_session(&policy, &identity, &aliases, None)
        .await
        .unwrap()
        .unwrap();
    std::fs::write(first.workspace_dir.join("notes.txt"), b"kept").unwrap();
    let second = resolver
        .ensure_sandbox_workspace_for_session(&policy, &identity, &aliases, None)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(
        second.workspace_dir,
        temp.path().join(slugify_scope_key("agent:work"))
    );
    assert_eq!(
        std::fs::read_to_string(second.workspace_dir.join("notes.txt")).unwrap(),
        "kept"
    );
}

#[test]
fn main_alias_is_never_sandboxed_in_non_main_mode() {
    let resolver = SandboxResolver::new("/unused");
    let policy = SandboxPolicy::new(SandboxMode::NonMain, SandboxScope::Session);
    let aliases = MainSessionAliases::new(Some("work"));
    for key in ["main", "work", "agent:main:main", "agent:main:work"] {
        let identity = SessionIdentity::from_session_key(key, "main");
        assert_eq!(
            resolver.resolve_sandbox_context(&policy, &identity, &aliases, None),
            None,
            "{key}"
        );
    }
}

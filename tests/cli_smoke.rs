use assert_cmd::Command;
use assert_fs::TempDir;
use assert_fs::prelude::*;
use predicates::prelude::*;

const PIN: &str = "AB:CD:EF:01:23:45:67:89:AB:CD:EF:01:23:45:67:89:AB:CD:EF:01:23:45:67:89:AB:CD:EF:01:23:45:67:89";

fn genesis(state: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("genesis-gate").expect("genesis-gate binary should build");
    cmd.env("GENESIS_STATE_DIR", state.path())
        .env_remove("GENESIS_CONFIG_PATH")
        .env_remove("RUST_LOG")
        .current_dir(state.path());
    cmd
}

fn json_output(cmd: &mut Command) -> serde_json::Value {
    let output = cmd.assert().success().get_output().stdout.clone();
    serde_json::from_slice(&output).expect("stdout should be JSON")
}

#[test]
fn help_command_succeeds() {
    let state = TempDir::new().unwrap();
    genesis(&state)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("connect-options"));
}

#[test]
fn manual_endpoint_without_opt_in_prints_null() {
    let state = TempDir::new().unwrap();
    genesis(&state)
        .args(["tls", "--host", "192.168.1.20"])
        .assert()
        .success()
        .stdout(predicate::str::diff("null\n"));
}

#[test]
fn manual_tls_override_requires_tls() {
    let state = TempDir::new().unwrap();
    let params = json_output(genesis(&state).args([
        "--set",
        "gateway.manual_tls=true",
        "tls",
        "--host",
        "192.168.1.20",
    ]));
    assert_eq!(params["required"], true);
    assert_eq!(params["allowTOFU"], false);
    assert_eq!(params["stableId"], "manual|192.168.1.20|18789");
}

#[test]
fn pinned_fingerprint_is_expected() {
    let state = TempDir::new().unwrap();
    genesis(&state)
        .args(["trust", "pin", "--stable-id", "bonjour|desk", "--fingerprint", PIN])
        .assert()
        .success();
    state
        .child("gateway/tls-pins.json")
        .assert(predicate::path::exists());

    let params = json_output(genesis(&state).args([
        "tls",
        "--stable-id",
        "bonjour|desk",
        "--advertised-fingerprint",
        "00:11",
    ]));
    assert_eq!(params["expectedFingerprint"], PIN);

    let forgotten = json_output(genesis(&state).args(["trust", "forget", "--stable-id", "bonjour|desk"]));
    assert_eq!(forgotten["removed"], true);
    let records = json_output(genesis(&state).args(["trust", "list"]));
    assert_eq!(records, serde_json::json!([]));
}

#[test]
fn pin_rejects_short_fingerprints() {
    let state = TempDir::new().unwrap();
    genesis(&state)
        .args(["trust", "pin", "--stable-id", "bonjour|desk", "--fingerprint", "11:22"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("SHA-256"))
        .stderr(predicate::str::contains("captured error").not())
        .stderr(predicate::function(|stderr: &str| {
            stderr.matches("SHA-256").count() == 1
        }));
}

#[test]
fn operator_options_have_no_commands() {
    let state = TempDir::new().unwrap();
    let options = json_output(genesis(&state).args(["connect-options", "--role", "operator"]));
    assert_eq!(options["role"], "operator");
    assert_eq!(options["caps"], serde_json::json!([]));
    assert_eq!(options["commands"], serde_json::json!([]));
    assert_eq!(options["client"]["mode"], "ui");
}

#[test]
fn node_options_end_with_app_update() {
    let state = TempDir::new().unwrap();
    let options = json_output(genesis(&state).args([
        "connect-options",
        "--role",
        "node",
        "--camera",
        "--voice-wake",
        "always",
    ]));
    let commands = options["commands"].as_array().unwrap();
    assert_eq!(commands.last().unwrap(), "app.update");
    assert!(commands.contains(&serde_json::json!("camera.snap")));
    assert!(!options["caps"].as_array().unwrap().contains(&serde_json::json!("voiceWake")));
}

#[test]
fn sandbox_ensure_creates_workspace() {
    let state = TempDir::new().unwrap();
    let config = state.child("genesis.toml");
    config
        .write_str("[agents.defaults.sandbox]\nmode = \"non-main\"\nscope = \"session\"\n")
        .unwrap();

    let main = json_output(genesis(&state).args([
        "--config",
        config.path().to_str().unwrap(),
        "sandbox",
        "--session-key",
        "agent:main:main",
        "--ensure",
    ]));
    assert_eq!(main["role"], "main");
    assert!(main["sandbox"].is_null());
    assert_eq!(main["policy"]["workspaceAccess"], "none");

    let report = json_output(genesis(&state).args([
        "--config",
        config.path().to_str().unwrap(),
        "sandbox",
        "--session-key",
        "agent:main:discord:42",
        "--ensure",
    ]));
    assert_eq!(report["sandbox"]["scopeKey"], "agent:main:discord:42");
    let dir = report["sandbox"]["workspaceDir"].as_str().unwrap();
    assert!(std::path::Path::new(dir).is_dir());
    assert!(dir.starts_with(state.path().join("sandboxes").to_str().unwrap()));
}

#[test]
fn instance_id_survives_restarts() {
    let state = TempDir::new().unwrap();
    let first = json_output(genesis(&state).args(["connect-options", "--role", "node"]));
    let second = json_output(genesis(&state).args(["connect-options", "--role", "node"]));

    let instance_id = first["client"]["instanceId"].as_str().unwrap();
    assert_eq!(second["client"]["instanceId"], instance_id);
    state
        .child("identity/instance-id")
        .assert(predicate::str::contains(instance_id));
    assert!(first["client"].get("modelIdentifier").is_none());
}

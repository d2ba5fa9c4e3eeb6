use anyhow::{Context, Result, bail};
use genesis_gate::trust::{Fingerprint, StableId, TrustStore};
use serde_json::json;

use super::args::TrustCommands;
use super::{AppContext, print_json};

pub(super) fn handle(context: &AppContext, command: &TrustCommands) -> Result<()> {
    let store = context.trust_store();
    match command {
        TrustCommands::List => {
            let records = store.records().context("failed to read the trust store")?;
            print_json(&records)
        }
        TrustCommands::Pin {
            stable_id,
            fingerprint,
        } => {
            let stable_id = StableId::parse(stable_id.as_str()).context("invalid --stable-id")?;
            let Some(fingerprint) = Fingerprint::new(fingerprint).filter(Fingerprint::is_sha256)
            else {
                bail!("--fingerprint must be a SHA-256 digest (64 hex digits, colons allowed)");
            };
            store
                .pin(&stable_id, &fingerprint)
                .context("failed to write the trust store")?;
            print_json(&json!({ "stableId": stable_id, "fingerprint": fingerprint }))
        }
        TrustCommands::Forget { stable_id } => {
            let stable_id = StableId::parse(stable_id.as_str()).context("invalid --stable-id")?;
            let removed = store
                .forget(&stable_id)
                .context("failed to write the trust store")?;
            print_json(&json!({ "stableId": stable_id, "removed": removed }))
        }
    }
}

use anyhow::{Context, Result};
use genesis_gate::trust::{Endpoint, StableId, TrustResolver};

use super::args::TlsArgs;
use super::{AppContext, print_json};

pub(super) fn handle(context: &AppContext, args: &TlsArgs) -> Result<()> {
    let endpoint = match &args.stable_id {
        Some(raw) => {
            let stable_id = StableId::parse(raw.as_str()).context("invalid --stable-id")?;
            Endpoint::discovered(stable_id, args.host.as_str(), args.port)
        }
        None => Endpoint::manual(&args.host, args.port).context("invalid manual endpoint")?,
    }
    .with_tls_hint(args.tls_hint)
    .with_advertised_fingerprint(args.advertised_fingerprint.clone());

    let resolver = TrustResolver::new(context.trust_store(), context.config.gateway.manual_tls);
    let decision = resolver
        .resolve(&endpoint)
        .context("failed to resolve the TLS decision")?;
    print_json(&decision.to_params())
}

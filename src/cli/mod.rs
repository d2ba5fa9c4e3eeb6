//! Subcommand handlers. Every handler prints one pretty JSON document.

pub mod args;

mod connect;
mod sandbox;
mod tls;
mod trust;

use anyhow::{Context, Result};
use genesis_gate::caps::{BuildInfo, ClientIdentity};
use genesis_gate::config::{ConfigBuilder, GenesisConfig, StatePaths};
use genesis_gate::trust::FileTrustStore;
use serde::Serialize;

use self::args::{Cli, Commands};

const PRODUCT_NAME: &str = "GenesisGate";

/// Loaded configuration plus the state directory it applies to.
pub(crate) struct AppContext {
    pub config: GenesisConfig,
    pub state: StatePaths,
}

impl AppContext {
    fn load(cli: &Cli) -> Result<Self> {
        let manager = ConfigBuilder::new()
            .config_file(cli.config.clone())
            .set_pairs(&cli.overrides)?
            .build()
            .context("failed to load genesis configuration")?;
        let state = StatePaths::resolve()?;
        Ok(Self {
            config: manager.into_config(),
            state,
        })
    }

    pub fn trust_store(&self) -> FileTrustStore {
        FileTrustStore::new(self.state.trust_store_path())
    }

    pub fn client_identity(&self) -> Result<ClientIdentity> {
        ClientIdentity::detect(
            self.config.client.display_name.clone(),
            self.config.client.instance_id.clone(),
            BuildInfo::new(
                PRODUCT_NAME,
                env!("CARGO_PKG_VERSION"),
                cfg!(debug_assertions),
            ),
            &self.state.instance_id_path(),
        )
        .context("failed to resolve client identity")
    }
}

pub async fn run(cli: Cli) -> Result<()> {
    let context = AppContext::load(&cli)?;
    match cli.command {
        Commands::Tls(args) => tls::handle(&context, &args),
        Commands::ConnectOptions(args) => connect::handle(&context, &args),
        Commands::Sandbox(args) => sandbox::handle(&context, &args).await,
        Commands::Trust { command } => trust::handle(&context, &command),
    }
}

pub(crate) fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value).context("failed to render output")?;
    println!("{rendered}");
    Ok(())
}

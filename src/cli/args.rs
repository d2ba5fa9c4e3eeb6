use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use genesis_gate::caps::{ConnectRole, LocationMode, VoiceWakeMode};

pub const DEFAULT_GATEWAY_PORT: u16 = 18789;

#[derive(Debug, Parser)]
#[command(
    name = "genesis-gate",
    version,
    about = "Inspect gateway trust, capability and sandbox decisions"
)]
pub struct Cli {
    /// Configuration file to use instead of ./genesis.toml
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Override a configuration key, e.g. `--set gateway.manual_tls=true`
    #[arg(long = "set", global = true, value_name = "KEY=VALUE")]
    pub overrides: Vec<String>,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "warn", value_name = "LEVEL")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Print the TLS parameters for a gateway endpoint
    Tls(TlsArgs),
    /// Print the handshake options for a role
    ConnectOptions(ConnectArgs),
    /// Print the sandbox decision for a session
    Sandbox(SandboxArgs),
    /// Manage pinned gateway certificates
    Trust {
        #[command(subcommand)]
        command: TrustCommands,
    },
}

#[derive(Debug, Args)]
pub struct TlsArgs {
    /// Stable id from discovery; omit to describe a manual endpoint
    #[arg(long, value_name = "ID")]
    pub stable_id: Option<String>,

    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    #[arg(long, default_value_t = DEFAULT_GATEWAY_PORT)]
    pub port: u16,

    /// Discovery advertised TLS for this endpoint
    #[arg(long)]
    pub tls_hint: bool,

    /// Fingerprint advertised by discovery (informational only)
    #[arg(long, value_name = "HEX")]
    pub advertised_fingerprint: Option<String>,
}

#[derive(Debug, Args)]
pub struct ConnectArgs {
    #[arg(long)]
    pub role: ConnectRole,

    #[arg(long)]
    pub camera: bool,

    #[arg(long, default_value_t = LocationMode::Off)]
    pub location: LocationMode,

    #[arg(long, default_value_t = VoiceWakeMode::Off)]
    pub voice_wake: VoiceWakeMode,

    /// The microphone permission is currently granted
    #[arg(long)]
    pub mic_granted: bool,

    #[arg(long)]
    pub sms: bool,

    /// Advertise debug-only commands
    #[arg(long)]
    pub debug_build: bool,
}

#[derive(Debug, Args)]
pub struct SandboxArgs {
    #[arg(long, value_name = "KEY")]
    pub session_key: String,

    /// Agent to use when the key is not an `agent:<id>:` composite
    #[arg(long, value_name = "ID")]
    pub agent: Option<String>,

    /// Create the sandbox workspace directory
    #[arg(long)]
    pub ensure: bool,
}

#[derive(Debug, Subcommand)]
pub enum TrustCommands {
    /// List pinned fingerprints
    List,
    /// Pin a SHA-256 fingerprint for a gateway
    Pin {
        #[arg(long, value_name = "ID")]
        stable_id: String,
        #[arg(long, value_name = "HEX")]
        fingerprint: String,
    },
    /// Remove the pin for a gateway
    Forget {
        #[arg(long, value_name = "ID")]
        stable_id: String,
    },
}

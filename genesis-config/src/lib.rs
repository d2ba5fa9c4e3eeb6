//! Configuration for genesis gateway clients.
//!
//! Settings come from `genesis.toml` files layered from system to workspace,
//! with runtime overrides on top. See [`ConfigManager`] for the search order.

pub mod loader;
mod schema;
mod state;

pub use loader::{
    ConfigBuilder, ConfigLayerEntry, ConfigLayerSource, ConfigLayerStack, ConfigManager,
    ConfigSearchPaths, merge_toml_values,
};
pub use schema::{
    AgentDefaults, AgentEntry, AgentsConfig, ClientConfig, GatewayConfig, GenesisConfig,
    SandboxSettings, SessionConfig,
};
pub use state::{CONFIG_FILE_NAME, StatePaths};

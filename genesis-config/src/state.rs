use std::path::{Path, PathBuf};

use anyhow::{Result, anyhow};
use genesis_commons::{expand_home, normalize_path};

pub const CONFIG_FILE_NAME: &str = "genesis.toml";

const STATE_DIR_ENV: &str = "GENESIS_STATE_DIR";
const HOME_ENV: &str = "GENESIS_HOME";
const STATE_DIR_NAME: &str = ".genesis";

/// Locations under the per-user state directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatePaths {
    root: PathBuf,
}

impl StatePaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// `GENESIS_STATE_DIR` if set, else `$GENESIS_HOME/.genesis`, else
    /// `~/.genesis`.
    pub fn resolve() -> Result<Self> {
        if let Some(dir) = non_empty_env(STATE_DIR_ENV) {
            return Ok(Self::new(normalize_path(&expand_home(&dir))));
        }
        if let Some(home) = non_empty_env(HOME_ENV) {
            return Ok(Self::new(
                normalize_path(&expand_home(&home)).join(STATE_DIR_NAME),
            ));
        }
        let home = dirs::home_dir()
            .ok_or_else(|| anyhow!("could not determine a home directory for genesis state"))?;
        Ok(Self::new(home.join(STATE_DIR_NAME)))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn sandboxes_dir(&self) -> PathBuf {
        self.root.join("sandboxes")
    }

    pub fn trust_store_path(&self) -> PathBuf {
        self.root.join("gateway").join("tls-pins.json")
    }

    /// Persisted client instance id advertised in the connect handshake.
    pub fn instance_id_path(&self) -> PathBuf {
        self.root.join("identity").join("instance-id")
    }

    pub fn config_path(&self) -> PathBuf {
        self.root.join(CONFIG_FILE_NAME)
    }

    /// Real workspace of the default agent.
    pub fn default_workspace_dir(&self) -> PathBuf {
        self.root.join("workspace")
    }

    /// Real workspace of a non-default agent.
    pub fn agent_workspace_dir(&self, agent_id: &str) -> PathBuf {
        self.root.join(format!("workspace-{agent_id}"))
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, warn};

use crate::loader::layers::{ConfigLayerEntry, ConfigLayerSource, ConfigLayerStack};
use crate::schema::GenesisConfig;
use crate::state::{CONFIG_FILE_NAME, StatePaths};

const CONFIG_PATH_ENV: &str = "GENESIS_CONFIG_PATH";
const SYSTEM_CONFIG_PATH: &str = "/etc/genesis/genesis.toml";

/// Files consulted below the workspace layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigSearchPaths {
    pub system: Option<PathBuf>,
    pub user: Vec<PathBuf>,
}

impl ConfigSearchPaths {
    /// `/etc/genesis/genesis.toml` on unix and `genesis.toml` in the state
    /// directory.
    pub fn for_host() -> Self {
        let system = cfg!(unix).then(|| PathBuf::from(SYSTEM_CONFIG_PATH));
        let user = StatePaths::resolve()
            .map(|state| vec![state.config_path()])
            .unwrap_or_default();
        Self { system, user }
    }

    /// No system or user layers.
    pub fn none() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone)]
pub struct ConfigManager {
    pub(crate) config: GenesisConfig,
    config_path: Option<PathBuf>,
    pub(crate) layer_stack: ConfigLayerStack,
}

impl ConfigManager {
    /// Load from `GENESIS_CONFIG_PATH` when set, otherwise from the current
    /// directory.
    pub fn load() -> Result<Self> {
        if let Ok(config_path) = std::env::var(CONFIG_PATH_ENV) {
            let trimmed = config_path.trim();
            if !trimmed.is_empty() {
                return Self::load_from_file(trimmed).with_context(|| {
                    format!("Failed to load configuration from {CONFIG_PATH_ENV}={trimmed}")
                });
            }
        }
        Self::load_from_workspace(std::env::current_dir()?)
    }

    pub fn load_from_workspace(workspace: impl AsRef<Path>) -> Result<Self> {
        Self::load_from_workspace_with(workspace, &ConfigSearchPaths::for_host())
    }

    /// Stack the system, user and `<workspace>/genesis.toml` layers. Missing
    /// files are skipped; unreadable ones are skipped with a warning.
    pub fn load_from_workspace_with(
        workspace: impl AsRef<Path>,
        search: &ConfigSearchPaths,
    ) -> Result<Self> {
        let mut layer_stack = Self::base_layers(search);

        let workspace_config = workspace.as_ref().join(CONFIG_FILE_NAME);
        if workspace_config.exists() {
            match Self::load_toml_from_file(&workspace_config) {
                Ok(toml) => layer_stack.push(ConfigLayerEntry::new(
                    ConfigLayerSource::Workspace {
                        file: workspace_config,
                    },
                    toml,
                )),
                Err(err) => warn!(
                    path = %workspace_config.display(),
                    error = %format!("{err:#}"),
                    "skipping unreadable workspace configuration"
                ),
            }
        }

        Self::from_layers(layer_stack).context("Configuration failed validation")
    }

    /// Stack the system and user layers under `path`. Errors in `path` itself
    /// are returned.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::load_from_file_with(path, &ConfigSearchPaths::for_host())
    }

    pub fn load_from_file_with(path: impl AsRef<Path>, search: &ConfigSearchPaths) -> Result<Self> {
        let path = path.as_ref();
        let mut layer_stack = Self::base_layers(search);
        let toml = Self::load_toml_from_file(path)?;
        layer_stack.push(ConfigLayerEntry::new(
            ConfigLayerSource::Workspace {
                file: path.to_path_buf(),
            },
            toml,
        ));
        Self::from_layers(layer_stack).with_context(|| {
            format!("Failed to validate effective config with file: {}", path.display())
        })
    }

    /// Parse a single configuration document with no other layers.
    pub fn load_from_str(content: &str) -> Result<Self> {
        let toml: toml::Value =
            toml::from_str(content).context("Failed to parse inline configuration")?;
        let layer_stack =
            ConfigLayerStack::new(vec![ConfigLayerEntry::new(ConfigLayerSource::Inline, toml)]);
        Self::from_layers(layer_stack)
    }

    pub fn config(&self) -> &GenesisConfig {
        &self.config
    }

    pub fn into_config(self) -> GenesisConfig {
        self.config
    }

    /// Highest-precedence file that contributed a layer.
    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    pub fn layer_stack(&self) -> &ConfigLayerStack {
        &self.layer_stack
    }

    pub(crate) fn from_layers(layer_stack: ConfigLayerStack) -> Result<Self> {
        let config = Self::evaluate(&layer_stack)?;
        let config_path = layer_stack
            .layers()
            .iter()
            .rev()
            .find_map(|layer| layer.source.file().map(Path::to_path_buf));
        debug!(
            layers = layer_stack.layers().len(),
            config_path = ?config_path,
            "loaded configuration"
        );
        Ok(Self {
            config,
            config_path,
            layer_stack,
        })
    }

    pub(crate) fn evaluate(layer_stack: &ConfigLayerStack) -> Result<GenesisConfig> {
        let config: GenesisConfig = if layer_stack.is_empty() {
            GenesisConfig::default()
        } else {
            layer_stack
                .effective_config()
                .try_into()
                .context("Failed to deserialize effective configuration")?
        };
        config.validate()?;
        Ok(config)
    }

    fn base_layers(search: &ConfigSearchPaths) -> ConfigLayerStack {
        let mut layer_stack = ConfigLayerStack::default();
        let system = search
            .system
            .iter()
            .map(|file| (file, ConfigLayerSource::System { file: file.clone() }));
        let user = search
            .user
            .iter()
            .map(|file| (file, ConfigLayerSource::User { file: file.clone() }));
        for (file, source) in system.chain(user) {
            if !file.exists() {
                continue;
            }
            match Self::load_toml_from_file(file) {
                Ok(toml) => layer_stack.push(ConfigLayerEntry::new(source, toml)),
                Err(err) => warn!(
                    path = %file.display(),
                    error = %format!("{err:#}"),
                    "skipping unreadable configuration layer"
                ),
            }
        }
        layer_stack
    }

    fn load_toml_from_file(path: &Path) -> Result<toml::Value> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let value: toml::Value = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(value)
    }
}

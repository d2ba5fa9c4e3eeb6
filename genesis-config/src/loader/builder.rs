use std::path::PathBuf;

use anyhow::{Context, Result, bail};

use crate::loader::layers::{ConfigLayerEntry, ConfigLayerSource};
use crate::loader::manager::{ConfigManager, ConfigSearchPaths};

/// Builds a [`ConfigManager`] with runtime overrides on top of the file layers.
#[derive(Debug, Clone, Default)]
pub struct ConfigBuilder {
    workspace: Option<PathBuf>,
    config_file: Option<PathBuf>,
    search: Option<ConfigSearchPaths>,
    overrides: Vec<(String, toml::Value)>,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn workspace(mut self, path: PathBuf) -> Self {
        self.workspace = Some(path);
        self
    }

    /// Use this file instead of the workspace `genesis.toml`.
    pub fn config_file(mut self, path: Option<PathBuf>) -> Self {
        self.config_file = path;
        self
    }

    /// Replace the system and user search paths.
    pub fn search_paths(mut self, search: ConfigSearchPaths) -> Self {
        self.search = Some(search);
        self
    }

    /// Override a dotted key such as `gateway.manual_tls`.
    pub fn set(mut self, key: impl Into<String>, value: toml::Value) -> Self {
        self.overrides.push((key.into(), value));
        self
    }

    /// Parse `key=value` pairs. Values are read as TOML, falling back to a
    /// plain string.
    pub fn set_pairs<I, S>(mut self, pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for pair in pairs {
            let pair = pair.as_ref();
            let Some((key, raw)) = pair.split_once('=') else {
                bail!("override `{pair}` must have the form key=value");
            };
            let key = key.trim();
            if key.is_empty() {
                bail!("override `{pair}` has an empty key");
            }
            let raw = raw.trim();
            let value = parse_override_value(raw);
            self.overrides.push((key.to_owned(), value));
        }
        Ok(self)
    }

    pub fn build(self) -> Result<ConfigManager> {
        let search = self.search.unwrap_or_else(ConfigSearchPaths::for_host);
        let mut manager = match (self.config_file, self.workspace) {
            (Some(file), _) => ConfigManager::load_from_file_with(file, &search)?,
            (None, Some(workspace)) => ConfigManager::load_from_workspace_with(workspace, &search)?,
            (None, None) => ConfigManager::load()?,
        };

        if !self.overrides.is_empty() {
            let mut runtime = toml::Table::new();
            for (key, value) in self.overrides {
                insert_dotted_key(&mut runtime, &key, value);
            }
            manager
                .layer_stack
                .push(ConfigLayerEntry::new(ConfigLayerSource::Runtime, toml::Value::Table(runtime)));
            manager.config = ConfigManager::evaluate(&manager.layer_stack)
                .context("Configuration failed validation after runtime overrides")?;
        }

        Ok(manager)
    }
}

fn parse_override_value(raw: &str) -> toml::Value {
    toml::from_str::<toml::Table>(&format!("value = {raw}"))
        .ok()
        .and_then(|mut table| table.remove("value"))
        .unwrap_or_else(|| toml::Value::String(raw.to_owned()))
}

fn insert_dotted_key(table: &mut toml::Table, key: &str, value: toml::Value) {
    let mut parts = key.split('.').peekable();
    let mut current = table;
    while let Some(part) = parts.next() {
        if parts.peek().is_none() {
            current.insert(part.to_owned(), value);
            return;
        }
        let entry = current
            .entry(part.to_owned())
            .or_insert(toml::Value::Table(toml::Table::new()));
        if !entry.is_table() {
            *entry = toml::Value::Table(toml::Table::new());
        }
        let Some(next) = entry.as_table_mut() else {
            return;
        };
        current = next;
    }
}

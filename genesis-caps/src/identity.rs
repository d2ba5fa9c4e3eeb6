use std::fs;
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tempfile::Builder;
use tracing::info;

/// Substituted for OS-reported fields that are missing or empty.
pub const UNKNOWN_PLACEHOLDER: &str = "unknown";

pub const NODE_CLIENT_ID: &str = "genesis-node";
pub const OPERATOR_CLIENT_ID: &str = "genesis-control-ui";

const DEFAULT_DISPLAY_NAME: &str = "Genesis";

/// Static build metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildInfo {
    pub product: String,
    pub version_name: String,
    pub debug: bool,
}

impl BuildInfo {
    pub fn new(product: impl Into<String>, version_name: impl Into<String>, debug: bool) -> Self {
        Self {
            product: product.into(),
            version_name: version_name.into(),
            debug,
        }
    }

    /// Version label sent to the gateway. Empty versions read as `dev`, and
    /// debug builds are marked `-dev` unless the name already says so.
    pub fn resolved_version(&self) -> String {
        let version = self.version_name.trim();
        let version = if version.is_empty() { "dev" } else { version };
        if self.debug && !version.to_ascii_lowercase().contains("dev") {
            format!("{version}-dev")
        } else {
            version.to_owned()
        }
    }
}

/// Device identifiers as reported by the OS. Every field except `platform`
/// may be unknown.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceMetadata {
    pub platform: String,
    pub device_family: String,
    pub os_name: String,
    pub os_release: Option<String>,
    pub api_level: Option<String>,
    pub manufacturer: Option<String>,
    pub model: Option<String>,
    pub host_name: Option<String>,
}

impl DeviceMetadata {
    /// Best-effort detection for the current host. Fields that cannot be
    /// determined stay `None`.
    pub fn detect() -> Self {
        let platform = std::env::consts::OS.to_owned();
        let family = match platform.as_str() {
            "linux" => "Linux",
            "macos" => "macOS",
            "windows" => "Windows",
            "android" => "Android",
            "ios" => "iOS",
            "freebsd" => "FreeBSD",
            _ => UNKNOWN_PLACEHOLDER,
        };
        let host_name = hostname::get()
            .ok()
            .and_then(|name| name.into_string().ok())
            .filter(|name| !name.trim().is_empty());

        Self {
            device_family: family.to_owned(),
            os_name: family.to_owned(),
            platform,
            os_release: detect_os_release(),
            api_level: None,
            manufacturer: None,
            model: None,
            host_name,
        }
    }

    /// `"<manufacturer> <model>"`, or `None` if both are empty.
    pub fn model_identifier(&self) -> Option<String> {
        let joined = [self.manufacturer.as_deref(), self.model.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if joined.is_empty() { None } else { Some(joined) }
    }
}

#[cfg(unix)]
fn detect_os_release() -> Option<String> {
    let uts = nix::sys::utsname::uname().ok()?;
    uts.release()
        .to_str()
        .map(str::trim)
        .filter(|release| !release.is_empty())
        .map(str::to_owned)
}

#[cfg(not(unix))]
fn detect_os_release() -> Option<String> {
    None
}

#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("failed to read instance id {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write instance id {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Client identity shared by every connection this process makes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientIdentity {
    pub display_name: String,
    pub instance_id: String,
    pub build: BuildInfo,
    pub device: DeviceMetadata,
}

impl ClientIdentity {
    pub fn new(
        display_name: impl Into<String>,
        instance_id: impl Into<String>,
        build: BuildInfo,
        device: DeviceMetadata,
    ) -> Self {
        Self {
            display_name: display_name.into(),
            instance_id: instance_id.into(),
            build,
            device,
        }
    }

    /// Fill missing configuration from the host: the display name falls back
    /// to the host name, the instance id to the one persisted at
    /// `instance_id_path`, generated on first use.
    pub fn detect(
        display_name: Option<String>,
        instance_id: Option<String>,
        build: BuildInfo,
        instance_id_path: &Path,
    ) -> Result<Self, IdentityError> {
        let device = DeviceMetadata::detect();
        let display_name = display_name
            .filter(|name| !name.trim().is_empty())
            .or_else(|| device.host_name.clone())
            .unwrap_or_else(|| DEFAULT_DISPLAY_NAME.to_owned());
        let instance_id = match instance_id.filter(|id| !id.trim().is_empty()) {
            Some(id) => id,
            None => load_or_create_instance_id(instance_id_path)?,
        };
        Ok(Self::new(display_name, instance_id, build, device))
    }

    /// `"<product>/<version> (<os> <release>; <api level>)"`. Missing OS
    /// fields become [`UNKNOWN_PLACEHOLDER`]; a missing API level is left out.
    pub fn user_agent(&self) -> String {
        let version = self.build.resolved_version();
        let product = non_blank(&self.build.product).unwrap_or("genesis");
        let os_name = non_blank(&self.device.os_name).unwrap_or(UNKNOWN_PLACEHOLDER);
        let release = self
            .device
            .os_release
            .as_deref()
            .and_then(non_blank)
            .unwrap_or(UNKNOWN_PLACEHOLDER);
        match self.device.api_level.as_deref().and_then(non_blank) {
            Some(api_level) => {
                format!("{product}/{version} ({os_name} {release}; SDK {api_level})")
            }
            None => format!("{product}/{version} ({os_name} {release})"),
        }
    }

    pub fn client_info(&self, id: &str, mode: &str) -> ClientInfo {
        ClientInfo {
            id: id.to_owned(),
            display_name: self.display_name.clone(),
            version: self.build.resolved_version(),
            platform: self.device.platform.clone(),
            mode: mode.to_owned(),
            instance_id: self.instance_id.clone(),
            device_family: self.device.device_family.clone(),
            model_identifier: self.device.model_identifier(),
        }
    }
}

/// The instance id stored at `path`. A missing or blank file gets a fresh
/// UUID; when two processes race on first use, both end up with the one
/// that landed first.
pub fn load_or_create_instance_id(path: &Path) -> Result<String, IdentityError> {
    if let Some(existing) = read_instance_id(path)? {
        return Ok(existing);
    }

    let write_error = |source: io::Error| IdentityError::Write {
        path: path.to_path_buf(),
        source,
    };
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&parent).map_err(write_error)?;

    let generated = uuid::Uuid::new_v4().to_string();
    let mut temp_file = Builder::new()
        .prefix(".instance-id")
        .tempfile_in(&parent)
        .map_err(write_error)?;
    temp_file
        .write_all(generated.as_bytes())
        .map_err(write_error)?;
    temp_file.as_file_mut().sync_all().map_err(write_error)?;

    match temp_file.persist_noclobber(path) {
        Ok(_) => {}
        Err(error) if error.error.kind() == ErrorKind::AlreadyExists => {
            if let Some(winner) = read_instance_id(path)? {
                return Ok(winner);
            }
            // Blank file left behind; replace it.
            error
                .file
                .persist(path)
                .map_err(|error| write_error(error.error))?;
        }
        Err(error) => return Err(write_error(error.error)),
    }
    info!(path = %path.display(), instance_id = %generated, "generated client instance id");
    Ok(generated)
}

fn read_instance_id(path: &Path) -> Result<Option<String>, IdentityError> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(non_blank(&content).map(str::to_owned)),
        Err(error) if error.kind() == ErrorKind::NotFound => Ok(None),
        Err(source) => Err(IdentityError::Read {
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn non_blank(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    if trimmed.is_empty() { None } else { Some(trimmed) }
}

/// Client descriptor sent in the connect handshake.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientInfo {
    pub id: String,
    pub display_name: String,
    pub version: String,
    pub platform: String,
    pub mode: String,
    pub instance_id: String,
    pub device_family: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_identifier: Option<String>,
}

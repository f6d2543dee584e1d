use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::BinaryError;

pub const DEFAULT_ENGINE_VERSION: &str = "d6e67a83f971b175a593ccc12e15c4a757f93ffe";
pub const DEFAULT_CLI_VERSION: &str = "4.8.0";
pub const DEFAULT_ENGINE_URL: &str = "https://binaries.prisma.sh/all_commits/{version}/{platform}/{name}.gz";
pub const DEFAULT_CLI_URL: &str = "https://prisma-photongo.s3-eu-west-1.amazonaws.com/{name}-{version}-{platform}.gz";

/// Binary cache configuration. Parsed from TOML and injected into
/// [`BinaryCache`](crate::BinaryCache).
///
/// URL templates may use `{name}`, `{platform}` and `{version}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CacheConfig {
    /// Cache directory. Defaults to `~/.cache/prisma-python/binaries/{cli_version}/{engine_version}`.
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,

    /// Platform identifier used in file names and download URLs.
    #[serde(default = "default_platform")]
    pub platform: String,

    #[serde(default = "default_engine_version")]
    pub engine_version: String,

    #[serde(default = "default_engine_url")]
    pub engine_url: String,

    #[serde(default = "default_cli_version")]
    pub cli_version: String,

    #[serde(default = "default_cli_url")]
    pub cli_url: String,
}

fn default_platform() -> String {
    format!("{}-{}", std::env::consts::OS, std::env::consts::ARCH)
}

fn default_engine_version() -> String {
    DEFAULT_ENGINE_VERSION.into()
}

fn default_engine_url() -> String {
    DEFAULT_ENGINE_URL.into()
}

fn default_cli_version() -> String {
    DEFAULT_CLI_VERSION.into()
}

fn default_cli_url() -> String {
    DEFAULT_CLI_URL.into()
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            cache_dir: None,
            platform: default_platform(),
            engine_version: default_engine_version(),
            engine_url: default_engine_url(),
            cli_version: default_cli_version(),
            cli_url: default_cli_url(),
        }
    }
}

impl CacheConfig {
    /// Defaults with an explicit cache directory.
    pub fn with_cache_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: Some(dir.into()),
            ..Self::default()
        }
    }

    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, BinaryError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| BinaryError::Config(format!("{}: {e}", path.display())))?;
        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(toml_str: &str) -> Result<Self, BinaryError> {
        toml::from_str(toml_str).map_err(|e| BinaryError::Config(e.to_string()))
    }

    /// Effective cache directory.
    pub fn cache_dir(&self) -> PathBuf {
        match &self.cache_dir {
            Some(dir) => dir.clone(),
            None => default_cache_root().join(&self.cli_version).join(&self.engine_version),
        }
    }
}

fn default_cache_root() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(".cache")
        .join("prisma-python")
        .join("binaries")
}

/// Substitute `{name}`, `{platform}` and `{version}` in a URL template.
pub(crate) fn render_url(template: &str, name: &str, platform: &str, version: &str) -> String {
    template
        .replace("{name}", name)
        .replace("{platform}", platform)
        .replace("{version}", version)
}

use std::path::{Path, PathBuf};

use crate::binary::{Binary, BinaryKind, binaries_required};
use crate::config::CacheConfig;
use crate::download::download;
use crate::env::{EnvSource, ProcessEnv};
use crate::error::BinaryError;
use crate::progress::DownloadProgress;

/// State of one required binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryStatus {
    pub name: &'static str,
    pub cached_path: PathBuf,
    pub cached: bool,
    /// Path from the binary's override variable, if set.
    pub override_path: Option<PathBuf>,
}

/// Keeps the required engine binaries present in a local cache directory.
///
/// Nothing is remembered between calls: every check asks the filesystem.
/// The directory is assumed to have a single writer.
pub struct BinaryCache<E = ProcessEnv> {
    cache_dir: PathBuf,
    binaries: Vec<Binary>,
    env: E,
    http: reqwest::Client,
}

impl BinaryCache<ProcessEnv> {
    /// Cache reading overrides from the process environment.
    pub fn new(config: &CacheConfig) -> Result<Self, BinaryError> {
        Self::with_env(config, ProcessEnv)
    }
}

impl<E: EnvSource> BinaryCache<E> {
    pub fn with_env(config: &CacheConfig, env: E) -> Result<Self, BinaryError> {
        let http = reqwest::Client::builder().build()?;
        Ok(Self {
            cache_dir: config.cache_dir(),
            binaries: binaries_required(config),
            env,
            http,
        })
    }

    /// Replace the HTTP client used for downloads.
    pub fn with_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// The fixed set of required binaries, in declared order.
    pub fn binaries_required(&self) -> &[Binary] {
        &self.binaries
    }

    pub fn binary(&self, name: &str) -> Option<&Binary> {
        self.binaries.iter().find(|b| b.name() == name)
    }

    /// Path from the binary's override variable, if set and non-empty.
    pub fn override_path(&self, binary: &Binary) -> Option<PathBuf> {
        self.env.non_empty(binary.env_var()).map(PathBuf::from)
    }

    /// Where to run `binary` from: its override if any, else the cache.
    pub fn resolve(&self, binary: &Binary) -> PathBuf {
        self.override_path(binary)
            .unwrap_or_else(|| binary.cached_path().to_path_buf())
    }

    /// True iff every engine has an override. The CLI tool is not checked.
    pub fn all_overridden_via_env(&self) -> bool {
        self.binaries
            .iter()
            .filter(|b| b.kind() == BinaryKind::Engine)
            .all(|b| self.env.non_empty(b.env_var()).is_some())
    }

    /// Required binaries absent from the cache, in declared order.
    pub fn missing(&self) -> Result<Vec<&Binary>, BinaryError> {
        let mut missing = Vec::new();
        for binary in &self.binaries {
            if binary.is_cached()? {
                tracing::debug!(binary = binary.name(), path = %binary.cached_path().display(), "cached");
            } else {
                tracing::debug!(binary = binary.name(), path = %binary.cached_path().display(), "not cached");
                missing.push(binary);
            }
        }
        Ok(missing)
    }

    pub fn status(&self) -> Result<Vec<BinaryStatus>, BinaryError> {
        self.binaries
            .iter()
            .map(|b| {
                Ok(BinaryStatus {
                    name: b.name(),
                    cached_path: b.cached_path().to_path_buf(),
                    cached: b.is_cached()?,
                    override_path: self.override_path(b),
                })
            })
            .collect()
    }

    /// Make sure every required binary is cached and return the cache dir.
    ///
    /// With all engines overridden this returns without touching the
    /// filesystem or the network. Otherwise the missing binaries are
    /// downloaded one at a time in declared order; the first failure aborts.
    pub async fn ensure_cached(&self, progress: &mut dyn DownloadProgress) -> Result<PathBuf, BinaryError> {
        if self.all_overridden_via_env() {
            tracing::debug!("all engine binaries overridden via env");
            return Ok(self.cache_dir.clone());
        }

        let missing = self.missing()?;
        if missing.is_empty() {
            tracing::debug!(dir = %self.cache_dir.display(), "all binaries are cached");
            return Ok(self.cache_dir.clone());
        }

        self.download_all(&missing, progress).await?;
        Ok(self.cache_dir.clone())
    }

    /// [`ensure_cached`](Self::ensure_cached), optionally evicting the cache first.
    pub async fn fetch(&self, force: bool, progress: &mut dyn DownloadProgress) -> Result<PathBuf, BinaryError> {
        if force {
            self.remove_all()?;
        }
        self.ensure_cached(progress).await
    }

    /// Delete every cached binary. Absent files are skipped.
    pub fn remove_all(&self) -> Result<(), BinaryError> {
        for binary in &self.binaries {
            let path = binary.cached_path();
            match std::fs::remove_file(path) {
                Ok(()) => tracing::info!(binary = binary.name(), path = %path.display(), "removed binary"),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(BinaryError::io(path, e)),
            }
        }
        Ok(())
    }

    async fn download_all(&self, binaries: &[&Binary], progress: &mut dyn DownloadProgress) -> Result<(), BinaryError> {
        tokio::fs::create_dir_all(&self.cache_dir)
            .await
            .map_err(|e| BinaryError::io(&self.cache_dir, e))?;

        progress.start(binaries.len());
        for binary in binaries {
            progress.advance(binary);
            download(&self.http, binary).await?;
        }
        progress.finish();
        Ok(())
    }
}

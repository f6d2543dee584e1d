use std::path::{Path, PathBuf};

use crate::config::{CacheConfig, render_url};
use crate::error::BinaryError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryKind {
    /// Query, migration, introspection or formatting engine.
    Engine,
    /// The CLI tool that drives the engines.
    Cli,
}

/// Name, override variable and kind of one required binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BinarySpec {
    pub name: &'static str,
    pub env_var: &'static str,
    pub kind: BinaryKind,
}

pub const QUERY_ENGINE: BinarySpec = BinarySpec {
    name: "query-engine",
    env_var: "PRISMA_QUERY_ENGINE_BINARY",
    kind: BinaryKind::Engine,
};

pub const MIGRATION_ENGINE: BinarySpec = BinarySpec {
    name: "migration-engine",
    env_var: "PRISMA_MIGRATION_ENGINE_BINARY",
    kind: BinaryKind::Engine,
};

pub const INTROSPECTION_ENGINE: BinarySpec = BinarySpec {
    name: "introspection-engine",
    env_var: "PRISMA_INTROSPECTION_ENGINE_BINARY",
    kind: BinaryKind::Engine,
};

pub const PRISMA_FMT: BinarySpec = BinarySpec {
    name: "prisma-fmt",
    env_var: "PRISMA_FMT_BINARY",
    kind: BinaryKind::Engine,
};

pub const PRISMA_CLI: BinarySpec = BinarySpec {
    name: "prisma-cli",
    env_var: "PRISMA_CLI_BINARY",
    kind: BinaryKind::Cli,
};

pub const ENGINES: [BinarySpec; 4] = [QUERY_ENGINE, MIGRATION_ENGINE, INTROSPECTION_ENGINE, PRISMA_FMT];

/// Every required binary, in download order.
pub const REQUIRED: [BinarySpec; 5] = [QUERY_ENGINE, MIGRATION_ENGINE, INTROSPECTION_ENGINE, PRISMA_FMT, PRISMA_CLI];

/// A required binary resolved against a [`CacheConfig`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binary {
    spec: BinarySpec,
    cached_path: PathBuf,
    url: String,
}

impl Binary {
    pub fn new(spec: BinarySpec, config: &CacheConfig) -> Self {
        let cache_dir = config.cache_dir();
        let cached_path = cache_dir.join(format!("{}-{}", spec.name, config.platform));
        let url = match spec.kind {
            BinaryKind::Engine => render_url(&config.engine_url, spec.name, &config.platform, &config.engine_version),
            BinaryKind::Cli => render_url(&config.cli_url, spec.name, &config.platform, &config.cli_version),
        };
        Self { spec, cached_path, url }
    }

    pub fn name(&self) -> &'static str {
        self.spec.name
    }

    pub fn env_var(&self) -> &'static str {
        self.spec.env_var
    }

    pub fn kind(&self) -> BinaryKind {
        self.spec.kind
    }

    /// `{cache_dir}/{name}-{platform}`.
    pub fn cached_path(&self) -> &Path {
        &self.cached_path
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Whether the file is present in the cache. Asks the filesystem every time.
    pub fn is_cached(&self) -> Result<bool, BinaryError> {
        self.cached_path
            .try_exists()
            .map_err(|e| BinaryError::io(&self.cached_path, e))
    }
}

/// The fixed set of required binaries for `config`, in declared order.
pub fn binaries_required(config: &CacheConfig) -> Vec<Binary> {
    REQUIRED.iter().map(|spec| Binary::new(*spec, config)).collect()
}

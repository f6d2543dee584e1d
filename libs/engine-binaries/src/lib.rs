//! Cache of the native engine binaries needed to run queries.
//!
//! A fixed set of five binaries (four engines and the CLI tool) lives under a
//! configured cache directory. [`BinaryCache::ensure_cached`] downloads the
//! missing ones; environment overrides bypass the cache entirely.

pub mod binary;
pub mod cache;
pub mod config;
mod download;
pub mod env;
pub mod error;
pub mod progress;

pub use binary::{Binary, BinaryKind, BinarySpec, ENGINES, REQUIRED, binaries_required};
pub use cache::{BinaryCache, BinaryStatus};
pub use config::CacheConfig;
pub use env::{EnvSource, ProcessEnv};
pub use error::BinaryError;
pub use progress::{DownloadProgress, LogProgress, NoProgress};

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use engine_binaries::CacheConfig;
use raw_results::DEFAULT_NAMESPACE;

use crate::error::CliError;

#[derive(Parser, Debug)]
#[command(name = "engine-cli", about = "Engine binary cache and raw result inspection")]
pub struct Cli {
    #[command(flatten)]
    pub cache: CacheArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Download the engine binaries that are not cached yet
    Fetch(FetchArgs),
    /// Delete every cached engine binary
    Remove,
    /// Show where each binary is resolved from
    Status,
    /// Decode a raw result set and print it as JSON
    Decode(DecodeArgs),
}

// ═══════════════════════════════════════════════════════════════
//  CLI args
// ═══════════════════════════════════════════════════════════════

#[derive(Args, Clone, Debug)]
pub struct CacheArgs {
    /// Path to the TOML config file
    #[arg(long, global = true, default_value = "engine.toml", env = "ENGINE_CONFIG")]
    pub config: String,

    /// Cache directory, overrides `cache_dir` from the config file
    #[arg(long, global = true, env = "ENGINE_CACHE_DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Platform identifier, overrides `platform` from the config file
    #[arg(long, global = true, env = "ENGINE_PLATFORM")]
    pub platform: Option<String>,
}

#[derive(Args, Clone, Debug)]
pub struct FetchArgs {
    /// Download every binary even if it is already cached
    #[arg(long)]
    pub force: bool,
}

#[derive(Args, Clone, Debug)]
pub struct DecodeArgs {
    /// JSON file with the result rows, `-` for stdin
    #[arg(default_value = "-")]
    pub input: String,

    /// Only unwrap arrays, leave every other value as sent
    #[arg(long)]
    pub raw: bool,

    /// Prefix of the reserved `{ns}__type` / `{ns}__value` keys
    #[arg(long, default_value = DEFAULT_NAMESPACE)]
    pub namespace: String,
}

// ═══════════════════════════════════════════════════════════════
//  Effective config: engine.toml < env/CLI
// ═══════════════════════════════════════════════════════════════

/// Cache configuration after merging. A missing config file means defaults,
/// an unreadable or invalid one is an error.
pub fn effective_config(args: &CacheArgs) -> Result<CacheConfig, CliError> {
    let mut cfg = match CacheConfig::load(&args.config) {
        Ok(c) => c,
        Err(e) => {
            if Path::new(&args.config).exists() {
                return Err(e.into());
            }
            tracing::debug!(config = %args.config, "config file not found, using defaults");
            CacheConfig::default()
        }
    };

    if let Some(dir) = &args.cache_dir {
        cfg.cache_dir = Some(dir.clone());
    }
    if let Some(platform) = &args.platform {
        cfg.platform = platform.clone();
    }
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(config: &Path) -> CacheArgs {
        CacheArgs {
            config: config.display().to_string(),
            cache_dir: None,
            platform: None,
        }
    }

    #[test]
    fn parses_subcommands_and_global_flags() {
        let cli = Cli::try_parse_from(["engine-cli", "--cache-dir", "/tmp/engines", "fetch", "--force"]).unwrap();
        assert!(matches!(cli.command, Commands::Fetch(FetchArgs { force: true })));
        assert_eq!(cli.cache.cache_dir, Some(PathBuf::from("/tmp/engines")));

        let cli = Cli::try_parse_from(["engine-cli", "status", "--platform", "linux-musl"]).unwrap();
        assert!(matches!(cli.command, Commands::Status));
        assert_eq!(cli.cache.platform.as_deref(), Some("linux-musl"));

        let cli = Cli::try_parse_from(["engine-cli", "fetch"]).unwrap();
        assert!(matches!(cli.command, Commands::Fetch(FetchArgs { force: false })));
    }

    #[test]
    fn decode_defaults_to_stdin_and_prisma_namespace() {
        let cli = Cli::try_parse_from(["engine-cli", "decode"]).unwrap();
        let Commands::Decode(args) = cli.command else {
            panic!("expected decode");
        };
        assert_eq!(args.input, "-");
        assert!(!args.raw);
        assert_eq!(args.namespace, "prisma");

        let cli = Cli::try_parse_from(["engine-cli", "decode", "rows.json", "--raw", "--namespace", "app"]).unwrap();
        let Commands::Decode(args) = cli.command else {
            panic!("expected decode");
        };
        assert_eq!(args.input, "rows.json");
        assert!(args.raw);
        assert_eq!(args.namespace, "app");
    }

    #[test]
    fn unknown_subcommand_is_rejected() {
        assert!(Cli::try_parse_from(["engine-cli", "install"]).is_err());
    }

    #[test]
    fn missing_config_file_falls_back_to_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let cfg = effective_config(&args(&tmp.path().join("absent.toml"))).unwrap();
        assert_eq!(cfg, CacheConfig::default());
    }

    #[test]
    fn flags_override_config_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("engine.toml");
        std::fs::write(&path, "cache_dir = \"/from/file\"\nplatform = \"file-os\"\ncli_version = \"5.0.0\"\n").unwrap();

        let cfg = effective_config(&args(&path)).unwrap();
        assert_eq!(cfg.cache_dir(), PathBuf::from("/from/file"));
        assert_eq!(cfg.platform, "file-os");

        let cfg = effective_config(&CacheArgs {
            cache_dir: Some(PathBuf::from("/from/cli")),
            platform: Some("cli-os".into()),
            ..args(&path)
        })
        .unwrap();
        assert_eq!(cfg.cache_dir(), PathBuf::from("/from/cli"));
        assert_eq!(cfg.platform, "cli-os");
        assert_eq!(cfg.cli_version, "5.0.0");
    }

    #[test]
    fn invalid_config_file_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("engine.toml");
        std::fs::write(&path, "platform = [1, 2]").unwrap();
        assert!(matches!(effective_config(&args(&path)), Err(CliError::Binary(_))));
    }
}

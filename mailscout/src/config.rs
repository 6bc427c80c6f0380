//! TOML configuration.
//!
//! Every section and field has a default, so a missing file or a partial
//! one is fine. File precedence: `MAILSCOUT_CONFIG` environment variable,
//! then `./mailscout.config.toml`, then `/etc/mailscout/mailscout.config.toml`.

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use serde::Deserialize;

use mailscout_pipeline::orchestrator::DEFAULT_CHANNEL_CAPACITY;
use mailscout_verify::{DEFAULT_MAX_CONCURRENT, DnsConfig, VerifierConfig};

#[derive(Debug, Clone, Deserialize)]
pub struct PoolConfig {
    /// Cap on in-flight verification probes.
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,
}

const fn default_max_concurrent() -> usize {
    DEFAULT_MAX_CONCURRENT
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_concurrent: default_max_concurrent(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    /// Bound on the stage-event channel.
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

const fn default_channel_capacity() -> usize {
    DEFAULT_CHANNEL_CAPACITY
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            channel_capacity: default_channel_capacity(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DispatchConfig {
    /// Domain announced in `EHLO` when delivering.
    #[serde(default = "default_ehlo_domain")]
    pub ehlo_domain: String,

    /// Per-command timeout in seconds for the delivery transaction.
    #[serde(default = "default_command_timeout_secs")]
    pub command_timeout_secs: u64,

    /// Per-domain exchanger override (`domain -> host:port`), bypassing
    /// DNS for delivery.
    #[serde(default)]
    pub mx_override: HashMap<String, String>,
}

fn default_ehlo_domain() -> String {
    "localhost".to_string()
}

const fn default_command_timeout_secs() -> u64 {
    30
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            ehlo_domain: default_ehlo_domain(),
            command_timeout_secs: default_command_timeout_secs(),
            mx_override: HashMap::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub dns: DnsConfig,
    #[serde(default)]
    pub verifier: VerifierConfig,
    #[serde(default)]
    pub pool: PoolConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub dispatch: DispatchConfig,
}

impl Config {
    /// Loads configuration, falling back to defaults when no file exists.
    ///
    /// # Errors
    ///
    /// Returns an error when an explicitly named file is missing or any
    /// found file fails to parse.
    pub fn load(explicit: Option<&Path>) -> anyhow::Result<Self> {
        let path = match explicit {
            Some(path) => {
                anyhow::ensure!(path.exists(), "config file not found: {}", path.display());
                Some(path.to_path_buf())
            }
            None => find_config_file()?,
        };

        match path {
            Some(path) => {
                let content = std::fs::read_to_string(&path).map_err(|err| {
                    anyhow::anyhow!("failed to read config from {}: {err}", path.display())
                })?;
                Ok(toml::from_str(&content)?)
            }
            None => Ok(Self::default()),
        }
    }
}

/// Find the configuration file using the following precedence:
/// 1. `MAILSCOUT_CONFIG` environment variable
/// 2. ./mailscout.config.toml (current working directory)
/// 3. /etc/mailscout/mailscout.config.toml (system-wide config)
fn find_config_file() -> anyhow::Result<Option<PathBuf>> {
    if let Ok(env_path) = std::env::var("MAILSCOUT_CONFIG") {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return Ok(Some(path));
        }
        anyhow::bail!(
            "MAILSCOUT_CONFIG points to non-existent file: {}",
            path.display()
        );
    }

    let default_paths = [
        PathBuf::from("./mailscout.config.toml"),
        PathBuf::from("/etc/mailscout/mailscout.config.toml"),
    ];

    Ok(default_paths.into_iter().find(|path| path.exists()))
}

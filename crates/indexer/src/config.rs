//! Configuration management for the HAPI indexer.
//!
//! This module handles loading configuration from:
//! - TOML files
//! - Environment variables (`${VAR}` placeholders expanded before parsing)
//! - Default values (fallbacks)

use anyhow::{Context, Result};
use hapi_core::{
    AccountKey, NetworkName, NetworkSchema, RewardConfiguration, StakeConfiguration, TokenId,
};
use hapi_registry::CreateNetworkInput;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Main configuration for the indexer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Database configuration
    pub database: DatabaseConfig,

    /// Registry configuration
    pub registry: RegistryConfig,

    /// Networks bootstrapped by the `seed` command
    #[serde(default)]
    pub networks: Vec<NetworkConfig>,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Database configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database URL (e.g., "sqlite://hapi.db")
    pub url: String,

    /// Maximum number of connections in the pool
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// Registry configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Key allowed to create networks (hex, 32 bytes)
    pub program_authority: AccountKey,
}

/// A network entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Network name, at most 32 bytes
    pub name: NetworkName,

    /// Address schema of the network
    #[serde(default = "default_schema")]
    pub schema: NetworkSchema,

    /// Network authority key
    pub authority: AccountKey,

    /// Token bonded by reporters
    pub stake_token: TokenId,

    /// Token paid out as rewards
    pub reward_token: TokenId,

    /// Unlock duration and per-role stakes
    pub stake: StakeConfiguration,

    /// Per-action rewards
    #[serde(default)]
    pub reward: RewardConfiguration,
}

impl NetworkConfig {
    /// Registry input creating this network.
    pub fn to_input(&self) -> CreateNetworkInput {
        CreateNetworkInput {
            name: self.name,
            schema: self.schema,
            authority: self.authority,
            stake_token: self.stake_token,
            stake_configuration: self.stake,
            reward_token: self.reward_token,
            reward_configuration: self.reward,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_max_connections() -> u32 {
    5
}

fn default_min_connections() -> u32 {
    1
}

fn default_schema() -> NetworkSchema {
    NetworkSchema::Plain
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
const LOG_FORMATS: [&str; 2] = ["json", "pretty"];

impl Config {
    /// Load configuration from a TOML file.
    ///
    /// Environment variables can be referenced using `${VAR_NAME}` syntax,
    /// e.g. `program_authority = "${HAPI_PROGRAM_AUTHORITY}"`.
    ///
    /// # Example
    /// ```no_run
    /// # use hapi_indexer::config::Config;
    /// let config = Config::from_file("indexer.toml")?;
    /// # Ok::<(), anyhow::Error>(())
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let expanded = expand_env_vars(&contents)?;

        let config: Config = toml::from_str(&expanded)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        config.validate()?;

        Ok(config)
    }

    /// Load configuration from a TOML string.
    pub fn from_toml_str(toml: &str) -> Result<Self> {
        let expanded = expand_env_vars(toml)?;
        let config: Config =
            toml::from_str(&expanded).context("Failed to parse TOML configuration")?;

        config.validate()?;

        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.database.url.is_empty() {
            anyhow::bail!("Database URL cannot be empty");
        }
        if self.database.max_connections == 0 {
            anyhow::bail!("Database max_connections must be > 0");
        }
        if self.database.min_connections > self.database.max_connections {
            anyhow::bail!(
                "Database min_connections ({}) cannot exceed max_connections ({})",
                self.database.min_connections,
                self.database.max_connections
            );
        }

        if self.registry.program_authority == AccountKey::default() {
            anyhow::bail!("Registry program_authority must be a non-zero key");
        }

        let mut names = HashSet::new();
        for network in &self.networks {
            if !names.insert(network.name) {
                anyhow::bail!("Network '{}' is configured more than once", network.name);
            }
            if network.authority == AccountKey::default() {
                anyhow::bail!("Network '{}' authority must be a non-zero key", network.name);
            }
            if network.stake_token == TokenId::default() {
                anyhow::bail!("Network '{}' stake_token must be non-zero", network.name);
            }
            if network.reward_token == TokenId::default() {
                anyhow::bail!("Network '{}' reward_token must be non-zero", network.name);
            }
        }

        if !LOG_LEVELS.contains(&self.logging.level.as_str()) {
            anyhow::bail!(
                "Logging level must be one of {:?}, got '{}'",
                LOG_LEVELS,
                self.logging.level
            );
        }
        if !LOG_FORMATS.contains(&self.logging.format.as_str()) {
            anyhow::bail!(
                "Logging format must be one of {:?}, got '{}'",
                LOG_FORMATS,
                self.logging.format
            );
        }

        Ok(())
    }
}

/// Where the scanner is within the TOML text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scan {
    Bare,
    Comment,
    Basic,
    Literal,
    MultilineBasic,
    MultilineLiteral,
}

/// Replace `${VAR_NAME}` placeholders with environment variable values.
///
/// Placeholders inside TOML comments are left untouched; placeholders inside
/// any kind of string are expanded. Referencing an unset variable is an error.
fn expand_env_vars(input: &str) -> Result<String> {
    let mut output = String::with_capacity(input.len());
    let mut state = Scan::Bare;
    let mut rest = input;

    while let Some(ch) = rest.chars().next() {
        let offset = input.len() - rest.len();

        // Backslash escapes only exist in basic strings; copy the pair verbatim.
        if ch == '\\' && matches!(state, Scan::Basic | Scan::MultilineBasic) {
            let pair: String = rest.chars().take(2).collect();
            output.push_str(&pair);
            rest = &rest[pair.len()..];
            continue;
        }

        if state != Scan::Comment && rest.starts_with("${") {
            let Some(close) = rest[2..].find('}') else {
                anyhow::bail!(
                    "Unclosed environment variable placeholder at position {}",
                    offset
                );
            };
            let name = &rest[2..2 + close];
            if name.is_empty() {
                anyhow::bail!("Empty environment variable name at position {}", offset);
            }
            let value = std::env::var(name).with_context(|| {
                format!(
                    "Environment variable '{}' is not set (referenced at position {})",
                    name, offset
                )
            })?;
            output.push_str(&value);
            rest = &rest[2 + close + 1..];
            continue;
        }

        let (next, token) = match state {
            Scan::Bare if rest.starts_with(r#"""""#) => (Scan::MultilineBasic, r#"""""#),
            Scan::Bare if rest.starts_with("'''") => (Scan::MultilineLiteral, "'''"),
            Scan::Bare if ch == '"' => (Scan::Basic, "\""),
            Scan::Bare if ch == '\'' => (Scan::Literal, "'"),
            Scan::Bare if ch == '#' => (Scan::Comment, "#"),
            Scan::Comment if ch == '\n' => (Scan::Bare, "\n"),
            Scan::Basic if ch == '"' => (Scan::Bare, "\""),
            Scan::Literal if ch == '\'' => (Scan::Bare, "'"),
            Scan::MultilineBasic if rest.starts_with(r#"""""#) => (Scan::Bare, r#"""""#),
            Scan::MultilineLiteral if rest.starts_with("'''") => (Scan::Bare, "'''"),
            _ => {
                output.push(ch);
                rest = &rest[ch.len_utf8()..];
                continue;
            }
        };

        output.push_str(token);
        rest = &rest[token.len()..];
        state = next;
    }

    Ok(output)
}

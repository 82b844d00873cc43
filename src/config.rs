//! Portal configuration.
//!
//! Every key has a default, so an empty source is a valid configuration.
//!
//! ```toml
//! counter_strategy = "atomic"        # or "read-modify-write"
//! replace_strategy = "two-step"      # or "atomic"
//! cascade_comments = true
//!
//! [blobs]
//! resources = "resources"
//! ```

use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

use crate::counter::{CounterStrategy, ReplaceStrategy};

pub const ENV_PREFIX: &str = "EDU_PORTAL";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortalConfig {
    pub counter_strategy: CounterStrategy,
    pub replace_strategy: ReplaceStrategy,
    /// Delete a lesson's comments before the lesson itself.
    pub cascade_comments: bool,
    pub blobs: BlobDomains,
}

/// Top-level blob path segment per upload kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlobDomains {
    pub resources: String,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            counter_strategy: CounterStrategy::default(),
            replace_strategy: ReplaceStrategy::default(),
            cascade_comments: true,
            blobs: BlobDomains::default(),
        }
    }
}

impl Default for BlobDomains {
    fn default() -> Self {
        Self {
            resources: "resources".to_string(),
        }
    }
}

impl PortalConfig {
    /// Parse TOML text.
    pub fn parse(toml: &str) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()?
            .try_deserialize()
    }

    /// Read `EDU_PORTAL_*` variables; nested keys use `__`
    /// (`EDU_PORTAL_BLOBS__RESOURCES`).
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_prefixed(ENV_PREFIX)
    }

    pub(crate) fn from_env_prefixed(prefix: &str) -> Result<Self, ConfigError> {
        let config: Self = Config::builder()
            .add_source(
                Environment::with_prefix(prefix)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        tracing::debug!(?config, prefix, "loaded portal config from environment");
        Ok(config)
    }
}

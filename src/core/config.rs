//! Resolver configuration with documented defaults
//!
//! Scenario switches (severing on/off, how detached parts are recorded) and
//! the severity bucket table used by type-transform rules.

use serde::{Deserialize, Serialize};

use super::error::ConfigError;
use crate::armor::SeverityTable;

/// What happens to the descendants of a severed part
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetachPolicy {
    /// Descendants are marked severed along with the cut part
    #[default]
    Severed,
    /// Descendants are marked missing; only the cut part is severed
    Missing,
}

/// Configuration for hit resolution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Whether cumulative damage can sever parts at all
    ///
    /// Training bouts and non-lethal scenarios turn this off.
    pub severing_enabled: bool,

    /// How descendants of a severed part are recorded
    pub detach_policy: DetachPolicy,

    /// Whether intact bones intercept hits on the organs they cover
    ///
    /// With this off, an organ reached through coverage takes the hit
    /// directly even when a bone sits over it.
    pub bone_interception: bool,

    /// Raw value to severity mapping used by type-transform rules
    pub severity: SeverityTable,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            severing_enabled: true,
            detach_policy: DetachPolicy::Severed,
            bone_interception: true,
            severity: SeverityTable::default(),
        }
    }
}

impl ResolverConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a config from TOML; missing keys keep their defaults
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: ResolverConfig =
            toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.severity.validate().map_err(ConfigError::Invalid)
    }
}

// === GLOBAL CONFIG ACCESS ===

use std::sync::OnceLock;

static CONFIG: OnceLock<ResolverConfig> = OnceLock::new();

/// Get the global resolver config (initializes with defaults if not set)
pub fn config() -> &'static ResolverConfig {
    CONFIG.get_or_init(ResolverConfig::default)
}

/// Set the global resolver config (can only be called once)
///
/// Returns Err if config was already set.
pub fn set_config(config: ResolverConfig) -> Result<(), ResolverConfig> {
    CONFIG.set(config)
}

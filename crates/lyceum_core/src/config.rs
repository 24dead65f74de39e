//! TOML-based configuration for the orchestration core.
//!
//! The configuration system supports:
//! - Bundled defaults (include_str! from lyceum.toml)
//! - User overrides (./lyceum.toml or ~/.config/lyceum/lyceum.toml)
//! - Automatic merging with user values taking precedence

use crate::{AccessTier, ModelRoute};
use config::{Config, File, FileFormat};
use lyceum_error::{ConfigError, LyceumError, LyceumResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, instrument};

/// Fixed-window admission limit settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct RateLimitSettings {
    /// Requests allowed per caller per window
    #[serde(default = "default_requests_per_window")]
    pub requests_per_window: u32,

    /// Window length in seconds
    #[serde(default = "default_window_seconds")]
    pub window_seconds: u64,
}

fn default_requests_per_window() -> u32 {
    20
}

fn default_window_seconds() -> u64 {
    60
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            requests_per_window: default_requests_per_window(),
            window_seconds: default_window_seconds(),
        }
    }
}

/// Request queue settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct QueueSettings {
    /// Maximum number of jobs executing at once
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Per-job wall-clock deadline in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub default_timeout_ms: u64,
}

fn default_concurrency() -> usize {
    2
}

fn default_timeout_ms() -> u64 {
    60_000
}

impl Default for QueueSettings {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            default_timeout_ms: default_timeout_ms(),
        }
    }
}

/// Exponential backoff settings for provider retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct RetrySettings {
    /// Retries after the initial attempt
    #[serde(default = "default_max_retries")]
    pub max_retries: usize,

    /// Delay before the first retry in milliseconds
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,

    /// Upper bound on any single delay in milliseconds
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    /// Multiplier applied to the delay after each attempt
    #[serde(default = "default_factor")]
    pub factor: u32,
}

fn default_max_retries() -> usize {
    3
}

fn default_initial_delay_ms() -> u64 {
    1_000
}

fn default_max_delay_ms() -> u64 {
    10_000
}

fn default_factor() -> u32 {
    2
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            initial_delay_ms: default_initial_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            factor: default_factor(),
        }
    }
}

/// Per-tier model route and daily volume settings.
///
/// # Example
///
/// ```toml
/// [tiers.premium]
/// model = "gpt-4o"
/// max_tokens = 4_096
/// temperature = 0.7
/// daily_requests = 2_000
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TierSettings {
    /// Model identifier for this tier
    pub model: String,

    /// Token budget for generation
    pub max_tokens: u32,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Requests allowed per caller per calendar day
    pub daily_requests: u32,
}

fn default_temperature() -> f32 {
    0.7
}

impl TierSettings {
    /// The model route described by these settings.
    pub fn route(&self) -> ModelRoute {
        ModelRoute {
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        }
    }
}

/// Top-level lyceum configuration.
///
/// Loads orchestration settings from TOML files with a precedence system:
/// 1. Bundled defaults (include_str! from lyceum.toml)
/// 2. User override (./lyceum.toml or ~/.config/lyceum/lyceum.toml)
///
/// # Example
///
/// ```no_run
/// use lyceum_core::{AccessTier, LyceumConfig};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = LyceumConfig::load()?;
/// let route = config.route(AccessTier::Premium).unwrap();
/// println!("premium model: {}", route.model);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Default)]
pub struct LyceumConfig {
    /// Fixed-window admission limits
    #[serde(default)]
    pub rate_limit: RateLimitSettings,

    /// Request queue sizing
    #[serde(default)]
    pub queue: QueueSettings,

    /// Provider retry backoff
    #[serde(default)]
    pub retry: RetrySettings,

    /// Map of tier name to tier settings
    #[serde(default)]
    pub tiers: HashMap<String, TierSettings>,
}

impl LyceumConfig {
    /// Load configuration from a specific file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<std::path::Path>) -> LyceumResult<Self> {
        debug!("Loading configuration from file");

        Config::builder()
            .add_source(File::from(path.as_ref()))
            .build()
            .map_err(|e| {
                LyceumError::from(ConfigError::new(format!(
                    "Failed to read configuration from {}: {}",
                    path.as_ref().display(),
                    e
                )))
            })?
            .try_deserialize()
            .map_err(|e| {
                LyceumError::from(ConfigError::new(format!(
                    "Failed to parse configuration: {}",
                    e
                )))
            })
    }

    /// Load configuration with precedence: user override > bundled default.
    ///
    /// Configuration sources in order of precedence (later sources override earlier):
    /// 1. Bundled defaults (lyceum.toml shipped with the library)
    /// 2. User config in home directory (~/.config/lyceum/lyceum.toml)
    /// 3. User config in current directory (./lyceum.toml)
    ///
    /// User config files are optional and will be silently skipped if not found.
    #[instrument]
    pub fn load() -> LyceumResult<Self> {
        debug!("Loading configuration with precedence: current dir > home dir > bundled defaults");

        // Bundled default configuration
        const DEFAULT_CONFIG: &str = include_str!("../../../lyceum.toml");

        let mut builder = Config::builder()
            // Start with bundled defaults
            .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

        // Add user config from home directory (optional)
        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".config/lyceum/lyceum.toml");
            builder = builder.add_source(File::from(home_config).required(false));
        }

        // Add user config from current directory (optional, highest precedence)
        builder = builder.add_source(File::with_name("lyceum").required(false));

        // Build and deserialize
        builder
            .build()
            .map_err(|e| {
                LyceumError::from(ConfigError::new(format!(
                    "Failed to build configuration: {}",
                    e
                )))
            })?
            .try_deserialize()
            .map_err(|e| {
                LyceumError::from(ConfigError::new(format!(
                    "Failed to parse configuration: {}",
                    e
                )))
            })
    }

    /// Settings for a tier, if configured.
    pub fn tier(&self, tier: AccessTier) -> Option<&TierSettings> {
        self.tiers.get(tier.as_str())
    }

    /// Model route for a tier, if configured.
    #[instrument(skip(self))]
    pub fn route(&self, tier: AccessTier) -> Option<ModelRoute> {
        debug!(tier = %tier, "Looking up model route");
        self.tier(tier).map(TierSettings::route)
    }

    /// Daily request limit for a tier, if configured.
    pub fn daily_limit(&self, tier: AccessTier) -> Option<u32> {
        self.tier(tier).map(|t| t.daily_requests)
    }
}

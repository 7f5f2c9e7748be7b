//! # Engine Configuration
//!
//! Tunables for the escrow ledger and the location obfuscator. Every field
//! has a default, so an empty document (or no document) yields a working
//! configuration.
//!
//! ```yaml
//! escrow:
//!   default_platform_fee_bps: 1200
//!   release_window_hours: 72
//! geo:
//!   max_offset_degrees: 0.005
//!   obfuscated_zoom_ceiling: 14
//!   precise_zoom_ceiling: 20
//!   cache_ttl_seconds: 86400
//! ```

use std::path::Path;

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Basis points in 100%.
pub const BPS_DENOMINATOR: u32 = 10_000;

/// Root configuration document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrustGateConfig {
    /// Escrow ledger settings.
    pub escrow: EscrowConfig,
    /// Location obfuscation settings.
    pub geo: GeoConfig,
}

/// Escrow ledger settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EscrowConfig {
    /// Platform fee applied to newly created transactions, in basis points.
    pub default_platform_fee_bps: u32,
    /// Length of the release window opened by a delivery confirmation.
    pub release_window_hours: u32,
}

impl Default for EscrowConfig {
    fn default() -> Self {
        Self {
            default_platform_fee_bps: 1200,
            release_window_hours: 72,
        }
    }
}

impl EscrowConfig {
    /// The release window as a duration.
    pub fn release_window(&self) -> Duration {
        Duration::hours(i64::from(self.release_window_hours))
    }
}

/// Location obfuscation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeoConfig {
    /// Half-width of the offset box on each axis, in degrees.
    pub max_offset_degrees: f64,
    /// Zoom cap returned with an obfuscated coordinate.
    pub obfuscated_zoom_ceiling: u8,
    /// Zoom cap returned with a precise coordinate.
    pub precise_zoom_ceiling: u8,
    /// Lifetime of an obfuscation cache entry.
    pub cache_ttl_seconds: u64,
}

impl Default for GeoConfig {
    fn default() -> Self {
        Self {
            max_offset_degrees: 0.005,
            obfuscated_zoom_ceiling: 14,
            precise_zoom_ceiling: 20,
            cache_ttl_seconds: 86_400,
        }
    }
}

impl GeoConfig {
    /// The cache TTL as a duration. Saturates at `i64::MAX` seconds.
    pub fn cache_ttl(&self) -> Duration {
        let secs = i64::try_from(self.cache_ttl_seconds).unwrap_or(i64::MAX);
        Duration::try_seconds(secs).unwrap_or(Duration::MAX)
    }
}

impl TrustGateConfig {
    /// Parse a YAML document and validate it.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse, and validate a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml_str(&text)
    }

    /// Check every section.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.escrow.validate()?;
        self.geo.validate()
    }
}

impl EscrowConfig {
    /// Check the fee rate is at most 100%.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_platform_fee_bps > BPS_DENOMINATOR {
            return Err(ConfigError::Invalid {
                key: "escrow.default_platform_fee_bps",
                reason: format!(
                    "{} exceeds {BPS_DENOMINATOR}",
                    self.default_platform_fee_bps
                ),
            });
        }
        Ok(())
    }
}

impl GeoConfig {
    /// Check offset range, zoom ordering, and TTL.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let offset = self.max_offset_degrees;
        if !offset.is_finite() || offset <= 0.0 || offset >= 1.0 {
            return Err(ConfigError::Invalid {
                key: "geo.max_offset_degrees",
                reason: format!("{offset} is not in (0, 1)"),
            });
        }
        if self.obfuscated_zoom_ceiling > self.precise_zoom_ceiling {
            return Err(ConfigError::Invalid {
                key: "geo.obfuscated_zoom_ceiling",
                reason: format!(
                    "{} exceeds precise ceiling {}",
                    self.obfuscated_zoom_ceiling, self.precise_zoom_ceiling
                ),
            });
        }
        if self.cache_ttl_seconds == 0 {
            return Err(ConfigError::Invalid {
                key: "geo.cache_ttl_seconds",
                reason: "must be positive".to_string(),
            });
        }
        Ok(())
    }
}

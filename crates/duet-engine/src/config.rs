//! Engine configuration loaded from TOML.

use std::path::Path;

use duet_allocator::{AllocatorConfig, AllocatorSettings};
use duet_curve::{CurveConfig, CurveSettings};
use duet_state::{FeedConfig, FeedScale, OracleConfig, TierThresholds};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{EngineError, EngineResult};

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "DUET_CONFIG";
/// Config file used when `DUET_CONFIG` is unset.
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Engine configuration. Every section is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub feed: FeedConfig,
    #[serde(default)]
    pub oracle: OracleConfig,
    #[serde(default)]
    pub curve: CurveConfig,
    #[serde(default)]
    pub allocator: AllocatorConfig,
}

/// Configuration converted to engine units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedConfig {
    pub feed_scale: FeedScale,
    pub update_tolerance_secs: u64,
    pub thresholds: TierThresholds,
    pub curve: CurveSettings,
    pub allocator: AllocatorSettings,
}

impl EngineConfig {
    /// Load configuration from a TOML file and validate it.
    pub fn from_file(path: impl AsRef<Path>) -> EngineResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            EngineError::Config(format!("Failed to read {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string and validate it.
    pub fn from_toml_str(content: &str) -> EngineResult<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| EngineError::Config(format!("Failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `$DUET_CONFIG`, else `config/default.toml`.
    ///
    /// A missing default file falls back to built-in defaults; a missing
    /// file named by `DUET_CONFIG` is an error.
    pub fn load() -> EngineResult<Self> {
        match std::env::var(CONFIG_ENV) {
            Ok(path) => {
                info!(path = %path, "Loading config from DUET_CONFIG");
                Self::from_file(path)
            }
            Err(_) if Path::new(DEFAULT_CONFIG_PATH).exists() => {
                info!(path = DEFAULT_CONFIG_PATH, "Loading default config");
                Self::from_file(DEFAULT_CONFIG_PATH)
            }
            Err(_) => {
                warn!(
                    path = DEFAULT_CONFIG_PATH,
                    "Config file not found, using built-in defaults"
                );
                Ok(Self::default())
            }
        }
    }

    /// Validate every section.
    pub fn validate(&self) -> EngineResult<()> {
        self.feed
            .validate()
            .map_err(|e| EngineError::Config(format!("[feed] {e}")))?;
        self.oracle
            .validate()
            .map_err(|e| EngineError::Config(format!("[oracle] {e}")))?;
        self.curve
            .validate()
            .map_err(|e| EngineError::Config(format!("[curve] {e}")))?;
        self.allocator
            .validate()
            .map_err(|e| EngineError::Config(format!("[allocator] {e}")))?;
        Ok(())
    }

    /// Validate and convert to engine units.
    pub fn resolve(&self) -> EngineResult<ResolvedConfig> {
        self.validate()?;
        Ok(ResolvedConfig {
            feed_scale: FeedScale::from_config(&self.feed),
            update_tolerance_secs: self.oracle.update_tolerance_secs,
            thresholds: self
                .oracle
                .thresholds()
                .map_err(|e| EngineError::Config(format!("[oracle] {e}")))?,
            curve: self
                .curve
                .resolve()
                .map_err(|e| EngineError::Config(format!("[curve] {e}")))?,
            allocator: self
                .allocator
                .resolve()
                .map_err(|e| EngineError::Config(format!("[allocator] {e}")))?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use duet_core::Wad;
    use rust_decimal_macros::dec;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = EngineConfig::from_toml_str("").unwrap();
        assert_eq!(config, EngineConfig::default());

        let resolved = config.resolve().unwrap();
        assert_eq!(resolved.feed_scale.decimals(), 8);
        assert_eq!(resolved.update_tolerance_secs, 30);
        assert_eq!(resolved.thresholds, TierThresholds::default());
        assert_eq!(resolved.curve, CurveSettings::default());
        assert_eq!(resolved.allocator, AllocatorSettings::default());
    }

    #[test]
    fn test_sections_parse() {
        let toml_str = r#"
[feed]
decimals = 6

[oracle]
update_tolerance_secs = 15
tier1_deviation = "0.01"

[curve]
q_max = "50"

[allocator]
cooldown_secs = 120
yield_recall_amount = "2500"
"#;
        let config = EngineConfig::from_toml_str(toml_str).unwrap();
        assert_eq!(config.feed.decimals, 6);
        assert_eq!(config.oracle.update_tolerance_secs, 15);
        assert_eq!(config.oracle.tier1_deviation, dec!(0.01));
        assert_eq!(config.oracle.tier2_deviation, dec!(0.02));
        assert_eq!(config.curve.q_max, dec!(50));
        assert_eq!(config.allocator.cooldown_secs, 120);

        let resolved = config.resolve().unwrap();
        assert_eq!(resolved.curve.q_max, Wad::from_int(50));
        assert_eq!(resolved.allocator.yield_recall_amount, Wad::from_int(2_500));
    }

    #[test]
    fn test_invalid_section_is_reported() {
        let toml_str = r#"
[oracle]
tier1_deviation = "0.03"
"#;
        let err = EngineConfig::from_toml_str(toml_str).unwrap_err();
        assert!(matches!(err, EngineError::Config(ref msg) if msg.starts_with("[oracle]")));
    }

    #[test]
    fn test_parse_error() {
        let err = EngineConfig::from_toml_str("[curve\n").unwrap_err();
        assert!(matches!(err, EngineError::Config(_)));
    }

    #[test]
    fn test_shipped_default_file_matches_builtin_defaults() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/../../config/default.toml");
        let config = EngineConfig::from_file(path).unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_missing_file() {
        let err = EngineConfig::from_file("/nonexistent/duet.toml").unwrap_err();
        assert!(err.to_string().contains("Failed to read"));
    }
}

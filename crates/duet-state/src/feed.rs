//! Price feed ingestion.
//!
//! The oracle is an external collaborator: it hands over a previously fetched
//! `(price, confidence, fetched_at)` triple in its own fixed scale (1e8 for
//! the reference deployment). `FeedScale` lifts those integers into WAD.

use duet_core::{UnixSeconds, Wad};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::error::{StateError, StateResult};

/// Raw sample exactly as delivered by the feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedSample {
    /// Price in feed units.
    pub price: u64,
    /// Confidence interval half-width in feed units.
    pub confidence: u64,
    /// Time the sample was fetched.
    pub fetched_at: UnixSeconds,
}

/// A feed sample converted to WAD.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceObservation {
    pub price: Wad,
    pub confidence: Wad,
    pub fetched_at: UnixSeconds,
}

/// Feed configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Fractional digits of the feed's integers (8 → scale factor 10^10).
    #[serde(default = "default_feed_decimals")]
    pub decimals: u32,
}

fn default_feed_decimals() -> u32 {
    8
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            decimals: default_feed_decimals(),
        }
    }
}

impl FeedConfig {
    /// Feed scales beyond 36 decimals cannot be lifted into WAD.
    pub fn validate(&self) -> StateResult<()> {
        if self.decimals > 36 {
            return Err(StateError::InvalidConfig(format!(
                "feed decimals ({}) must be at most 36",
                self.decimals
            )));
        }
        Ok(())
    }
}

/// Converts feed integers into WAD.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedScale {
    decimals: u32,
}

impl FeedScale {
    pub fn new(decimals: u32) -> Self {
        Self { decimals }
    }

    pub fn from_config(config: &FeedConfig) -> Self {
        Self::new(config.decimals)
    }

    pub fn decimals(&self) -> u32 {
        self.decimals
    }

    /// Convert a raw sample. A zero price is rejected; a zero confidence is
    /// valid.
    pub fn ingest(&self, sample: &FeedSample) -> StateResult<PriceObservation> {
        if sample.price == 0 {
            return Err(StateError::InvalidFeed("price is zero".to_string()));
        }
        Ok(PriceObservation {
            price: Wad::from_units(u128::from(sample.price), self.decimals)?,
            confidence: Wad::from_units(u128::from(sample.confidence), self.decimals)?,
            fetched_at: sample.fetched_at,
        })
    }
}

/// Source of the latest oracle sample.
pub trait PriceFeed: Send + Sync {
    /// Latest sample, or `None` if the feed has never produced one.
    fn latest(&self) -> Option<FeedSample>;
}

/// Feed whose sample is pushed by the caller (keeper relay, simulations).
#[derive(Debug, Default)]
pub struct ManualFeed {
    sample: Mutex<Option<FeedSample>>,
}

impl ManualFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sample(sample: FeedSample) -> Self {
        Self {
            sample: Mutex::new(Some(sample)),
        }
    }

    pub fn set(&self, sample: FeedSample) {
        *self.sample.lock() = Some(sample);
    }

    pub fn clear(&self) {
        *self.sample.lock() = None;
    }
}

impl PriceFeed for ManualFeed {
    fn latest(&self) -> Option<FeedSample> {
        *self.sample.lock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_ingest_scales_1e8_to_wad() {
        let scale = FeedScale::from_config(&FeedConfig::default());
        let sample = FeedSample {
            price: 210_050_000_000, // 2100.5
            confidence: 150_000_000, // 1.5
            fetched_at: 1_000,
        };
        let obs = scale.ingest(&sample).unwrap();
        assert_eq!(obs.price, Wad::from_decimal(dec!(2100.5)).unwrap());
        assert_eq!(obs.confidence, Wad::from_decimal(dec!(1.5)).unwrap());
        assert_eq!(obs.fetched_at, 1_000);
    }

    #[test]
    fn test_ingest_respects_configured_scale() {
        let scale = FeedScale::new(6);
        let sample = FeedSample {
            price: 2_100_000_000,
            confidence: 0,
            fetched_at: 5,
        };
        let obs = scale.ingest(&sample).unwrap();
        assert_eq!(obs.price, Wad::from_int(2100));
        assert_eq!(obs.confidence, Wad::ZERO);
    }

    #[test]
    fn test_ingest_rejects_zero_price() {
        let scale = FeedScale::new(8);
        let sample = FeedSample {
            price: 0,
            confidence: 1,
            fetched_at: 5,
        };
        assert!(matches!(
            scale.ingest(&sample),
            Err(StateError::InvalidFeed(_))
        ));
    }

    #[test]
    fn test_manual_feed() {
        let feed = ManualFeed::new();
        assert!(feed.latest().is_none());

        let sample = FeedSample {
            price: 1,
            confidence: 0,
            fetched_at: 7,
        };
        feed.set(sample);
        assert_eq!(feed.latest(), Some(sample));

        feed.clear();
        assert!(feed.latest().is_none());
    }

    #[test]
    fn test_feed_config_serde_default() {
        let config: FeedConfig = toml::from_str("").unwrap();
        assert_eq!(config.decimals, 8);
        assert!(config.validate().is_ok());
        assert!(FeedConfig { decimals: 37 }.validate().is_err());
    }
}

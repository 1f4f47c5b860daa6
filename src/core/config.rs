use crate::augment::Augmenter;
use crate::error::{Error, Result};
use crate::positioning::StrategyConfig;
use crate::reconcile::LayerTiming;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TimingConfig {
    pub prototypes: LayerTiming,
    pub edges: LayerTiming,
    pub losses: LayerTiming,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            prototypes: LayerTiming::new(800.0, 800.0, 600.0),
            edges: LayerTiming::new(1000.0, 1000.0, 500.0),
            losses: LayerTiming::new(900.0, 900.0, 500.0),
        }
    }
}

impl TimingConfig {
    /// Every change lands on the next render; handy for tests and static exports.
    pub fn instant() -> Self {
        Self {
            prototypes: LayerTiming::instant(),
            edges: LayerTiming::instant(),
            losses: LayerTiming::instant(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SessionConfig {
    /// `None` seeds from the clock.
    pub seed: Option<u64>,
    pub strategy: StrategyConfig,
    pub augment: Augmenter,
    pub timing: TimingConfig,
    /// Edge length of the square prototype thumbnail.
    pub thumbnail_size: f64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            seed: None,
            strategy: StrategyConfig::default(),
            augment: Augmenter::default(),
            timing: TimingConfig::default(),
            thumbnail_size: 45.0,
        }
    }
}

impl SessionConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_strategy(mut self, strategy: StrategyConfig) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_timing(mut self, timing: TimingConfig) -> Self {
        self.timing = timing;
        self
    }

    #[cfg(feature = "serde")]
    pub fn from_json_str(s: &str) -> Result<Self> {
        let cfg: Self = serde_json::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        self.strategy.validate().map_err(Error::InvalidConfig)?;
        self.augment.validate().map_err(Error::InvalidConfig)?;
        self.timing
            .prototypes
            .validate("prototypes")
            .and_then(|_| self.timing.edges.validate("edges"))
            .and_then(|_| self.timing.losses.validate("losses"))
            .map_err(Error::InvalidConfig)?;
        if self.thumbnail_size.is_nan() || self.thumbnail_size <= 0.0 {
            return Err(Error::InvalidConfig(
                "thumbnail_size must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn resolve_seed(&self) -> u64 {
        self.seed.unwrap_or_else(|| {
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_nanos() as u64)
                .unwrap_or(0x9E37_79B9_7F4A_7C15)
        })
    }
}

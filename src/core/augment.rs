use crate::prng::RandomSource;
use crate::prototype::{FilterDescriptor, Prototype};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Bounds for the cosmetic re-randomization applied on every advance.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Augmenter {
    /// Full width of the positional jitter window on each axis.
    pub position_jitter: f64,
    pub brightness_min: f64,
    pub brightness_max: f64,
    /// Exclusive upper bound of the hue rotation in degrees.
    pub hue_max_deg: u32,
}

impl Default for Augmenter {
    fn default() -> Self {
        Self {
            position_jitter: 12.0,
            brightness_min: 0.8,
            brightness_max: 1.2,
            hue_max_deg: 40,
        }
    }
}

impl Augmenter {
    /// Re-randomizes `proto` relative to its anchor. Previous jitter is discarded, so
    /// repeated passes never drift.
    pub fn apply(&self, proto: &mut Prototype, rng: &mut dyn RandomSource) {
        let half = self.position_jitter * 0.5;
        let dx = rng.gen_range_f64(-half, half);
        let dy = rng.gen_range_f64(-half, half);
        proto.position = proto.anchor.offset(dx, dy);

        let brightness = rng.gen_range_f64(self.brightness_min, self.brightness_max);
        let hue = rng.gen_below(self.hue_max_deg);
        let filter = FilterDescriptor::new(brightness, hue);
        proto.filter = Some(FilterDescriptor {
            // Rounding may land on the upper bound; keep the descriptor inside it.
            brightness: filter.brightness.clamp(self.brightness_min, self.brightness_max),
            ..filter
        });
    }

    pub fn apply_all<'a>(
        &self,
        protos: impl IntoIterator<Item = &'a mut Prototype>,
        rng: &mut dyn RandomSource,
    ) {
        for p in protos {
            self.apply(p, rng);
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.position_jitter < 0.0 {
            return Err("augment: position_jitter must be non-negative".into());
        }
        if self.brightness_min > self.brightness_max || self.brightness_min < 0.0 {
            return Err("augment: brightness range must satisfy 0 <= min <= max".into());
        }
        if self.hue_max_deg == 0 {
            return Err("augment: hue_max_deg must be at least 1".into());
        }
        Ok(())
    }
}

//! Pluggable placement of new prototypes.
//!
//! All strategies are stateless: the same slot and the same random draws always give
//! the same point.

use std::f64::consts::PI;

use crate::layout::Point;
use crate::prng::RandomSource;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Where a prototype sits in the session's history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    /// Cumulative prototype index across all tasks.
    pub index: usize,
    /// Task the prototype was introduced by.
    pub task: usize,
    /// Total prototypes being laid out (>= 1; 0 is treated as 1).
    pub count: usize,
}

impl Slot {
    pub fn new(index: usize, task: usize, count: usize) -> Self {
        Self { index, task, count }
    }
}

pub trait PositioningStrategy: std::fmt::Debug {
    fn place(&self, slot: Slot, rng: &mut dyn RandomSource) -> Point;

    /// Whether every prototype's anchor must be recomputed when the store grows.
    fn relayout_on_growth(&self) -> bool {
        false
    }

    fn name(&self) -> &'static str;
}

/// Column per task, random scatter inside it.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct JitteredRandom {
    pub origin: Point,
    pub task_step: f64,
    pub jitter_width: f64,
    pub jitter_height: f64,
}

impl Default for JitteredRandom {
    fn default() -> Self {
        Self {
            origin: Point::new(60.0, 40.0),
            task_step: 50.0,
            jitter_width: 20.0,
            jitter_height: 60.0,
        }
    }
}

impl PositioningStrategy for JitteredRandom {
    fn place(&self, slot: Slot, rng: &mut dyn RandomSource) -> Point {
        let base_x = self.origin.x + slot.task as f64 * self.task_step;
        let half = self.jitter_width * 0.5;
        let x = base_x + rng.gen_range_f64(-half, half);
        let y = self.origin.y + rng.gen_range_f64(0.0, self.jitter_height);
        Point::new(x, y)
    }

    fn name(&self) -> &'static str {
        "jittered"
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Grid {
    pub origin: Point,
    pub columns: usize,
    pub pitch_x: f64,
    pub pitch_y: f64,
    pub jitter: f64,
}

impl Default for Grid {
    fn default() -> Self {
        Self {
            origin: Point::new(30.0, 30.0),
            columns: 4,
            pitch_x: 55.0,
            pitch_y: 55.0,
            jitter: 4.0,
        }
    }
}

impl Grid {
    pub fn cell(&self, index: usize) -> (usize, usize) {
        let columns = self.columns.max(1);
        (index % columns, index / columns)
    }
}

impl PositioningStrategy for Grid {
    fn place(&self, slot: Slot, rng: &mut dyn RandomSource) -> Point {
        let (col, row) = self.cell(slot.index);
        let jx = rng.gen_range_f64(-self.jitter, self.jitter);
        let jy = rng.gen_range_f64(-self.jitter, self.jitter);
        Point::new(
            self.origin.x + col as f64 * self.pitch_x + jx,
            self.origin.y + row as f64 * self.pitch_y + jy,
        )
    }

    fn name(&self) -> &'static str {
        "grid"
    }
}

/// Semicircle bulging away from `center`, swept top (-90°) to bottom (+90°).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Arc {
    pub center: Point,
    pub radius: f64,
    pub jitter: f64,
}

impl Default for Arc {
    fn default() -> Self {
        Self {
            center: Point::new(150.0, 165.0),
            radius: 120.0,
            jitter: 3.0,
        }
    }
}

impl Arc {
    pub const START_DEG: f64 = -90.0;
    pub const SWEEP_DEG: f64 = 180.0;

    pub fn angle_deg(index: usize, count: usize) -> f64 {
        let count = count.max(1);
        // A single prototype sits at the start angle.
        let step = if count > 1 {
            Self::SWEEP_DEG / (count - 1) as f64
        } else {
            0.0
        };
        let index = index.min(count - 1);
        Self::START_DEG + step * index as f64
    }

    pub fn point_at(&self, angle_deg: f64) -> Point {
        let theta = angle_deg * PI / 180.0;
        Point::new(
            self.center.x - self.radius * theta.cos(),
            self.center.y + self.radius * theta.sin(),
        )
    }
}

impl PositioningStrategy for Arc {
    fn place(&self, slot: Slot, rng: &mut dyn RandomSource) -> Point {
        let p = self.point_at(Self::angle_deg(slot.index, slot.count));
        let jx = rng.gen_range_f64(-self.jitter, self.jitter);
        let jy = rng.gen_range_f64(-self.jitter, self.jitter);
        p.offset(jx, jy)
    }

    fn relayout_on_growth(&self) -> bool {
        true
    }

    fn name(&self) -> &'static str {
        "arc"
    }
}

/// Serializable selection of the active strategy.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "lowercase"))]
pub enum StrategyConfig {
    Jittered(JitteredRandom),
    Grid(Grid),
    Arc(Arc),
}

impl Default for StrategyConfig {
    fn default() -> Self {
        StrategyConfig::Jittered(JitteredRandom::default())
    }
}

impl StrategyConfig {
    pub fn build(self) -> Box<dyn PositioningStrategy + Send + Sync> {
        match self {
            StrategyConfig::Jittered(s) => Box::new(s),
            StrategyConfig::Grid(s) => Box::new(s),
            StrategyConfig::Arc(s) => Box::new(s),
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        match self {
            StrategyConfig::Jittered(s) => {
                if s.jitter_width < 0.0 || s.jitter_height < 0.0 {
                    return Err("jittered: jitter extents must be non-negative".into());
                }
            }
            StrategyConfig::Grid(s) => {
                if s.columns == 0 {
                    return Err("grid: columns must be at least 1".into());
                }
                if s.pitch_x <= 0.0 || s.pitch_y <= 0.0 {
                    return Err("grid: pitch must be positive".into());
                }
            }
            StrategyConfig::Arc(s) => {
                if s.radius <= 0.0 {
                    return Err("arc: radius must be positive".into());
                }
            }
        }
        Ok(())
    }
}

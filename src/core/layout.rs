//! Fixed architectural regions and the logical canvas they live on.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    pub fn lerp(self, to: Point, t: f64) -> Self {
        Self::new(self.x + (to.x - self.x) * t, self.y + (to.y - self.y) * t)
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum RegionKind {
    Embedding,
    Hypernetwork,
    Backbone,
    Head,
}

impl RegionKind {
    pub fn name(self) -> &'static str {
        match self {
            RegionKind::Embedding => "embedding",
            RegionKind::Hypernetwork => "hypernetwork",
            RegionKind::Backbone => "backbone",
            RegionKind::Head => "head",
        }
    }

    /// Text drawn inside the box.
    pub fn label(self) -> &'static str {
        match self {
            RegionKind::Embedding => "Task Emb e",
            RegionKind::Hypernetwork => "HyperNet",
            RegionKind::Backbone => "Backbone",
            RegionKind::Head => "Task Head",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::all().iter().copied().find(|k| k.name() == name)
    }

    pub fn all() -> &'static [RegionKind] {
        &[
            RegionKind::Embedding,
            RegionKind::Hypernetwork,
            RegionKind::Backbone,
            RegionKind::Head,
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Region {
    pub kind: RegionKind,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Region {
    pub const fn new(kind: RegionKind, x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            kind,
            x,
            y,
            width,
            height,
        }
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width * 0.5, self.y + self.height * 0.5)
    }

    pub fn left_mid(&self) -> Point {
        Point::new(self.x, self.y + self.height * 0.5)
    }

    pub fn right_mid(&self) -> Point {
        Point::new(self.x + self.width, self.y + self.height * 0.5)
    }

    pub fn top_mid(&self) -> Point {
        Point::new(self.x + self.width * 0.5, self.y)
    }

    pub fn bottom_mid(&self) -> Point {
        Point::new(self.x + self.width * 0.5, self.y + self.height)
    }

    /// Point on the top edge at fraction `t` of the width.
    pub fn top_at(&self, t: f64) -> Point {
        Point::new(self.x + self.width * t, self.y)
    }

    /// Point on the bottom edge at fraction `t` of the width.
    pub fn bottom_at(&self, t: f64) -> Point {
        Point::new(self.x + self.width * t, self.y + self.height)
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.x + self.width && p.y >= self.y && p.y <= self.y + self.height
    }
}

/// The four regions plus the logical viewBox. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    pub width: f64,
    pub height: f64,
    embedding: Region,
    hypernetwork: Region,
    backbone: Region,
    head: Region,
}

impl Layout {
    pub fn new(width: f64, height: f64, regions: [Region; 4]) -> Option<Self> {
        let find = |kind: RegionKind| regions.iter().copied().find(|r| r.kind == kind);
        Some(Self {
            width,
            height,
            embedding: find(RegionKind::Embedding)?,
            hypernetwork: find(RegionKind::Hypernetwork)?,
            backbone: find(RegionKind::Backbone)?,
            head: find(RegionKind::Head)?,
        })
    }

    pub fn region(&self, kind: RegionKind) -> &Region {
        match kind {
            RegionKind::Embedding => &self.embedding,
            RegionKind::Hypernetwork => &self.hypernetwork,
            RegionKind::Backbone => &self.backbone,
            RegionKind::Head => &self.head,
        }
    }

    pub fn embedding(&self) -> &Region {
        &self.embedding
    }

    pub fn hypernetwork(&self) -> &Region {
        &self.hypernetwork
    }

    pub fn backbone(&self) -> &Region {
        &self.backbone
    }

    pub fn head(&self) -> &Region {
        &self.head
    }

    pub fn regions(&self) -> impl Iterator<Item = &Region> + '_ {
        RegionKind::all().iter().map(move |k| self.region(*k))
    }

    pub fn view_box(&self) -> [f64; 4] {
        [0.0, 0.0, self.width, self.height]
    }
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            width: 1100.0,
            height: 700.0,
            embedding: Region::new(RegionKind::Embedding, 180.0, 140.0, 110.0, 50.0),
            hypernetwork: Region::new(RegionKind::Hypernetwork, 470.0, 190.0, 130.0, 60.0),
            backbone: Region::new(RegionKind::Backbone, 420.0, 360.0, 200.0, 100.0),
            head: Region::new(RegionKind::Head, 830.0, 320.0, 130.0, 80.0),
        }
    }
}

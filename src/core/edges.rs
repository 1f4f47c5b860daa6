//! Connector lines and loss markers, derived from layout and store on every render.
//!
//! Nothing here keeps state between calls; ids are stable so the reconciler can
//! animate geometry changes instead of replacing elements.

use crate::layout::{Layout, Point};
use crate::prototype::PrototypeStore;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Fixed (non-prototype) members of the synthesized edge set.
pub const FIXED_EDGE_COUNT: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum EdgeCategory {
    Forward,
    Weight,
    Gradient,
}

impl EdgeCategory {
    pub fn class_name(self) -> &'static str {
        match self {
            EdgeCategory::Forward => "fwdArrow",
            EdgeCategory::Weight => "weightArrow",
            EdgeCategory::Gradient => "gradArrow",
        }
    }

    /// Id of the arrowhead marker definition used for this category.
    pub fn marker_id(self) -> &'static str {
        match self {
            EdgeCategory::Forward => "markerFwd",
            EdgeCategory::Weight => "markerGreen",
            EdgeCategory::Gradient => "markerRed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Segment {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl Segment {
    pub fn new(from: Point, to: Point) -> Self {
        Self {
            x1: from.x,
            y1: from.y,
            x2: to.x,
            y2: to.y,
        }
    }

    pub fn source(&self) -> Point {
        Point::new(self.x1, self.y1)
    }

    pub fn target(&self) -> Point {
        Point::new(self.x2, self.y2)
    }

    /// Zero-length segment at the source point.
    pub fn collapsed(&self) -> Self {
        Self::new(self.source(), self.source())
    }

    pub fn lerp(&self, to: &Segment, t: f64) -> Self {
        Self::new(
            self.source().lerp(to.source(), t),
            self.target().lerp(to.target(), t),
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Edge {
    pub id: String,
    pub category: EdgeCategory,
    pub segment: Segment,
    pub dashed: bool,
}

impl Edge {
    pub fn new(id: impl Into<String>, category: EdgeCategory, from: Point, to: Point) -> Self {
        Self {
            id: id.into(),
            category,
            segment: Segment::new(from, to),
            dashed: false,
        }
    }

    fn dashed(mut self) -> Self {
        self.dashed = true;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum LossKind {
    #[cfg_attr(feature = "serde", serde(rename = "hard-loss"))]
    Hard,
    #[cfg_attr(feature = "serde", serde(rename = "soft-loss-main"))]
    SoftMain,
    #[cfg_attr(feature = "serde", serde(rename = "soft-loss-prototype"))]
    SoftPrototype,
}

impl LossKind {
    pub fn id(self) -> &'static str {
        match self {
            LossKind::Hard => "hard-loss",
            LossKind::SoftMain => "soft-loss-main",
            LossKind::SoftPrototype => "soft-loss-prototype",
        }
    }

    /// Short symbol drawn inside the circle.
    pub fn symbol(self) -> &'static str {
        match self {
            LossKind::Hard => "Lhm",
            LossKind::SoftMain => "Lsm",
            LossKind::SoftPrototype => "Lsp",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::all().iter().copied().find(|k| k.id() == id)
    }

    pub fn all() -> &'static [LossKind] {
        &[LossKind::Hard, LossKind::SoftMain, LossKind::SoftPrototype]
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct LossMarker {
    pub kind: LossKind,
    pub center: Point,
    pub label: &'static str,
    /// Static gradient connector drawn with the marker, if it has one.
    pub stem: Option<Segment>,
}

impl LossMarker {
    pub fn id(&self) -> &'static str {
        self.kind.id()
    }
}

/// Where the prototype-loss gradient starts (and its marker sits).
fn prototype_loss_anchor(layout: &Layout) -> Point {
    let emb = layout.embedding();
    Point::new(emb.x - 20.0, emb.y - 10.0)
}

pub fn loss_markers(layout: &Layout) -> Vec<LossMarker> {
    let backbone = layout.backbone();
    let head = layout.head();

    vec![
        LossMarker {
            kind: LossKind::Hard,
            center: backbone.bottom_mid().offset(0.0, 25.0),
            label: LossKind::Hard.symbol(),
            stem: Some(Segment::new(
                backbone.bottom_mid().offset(0.0, 12.0),
                head.bottom_at(0.3).offset(0.0, 20.0),
            )),
        },
        LossMarker {
            kind: LossKind::SoftMain,
            center: head.right_mid().offset(90.0, 0.0),
            label: LossKind::SoftMain.symbol(),
            stem: Some(Segment::new(
                head.right_mid().offset(60.0, 0.0),
                head.right_mid().offset(110.0, 0.0),
            )),
        },
        LossMarker {
            kind: LossKind::SoftPrototype,
            center: prototype_loss_anchor(layout),
            label: LossKind::SoftPrototype.symbol(),
            // Tracks the store, so it lives in the edge layer instead.
            stem: None,
        },
    ]
}

pub fn forward_edge_id(prototype_id: &str) -> String {
    format!("{prototype_id}_fwd")
}

/// Full edge set for the current store: one forward edge per prototype followed by
/// the [`FIXED_EDGE_COUNT`] fixed connectors.
pub fn synthesize_edges(layout: &Layout, store: &PrototypeStore, thumbnail_size: f64) -> Vec<Edge> {
    let emb = layout.embedding();
    let hyper = layout.hypernetwork();
    let backbone = layout.backbone();
    let head = layout.head();
    let half = thumbnail_size * 0.5;

    let mut edges = Vec::with_capacity(store.len() + FIXED_EDGE_COUNT);

    for p in store {
        edges.push(Edge::new(
            forward_edge_id(&p.id),
            EdgeCategory::Forward,
            p.position.offset(half, half),
            emb.left_mid(),
        ));
    }

    edges.push(Edge::new(
        "emb2backbone",
        EdgeCategory::Forward,
        emb.right_mid(),
        backbone.left_mid(),
    ));
    edges.push(Edge::new(
        "backbone2head",
        EdgeCategory::Forward,
        backbone.right_mid(),
        head.left_mid(),
    ));
    edges.push(Edge::new(
        "emb2hyper",
        EdgeCategory::Weight,
        emb.top_mid(),
        hyper.bottom_mid(),
    ));
    edges.push(Edge::new(
        "hyper2head",
        EdgeCategory::Weight,
        hyper.right_mid(),
        head.top_at(0.1),
    ));

    let target = match store.first() {
        Some(p) => p.position,
        None => Point::new(emb.x, emb.y),
    };
    edges.push(
        Edge::new(
            format!("{}_grad", LossKind::SoftPrototype.id()),
            EdgeCategory::Gradient,
            prototype_loss_anchor(layout),
            target,
        )
        .dashed(),
    );

    edges
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::TaskItem;
    use crate::prototype::Prototype;

    fn store_with(n: usize) -> PrototypeStore {
        let mut store = PrototypeStore::new();
        let item = TaskItem::new("x", "");
        store.extend((0..n).map(|i| {
            Prototype::new(i / 2, i % 2, &item, Point::new(10.0 * i as f64, 20.0))
        }));
        store
    }

    #[test]
    fn edge_count_is_prototypes_plus_fixed() {
        let layout = Layout::default();
        for n in [0, 1, 2, 7, 8, 31] {
            let edges = synthesize_edges(&layout, &store_with(n), 45.0);
            assert_eq!(edges.len(), n + FIXED_EDGE_COUNT);
        }
    }

    #[test]
    fn ids_are_unique_and_stable() {
        let layout = Layout::default();
        let a = synthesize_edges(&layout, &store_with(4), 45.0);
        let b = synthesize_edges(&layout, &store_with(4), 45.0);
        let ids_a: Vec<&str> = a.iter().map(|e| e.id.as_str()).collect();
        let ids_b: Vec<&str> = b.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids_a, ids_b);

        let mut dedup = ids_a.clone();
        dedup.sort_unstable();
        dedup.dedup();
        assert_eq!(dedup.len(), ids_a.len());
        assert!(ids_a.contains(&"task1_p1_fwd"));
        assert!(ids_a.contains(&"emb2backbone"));
    }

    #[test]
    fn forward_edges_run_from_thumbnail_center_to_embedding() {
        let layout = Layout::default();
        let edges = synthesize_edges(&layout, &store_with(1), 45.0);
        let e = &edges[0];
        assert_eq!(e.id, "task0_p0_fwd");
        assert_eq!(e.category, EdgeCategory::Forward);
        assert_eq!(e.segment.source(), Point::new(22.5, 42.5));
        assert_eq!(e.segment.target(), layout.embedding().left_mid());
    }

    #[test]
    fn prototype_gradient_tracks_first_prototype_or_falls_back() {
        let layout = Layout::default();
        let grad = |store: &PrototypeStore| {
            synthesize_edges(&layout, store, 45.0)
                .into_iter()
                .find(|e| e.id == "soft-loss-prototype_grad")
                .map(|e| e.segment.target())
        };

        assert_eq!(grad(&PrototypeStore::new()), Some(Point::new(180.0, 140.0)));
        assert_eq!(grad(&store_with(3)), Some(Point::new(0.0, 20.0)));
    }

    #[test]
    fn three_markers_two_with_static_stems() {
        let markers = loss_markers(&Layout::default());
        let ids: Vec<&str> = markers.iter().map(LossMarker::id).collect();
        assert_eq!(ids, ["hard-loss", "soft-loss-main", "soft-loss-prototype"]);
        assert_eq!(markers.iter().filter(|m| m.stem.is_some()).count(), 2);
        assert_eq!(markers[0].center, Point::new(520.0, 485.0));
        assert_eq!(LossKind::from_id("soft-loss-main"), Some(LossKind::SoftMain));
    }

    #[test]
    fn collapsed_segment_sits_on_source() {
        let s = Segment::new(Point::new(1.0, 2.0), Point::new(5.0, 6.0));
        let c = s.collapsed();
        assert_eq!(c.source(), c.target());
        assert_eq!(c.lerp(&s, 1.0), s);
    }
}

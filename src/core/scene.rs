//! The retained visual tree: static regions plus three reconciled layers.

use tracing::debug;

use crate::config::TimingConfig;
use crate::edges::{loss_markers, synthesize_edges, Edge, LossMarker, Segment};
use crate::error::Result;
use crate::layout::{Layout, Point};
use crate::prototype::{FilterDescriptor, Prototype, PrototypeStore};
use crate::reconcile::{Interpolate, Layer, ReconcilePatch, SceneEntity};

/// Animated part of a prototype thumbnail.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProtoShape {
    pub position: Point,
    pub filter: Option<FilterDescriptor>,
}

impl Interpolate for ProtoShape {
    fn interpolate(&self, to: &Self, t: f64) -> Self {
        let filter = match (self.filter, to.filter) {
            (Some(a), Some(b)) => Some(a.lerp(b, t)),
            // Nothing to blend from: the new filter applies for the whole transition.
            (_, b) => b,
        };
        Self {
            position: self.position.lerp(to.position, t),
            filter,
        }
    }
}

impl SceneEntity for Prototype {
    type Shape = ProtoShape;

    fn key(&self) -> &str {
        &self.id
    }

    fn shape(&self) -> ProtoShape {
        ProtoShape {
            position: self.position,
            filter: self.filter,
        }
    }
}

impl SceneEntity for Edge {
    type Shape = Segment;

    fn key(&self) -> &str {
        &self.id
    }

    fn shape(&self) -> Segment {
        self.segment
    }

    /// Edges grow out of their source point.
    fn enter_shape(&self) -> Segment {
        self.segment.collapsed()
    }
}

impl SceneEntity for LossMarker {
    type Shape = Point;

    fn key(&self) -> &str {
        self.kind.id()
    }

    fn shape(&self) -> Point {
        self.center
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderReport {
    pub prototypes: ReconcilePatch,
    pub edges: ReconcilePatch,
    pub losses: ReconcilePatch,
}

#[derive(Debug, Clone)]
pub struct Scene {
    layout: Layout,
    thumbnail_size: f64,
    prototypes: Layer<Prototype>,
    edges: Layer<Edge>,
    losses: Layer<LossMarker>,
    clock_ms: f64,
    renders: u64,
}

impl Scene {
    pub fn new(layout: Layout, timing: TimingConfig, thumbnail_size: f64) -> Self {
        Self {
            layout,
            thumbnail_size,
            prototypes: Layer::new("prototypes", timing.prototypes),
            edges: Layer::new("edges", timing.edges),
            losses: Layer::new("losses", timing.losses),
            clock_ms: 0.0,
            renders: 0,
        }
    }

    /// Recomputes edges and loss markers from scratch and reconciles all three layers.
    pub fn render(&mut self, store: &PrototypeStore) -> Result<RenderReport> {
        let edges = synthesize_edges(&self.layout, store, self.thumbnail_size);
        let markers = loss_markers(&self.layout);

        let report = RenderReport {
            prototypes: self.prototypes.reconcile(store.as_slice())?,
            edges: self.edges.reconcile(&edges)?,
            losses: self.losses.reconcile(&markers)?,
        };
        self.renders += 1;

        debug!(
            render = self.renders,
            prototypes_entered = report.prototypes.entered.len(),
            prototypes_updated = report.prototypes.updated.len(),
            edges_entered = report.edges.entered.len(),
            edges_updated = report.edges.updated.len(),
            "scene reconciled"
        );
        Ok(report)
    }

    /// Advances all transitions; returns how many nodes finished exiting.
    pub fn tick(&mut self, dt_ms: f64) -> usize {
        self.clock_ms += dt_ms.max(0.0);
        self.prototypes.tick(dt_ms).len() + self.edges.tick(dt_ms).len() + self.losses.tick(dt_ms).len()
    }

    /// Ticks in `step_ms` increments until nothing is animating (bounded by `max_ms`).
    pub fn settle(&mut self, step_ms: f64, max_ms: f64) {
        let step_ms = if step_ms > 0.0 { step_ms } else { 16.0 };
        let mut spent = 0.0;
        while !self.is_settled() && spent < max_ms {
            self.tick(step_ms);
            spent += step_ms;
        }
    }

    pub fn is_settled(&self) -> bool {
        self.prototypes.is_settled() && self.edges.is_settled() && self.losses.is_settled()
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn thumbnail_size(&self) -> f64 {
        self.thumbnail_size
    }

    pub fn prototypes(&self) -> &Layer<Prototype> {
        &self.prototypes
    }

    pub fn edges(&self) -> &Layer<Edge> {
        &self.edges
    }

    pub fn losses(&self) -> &Layer<LossMarker> {
        &self.losses
    }

    pub fn clock_ms(&self) -> f64 {
        self.clock_ms
    }

    pub fn renders(&self) -> u64 {
        self.renders
    }

    pub fn clear(&mut self) {
        self.prototypes.clear();
        self.edges.clear();
        self.losses.clear();
        self.clock_ms = 0.0;
        self.renders = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::TaskItem;
    use crate::edges::FIXED_EDGE_COUNT;
    use crate::reconcile::NodePhase;

    fn store(n: usize) -> PrototypeStore {
        let mut s = PrototypeStore::new();
        let item = TaskItem::new("p", "");
        s.extend((0..n).map(|i| Prototype::new(0, i, &item, Point::new(40.0 * i as f64, 60.0))));
        s
    }

    #[test]
    fn empty_store_renders_fixed_parts() {
        let mut scene = Scene::new(Layout::default(), TimingConfig::default(), 45.0);
        let report = scene.render(&PrototypeStore::new()).unwrap();
        assert!(report.prototypes.entered.is_empty());
        assert_eq!(report.edges.entered.len(), FIXED_EDGE_COUNT);
        assert_eq!(report.losses.entered.len(), 3);
    }

    #[test]
    fn entering_edges_start_collapsed() {
        let mut scene = Scene::new(Layout::default(), TimingConfig::default(), 45.0);
        scene.render(&store(1)).unwrap();
        let node = scene.edges().get("task0_p0_fwd").unwrap();
        let s = node.shape();
        assert_eq!(s.source(), s.target());
        assert_eq!(node.opacity(), 0.0);

        scene.settle(16.0, 5_000.0);
        let node = scene.edges().get("task0_p0_fwd").unwrap();
        assert_eq!(node.shape().target(), scene.layout().embedding().left_mid());
        assert_eq!(node.opacity(), 1.0);
        assert!(scene.is_settled());
    }

    #[test]
    fn growing_store_updates_instead_of_replacing() {
        let mut scene = Scene::new(Layout::default(), TimingConfig::default(), 45.0);
        scene.render(&store(2)).unwrap();
        scene.settle(16.0, 5_000.0);

        let report = scene.render(&store(3)).unwrap();
        assert_eq!(report.prototypes.entered, ["task0_p2"]);
        assert_eq!(report.prototypes.updated.len(), 2);
        assert_eq!(report.edges.entered, ["task0_p2_fwd"]);
        assert_eq!(report.edges.updated.len(), 2 + FIXED_EDGE_COUNT);
        assert!(report.losses.entered.is_empty());
        assert_eq!(report.losses.updated.len(), 3);
        assert_eq!(scene.renders(), 2);
    }

    #[test]
    fn removed_prototype_exits() {
        let mut scene = Scene::new(Layout::default(), TimingConfig::default(), 45.0);
        scene.render(&store(2)).unwrap();
        scene.settle(16.0, 5_000.0);

        let report = scene.render(&store(1)).unwrap();
        assert_eq!(report.prototypes.exited, ["task0_p1"]);
        assert_eq!(
            scene.prototypes().get("task0_p1").map(|n| n.phase()),
            Some(NodePhase::Exiting)
        );
        scene.settle(16.0, 5_000.0);
        assert!(!scene.prototypes().contains("task0_p1"));
        assert!(!scene.edges().contains("task0_p1_fwd"));
    }

    #[test]
    fn filter_appears_without_blend_from_none() {
        let a = ProtoShape {
            position: Point::new(0.0, 0.0),
            filter: None,
        };
        let b = ProtoShape {
            position: Point::new(10.0, 0.0),
            filter: Some(FilterDescriptor::new(1.1, 20)),
        };
        let mid = a.interpolate(&b, 0.5);
        assert_eq!(mid.position, Point::new(5.0, 0.0));
        assert_eq!(mid.filter, b.filter);
    }
}

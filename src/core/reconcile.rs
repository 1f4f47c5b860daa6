//! Keyed enter/update/exit reconciliation against a retained visual tree.
//!
//! A [`Layer`] owns the rendered nodes of one entity category. Each render hands it
//! the full desired list; the layer diffs by key and starts timed transitions instead
//! of redrawing, so in-flight animations keep their continuity. [`Layer::tick`]
//! advances every transition by a frame delta.

use std::fmt::Debug;

use hashbrown::{HashMap, HashSet};

use crate::edges::Segment;
use crate::error::{Error, Result};
use crate::layout::Point;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub trait Interpolate: Clone + PartialEq + Debug {
    /// Value at `t` in `[0, 1]` on the way from `self` to `to`.
    fn interpolate(&self, to: &Self, t: f64) -> Self;
}

impl Interpolate for Point {
    fn interpolate(&self, to: &Self, t: f64) -> Self {
        self.lerp(*to, t)
    }
}

impl Interpolate for Segment {
    fn interpolate(&self, to: &Self, t: f64) -> Self {
        self.lerp(to, t)
    }
}

/// Something the scene draws, identified by a stable key.
pub trait SceneEntity: Clone + Debug {
    type Shape: Interpolate;

    fn key(&self) -> &str;

    /// Final geometry for this datum.
    fn shape(&self) -> Self::Shape;

    /// Geometry a newly entering node starts from.
    fn enter_shape(&self) -> Self::Shape {
        self.shape()
    }
}

/// Transition durations for one layer, in milliseconds. Zero means "apply at once".
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LayerTiming {
    pub enter_ms: f64,
    pub update_ms: f64,
    pub exit_ms: f64,
}

impl LayerTiming {
    pub const fn new(enter_ms: f64, update_ms: f64, exit_ms: f64) -> Self {
        Self {
            enter_ms,
            update_ms,
            exit_ms,
        }
    }

    pub const fn instant() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    pub fn validate(&self, layer: &str) -> std::result::Result<(), String> {
        let ok = |v: f64| v.is_finite() && v >= 0.0;
        if ok(self.enter_ms) && ok(self.update_ms) && ok(self.exit_ms) {
            Ok(())
        } else {
            Err(format!("{layer} timing: durations must be finite and >= 0"))
        }
    }
}

/// Cubic in-out, the usual default easing for chart transitions.
pub fn ease_cubic_in_out(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum NodePhase {
    Entering,
    Live,
    Exiting,
}

#[derive(Debug, Clone)]
struct Tween<S> {
    from: S,
    to: S,
    from_opacity: f64,
    to_opacity: f64,
    elapsed_ms: f64,
    duration_ms: f64,
}

impl<S: Interpolate> Tween<S> {
    fn progress(&self) -> f64 {
        if self.duration_ms <= 0.0 {
            1.0
        } else {
            (self.elapsed_ms / self.duration_ms).min(1.0)
        }
    }
}

/// A rendered element: the last datum bound to it and its current visual state.
#[derive(Debug, Clone)]
pub struct Node<E: SceneEntity> {
    datum: E,
    shape: E::Shape,
    opacity: f64,
    phase: NodePhase,
    tween: Option<Tween<E::Shape>>,
}

impl<E: SceneEntity> Node<E> {
    pub fn datum(&self) -> &E {
        &self.datum
    }

    /// Geometry as currently drawn (mid-transition values included).
    pub fn shape(&self) -> &E::Shape {
        &self.shape
    }

    pub fn opacity(&self) -> f64 {
        self.opacity
    }

    pub fn phase(&self) -> NodePhase {
        self.phase
    }

    pub fn is_transitioning(&self) -> bool {
        self.tween.is_some()
    }

    /// Geometry this node is heading to.
    pub fn target_shape(&self) -> &E::Shape {
        self.tween.as_ref().map(|t| &t.to).unwrap_or(&self.shape)
    }

    /// Starts a transition from the current state. Replaces any transition in flight.
    fn retarget(&mut self, to: E::Shape, to_opacity: f64, duration_ms: f64) {
        if duration_ms <= 0.0 {
            self.shape = to;
            self.opacity = to_opacity;
            self.tween = None;
            return;
        }
        self.tween = Some(Tween {
            from: self.shape.clone(),
            to,
            from_opacity: self.opacity,
            to_opacity,
            elapsed_ms: 0.0,
            duration_ms,
        });
    }

    /// Returns true when the running transition finished on this step.
    fn advance(&mut self, dt_ms: f64) -> bool {
        let Some(tween) = self.tween.as_mut() else {
            return false;
        };
        tween.elapsed_ms += dt_ms;
        let t = tween.progress();
        let e = ease_cubic_in_out(t);
        self.shape = tween.from.interpolate(&tween.to, e);
        self.opacity = tween.from_opacity + (tween.to_opacity - tween.from_opacity) * e;

        if t >= 1.0 {
            self.shape = tween.to.clone();
            self.opacity = tween.to_opacity;
            self.tween = None;
            if self.phase == NodePhase::Entering {
                self.phase = NodePhase::Live;
            }
            return true;
        }
        false
    }
}

/// What one reconcile call did, by key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ReconcilePatch {
    pub entered: Vec<String>,
    pub updated: Vec<String>,
    pub exited: Vec<String>,
    /// Exits with a zero duration, dropped during the call.
    pub removed: Vec<String>,
}

impl ReconcilePatch {
    pub fn is_empty(&self) -> bool {
        self.entered.is_empty() && self.updated.is_empty() && self.exited.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct Layer<E: SceneEntity> {
    name: &'static str,
    timing: LayerTiming,
    nodes: HashMap<String, Node<E>>,
    /// Document order: first-entered first.
    order: Vec<String>,
}

impl<E: SceneEntity> Layer<E> {
    pub fn new(name: &'static str, timing: LayerTiming) -> Self {
        Self {
            name,
            timing,
            nodes: HashMap::new(),
            order: Vec::new(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn timing(&self) -> LayerTiming {
        self.timing
    }

    /// Diffs `desired` against the rendered nodes and starts the transitions.
    ///
    /// Fails without touching the layer if two desired entities share a key.
    pub fn reconcile(&mut self, desired: &[E]) -> Result<ReconcilePatch> {
        let mut seen: HashSet<&str> = HashSet::with_capacity(desired.len());
        for d in desired {
            if !seen.insert(d.key()) {
                return Err(Error::DuplicateKey {
                    layer: self.name,
                    key: d.key().to_string(),
                });
            }
        }

        let mut patch = ReconcilePatch::default();

        for d in desired {
            match self.nodes.get_mut(d.key()) {
                Some(node) => {
                    let target = d.shape();
                    let settled = node.phase != NodePhase::Exiting
                        && node.tween.is_none()
                        && node.shape == target
                        && node.opacity >= 1.0;
                    // Same destination already in flight: keep its progress.
                    let in_flight = node.phase != NodePhase::Exiting
                        && node
                            .tween
                            .as_ref()
                            .is_some_and(|t| t.to == target && t.to_opacity >= 1.0);

                    node.datum = d.clone();
                    if !settled && !in_flight {
                        node.retarget(target, 1.0, self.timing.update_ms);
                    }
                    if node.phase == NodePhase::Exiting {
                        node.phase = NodePhase::Live;
                    }
                    patch.updated.push(d.key().to_string());
                }
                None => {
                    let mut node = Node {
                        datum: d.clone(),
                        shape: d.enter_shape(),
                        opacity: 0.0,
                        phase: NodePhase::Entering,
                        tween: None,
                    };
                    node.retarget(d.shape(), 1.0, self.timing.enter_ms);
                    if node.tween.is_none() {
                        node.phase = NodePhase::Live;
                    }
                    self.nodes.insert(d.key().to_string(), node);
                    self.order.push(d.key().to_string());
                    patch.entered.push(d.key().to_string());
                }
            }
        }

        for key in &self.order {
            if seen.contains(key.as_str()) {
                continue;
            }
            let Some(node) = self.nodes.get_mut(key) else {
                continue;
            };
            if node.phase == NodePhase::Exiting {
                continue;
            }
            node.phase = NodePhase::Exiting;
            let shape = node.shape.clone();
            node.retarget(shape, 0.0, self.timing.exit_ms);
            patch.exited.push(key.clone());
            if node.tween.is_none() {
                patch.removed.push(key.clone());
            }
        }

        for key in &patch.removed {
            self.nodes.remove(key);
        }
        if !patch.removed.is_empty() {
            self.order.retain(|k| self.nodes.contains_key(k));
        }

        Ok(patch)
    }

    /// Advances every transition by `dt_ms`; returns keys of nodes whose exit completed
    /// (they are no longer in the layer).
    pub fn tick(&mut self, dt_ms: f64) -> Vec<String> {
        let dt_ms = dt_ms.max(0.0);
        let mut removed = Vec::new();
        for key in &self.order {
            let Some(node) = self.nodes.get_mut(key) else {
                continue;
            };
            if node.advance(dt_ms) && node.phase == NodePhase::Exiting {
                removed.push(key.clone());
            }
        }
        if !removed.is_empty() {
            for key in &removed {
                self.nodes.remove(key);
            }
            self.order.retain(|k| self.nodes.contains_key(k));
        }
        removed
    }

    pub fn get(&self, key: &str) -> Option<&Node<E>> {
        self.nodes.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.nodes.contains_key(key)
    }

    /// Nodes in document order, exiting ones included.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Node<E>)> + '_ {
        self.order
            .iter()
            .filter_map(move |k| self.nodes.get(k).map(|n| (k.as_str(), n)))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.order.iter().map(String::as_str)
    }

    /// Rendered nodes, exiting ones included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes that are not on their way out.
    pub fn live_len(&self) -> usize {
        self.nodes
            .values()
            .filter(|n| n.phase != NodePhase::Exiting)
            .count()
    }

    /// No transition is running.
    pub fn is_settled(&self) -> bool {
        self.nodes.values().all(|n| n.tween.is_none())
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.order.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Dot {
        id: &'static str,
        at: Point,
    }

    impl SceneEntity for Dot {
        type Shape = Point;

        fn key(&self) -> &str {
            self.id
        }

        fn shape(&self) -> Point {
            self.at
        }

        fn enter_shape(&self) -> Point {
            Point::new(0.0, 0.0)
        }
    }

    fn dot(id: &'static str, x: f64) -> Dot {
        Dot {
            id,
            at: Point::new(x, x),
        }
    }

    fn layer() -> Layer<Dot> {
        Layer::new("dots", LayerTiming::new(100.0, 100.0, 50.0))
    }

    #[test]
    fn easing_endpoints_and_midpoint() {
        assert_eq!(ease_cubic_in_out(0.0), 0.0);
        assert_eq!(ease_cubic_in_out(0.5), 0.5);
        assert_eq!(ease_cubic_in_out(1.0), 1.0);
        assert_eq!(ease_cubic_in_out(2.0), 1.0);
    }

    #[test]
    fn enter_starts_transparent_at_enter_shape() {
        let mut l = layer();
        let patch = l.reconcile(&[dot("a", 10.0)]).unwrap();
        assert_eq!(patch.entered, ["a"]);

        let n = l.get("a").unwrap();
        assert_eq!(n.phase(), NodePhase::Entering);
        assert_eq!(n.opacity(), 0.0);
        assert_eq!(*n.shape(), Point::new(0.0, 0.0));
        assert_eq!(*n.target_shape(), Point::new(10.0, 10.0));

        l.tick(50.0);
        let n = l.get("a").unwrap();
        assert_eq!(n.opacity(), 0.5);
        assert_eq!(*n.shape(), Point::new(5.0, 5.0));

        l.tick(50.0);
        let n = l.get("a").unwrap();
        assert_eq!(n.phase(), NodePhase::Live);
        assert_eq!(n.opacity(), 1.0);
        assert_eq!(*n.shape(), Point::new(10.0, 10.0));
        assert!(l.is_settled());
    }

    #[test]
    fn update_transitions_from_current_state() {
        let mut l = layer();
        l.reconcile(&[dot("a", 10.0)]).unwrap();
        l.tick(100.0);

        let patch = l.reconcile(&[dot("a", 30.0)]).unwrap();
        assert_eq!(patch.updated, ["a"]);
        assert!(patch.entered.is_empty());

        l.tick(50.0);
        assert_eq!(*l.get("a").unwrap().shape(), Point::new(20.0, 20.0));
        l.tick(50.0);
        assert_eq!(*l.get("a").unwrap().shape(), Point::new(30.0, 30.0));
    }

    #[test]
    fn newer_target_supersedes_in_flight_transition() {
        let mut l = layer();
        l.reconcile(&[dot("a", 10.0)]).unwrap();
        l.tick(100.0);
        l.reconcile(&[dot("a", 30.0)]).unwrap();
        l.tick(50.0); // halfway: (20, 20)

        l.reconcile(&[dot("a", 0.0)]).unwrap();
        let n = l.get("a").unwrap();
        assert_eq!(*n.shape(), Point::new(20.0, 20.0));
        assert_eq!(*n.target_shape(), Point::new(0.0, 0.0));

        l.tick(100.0);
        assert_eq!(*l.get("a").unwrap().shape(), Point::new(0.0, 0.0));
    }

    #[test]
    fn unchanged_datum_keeps_running_transition() {
        let mut l = layer();
        l.reconcile(&[dot("a", 10.0)]).unwrap();
        l.tick(50.0);
        let patch = l.reconcile(&[dot("a", 10.0)]).unwrap();
        assert_eq!(patch.updated, ["a"]);
        l.tick(50.0);
        assert!(l.is_settled());
        assert_eq!(l.get("a").unwrap().opacity(), 1.0);
    }

    #[test]
    fn exit_fades_then_removes() {
        let mut l = layer();
        l.reconcile(&[dot("a", 1.0), dot("b", 2.0)]).unwrap();
        l.tick(100.0);

        let patch = l.reconcile(&[dot("b", 2.0)]).unwrap();
        assert_eq!(patch.exited, ["a"]);
        assert!(patch.removed.is_empty());
        assert_eq!(l.len(), 2);
        assert_eq!(l.live_len(), 1);
        assert_eq!(l.get("a").unwrap().phase(), NodePhase::Exiting);

        // A second render does not re-report the same exit.
        assert!(l.reconcile(&[dot("b", 2.0)]).unwrap().exited.is_empty());

        assert!(l.tick(25.0).is_empty());
        assert_eq!(l.get("a").unwrap().opacity(), 0.5);
        assert_eq!(l.tick(25.0), ["a"]);
        assert!(!l.contains("a"));
        assert_eq!(l.keys().collect::<Vec<_>>(), ["b"]);
    }

    #[test]
    fn zero_exit_duration_removes_immediately() {
        let mut l: Layer<Dot> = Layer::new("dots", LayerTiming::new(100.0, 100.0, 0.0));
        l.reconcile(&[dot("a", 1.0)]).unwrap();
        let patch = l.reconcile(&[]).unwrap();
        assert_eq!(patch.exited, ["a"]);
        assert_eq!(patch.removed, ["a"]);
        assert!(l.is_empty());
    }

    #[test]
    fn exiting_node_is_revived_by_update() {
        let mut l = layer();
        l.reconcile(&[dot("a", 4.0)]).unwrap();
        l.tick(100.0);
        l.reconcile(&[]).unwrap();
        l.tick(25.0);

        let patch = l.reconcile(&[dot("a", 4.0)]).unwrap();
        assert_eq!(patch.updated, ["a"]);
        assert!(patch.entered.is_empty());
        let n = l.get("a").unwrap();
        assert_eq!(n.phase(), NodePhase::Live);

        l.tick(100.0);
        assert_eq!(l.get("a").unwrap().opacity(), 1.0);
    }

    #[test]
    fn duplicate_keys_are_rejected_without_side_effects() {
        let mut l = layer();
        l.reconcile(&[dot("a", 1.0)]).unwrap();
        let err = l.reconcile(&[dot("b", 1.0), dot("b", 2.0)]).unwrap_err();
        assert!(matches!(err, Error::DuplicateKey { layer: "dots", .. }));
        assert_eq!(l.keys().collect::<Vec<_>>(), ["a"]);
        assert_eq!(l.live_len(), 1);
    }

    #[test]
    fn instant_timing_applies_at_once() {
        let mut l: Layer<Dot> = Layer::new("dots", LayerTiming::instant());
        l.reconcile(&[dot("a", 3.0)]).unwrap();
        let n = l.get("a").unwrap();
        assert_eq!(n.phase(), NodePhase::Live);
        assert_eq!(n.opacity(), 1.0);
        assert_eq!(*n.shape(), Point::new(3.0, 3.0));
        assert!(l.is_settled());
    }

    #[test]
    fn document_order_follows_first_entry() {
        let mut l = layer();
        l.reconcile(&[dot("b", 1.0), dot("a", 1.0)]).unwrap();
        l.reconcile(&[dot("c", 1.0), dot("a", 1.0), dot("b", 1.0)]).unwrap();
        assert_eq!(l.keys().collect::<Vec<_>>(), ["b", "a", "c"]);
    }
}

use crate::edges::EdgeCategory;
use crate::layout::Point;
use crate::reconcile::NodePhase;
use crate::session::Session;

#[cfg(feature = "serde")]
use serde::Serialize;

/// A read-only snapshot of what the session shows.
///
/// Design intent:
/// - Observers cannot mutate or steer the session.
/// - Snapshotting is on-demand and allocates; rendering is unaffected.
/// - Geometry is the *current* drawn state, so mid-transition values show up as such.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct SessionSnapshot {
    pub dataset: String,
    pub task_index: usize,
    pub total_tasks: usize,
    pub exhausted: bool,
    pub strategy: &'static str,
    pub status: String,
    pub info: String,

    pub prototype_count: usize,
    pub edge_count: usize,
    pub settled: bool,
    pub clock_ms: f64,

    pub prototypes: Vec<PrototypeView>,
    pub edges: Vec<EdgeView>,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct PrototypeView {
    pub id: String,
    pub label: String,
    pub position: Point,
    pub filter: String,
    pub opacity: f64,
    pub phase: NodePhase,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct EdgeView {
    pub id: String,
    pub category: EdgeCategory,
    pub from: Point,
    pub to: Point,
    pub opacity: f64,
}

pub struct SessionAdapter<'a> {
    session: &'a Session,
}

impl<'a> SessionAdapter<'a> {
    pub fn new(session: &'a Session) -> Self {
        Self { session }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let s = self.session;
        let scene = s.scene();

        let prototypes = scene
            .prototypes()
            .iter()
            .map(|(id, node)| PrototypeView {
                id: id.to_string(),
                label: node.datum().label.clone(),
                position: node.shape().position,
                filter: node.shape().filter.map(|f| f.to_string()).unwrap_or_default(),
                opacity: node.opacity(),
                phase: node.phase(),
            })
            .collect();

        let edges = scene
            .edges()
            .iter()
            .map(|(id, node)| EdgeView {
                id: id.to_string(),
                category: node.datum().category,
                from: node.shape().source(),
                to: node.shape().target(),
                opacity: node.opacity(),
            })
            .collect();

        SessionSnapshot {
            dataset: s.dataset().name.clone(),
            task_index: s.task_index(),
            total_tasks: s.dataset().len(),
            exhausted: s.is_exhausted(),
            strategy: s.strategy_name(),
            status: s.status().to_string(),
            info: s.info().to_string(),

            prototype_count: s.store().len(),
            edge_count: scene.edges().live_len(),
            settled: scene.is_settled(),
            clock_ms: scene.clock_ms(),

            prototypes,
            edges,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SessionConfig;
    use crate::dataset::TaskDataset;
    use crate::session::SceneHandler;

    #[test]
    fn snapshot_reflects_session() {
        let mut session =
            Session::new(SessionConfig::default().with_seed(8), TaskDataset::builtin_cifar())
                .unwrap();
        session.on_advance().unwrap();
        session.on_entity_click("soft-loss-main").unwrap();

        let snap = SessionAdapter::new(&session).snapshot();
        assert_eq!(snap.task_index, 1);
        assert_eq!(snap.total_tasks, 4);
        assert!(!snap.exhausted);
        assert_eq!(snap.prototype_count, 2);
        assert_eq!(snap.edge_count, 7);
        assert_eq!(snap.prototypes.len(), 2);
        assert!(!snap.settled);
        assert!(snap.info.starts_with("soft-loss-main:"));
        assert_eq!(snap.strategy, "jittered");
        assert!(snap.prototypes.iter().all(|p| p.phase == NodePhase::Entering));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn snapshot_serializes() {
        let session =
            Session::new(SessionConfig::default().with_seed(8), TaskDataset::builtin_cifar())
                .unwrap();
        let json = serde_json::to_value(SessionAdapter::new(&session).snapshot()).unwrap();
        assert_eq!(json["task_index"], 0);
        assert_eq!(json["edges"].as_array().map(Vec::len), Some(5));
        assert_eq!(json["edges"][0]["category"], "forward");
    }
}

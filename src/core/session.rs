//! One explanatory-diagram session: store, task cursor, scene and display text.
//!
//! Everything that used to be page-global lives on [`Session`]; the embedding UI
//! only calls the [`SceneHandler`] methods and reads back the text and scene.

use tracing::{info, warn};

use crate::augment::Augmenter;
use crate::config::SessionConfig;
use crate::dataset::TaskDataset;
use crate::edges::LossKind;
use crate::error::{Error, Result};
use crate::interaction::{click_text, hover_text, EntityRef};
use crate::layout::{Layout, RegionKind};
use crate::positioning::{PositioningStrategy, Slot};
use crate::prng::Prng;
use crate::prototype::{Prototype, PrototypeStore};
use crate::scene::{RenderReport, Scene};

pub const READY_MESSAGE: &str = "Press \"Train Next Task\" to add the first prototypes.";
pub const EXHAUSTED_MESSAGE: &str = "All tasks completed. No more prototypes to add!";

/// Command surface a UI binds its controls to.
pub trait SceneHandler {
    /// "Train next task".
    fn on_advance(&mut self) -> Result<AdvanceOutcome>;

    /// Sets and returns the info text for the hovered entity.
    fn on_entity_hover(&mut self, id: &str) -> Result<&str>;

    /// Sets and returns the info text for the clicked entity.
    fn on_entity_click(&mut self, id: &str) -> Result<&str>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdvanceOutcome {
    /// `task` is the zero-based index that was just consumed.
    Advanced { task: usize, added: usize },
    /// Nothing left to add; nothing changed.
    Exhausted,
}

pub struct Session {
    config: SessionConfig,
    dataset: TaskDataset,
    store: PrototypeStore,
    task_index: usize,
    strategy: Box<dyn PositioningStrategy + Send + Sync>,
    augmenter: Augmenter,
    rng: Prng,
    scene: Scene,
    last_render: RenderReport,
    status: String,
    info: String,
}

impl Session {
    pub fn new(config: SessionConfig, dataset: TaskDataset) -> Result<Self> {
        Self::with_layout(config, dataset, Layout::default())
    }

    pub fn with_layout(config: SessionConfig, dataset: TaskDataset, layout: Layout) -> Result<Self> {
        config.validate()?;

        let scene = Scene::new(layout, config.timing, config.thumbnail_size);
        let mut session = Self {
            strategy: config.strategy.build(),
            augmenter: config.augment,
            rng: Prng::new(config.resolve_seed()),
            config,
            dataset,
            store: PrototypeStore::new(),
            task_index: 0,
            scene,
            last_render: RenderReport::default(),
            status: READY_MESSAGE.to_string(),
            info: String::new(),
        };
        // Regions, inter-region edges and loss markers are visible before any task.
        session.last_render = session.scene.render(&session.store)?;

        info!(
            dataset = %session.dataset.name,
            tasks = session.dataset.len(),
            strategy = session.strategy.name(),
            "session created"
        );
        Ok(session)
    }

    /// Consumes the next task batch, if any.
    pub fn advance_task(&mut self) -> Result<AdvanceOutcome> {
        let task = self.task_index;
        let Some(batch) = self.dataset.tasks.get(task) else {
            warn!(task, "advance requested after the last task");
            self.status = EXHAUSTED_MESSAGE.to_string();
            return Ok(AdvanceOutcome::Exhausted);
        };

        let first_index = self.store.len();
        let count = first_index + batch.len();
        let fresh: Vec<Prototype> = batch
            .items
            .iter()
            .enumerate()
            .map(|(pos, item)| {
                let slot = Slot::new(first_index + pos, task, count);
                let anchor = self.strategy.place(slot, &mut self.rng);
                Prototype::new(task, pos, item, anchor)
            })
            .collect();
        let added = self.store.extend(fresh);

        if self.strategy.relayout_on_growth() {
            let total = self.store.len();
            for (index, p) in self.store.iter_mut().enumerate() {
                p.anchor = self
                    .strategy
                    .place(Slot::new(index, p.task_index, total), &mut self.rng);
            }
        }

        // Every prototype, old and new, gets a fresh look.
        self.augmenter.apply_all(self.store.iter_mut(), &mut self.rng);

        self.last_render = self.scene.render(&self.store)?;
        self.task_index += 1;
        self.status = format!(
            "Trained Task #{} → added new prototypes, augmented old ones.",
            self.task_index
        );

        info!(
            task = self.task_index,
            added,
            prototypes = self.store.len(),
            "task advanced"
        );
        Ok(AdvanceOutcome::Advanced { task, added })
    }

    /// Maps an id to a region, loss marker or live prototype.
    pub fn resolve(&self, id: &str) -> Result<EntityRef<'_>> {
        if let Some(kind) = RegionKind::from_name(id) {
            return Ok(EntityRef::Region(kind));
        }
        if let Some(kind) = LossKind::from_id(id) {
            return Ok(EntityRef::Loss(kind));
        }
        self.store
            .get(id)
            .map(EntityRef::Prototype)
            .ok_or_else(|| Error::UnknownEntity(id.to_string()))
    }

    fn set_info(&mut self, text: Result<String>) -> Result<&str> {
        match text {
            Ok(text) => {
                self.info = text;
                Ok(&self.info)
            }
            Err(e) => {
                warn!(error = %e, "interaction ignored");
                Err(e)
            }
        }
    }

    /// Back to task 0 with an empty store. The random stream restarts from the seed.
    pub fn reset(&mut self) -> Result<()> {
        self.store.clear();
        self.task_index = 0;
        self.rng = Prng::new(self.config.resolve_seed());
        self.scene.clear();
        self.last_render = self.scene.render(&self.store)?;
        self.status = READY_MESSAGE.to_string();
        self.info.clear();
        info!("session reset");
        Ok(())
    }

    pub fn tick(&mut self, dt_ms: f64) -> usize {
        self.scene.tick(dt_ms)
    }

    pub fn is_exhausted(&self) -> bool {
        self.task_index >= self.dataset.len()
    }

    pub fn task_index(&self) -> usize {
        self.task_index
    }

    pub fn dataset(&self) -> &TaskDataset {
        &self.dataset
    }

    pub fn store(&self) -> &PrototypeStore {
        &self.store
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    pub fn last_render(&self) -> &RenderReport {
        &self.last_render
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn info(&self) -> &str {
        &self.info
    }
}

impl SceneHandler for Session {
    fn on_advance(&mut self) -> Result<AdvanceOutcome> {
        self.advance_task()
    }

    fn on_entity_hover(&mut self, id: &str) -> Result<&str> {
        let text = self.resolve(id).map(hover_text);
        self.set_info(text)
    }

    fn on_entity_click(&mut self, id: &str) -> Result<&str> {
        let text = self.resolve(id).map(click_text);
        self.set_info(text)
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("dataset", &self.dataset.name)
            .field("task_index", &self.task_index)
            .field("prototypes", &self.store.len())
            .field("strategy", &self.strategy.name())
            .field("status", &self.status)
            .finish()
    }
}

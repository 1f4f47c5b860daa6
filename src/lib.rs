#[path = "core/augment.rs"]
pub mod augment;

#[path = "core/config.rs"]
pub mod config;

#[path = "core/dataset.rs"]
pub mod dataset;

#[path = "core/edges.rs"]
pub mod edges;

#[path = "core/error.rs"]
pub mod error;

#[path = "core/interaction.rs"]
pub mod interaction;

#[path = "core/layout.rs"]
pub mod layout;

#[path = "core/positioning.rs"]
pub mod positioning;

#[path = "core/prng.rs"]
pub mod prng;

#[path = "core/prototype.rs"]
pub mod prototype;

#[path = "core/reconcile.rs"]
pub mod reconcile;

#[path = "core/scene.rs"]
pub mod scene;

#[path = "core/session.rs"]
pub mod session;

#[path = "core/svg.rs"]
pub mod svg;

pub mod observer;

pub use config::SessionConfig;
pub use dataset::TaskDataset;
pub use error::{Error, Result};
pub use session::{AdvanceOutcome, SceneHandler, Session};

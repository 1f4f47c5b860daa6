//! Hover/click text for regions, prototypes and loss markers.
//!
//! Everything here is a static lookup; the session stores the resulting string.

use crate::edges::LossKind;
use crate::layout::RegionKind;
use crate::prototype::Prototype;

/// An interactive thing in the scene, resolved from its id.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EntityRef<'a> {
    Region(RegionKind),
    Loss(LossKind),
    Prototype(&'a Prototype),
}

impl EntityRef<'_> {
    pub fn category(&self) -> &'static str {
        match self {
            EntityRef::Region(_) => "region",
            EntityRef::Loss(_) => "loss",
            EntityRef::Prototype(_) => "prototype",
        }
    }
}

pub fn region_hover_text(kind: RegionKind) -> &'static str {
    match kind {
        RegionKind::Embedding => "Task embedding e",
        RegionKind::Hypernetwork => "HyperNet",
        RegionKind::Backbone => "Shared backbone",
        RegionKind::Head => "Task head",
    }
}

pub fn region_click_text(kind: RegionKind) -> &'static str {
    match kind {
        RegionKind::Embedding => {
            "Task Embedding e: a learned vector per task, built from the prototypes and fed to the HyperNet."
        }
        RegionKind::Hypernetwork => {
            "HyperNet: maps the task embedding to the weights of the task head."
        }
        RegionKind::Backbone => "Backbone: feature extractor shared by every task.",
        RegionKind::Head => {
            "Task Head: classifier whose weights are generated by the HyperNet for the active task."
        }
    }
}

pub fn loss_hover_text(kind: LossKind) -> &'static str {
    match kind {
        LossKind::Hard => "Lhm: hard loss (cross-entropy)",
        LossKind::SoftMain => "Lsm: soft loss (distillation)",
        LossKind::SoftPrototype => "Lsp: prototype distillation",
    }
}

pub fn loss_click_text(kind: LossKind) -> &'static str {
    match kind {
        LossKind::Hard => "Hard Loss (cross-entropy) on current task data; drives current-task accuracy.",
        LossKind::SoftMain => {
            "Soft Loss (distillation) from old model outputs (reduce forgetting)."
        }
        LossKind::SoftPrototype => {
            "Prototype distillation: keep prototypes consistent over tasks."
        }
    }
}

pub fn hover_text(entity: EntityRef<'_>) -> String {
    match entity {
        EntityRef::Region(kind) => region_hover_text(kind).to_string(),
        EntityRef::Loss(kind) => loss_hover_text(kind).to_string(),
        EntityRef::Prototype(p) => format!("{} ({})", p.label, p.id),
    }
}

pub fn click_text(entity: EntityRef<'_>) -> String {
    match entity {
        EntityRef::Region(kind) => region_click_text(kind).to_string(),
        EntityRef::Loss(kind) => format!("{}: {}", kind.id(), loss_click_text(kind)),
        EntityRef::Prototype(p) => {
            format!("Prototype: {} → Flatten → HyperNet → Task Head.", p.label)
        }
    }
}

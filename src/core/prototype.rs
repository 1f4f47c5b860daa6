use std::fmt;

use crate::dataset::TaskItem;
use crate::layout::Point;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Cosmetic image filter applied to a prototype thumbnail.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FilterDescriptor {
    /// Stored already rounded to two decimals.
    pub brightness: f64,
    pub hue_rotate_deg: u32,
}

impl FilterDescriptor {
    pub fn new(brightness: f64, hue_rotate_deg: u32) -> Self {
        Self {
            brightness: (brightness * 100.0).round() / 100.0,
            hue_rotate_deg,
        }
    }

    pub fn lerp(self, to: FilterDescriptor, t: f64) -> Self {
        let hue = self.hue_rotate_deg as f64
            + (to.hue_rotate_deg as f64 - self.hue_rotate_deg as f64) * t;
        Self::new(
            self.brightness + (to.brightness - self.brightness) * t,
            hue.round().max(0.0) as u32,
        )
    }
}

impl fmt::Display for FilterDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "brightness({:.2}) hue-rotate({}deg)",
            self.brightness, self.hue_rotate_deg
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Prototype {
    pub id: String,
    pub task_index: usize,
    pub label: String,
    pub image_ref: String,
    /// Where the positioning strategy put it.
    pub anchor: Point,
    /// Rendered position (anchor plus augmentation jitter), top-left of the thumbnail.
    pub position: Point,
    pub filter: Option<FilterDescriptor>,
}

impl Prototype {
    pub fn make_id(task_index: usize, position_in_batch: usize) -> String {
        format!("task{task_index}_p{position_in_batch}")
    }

    pub fn new(task_index: usize, position_in_batch: usize, item: &TaskItem, anchor: Point) -> Self {
        Self {
            id: Self::make_id(task_index, position_in_batch),
            task_index,
            label: item.label.clone(),
            image_ref: item.image_ref.clone(),
            anchor,
            position: anchor,
            filter: None,
        }
    }

    /// CSS-style filter string; empty before the first augmentation.
    pub fn filter_string(&self) -> String {
        self.filter.map(|f| f.to_string()).unwrap_or_default()
    }
}

/// Append-only, ordered prototype collection.
#[derive(Debug, Clone, Default)]
pub struct PrototypeStore {
    items: Vec<Prototype>,
}

impl PrototypeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn as_slice(&self) -> &[Prototype] {
        &self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Prototype> {
        self.items.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Prototype> {
        self.items.iter_mut()
    }

    pub fn first(&self) -> Option<&Prototype> {
        self.items.first()
    }

    pub fn get(&self, id: &str) -> Option<&Prototype> {
        self.items.iter().find(|p| p.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Appends `batch`, preserving prior order. Ids already present are skipped and
    /// the number actually appended is returned.
    pub fn extend(&mut self, batch: impl IntoIterator<Item = Prototype>) -> usize {
        let before = self.items.len();
        for p in batch {
            if self.contains(&p.id) {
                continue;
            }
            self.items.push(p);
        }
        self.items.len() - before
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

impl<'a> IntoIterator for &'a PrototypeStore {
    type Item = &'a Prototype;
    type IntoIter = std::slice::Iter<'a, Prototype>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TaskItem {
    pub label: String,
    /// Opaque reference to the thumbnail; resolved by whatever draws the scene.
    #[cfg_attr(feature = "serde", serde(default))]
    pub image_ref: String,
}

impl TaskItem {
    pub fn new(label: impl Into<String>, image_ref: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            image_ref: image_ref.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct TaskBatch {
    pub items: Vec<TaskItem>,
}

impl TaskBatch {
    pub fn new(items: Vec<TaskItem>) -> Self {
        Self { items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Static ordered list of task batches, indexed by task number.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TaskDataset {
    #[cfg_attr(feature = "serde", serde(default))]
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub tasks: Vec<TaskBatch>,
}

impl TaskDataset {
    pub fn new(name: impl Into<String>, tasks: Vec<TaskBatch>) -> Self {
        Self {
            name: name.into(),
            tasks,
        }
    }

    /// Four two-class tasks drawn from CIFAR-10 sample thumbnails.
    pub fn builtin_cifar() -> Self {
        let task = |items: [(&str, &str); 2]| {
            TaskBatch::new(
                items
                    .iter()
                    .map(|(label, img)| TaskItem::new(*label, format!("cifar10/{img}")))
                    .collect(),
            )
        };

        Self::new(
            "builtin_cifar",
            vec![
                task([("T1-Dog", "dog4"), ("T1-Cat", "cat1")]),
                task([("T2-Deer", "deer4"), ("T2-Bird", "bird4")]),
                task([("T3-Frog", "frog2"), ("T3-Car", "automobile1")]),
                task([("T4-Plane", "airplane4"), ("T4-Ship", "ship2")]),
            ],
        )
    }

    #[cfg(feature = "serde")]
    pub fn from_json_str(s: &str) -> crate::error::Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn batch(&self, task_index: usize) -> Option<&TaskBatch> {
        self.tasks.get(task_index)
    }

    pub fn total_items(&self) -> usize {
        self.tasks.iter().map(TaskBatch::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_has_four_pairs() {
        let ds = TaskDataset::builtin_cifar();
        assert_eq!(ds.len(), 4);
        assert!(ds.tasks.iter().all(|t| t.len() == 2));
        assert_eq!(ds.total_items(), 8);
        assert_eq!(ds.batch(0).map(|b| b.items[0].label.as_str()), Some("T1-Dog"));
        assert!(ds.batch(4).is_none());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn parses_json_dataset() {
        let json = r#"{
            "name": "tiny",
            "tasks": [
                [{"label": "A", "image_ref": "a.png"}],
                [{"label": "B"}, {"label": "C", "image_ref": "c.png"}]
            ]
        }"#;
        let ds = TaskDataset::from_json_str(json).unwrap();
        assert_eq!(ds.name, "tiny");
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.tasks[1].items[0].image_ref, "");
        assert_eq!(ds.total_items(), 3);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn rejects_malformed_json() {
        assert!(TaskDataset::from_json_str("{\"tasks\": 3}").is_err());
    }
}

//! Work item and task breakdown types.
//!
//! A [`WorkItem`] is one schedulable unit produced by the breakdown
//! collaborator. Items shorter than [`MIN_ITEM_MINUTES`] are not considered
//! substantial work and are dropped before scheduling.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Warning;

/// Minimum duration for a schedulable item, in minutes.
pub const MIN_ITEM_MINUTES: i64 = 30;

/// Duration assigned to an item whose estimate is missing or unusable.
pub const DEFAULT_ITEM_MINUTES: i64 = 60;

/// Priority of a work item.
///
/// Informational for the scheduler: placement is strictly input-order, but
/// the priority is carried into the created calendar event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }
}

/// One schedulable unit of work.
///
/// `dependencies` names other item titles this one builds on. The field is
/// carried through to the output but never consulted by the placer, which
/// keeps strict input order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkItem {
    pub title: String,
    pub description: String,
    /// Estimated duration in minutes. Wire name matches the breakdown
    /// collaborator's JSON contract.
    #[serde(rename = "estimated_duration")]
    pub duration_minutes: i64,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub dependencies: Vec<String>,
}

impl WorkItem {
    /// Build an item from untrusted JSON, repairing missing or malformed
    /// fields with defaults rather than rejecting the record.
    pub fn from_loose_json(value: &Value) -> Self {
        let title = value
            .get("title")
            .and_then(Value::as_str)
            .unwrap_or("Untitled task")
            .to_string();
        let description = value
            .get("description")
            .and_then(Value::as_str)
            .unwrap_or("No description provided")
            .to_string();
        let duration_minutes = value
            .get("estimated_duration")
            .and_then(Value::as_i64)
            .unwrap_or(DEFAULT_ITEM_MINUTES);
        let priority = value
            .get("priority")
            .cloned()
            .and_then(|v| serde_json::from_value(v).ok())
            .unwrap_or_default();
        let dependencies = value
            .get("dependencies")
            .and_then(Value::as_array)
            .map(|deps| {
                deps.iter()
                    .filter_map(Value::as_str)
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        Self {
            title,
            description,
            duration_minutes,
            priority,
            dependencies,
        }
    }

    /// Whether this item meets the minimum-duration floor.
    pub fn is_substantial(&self) -> bool {
        self.duration_minutes >= MIN_ITEM_MINUTES
    }
}

/// The breakdown of one free-form task into schedulable items.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskBreakdown {
    pub main_task: String,
    pub subtasks: Vec<WorkItem>,
    /// Sum of the subtask estimates, in minutes.
    #[serde(rename = "total_estimated_time")]
    pub total_estimated_minutes: i64,
    #[serde(default)]
    pub deadline: Option<DateTime<Utc>>,
}

impl TaskBreakdown {
    pub fn new(main_task: impl Into<String>, subtasks: Vec<WorkItem>) -> Self {
        let mut breakdown = Self {
            main_task: main_task.into(),
            subtasks,
            total_estimated_minutes: 0,
            deadline: None,
        };
        breakdown.recompute_total();
        breakdown
    }

    /// Recompute the total estimate from the current subtasks.
    pub fn recompute_total(&mut self) {
        self.total_estimated_minutes = self.subtasks.iter().map(|s| s.duration_minutes).sum();
    }

    /// Drop items below the minimum duration, returning one warning per
    /// dropped item. Recomputes the total.
    pub fn drop_short_items(&mut self) -> Vec<Warning> {
        let mut warnings = Vec::new();
        self.subtasks.retain(|item| {
            if item.is_substantial() {
                true
            } else {
                warnings.push(Warning::SkippedShortItem {
                    title: item.title.clone(),
                    minutes: item.duration_minutes,
                });
                false
            }
        });
        self.recompute_total();
        warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn item(title: &str, minutes: i64) -> WorkItem {
        WorkItem {
            title: title.to_string(),
            description: String::new(),
            duration_minutes: minutes,
            priority: Priority::Medium,
            dependencies: Vec::new(),
        }
    }

    #[test]
    fn work_item_serialization_round_trip() {
        let item = WorkItem {
            title: "Draft outline".to_string(),
            description: "Outline the report sections".to_string(),
            duration_minutes: 90,
            priority: Priority::High,
            dependencies: vec!["Collect sources".to_string()],
        };

        let json = serde_json::to_string(&item).unwrap();
        assert!(json.contains("\"estimated_duration\":90"));
        assert!(json.contains("\"priority\":\"high\""));
        let decoded: WorkItem = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded.duration_minutes, 90);
    }

    #[test]
    fn loose_json_repairs_missing_fields() {
        let value = json!({ "estimated_duration": 45 });
        let item = WorkItem::from_loose_json(&value);
        assert_eq!(item.title, "Untitled task");
        assert_eq!(item.description, "No description provided");
        assert_eq!(item.duration_minutes, 45);
        assert_eq!(item.priority, Priority::Medium);
        assert!(item.dependencies.is_empty());
    }

    #[test]
    fn loose_json_repairs_bad_priority_and_duration() {
        let value = json!({
            "title": "Review",
            "priority": "urgent",
            "estimated_duration": "soon",
            "dependencies": ["Draft", 7]
        });
        let item = WorkItem::from_loose_json(&value);
        assert_eq!(item.priority, Priority::Medium);
        assert_eq!(item.duration_minutes, DEFAULT_ITEM_MINUTES);
        assert_eq!(item.dependencies, vec!["Draft".to_string()]);
    }

    #[test]
    fn drop_short_items_filters_and_recomputes() {
        let mut breakdown = TaskBreakdown::new(
            "Write report",
            vec![item("Research", 60), item("Send email", 15), item("Draft", 90)],
        );
        assert_eq!(breakdown.total_estimated_minutes, 165);

        let warnings = breakdown.drop_short_items();
        assert_eq!(breakdown.subtasks.len(), 2);
        assert_eq!(breakdown.total_estimated_minutes, 150);
        assert_eq!(warnings.len(), 1);
        assert!(matches!(
            &warnings[0],
            Warning::SkippedShortItem { title, minutes: 15 } if title == "Send email"
        ));
    }
}

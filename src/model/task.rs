use serde::{Deserialize, Serialize};

/// Epoch-millisecond wall-clock timestamp.
pub type Timestamp = i64;

/// The sentinel list name for tasks not filed under any project.
pub const INBOX_LIST: &str = "Inbox";

/// Task priority, highest first so the derived ordering sorts High before Low.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    /// Parse a priority keyword (`high`, `medium`, `low`), case-insensitive.
    pub fn from_keyword(s: &str) -> Option<Priority> {
        match s.to_lowercase().as_str() {
            "high" => Some(Priority::High),
            "medium" => Some(Priority::Medium),
            "low" => Some(Priority::Low),
            _ => None,
        }
    }

    /// The lowercase keyword for this priority
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Low
    }
}

/// A single checklist item under a task. No further nesting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subtask {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub completed: bool,
}

/// A task record, the unit the whole engine operates on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Opaque unique ID; blank IDs are reassigned by the sanitizer
    #[serde(default)]
    pub id: String,
    /// Display title (non-empty after sanitization)
    pub title: String,
    /// Free-text body, may be empty
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub completed: bool,
    /// Present iff `completed`; kept in step by every mutation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<Timestamp>,
    #[serde(default)]
    pub priority: Priority,
    /// Calendar due date, no time component
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<chrono::NaiveDate>,
    /// Stored casing is preserved; matching elsewhere is case-insensitive
    #[serde(default)]
    pub tags: Vec<String>,
    /// Owning project name, `"Inbox"` when unfiled
    #[serde(default = "default_list")]
    pub list: String,
    #[serde(default)]
    pub subtasks: Vec<Subtask>,
    /// Creation instant, immutable after creation
    #[serde(default)]
    pub created_at: Timestamp,
}

fn default_list() -> String {
    INBOX_LIST.to_string()
}

impl Task {
    /// Create an empty incomplete task in the inbox.
    pub fn new(id: String, title: String, created_at: Timestamp) -> Self {
        Task {
            id,
            title,
            description: String::new(),
            completed: false,
            completed_at: None,
            priority: Priority::default(),
            due_date: None,
            tags: Vec::new(),
            list: default_list(),
            subtasks: Vec::new(),
            created_at,
        }
    }

    /// True when the task still needs doing.
    pub fn is_active(&self) -> bool {
        !self.completed
    }

    /// True when the task is filed in the given list, case-insensitive.
    pub fn in_list(&self, list: &str) -> bool {
        self.list.to_lowercase() == list.to_lowercase()
    }

    /// True when the task sits in the inbox (unfiled or blank list).
    pub fn in_inbox(&self) -> bool {
        self.list.is_empty() || self.in_list(INBOX_LIST)
    }

    /// Repair the completed/completed_at pairing.
    ///
    /// A completed task missing its timestamp gets `now`; an incomplete task
    /// carrying a stale timestamp loses it.
    pub fn normalize_completion(&mut self, now: Timestamp) {
        if self.completed {
            if self.completed_at.is_none() {
                self.completed_at = Some(now);
            }
        } else {
            self.completed_at = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_orders_high_first() {
        assert!(Priority::High < Priority::Medium);
        assert!(Priority::Medium < Priority::Low);
    }

    #[test]
    fn priority_keyword_round_trip() {
        assert_eq!(Priority::from_keyword("HIGH"), Some(Priority::High));
        assert_eq!(Priority::from_keyword("Medium"), Some(Priority::Medium));
        assert_eq!(Priority::from_keyword("low"), Some(Priority::Low));
        assert_eq!(Priority::from_keyword("urgent"), None);
        assert_eq!(Priority::High.as_str(), "high");
    }

    #[test]
    fn minimal_record_fills_defaults() {
        let task: Task = serde_json::from_str(r#"{"title": "Water plants"}"#).unwrap();
        assert_eq!(task.id, "");
        assert_eq!(task.title, "Water plants");
        assert!(!task.completed);
        assert_eq!(task.completed_at, None);
        assert_eq!(task.priority, Priority::Low);
        assert_eq!(task.due_date, None);
        assert!(task.tags.is_empty());
        assert_eq!(task.list, "Inbox");
        assert!(task.subtasks.is_empty());
        assert_eq!(task.created_at, 0);
    }

    #[test]
    fn due_date_serializes_as_iso() {
        let mut task = Task::new("t-001".to_string(), "Pay rent".to_string(), 1_000);
        task.due_date = chrono::NaiveDate::from_ymd_opt(2025, 3, 1);
        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["due_date"], "2025-03-01");
        assert_eq!(json["priority"], "low");
        // absent optionals stay off the wire
        assert!(json.get("completed_at").is_none());
    }

    #[test]
    fn normalize_fills_missing_completion_stamp() {
        let mut task = Task::new("t-001".to_string(), "a".to_string(), 0);
        task.completed = true;
        task.normalize_completion(42);
        assert_eq!(task.completed_at, Some(42));

        // an existing stamp is left alone
        task.normalize_completion(99);
        assert_eq!(task.completed_at, Some(42));
    }

    #[test]
    fn normalize_clears_stale_completion_stamp() {
        let mut task = Task::new("t-001".to_string(), "a".to_string(), 0);
        task.completed_at = Some(42);
        task.normalize_completion(99);
        assert_eq!(task.completed_at, None);
    }

    #[test]
    fn inbox_membership_is_case_insensitive() {
        let mut task = Task::new("t-001".to_string(), "a".to_string(), 0);
        assert!(task.in_inbox());
        task.list = "inbox".to_string();
        assert!(task.in_inbox());
        task.list = "Work".to_string();
        assert!(!task.in_inbox());
        assert!(task.in_list("work"));
    }
}

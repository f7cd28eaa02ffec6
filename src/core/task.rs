use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::repeat::Repeat;

/// A single to-do entry.
///
/// Serialized with the camelCase keys of the persisted document. Optional
/// fields are omitted when unset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub text: String,
    /// Opaque rich-markup string owned by the editor. Never parsed here.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub completed: bool,
    #[serde(default)]
    pub archived: bool,
    /// Epoch milliseconds.
    pub created_at: i64,
    /// Epoch milliseconds; present iff `completed`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reminder: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Repeat::is_none")]
    pub repeat: Repeat,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
}

impl Task {
    pub fn new(text: impl Into<String>, created_at: i64) -> Self {
        Self {
            id: new_id(),
            text: text.into(),
            description: None,
            completed: false,
            archived: false,
            created_at,
            completed_at: None,
            reminder: None,
            repeat: Repeat::None,
            category_id: None,
        }
    }

    /// Build a task from a draft. The draft's fields are taken wholesale.
    pub fn from_draft(draft: TaskDraft, created_at: i64) -> Self {
        let mut task = Self::new(String::new(), created_at);
        task.apply(draft);
        task
    }

    /// Replace every editable field with the draft's values.
    ///
    /// Identity, creation time, completion and archival are untouched.
    pub fn apply(&mut self, draft: TaskDraft) {
        self.text = draft.text;
        self.reminder = draft.reminder;
        self.category_id = draft.category_id;
        self.repeat = draft.repeat;
        self.description = draft.description;
    }

    /// Flip completion, keeping `completed_at` in lockstep.
    pub fn toggle(&mut self, now: i64) {
        if self.completed {
            self.completed = false;
            self.completed_at = None;
        } else {
            self.completed = true;
            self.completed_at = Some(now);
        }
    }

    /// The recurrence label only counts when a reminder is present.
    pub fn effective_repeat(&self) -> Repeat {
        if self.reminder.is_some() {
            self.repeat
        } else {
            Repeat::None
        }
    }

    pub fn has_category(&self, category_id: &str) -> bool {
        self.category_id.as_deref() == Some(category_id)
    }
}

/// The editable field set of a task, as supplied by add and update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskDraft {
    pub text: String,
    pub reminder: Option<DateTime<Utc>>,
    pub category_id: Option<String>,
    pub repeat: Repeat,
    pub description: Option<String>,
}

impl TaskDraft {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn reminder(mut self, reminder: DateTime<Utc>) -> Self {
        self.reminder = Some(reminder);
        self
    }

    pub fn category(mut self, category_id: impl Into<String>) -> Self {
        self.category_id = Some(category_id.into());
        self
    }

    pub fn repeat(mut self, repeat: Repeat) -> Self {
        self.repeat = repeat;
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

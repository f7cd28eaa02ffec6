use chrono::{DateTime, Local};

use crate::core::category::{CategoryItem, detect_category_tag};
use crate::core::task::{Task, TaskDraft};
use crate::storage::migrate::{self, CURRENT_VERSION, Outcome};
use crate::storage::{Backing, Document, PersistedState};
use crate::view::{View, ViewMode, derive_view};

/// Owns the live tasks and categories and writes them back after every
/// mutation.
///
/// Mutators never fail: unknown ids are no-ops and persistence errors are
/// logged, leaving the in-memory state authoritative.
pub struct TaskStore<B: Backing> {
    backing: B,
    version: u32,
    tasks: Vec<Task>,
    categories: Vec<CategoryItem>,
    outcome: Outcome,
}

impl<B: Backing> TaskStore<B> {
    /// Load and migrate whatever the backing holds.
    pub fn open(backing: B) -> Self {
        let raw = match backing.load() {
            Ok(raw) => raw,
            Err(e) => {
                log::error!("Failed to read stored document: {}", e);
                Some(serde_json::Value::Null)
            }
        };
        let loaded = migrate::load(raw);
        let needs_save = loaded.needs_save();
        let Document { version, state } = loaded.document;

        let mut store = Self {
            backing,
            version,
            tasks: state.saved_texts,
            categories: state.categories,
            outcome: loaded.outcome,
        };
        log::info!(
            "Loaded {} tasks and {} categories ({:?})",
            store.tasks.len(),
            store.categories.len(),
            store.outcome
        );
        if needs_save {
            store.persist();
        }
        store
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn categories(&self) -> &[CategoryItem] {
        &self.categories
    }

    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn category(&self, id: &str) -> Option<&CategoryItem> {
        self.categories.iter().find(|c| c.id == id)
    }

    /// How the stored document was loaded.
    pub fn load_outcome(&self) -> Outcome {
        self.outcome
    }

    pub fn backing(&self) -> &B {
        &self.backing
    }

    pub fn view(&self, mode: ViewMode, now: &DateTime<Local>) -> View<'_> {
        derive_view(&self.tasks, &self.categories, mode, now)
    }

    /// Append a new task and return its id.
    ///
    /// Without an explicit category, a `#name` hashtag matching an existing
    /// category assigns it and is stripped from the text.
    pub fn add_task(&mut self, mut draft: TaskDraft) -> String {
        if draft.category_id.is_none() {
            if let Some((text, category_id)) = detect_category_tag(&draft.text, &self.categories) {
                draft.text = text;
                draft.category_id = Some(category_id);
            }
        }
        let task = Task::from_draft(draft, crate::now_millis());
        let id = task.id.clone();
        log::debug!("Adding task {}", id);
        self.tasks.push(task);
        self.persist();
        id
    }

    pub fn delete_task(&mut self, id: &str) {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        if self.tasks.len() != before {
            self.persist();
        }
    }

    pub fn toggle_complete(&mut self, id: &str) {
        let now = crate::now_millis();
        self.mutate_task(id, |task| task.toggle(now));
    }

    pub fn archive_task(&mut self, id: &str) {
        self.mutate_task(id, |task| task.archived = true);
    }

    pub fn unarchive_task(&mut self, id: &str) {
        self.mutate_task(id, |task| task.archived = false);
    }

    /// Replace the editable fields wholesale; unset draft fields clear.
    pub fn update_task(&mut self, id: &str, draft: TaskDraft) {
        self.mutate_task(id, |task| task.apply(draft));
    }

    pub fn add_category(&mut self, name: impl Into<String>, color: impl Into<String>) -> String {
        let category = CategoryItem::new(name, color);
        let id = category.id.clone();
        self.categories.push(category);
        self.persist();
        id
    }

    pub fn update_category(&mut self, id: &str, name: impl Into<String>, color: impl Into<String>) {
        let Some(category) = self.categories.iter_mut().find(|c| c.id == id) else {
            return;
        };
        category.name = name.into();
        category.color = color.into();
        self.persist();
    }

    /// Remove a category and clear it from every task referencing it.
    pub fn delete_category(&mut self, id: &str) {
        let before = self.categories.len();
        self.categories.retain(|c| c.id != id);
        if self.categories.len() == before {
            return;
        }

        let mut cleared = 0;
        for task in self.tasks.iter_mut().filter(|t| t.has_category(id)) {
            task.category_id = None;
            cleared += 1;
        }
        log::info!("Deleted category {}, cleared it from {} tasks", id, cleared);
        self.persist();
    }

    /// Move the category at `from` to position `to`. Out-of-range indices are ignored.
    pub fn reorder_categories(&mut self, from: usize, to: usize) {
        let len = self.categories.len();
        if from >= len || to >= len {
            log::debug!("Ignoring reorder {} -> {} on {} categories", from, to, len);
            return;
        }
        if from == to {
            return;
        }
        let category = self.categories.remove(from);
        self.categories.insert(to, category);
        self.persist();
    }

    fn mutate_task(&mut self, id: &str, f: impl FnOnce(&mut Task)) {
        let Some(task) = self.tasks.iter_mut().find(|t| t.id == id) else {
            return;
        };
        f(task);
        self.persist();
    }

    fn snapshot(&self) -> Document {
        Document {
            version: self.version.max(CURRENT_VERSION),
            state: PersistedState {
                saved_texts: self.tasks.clone(),
                categories: self.categories.clone(),
            },
        }
    }

    fn persist(&mut self) {
        let document = self.snapshot();
        if let Err(e) = self.backing.save(&document) {
            log::error!("Failed to save tasks: {}", e);
        }
    }
}

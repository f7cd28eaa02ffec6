//! Filter, sort and group tasks for each view mode.
//!
//! Everything here is pure: the same tasks, categories, mode and clock always
//! give the same result.

pub mod categories;
pub mod dates;

use chrono::{DateTime, Local};
use std::cmp::{Ordering, Reverse};
use std::fmt;

use crate::core::category::CategoryItem;
use crate::core::task::Task;

pub use categories::CategoryGroup;
pub use dates::DateGroups;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    Dates,
    Recent,
    Categories,
    Repeating,
    Archived,
}

impl ViewMode {
    pub const ALL: [ViewMode; 5] = [
        Self::Dates,
        Self::Recent,
        Self::Categories,
        Self::Repeating,
        Self::Archived,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dates => "dates",
            Self::Recent => "recent",
            Self::Categories => "categories",
            Self::Repeating => "repeating",
            Self::Archived => "archived",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s.trim()))
    }

    pub fn includes(&self, task: &Task) -> bool {
        match self {
            Self::Archived => task.archived,
            Self::Repeating => !task.archived && !task.repeat.is_none(),
            Self::Dates | Self::Recent | Self::Categories => !task.archived,
        }
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The derived presentation list for one mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View<'a> {
    Dates(DateGroups<'a>),
    Categories(Vec<CategoryGroup<'a>>),
    List(Vec<&'a Task>),
}

impl<'a> View<'a> {
    /// All tasks in presentation order, groups concatenated.
    pub fn tasks(&self) -> Vec<&'a Task> {
        match self {
            Self::Dates(groups) => groups.iter().flat_map(|(_, tasks)| tasks.iter().copied()).collect(),
            Self::Categories(groups) => groups.iter().flat_map(|g| g.tasks.iter().copied()).collect(),
            Self::List(tasks) => tasks.clone(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Dates(groups) => groups.iter().all(|(_, tasks)| tasks.is_empty()),
            Self::Categories(groups) => groups.iter().all(|g| g.tasks.is_empty()),
            Self::List(tasks) => tasks.is_empty(),
        }
    }
}

pub fn filter_tasks(tasks: &[Task], mode: ViewMode) -> Vec<&Task> {
    tasks.iter().filter(|t| mode.includes(t)).collect()
}

/// Stable sort of an already-filtered list for `mode`.
pub fn sort_tasks(tasks: &mut [&Task], categories: &[CategoryItem], mode: ViewMode) {
    match mode {
        ViewMode::Dates => tasks.sort_by(|a, b| compare_dates(a, b)),
        ViewMode::Categories => {
            tasks.sort_by_key(|t| (category_index(t, categories), t.completed, Reverse(t.created_at)))
        }
        ViewMode::Recent | ViewMode::Repeating | ViewMode::Archived => {
            tasks.sort_by_key(|t| (t.completed, Reverse(t.created_at)))
        }
    }
}

/// Filter, sort and group `tasks` for `mode` as of `now`.
pub fn derive_view<'a>(
    tasks: &'a [Task],
    categories: &'a [CategoryItem],
    mode: ViewMode,
    now: &DateTime<Local>,
) -> View<'a> {
    let mut selected = filter_tasks(tasks, mode);
    sort_tasks(&mut selected, categories, mode);

    match mode {
        ViewMode::Dates => View::Dates(DateGroups::build(&selected, now)),
        ViewMode::Categories => View::Categories(categories::group(&selected, categories)),
        ViewMode::Recent | ViewMode::Repeating | ViewMode::Archived => View::List(selected),
    }
}

/// Incomplete first; reminders ascending before undated tasks; completed
/// ties broken by most recent completion.
fn compare_dates(a: &Task, b: &Task) -> Ordering {
    a.completed
        .cmp(&b.completed)
        .then_with(|| match (a.reminder, b.reminder) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
        .then_with(|| {
            if a.completed && b.completed {
                b.completed_at.cmp(&a.completed_at)
            } else {
                Ordering::Equal
            }
        })
}

/// Position of the task's category; uncategorized and dangling sort last.
pub(crate) fn category_index(task: &Task, categories: &[CategoryItem]) -> usize {
    task.category_id
        .as_deref()
        .and_then(|id| categories.iter().position(|c| c.id == id))
        .unwrap_or(usize::MAX)
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use crate::core::repeat::Repeat;
    use chrono::{TimeZone, Utc};

    #[test]
    fn mode_parsing() {
        assert_eq!(ViewMode::parse("Dates"), Some(ViewMode::Dates));
        assert_eq!(ViewMode::parse("archived"), Some(ViewMode::Archived));
        assert_eq!(ViewMode::parse("someday"), None);
    }

    #[test]
    fn filters_by_mode() {
        let mut archived = task("archived", 1);
        archived.archived = true;
        let mut archived_repeat = repeating(task("archived-repeat", 2), Repeat::Daily);
        archived_repeat.archived = true;
        let tasks = vec![
            task("plain", 3),
            repeating(task("daily", 4), Repeat::Daily),
            archived,
            archived_repeat,
        ];

        assert_eq!(ids(filter_tasks(&tasks, ViewMode::Recent)), ["plain", "daily"]);
        assert_eq!(ids(filter_tasks(&tasks, ViewMode::Dates)), ["plain", "daily"]);
        assert_eq!(ids(filter_tasks(&tasks, ViewMode::Repeating)), ["daily"]);
        assert_eq!(
            ids(filter_tasks(&tasks, ViewMode::Archived)),
            ["archived", "archived-repeat"]
        );
    }

    #[test]
    fn recent_puts_incomplete_first_then_newest() {
        let tasks = vec![task("id1", 100), done(task("id2", 200), 250), task("id3", 300)];
        let view = derive_view(&tasks, &[], ViewMode::Recent, &Local::now());
        assert_eq!(ids(view.tasks()), ["id3", "id1", "id2"]);
    }

    #[test]
    fn archived_and_repeating_sort_like_recent() {
        let mut a = repeating(task("a", 1), Repeat::Weekly);
        let mut b = done(repeating(task("b", 2), Repeat::Weekly), 5);
        let c = repeating(task("c", 3), Repeat::Monthly);
        let tasks = vec![a.clone(), b.clone(), c];
        let view = derive_view(&tasks, &[], ViewMode::Repeating, &Local::now());
        assert_eq!(ids(view.tasks()), ["c", "a", "b"]);

        a.archived = true;
        b.archived = true;
        let tasks = vec![a, b];
        let view = derive_view(&tasks, &[], ViewMode::Archived, &Local::now());
        assert!(matches!(view, View::List(_)));
        assert_eq!(ids(view.tasks()), ["a", "b"]);
    }

    #[test]
    fn dates_sort_order() {
        let early = Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap();
        let late = Utc.with_ymd_and_hms(2026, 3, 4, 8, 0, 0).unwrap();
        let tasks = vec![
            task("undated", 1),
            due(task("late", 2), late),
            due(task("early", 3), early),
            done(task("done-old", 4), 10),
            done(task("done-new", 5), 20),
            done(due(task("done-dated", 6), early), 5),
        ];
        let mut selected = filter_tasks(&tasks, ViewMode::Dates);
        sort_tasks(&mut selected, &[], ViewMode::Dates);
        assert_eq!(
            ids(selected),
            ["early", "late", "undated", "done-dated", "done-new", "done-old"]
        );
    }

    #[test]
    fn categories_sort_order() {
        let categories = vec![category("b"), category("a")];
        let tasks = vec![
            task("none", 1),
            in_category(task("a-old", 2), "a"),
            done(in_category(task("b-done", 3), "b"), 9),
            in_category(task("b-new", 4), "b"),
            in_category(task("a-new", 5), "a"),
            in_category(task("dangling", 6), "gone"),
        ];
        let mut selected = filter_tasks(&tasks, ViewMode::Categories);
        sort_tasks(&mut selected, &categories, ViewMode::Categories);
        assert_eq!(
            ids(selected),
            ["b-new", "b-done", "a-new", "a-old", "dangling", "none"]
        );
    }

    #[test]
    fn derive_is_repeatable() {
        let tasks = vec![task("x", 1), task("y", 2)];
        let now = Local::now();
        let first = derive_view(&tasks, &[], ViewMode::Dates, &now);
        let second = derive_view(&tasks, &[], ViewMode::Dates, &now);
        assert_eq!(first, second);
        assert!(!first.is_empty());
        assert!(derive_view(&tasks, &[], ViewMode::Archived, &now).is_empty());
    }
}

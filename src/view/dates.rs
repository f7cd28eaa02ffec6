use chrono::{DateTime, Duration, Local, Utc};

use crate::core::reminder::start_of_day;
use crate::core::task::Task;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateBucket {
    Overdue,
    DueToday,
    DueSoon,
    NoDueDate,
}

impl DateBucket {
    pub const ALL: [DateBucket; 4] = [
        Self::Overdue,
        Self::DueToday,
        Self::DueSoon,
        Self::NoDueDate,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            Self::Overdue => "Overdue",
            Self::DueToday => "Due Today",
            Self::DueSoon => "Due Soon",
            Self::NoDueDate => "No Due Date",
        }
    }

    /// Bucket for a reminder relative to the start of today.
    pub fn classify(reminder: Option<&DateTime<Utc>>, day_start: &DateTime<Utc>) -> Self {
        let Some(reminder) = reminder else {
            return Self::NoDueDate;
        };
        if reminder < day_start {
            Self::Overdue
        } else if *reminder < *day_start + Duration::hours(24) {
            Self::DueToday
        } else {
            Self::DueSoon
        }
    }
}

/// Dates-mode grouping, computed against the start of the current day.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DateGroups<'a> {
    pub overdue: Vec<&'a Task>,
    pub due_today: Vec<&'a Task>,
    pub due_soon: Vec<&'a Task>,
    pub no_due_date: Vec<&'a Task>,
}

impl<'a> DateGroups<'a> {
    pub fn build(tasks: &[&'a Task], now: &DateTime<Local>) -> Self {
        let day_start = start_of_day(now.date_naive());
        let mut groups = Self::default();

        for task in tasks {
            let bucket = DateBucket::classify(task.reminder.as_ref(), &day_start);
            groups.bucket_mut(bucket).push(*task);
        }

        for bucket in [&mut groups.overdue, &mut groups.due_today, &mut groups.due_soon] {
            bucket.sort_by_key(|t| (t.reminder, t.created_at));
        }
        groups.no_due_date.sort_by_key(|t| t.created_at);

        groups
    }

    pub fn get(&self, bucket: DateBucket) -> &[&'a Task] {
        match bucket {
            DateBucket::Overdue => &self.overdue,
            DateBucket::DueToday => &self.due_today,
            DateBucket::DueSoon => &self.due_soon,
            DateBucket::NoDueDate => &self.no_due_date,
        }
    }

    fn bucket_mut(&mut self, bucket: DateBucket) -> &mut Vec<&'a Task> {
        match bucket {
            DateBucket::Overdue => &mut self.overdue,
            DateBucket::DueToday => &mut self.due_today,
            DateBucket::DueSoon => &mut self.due_soon,
            DateBucket::NoDueDate => &mut self.no_due_date,
        }
    }

    /// Buckets in display order, empty ones included.
    pub fn iter(&self) -> impl Iterator<Item = (DateBucket, &[&'a Task])> + '_ {
        DateBucket::ALL.into_iter().map(|b| (b, self.get(b)))
    }

    pub fn total_count(&self) -> usize {
        self.overdue.len() + self.due_today.len() + self.due_soon.len() + self.no_due_date.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::fixtures::*;
    use crate::view::{View, ViewMode, derive_view};

    #[test]
    fn buckets_relative_to_today() {
        let now = local(2026, 3, 11, 12, 0);
        let tasks = vec![
            due(task("yesterday", 1), local(2026, 3, 10, 10, 0).with_timezone(&Utc)),
            due(task("today", 2), local(2026, 3, 11, 8, 0).with_timezone(&Utc)),
            due(task("tomorrow", 3), local(2026, 3, 12, 9, 0).with_timezone(&Utc)),
            task("someday", 4),
        ];
        let View::Dates(groups) = derive_view(&tasks, &[], ViewMode::Dates, &now) else {
            panic!("dates mode must group by date");
        };
        assert_eq!(ids(groups.overdue.iter().copied()), ["yesterday"]);
        assert_eq!(ids(groups.due_today.iter().copied()), ["today"]);
        assert_eq!(ids(groups.due_soon.iter().copied()), ["tomorrow"]);
        assert_eq!(ids(groups.no_due_date.iter().copied()), ["someday"]);
        assert_eq!(groups.total_count(), 4);
    }

    #[test]
    fn today_window_edges() {
        let now = local(2026, 3, 11, 23, 0);
        let start = local(2026, 3, 11, 0, 0).with_timezone(&Utc);
        let tasks = vec![
            due(task("midnight", 1), start),
            due(task("last-minute", 2), local(2026, 3, 11, 23, 59).with_timezone(&Utc)),
            due(task("just-before", 3), start - Duration::seconds(1)),
            due(task("next-midnight", 4), local(2026, 3, 12, 0, 0).with_timezone(&Utc)),
        ];
        let selected: Vec<&Task> = tasks.iter().collect();
        let groups = DateGroups::build(&selected, &now);
        assert_eq!(ids(groups.due_today.iter().copied()), ["midnight", "last-minute"]);
        assert_eq!(ids(groups.overdue.iter().copied()), ["just-before"]);
        assert_eq!(ids(groups.due_soon.iter().copied()), ["next-midnight"]);
    }

    #[test]
    fn buckets_order_by_reminder_then_creation() {
        let now = local(2026, 3, 11, 7, 0);
        let nine = local(2026, 3, 11, 9, 0).with_timezone(&Utc);
        let eight = local(2026, 3, 11, 8, 0).with_timezone(&Utc);
        let tasks = vec![
            due(task("nine-new", 30), nine),
            done(due(task("eight-done", 20), eight), 99),
            due(task("nine-old", 10), nine),
            task("undated-new", 50),
            done(task("undated-old", 5), 60),
        ];
        let View::Dates(groups) = derive_view(&tasks, &[], ViewMode::Dates, &now) else {
            panic!("dates mode must group by date");
        };
        assert_eq!(
            ids(groups.due_today.iter().copied()),
            ["eight-done", "nine-old", "nine-new"]
        );
        assert_eq!(ids(groups.no_due_date.iter().copied()), ["undated-old", "undated-new"]);
    }

    #[test]
    fn iter_yields_every_bucket_in_order() {
        let groups = DateGroups::default();
        let order: Vec<_> = groups.iter().map(|(b, _)| b).collect();
        assert_eq!(order, DateBucket::ALL);
        assert_eq!(DateBucket::DueSoon.title(), "Due Soon");
    }
}

use crate::core::category::CategoryItem;
use crate::core::task::Task;

use super::category_index;

/// One section of the categories view. `category` is `None` for the trailing
/// uncategorized group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryGroup<'a> {
    pub category: Option<&'a CategoryItem>,
    pub tasks: Vec<&'a Task>,
}

impl CategoryGroup<'_> {
    pub fn title(&self) -> &str {
        self.category.map_or("Uncategorized", |c| c.name.as_str())
    }
}

/// Group a categories-sorted list in category order, uncategorized last.
/// Empty groups are omitted.
pub fn group<'a>(sorted: &[&'a Task], categories: &'a [CategoryItem]) -> Vec<CategoryGroup<'a>> {
    let mut groups: Vec<CategoryGroup<'a>> = categories
        .iter()
        .map(|category| CategoryGroup {
            category: Some(category),
            tasks: Vec::new(),
        })
        .collect();
    let mut uncategorized = CategoryGroup {
        category: None,
        tasks: Vec::new(),
    };

    for task in sorted {
        match groups.get_mut(category_index(task, categories)) {
            Some(group) => group.tasks.push(*task),
            None => uncategorized.tasks.push(*task),
        }
    }

    groups.push(uncategorized);
    groups.retain(|g| !g.tasks.is_empty());
    groups
}

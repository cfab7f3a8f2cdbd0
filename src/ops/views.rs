use std::cmp::Ordering;

use chrono::{Duration, NaiveDate};
use indexmap::IndexMap;
use regex::RegexBuilder;

use crate::model::{Task, View};

/// How far ahead the next7days view reaches.
const HORIZON_DAYS: i64 = 7;

// ---------------------------------------------------------------------------
// Filtering and sorting
// ---------------------------------------------------------------------------

/// Tasks matching a view, sorted for display.
pub fn filter_tasks<'a>(
    tasks: &'a [Task],
    view: &View,
    known_projects: &[String],
    today: NaiveDate,
) -> Vec<&'a Task> {
    let mut picked: Vec<&Task> = tasks
        .iter()
        .filter(|t| matches_view(t, view, known_projects, today))
        .collect();
    picked.sort_by(|a, b| task_order(a, b));
    picked
}

/// Membership rule for a single task in a view. Shared by `filter_tasks`
/// and `counts_by_view` so the two can never disagree.
fn matches_view(task: &Task, view: &View, known_projects: &[String], today: NaiveDate) -> bool {
    match view {
        View::Completed => task.completed,
        View::Today => task.is_active() && task.due_date == Some(today),
        // overdue tasks stay visible here; undated tasks are out
        View::Next7Days => {
            task.is_active()
                && task
                    .due_date
                    .is_some_and(|d| d <= today + Duration::days(HORIZON_DAYS))
        }
        View::Inbox => task.is_active() && task.in_inbox(),
        View::Project(name) if is_known_project(name, known_projects) => {
            task.is_active() && task.in_list(name)
        }
        // all, focus, and unrecognized names fall back to every active task
        _ => task.is_active(),
    }
}

fn is_known_project(name: &str, known_projects: &[String]) -> bool {
    known_projects
        .iter()
        .any(|p| p.to_lowercase() == name.to_lowercase())
}

/// Display ordering: active before completed, then High before Low, then
/// dated before undated with earlier dates first, then newest created first.
/// Callers rely on this being used with a stable sort.
pub fn task_order(a: &Task, b: &Task) -> Ordering {
    a.completed
        .cmp(&b.completed)
        .then_with(|| a.priority.cmp(&b.priority))
        .then_with(|| match (a.due_date, b.due_date) {
            (Some(da), Some(db)) => da.cmp(&db),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
        .then_with(|| b.created_at.cmp(&a.created_at))
}

// ---------------------------------------------------------------------------
// Dashboard grouping
// ---------------------------------------------------------------------------

/// Due-date buckets for the next7days dashboard. Each task lands in exactly
/// one bucket; bucket contents keep the incoming order.
#[derive(Debug, Default)]
pub struct DashboardGroups<'a> {
    pub overdue: Vec<&'a Task>,
    pub today: Vec<&'a Task>,
    pub tomorrow: Vec<&'a Task>,
    pub next7days: Vec<&'a Task>,
}

/// Partition the next7days view's filtered+sorted tasks by due date.
pub fn group_for_dashboard<'a>(sorted: &[&'a Task], today: NaiveDate) -> DashboardGroups<'a> {
    let mut groups = DashboardGroups::default();
    for task in sorted {
        let Some(due) = task.due_date else {
            groups.next7days.push(task);
            continue;
        };
        match (due - today).num_days() {
            d if d < 0 => groups.overdue.push(task),
            0 => groups.today.push(task),
            1 => groups.tomorrow.push(task),
            _ => groups.next7days.push(task),
        }
    }
    groups
}

// ---------------------------------------------------------------------------
// Counts and search
// ---------------------------------------------------------------------------

/// Incomplete-task counts for inbox, today, next7days, and every known
/// project, keyed by view identifier in display order.
pub fn counts_by_view(
    tasks: &[Task],
    known_projects: &[String],
    today: NaiveDate,
) -> IndexMap<String, usize> {
    let mut counts = IndexMap::new();
    for view in [View::Inbox, View::Today, View::Next7Days] {
        let n = tasks
            .iter()
            .filter(|t| matches_view(t, &view, known_projects, today))
            .count();
        counts.insert(view.as_str().to_string(), n);
    }
    for project in known_projects {
        let view = View::Project(project.clone());
        let n = tasks
            .iter()
            .filter(|t| matches_view(t, &view, known_projects, today))
            .count();
        counts.insert(project.clone(), n);
    }
    counts
}

/// Case-insensitive substring search over titles and tags. A blank query
/// returns nothing rather than everything.
pub fn search_tasks<'a>(tasks: &'a [Task], query: &str) -> Vec<&'a Task> {
    let query = query.trim();
    if query.is_empty() {
        return Vec::new();
    }
    let Ok(matcher) = RegexBuilder::new(&regex::escape(query))
        .case_insensitive(true)
        .build()
    else {
        return Vec::new();
    };
    let mut hits: Vec<&Task> = tasks
        .iter()
        .filter(|t| matcher.is_match(&t.title) || t.tags.iter().any(|tag| matcher.is_match(tag)))
        .collect();
    hits.sort_by(|a, b| task_order(a, b));
    hits
}

use chrono::NaiveDate;

use crate::model::{INBOX_LIST, Subtask, Task, Timestamp};
use crate::parse::parse_quick_entry;

/// Error type for task operations
#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    #[error("task not found: {0}")]
    NotFound(String),
    #[error("subtask not found: {1} on task {0}")]
    SubtaskNotFound(String, String),
    #[error("title cannot be empty")]
    EmptyTitle,
}

// ---------------------------------------------------------------------------
// Lookup and ID assignment
// ---------------------------------------------------------------------------

/// Find a task by ID.
pub fn find_task<'a>(tasks: &'a [Task], id: &str) -> Option<&'a Task> {
    tasks.iter().find(|t| t.id == id)
}

/// Find a mutable task by ID.
pub fn find_task_mut<'a>(tasks: &'a mut [Task], id: &str) -> Option<&'a mut Task> {
    tasks.iter_mut().find(|t| t.id == id)
}

/// Highest numeric suffix among `t-NNN` IDs already in use.
pub fn max_task_number(tasks: &[Task]) -> u32 {
    tasks
        .iter()
        .filter_map(|t| t.id.strip_prefix("t-"))
        .filter_map(|n| n.parse::<u32>().ok())
        .max()
        .unwrap_or(0)
}

/// Next sequential task ID above every existing one.
pub fn next_task_id(tasks: &[Task]) -> String {
    format!("t-{:03}", max_task_number(tasks) + 1)
}

fn next_subtask_id(task: &Task) -> String {
    let max = task
        .subtasks
        .iter()
        .filter_map(|s| s.id.strip_prefix("s-"))
        .filter_map(|n| n.parse::<u32>().ok())
        .max()
        .unwrap_or(0);
    format!("s-{}", max + 1)
}

// ---------------------------------------------------------------------------
// Creation
// ---------------------------------------------------------------------------

/// Build a task from one quick-entry string.
///
/// When the input was nothing but tokens, the raw input becomes the title so
/// the capture is never lost. Only a fully blank input is rejected.
pub fn create_task(
    id: String,
    input: &str,
    known_projects: &[String],
    today: NaiveDate,
    now: Timestamp,
) -> Result<Task, TaskError> {
    let entry = parse_quick_entry(input, known_projects, today);
    let title = if entry.clean_title.is_empty() {
        input.trim().to_string()
    } else {
        entry.clean_title
    };
    if title.is_empty() {
        return Err(TaskError::EmptyTitle);
    }

    let mut task = Task::new(id, title, now);
    if let Some(priority) = entry.priority {
        task.priority = priority;
    }
    task.due_date = entry.due_date;
    task.tags = entry.tags;
    if let Some(project) = entry.project {
        task.list = project;
    }
    Ok(task)
}

// ---------------------------------------------------------------------------
// Completion and edits
// ---------------------------------------------------------------------------

/// Set completion state, keeping the completed/completed_at pair in step.
/// Re-completing an already-completed task keeps its original stamp.
pub fn set_completed<'a>(
    tasks: &'a mut [Task],
    id: &str,
    done: bool,
    now: Timestamp,
) -> Result<&'a Task, TaskError> {
    let task = find_task_mut(tasks, id).ok_or_else(|| TaskError::NotFound(id.to_string()))?;
    task.completed = done;
    task.normalize_completion(now);
    Ok(task)
}

/// Replace a task's title.
pub fn edit_title(tasks: &mut [Task], id: &str, title: &str) -> Result<(), TaskError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(TaskError::EmptyTitle);
    }
    let task = find_task_mut(tasks, id).ok_or_else(|| TaskError::NotFound(id.to_string()))?;
    task.title = trimmed.to_string();
    Ok(())
}

/// Replace a task's description.
pub fn set_description(tasks: &mut [Task], id: &str, text: &str) -> Result<(), TaskError> {
    let task = find_task_mut(tasks, id).ok_or_else(|| TaskError::NotFound(id.to_string()))?;
    task.description = text.to_string();
    Ok(())
}

/// Set or clear the due date.
pub fn set_due_date(
    tasks: &mut [Task],
    id: &str,
    due: Option<NaiveDate>,
) -> Result<(), TaskError> {
    let task = find_task_mut(tasks, id).ok_or_else(|| TaskError::NotFound(id.to_string()))?;
    task.due_date = due;
    Ok(())
}

/// Set the priority.
pub fn set_priority(
    tasks: &mut [Task],
    id: &str,
    priority: crate::model::Priority,
) -> Result<(), TaskError> {
    let task = find_task_mut(tasks, id).ok_or_else(|| TaskError::NotFound(id.to_string()))?;
    task.priority = priority;
    Ok(())
}

/// File the task under a project; a blank name sends it back to the inbox.
pub fn move_to_list(tasks: &mut [Task], id: &str, list: &str) -> Result<(), TaskError> {
    let task = find_task_mut(tasks, id).ok_or_else(|| TaskError::NotFound(id.to_string()))?;
    let trimmed = list.trim();
    task.list = if trimmed.is_empty() {
        INBOX_LIST.to_string()
    } else {
        trimmed.to_string()
    };
    Ok(())
}

/// Remove a task outright, handing the record back so the caller can offer
/// a one-step undo.
pub fn remove_task(tasks: &mut Vec<Task>, id: &str) -> Result<Task, TaskError> {
    let idx = tasks
        .iter()
        .position(|t| t.id == id)
        .ok_or_else(|| TaskError::NotFound(id.to_string()))?;
    Ok(tasks.remove(idx))
}

// ---------------------------------------------------------------------------
// Subtasks
// ---------------------------------------------------------------------------

/// Append a subtask. Returns the assigned subtask ID.
pub fn add_subtask(tasks: &mut [Task], id: &str, title: &str) -> Result<String, TaskError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(TaskError::EmptyTitle);
    }
    let task = find_task_mut(tasks, id).ok_or_else(|| TaskError::NotFound(id.to_string()))?;
    let sub_id = next_subtask_id(task);
    task.subtasks.push(Subtask {
        id: sub_id.clone(),
        title: trimmed.to_string(),
        completed: false,
    });
    Ok(sub_id)
}

/// Flip one subtask's checkbox. Returns the new state.
pub fn toggle_subtask(tasks: &mut [Task], id: &str, sub_id: &str) -> Result<bool, TaskError> {
    let task = find_task_mut(tasks, id).ok_or_else(|| TaskError::NotFound(id.to_string()))?;
    let sub = task
        .subtasks
        .iter_mut()
        .find(|s| s.id == sub_id)
        .ok_or_else(|| TaskError::SubtaskNotFound(id.to_string(), sub_id.to_string()))?;
    sub.completed = !sub.completed;
    Ok(sub.completed)
}

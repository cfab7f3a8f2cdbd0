use std::collections::HashSet;

use crate::model::{INBOX_LIST, Task, Timestamp};

/// Error type for loading foreign task data
#[derive(Debug, thiserror::Error)]
pub enum SanitizeError {
    #[error("task data must be a JSON array")]
    InvalidFormat,
}

/// Result of running raw task data through the sanitizer
#[derive(Debug)]
pub struct SanitizeReport {
    /// The tasks that survived, normalized and uniquely keyed
    pub tasks: Vec<Task>,
    /// Number of records dropped as unreadable
    pub dropped: usize,
    /// Number of IDs reassigned because they were blank or duplicated
    pub rekeyed: usize,
}

/// Turn untrusted JSON into a clean task list.
///
/// The top level must be an array; anything else is the one hard error.
/// Within the array, records that fail to deserialize or carry a blank
/// title are dropped with a warning. Blank and duplicate IDs get fresh
/// sequential ones, and the completed/completed_at pair is normalized so
/// the rest of the program never sees a half-set state.
pub fn sanitize_tasks(
    value: serde_json::Value,
    now: Timestamp,
) -> Result<SanitizeReport, SanitizeError> {
    let serde_json::Value::Array(records) = value else {
        return Err(SanitizeError::InvalidFormat);
    };

    // First pass: keep every record that deserializes into a usable task
    let mut candidates: Vec<Task> = Vec::with_capacity(records.len());
    let mut dropped = 0;
    for record in records {
        let task: Task = match serde_json::from_value(record) {
            Ok(t) => t,
            Err(e) => {
                log::warn!("dropping unreadable task record: {}", e);
                dropped += 1;
                continue;
            }
        };
        if task.title.trim().is_empty() {
            log::warn!("dropping task with blank title (id {:?})", task.id);
            dropped += 1;
            continue;
        }
        candidates.push(task);
    }

    // Fresh IDs start above the highest numbered one anywhere in the input,
    // so a rekey never claims an ID a later record legitimately holds.
    let mut next_num = super::task_ops::max_task_number(&candidates) + 1;

    let mut seen: HashSet<String> = HashSet::with_capacity(candidates.len());
    let mut rekeyed = 0;
    let mut tasks = Vec::with_capacity(candidates.len());
    for mut task in candidates {
        if task.id.is_empty() || seen.contains(&task.id) {
            let fresh = format!("t-{:03}", next_num);
            next_num += 1;
            log::warn!("reassigning task id {:?} -> {}", task.id, fresh);
            task.id = fresh;
            rekeyed += 1;
        }
        seen.insert(task.id.clone());

        if task.list.trim().is_empty() {
            task.list = INBOX_LIST.to_string();
        }
        task.normalize_completion(now);
        tasks.push(task);
    }

    Ok(SanitizeReport {
        tasks,
        dropped,
        rekeyed,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

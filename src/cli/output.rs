use std::collections::BTreeMap;

use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::Serialize;
use unicode_width::UnicodeWidthStr;

use crate::model::{Priority, Subtask, Task, Timestamp};
use crate::ops::{DashboardGroups, GridDay, Streaks, WindowStats, intensity_level};
use crate::timer::{FocusTimer, TimerMode};
use crate::util::date;

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

// Task records serialize as-is; these wrap the shapes that have no model type.

#[derive(Serialize)]
pub struct DashboardJson<'a> {
    pub overdue: Vec<&'a Task>,
    pub today: Vec<&'a Task>,
    pub tomorrow: Vec<&'a Task>,
    pub next7days: Vec<&'a Task>,
}

pub fn dashboard_to_json<'a>(groups: &DashboardGroups<'a>) -> DashboardJson<'a> {
    DashboardJson {
        overdue: groups.overdue.clone(),
        today: groups.today.clone(),
        tomorrow: groups.tomorrow.clone(),
        next7days: groups.next7days.clone(),
    }
}

#[derive(Serialize)]
pub struct StatsJson {
    pub window_weeks: usize,
    pub window_total: u32,
    pub all_time_total: u32,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub grid: Vec<Vec<GridDayJson>>,
}

#[derive(Serialize)]
pub struct GridDayJson {
    pub date: NaiveDate,
    pub count: u32,
    pub level: u8,
    pub future: bool,
}

pub fn stats_to_json(
    grid: &[Vec<GridDay>],
    map: &BTreeMap<NaiveDate, u32>,
    stats: &WindowStats,
    streaks: &Streaks,
    weeks: usize,
) -> StatsJson {
    let grid = grid
        .iter()
        .map(|week| {
            week.iter()
                .map(|day| {
                    let count = if day.in_future {
                        0
                    } else {
                        map.get(&day.date).copied().unwrap_or(0)
                    };
                    GridDayJson {
                        date: day.date,
                        count,
                        level: intensity_level(count, stats.intensity_ceiling),
                        future: day.in_future,
                    }
                })
                .collect()
        })
        .collect();
    StatsJson {
        window_weeks: weeks,
        window_total: stats.visible_total,
        all_time_total: stats.all_time_total,
        current_streak: streaks.current,
        longest_streak: streaks.longest,
        grid,
    }
}

#[derive(Serialize)]
pub struct TimerJson {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<&'static str>,
    pub mode: &'static str,
    pub running: bool,
    pub remaining_secs: u32,
    pub remaining: String,
}

pub fn timer_to_json(
    timer: &FocusTimer,
    completed: Option<TimerMode>,
    now: Timestamp,
) -> TimerJson {
    let remaining_secs = timer.remaining_secs(now);
    TimerJson {
        completed: completed.map(TimerMode::as_str),
        mode: timer.mode.as_str(),
        running: timer.is_running(),
        remaining_secs,
        remaining: format_clock(remaining_secs),
    }
}

// ---------------------------------------------------------------------------
// Human-readable formatting
// ---------------------------------------------------------------------------

/// Pad to a terminal display width, not a char count.
pub fn pad(s: &str, to: usize) -> String {
    let w = UnicodeWidthStr::width(s);
    if w >= to {
        s.to_string()
    } else {
        format!("{}{}", s, " ".repeat(to - w))
    }
}

fn checkbox(completed: bool) -> char {
    if completed { 'x' } else { ' ' }
}

/// One task as a single line: checkbox, ID (padded to `id_width`), title,
/// then any markers the task carries.
pub fn format_task_line(task: &Task, id_width: usize, today: NaiveDate) -> String {
    let mut line = format!(
        "[{}] {} {}",
        checkbox(task.completed),
        pad(&task.id, id_width),
        task.title
    );
    if task.priority != Priority::Low {
        line.push_str(&format!(" !{}", task.priority.as_str()));
    }
    for tag in &task.tags {
        line.push_str(&format!(" #{}", tag));
    }
    if !task.in_inbox() {
        line.push_str(&format!(" @{}", task.list));
    }
    if let Some(due) = task.due_date {
        if !task.completed && due < today {
            line.push_str(&format!(" (due {}, overdue)", date::iso_date(due)));
        } else {
            line.push_str(&format!(" (due {})", date::iso_date(due)));
        }
    }
    if !task.subtasks.is_empty() {
        let done = task.subtasks.iter().filter(|s| s.completed).count();
        line.push_str(&format!(" [{}/{}]", done, task.subtasks.len()));
    }
    line
}

fn format_subtask_line(sub: &Subtask, indent: usize) -> String {
    format!(
        "{}[{}] {} {}",
        " ".repeat(indent),
        checkbox(sub.completed),
        sub.id,
        sub.title
    )
}

/// A task with its subtasks indented beneath it.
pub fn format_task_block(task: &Task, id_width: usize, today: NaiveDate) -> Vec<String> {
    let mut lines = vec![format_task_line(task, id_width, today)];
    for sub in &task.subtasks {
        lines.push(format_subtask_line(sub, 4));
    }
    lines
}

/// A flat task listing with IDs aligned into a column.
pub fn format_task_list(tasks: &[&Task], today: NaiveDate) -> Vec<String> {
    let id_width = tasks
        .iter()
        .map(|t| UnicodeWidthStr::width(t.id.as_str()))
        .max()
        .unwrap_or(0);
    let mut lines = Vec::new();
    for task in tasks {
        lines.extend(format_task_block(task, id_width, today));
    }
    lines
}

/// The four dashboard sections, skipping empty ones.
pub fn format_dashboard(groups: &DashboardGroups, today: NaiveDate) -> Vec<String> {
    let sections: [(&str, &Vec<&Task>); 4] = [
        ("Overdue", &groups.overdue),
        ("Today", &groups.today),
        ("Tomorrow", &groups.tomorrow),
        ("Next 7 Days", &groups.next7days),
    ];
    let id_width = sections
        .iter()
        .flat_map(|(_, tasks)| tasks.iter())
        .map(|t| UnicodeWidthStr::width(t.id.as_str()))
        .max()
        .unwrap_or(0);

    let mut lines = Vec::new();
    for (header, tasks) in sections {
        if tasks.is_empty() {
            continue;
        }
        if !lines.is_empty() {
            lines.push(String::new());
        }
        lines.push(format!("-- {} --", header));
        for task in tasks {
            lines.extend(format_task_block(task, id_width, today));
        }
    }
    if lines.is_empty() {
        lines.push("nothing due in the next 7 days".to_string());
    }
    lines
}

/// View names and counts in two aligned columns.
pub fn format_counts(counts: &IndexMap<String, usize>) -> Vec<String> {
    let key_width = counts
        .keys()
        .map(|k| UnicodeWidthStr::width(k.as_str()))
        .max()
        .unwrap_or(0);
    counts
        .iter()
        .map(|(key, n)| format!("{}  {}", pad(key, key_width), n))
        .collect()
}

// ---------------------------------------------------------------------------
// Heatmap
// ---------------------------------------------------------------------------

const LEVEL_GLYPHS: [char; 5] = ['·', '░', '▒', '▓', '█'];
const DAY_LABELS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// Seven rows (Sun..Sat), one glyph column per week, oldest week leftmost.
/// Future days render blank.
pub fn format_heatmap(
    grid: &[Vec<GridDay>],
    map: &BTreeMap<NaiveDate, u32>,
    ceiling: u32,
) -> Vec<String> {
    let mut lines = Vec::new();
    for row in 0..7 {
        let mut line = format!("{} ", DAY_LABELS[row]);
        for week in grid {
            let Some(day) = week.get(row) else { continue };
            if day.in_future {
                line.push(' ');
            } else {
                let count = map.get(&day.date).copied().unwrap_or(0);
                line.push(LEVEL_GLYPHS[intensity_level(count, ceiling) as usize]);
            }
            line.push(' ');
        }
        lines.push(line.trim_end().to_string());
    }
    lines
}

fn days(n: u32) -> String {
    if n == 1 {
        "1 day".to_string()
    } else {
        format!("{} days", n)
    }
}

pub fn format_stats_summary(stats: &WindowStats, streaks: &Streaks, weeks: usize) -> Vec<String> {
    vec![
        format!(
            "{} done in the last {} weeks ({} all time)",
            stats.visible_total, weeks, stats.all_time_total
        ),
        format!(
            "streak: {} now, best {}",
            days(streaks.current),
            days(streaks.longest)
        ),
    ]
}

// ---------------------------------------------------------------------------
// Timer
// ---------------------------------------------------------------------------

/// mm:ss, or h:mm:ss once a session reaches the hour.
pub fn format_clock(total_secs: u32) -> String {
    let h = total_secs / 3600;
    let m = (total_secs % 3600) / 60;
    let s = total_secs % 60;
    if h > 0 {
        format!("{}:{:02}:{:02}", h, m, s)
    } else {
        format!("{:02}:{:02}", m, s)
    }
}

pub fn format_timer_status(timer: &FocusTimer, now: Timestamp) -> String {
    let state = if timer.is_running() { "running" } else { "idle" };
    format!(
        "{} | {} | {}",
        timer.mode.as_str(),
        state,
        format_clock(timer.remaining_secs(now))
    )
}

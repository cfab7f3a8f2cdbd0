//! Command execution. Each handler loads what it needs from the data
//! directory, applies one change through the ops layer, saves, and prints.

use std::error::Error;
use std::path::Path;

use chrono::NaiveDate;

use crate::cli::commands::{
    CheckArgs, Cli, Commands, EditArgs, IdArg, ProjectAction, SubArgs, TimerAction,
};
use crate::cli::output;
use crate::io::{config_io, store};
use crate::model::{Priority, Timestamp, View};
use crate::ops::{contrib, task_ops, views};
use crate::timer::{FocusTimer, TimerMode};
use crate::util::date;

/// Fixed view names; the project registry may not shadow them.
const RESERVED_VIEWS: [&str; 6] = ["all", "today", "next7days", "inbox", "completed", "focus"];

/// Route a parsed command line. The wall clock is sampled exactly once here;
/// everything below runs against that instant.
pub fn dispatch(cli: Cli, data_dir: &Path) -> Result<(), Box<dyn Error>> {
    let now = date::now_ms();
    let today = date::today();
    let json = cli.json;
    match cli.command {
        Commands::Add(args) => cmd_add(data_dir, &args.text.join(" "), json, today, now),
        Commands::List(args) => cmd_list(data_dir, &args.view, json, today, now),
        Commands::Done(args) => cmd_set_completed(data_dir, &args, true, json, now),
        Commands::Reopen(args) => cmd_set_completed(data_dir, &args, false, json, now),
        Commands::Rm(args) => cmd_rm(data_dir, &args, json, now),
        Commands::Sub(args) => cmd_sub(data_dir, &args, json, now),
        Commands::Check(args) => cmd_check(data_dir, &args, json, now),
        Commands::Edit(args) => cmd_edit(data_dir, args, json, today, now),
        Commands::Search(args) => cmd_search(data_dir, &args.query, json, today, now),
        Commands::Counts => cmd_counts(data_dir, json, today, now),
        Commands::Stats(args) => cmd_stats(data_dir, args.weeks, json, today, now),
        Commands::Projects => cmd_projects(data_dir, json),
        Commands::Project(cmd) => match cmd.action {
            ProjectAction::Add(arg) => cmd_project_add(data_dir, &arg.name, json),
            ProjectAction::Rm(arg) => cmd_project_rm(data_dir, &arg.name, json, now),
        },
        Commands::Timer(cmd) => cmd_timer(data_dir, cmd.action, json, now),
    }
}

// ---------------------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------------------

fn cmd_add(
    data_dir: &Path,
    input: &str,
    json: bool,
    today: NaiveDate,
    now: Timestamp,
) -> Result<(), Box<dyn Error>> {
    let mut report = store::load_tasks(data_dir, now)?;
    let projects = store::load_projects(data_dir)?;
    let id = task_ops::next_task_id(&report.tasks);
    let task = task_ops::create_task(id, input, &projects, today, now)?;
    report.tasks.push(task.clone());
    store::save_tasks(data_dir, &report.tasks)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&task)?);
    } else {
        println!("{}", task.id);
    }
    Ok(())
}

fn cmd_list(
    data_dir: &Path,
    view_name: &str,
    json: bool,
    today: NaiveDate,
    now: Timestamp,
) -> Result<(), Box<dyn Error>> {
    let report = store::load_tasks(data_dir, now)?;
    let projects = store::load_projects(data_dir)?;
    let view = View::parse(view_name);
    if let View::Project(name) = &view
        && resolve_project(&projects, name).is_none()
    {
        return Err(format!("unknown view or project: {}", name).into());
    }
    let picked = views::filter_tasks(&report.tasks, &view, &projects, today);

    if view == View::Next7Days {
        let groups = views::group_for_dashboard(&picked, today);
        if json {
            let out = output::dashboard_to_json(&groups);
            println!("{}", serde_json::to_string_pretty(&out)?);
        } else {
            for line in output::format_dashboard(&groups, today) {
                println!("{}", line);
            }
        }
        return Ok(());
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&picked)?);
    } else if picked.is_empty() {
        println!("(no tasks)");
    } else {
        for line in output::format_task_list(&picked, today) {
            println!("{}", line);
        }
    }
    Ok(())
}

fn cmd_set_completed(
    data_dir: &Path,
    args: &IdArg,
    done: bool,
    json: bool,
    now: Timestamp,
) -> Result<(), Box<dyn Error>> {
    let mut report = store::load_tasks(data_dir, now)?;
    let task = task_ops::set_completed(&mut report.tasks, &args.id, done, now)?.clone();
    store::save_tasks(data_dir, &report.tasks)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&task)?);
    } else {
        println!("{} → {}", task.id, if done { "done" } else { "open" });
    }
    Ok(())
}

fn cmd_rm(data_dir: &Path, args: &IdArg, json: bool, now: Timestamp) -> Result<(), Box<dyn Error>> {
    let mut report = store::load_tasks(data_dir, now)?;
    let removed = task_ops::remove_task(&mut report.tasks, &args.id)?;
    store::save_tasks(data_dir, &report.tasks)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&removed)?);
    } else {
        println!("{} removed", removed.id);
    }
    Ok(())
}

fn cmd_sub(
    data_dir: &Path,
    args: &SubArgs,
    json: bool,
    now: Timestamp,
) -> Result<(), Box<dyn Error>> {
    let mut report = store::load_tasks(data_dir, now)?;
    let sub_id = task_ops::add_subtask(&mut report.tasks, &args.id, &args.title)?;
    store::save_tasks(data_dir, &report.tasks)?;
    if json {
        if let Some(task) = task_ops::find_task(&report.tasks, &args.id) {
            println!("{}", serde_json::to_string_pretty(task)?);
        }
    } else {
        println!("{}", sub_id);
    }
    Ok(())
}

fn cmd_check(
    data_dir: &Path,
    args: &CheckArgs,
    json: bool,
    now: Timestamp,
) -> Result<(), Box<dyn Error>> {
    let mut report = store::load_tasks(data_dir, now)?;
    let now_done = task_ops::toggle_subtask(&mut report.tasks, &args.id, &args.sub_id)?;
    store::save_tasks(data_dir, &report.tasks)?;
    if json {
        if let Some(task) = task_ops::find_task(&report.tasks, &args.id) {
            println!("{}", serde_json::to_string_pretty(task)?);
        }
    } else {
        println!("{} → {}", args.sub_id, if now_done { "done" } else { "open" });
    }
    Ok(())
}

fn cmd_edit(
    data_dir: &Path,
    args: EditArgs,
    json: bool,
    today: NaiveDate,
    now: Timestamp,
) -> Result<(), Box<dyn Error>> {
    if args.title.is_none()
        && args.description.is_none()
        && args.priority.is_none()
        && args.due.is_none()
        && args.project.is_none()
    {
        return Err(
            "nothing to edit (pass --title, --description, --priority, --due, or --project)"
                .into(),
        );
    }

    let mut report = store::load_tasks(data_dir, now)?;
    let projects = store::load_projects(data_dir)?;

    if let Some(title) = &args.title {
        task_ops::edit_title(&mut report.tasks, &args.id, title)?;
    }
    if let Some(text) = &args.description {
        task_ops::set_description(&mut report.tasks, &args.id, text)?;
    }
    if let Some(word) = &args.priority {
        let priority = Priority::from_keyword(word)
            .ok_or_else(|| format!("unknown priority '{}' (expected: high, medium, low)", word))?;
        task_ops::set_priority(&mut report.tasks, &args.id, priority)?;
    }
    if let Some(spec) = &args.due {
        let due = parse_due_arg(spec, today)?;
        task_ops::set_due_date(&mut report.tasks, &args.id, due)?;
    }
    if let Some(name) = &args.project {
        let trimmed = name.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("inbox") {
            task_ops::move_to_list(&mut report.tasks, &args.id, "")?;
        } else {
            let canonical = resolve_project(&projects, trimmed)
                .ok_or_else(|| format!("unknown project: {}", trimmed))?
                .to_string();
            task_ops::move_to_list(&mut report.tasks, &args.id, &canonical)?;
        }
    }

    store::save_tasks(data_dir, &report.tasks)?;
    if let Some(task) = task_ops::find_task(&report.tasks, &args.id) {
        if json {
            println!("{}", serde_json::to_string_pretty(task)?);
        } else {
            println!("{} updated", task.id);
        }
    }
    Ok(())
}

fn cmd_search(
    data_dir: &Path,
    query: &str,
    json: bool,
    today: NaiveDate,
    now: Timestamp,
) -> Result<(), Box<dyn Error>> {
    let report = store::load_tasks(data_dir, now)?;
    let hits = views::search_tasks(&report.tasks, query);
    if json {
        println!("{}", serde_json::to_string_pretty(&hits)?);
    } else if hits.is_empty() {
        println!("(no matches)");
    } else {
        for line in output::format_task_list(&hits, today) {
            println!("{}", line);
        }
    }
    Ok(())
}

fn cmd_counts(
    data_dir: &Path,
    json: bool,
    today: NaiveDate,
    now: Timestamp,
) -> Result<(), Box<dyn Error>> {
    let report = store::load_tasks(data_dir, now)?;
    let projects = store::load_projects(data_dir)?;
    let counts = views::counts_by_view(&report.tasks, &projects, today);
    if json {
        println!("{}", serde_json::to_string_pretty(&counts)?);
    } else {
        for line in output::format_counts(&counts) {
            println!("{}", line);
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

fn cmd_stats(
    data_dir: &Path,
    weeks_flag: Option<usize>,
    json: bool,
    today: NaiveDate,
    now: Timestamp,
) -> Result<(), Box<dyn Error>> {
    let report = store::load_tasks(data_dir, now)?;
    let config = config_io::load_config(data_dir)?;
    let weeks = weeks_flag.unwrap_or(config.heatmap.weeks).max(1);

    let map = contrib::completion_map(&report.tasks);
    let current_sunday = date::week_start_sunday(today);
    let grid = contrib::calendar_grid(current_sunday, weeks, today);
    let window_start = contrib::grid_window_start(current_sunday, weeks);
    let stats = contrib::window_stats(&map, window_start, today);
    let streaks = contrib::streaks(&map, today);

    if json {
        let out = output::stats_to_json(&grid, &map, &stats, &streaks, weeks);
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        for line in output::format_heatmap(&grid, &map, stats.intensity_ceiling) {
            println!("{}", line);
        }
        println!();
        for line in output::format_stats_summary(&stats, &streaks, weeks) {
            println!("{}", line);
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Project registry
// ---------------------------------------------------------------------------

fn cmd_projects(data_dir: &Path, json: bool) -> Result<(), Box<dyn Error>> {
    let projects = store::load_projects(data_dir)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&projects)?);
    } else if projects.is_empty() {
        println!("(no projects)");
    } else {
        for project in &projects {
            println!("{}", project);
        }
    }
    Ok(())
}

fn cmd_project_add(data_dir: &Path, name: &str, json: bool) -> Result<(), Box<dyn Error>> {
    let mut projects = store::load_projects(data_dir)?;
    let name = validate_new_project(name, &projects)?;
    projects.push(name.clone());
    store::save_projects(data_dir, &projects)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&projects)?);
    } else {
        println!("project added: {}", name);
    }
    Ok(())
}

fn cmd_project_rm(
    data_dir: &Path,
    name: &str,
    json: bool,
    now: Timestamp,
) -> Result<(), Box<dyn Error>> {
    let name = name.trim();
    let mut projects = store::load_projects(data_dir)?;
    let idx = projects
        .iter()
        .position(|p| p.to_lowercase() == name.to_lowercase())
        .ok_or_else(|| format!("unknown project: {}", name))?;
    let removed = projects.remove(idx);
    store::save_projects(data_dir, &projects)?;

    // tasks keep their list label; report how many still carry it
    let report = store::load_tasks(data_dir, now)?;
    let kept = report.tasks.iter().filter(|t| t.in_list(&removed)).count();
    if json {
        println!("{}", serde_json::to_string_pretty(&projects)?);
    } else if kept > 0 {
        println!("project removed: {} ({} still filed)", removed, kept);
    } else {
        println!("project removed: {}", removed);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Timer
// ---------------------------------------------------------------------------

fn cmd_timer(
    data_dir: &Path,
    action: Option<TimerAction>,
    json: bool,
    now: Timestamp,
) -> Result<(), Box<dyn Error>> {
    let config = config_io::load_config(data_dir)?;
    let mut timer = store::load_timer(data_dir).unwrap_or_else(|| {
        FocusTimer::with_presets(
            config.timer.focus_minutes * 60,
            config.timer.break_minutes * 60,
        )
    });

    // an expired countdown is folded before any action applies
    let completed = timer.complete(now);
    if let Some(mode) = completed {
        log::info!("{} session completed", mode.as_str());
    }

    match action.unwrap_or(TimerAction::Status) {
        TimerAction::Status => {}
        TimerAction::Start => timer.start(now),
        TimerAction::Pause => timer.pause(now),
        TimerAction::Reset => timer.reset(),
        TimerAction::Adjust(args) => timer.adjust(args.minutes),
        TimerAction::Preset(args) => timer.set_preset(args.minutes),
        TimerAction::Mode(args) => {
            let mode = match args.mode.to_lowercase().as_str() {
                "focus" => TimerMode::Focus,
                "break" => TimerMode::Break,
                other => {
                    return Err(
                        format!("unknown timer mode '{}' (expected: focus, break)", other).into(),
                    );
                }
            };
            timer.switch_mode(mode, false, now);
        }
    }

    store::save_timer(data_dir, &timer)?;
    if json {
        let out = output::timer_to_json(&timer, completed, now);
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        if let Some(mode) = completed {
            println!(
                "{} session complete → {} started",
                mode.as_str(),
                mode.opposite().as_str()
            );
        }
        println!("{}", output::format_timer_status(&timer, now));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Canonical casing of a registered project, matched case-insensitively.
fn resolve_project<'a>(projects: &'a [String], name: &str) -> Option<&'a str> {
    projects
        .iter()
        .find(|p| p.to_lowercase() == name.to_lowercase())
        .map(String::as_str)
}

fn validate_new_project(name: &str, existing: &[String]) -> Result<String, String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err("project name cannot be blank".to_string());
    }
    if RESERVED_VIEWS.contains(&trimmed.to_lowercase().as_str()) {
        return Err(format!("'{}' is a reserved view name", trimmed));
    }
    if existing
        .iter()
        .any(|p| p.to_lowercase() == trimmed.to_lowercase())
    {
        return Err(format!("project already exists: {}", trimmed));
    }
    Ok(trimmed.to_string())
}

/// `--due` accepts an ISO date, a relative keyword, or `none` to clear.
fn parse_due_arg(spec: &str, today: NaiveDate) -> Result<Option<NaiveDate>, String> {
    match spec.trim().to_lowercase().as_str() {
        "none" => Ok(None),
        "today" => Ok(Some(today)),
        "tomorrow" => Ok(today.succ_opt()),
        "next-week" => Ok(Some(date::upcoming_monday(today))),
        word => match NaiveDate::parse_from_str(word, "%Y-%m-%d") {
            Ok(date) => Ok(Some(date)),
            Err(_) => Err(format!(
                "invalid due date '{}' (expected: YYYY-MM-DD, today, tomorrow, next-week, none)",
                spec
            )),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    // --- Due date argument ---

    #[test]
    fn due_arg_accepts_iso_dates() {
        assert_eq!(
            parse_due_arg("2025-03-10", d("2025-03-05")),
            Ok(Some(d("2025-03-10")))
        );
    }

    #[test]
    fn due_arg_resolves_keywords_against_today() {
        let today = d("2025-03-05");
        assert_eq!(parse_due_arg("today", today), Ok(Some(today)));
        assert_eq!(parse_due_arg("Tomorrow", today), Ok(Some(d("2025-03-06"))));
        // Wednesday, so the upcoming Monday is five days out
        assert_eq!(parse_due_arg("next-week", today), Ok(Some(d("2025-03-10"))));
        assert_eq!(parse_due_arg("none", today), Ok(None));
    }

    #[test]
    fn due_arg_rejects_garbage() {
        assert!(parse_due_arg("soon", d("2025-03-05")).is_err());
        assert!(parse_due_arg("2025-13-40", d("2025-03-05")).is_err());
    }

    // --- Project registry validation ---

    #[test]
    fn project_names_are_trimmed() {
        let existing = vec![];
        assert_eq!(
            validate_new_project("  Work  ", &existing),
            Ok("Work".to_string())
        );
    }

    #[test]
    fn blank_and_reserved_names_are_rejected() {
        let existing = vec![];
        assert!(validate_new_project("   ", &existing).is_err());
        assert!(validate_new_project("Inbox", &existing).is_err());
        assert!(validate_new_project("NEXT7DAYS", &existing).is_err());
    }

    #[test]
    fn duplicate_names_are_rejected_case_insensitively() {
        let existing = vec!["Work".to_string()];
        assert!(validate_new_project("work", &existing).is_err());
        assert!(validate_new_project("Home", &existing).is_ok());
    }

    #[test]
    fn project_resolution_returns_canonical_casing() {
        let projects = vec!["Work".to_string(), "Home".to_string()];
        assert_eq!(resolve_project(&projects, "WORK"), Some("Work"));
        assert_eq!(resolve_project(&projects, "gym"), None);
    }
}

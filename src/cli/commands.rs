use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "tally", about = concat!("[#] tally v", env!("CARGO_PKG_VERSION"), " - tasks, streaks, and focus from the terminal"), version, arg_required_else_help = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Run against a different data directory
    #[arg(short = 'C', long = "data-dir", global = true)]
    pub data_dir: Option<std::path::PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Capture a task from quick-entry text
    Add(AddArgs),
    /// List tasks in a view
    List(ListArgs),
    /// Mark a task done
    Done(IdArg),
    /// Reopen a completed task
    Reopen(IdArg),
    /// Delete a task
    Rm(IdArg),
    /// Add a subtask
    Sub(SubArgs),
    /// Toggle a subtask checkbox
    Check(CheckArgs),
    /// Edit task fields
    Edit(EditArgs),
    /// Search titles and tags
    Search(SearchArgs),
    /// Show per-view task counts
    Counts,
    /// Show the completion heatmap and streaks
    Stats(StatsArgs),
    /// List known projects
    Projects,
    /// Manage the project registry
    Project(ProjectCmd),
    /// Control the focus timer
    Timer(TimerCmd),
}

// ---------------------------------------------------------------------------
// Task command args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct AddArgs {
    /// Quick-entry text: !high/!medium/!low, #tag, @project, today, tomorrow, next week
    #[arg(required = true)]
    pub text: Vec<String>,
}

#[derive(Args)]
pub struct ListArgs {
    /// View: all, today, next7days, inbox, completed, or a project name
    #[arg(default_value = "inbox")]
    pub view: String,
}

#[derive(Args)]
pub struct IdArg {
    /// Task ID
    pub id: String,
}

#[derive(Args)]
pub struct SubArgs {
    /// Parent task ID
    pub id: String,
    /// Subtask title
    pub title: String,
}

#[derive(Args)]
pub struct CheckArgs {
    /// Parent task ID
    pub id: String,
    /// Subtask ID (s-1, s-2, ...)
    pub sub_id: String,
}

#[derive(Args)]
pub struct EditArgs {
    /// Task ID
    pub id: String,
    /// New title
    #[arg(long)]
    pub title: Option<String>,
    /// New description
    #[arg(long)]
    pub description: Option<String>,
    /// Priority: high, medium, or low
    #[arg(long)]
    pub priority: Option<String>,
    /// Due date: YYYY-MM-DD, today, tomorrow, next-week, or none to clear
    #[arg(long)]
    pub due: Option<String>,
    /// Project to file under (Inbox to unfile)
    #[arg(long)]
    pub project: Option<String>,
}

#[derive(Args)]
pub struct SearchArgs {
    /// Substring to match against titles and tags (case-insensitive)
    pub query: String,
}

#[derive(Args)]
pub struct StatsArgs {
    /// Number of week columns to render (default from config)
    #[arg(long)]
    pub weeks: Option<usize>,
}

// ---------------------------------------------------------------------------
// Project registry
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct ProjectCmd {
    #[command(subcommand)]
    pub action: ProjectAction,
}

#[derive(Subcommand)]
pub enum ProjectAction {
    /// Register a project name
    Add(ProjectNameArg),
    /// Remove a project from the registry
    Rm(ProjectNameArg),
}

#[derive(Args)]
pub struct ProjectNameArg {
    /// Project name
    pub name: String,
}

// ---------------------------------------------------------------------------
// Timer
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct TimerCmd {
    #[command(subcommand)]
    pub action: Option<TimerAction>,
}

#[derive(Subcommand)]
pub enum TimerAction {
    /// Show the current timer state (default)
    Status,
    /// Start the countdown
    Start,
    /// Pause the countdown
    Pause,
    /// Reset to the session's full length
    Reset,
    /// Nudge the paused timer by minutes
    Adjust(AdjustArgs),
    /// Set the current mode's session length in minutes
    Preset(PresetArgs),
    /// Switch between focus and break
    Mode(ModeArgs),
}

#[derive(Args)]
pub struct AdjustArgs {
    /// Minutes to add (negative to subtract)
    #[arg(allow_hyphen_values = true)]
    pub minutes: i32,
}

#[derive(Args)]
pub struct PresetArgs {
    /// Session length in minutes
    pub minutes: u32,
}

#[derive(Args)]
pub struct ModeArgs {
    /// Mode: focus or break
    pub mode: String,
}

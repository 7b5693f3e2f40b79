use clap::{Args, Parser, Subcommand};

use crate::model::RecordId;
use crate::ops::agenda::AgendaView;

#[derive(Parser)]
#[command(name = "ql", about = concat!("questlog v", env!("CARGO_PKG_VERSION"), " - tasks, projects and accounts on local disk"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Config file (default: ./questlog.toml)
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Override the data directory from the config
    #[arg(long = "data-dir", global = true)]
    pub data_dir: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a starter questlog.toml in the current directory
    Init(InitArgs),
    /// Manage user accounts
    User(UserCmd),
    /// Manage projects
    Project(ProjectCmd),
    /// Manage tasks
    Task(TaskCmd),
}

// ---------------------------------------------------------------------------
// Init
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct InitArgs {
    /// Default UTC offset, e.g. +06:00
    #[arg(long, default_value = "+00:00", allow_hyphen_values = true)]
    pub timezone: String,
    /// Overwrite an existing questlog.toml
    #[arg(long)]
    pub force: bool,
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct UserCmd {
    #[command(subcommand)]
    pub action: UserAction,
}

#[derive(Subcommand)]
pub enum UserAction {
    /// Create an account
    Add(UserAddArgs),
    /// List accounts
    List,
    /// Show one account
    Show(IdArg),
    /// Delete an account
    Rm(IdArg),
    /// Report whether a unique value is already taken
    Check(UserCheckArgs),
}

#[derive(Args)]
pub struct UserAddArgs {
    /// Full name
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub username: String,
    #[arg(long)]
    pub email: String,
    /// Phone as REGION:CALLING_CODE:NUMBER, e.g. BD:880:01712345678
    #[arg(long)]
    pub phone: String,
    /// Date of birth (YYYY-MM-DD)
    #[arg(long)]
    pub dob: String,
    #[arg(long)]
    pub password: String,
    /// male or female
    #[arg(long)]
    pub gender: Option<String>,
    /// UTC offset (default: config default_timezone)
    #[arg(long, allow_hyphen_values = true)]
    pub timezone: Option<String>,
}

#[derive(Args)]
pub struct UserCheckArgs {
    /// Unique field: username, email or phoneNumber
    pub field: String,
    /// Value to look up (phoneNumber takes REGION:CALLING_CODE:NUMBER)
    pub value: String,
}

// ---------------------------------------------------------------------------
// Projects
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct ProjectCmd {
    #[command(subcommand)]
    pub action: ProjectAction,
}

#[derive(Subcommand)]
pub enum ProjectAction {
    /// Create a project
    Add(ProjectAddArgs),
    /// List projects
    List(OwnerFilter),
    /// Delete a project
    Rm(IdArg),
}

#[derive(Args)]
pub struct ProjectAddArgs {
    pub title: String,
    /// Owning username
    #[arg(long)]
    pub owner: String,
}

// ---------------------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct TaskCmd {
    #[command(subcommand)]
    pub action: TaskAction,
}

#[derive(Subcommand)]
pub enum TaskAction {
    /// Create a task
    Add(TaskAddArgs),
    /// List a user's tasks
    List(TaskListArgs),
    /// Mark a task completed
    Done(IdArg),
    /// Change a task's fields
    Edit(TaskEditArgs),
    /// Delete a task
    Rm(IdArg),
}

#[derive(Args)]
pub struct TaskAddArgs {
    pub title: String,
    /// Owning username
    #[arg(long)]
    pub owner: String,
    /// Project ID to file the task under
    #[arg(long)]
    pub project: Option<RecordId>,
    /// Due date (YYYY-MM-DD), midnight in the owner's timezone
    #[arg(long)]
    pub due: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
}

#[derive(Args)]
pub struct TaskListArgs {
    /// Owning username
    #[arg(long)]
    pub owner: String,
    /// Only show one dashboard view
    #[arg(long, value_enum)]
    pub view: Option<AgendaView>,
}

#[derive(Args)]
pub struct TaskEditArgs {
    pub id: RecordId,
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    /// Due date (YYYY-MM-DD), midnight in the owner's timezone
    #[arg(long)]
    pub due: Option<String>,
    /// Reopen a completed task
    #[arg(long)]
    pub reopen: bool,
}

// ---------------------------------------------------------------------------
// Shared
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct IdArg {
    pub id: RecordId,
}

#[derive(Args)]
pub struct OwnerFilter {
    /// Only records owned by this username
    #[arg(long)]
    pub owner: Option<String>,
}

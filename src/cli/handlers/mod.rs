mod init;
pub use init::cmd_init;

use std::error::Error;
use std::path::PathBuf;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, Utc};
use log::{debug, info};

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::config_io::{self, CONFIG_FILE};
use crate::io::database::Database;
use crate::io::store::StoreError;
use crate::model::config::parse_utc_offset;
use crate::model::entity::{Entity, RecordId};
use crate::model::project::Project;
use crate::model::task::Task;
use crate::model::user::{Gender, PhoneNumber, User};
use crate::ops::agenda::{AgendaView, agenda, today_at};

type CmdResult = Result<(), Box<dyn Error>>;

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> CmdResult {
    let Cli {
        command,
        json,
        config,
        data_dir,
    } = cli;

    match command {
        Commands::Init(args) => cmd_init(args, config.as_deref()),
        Commands::User(cmd) => {
            let db = open_database(config.as_deref(), data_dir.as_deref())?;
            match cmd.action {
                UserAction::Add(args) => cmd_user_add(&db, args, json),
                UserAction::List => cmd_user_list(&db, json),
                UserAction::Show(args) => cmd_user_show(&db, args.id, json),
                UserAction::Rm(args) => cmd_user_rm(&db, args.id),
                UserAction::Check(args) => cmd_user_check(&db, args, json),
            }
        }
        Commands::Project(cmd) => {
            let db = open_database(config.as_deref(), data_dir.as_deref())?;
            match cmd.action {
                ProjectAction::Add(args) => cmd_project_add(&db, args, json),
                ProjectAction::List(args) => cmd_project_list(&db, args, json),
                ProjectAction::Rm(args) => cmd_project_rm(&db, args.id),
            }
        }
        Commands::Task(cmd) => {
            let db = open_database(config.as_deref(), data_dir.as_deref())?;
            match cmd.action {
                TaskAction::Add(args) => cmd_task_add(&db, args, json),
                TaskAction::List(args) => cmd_task_list(&db, args, json),
                TaskAction::Done(args) => cmd_task_done(&db, args.id),
                TaskAction::Edit(args) => cmd_task_edit(&db, args, json),
                TaskAction::Rm(args) => cmd_task_rm(&db, args.id),
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn open_database(config: Option<&str>, data_dir: Option<&str>) -> Result<Database, Box<dyn Error>> {
    let path = match config {
        Some(path) => PathBuf::from(path),
        None => std::env::current_dir()?.join(CONFIG_FILE),
    };
    let mut config = config_io::read_config(&path)?;
    if let Some(dir) = data_dir {
        config.data_dir = PathBuf::from(dir);
    }
    debug!(
        "config {} -> data dir {}",
        path.display(),
        config.data_dir.display()
    );
    Ok(Database::open(&config))
}

/// Print per-field problems on stderr, one `field: message` line each, and
/// reduce the error to the summary `main` prints.
fn rejected<T: Entity>(err: StoreError) -> Box<dyn Error> {
    let noun = T::COLLECTION.trim_end_matches('s');
    match err {
        StoreError::Validation(errors) => {
            for line in format_violations(&errors) {
                eprintln!("{}", line);
            }
            format!("{} not saved: {} invalid field(s)", noun, errors.fields().len()).into()
        }
        StoreError::Duplicate(fields) => {
            for field in &fields {
                eprintln!("{}", format_duplicate(field));
            }
            format!("{} not saved: value already taken", noun).into()
        }
        other => other.into(),
    }
}

fn print_json<S: serde::Serialize + ?Sized>(value: &S) -> CmdResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn parse_date(s: &str, what: &str) -> Result<NaiveDate, Box<dyn Error>> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| format!("invalid {} '{}' (expected YYYY-MM-DD)", what, s).into())
}

/// Midnight of `day` at `offset`
fn start_of_day(day: NaiveDate, offset: FixedOffset) -> Result<DateTime<FixedOffset>, Box<dyn Error>> {
    day.and_time(NaiveTime::MIN)
        .and_local_timezone(offset)
        .single()
        .ok_or_else(|| format!("cannot place {} at {}", day, offset).into())
}

fn require_user(db: &Database, username: &str) -> Result<User, Box<dyn Error>> {
    db.user_by_username(username)
        .ok_or_else(|| format!("no user named '{}'", username).into())
}

/// Offset a user's timestamps are recorded in: theirs, else the configured default.
fn offset_for(db: &Database, user: Option<&User>) -> FixedOffset {
    user.and_then(User::offset)
        .unwrap_or_else(|| db.config.default_offset())
}

fn now_at(offset: FixedOffset) -> DateTime<FixedOffset> {
    Utc::now().with_timezone(&offset)
}

fn not_found(kind: &str, id: RecordId) -> Box<dyn Error> {
    format!("no {} with id {}", kind, id).into()
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

fn cmd_user_add(db: &Database, args: UserAddArgs, json: bool) -> CmdResult {
    let phone = PhoneNumber::parse(&args.phone).ok_or_else(|| {
        format!(
            "invalid phone '{}' (expected REGION:CALLING_CODE:NUMBER, e.g. BD:880:01712345678)",
            args.phone
        )
    })?;
    let dob = parse_date(&args.dob, "date of birth")?;
    let gender = match args.gender.as_deref() {
        Some(g) => Some(Gender::parse(g).ok_or_else(|| format!("unknown gender '{}' (expected male or female)", g))?),
        None => None,
    };
    let timezone = args
        .timezone
        .unwrap_or_else(|| db.config.default_timezone.clone());
    // An unparsable timezone is reported by validation along with everything else
    let offset = parse_utc_offset(&timezone)
        .unwrap_or_else(|| db.config.default_offset());

    let mut user = User::new(
        args.name,
        dob,
        args.username,
        args.password,
        args.email,
        phone,
        timezone,
        now_at(offset),
    );
    user.gender = gender;

    let user = db.users.add(user).map_err(rejected::<User>)?;
    if json {
        print_json(&user_to_json(&user))
    } else {
        println!("{}", format_user_line(&user));
        Ok(())
    }
}

fn cmd_user_list(db: &Database, json: bool) -> CmdResult {
    let users = db.users.read_all();
    if json {
        let out: Vec<_> = users.iter().map(user_to_json).collect();
        return print_json(&out);
    }
    for user in &users {
        println!("{}", format_user_line(user));
    }
    Ok(())
}

fn cmd_user_show(db: &Database, id: RecordId, json: bool) -> CmdResult {
    let user = db.users.get_by_id(id).ok_or_else(|| not_found("user", id))?;
    if json {
        return print_json(&user_to_json(&user));
    }
    for line in format_user_detail(&user) {
        println!("{}", line);
    }
    Ok(())
}

fn cmd_user_rm(db: &Database, id: RecordId) -> CmdResult {
    let user = db.users.get_by_id(id).ok_or_else(|| not_found("user", id))?;
    let projects = db.projects_of(&user.username).len();
    let tasks = db.tasks_of(&user.username).len();
    if projects + tasks > 0 {
        return Err(format!(
            "user '{}' still owns {} project(s) and {} task(s)",
            user.username, projects, tasks
        )
        .into());
    }
    db.users.delete(id)?;
    println!("Removed user #{} {}", id, user.username);
    Ok(())
}

fn cmd_user_check(db: &Database, args: UserCheckArgs, json: bool) -> CmdResult {
    if User::unique_key(&args.field).is_none() {
        return Err(format!(
            "'{}' is not a unique field (expected username, email or phoneNumber)",
            args.field
        )
        .into());
    }
    // Phone numbers are compared in their canonical form
    let value = if args.field == "phoneNumber" {
        PhoneNumber::parse(&args.value)
            .ok_or_else(|| format!("invalid phone '{}'", args.value))?
            .to_string()
    } else {
        args.value
    };
    let taken = db.users.is_duplicate(&args.field, &value);
    if json {
        return print_json(&DuplicateProbeJson {
            field: &args.field,
            value,
            taken,
        });
    }
    if taken {
        println!("{}", format_duplicate(&args.field));
    } else {
        println!("{}: {} is available", args.field, value);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Projects
// ---------------------------------------------------------------------------

fn cmd_project_add(db: &Database, args: ProjectAddArgs, json: bool) -> CmdResult {
    let owner = require_user(db, &args.owner)?;
    let offset = offset_for(db, Some(&owner));
    let project = Project::new(args.title, owner.username, now_at(offset));
    let project = db.projects.add(project).map_err(rejected::<Project>)?;
    if json {
        return print_json(&project);
    }
    println!("{}", format_project_line(&project));
    Ok(())
}

fn cmd_project_list(db: &Database, args: OwnerFilter, json: bool) -> CmdResult {
    let projects = match args.owner.as_deref() {
        Some(owner) => db.projects_of(owner),
        None => db.projects.read_all(),
    };
    if json {
        return print_json(&projects);
    }
    for project in &projects {
        println!("{}", format_project_line(project));
    }
    Ok(())
}

/// Deleting a project moves its tasks back to their owner's inbox.
fn cmd_project_rm(db: &Database, id: RecordId) -> CmdResult {
    let project = db
        .projects
        .get_by_id(id)
        .ok_or_else(|| not_found("project", id))?;
    db.tasks
        .update_matching(
            |t| t.bound_to_project == Some(id),
            |t| t.bound_to_project = None,
        )
        .map_err(rejected::<Task>)?;
    db.projects.delete(id)?;
    info!("removed project #{} ({})", id, project.title);
    println!("Removed project #{} {}", id, project.title);
    Ok(())
}

// ---------------------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------------------

fn cmd_task_add(db: &Database, args: TaskAddArgs, json: bool) -> CmdResult {
    let owner = require_user(db, &args.owner)?;
    let offset = offset_for(db, Some(&owner));

    let mut task = Task::new(args.title, owner.username.clone(), now_at(offset));
    if let Some(project_id) = args.project {
        let project = db
            .projects
            .get_by_id(project_id)
            .ok_or_else(|| not_found("project", project_id))?;
        if project.bound_to_user != owner.username {
            return Err(format!(
                "project #{} belongs to '{}', not '{}'",
                project_id, project.bound_to_user, owner.username
            )
            .into());
        }
        task = task.with_project(project_id);
    }
    if let Some(desc) = args.description {
        task = task.with_description(desc);
    }
    if let Some(due) = args.due.as_deref() {
        task = task.with_due_date(start_of_day(parse_date(due, "due date")?, offset)?);
    }

    let task = db.tasks.add(task).map_err(rejected::<Task>)?;
    if json {
        return print_json(&task);
    }
    println!("{}", format_task_line(&task));
    Ok(())
}

fn cmd_task_list(db: &Database, args: TaskListArgs, json: bool) -> CmdResult {
    let owner = require_user(db, &args.owner)?;
    let offset = offset_for(db, Some(&owner));
    let today = today_at(Utc::now(), &offset);
    let tasks = db.tasks_of(&owner.username);

    if let Some(view) = args.view {
        let selected = agenda(&tasks, view, today, &offset);
        if json {
            return print_json(&selected);
        }
        for task in selected {
            for line in format_task_detail(task) {
                println!("{}", line);
            }
        }
        return Ok(());
    }

    if json {
        let view = |v| agenda(&tasks, v, today, &offset);
        return print_json(&DashboardJson {
            inbox: view(AgendaView::Inbox),
            today: view(AgendaView::Today),
            upcoming: view(AgendaView::Upcoming),
            overdue: view(AgendaView::Overdue),
            completed: view(AgendaView::Completed),
        });
    }

    let mut first = true;
    for view in AgendaView::ALL {
        let selected = agenda(&tasks, view, today, &offset);
        if selected.is_empty() {
            continue;
        }
        if !first {
            println!();
        }
        first = false;
        println!("{}", format_view_header(view.name(), selected.len()));
        for task in selected {
            for line in format_task_detail(task) {
                println!("{}", line);
            }
        }
    }
    Ok(())
}

fn cmd_task_done(db: &Database, id: RecordId) -> CmdResult {
    let mut task = db.tasks.get_by_id(id).ok_or_else(|| not_found("task", id))?;
    if task.completed {
        println!("{} (already done)", format_task_line(&task));
        return Ok(());
    }
    task.completed = true;
    db.tasks.update(&task).map_err(rejected::<Task>)?;
    println!("{}", format_task_line(&task));
    Ok(())
}

fn cmd_task_edit(db: &Database, args: TaskEditArgs, json: bool) -> CmdResult {
    let mut task = db
        .tasks
        .get_by_id(args.id)
        .ok_or_else(|| not_found("task", args.id))?;
    if let Some(title) = args.title {
        task.title = title;
    }
    if let Some(desc) = args.description {
        task.description = Some(desc).filter(|d| !d.is_empty());
    }
    if let Some(due) = args.due.as_deref() {
        if due.is_empty() {
            task.due_date = None;
        } else {
            let owner = db.user_by_username(&task.bound_to_user);
            let offset = offset_for(db, owner.as_ref());
            task.due_date = Some(start_of_day(parse_date(due, "due date")?, offset)?);
        }
    }
    if args.reopen {
        task.completed = false;
    }

    db.tasks.update(&task).map_err(rejected::<Task>)?;
    if json {
        return print_json(&task);
    }
    for line in format_task_detail(&task) {
        println!("{}", line);
    }
    Ok(())
}

fn cmd_task_rm(db: &Database, id: RecordId) -> CmdResult {
    if !db.tasks.delete(id)? {
        return Err(not_found("task", id));
    }
    println!("Removed task #{}", id);
    Ok(())
}

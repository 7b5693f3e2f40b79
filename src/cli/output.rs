use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::Serialize;

use crate::model::entity::{RecordId, ValidationErrors};
use crate::model::project::{Project, STATUS_ACTIVE, STATUS_ARCHIVED};
use crate::model::task::Task;
use crate::model::user::{Gender, PhoneNumber, USER_ACTIVE, USER_SUSPENDED, User};

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

/// A user as printed by `--json`. The password never leaves the store.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserJson<'a> {
    pub user_id: RecordId,
    pub name: &'a str,
    pub username: &'a str,
    pub email: &'a str,
    pub phone_number: &'a PhoneNumber,
    pub date_of_birth: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    pub timezone: &'a str,
    pub added_at: DateTime<FixedOffset>,
    pub status: u8,
}

#[derive(Serialize)]
pub struct DashboardJson<'a> {
    pub inbox: Vec<&'a Task>,
    pub today: Vec<&'a Task>,
    pub upcoming: Vec<&'a Task>,
    pub overdue: Vec<&'a Task>,
    pub completed: Vec<&'a Task>,
}

#[derive(Serialize)]
pub struct DuplicateProbeJson<'a> {
    pub field: &'a str,
    pub value: String,
    pub taken: bool,
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

pub fn user_to_json(user: &User) -> UserJson<'_> {
    UserJson {
        user_id: user.user_id,
        name: &user.name,
        username: &user.username,
        email: &user.email,
        phone_number: &user.phone_number,
        date_of_birth: user.date_of_birth,
        gender: user.gender,
        timezone: &user.timezone,
        added_at: user.added_at,
        status: user.status,
    }
}

// ---------------------------------------------------------------------------
// Human-readable formatting
// ---------------------------------------------------------------------------

fn user_status_name(status: u8) -> &'static str {
    match status {
        USER_ACTIVE => "active",
        USER_SUSPENDED => "suspended",
        _ => "inactive",
    }
}

fn record_status_name(status: u8) -> &'static str {
    match status {
        STATUS_ACTIVE => "active",
        STATUS_ARCHIVED => "archived",
        _ => "deleted",
    }
}

fn gender_name(gender: Gender) -> &'static str {
    match gender {
        Gender::Male => "male",
        Gender::Female => "female",
    }
}

fn format_timestamp(at: &DateTime<FixedOffset>) -> String {
    at.format("%Y-%m-%d %H:%M %:z").to_string()
}

/// One-line account summary
pub fn format_user_line(user: &User) -> String {
    format!(
        "#{} {}  {} <{}>",
        user.user_id, user.username, user.name, user.email
    )
}

/// Every field of an account except the password
pub fn format_user_detail(user: &User) -> Vec<String> {
    let mut lines = vec![format!("#{} {}", user.user_id, user.username)];
    lines.push(format!("name: {}", user.name));
    lines.push(format!("email: {}", user.email));
    lines.push(format!(
        "phone: {} ({})",
        user.phone_number, user.phone_number.country_code
    ));
    lines.push(format!("born: {}", user.date_of_birth));
    if let Some(gender) = user.gender {
        lines.push(format!("gender: {}", gender_name(gender)));
    }
    lines.push(format!("timezone: {}", user.timezone));
    lines.push(format!("added: {}", format_timestamp(&user.added_at)));
    lines.push(format!("status: {}", user_status_name(user.status)));
    lines
}

pub fn format_project_line(project: &Project) -> String {
    let status = if project.status == STATUS_ACTIVE {
        String::new()
    } else {
        format!(" [{}]", record_status_name(project.status))
    };
    format!(
        "#{} {} ({}){}",
        project.project_id, project.title, project.bound_to_user, status
    )
}

/// `[x] #3 Title  due:2024-05-10  project:#1`
pub fn format_task_line(task: &Task) -> String {
    let check = if task.completed { 'x' } else { ' ' };
    let mut line = format!("[{}] #{} {}", check, task.task_id, task.title);
    if let Some(due) = &task.due_date {
        line.push_str(&format!("  due:{}", due.format("%Y-%m-%d")));
    }
    if let Some(project) = task.bound_to_project {
        line.push_str(&format!("  project:#{}", project));
    }
    line
}

/// Task line followed by its description, indented
pub fn format_task_detail(task: &Task) -> Vec<String> {
    let mut lines = vec![format_task_line(task)];
    if let Some(desc) = task.description.as_deref().filter(|d| !d.is_empty()) {
        for line in desc.lines() {
            lines.push(format!("    {}", line));
        }
    }
    lines
}

/// Dashboard section header
pub fn format_view_header(name: &str, count: usize) -> String {
    format!("== {} ({}) ==", name, count)
}

/// One `field: message` line per violation
pub fn format_violations(errors: &ValidationErrors) -> Vec<String> {
    errors.iter().map(|v| v.to_string()).collect()
}

/// `field: message` for a unique field that is already held
pub fn format_duplicate(field: &str) -> String {
    let message = match field {
        "username" => "Username already exists".to_string(),
        "email" => "Email address already exists".to_string(),
        "phoneNumber" => "Phone number already exists".to_string(),
        other => format!("{} already exists", other),
    };
    format!("{}: {}", field, message)
}

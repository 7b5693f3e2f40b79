use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::model::entity::{Entity, RecordId, ValidationContext, Violation};
use crate::model::project::{STATUS_ACTIVE, STATUS_ARCHIVED, STATUS_DELETED, owner_rules};
use crate::ops::validate::Rules;

/// A to-do item, optionally filed under a project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub task_id: RecordId,
    /// Parent project, `None` for inbox tasks
    #[serde(default)]
    pub bound_to_project: Option<RecordId>,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub due_date: Option<DateTime<FixedOffset>>,
    pub add_date: DateTime<FixedOffset>,
    #[serde(default)]
    pub completed: bool,
    /// Username of the owner
    pub bound_to_user: String,
    pub status: u8,
}

impl Task {
    /// Build an unsaved, active, open task created at `add_date`.
    pub fn new(
        title: impl Into<String>,
        owner: impl Into<String>,
        add_date: DateTime<FixedOffset>,
    ) -> Self {
        Task {
            task_id: 0,
            bound_to_project: None,
            title: title.into(),
            description: None,
            due_date: None,
            add_date,
            completed: false,
            bound_to_user: owner.into(),
            status: STATUS_ACTIVE,
        }
    }

    pub fn with_project(mut self, project: RecordId) -> Self {
        self.bound_to_project = Some(project);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_due_date(mut self, due: DateTime<FixedOffset>) -> Self {
        self.due_date = Some(due);
        self
    }
}

impl Entity for Task {
    const COLLECTION: &'static str = "tasks";

    fn id(&self) -> RecordId {
        self.task_id
    }

    fn set_id(&mut self, id: RecordId) {
        self.task_id = id;
    }

    fn validate(&self, ctx: &ValidationContext) -> Vec<Violation> {
        let mut rules = Rules::new();
        rules.not_blank("title", &self.title, "Task title cannot be blank");
        owner_rules(&mut rules, &self.bound_to_user);
        rules.past_or_present(
            "addDate",
            &self.add_date,
            ctx.now,
            "Task creation date should be in the past",
        );
        if let Some(due) = &self.due_date {
            // Calendar days, in the creation offset
            let due_day = due.with_timezone(self.add_date.offset()).date_naive();
            rules.check(
                "dueDate",
                due_day >= self.add_date.date_naive(),
                "Due date cannot be before the creation date",
            );
        }
        rules.range(
            "status",
            i64::from(self.status),
            i64::from(STATUS_DELETED),
            i64::from(STATUS_ARCHIVED),
            "Invalid status",
        );
        rules.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn ctx() -> ValidationContext {
        ValidationContext::new(Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap(), 13)
    }

    fn dhaka(d: u32, h: u32) -> DateTime<FixedOffset> {
        FixedOffset::east_opt(6 * 3600)
            .unwrap()
            .with_ymd_and_hms(2024, 5, d, h, 0, 0)
            .unwrap()
    }

    #[test]
    fn valid_task() {
        let t = Task::new("Buy milk", "alice", dhaka(10, 15)).with_due_date(dhaka(10, 0));
        assert!(t.validate(&ctx()).is_empty());
    }

    #[test]
    fn due_before_creation_day() {
        let t = Task::new("Buy milk", "alice", dhaka(10, 15)).with_due_date(dhaka(9, 23));
        let violations = t.validate(&ctx());
        assert_eq!(violations, vec![Violation::new(
            "dueDate",
            "Due date cannot be before the creation date"
        )]);
    }

    #[test]
    fn missing_optional_fields_deserialize() {
        let json = r#"{
            "taskId": 4,
            "title": "Walk dog",
            "addDate": "2024-05-10T09:00:00+06:00",
            "boundToUser": "alice",
            "status": 1
        }"#;
        let t: Task = serde_json::from_str(json).unwrap();
        assert_eq!(t.id(), 4);
        assert_eq!(t.bound_to_project, None);
        assert_eq!(t.description, None);
        assert!(!t.completed);
    }

    #[test]
    fn status_out_of_range() {
        let mut t = Task::new("Buy milk", "alice", dhaka(10, 15));
        t.status = 5;
        let violations = t.validate(&ctx());
        assert_eq!(violations[0].field, "status");
    }
}

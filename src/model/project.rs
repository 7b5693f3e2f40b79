use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::model::entity::{Entity, RecordId, ValidationContext, Violation};
use crate::ops::validate::{Rules, USERNAME_MAX, USERNAME_MIN, USERNAME_RE};

/// Shared by projects and tasks
pub const STATUS_DELETED: u8 = 0;
pub const STATUS_ACTIVE: u8 = 1;
pub const STATUS_ARCHIVED: u8 = 2;

/// A named group of tasks owned by one user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub project_id: RecordId,
    pub title: String,
    /// Username of the owner
    pub bound_to_user: String,
    pub added_at: DateTime<FixedOffset>,
    pub status: u8,
}

impl Project {
    pub fn new(
        title: impl Into<String>,
        owner: impl Into<String>,
        added_at: DateTime<FixedOffset>,
    ) -> Self {
        Project {
            project_id: 0,
            title: title.into(),
            bound_to_user: owner.into(),
            added_at,
            status: STATUS_ACTIVE,
        }
    }
}

impl Entity for Project {
    const COLLECTION: &'static str = "projects";

    fn id(&self) -> RecordId {
        self.project_id
    }

    fn set_id(&mut self, id: RecordId) {
        self.project_id = id;
    }

    fn validate(&self, ctx: &ValidationContext) -> Vec<Violation> {
        let mut rules = Rules::new();
        rules.not_blank("title", &self.title, "Project title cannot be blank");
        owner_rules(&mut rules, &self.bound_to_user);
        rules
            .past_or_present(
                "addedAt",
                &self.added_at,
                ctx.now,
                "Project creation date should be in the past",
            )
            .range(
                "status",
                i64::from(self.status),
                i64::from(STATUS_DELETED),
                i64::from(STATUS_ARCHIVED),
                "Invalid status",
            );
        rules.finish()
    }
}

/// Rules for a `boundToUser` reference
pub(crate) fn owner_rules(rules: &mut Rules, owner: &str) {
    rules
        .not_blank("boundToUser", owner, "Owner username cannot be blank")
        .length(
            "boundToUser",
            owner,
            USERNAME_MIN,
            USERNAME_MAX,
            "Username should be at least 4 characters long and less than 30",
        )
        .pattern(
            "boundToUser",
            owner,
            &USERNAME_RE,
            "Username can only contain letters (a-z) and digits (0-9)",
        );
}

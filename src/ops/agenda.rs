use chrono::{DateTime, FixedOffset, NaiveDate, Utc};

use crate::model::project::STATUS_DELETED;
use crate::model::task::Task;

/// A dashboard slice of one user's tasks
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum AgendaView {
    /// Open tasks not filed under any project
    Inbox,
    /// Open tasks due today
    Today,
    /// Open tasks due after today
    Upcoming,
    /// Open tasks due before today
    Overdue,
    /// Finished tasks
    Completed,
}

impl AgendaView {
    /// Dashboard order
    pub const ALL: [AgendaView; 5] = [
        AgendaView::Inbox,
        AgendaView::Today,
        AgendaView::Upcoming,
        AgendaView::Overdue,
        AgendaView::Completed,
    ];

    pub fn name(self) -> &'static str {
        match self {
            AgendaView::Inbox => "inbox",
            AgendaView::Today => "today",
            AgendaView::Upcoming => "upcoming",
            AgendaView::Overdue => "overdue",
            AgendaView::Completed => "completed",
        }
    }

    /// Whether `task` belongs in this view. `today` and `offset` are the
    /// viewer's calendar day and UTC offset.
    pub fn matches(self, task: &Task, today: NaiveDate, offset: &FixedOffset) -> bool {
        if task.status == STATUS_DELETED {
            return false;
        }
        let open = !task.completed;
        let due = due_day(task, offset);
        match self {
            AgendaView::Inbox => open && task.bound_to_project.is_none(),
            AgendaView::Today => open && due.is_some_and(|d| d == today),
            AgendaView::Upcoming => open && due.is_some_and(|d| d > today),
            AgendaView::Overdue => open && due.is_some_and(|d| d < today),
            AgendaView::Completed => task.completed,
        }
    }
}

/// The calendar day `now` falls on at `offset`.
pub fn today_at(now: DateTime<Utc>, offset: &FixedOffset) -> NaiveDate {
    now.with_timezone(offset).date_naive()
}

fn due_day(task: &Task, offset: &FixedOffset) -> Option<NaiveDate> {
    task.due_date.map(|d| d.with_timezone(offset).date_naive())
}

/// Tasks in `view`, soonest due first; tasks without a due date last, by id.
pub fn agenda<'a>(
    tasks: &'a [Task],
    view: AgendaView,
    today: NaiveDate,
    offset: &FixedOffset,
) -> Vec<&'a Task> {
    let mut out: Vec<&Task> = tasks
        .iter()
        .filter(|t| view.matches(t, today, offset))
        .collect();
    out.sort_by_key(|t| (t.due_date.is_none(), t.due_date, t.task_id));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn dhaka() -> FixedOffset {
        FixedOffset::east_opt(6 * 3600).unwrap()
    }

    fn task(id: u32, due: Option<(u32, u32)>) -> Task {
        let added = dhaka().with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
        let mut t = Task::new(format!("t{id}"), "alice", added);
        t.task_id = id;
        t.due_date = due.map(|(d, h)| dhaka().with_ymd_and_hms(2024, 5, d, h, 0, 0).unwrap());
        t
    }

    fn ids(tasks: &[&Task]) -> Vec<u32> {
        tasks.iter().map(|t| t.task_id).collect()
    }

    #[test]
    fn date_views_split_on_local_day() {
        let today = NaiveDate::from_ymd_opt(2024, 5, 10).unwrap();
        let tasks = vec![
            task(0, Some((9, 12))),
            task(1, Some((10, 0))),
            task(2, Some((10, 23))),
            task(3, Some((12, 8))),
            task(4, None),
        ];
        assert_eq!(ids(&agenda(&tasks, AgendaView::Overdue, today, &dhaka())), vec![0]);
        assert_eq!(ids(&agenda(&tasks, AgendaView::Today, today, &dhaka())), vec![1, 2]);
        assert_eq!(ids(&agenda(&tasks, AgendaView::Upcoming, today, &dhaka())), vec![3]);
    }

    #[test]
    fn offset_moves_the_day_boundary() {
        // Midnight on the 10th in Dhaka is still the 9th in UTC
        let t = task(0, Some((10, 0)));
        let utc = FixedOffset::east_opt(0).unwrap();
        let day9 = NaiveDate::from_ymd_opt(2024, 5, 9).unwrap();
        assert!(AgendaView::Today.matches(&t, day9, &utc));
        assert!(!AgendaView::Today.matches(&t, day9, &dhaka()));
    }

    #[test]
    fn inbox_and_completed() {
        let today = NaiveDate::from_ymd_opt(2024, 5, 10).unwrap();
        let mut filed = task(0, None).with_project(3);
        filed.completed = true;
        let loose = task(1, None);
        let mut removed = task(2, None);
        removed.status = STATUS_DELETED;
        let tasks = vec![filed, loose, removed];
        assert_eq!(ids(&agenda(&tasks, AgendaView::Inbox, today, &dhaka())), vec![1]);
        assert_eq!(ids(&agenda(&tasks, AgendaView::Completed, today, &dhaka())), vec![0]);
    }

    #[test]
    fn completed_tasks_are_never_overdue() {
        let today = NaiveDate::from_ymd_opt(2024, 5, 10).unwrap();
        let mut done = task(0, Some((2, 9)));
        done.completed = true;
        assert!(!AgendaView::Overdue.matches(&done, today, &dhaka()));
    }

    #[test]
    fn today_at_uses_offset() {
        let now = Utc.with_ymd_and_hms(2024, 5, 9, 20, 0, 0).unwrap();
        assert_eq!(today_at(now, &dhaka()), NaiveDate::from_ymd_opt(2024, 5, 10).unwrap());
    }
}

use std::collections::HashSet;
use std::fs;

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, TimeZone, Utc};
use pretty_assertions::assert_eq;
use questlog::model::{PhoneNumber, Project, Task, User};
use questlog::{AppConfig, Database, RecordStore, StoreError};
use tempfile::TempDir;

fn utc_now() -> DateTime<FixedOffset> {
    let utc = FixedOffset::east_opt(0).unwrap();
    (Utc::now() - Duration::minutes(1)).with_timezone(&utc)
}

fn user(username: &str, email: &str, phone: &str) -> User {
    User::new(
        "Alice Liddell",
        NaiveDate::from_ymd_opt(1995, 3, 14).unwrap(),
        username,
        "s3cret!Pass",
        email,
        PhoneNumber::parse(phone).unwrap(),
        "+00:00",
        utc_now(),
    )
}

fn titles(tasks: &[Task]) -> Vec<(u32, &str)> {
    tasks.iter().map(|t| (t.task_id, t.title.as_str())).collect()
}

#[test]
fn buy_milk_walk_dog_and_duplicate_alice() {
    let tmp = TempDir::new().unwrap();
    let db = Database::open_in(tmp.path(), &AppConfig::default());

    let milk = db.tasks.add(Task::new("Buy milk", "alice", utc_now())).unwrap();
    let dog = db.tasks.add(Task::new("Walk dog", "alice", utc_now())).unwrap();
    assert_eq!((milk.task_id, dog.task_id), (0, 1));

    db.users
        .add(user("alice", "alice@example.com", "BD:880:01712345678"))
        .unwrap();
    let err = db
        .users
        .add(user("alice", "other@example.com", "BD:880:01812345678"))
        .unwrap_err();
    match err {
        StoreError::Duplicate(fields) => assert_eq!(fields, vec!["username"]),
        other => panic!("expected duplicate, got {other:?}"),
    }
    let alices = db.users.find(|u| u.username == "alice");
    assert_eq!(alices.len(), 1);

    assert!(db.tasks.delete(0).unwrap());
    assert_eq!(titles(&db.tasks.read_all()), vec![(1, "Walk dog")]);
}

#[test]
fn identifiers_are_monotonic_and_never_collide() {
    let tmp = TempDir::new().unwrap();
    let store: RecordStore<Task> = RecordStore::in_dir(tmp.path(), &AppConfig::default());

    let mut expected = 0;
    for round in 0..4 {
        for n in 0..3 {
            let task = store
                .add(Task::new(format!("t{round}-{n}"), "alice", utc_now()))
                .unwrap();
            assert_eq!(task.task_id, expected);
            expected += 1;
        }
        // Drop a record from the middle; the max, and so the next id, stays put
        let middle = store.read_all()[1].task_id;
        store.delete(middle).unwrap();
    }

    let ids: Vec<u32> = store.read_all().iter().map(|t| t.task_id).collect();
    let unique: HashSet<u32> = ids.iter().copied().collect();
    assert_eq!(unique.len(), ids.len());
}

#[test]
fn rewriting_what_was_read_is_a_no_op() {
    let tmp = TempDir::new().unwrap();
    let db = Database::open_in(tmp.path(), &AppConfig::default());
    let at = FixedOffset::east_opt(6 * 3600)
        .unwrap()
        .with_ymd_and_hms(2024, 5, 1, 9, 30, 0)
        .unwrap();
    db.projects.add(Project::new("Garden", "alice", at)).unwrap();
    db.tasks
        .add(
            Task::new("Weed", "alice", at)
                .with_project(0)
                .with_description("beds by the fence")
                .with_due_date(at + Duration::days(3)),
        )
        .unwrap();

    for path in [db.projects.path(), db.tasks.path()] {
        let before = fs::read_to_string(path).unwrap();
        match path.file_name().and_then(|n| n.to_str()) {
            Some("projects.json") => db.projects.write_all(&db.projects.read_all()).unwrap(),
            _ => db.tasks.write_all(&db.tasks.read_all()).unwrap(),
        }
        assert_eq!(fs::read_to_string(path).unwrap(), before);
    }
}

#[test]
fn missing_and_empty_documents_read_as_empty() {
    let tmp = TempDir::new().unwrap();
    let db = Database::open_in(&tmp.path().join("never-created"), &AppConfig::default());
    assert!(db.users.read_all().is_empty());
    assert_eq!(db.users.next_id(), Some(0));
    assert!(!db.users.is_duplicate("username", &"alice"));
    assert!(!db.users.delete(3).unwrap());
    assert!(!tmp.path().join("never-created").exists());
}

#[test]
fn update_keeps_identity_and_uniqueness() {
    let tmp = TempDir::new().unwrap();
    let db = Database::open_in(tmp.path(), &AppConfig::default());
    let mut alice = db
        .users
        .add(user("alice", "alice@example.com", "BD:880:01712345678"))
        .unwrap();
    let bob = db
        .users
        .add(user("bobby", "bob@example.com", "BD:880:01812345678"))
        .unwrap();

    alice.email = "liddell@example.com".into();
    db.users.update(&alice).unwrap();
    assert_eq!(db.users.get_by_id(0).unwrap().email, "liddell@example.com");

    let mut clash = bob.clone();
    clash.phone_number = alice.phone_number.clone();
    match db.users.update(&clash).unwrap_err() {
        StoreError::Duplicate(fields) => assert_eq!(fields, vec!["phoneNumber"]),
        other => panic!("expected duplicate, got {other:?}"),
    }
    assert_eq!(db.users.get_by_id(1).unwrap(), bob);
    assert!(db.users.is_duplicate("phoneNumber", &alice.phone_number));
}

#[test]
fn validation_gate_reports_every_field() {
    let tmp = TempDir::new().unwrap();
    let db = Database::open_in(tmp.path(), &AppConfig::default());
    let mut task = Task::new(" ", "No Such User", utc_now());
    task.status = 7;
    match db.tasks.add(task).unwrap_err() {
        StoreError::Validation(errors) => {
            assert_eq!(errors.fields(), vec!["title", "boundToUser", "status"]);
        }
        other => panic!("expected validation failure, got {other:?}"),
    }
    assert!(!db.tasks.path().exists());
}

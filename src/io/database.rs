use std::path::Path;

use crate::io::store::RecordStore;
use crate::model::config::AppConfig;
use crate::model::project::Project;
use crate::model::task::Task;
use crate::model::user::User;

/// The three collections of one data directory.
pub struct Database {
    pub config: AppConfig,
    pub users: RecordStore<User>,
    pub projects: RecordStore<Project>,
    pub tasks: RecordStore<Task>,
}

impl Database {
    /// Open the stores under `config.data_dir`. Nothing is created on disk
    /// until the first write.
    pub fn open(config: &AppConfig) -> Self {
        Self::open_in(&config.data_dir, config)
    }

    pub fn open_in(dir: &Path, config: &AppConfig) -> Self {
        Database {
            config: config.clone(),
            users: RecordStore::in_dir(dir, config),
            projects: RecordStore::in_dir(dir, config),
            tasks: RecordStore::in_dir(dir, config),
        }
    }

    pub fn user_by_username(&self, username: &str) -> Option<User> {
        self.users
            .read_all()
            .into_iter()
            .find(|u| u.username == username)
    }

    pub fn projects_of(&self, username: &str) -> Vec<Project> {
        self.projects.find(|p| p.bound_to_user == username)
    }

    pub fn tasks_of(&self, username: &str) -> Vec<Task> {
        self.tasks.find(|t| t.bound_to_user == username)
    }
}

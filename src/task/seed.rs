use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::task::{Priority, Task, TaskStore};

/// Shape of the seed document: `{ "tasks": [ ... ] }`. The field may be
/// absent, in which case the store starts empty.
#[derive(Debug, Deserialize)]
struct SeedFile {
    #[serde(default)]
    tasks: Vec<SeedTask>,
}

/// A task record as it appears in the seed file. Legacy records may lack
/// `completed`, `priority` or `createdAt`; those are normalized at load time.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SeedTask {
    id: u32,
    title: String,
    description: String,
    #[serde(default)]
    completed: bool,
    priority: Option<Priority>,
    created_at: Option<DateTime<Utc>>,
}

impl SeedTask {
    fn into_task(self, loaded_at: DateTime<Utc>) -> Task {
        Task {
            id: self.id,
            title: self.title,
            description: self.description,
            completed: self.completed,
            priority: self.priority.unwrap_or_default(),
            // Backfilled load-time approximation for legacy records.
            created_at: self.created_at.unwrap_or(loaded_at),
        }
    }
}

/// Reads and parses the seed file into a ready-to-serve store. Errors are
/// returned to the caller, which is expected to fail soft by starting with an
/// empty store.
pub fn load_store(path: &Path) -> anyhow::Result<TaskStore> {
    let contents = fs::read_to_string(path)?;
    parse_store(&contents)
}

fn parse_store(contents: &str) -> anyhow::Result<TaskStore> {
    let seed: SeedFile = serde_json::from_str(contents)?;
    let loaded_at = Utc::now();
    let tasks = seed
        .tasks
        .into_iter()
        .map(|task| task.into_task(loaded_at))
        .collect();
    Ok(TaskStore::from_tasks(tasks))
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub mod seed;
pub mod web;

/// A single task record as held by the store and serialized to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: u32,
    pub title: String,
    pub description: String,
    pub completed: bool,
    pub priority: Priority,
    /// Assigned once at creation and never mutated afterwards.
    pub created_at: DateTime<Utc>,
}

/// Task priority. Serialized in lowercase on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    /// Parses a lowercase priority name. Returns `None` for anything outside
    /// the fixed set, including differently-cased spellings.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "low" => Some(Priority::Low),
            "medium" => Some(Priority::Medium),
            "high" => Some(Priority::High),
            _ => None,
        }
    }
}

/// A validated create/update payload. `title` and `description` are already
/// trimmed; `completed` and `priority` are `None` when the client omitted
/// them, so the store can tell "not provided" apart from an explicit value.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskPayload {
    pub title: String,
    pub description: String,
    pub completed: Option<bool>,
    pub priority: Option<Priority>,
}

/// In-memory collection of tasks plus the id generator.
///
/// Insertion order is preserved and observable through `all`, so the backing
/// collection is a `Vec` rather than a map.
#[derive(Debug)]
pub struct TaskStore {
    tasks: Vec<Task>,
    next_id: u32,
}

impl Default for TaskStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskStore {
    pub fn new() -> Self {
        Self {
            tasks: Vec::new(),
            next_id: 1,
        }
    }

    /// Adopts pre-existing tasks (from the seed file) and initializes the id
    /// generator to one past the highest id seen, or 1 for an empty seed.
    pub fn from_tasks(tasks: Vec<Task>) -> Self {
        let next_id = tasks.iter().map(|task| task.id).max().unwrap_or(0) + 1;
        Self { tasks, next_id }
    }

    /// Returns all tasks in store order.
    pub fn all(&self) -> &[Task] {
        &self.tasks
    }

    pub fn find(&self, id: u32) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    /// Creates a task from a validated payload, applying the creation
    /// defaults (`completed = false`, `priority = medium`, `createdAt = now`)
    /// and assigning the next id.
    pub fn create(&mut self, payload: TaskPayload) -> Task {
        let task = Task {
            id: self.next_id,
            title: payload.title,
            description: payload.description,
            completed: payload.completed.unwrap_or(false),
            priority: payload.priority.unwrap_or_default(),
            created_at: Utc::now(),
        };
        self.next_id += 1;
        self.tasks.push(task.clone());
        task
    }

    /// Updates a task in place. Title and description are always replaced;
    /// `completed` and `priority` only when the payload carries them. `id`
    /// and `createdAt` are immutable.
    pub fn update(&mut self, id: u32, payload: TaskPayload) -> Option<Task> {
        let task = self.tasks.iter_mut().find(|task| task.id == id)?;
        task.title = payload.title;
        task.description = payload.description;
        if let Some(completed) = payload.completed {
            task.completed = completed;
        }
        if let Some(priority) = payload.priority {
            task.priority = priority;
        }
        Some(task.clone())
    }

    /// Removes a task and returns its last known value. The id is never
    /// handed out again.
    pub fn remove(&mut self, id: u32) -> Option<Task> {
        let index = self.tasks.iter().position(|task| task.id == id)?;
        Some(self.tasks.remove(index))
    }
}

//! File-backed task store.
//!
//! The store owns the authoritative task set, persisted as a pretty-printed
//! JSON array. Every operation is a full reload-mutate-rewrite cycle under a
//! single mutex, so operations observe a total order and no in-memory cache
//! survives between calls. Whole-file rewrite on every mutation is a
//! documented scalability limit of this design, not an accident.

use crate::error::{StoreError, StoreResult};
use crate::types::{Task, TaskId, now_iso};
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Outcome of one delivery attempt, recorded back onto the task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    Delivered,
    Failed(String),
}

/// What [`TaskStore::mark_outcome`] did with an outcome write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkResult {
    /// Outcome recorded.
    Applied,
    /// Failure message already on the task; file left untouched.
    AlreadyRecorded,
    /// Task was edited after the scheduler's snapshot; outcome dropped so the
    /// edited revision stays eligible for delivery.
    StaleRevision,
    /// Task no longer exists; outcome dropped.
    Missing,
}

struct StoreFile {
    path: PathBuf,
    /// Highest id assigned during this process run. Keeps ids strictly
    /// increasing even when the task holding the current maximum is removed.
    last_id: TaskId,
}

impl StoreFile {
    fn load(&self) -> StoreResult<Vec<Task>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let raw = fs::read_to_string(&self.path).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| StoreError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    fn save(&self, tasks: &[Task]) -> StoreResult<()> {
        let raw = serde_json::to_string_pretty(tasks).map_err(StoreError::Encode)?;
        fs::write(&self.path, raw).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })
    }
}

/// Handle to the task file. Cloning shares the underlying mutex, so all
/// clones (connection handlers and the scheduler) serialize through one
/// critical section.
#[derive(Clone)]
pub struct TaskStore {
    file: Arc<Mutex<StoreFile>>,
}

impl TaskStore {
    /// Open the store at the given path.
    ///
    /// A missing file is an empty store (first run). An unreadable or
    /// unparsable file is a fatal error.
    pub fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let mut file = StoreFile {
            path: path.into(),
            last_id: 0,
        };
        let tasks = file.load()?;
        file.last_id = tasks.iter().map(|t| t.id).max().unwrap_or(0);
        debug!(path = %file.path.display(), tasks = tasks.len(), "task store opened");
        Ok(Self {
            file: Arc::new(Mutex::new(file)),
        })
    }

    /// Append a new task with the next id. Ids only grow: one greater than
    /// the current maximum, 1 for an empty store, never reused after removal.
    pub fn add(&self, description: &str, date: &str, time: &str, phone: &str) -> StoreResult<Task> {
        let mut file = self.file.lock().unwrap();
        let mut tasks = file.load()?;
        let id = tasks
            .iter()
            .map(|t| t.id)
            .max()
            .unwrap_or(0)
            .max(file.last_id)
            + 1;
        file.last_id = id;
        let task = Task {
            id,
            description: description.to_string(),
            date: date.to_string(),
            time: time.to_string(),
            phone: phone.to_string(),
            sent: false,
            created_at: now_iso(),
            updated_at: None,
            sent_at: None,
            error: None,
        };
        tasks.push(task.clone());
        file.save(&tasks)?;
        Ok(task)
    }

    /// All tasks in storage (insertion) order.
    pub fn list(&self) -> StoreResult<Vec<Task>> {
        let file = self.file.lock().unwrap();
        file.load()
    }

    /// Replace the mutable fields of a task. Resets `sent` unconditionally,
    /// so the edited task becomes eligible for delivery again. Returns
    /// `false` if the id does not exist.
    pub fn edit(
        &self,
        id: TaskId,
        description: &str,
        date: &str,
        time: &str,
        phone: &str,
    ) -> StoreResult<bool> {
        let file = self.file.lock().unwrap();
        let mut tasks = file.load()?;
        let Some(task) = tasks.iter_mut().find(|t| t.id == id) else {
            return Ok(false);
        };
        task.description = description.to_string();
        task.date = date.to_string();
        task.time = time.to_string();
        task.phone = phone.to_string();
        task.sent = false;
        task.sent_at = None;
        task.updated_at = Some(now_iso());
        file.save(&tasks)?;
        Ok(true)
    }

    /// Delete a task by id. Returns whether anything was removed; the file is
    /// only rewritten when a deletion occurred.
    pub fn remove(&self, id: TaskId) -> StoreResult<bool> {
        let file = self.file.lock().unwrap();
        let mut tasks = file.load()?;
        let before = tasks.len();
        tasks.retain(|t| t.id != id);
        if tasks.len() == before {
            return Ok(false);
        }
        file.save(&tasks)?;
        Ok(true)
    }

    /// Record a delivery outcome for the task the scheduler scanned.
    ///
    /// `seen` is the snapshot the scheduler acted on. The write is dropped if
    /// the task was removed in the meantime, or if it was edited (revision
    /// guard: a success write must not mark an edited task as sent).
    /// Identical repeated failure messages are not rewritten every tick.
    pub fn mark_outcome(&self, seen: &Task, outcome: SendOutcome) -> StoreResult<MarkResult> {
        let file = self.file.lock().unwrap();
        let mut tasks = file.load()?;
        let Some(task) = tasks.iter_mut().find(|t| t.id == seen.id) else {
            return Ok(MarkResult::Missing);
        };
        if !task.same_revision(seen) {
            return Ok(MarkResult::StaleRevision);
        }
        match outcome {
            SendOutcome::Delivered => {
                task.sent = true;
                task.sent_at = Some(now_iso());
                task.error = None;
            }
            SendOutcome::Failed(message) => {
                if task.error.as_deref() == Some(message.as_str()) {
                    return Ok(MarkResult::AlreadyRecorded);
                }
                task.sent = false;
                task.error = Some(message);
            }
        }
        file.save(&tasks)?;
        Ok(MarkResult::Applied)
    }
}

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Utc};

use super::types::{Task, TaskId};
use crate::error::{StoreError, TransitionError};

pub type TaskMutation<'a> = Box<dyn FnOnce(&mut Task) -> Result<(), TransitionError> + Send + 'a>;

/// Where tasks live between submission and eviction.
///
/// `update` applies a mutation atomically with respect to readers: a `get`
/// sees the task either before or after the whole mutation, never halfway.
/// A mutation that returns an error leaves the stored task untouched.
pub trait TaskStore: Send + Sync {
    fn insert(&self, task: Task) -> Result<(), StoreError>;

    fn get(&self, id: &TaskId) -> Result<Option<Task>, StoreError>;

    fn update(&self, id: &TaskId, mutation: TaskMutation<'_>) -> Result<Task, StoreError>;

    /// Newest first.
    fn list(&self, limit: usize) -> Result<Vec<Task>, StoreError>;

    /// Drops terminal tasks last touched before `cutoff`. Returns how many went.
    fn evict_finished(&self, cutoff: DateTime<Utc>) -> Result<usize, StoreError>;
}

pub struct InMemoryTaskStore {
    tasks: RwLock<HashMap<TaskId, Task>>,
}

impl InMemoryTaskStore {
    pub fn new() -> Self {
        Self {
            tasks: RwLock::new(HashMap::new()),
        }
    }

    pub fn len(&self) -> usize {
        match self.tasks.read() {
            Ok(map) => map.len(),
            Err(_) => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryTaskStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskStore for InMemoryTaskStore {
    fn insert(&self, task: Task) -> Result<(), StoreError> {
        let mut map = self.tasks.write().map_err(|_| StoreError::Poisoned)?;
        if map.contains_key(&task.id) {
            return Err(StoreError::Duplicate(task.id.to_string()));
        }
        map.insert(task.id.clone(), task);
        Ok(())
    }

    fn get(&self, id: &TaskId) -> Result<Option<Task>, StoreError> {
        let map = self.tasks.read().map_err(|_| StoreError::Poisoned)?;
        Ok(map.get(id).cloned())
    }

    fn update(&self, id: &TaskId, mutation: TaskMutation<'_>) -> Result<Task, StoreError> {
        let mut map = self.tasks.write().map_err(|_| StoreError::Poisoned)?;
        let task = map
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        let mut draft = task.clone();
        mutation(&mut draft)?;
        *task = draft;
        Ok(task.clone())
    }

    fn list(&self, limit: usize) -> Result<Vec<Task>, StoreError> {
        let map = self.tasks.read().map_err(|_| StoreError::Poisoned)?;
        let mut items: Vec<Task> = map.values().cloned().collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        if items.len() > limit {
            items.truncate(limit);
        }
        Ok(items)
    }

    fn evict_finished(&self, cutoff: DateTime<Utc>) -> Result<usize, StoreError> {
        let mut map = self.tasks.write().map_err(|_| StoreError::Poisoned)?;
        let before = map.len();
        map.retain(|_, task| !(task.status.is_terminal() && task.updated_at < cutoff));
        Ok(before - map.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::TaskStatus;
    use chrono::Duration;

    #[test]
    fn test_insert_and_get() {
        let store = InMemoryTaskStore::new();
        let task = Task::new("Artist A", "Song B");
        let id = task.id.clone();
        store.insert(task).unwrap();
        let found = store.get(&id).unwrap().unwrap();
        assert_eq!(found.artist, "Artist A");
        assert!(store.get(&TaskId::from("missing")).unwrap().is_none());
    }

    #[test]
    fn test_duplicate_insert_rejected() {
        let store = InMemoryTaskStore::new();
        let task = Task::new("Artist A", "Song B");
        store.insert(task.clone()).unwrap();
        assert!(matches!(store.insert(task), Err(StoreError::Duplicate(_))));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_failed_mutation_leaves_task_untouched() {
        let store = InMemoryTaskStore::new();
        let task = Task::new("Artist A", "Song B");
        let id = task.id.clone();
        store.insert(task).unwrap();
        store.update(&id, Box::new(|t: &mut Task| t.fail("boom"))).unwrap();

        let err = store
            .update(
                &id,
                Box::new(|t: &mut Task| {
                    t.step = "scribbled".to_string();
                    t.fail("again")
                }),
            )
            .unwrap_err();
        assert!(matches!(err, StoreError::Transition(_)));

        let task = store.get(&id).unwrap().unwrap();
        assert_eq!(task.step, "Failed");
        assert_eq!(task.error.as_deref(), Some("boom"));
    }

    #[test]
    fn test_update_unknown_task() {
        let store = InMemoryTaskStore::new();
        let err = store
            .update(&TaskId::from("nope"), Box::new(|t: &mut Task| t.fail("x")))
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[test]
    fn test_list_newest_first_with_limit() {
        let store = InMemoryTaskStore::new();
        for idx in 0..5 {
            let mut task = Task::new("Artist", &format!("Song {}", idx));
            task.created_at = task.created_at + Duration::seconds(idx);
            store.insert(task).unwrap();
        }
        let items = store.list(3).unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].title, "Song 4");
        assert_eq!(items[2].title, "Song 2");
    }

    #[test]
    fn test_evict_only_old_terminal_tasks() {
        let store = InMemoryTaskStore::new();

        let mut old_done = Task::new("A", "old done");
        old_done.fail("x").unwrap();
        old_done.updated_at = Utc::now() - Duration::hours(2);
        let mut old_running = Task::new("A", "old running");
        old_running.updated_at = Utc::now() - Duration::hours(2);
        let mut fresh_done = Task::new("A", "fresh done");
        fresh_done.fail("y").unwrap();

        store.insert(old_done).unwrap();
        store.insert(old_running.clone()).unwrap();
        store.insert(fresh_done).unwrap();

        let evicted = store.evict_finished(Utc::now() - Duration::hours(1)).unwrap();
        assert_eq!(evicted, 1);
        assert_eq!(store.len(), 2);
        let kept = store.get(&old_running.id).unwrap().unwrap();
        assert_eq!(kept.status, TaskStatus::Searching);
    }
}

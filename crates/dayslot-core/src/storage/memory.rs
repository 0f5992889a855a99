//! Volatile in-process stores for tasks, blocks and events.
//!
//! Nothing here survives a restart. Scheduling never reads the stores
//! directly: callers take a [`Stores::snapshot`] and hand the owned vectors
//! to the pipeline.

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use indexmap::IndexMap;

use crate::error::{CoreError, Result};
use crate::schedule::{Block, DayData, Event, Task};

/// Something stored by id.
pub trait Entity: Clone {
    /// Human-readable kind, used in lookup errors.
    const KIND: &'static str;

    fn id(&self) -> &str;
}

impl Entity for Task {
    const KIND: &'static str = "task";

    fn id(&self) -> &str {
        Task::id(self)
    }
}

impl Entity for Block {
    const KIND: &'static str = "block";

    fn id(&self) -> &str {
        Block::id(self)
    }
}

impl Entity for Event {
    const KIND: &'static str = "event";

    fn id(&self) -> &str {
        Event::id(self)
    }
}

/// Keyed collection of entities.
pub trait Repository<T: Entity>: Send + Sync {
    /// All entities in insertion order.
    fn list(&self) -> Vec<T>;

    fn get(&self, id: &str) -> Option<T>;

    /// Insert or replace; returns the replaced entity.
    fn put(&self, entity: T) -> Option<T>;

    /// Remove by id.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NotFound`] if no entity has this id.
    fn delete(&self, id: &str) -> Result<T>;

    /// Drop everything and insert `entities` (import semantics).
    fn replace_all(&self, entities: Vec<T>);
}

/// [`Repository`] backed by an insertion-ordered map behind a lock.
#[derive(Debug)]
pub struct MemoryRepository<T> {
    items: RwLock<IndexMap<String, T>>,
}

impl<T> Default for MemoryRepository<T> {
    fn default() -> Self {
        Self {
            items: RwLock::new(IndexMap::new()),
        }
    }
}

impl<T> MemoryRepository<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    // A panic while holding the lock cannot leave the map half-updated, so a
    // poisoned lock is still safe to use.
    fn read(&self) -> RwLockReadGuard<'_, IndexMap<String, T>> {
        self.items.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, IndexMap<String, T>> {
        self.items.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T: Entity + Send + Sync> Repository<T> for MemoryRepository<T> {
    fn list(&self) -> Vec<T> {
        self.read().values().cloned().collect()
    }

    fn get(&self, id: &str) -> Option<T> {
        self.read().get(id).cloned()
    }

    fn put(&self, entity: T) -> Option<T> {
        self.write().insert(entity.id().to_string(), entity)
    }

    fn delete(&self, id: &str) -> Result<T> {
        self.write()
            .shift_remove(id)
            .ok_or_else(|| CoreError::NotFound {
                kind: T::KIND,
                id: id.to_string(),
            })
    }

    fn replace_all(&self, entities: Vec<T>) {
        let mut items = self.write();
        items.clear();
        for entity in entities {
            items.insert(entity.id().to_string(), entity);
        }
    }
}

/// The three stores a scheduling call reads from.
#[derive(Debug, Default)]
pub struct Stores {
    pub tasks: MemoryRepository<Task>,
    pub blocks: MemoryRepository<Block>,
    pub events: MemoryRepository<Event>,
}

impl Stores {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores pre-filled from validated input.
    pub fn from_data(data: DayData) -> Self {
        let stores = Self::new();
        stores.tasks.replace_all(data.tasks);
        stores.blocks.replace_all(data.blocks);
        stores.events.replace_all(data.events);
        stores
    }

    /// Copy the current contents for one scheduling call.
    pub fn snapshot(&self) -> DayData {
        DayData {
            tasks: self.tasks.list(),
            events: self.events.list(),
            blocks: self.blocks.list(),
        }
    }
}

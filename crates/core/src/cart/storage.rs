//! Storage backends for persisted carts.
//!
//! Storage is a flat string key/value space, like browser local storage.
//! [`SharedCartStorage`] models several tabs over one storage area: every
//! write is announced on a broadcast channel so the other stores can reload.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use thiserror::Error;
use tokio::sync::broadcast;
use uuid::Uuid;

/// Capacity of the storage change channel.
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Errors raised by a storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Underlying file operation failed.
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Storage is unusable (e.g., a poisoned lock).
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

impl<T> From<PoisonError<T>> for StorageError {
    fn from(_: PoisonError<T>) -> Self {
        Self::Unavailable("storage lock poisoned".to_owned())
    }
}

/// A string key/value store that holds serialized carts.
pub trait CartStorage {
    /// Read the value stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    fn load(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Overwrite the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    fn save(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Whether `event` was produced by this storage handle's own write.
    fn is_own_event(&self, _event: &StorageEvent) -> bool {
        false
    }
}

/// Identifies the writer behind a [`StorageEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WriterId(Uuid);

impl WriterId {
    fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

/// Announcement that a key changed in shared storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageEvent {
    pub key: String,
    pub writer: WriterId,
}

/// Private in-memory storage for a single store.
#[derive(Debug, Default)]
pub struct MemoryCartStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryCartStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create storage pre-filled with `value` under `key`.
    #[must_use]
    pub fn with_entry(key: &str, value: &str) -> Self {
        let storage = Self::new();
        if let Ok(mut entries) = storage.entries.lock() {
            entries.insert(key.to_owned(), value.to_owned());
        }
        storage
    }
}

impl CartStorage for MemoryCartStorage {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.lock()?.get(key).cloned())
    }

    fn save(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.lock()?.insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

impl<S: CartStorage + ?Sized> CartStorage for Arc<S> {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).load(key)
    }

    fn save(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).save(key, value)
    }

    fn is_own_event(&self, event: &StorageEvent) -> bool {
        (**self).is_own_event(event)
    }
}

/// Storage area shared between several stores, with change notifications.
#[derive(Debug, Clone)]
pub struct SharedCartStorage {
    entries: Arc<Mutex<HashMap<String, String>>>,
    events: broadcast::Sender<StorageEvent>,
}

impl Default for SharedCartStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl SharedCartStorage {
    #[must_use]
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            entries: Arc::default(),
            events,
        }
    }

    /// Open a new writer handle (one per tab).
    #[must_use]
    pub fn handle(&self) -> SharedCartHandle {
        SharedCartHandle {
            shared: self.clone(),
            writer: WriterId::generate(),
        }
    }

    /// Receive change events for every write made through any handle.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<StorageEvent> {
        self.events.subscribe()
    }
}

/// A single writer's view of a [`SharedCartStorage`].
#[derive(Debug, Clone)]
pub struct SharedCartHandle {
    shared: SharedCartStorage,
    writer: WriterId,
}

impl SharedCartHandle {
    #[must_use]
    pub const fn writer(&self) -> WriterId {
        self.writer
    }

    /// Receive change events for the shared area.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<StorageEvent> {
        self.shared.subscribe()
    }
}

impl CartStorage for SharedCartHandle {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.shared.entries.lock()?.get(key).cloned())
    }

    fn save(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.shared
            .entries
            .lock()?
            .insert(key.to_owned(), value.to_owned());
        // No subscribers is not an error
        let _ = self.shared.events.send(StorageEvent {
            key: key.to_owned(),
            writer: self.writer,
        });
        Ok(())
    }

    fn is_own_event(&self, event: &StorageEvent) -> bool {
        event.writer == self.writer
    }
}

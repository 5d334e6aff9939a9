//! Storage port and the persistent collection layer on top of it.
//!
//! Each collection lives under one key as a JSON array. Loading is forgiving:
//! an absent key or a value that does not parse yields an empty collection.
//! Saving always rewrites the whole array.

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::database::DatabaseError;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
    #[error("Failed to encode collection '{key}': {source}")]
    Encode {
        key: String,
        source: serde_json::Error,
    },
}

/// Synchronous string key-value storage
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// Non-durable store backed by a map
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Key under which the selected background theme id is stored as a bare string
pub const BACKGROUND_THEME_KEY: &str = "backgroundTheme";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectionKey {
    Achievements,
    Plans,
    Ideas,
    Todos,
    Failures,
    FolderData,
    SidebarItems,
}

impl CollectionKey {
    pub const ALL: [CollectionKey; 7] = [
        CollectionKey::Achievements,
        CollectionKey::Plans,
        CollectionKey::Ideas,
        CollectionKey::Todos,
        CollectionKey::Failures,
        CollectionKey::FolderData,
        CollectionKey::SidebarItems,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            CollectionKey::Achievements => "achievements",
            CollectionKey::Plans => "plans",
            CollectionKey::Ideas => "ideas",
            CollectionKey::Todos => "todos",
            CollectionKey::Failures => "failures",
            CollectionKey::FolderData => "folderData",
            CollectionKey::SidebarItems => "sidebarItems",
        }
    }

    /// Collections whose records carry an id and a free-text content field
    pub fn holds_journal_records(self) -> bool {
        !matches!(self, CollectionKey::FolderData | CollectionKey::SidebarItems)
    }
}

impl fmt::Display for CollectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CollectionKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CollectionKey::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| {
                let known: Vec<&str> = CollectionKey::ALL.iter().map(|k| k.as_str()).collect();
                format!("unknown collection '{}' (expected one of: {})", s, known.join(", "))
            })
    }
}

/// Load a collection. Missing keys and unparseable values both come back empty.
pub fn load_collection<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: CollectionKey,
) -> Result<Vec<T>, StoreError> {
    let Some(raw) = store.get(key.as_str())? else {
        return Ok(Vec::new());
    };

    match serde_json::from_str::<Vec<T>>(&raw) {
        Ok(items) => Ok(items),
        Err(err) => {
            tracing::warn!(
                collection = key.as_str(),
                error = %err,
                "stored collection is malformed, treating it as empty"
            );
            Ok(Vec::new())
        }
    }
}

/// Overwrite a collection with the given records
pub fn save_collection<T: Serialize>(
    store: &dyn KeyValueStore,
    key: CollectionKey,
    items: &[T],
) -> Result<(), StoreError> {
    let json = serde_json::to_string(items).map_err(|source| StoreError::Encode {
        key: key.as_str().to_string(),
        source,
    })?;
    store.set(key.as_str(), &json)?;
    tracing::debug!(collection = key.as_str(), records = items.len(), "collection saved");
    Ok(())
}

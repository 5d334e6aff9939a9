use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::folders::FolderStore;
use crate::models::{FolderData, SidebarItem, folder_path};
use crate::storage::{CollectionKey, KeyValueStore, StoreError, load_collection, save_collection};

/// Labels of the built-in sections; custom folders may not reuse them
pub const RESERVED_LABELS: [&str; 3] = ["今日成就", "明日计划", "灵感记录"];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LabelError {
    #[error("Folder name must not be empty")]
    Empty,
    #[error("Folder name already exists: {0}")]
    Duplicate(String),
    #[error("Folder name is reserved for a built-in section: {0}")]
    Reserved(String),
}

/// What happens to a folder's items when its sidebar entry is removed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrphanPolicy {
    /// Leave the folder data in place, unreachable from navigation
    #[default]
    Keep,
    /// Delete the folder data together with the entry
    Cascade,
}

/// Check a new folder label against the built-in sections and existing
/// entries. Comparison is exact and case-sensitive.
pub fn validate_label(label: &str, existing: &[SidebarItem]) -> Result<(), LabelError> {
    if label.is_empty() {
        return Err(LabelError::Empty);
    }
    if existing.iter().any(|item| item.label == label) {
        return Err(LabelError::Duplicate(label.to_string()));
    }
    if RESERVED_LABELS.contains(&label) {
        return Err(LabelError::Reserved(label.to_string()));
    }
    Ok(())
}

/// User-created navigation entries. The registry stores whatever it is given;
/// callers run [`validate_label`] before adding.
pub struct SidebarRegistry<'a> {
    store: &'a dyn KeyValueStore,
    items: Vec<SidebarItem>,
}

impl<'a> SidebarRegistry<'a> {
    pub fn load(store: &'a dyn KeyValueStore) -> Result<Self, StoreError> {
        let items = load_collection(store, CollectionKey::SidebarItems)?;
        Ok(Self { store, items })
    }

    pub fn items(&self) -> &[SidebarItem] {
        &self.items
    }

    pub fn find_by_label(&self, label: &str) -> Option<&SidebarItem> {
        self.items.iter().find(|item| item.label == label)
    }

    fn persist(&self) -> Result<(), StoreError> {
        save_collection(self.store, CollectionKey::SidebarItems, &self.items)
    }

    pub fn add_item(&mut self, label: &str, icon: &str) -> Result<SidebarItem, StoreError> {
        let item = SidebarItem::new(label.to_string(), icon.to_string());
        self.items.push(item.clone());
        self.persist()?;
        tracing::debug!(label, id = %item.id, "sidebar entry added");
        Ok(item)
    }

    /// Remove an entry by id. Folder data under its label is not touched.
    pub fn remove_item(&mut self, id: &str) -> Result<Option<SidebarItem>, StoreError> {
        let Some(index) = self.items.iter().position(|item| item.id == id) else {
            return Ok(None);
        };
        let removed = self.items.remove(index);
        self.persist()?;
        Ok(Some(removed))
    }

    /// Change an entry's label and/or icon. A new label also moves the path.
    pub fn update_item(
        &mut self,
        id: &str,
        label: Option<&str>,
        icon: Option<&str>,
    ) -> Result<bool, StoreError> {
        let Some(item) = self.items.iter_mut().find(|item| item.id == id) else {
            return Ok(false);
        };
        if let Some(label) = label {
            item.label = label.to_string();
            item.path = folder_path(label);
        }
        if let Some(icon) = icon {
            item.icon = icon.to_string();
        }
        self.persist()?;
        Ok(true)
    }

    /// Remove every custom entry. Folder data is left as it is.
    pub fn reset_to_default(&mut self) -> Result<usize, StoreError> {
        let cleared = self.items.len();
        self.items.clear();
        self.persist()?;
        tracing::debug!(cleared, "sidebar reset");
        Ok(cleared)
    }

    /// Remove an entry and apply the orphan policy to the folder data filed
    /// under its label. Returns the removed entry and, under
    /// [`OrphanPolicy::Cascade`], the removed folder data.
    pub fn remove_with_policy(
        &mut self,
        id: &str,
        folders: &mut FolderStore<'_>,
        policy: OrphanPolicy,
    ) -> Result<Option<(SidebarItem, Option<FolderData>)>, StoreError> {
        let Some(removed) = self.remove_item(id)? else {
            return Ok(None);
        };
        let dropped = match policy {
            OrphanPolicy::Keep => None,
            OrphanPolicy::Cascade => folders.remove_folder(&removed.label)?,
        };
        Ok(Some((removed, dropped)))
    }
}

/// Folder data whose name matches no sidebar entry
pub fn orphaned_folders<'f>(folders: &'f [FolderData], entries: &[SidebarItem]) -> Vec<&'f FolderData> {
    folders
        .iter()
        .filter(|f| !entries.iter().any(|e| e.label == f.folder_name))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::models::FolderItemKind;
    use crate::storage::MemoryStore;
    use chrono::{TimeZone, Utc};

    fn clock() -> FixedClock {
        FixedClock::new(Utc.with_ymd_and_hms(2024, 6, 1, 10, 0, 0).unwrap())
    }

    #[test]
    fn label_validation_rules() {
        let existing = vec![SidebarItem::new("Projects".to_string(), "Star".to_string())];
        assert_eq!(validate_label("", &existing), Err(LabelError::Empty));
        assert_eq!(
            validate_label("Projects", &existing),
            Err(LabelError::Duplicate("Projects".to_string()))
        );
        assert_eq!(
            validate_label("明日计划", &existing),
            Err(LabelError::Reserved("明日计划".to_string()))
        );
        assert_eq!(validate_label("projects", &existing), Ok(()));
    }

    #[test]
    fn registry_does_not_validate_on_its_own() {
        let store = MemoryStore::new();
        let mut sidebar = SidebarRegistry::load(&store).unwrap();
        sidebar.add_item("Projects", "Star").unwrap();
        sidebar.add_item("Projects", "Book").unwrap();
        assert_eq!(sidebar.items().len(), 2);
    }

    #[test]
    fn entries_persist_with_paths() {
        let store = MemoryStore::new();
        let mut sidebar = SidebarRegistry::load(&store).unwrap();
        let item = sidebar.add_item("Side Projects", "Target").unwrap();
        assert_eq!(item.path, "/folder/Side%20Projects");

        assert!(sidebar.update_item(&item.id, Some("Hobbies"), None).unwrap());
        assert!(!sidebar.update_item("missing", Some("x"), None).unwrap());

        let reloaded = SidebarRegistry::load(&store).unwrap();
        let entry = reloaded.find_by_label("Hobbies").unwrap();
        assert_eq!(entry.path, "/folder/Hobbies");
        assert_eq!(entry.icon, "Target");
    }

    #[test]
    fn removing_an_entry_orphans_its_folder_data() {
        let store = MemoryStore::new();
        let clock = clock();
        let mut sidebar = SidebarRegistry::load(&store).unwrap();
        let mut folders = FolderStore::load(&store, &clock).unwrap();

        let entry = sidebar.add_item("Projects", "Star").unwrap();
        folders.add_item("Projects", FolderItemKind::Note, "roadmap").unwrap();

        let removed = sidebar.remove_item(&entry.id).unwrap().unwrap();
        assert_eq!(removed.label, "Projects");
        assert!(sidebar.remove_item(&entry.id).unwrap().is_none());

        let folders = FolderStore::load(&store, &clock).unwrap();
        assert_eq!(folders.items("Projects")[0].content, "roadmap");

        let sidebar = SidebarRegistry::load(&store).unwrap();
        let orphans = orphaned_folders(folders.folders(), sidebar.items());
        assert_eq!(orphans.len(), 1);
        assert_eq!(orphans[0].folder_name, "Projects");
    }

    #[test]
    fn cascade_policy_deletes_matching_folder_data() {
        let store = MemoryStore::new();
        let clock = clock();
        let mut sidebar = SidebarRegistry::load(&store).unwrap();
        let mut folders = FolderStore::load(&store, &clock).unwrap();
        let entry = sidebar.add_item("Projects", "Star").unwrap();
        folders.add_item("Projects", FolderItemKind::Todo, "ship v1").unwrap();

        let (removed, dropped) = sidebar
            .remove_with_policy(&entry.id, &mut folders, OrphanPolicy::Cascade)
            .unwrap()
            .unwrap();
        assert_eq!(removed.id, entry.id);
        assert_eq!(dropped.unwrap().items.len(), 1);
        assert!(FolderStore::load(&store, &clock).unwrap().folder("Projects").is_none());
    }

    #[test]
    fn reset_clears_entries_but_not_folders() {
        let store = MemoryStore::new();
        let clock = clock();
        let mut sidebar = SidebarRegistry::load(&store).unwrap();
        let mut folders = FolderStore::load(&store, &clock).unwrap();
        sidebar.add_item("A", "Star").unwrap();
        sidebar.add_item("B", "Heart").unwrap();
        folders.add_item("A", FolderItemKind::Note, "kept").unwrap();

        assert_eq!(sidebar.reset_to_default().unwrap(), 2);
        assert!(SidebarRegistry::load(&store).unwrap().items().is_empty());
        assert_eq!(FolderStore::load(&store, &clock).unwrap().items("A").len(), 1);
    }
}

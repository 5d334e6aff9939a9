use crate::clock::Clock;
use crate::models::{FolderData, FolderItem, FolderItemKind};
use crate::storage::{CollectionKey, KeyValueStore, StoreError, load_collection, save_collection};
use crate::utils::normalize_content;

/// Items of every custom folder, keyed by folder name.
///
/// Lookups are by exact folder name. Operations on a folder or item that does
/// not exist do nothing and report `false`/`None`.
pub struct FolderStore<'a> {
    store: &'a dyn KeyValueStore,
    clock: &'a dyn Clock,
    folders: Vec<FolderData>,
}

impl<'a> FolderStore<'a> {
    pub fn load(store: &'a dyn KeyValueStore, clock: &'a dyn Clock) -> Result<Self, StoreError> {
        let folders = load_collection(store, CollectionKey::FolderData)?;
        Ok(Self { store, clock, folders })
    }

    pub fn folders(&self) -> &[FolderData] {
        &self.folders
    }

    pub fn folder(&self, folder_name: &str) -> Option<&FolderData> {
        self.folders.iter().find(|f| f.folder_name == folder_name)
    }

    /// Items of a folder, empty when the folder has none yet
    pub fn items(&self, folder_name: &str) -> &[FolderItem] {
        self.folder(folder_name)
            .map(|f| f.items.as_slice())
            .unwrap_or_default()
    }

    fn folder_mut(&mut self, folder_name: &str) -> Option<&mut FolderData> {
        self.folders.iter_mut().find(|f| f.folder_name == folder_name)
    }

    fn item_mut(&mut self, folder_name: &str, item_id: &str) -> Option<&mut FolderItem> {
        self.folder_mut(folder_name)?
            .items
            .iter_mut()
            .find(|item| item.id == item_id)
    }

    fn persist(&self) -> Result<(), StoreError> {
        save_collection(self.store, CollectionKey::FolderData, &self.folders)
    }

    /// Add a note or todo to a folder, creating the folder entry on first use.
    /// Blank content is ignored.
    pub fn add_item(
        &mut self,
        folder_name: &str,
        kind: FolderItemKind,
        content: &str,
    ) -> Result<Option<FolderItem>, StoreError> {
        let Some(content) = normalize_content(content) else {
            return Ok(None);
        };
        let item = FolderItem::new(kind, content, self.clock.timestamp());

        match self.folder_mut(folder_name) {
            Some(folder) => folder.items.push(item.clone()),
            None => {
                tracing::debug!(folder = folder_name, "creating folder data");
                let mut folder = FolderData::new(folder_name.to_string());
                folder.items.push(item.clone());
                self.folders.push(folder);
            }
        }

        self.persist()?;
        Ok(Some(item))
    }

    pub fn remove_item(&mut self, folder_name: &str, item_id: &str) -> Result<bool, StoreError> {
        let Some(folder) = self.folder_mut(folder_name) else {
            return Ok(false);
        };
        let before = folder.items.len();
        folder.items.retain(|item| item.id != item_id);
        if folder.items.len() == before {
            return Ok(false);
        }
        self.persist()?;
        Ok(true)
    }

    /// Flip a todo item's completion flag. Notes are left alone. Returns the
    /// new value, or None when nothing was toggled.
    pub fn toggle_todo(&mut self, folder_name: &str, item_id: &str) -> Result<Option<bool>, StoreError> {
        let Some(item) = self.item_mut(folder_name, item_id) else {
            return Ok(None);
        };
        if item.kind != FolderItemKind::Todo {
            return Ok(None);
        }
        let completed = !item.is_completed();
        item.completed = Some(completed);
        self.persist()?;
        Ok(Some(completed))
    }

    pub fn edit_item(&mut self, folder_name: &str, item_id: &str, content: &str) -> Result<bool, StoreError> {
        let Some(content) = normalize_content(content) else {
            return Ok(false);
        };
        let Some(item) = self.item_mut(folder_name, item_id) else {
            return Ok(false);
        };
        item.content = content;
        self.persist()?;
        Ok(true)
    }

    /// Drop a folder's data entirely. Used when a sidebar entry is removed
    /// under the cascade policy.
    pub fn remove_folder(&mut self, folder_name: &str) -> Result<Option<FolderData>, StoreError> {
        let Some(index) = self.folders.iter().position(|f| f.folder_name == folder_name) else {
            return Ok(None);
        };
        let removed = self.folders.remove(index);
        tracing::debug!(folder = folder_name, items = removed.items.len(), "folder data removed");
        self.persist()?;
        Ok(Some(removed))
    }
}

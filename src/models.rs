use chrono::{DateTime, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::clock::{new_id, timestamp_format};
use crate::storage::CollectionKey;

/// A journal record kept in its own collection
pub trait Record: Serialize + DeserializeOwned + Clone {
    const COLLECTION: CollectionKey;

    fn id(&self) -> &str;
    fn set_content(&mut self, content: String);
    fn created_at(&self) -> DateTime<Utc>;
}

/// Records filed under a calendar day chosen by the user
pub trait Dated: Record {
    fn date(&self) -> NaiveDate;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Achievement {
    pub id: String,
    pub date: NaiveDate,
    pub content: String,
    #[serde(with = "timestamp_format")]
    pub created_at: DateTime<Utc>,
    /// Fields written by other tools, carried through saves untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    pub id: String,
    pub date: NaiveDate,
    pub content: String,
    #[serde(with = "timestamp_format")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub completed: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Idea {
    pub id: String,
    pub content: String,
    #[serde(with = "timestamp_format")]
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: String,
    pub content: String,
    #[serde(with = "timestamp_format")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub completed: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Failure {
    pub id: String,
    pub date: NaiveDate,
    pub content: String,
    #[serde(with = "timestamp_format")]
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Achievement {
    pub fn new(date: NaiveDate, content: String, created_at: DateTime<Utc>) -> Self {
        Self {
            id: new_id(),
            date,
            content,
            created_at,
            extra: Map::new(),
        }
    }
}

impl Plan {
    pub fn new(date: NaiveDate, content: String, created_at: DateTime<Utc>) -> Self {
        Self {
            id: new_id(),
            date,
            content,
            created_at,
            completed: false,
            extra: Map::new(),
        }
    }
}

impl Idea {
    pub fn new(content: String, created_at: DateTime<Utc>) -> Self {
        Self {
            id: new_id(),
            content,
            created_at,
            extra: Map::new(),
        }
    }
}

impl Todo {
    pub fn new(content: String, created_at: DateTime<Utc>) -> Self {
        Self {
            id: new_id(),
            content,
            created_at,
            completed: false,
            extra: Map::new(),
        }
    }
}

impl Failure {
    pub fn new(date: NaiveDate, content: String, created_at: DateTime<Utc>) -> Self {
        Self {
            id: new_id(),
            date,
            content,
            created_at,
            extra: Map::new(),
        }
    }
}

macro_rules! impl_record {
    ($ty:ty, $key:expr) => {
        impl Record for $ty {
            const COLLECTION: CollectionKey = $key;

            fn id(&self) -> &str {
                &self.id
            }

            fn set_content(&mut self, content: String) {
                self.content = content;
            }

            fn created_at(&self) -> DateTime<Utc> {
                self.created_at
            }
        }
    };
}

impl_record!(Achievement, CollectionKey::Achievements);
impl_record!(Plan, CollectionKey::Plans);
impl_record!(Idea, CollectionKey::Ideas);
impl_record!(Todo, CollectionKey::Todos);
impl_record!(Failure, CollectionKey::Failures);

impl Dated for Achievement {
    fn date(&self) -> NaiveDate {
        self.date
    }
}

impl Dated for Plan {
    fn date(&self) -> NaiveDate {
        self.date
    }
}

impl Dated for Failure {
    fn date(&self) -> NaiveDate {
        self.date
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FolderItemKind {
    Note,
    Todo,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderItem {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: FolderItemKind,
    pub content: String,
    // only meaningful for todo items
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    #[serde(with = "timestamp_format")]
    pub created_at: DateTime<Utc>,
}

impl FolderItem {
    pub fn new(kind: FolderItemKind, content: String, created_at: DateTime<Utc>) -> Self {
        Self {
            id: new_id(),
            kind,
            content,
            completed: match kind {
                FolderItemKind::Todo => Some(false),
                FolderItemKind::Note => None,
            },
            created_at,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.completed.unwrap_or(false)
    }
}

/// Items filed under one custom folder. `folder_name` refers to a sidebar
/// label by value only; nothing enforces that the label still exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderData {
    pub id: String,
    pub folder_name: String,
    #[serde(default)]
    pub items: Vec<FolderItem>,
}

impl FolderData {
    pub fn new(folder_name: String) -> Self {
        Self {
            id: new_id(),
            folder_name,
            items: Vec::new(),
        }
    }
}

/// Icons offered for custom folders
pub const SIDEBAR_ICONS: [&str; 12] = [
    "Star", "Heart", "Book", "Calendar", "Music", "Image", "Film", "Coffee", "Smile", "Target",
    "Map", "Compass",
];

pub const DEFAULT_SIDEBAR_ICON: &str = "Star";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SidebarItem {
    pub id: String,
    pub label: String,
    #[serde(default = "default_icon", deserialize_with = "lenient_icon")]
    pub icon: String,
    #[serde(default)]
    pub path: String,
}

impl SidebarItem {
    pub fn new(label: String, icon: String) -> Self {
        let path = folder_path(&label);
        Self {
            id: new_id(),
            label,
            icon,
            path,
        }
    }

    /// Stored path, or the one derived from the label when none was saved
    pub fn route(&self) -> String {
        if self.path.is_empty() {
            folder_path(&self.label)
        } else {
            self.path.clone()
        }
    }
}

/// Navigation path for a custom folder label
pub fn folder_path(label: &str) -> String {
    format!("/folder/{}", urlencoding::encode(label))
}

fn default_icon() -> String {
    DEFAULT_SIDEBAR_ICON.to_string()
}

// Older data may hold a serialized component object instead of an icon name.
fn lenient_icon<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(name) if !name.is_empty() => name,
        _ => default_icon(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, h, 30, 0).unwrap()
    }

    #[test]
    fn plan_serializes_with_persisted_field_names() {
        let plan = Plan {
            id: "p1".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 5, 2).unwrap(),
            content: "Write report".to_string(),
            created_at: at(8),
            completed: false,
            extra: Map::new(),
        };
        let json = serde_json::to_value(&plan).unwrap();
        assert_eq!(json["createdAt"], "2024-05-01T08:30:00.000Z");
        assert_eq!(json["date"], "2024-05-02");
        assert_eq!(json["completed"], false);
    }

    #[test]
    fn reads_browser_style_timestamps() {
        let raw = r#"{"id":"t1","content":"call mom","createdAt":"2024-05-01T08:30:00.123Z","completed":true}"#;
        let todo: Todo = serde_json::from_str(raw).unwrap();
        assert!(todo.completed);
        assert_eq!(todo.created_at.timestamp_subsec_millis(), 123);
    }

    #[test]
    fn folder_item_type_field_round_trips() {
        let note = FolderItem::new(FolderItemKind::Note, "n".to_string(), at(9));
        let todo = FolderItem::new(FolderItemKind::Todo, "t".to_string(), at(9));

        let note_json = serde_json::to_value(&note).unwrap();
        assert_eq!(note_json["type"], "note");
        assert!(note_json.get("completed").is_none());

        let todo_json = serde_json::to_value(&todo).unwrap();
        assert_eq!(todo_json["type"], "todo");
        assert_eq!(todo_json["completed"], false);

        let back: FolderItem = serde_json::from_value(todo_json).unwrap();
        assert_eq!(back, todo);
    }

    #[test]
    fn sidebar_item_derives_encoded_path() {
        let item = SidebarItem::new("读书 笔记".to_string(), "Book".to_string());
        assert_eq!(item.path, "/folder/%E8%AF%BB%E4%B9%A6%20%E7%AC%94%E8%AE%B0");
    }

    #[test]
    fn sidebar_icon_falls_back_when_not_a_name() {
        let raw = r#"{"id":"s1","label":"Projects","icon":{"$$typeof":"forward_ref"},"path":"/folder/Projects"}"#;
        let item: SidebarItem = serde_json::from_str(raw).unwrap();
        assert_eq!(item.icon, "Star");

        let raw = r#"{"id":"s2","label":"Reading"}"#;
        let item: SidebarItem = serde_json::from_str(raw).unwrap();
        assert_eq!(item.icon, "Star");
        assert_eq!(item.path, "");
        assert_eq!(item.route(), "/folder/Reading");
    }
}

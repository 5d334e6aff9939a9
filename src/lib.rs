pub mod cli;
pub mod clock;
pub mod config;
pub mod database;
pub mod folders;
pub mod managers;
pub mod models;
pub mod sidebar;
pub mod storage;
pub mod theme;
pub mod utils;
pub mod views;
pub mod watch;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::Config;
pub use database::Database;
pub use folders::FolderStore;
pub use managers::{AchievementLog, FailureLog, IdeaBox, PlanBoard, PlanToggle, TodoList};
pub use models::{Achievement, Failure, FolderData, FolderItem, FolderItemKind, Idea, Plan, SidebarItem, Todo};
pub use sidebar::{OrphanPolicy, SidebarRegistry};
pub use storage::{CollectionKey, KeyValueStore, MemoryStore, StoreError};
pub use utils::Profile;

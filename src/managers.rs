//! Record-type managers.
//!
//! A [`Manager`] owns the in-memory copy of one collection. Every successful
//! mutation immediately rewrites the whole collection through the storage
//! port. Blank content and unknown ids are silent no-ops.

use chrono::{NaiveDate, TimeDelta};

use crate::clock::Clock;
use crate::models::{Achievement, Failure, Idea, Plan, Record, Todo};
use crate::storage::{CollectionKey, KeyValueStore, StoreError, load_collection, save_collection};
use crate::utils::normalize_content;
use crate::views::{self, DateGroup};

pub struct Manager<'a, T: Record> {
    store: &'a dyn KeyValueStore,
    clock: &'a dyn Clock,
    items: Vec<T>,
}

pub type AchievementLog<'a> = Manager<'a, Achievement>;
pub type PlanBoard<'a> = Manager<'a, Plan>;
pub type IdeaBox<'a> = Manager<'a, Idea>;
pub type TodoList<'a> = Manager<'a, Todo>;
pub type FailureLog<'a> = Manager<'a, Failure>;

impl<'a, T: Record> Manager<'a, T> {
    /// Load the collection from storage
    pub fn load(store: &'a dyn KeyValueStore, clock: &'a dyn Clock) -> Result<Self, StoreError> {
        let items = load_collection(store, T::COLLECTION)?;
        Ok(Self { store, clock, items })
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.items.iter().find(|item| item.id() == id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn persist(&self) -> Result<(), StoreError> {
        save_collection(self.store, T::COLLECTION, &self.items)
    }

    fn append(&mut self, record: T) -> Result<T, StoreError> {
        tracing::debug!(collection = T::COLLECTION.as_str(), id = record.id(), "record added");
        self.items.push(record.clone());
        self.persist()?;
        Ok(record)
    }

    /// Delete a record. Returns false when no record had that id.
    pub fn remove(&mut self, id: &str) -> Result<bool, StoreError> {
        let before = self.items.len();
        self.items.retain(|item| item.id() != id);
        if self.items.len() == before {
            return Ok(false);
        }
        tracing::debug!(collection = T::COLLECTION.as_str(), id, "record removed");
        self.persist()?;
        Ok(true)
    }

    /// Replace a record's content with the trimmed new content. Returns false
    /// when the content is blank or the id is unknown.
    pub fn edit(&mut self, id: &str, new_content: &str) -> Result<bool, StoreError> {
        let Some(content) = normalize_content(new_content) else {
            return Ok(false);
        };
        let Some(item) = self.items.iter_mut().find(|item| item.id() == id) else {
            return Ok(false);
        };
        item.set_content(content);
        tracing::debug!(collection = T::COLLECTION.as_str(), id, "record edited");
        self.persist()?;
        Ok(true)
    }
}

impl Manager<'_, Achievement> {
    pub fn add(&mut self, date: NaiveDate, content: &str) -> Result<Option<Achievement>, StoreError> {
        let Some(content) = normalize_content(content) else {
            return Ok(None);
        };
        let record = Achievement::new(date, content, self.clock.timestamp());
        self.append(record).map(Some)
    }

    pub fn streak(&self) -> u32 {
        views::streak(&self.items, self.clock.today())
    }

    pub fn grouped(&self) -> Vec<DateGroup<'_, Achievement>> {
        views::group_by_date_desc(&self.items)
    }
}

/// What toggling a plan did
#[derive(Debug, Clone, PartialEq)]
pub enum PlanToggle {
    /// The plan was completed and logged as this achievement
    Completed(Achievement),
    /// The plan was reopened; any achievement it produced stays
    Reopened,
}

impl Manager<'_, Plan> {
    pub fn add(&mut self, date: NaiveDate, content: &str) -> Result<Option<Plan>, StoreError> {
        let Some(content) = normalize_content(content) else {
            return Ok(None);
        };
        let record = Plan::new(date, content, self.clock.timestamp());
        self.append(record).map(Some)
    }

    /// Flip a plan's completion flag. Completing a plan also appends an
    /// achievement dated today to the achievements collection; the two writes
    /// are independent. Returns None for an unknown id.
    pub fn toggle_completed(&mut self, id: &str) -> Result<Option<PlanToggle>, StoreError> {
        let Some(plan) = self.items.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };

        if plan.completed {
            plan.completed = false;
            self.persist()?;
            tracing::debug!(id, "plan reopened");
            return Ok(Some(PlanToggle::Reopened));
        }

        plan.completed = true;
        let achievement = Achievement::new(
            self.clock.today(),
            plan.content.clone(),
            self.clock.timestamp(),
        );
        self.persist()?;

        let mut achievements: Vec<Achievement> =
            load_collection(self.store, CollectionKey::Achievements)?;
        achievements.push(achievement.clone());
        save_collection(self.store, CollectionKey::Achievements, &achievements)?;

        tracing::debug!(id, achievement = %achievement.id, "plan completed");
        Ok(Some(PlanToggle::Completed(achievement)))
    }

    pub fn grouped(&self) -> Vec<DateGroup<'_, Plan>> {
        views::group_by_date_asc(&self.items)
    }

    pub fn has_overdue(&self) -> bool {
        views::has_overdue_plans(&self.items, self.clock.today())
    }
}

impl Manager<'_, Idea> {
    pub fn add(&mut self, content: &str) -> Result<Option<Idea>, StoreError> {
        let Some(content) = normalize_content(content) else {
            return Ok(None);
        };
        let record = Idea::new(content, self.clock.timestamp());
        self.append(record).map(Some)
    }

    pub fn newest_first(&self) -> Vec<&Idea> {
        views::newest_first(&self.items)
    }
}

impl Manager<'_, Todo> {
    pub fn add(&mut self, content: &str) -> Result<Option<Todo>, StoreError> {
        let Some(content) = normalize_content(content) else {
            return Ok(None);
        };
        let record = Todo::new(content, self.clock.timestamp());
        self.append(record).map(Some)
    }

    /// Mark a todo done. There is no way back through this call.
    pub fn complete(&mut self, id: &str) -> Result<bool, StoreError> {
        let Some(todo) = self.items.iter_mut().find(|t| t.id == id) else {
            return Ok(false);
        };
        todo.completed = true;
        tracing::debug!(id, "todo completed");
        self.persist()?;
        Ok(true)
    }

    /// Flip the completion flag, returning the new value
    pub fn toggle_completed(&mut self, id: &str) -> Result<Option<bool>, StoreError> {
        let Some(todo) = self.items.iter_mut().find(|t| t.id == id) else {
            return Ok(None);
        };
        todo.completed = !todo.completed;
        let completed = todo.completed;
        self.persist()?;
        Ok(Some(completed))
    }

    pub fn active(&self, limit: TimeDelta) -> Vec<&Todo> {
        views::active_todos(&self.items, self.clock.now(), limit)
    }

    pub fn countdowns(&self, limit: TimeDelta) -> Vec<views::TodoCountdown<'_>> {
        views::todo_countdowns(&self.items, self.clock.now(), limit)
    }

    /// Delete open todos whose time box has run out. Completed todos are kept.
    pub fn purge_expired(&mut self, limit: TimeDelta) -> Result<usize, StoreError> {
        let now = self.clock.now();
        let before = self.items.len();
        self.items
            .retain(|t| t.completed || views::is_todo_active(t, now, limit));
        let purged = before - self.items.len();
        if purged > 0 {
            tracing::debug!(purged, "expired todos purged");
            self.persist()?;
        }
        Ok(purged)
    }
}

impl Manager<'_, Failure> {
    pub fn add(&mut self, date: NaiveDate, content: &str) -> Result<Option<Failure>, StoreError> {
        let Some(content) = normalize_content(content) else {
            return Ok(None);
        };
        let record = Failure::new(date, content, self.clock.timestamp());
        self.append(record).map(Some)
    }

    pub fn grouped(&self) -> Vec<DateGroup<'_, Failure>> {
        views::group_by_date_desc(&self.items)
    }
}

/// Rewrite the content of one record in any journal collection, addressed by
/// collection key and id. Returns `Ok(None)` for collections that do not hold
/// journal records.
pub fn edit_in_collection(
    store: &dyn KeyValueStore,
    clock: &dyn Clock,
    key: CollectionKey,
    id: &str,
    content: &str,
) -> Result<Option<bool>, StoreError> {
    let edited = match key {
        CollectionKey::Achievements => AchievementLog::load(store, clock)?.edit(id, content)?,
        CollectionKey::Plans => PlanBoard::load(store, clock)?.edit(id, content)?,
        CollectionKey::Ideas => IdeaBox::load(store, clock)?.edit(id, content)?,
        CollectionKey::Todos => TodoList::load(store, clock)?.edit(id, content)?,
        CollectionKey::Failures => FailureLog::load(store, clock)?.edit(id, content)?,
        CollectionKey::FolderData | CollectionKey::SidebarItems => return Ok(None),
    };
    Ok(Some(edited))
}

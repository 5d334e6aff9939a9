use chrono::{NaiveDate, TimeDelta};
use clap::{Parser, Subcommand};
use std::io::{self, Write};
use thiserror::Error;

use crate::clock::Clock;
use crate::config::Config;
use crate::folders::FolderStore;
use crate::managers::{
    AchievementLog, FailureLog, IdeaBox, PlanBoard, PlanToggle, TodoList, edit_in_collection,
};
use crate::models::{DEFAULT_SIDEBAR_ICON, FolderItemKind, SIDEBAR_ICONS};
use crate::sidebar::{LabelError, OrphanPolicy, SidebarRegistry, orphaned_folders, validate_label};
use crate::storage::{CollectionKey, KeyValueStore, StoreError};
use crate::theme::{self, BACKGROUND_THEMES, ThemeError};
use crate::utils::parse_date;
use crate::views::{self, PlanDay};
use crate::watch::{self, WatchError};

#[derive(Parser)]
#[command(name = "daylog")]
#[command(about = "Achievements, plans, ideas, 72-hour todos and failure notes")]
#[command(version)]
pub struct Cli {
    /// Custom config file path
    #[arg(short, long)]
    pub config: Option<String>,

    /// Use development mode (uses separate dev config/database)
    #[arg(long)]
    pub dev: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Streak, today's achievements and open todos (default if no subcommand)
    Summary,
    /// Things you got done
    Achievement {
        #[command(subcommand)]
        action: AchievementAction,
    },
    /// Plans filed under a day
    Plan {
        #[command(subcommand)]
        action: PlanAction,
    },
    /// Loose ideas
    Idea {
        #[command(subcommand)]
        action: IdeaAction,
    },
    /// Time-boxed todos
    Todo {
        #[command(subcommand)]
        action: TodoAction,
    },
    /// Failures and what they taught you
    Failure {
        #[command(subcommand)]
        action: FailureAction,
    },
    /// Notes and todos inside custom folders
    Folder {
        #[command(subcommand)]
        action: FolderAction,
    },
    /// Custom folder entries
    Sidebar {
        #[command(subcommand)]
        action: SidebarAction,
    },
    /// Background theme
    Theme {
        #[command(subcommand)]
        action: ThemeAction,
    },
    /// Rewrite the content of any record by collection and id
    Edit {
        /// achievements, plans, ideas, todos or failures
        collection: CollectionKey,
        id: String,
        content: String,
    },
}

#[derive(Subcommand)]
pub enum AchievementAction {
    /// Record an achievement
    Add {
        content: String,
        /// Day it belongs to (YYYY-MM-DD, default today)
        #[arg(long)]
        date: Option<String>,
    },
    /// List achievements, newest day first
    List,
    Edit { id: String, content: String },
    Remove { id: String },
    /// Show the current streak of consecutive days
    Streak,
}

#[derive(Subcommand)]
pub enum PlanAction {
    /// Plan something
    Add {
        content: String,
        /// Day it is planned for (YYYY-MM-DD, default tomorrow)
        #[arg(long)]
        date: Option<String>,
    },
    /// List plans, earliest day first
    List,
    /// Complete or reopen a plan; completing logs an achievement
    Toggle { id: String },
    Edit { id: String, content: String },
    Remove { id: String },
}

#[derive(Subcommand)]
pub enum IdeaAction {
    Add { content: String },
    /// List ideas, newest first
    List,
    Edit { id: String, content: String },
    Remove { id: String },
}

#[derive(Subcommand)]
pub enum TodoAction {
    Add { content: String },
    /// List active todos with time left
    List {
        /// Include completed and expired todos
        #[arg(long)]
        all: bool,
    },
    Complete { id: String },
    Toggle { id: String },
    Edit { id: String, content: String },
    Remove { id: String },
    /// Live countdown, refreshed every second
    Watch,
    /// Delete expired todos that were never completed
    Purge,
}

#[derive(Subcommand)]
pub enum FailureAction {
    Add {
        content: String,
        /// Day it happened (YYYY-MM-DD, default today)
        #[arg(long)]
        date: Option<String>,
    },
    List,
    Edit { id: String, content: String },
    Remove { id: String },
}

#[derive(Subcommand)]
pub enum FolderAction {
    /// List folders, including data no entry points to
    List,
    /// Show the items of a folder
    Show { name: String },
    /// Add a note (or a todo with --todo) to a folder
    Add {
        name: String,
        content: String,
        #[arg(long)]
        todo: bool,
    },
    Toggle { name: String, id: String },
    Edit { name: String, id: String, content: String },
    Remove { name: String, id: String },
}

#[derive(Subcommand)]
pub enum SidebarAction {
    List,
    /// Create a custom folder entry
    Add {
        label: String,
        #[arg(long, default_value = DEFAULT_SIDEBAR_ICON)]
        icon: String,
    },
    /// Remove an entry by id
    Remove {
        id: String,
        /// Also delete the folder's items (overrides orphan_policy)
        #[arg(long)]
        cascade: bool,
    },
    /// Change the icon of an entry
    Icon { id: String, icon: String },
    /// Remove every custom entry
    Reset,
}

#[derive(Subcommand)]
pub enum ThemeAction {
    Show,
    List,
    Set { id: String },
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Storage error: {0}")]
    StoreError(#[from] StoreError),
    #[error("{0}")]
    ThemeError(#[from] ThemeError),
    #[error("{0}")]
    LabelError(#[from] LabelError),
    #[error("Failed to parse date: {0}")]
    DateParseError(String),
    #[error("Folder not found: {0}")]
    FolderNotFound(String),
    #[error("Unknown icon: {0}")]
    UnknownIcon(String),
    #[error("Collection '{0}' has no editable records")]
    NotEditable(CollectionKey),
    #[error("Countdown failed: {0}")]
    WatchError(#[from] WatchError),
    #[error("Output error: {0}")]
    IoError(#[from] io::Error),
}

/// Everything a command needs
pub struct Context<'a> {
    pub store: &'a dyn KeyValueStore,
    pub clock: &'a dyn Clock,
    pub config: &'a Config,
}

fn date_or(arg: Option<String>, fallback: NaiveDate) -> Result<NaiveDate, CliError> {
    match arg {
        Some(raw) => parse_date(&raw)
            .map_err(|e| CliError::DateParseError(format!("Invalid date format '{}': {}", raw, e))),
        None => Ok(fallback),
    }
}

fn report(out: &mut dyn Write, changed: bool, done: &str) -> Result<(), CliError> {
    if changed {
        writeln!(out, "{}", done)?;
    } else {
        writeln!(out, "Nothing changed")?;
    }
    Ok(())
}

/// Dispatch a parsed command
pub fn run(command: Commands, ctx: &Context<'_>, out: &mut dyn Write) -> Result<(), CliError> {
    match command {
        Commands::Summary => handle_summary(ctx, out),
        Commands::Achievement { action } => handle_achievement(action, ctx, out),
        Commands::Plan { action } => handle_plan(action, ctx, out),
        Commands::Idea { action } => handle_idea(action, ctx, out),
        Commands::Todo { action } => handle_todo(action, ctx, out),
        Commands::Failure { action } => handle_failure(action, ctx, out),
        Commands::Folder { action } => handle_folder(action, ctx, out),
        Commands::Sidebar { action } => handle_sidebar(action, ctx, out),
        Commands::Theme { action } => handle_theme(action, ctx, out),
        Commands::Edit {
            collection,
            id,
            content,
        } => {
            if !collection.holds_journal_records() {
                return Err(CliError::NotEditable(collection));
            }
            let edited = edit_in_collection(ctx.store, ctx.clock, collection, &id, &content)?
                .ok_or(CliError::NotEditable(collection))?;
            report(out, edited, "Saved")
        }
    }
}

/// Handle the default summary view
pub fn handle_summary(ctx: &Context<'_>, out: &mut dyn Write) -> Result<(), CliError> {
    let today = ctx.clock.today();
    let achievements = AchievementLog::load(ctx.store, ctx.clock)?;
    let plans = PlanBoard::load(ctx.store, ctx.clock)?;
    let todos = TodoList::load(ctx.store, ctx.clock)?;

    let done_today = achievements.items().iter().filter(|a| a.date == today).count();
    let planned_today = plans
        .items()
        .iter()
        .filter(|p| p.date == today && !p.completed)
        .count();

    writeln!(out, "{}", today)?;
    writeln!(out, "Streak: {} day(s)", achievements.streak())?;
    writeln!(out, "Achievements today: {}", done_today)?;
    writeln!(out, "Open plans for today: {}", planned_today)?;
    writeln!(out, "Active todos: {}", todos.active(ctx.config.todo_time_limit()).len())?;
    if plans.has_overdue() {
        writeln!(out, "Some plans are overdue; complete or remove them.")?;
    }
    Ok(())
}

/// Handle achievement commands
pub fn handle_achievement(action: AchievementAction, ctx: &Context<'_>, out: &mut dyn Write) -> Result<(), CliError> {
    let mut log = AchievementLog::load(ctx.store, ctx.clock)?;
    match action {
        AchievementAction::Add { content, date } => {
            let date = date_or(date, ctx.clock.today())?;
            match log.add(date, &content)? {
                Some(a) => writeln!(out, "Achievement recorded (ID: {})", a.id)?,
                None => writeln!(out, "Nothing to record")?,
            }
        }
        AchievementAction::List => {
            let streak = log.streak();
            if streak > 1 {
                writeln!(out, "{} days in a row!", streak)?;
            }
            for group in log.grouped() {
                writeln!(out, "{}", group.date)?;
                for a in group.records {
                    writeln!(out, "  {}  {}", a.id, a.content)?;
                }
            }
        }
        AchievementAction::Edit { id, content } => report(out, log.edit(&id, &content)?, "Saved")?,
        AchievementAction::Remove { id } => report(out, log.remove(&id)?, "Removed")?,
        AchievementAction::Streak => writeln!(out, "{}", log.streak())?,
    }
    Ok(())
}

/// Handle plan commands
pub fn handle_plan(action: PlanAction, ctx: &Context<'_>, out: &mut dyn Write) -> Result<(), CliError> {
    let mut plans = PlanBoard::load(ctx.store, ctx.clock)?;
    match action {
        PlanAction::Add { content, date } => {
            let tomorrow = ctx.clock.today() + TimeDelta::days(1);
            let date = date_or(date, tomorrow)?;
            match plans.add(date, &content)? {
                Some(p) => writeln!(out, "Plan created (ID: {})", p.id)?,
                None => writeln!(out, "Nothing to plan")?,
            }
        }
        PlanAction::List => {
            let today = ctx.clock.today();
            for group in plans.grouped() {
                let tag = match views::plan_day(group.date, today) {
                    PlanDay::Overdue => " (overdue)",
                    PlanDay::Today => " (today)",
                    PlanDay::Upcoming => "",
                };
                writeln!(out, "{}{}", group.date, tag)?;
                for p in group.records {
                    let mark = if p.completed { "x" } else { " " };
                    writeln!(out, "  [{}] {}  {}", mark, p.id, p.content)?;
                }
            }
        }
        PlanAction::Toggle { id } => match plans.toggle_completed(&id)? {
            Some(PlanToggle::Completed(achievement)) => {
                writeln!(out, "Plan completed and added to achievements: {}", achievement.content)?
            }
            Some(PlanToggle::Reopened) => writeln!(out, "Plan reopened")?,
            None => writeln!(out, "Nothing changed")?,
        },
        PlanAction::Edit { id, content } => report(out, plans.edit(&id, &content)?, "Saved")?,
        PlanAction::Remove { id } => report(out, plans.remove(&id)?, "Removed")?,
    }
    Ok(())
}

/// Handle idea commands
pub fn handle_idea(action: IdeaAction, ctx: &Context<'_>, out: &mut dyn Write) -> Result<(), CliError> {
    let mut ideas = IdeaBox::load(ctx.store, ctx.clock)?;
    match action {
        IdeaAction::Add { content } => match ideas.add(&content)? {
            Some(i) => writeln!(out, "Idea saved (ID: {})", i.id)?,
            None => writeln!(out, "Nothing to save")?,
        },
        IdeaAction::List => {
            for idea in ideas.newest_first() {
                writeln!(
                    out,
                    "{}  {}  {}",
                    idea.created_at.format("%Y-%m-%d %H:%M"),
                    idea.id,
                    views::preview(&idea.content, ctx.config.preview_max_chars)
                )?;
            }
        }
        IdeaAction::Edit { id, content } => report(out, ideas.edit(&id, &content)?, "Saved")?,
        IdeaAction::Remove { id } => report(out, ideas.remove(&id)?, "Removed")?,
    }
    Ok(())
}

/// Handle todo commands
pub fn handle_todo(action: TodoAction, ctx: &Context<'_>, out: &mut dyn Write) -> Result<(), CliError> {
    let limit = ctx.config.todo_time_limit();
    let mut todos = TodoList::load(ctx.store, ctx.clock)?;
    match action {
        TodoAction::Add { content } => match todos.add(&content)? {
            Some(t) => writeln!(out, "Todo added (ID: {}), {}h on the clock", t.id, limit.num_hours())?,
            None => writeln!(out, "Nothing to add")?,
        },
        TodoAction::List { all } => {
            for c in todos.countdowns(limit) {
                let status = if c.todo.completed {
                    "done".to_string()
                } else {
                    views::format_remaining(c.remaining)
                };
                let active = views::is_todo_active(c.todo, ctx.clock.now(), limit);
                if all || active {
                    writeln!(out, "{:>13}  {}  {}", status, c.todo.id, c.todo.content)?;
                }
            }
        }
        TodoAction::Complete { id } => report(out, todos.complete(&id)?, "Todo completed")?,
        TodoAction::Toggle { id } => match todos.toggle_completed(&id)? {
            Some(true) => writeln!(out, "Todo completed")?,
            Some(false) => writeln!(out, "Todo reopened")?,
            None => writeln!(out, "Nothing changed")?,
        },
        TodoAction::Edit { id, content } => report(out, todos.edit(&id, &content)?, "Saved")?,
        TodoAction::Remove { id } => report(out, todos.remove(&id)?, "Removed")?,
        TodoAction::Watch => watch::watch_todos(&todos, limit, ctx.config.preview_max_chars)?,
        TodoAction::Purge => {
            let purged = todos.purge_expired(limit)?;
            writeln!(out, "Purged {} expired todo(s)", purged)?;
        }
    }
    Ok(())
}

/// Handle failure commands
pub fn handle_failure(action: FailureAction, ctx: &Context<'_>, out: &mut dyn Write) -> Result<(), CliError> {
    let mut failures = FailureLog::load(ctx.store, ctx.clock)?;
    match action {
        FailureAction::Add { content, date } => {
            let date = date_or(date, ctx.clock.today())?;
            match failures.add(date, &content)? {
                Some(f) => writeln!(out, "Failure noted (ID: {})", f.id)?,
                None => writeln!(out, "Nothing to note")?,
            }
        }
        FailureAction::List => {
            for group in failures.grouped() {
                writeln!(out, "{}", group.date)?;
                for f in group.records {
                    writeln!(out, "  {}  {}", f.id, f.content)?;
                }
            }
        }
        FailureAction::Edit { id, content } => report(out, failures.edit(&id, &content)?, "Saved")?,
        FailureAction::Remove { id } => report(out, failures.remove(&id)?, "Removed")?,
    }
    Ok(())
}

/// Handle folder commands. Folders are only reachable through a sidebar entry
/// with the same label.
pub fn handle_folder(action: FolderAction, ctx: &Context<'_>, out: &mut dyn Write) -> Result<(), CliError> {
    let sidebar = SidebarRegistry::load(ctx.store)?;
    let mut folders = FolderStore::load(ctx.store, ctx.clock)?;

    let reachable = |name: &str| -> Result<(), CliError> {
        sidebar
            .find_by_label(name)
            .map(|_| ())
            .ok_or_else(|| CliError::FolderNotFound(name.to_string()))
    };

    match action {
        FolderAction::List => {
            for entry in sidebar.items() {
                writeln!(out, "{}  ({} items)", entry.label, folders.items(&entry.label).len())?;
            }
            for orphan in orphaned_folders(folders.folders(), sidebar.items()) {
                writeln!(out, "{}  ({} items, no sidebar entry)", orphan.folder_name, orphan.items.len())?;
            }
        }
        FolderAction::Show { name } => {
            reachable(&name)?;
            for item in folders.items(&name) {
                let mark = match item.kind {
                    FolderItemKind::Note => "-".to_string(),
                    FolderItemKind::Todo if item.is_completed() => "[x]".to_string(),
                    FolderItemKind::Todo => "[ ]".to_string(),
                };
                writeln!(
                    out,
                    "{} {}  {}",
                    mark,
                    item.id,
                    views::preview(&item.content, ctx.config.preview_max_chars)
                )?;
            }
        }
        FolderAction::Add { name, content, todo } => {
            reachable(&name)?;
            let kind = if todo { FolderItemKind::Todo } else { FolderItemKind::Note };
            match folders.add_item(&name, kind, &content)? {
                Some(item) => writeln!(out, "Added to {} (ID: {})", name, item.id)?,
                None => writeln!(out, "Nothing to add")?,
            }
        }
        FolderAction::Toggle { name, id } => {
            reachable(&name)?;
            match folders.toggle_todo(&name, &id)? {
                Some(true) => writeln!(out, "Marked done")?,
                Some(false) => writeln!(out, "Marked open")?,
                None => writeln!(out, "Nothing changed")?,
            }
        }
        FolderAction::Edit { name, id, content } => {
            reachable(&name)?;
            report(out, folders.edit_item(&name, &id, &content)?, "Saved")?
        }
        FolderAction::Remove { name, id } => {
            reachable(&name)?;
            report(out, folders.remove_item(&name, &id)?, "Removed")?
        }
    }
    Ok(())
}

/// Handle sidebar commands
pub fn handle_sidebar(action: SidebarAction, ctx: &Context<'_>, out: &mut dyn Write) -> Result<(), CliError> {
    let mut sidebar = SidebarRegistry::load(ctx.store)?;
    match action {
        SidebarAction::List => {
            for entry in sidebar.items() {
                writeln!(out, "{}  {}  [{}]  {}", entry.id, entry.label, entry.icon, entry.route())?;
            }
        }
        SidebarAction::Add { label, icon } => {
            if !SIDEBAR_ICONS.contains(&icon.as_str()) {
                return Err(CliError::UnknownIcon(icon));
            }
            validate_label(&label, sidebar.items())?;
            let entry = sidebar.add_item(&label, &icon)?;
            writeln!(out, "Folder created (ID: {})", entry.id)?;
        }
        SidebarAction::Remove { id, cascade } => {
            let policy = if cascade {
                OrphanPolicy::Cascade
            } else {
                ctx.config.orphan_policy
            };
            let mut folders = FolderStore::load(ctx.store, ctx.clock)?;
            match sidebar.remove_with_policy(&id, &mut folders, policy)? {
                Some((entry, Some(data))) => writeln!(
                    out,
                    "Removed {} and its {} item(s)",
                    entry.label,
                    data.items.len()
                )?,
                Some((entry, None)) => writeln!(out, "Removed {}", entry.label)?,
                None => writeln!(out, "Nothing changed")?,
            }
        }
        SidebarAction::Icon { id, icon } => {
            if !SIDEBAR_ICONS.contains(&icon.as_str()) {
                return Err(CliError::UnknownIcon(icon));
            }
            report(out, sidebar.update_item(&id, None, Some(&icon))?, "Icon updated")?
        }
        SidebarAction::Reset => {
            let cleared = sidebar.reset_to_default()?;
            writeln!(out, "Removed {} custom folder(s)", cleared)?;
        }
    }
    Ok(())
}

/// Handle theme commands
pub fn handle_theme(action: ThemeAction, ctx: &Context<'_>, out: &mut dyn Write) -> Result<(), CliError> {
    match action {
        ThemeAction::Show => {
            let current = theme::current_theme(ctx.store)?;
            writeln!(out, "{} ({})", current.id, current.name)?;
        }
        ThemeAction::List => {
            let current = theme::current_theme(ctx.store)?;
            for t in BACKGROUND_THEMES.iter() {
                let mark = if t.id == current.id { "*" } else { " " };
                writeln!(out, "{} {:<10} {}", mark, t.id, t.name)?;
            }
        }
        ThemeAction::Set { id } => {
            let chosen = theme::set_theme(ctx.store, &id)?;
            writeln!(out, "Theme set to {}", chosen.id)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::storage::MemoryStore;
    use chrono::{TimeZone, Utc};

    struct Harness {
        store: MemoryStore,
        clock: FixedClock,
        config: Config,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                store: MemoryStore::new(),
                clock: FixedClock::new(Utc.with_ymd_and_hms(2024, 7, 4, 12, 0, 0).unwrap()),
                config: Config {
                    database_path: ":memory:".to_string(),
                    ..Config::default()
                },
            }
        }

        fn run(&self, args: &[&str]) -> Result<String, CliError> {
            let mut argv = vec!["daylog"];
            argv.extend_from_slice(args);
            let cli = Cli::try_parse_from(argv).expect("valid arguments");
            let ctx = Context {
                store: &self.store,
                clock: &self.clock,
                config: &self.config,
            };
            let mut out = Vec::new();
            run(cli.command.unwrap_or(Commands::Summary), &ctx, &mut out)?;
            Ok(String::from_utf8(out).expect("utf-8 output"))
        }
    }

    #[test]
    fn plan_defaults_to_tomorrow_and_toggle_logs_achievement() {
        let h = Harness::new();
        h.run(&["plan", "add", "Write report"]).unwrap();
        let plans = PlanBoard::load(&h.store, &h.clock).unwrap();
        let plan = &plans.items()[0];
        assert_eq!(plan.date.to_string(), "2024-07-05");

        let output = h.run(&["plan", "toggle", &plan.id]).unwrap();
        assert!(output.contains("Write report"));
        let listing = h.run(&["achievement", "list"]).unwrap();
        assert!(listing.contains("2024-07-04"));
        assert!(listing.contains("Write report"));
    }

    #[test]
    fn bad_dates_are_reported() {
        let h = Harness::new();
        let err = h.run(&["achievement", "add", "x", "--date", "07/04/2024"]).unwrap_err();
        assert!(matches!(err, CliError::DateParseError(_)));
    }

    #[test]
    fn blank_content_reports_nothing_changed() {
        let h = Harness::new();
        let output = h.run(&["idea", "add", "   "]).unwrap();
        assert_eq!(output, "Nothing to save\n");
        assert!(IdeaBox::load(&h.store, &h.clock).unwrap().is_empty());
    }

    #[test]
    fn folders_need_a_sidebar_entry() {
        let h = Harness::new();
        let err = h.run(&["folder", "add", "Projects", "plan"]).unwrap_err();
        assert!(matches!(err, CliError::FolderNotFound(_)));

        h.run(&["sidebar", "add", "Projects"]).unwrap();
        h.run(&["folder", "add", "Projects", "book venue", "--todo"]).unwrap();
        let shown = h.run(&["folder", "show", "Projects"]).unwrap();
        assert!(shown.starts_with("[ ] "));
        assert!(shown.contains("book venue"));
    }

    #[test]
    fn sidebar_rejects_reserved_and_duplicate_labels() {
        let h = Harness::new();
        assert!(matches!(
            h.run(&["sidebar", "add", "灵感记录"]).unwrap_err(),
            CliError::LabelError(LabelError::Reserved(_))
        ));
        h.run(&["sidebar", "add", "Travel", "--icon", "Map"]).unwrap();
        assert!(matches!(
            h.run(&["sidebar", "add", "Travel"]).unwrap_err(),
            CliError::LabelError(LabelError::Duplicate(_))
        ));
        assert!(matches!(
            h.run(&["sidebar", "add", "Food", "--icon", "Pizza"]).unwrap_err(),
            CliError::UnknownIcon(_)
        ));
    }

    #[test]
    fn removed_entry_leaves_orphan_visible_in_folder_list() {
        let h = Harness::new();
        h.run(&["sidebar", "add", "Projects"]).unwrap();
        h.run(&["folder", "add", "Projects", "roadmap"]).unwrap();
        let id = SidebarRegistry::load(&h.store).unwrap().items()[0].id.clone();

        h.run(&["sidebar", "remove", &id]).unwrap();
        let listing = h.run(&["folder", "list"]).unwrap();
        assert_eq!(listing, "Projects  (1 items, no sidebar entry)\n");
        assert!(matches!(
            h.run(&["folder", "show", "Projects"]).unwrap_err(),
            CliError::FolderNotFound(_)
        ));
    }

    #[test]
    fn todo_list_hides_expired_unless_all() {
        let h = Harness::new();
        h.run(&["todo", "add", "old"]).unwrap();
        h.clock.advance(TimeDelta::hours(73));
        h.run(&["todo", "add", "new"]).unwrap();

        let active = h.run(&["todo", "list"]).unwrap();
        assert!(active.contains("new"));
        assert!(!active.contains("old"));

        let all = h.run(&["todo", "list", "--all"]).unwrap();
        assert!(all.contains("old"));
        assert!(all.contains("expired"));

        assert_eq!(h.run(&["todo", "purge"]).unwrap(), "Purged 1 expired todo(s)\n");
    }

    #[test]
    fn generic_edit_rejects_folder_collections() {
        let h = Harness::new();
        let err = h.run(&["edit", "folderData", "x", "y"]).unwrap_err();
        assert!(matches!(err, CliError::NotEditable(CollectionKey::FolderData)));
        assert!(Cli::try_parse_from(["daylog", "edit", "notes", "x", "y"]).is_err());
    }

    #[test]
    fn theme_commands_round_trip() {
        let h = Harness::new();
        assert_eq!(h.run(&["theme", "show"]).unwrap(), "default (默认渐变)\n");
        h.run(&["theme", "set", "forest"]).unwrap();
        let listing = h.run(&["theme", "list"]).unwrap();
        assert!(listing.lines().any(|l| l.starts_with("* forest")));
        assert!(matches!(
            h.run(&["theme", "set", "neon"]).unwrap_err(),
            CliError::ThemeError(ThemeError::ThemeNotFound(_))
        ));
    }

    #[test]
    fn summary_reports_streak_and_counts() {
        let h = Harness::new();
        h.run(&["achievement", "add", "gym", "--date", "2024-07-03"]).unwrap();
        h.run(&["achievement", "add", "read"]).unwrap();
        h.run(&["todo", "add", "laundry"]).unwrap();

        let summary = h.run(&[]).unwrap();
        assert!(summary.contains("Streak: 2 day(s)"));
        assert!(summary.contains("Achievements today: 1"));
        assert!(summary.contains("Active todos: 1"));
    }
}

use thiserror::Error;

use crate::storage::{BACKGROUND_THEME_KEY, KeyValueStore, StoreError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackgroundTheme {
    pub id: &'static str,
    pub name: &'static str,
    pub gradient: &'static str,
}

pub const DEFAULT_THEME_ID: &str = "default";

pub const BACKGROUND_THEMES: [BackgroundTheme; 5] = [
    BackgroundTheme {
        id: "default",
        name: "默认渐变",
        gradient: "linear-gradient(135deg, #f6f8ff 0%, #f0f4ff 100%)",
    },
    BackgroundTheme {
        id: "sunset",
        name: "日落渐变",
        gradient: "linear-gradient(135deg, #ffecd2 0%, #fcb69f 100%)",
    },
    BackgroundTheme {
        id: "ocean",
        name: "海洋渐变",
        gradient: "linear-gradient(135deg, #e0f7ff 0%, #b6e3ff 100%)",
    },
    BackgroundTheme {
        id: "forest",
        name: "森林渐变",
        gradient: "linear-gradient(135deg, #e6ffed 0%, #b3f0c9 100%)",
    },
    BackgroundTheme {
        id: "lavender",
        name: "薰衣草渐变",
        gradient: "linear-gradient(135deg, #f3e7ff 0%, #e4c7ff 100%)",
    },
];

#[derive(Debug, Error)]
pub enum ThemeError {
    #[error("Theme not found: {0}")]
    ThemeNotFound(String),
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
}

pub fn find_theme(id: &str) -> Option<&'static BackgroundTheme> {
    BACKGROUND_THEMES.iter().find(|t| t.id == id)
}

fn default_theme() -> &'static BackgroundTheme {
    &BACKGROUND_THEMES[0]
}

/// The stored theme; unknown or missing ids resolve to the default
pub fn current_theme(store: &dyn KeyValueStore) -> Result<&'static BackgroundTheme, StoreError> {
    let stored = store.get(BACKGROUND_THEME_KEY)?;
    Ok(stored
        .as_deref()
        .and_then(find_theme)
        .unwrap_or_else(default_theme))
}

/// Store a preset theme id as a bare string
pub fn set_theme(store: &dyn KeyValueStore, id: &str) -> Result<&'static BackgroundTheme, ThemeError> {
    let theme = find_theme(id).ok_or_else(|| ThemeError::ThemeNotFound(id.to_string()))?;
    store.set(BACKGROUND_THEME_KEY, theme.id)?;
    Ok(theme)
}

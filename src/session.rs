//! Session State
//!
//! Explicit session object, loaded from persisted storage once at the
//! composition root and provided through context as a reactive store.
//! Storage reads and writes live here and nowhere else.

use leptos::prelude::*;
use reactive_stores::Store;

const KEY_COMPANY: &str = "companyId";
const KEY_USER: &str = "userId";
const KEY_LANGUAGE: &str = "language";
const KEY_VOLUME: &str = "volume";
const KEY_THEME: &str = "theme";

/// Preferred color scheme; `System` follows the OS setting
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ThemePref {
    Light,
    Dark,
    #[default]
    System,
}

impl ThemePref {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThemePref::Light => "light",
            ThemePref::Dark => "dark",
            ThemePref::System => "system",
        }
    }

    pub fn parse(value: &str) -> Self {
        match value {
            "light" => ThemePref::Light,
            "dark" => ThemePref::Dark,
            _ => ThemePref::System,
        }
    }
}

/// Per-tab session with field-level reactivity
#[derive(Clone, Debug, Store)]
pub struct Session {
    pub company_id: u32,
    pub user_id: u32,
    pub language: String,
    pub volume: f64,
    pub theme: ThemePref,
}

/// Type alias for the store
pub type SessionStore = Store<Session>;

/// Get the session store from context
pub fn use_session() -> SessionStore {
    expect_context::<SessionStore>()
}

fn storage() -> Option<web_sys::Storage> {
    web_sys::window().and_then(|win| win.local_storage().ok().flatten())
}

fn read_key(key: &str) -> Option<String> {
    storage().and_then(|store| store.get_item(key).ok().flatten())
}

/// Load the persisted session. Absent or unparseable keys fall back to a
/// fresh-profile default, logged so a broken bootstrap is visible.
pub fn load() -> Session {
    let session = Session {
        company_id: read_key(KEY_COMPANY).and_then(|v| v.parse().ok()).unwrap_or(1),
        user_id: read_key(KEY_USER).and_then(|v| v.parse().ok()).unwrap_or(1),
        language: read_key(KEY_LANGUAGE).unwrap_or_else(|| "en".to_string()),
        volume: read_key(KEY_VOLUME).and_then(|v| v.parse().ok()).unwrap_or(1.0),
        theme: read_key(KEY_THEME)
            .map(|v| ThemePref::parse(&v))
            .unwrap_or_default(),
    };
    web_sys::console::log_1(
        &format!(
            "[session] company {} user {} theme {}",
            session.company_id,
            session.user_id,
            session.theme.as_str()
        )
        .into(),
    );
    session
}

pub fn persist_volume(volume: f64) {
    if let Some(store) = storage() {
        let _ = store.set_item(KEY_VOLUME, &volume.to_string());
    }
}

pub fn persist_theme(theme: ThemePref) {
    if let Some(store) = storage() {
        let _ = store.set_item(KEY_THEME, theme.as_str());
    }
}

/// Wipe persisted state after a forced logout
pub fn clear_persisted() {
    if let Some(store) = storage() {
        let _ = store.clear();
    }
}

fn prefers_dark() -> bool {
    web_sys::window()
        .and_then(|win| win.match_media("(prefers-color-scheme: dark)").ok().flatten())
        .map(|query| query.matches())
        .unwrap_or(false)
}

/// Resolve `System` against the OS preference
pub fn resolved_dark(theme: ThemePref) -> bool {
    match theme {
        ThemePref::Dark => true,
        ThemePref::Light => false,
        ThemePref::System => prefers_dark(),
    }
}

/// Toggle the `dark` class on the document root to match the preference
pub fn apply_theme(theme: ThemePref) {
    let root = web_sys::window()
        .and_then(|win| win.document())
        .and_then(|doc| doc.document_element());
    let Some(root) = root else {
        return;
    };
    let classes = root.class_list();
    let _ = if resolved_dark(theme) {
        classes.add_1("dark")
    } else {
        classes.remove_1("dark")
    };
}

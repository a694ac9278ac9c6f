//! Presentation state as an immutable snapshot. Every transition consumes
//! the current value and returns the next one.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use tracing::debug;

use crate::i18n::Language;
use crate::info::InfoData;
use crate::menu::filter::FilterState;
use crate::menu::MenuData;
use crate::prefs::Preferences;
use crate::site::SiteConfig;

/// Data older than this is refetched by the watch loop.
pub const STALE_AFTER: Duration = Duration::from_secs(5 * 60);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, ValueEnum)]
pub enum Tab {
    #[default]
    Cuisine,
    Bar,
    Info,
}

impl Tab {
    pub fn key(self) -> &'static str {
        match self {
            Tab::Cuisine => "cuisine",
            Tab::Bar => "bar",
            Tab::Info => "info",
        }
    }

    pub fn is_menu(self) -> bool {
        self != Tab::Info
    }
}

impl std::fmt::Display for Tab {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Normalized content of one tab.
#[derive(Debug, Clone, PartialEq)]
pub enum TabData {
    Menu(Arc<MenuData>),
    Info(Arc<InfoData>),
}

#[derive(Debug, Clone)]
struct Loaded {
    data: TabData,
    at: DateTime<Utc>,
}

/// Whether a transition should reach the screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Redraw {
    Screen,
    Skip,
}

#[derive(Debug, Clone, Default)]
pub struct AppState {
    tab: Tab,
    language: Language,
    filters: FilterState,
    draft: Option<FilterState>,
    site: Arc<SiteConfig>,
    config_error: bool,
    loaded: HashMap<Tab, Loaded>,
}

impl AppState {
    pub fn new(tab: Tab, prefs: &Preferences) -> Self {
        AppState {
            tab,
            language: prefs.language.unwrap_or_default(),
            filters: FilterState {
                diet: prefs.diet.unwrap_or_default(),
                excluded: prefs.exclude_allergens.iter().copied().collect(),
            },
            ..Default::default()
        }
    }

    pub fn with_site(self, site: SiteConfig) -> Self {
        AppState {
            site: Arc::new(site),
            ..self
        }
    }

    /// Keep the default site config but flag that the real one failed to
    /// load.
    pub fn with_config_error(self) -> Self {
        AppState {
            config_error: true,
            ..self
        }
    }

    #[cfg(test)]
    pub fn select_tab(self, tab: Tab) -> Self {
        AppState { tab, ..self }
    }

    pub fn with_language(self, language: Language) -> Self {
        AppState { language, ..self }
    }

    /// Start editing a copy of the committed filters. An edit already in
    /// progress is kept.
    pub fn begin_edit(self) -> Self {
        let draft = self.draft.clone().unwrap_or_else(|| self.filters.clone());
        AppState {
            draft: Some(draft),
            ..self
        }
    }

    pub fn edit_draft(self, edit: impl FnOnce(&mut FilterState)) -> Self {
        let mut state = self.begin_edit();
        if let Some(draft) = state.draft.as_mut() {
            edit(draft);
        }
        state
    }

    pub fn commit_draft(mut self) -> Self {
        if let Some(draft) = self.draft.take() {
            self.filters = draft;
        }
        self
    }

    #[cfg(test)]
    pub fn cancel_draft(self) -> Self {
        AppState { draft: None, ..self }
    }

    /// Store a completed fetch. The result is always kept, but only a
    /// fetch for the selected tab asks for a redraw.
    pub fn apply_fetch(mut self, tab: Tab, data: TabData, at: DateTime<Utc>) -> (Self, Redraw) {
        let redraw = if tab == self.tab {
            Redraw::Screen
        } else {
            debug!(tab = %tab, current = %self.tab, "stored fetch for background tab");
            Redraw::Skip
        };
        self.loaded.insert(tab, Loaded { data, at });
        (self, redraw)
    }

    /// True when the tab has never loaded or its data has aged past
    /// [`STALE_AFTER`].
    pub fn is_stale(&self, tab: Tab, now: DateTime<Utc>) -> bool {
        match self.loaded.get(&tab) {
            Some(loaded) => (now - loaded.at).num_seconds() > STALE_AFTER.as_secs() as i64,
            None => true,
        }
    }

    pub fn preferences(&self) -> Preferences {
        Preferences {
            language: Some(self.language),
            diet: Some(self.filters.diet),
            exclude_allergens: self.filters.excluded.iter().copied().collect(),
        }
    }

    pub fn current_tab(&self) -> Tab {
        self.tab
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn site(&self) -> &SiteConfig {
        &self.site
    }

    pub fn config_error(&self) -> bool {
        self.config_error
    }

    pub fn data(&self, tab: Tab) -> Option<&TabData> {
        self.loaded.get(&tab).map(|l| &l.data)
    }

    pub fn menu(&self, tab: Tab) -> Option<&MenuData> {
        match self.data(tab)? {
            TabData::Menu(menu) => Some(menu.as_ref()),
            TabData::Info(_) => None,
        }
    }

    pub fn info(&self) -> Option<&InfoData> {
        match self.data(Tab::Info)? {
            TabData::Info(info) => Some(info.as_ref()),
            TabData::Menu(_) => None,
        }
    }

    pub fn fetched_at(&self, tab: Tab) -> Option<DateTime<Utc>> {
        self.loaded.get(&tab).map(|l| l.at)
    }
}

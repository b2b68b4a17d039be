//! Application state - single source of truth

use serde::{Deserialize, Serialize};
use tui_dispatch_debug::debug::{ron_string, DebugSection, DebugState};

/// Entries requested per listing page unless overridden on the command line.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Debounce before a name lookup fires.
pub const SEARCH_DEBOUNCE_MS: u64 = 400;

/// Debounce before the first listing page is refetched after an edit.
pub const LISTING_DEBOUNCE_MS: u64 = 200;

pub const NO_RESULTS_MESSAGE: &str = "No Pokémon found with that name.";
pub const UNKNOWN_ERROR_MESSAGE: &str = "Unknown error";

/// A minimal list row: name plus the resource URL it came from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListEntry {
    pub name: String,
    pub url: String,
}

/// One page of the `/pokemon` listing.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ListPage {
    pub total_count: u32,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub entries: Vec<ListEntry>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeTag {
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatValue {
    pub name: String,
    pub base_value: u8,
}

/// Full record for one catalog entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityDetail {
    pub id: u32,
    pub name: String,
    pub image_url: Option<String>,
    pub types: Vec<TypeTag>,
    pub stats: Vec<StatValue>,
}

/// Which request shape the list controller uses, derived from the search text.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ListMode {
    Listing,
    Search,
}

impl ListMode {
    pub fn for_text(text: &str) -> Self {
        if text.trim().chars().count() > 1 {
            ListMode::Search
        } else {
            ListMode::Listing
        }
    }
}

/// Search/pagination controller state.
///
/// `generation` is bumped whenever a new request supersedes the previous one.
/// Completions carry the generation they were started with and are dropped
/// when it no longer matches.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ListState {
    pub entries: Vec<ListEntry>,
    pub page_offset: u32,
    pub limit: u32,
    pub is_loading: bool,
    pub error: Option<String>,
    pub has_more: bool,
    pub search_text: String,
    pub generation: u64,
}

impl ListState {
    pub fn new(limit: u32) -> Self {
        Self {
            entries: Vec::new(),
            page_offset: 0,
            limit: limit.max(1),
            is_loading: false,
            error: None,
            has_more: true,
            search_text: String::new(),
            generation: 0,
        }
    }

    pub fn mode(&self) -> ListMode {
        ListMode::for_text(&self.search_text)
    }

    pub fn next_generation(&mut self) -> u64 {
        self.generation = self.generation.wrapping_add(1);
        self.generation
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.generation == generation
    }

    pub fn can_load_more(&self) -> bool {
        self.has_more && !self.is_loading && self.mode() == ListMode::Listing
    }

    /// Record a failed fetch: visible message, empty list, no further pages.
    pub fn fail(&mut self, error: String) {
        self.error = Some(if error.trim().is_empty() {
            UNKNOWN_ERROR_MESSAGE.to_string()
        } else {
            error
        });
        self.entries.clear();
        self.has_more = false;
        self.is_loading = false;
    }
}

impl Default for ListState {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

/// Detail controller state, bound to the identifier last requested.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DetailState {
    pub identifier: Option<String>,
    pub entity: Option<EntityDetail>,
    pub is_loading: bool,
    pub error: Option<String>,
    pub generation: u64,
}

impl DetailState {
    /// Bind to a new identifier and return the generation of its request.
    pub fn bind(&mut self, identifier: String) -> u64 {
        self.generation = self.generation.wrapping_add(1);
        self.identifier = Some(identifier);
        self.entity = None;
        self.is_loading = true;
        self.error = None;
        self.generation
    }

    /// Drop the binding; in-flight completions become stale.
    pub fn unbind(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.identifier = None;
        self.entity = None;
        self.is_loading = false;
        self.error = None;
    }

    pub fn is_interested(&self, generation: u64, identifier: &str) -> bool {
        self.generation == generation && self.identifier.as_deref() == Some(identifier)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum View {
    #[default]
    List,
    Detail,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn toggle(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct AppState {
    pub list: ListState,
    pub detail: DetailState,
    pub view: View,
    pub selected_index: usize,
    pub search_active: bool,
    pub theme: Theme,
    pub terminal_size: (u16, u16),
    pub tick: u64,
}

impl AppState {
    pub fn new(page_size: u32) -> Self {
        Self {
            list: ListState::new(page_size),
            detail: DetailState::default(),
            view: View::List,
            selected_index: 0,
            search_active: false,
            theme: Theme::default(),
            terminal_size: (80, 24),
            tick: 0,
        }
    }

    pub fn selected_entry(&self) -> Option<&ListEntry> {
        self.list.entries.get(self.selected_index)
    }

    pub fn set_selected_index(&mut self, index: usize) -> bool {
        if self.list.entries.is_empty() {
            self.selected_index = 0;
            return false;
        }
        let bounded = index.min(self.list.entries.len() - 1);
        if bounded != self.selected_index {
            self.selected_index = bounded;
            return true;
        }
        false
    }

    pub fn clamp_selection(&mut self) {
        let last = self.list.entries.len().saturating_sub(1);
        self.selected_index = self.selected_index.min(last);
    }

    pub fn selection_at_end(&self) -> bool {
        !self.list.entries.is_empty() && self.selected_index + 1 >= self.list.entries.len()
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl DebugState for AppState {
    fn debug_sections(&self) -> Vec<DebugSection> {
        vec![
            DebugSection::new("List")
                .entry("mode", ron_string(&self.list.mode()))
                .entry("entries", ron_string(&self.list.entries.len()))
                .entry("offset", ron_string(&self.list.page_offset))
                .entry("limit", ron_string(&self.list.limit))
                .entry("has_more", ron_string(&self.list.has_more))
                .entry("loading", ron_string(&self.list.is_loading))
                .entry("search", ron_string(&self.list.search_text))
                .entry("generation", ron_string(&self.list.generation))
                .entry("error", ron_string(&self.list.error)),
            DebugSection::new("Detail")
                .entry("identifier", ron_string(&self.detail.identifier))
                .entry(
                    "entity",
                    ron_string(&self.detail.entity.as_ref().map(|entity| entity.name.clone())),
                )
                .entry("loading", ron_string(&self.detail.is_loading))
                .entry("generation", ron_string(&self.detail.generation))
                .entry("error", ron_string(&self.detail.error)),
            DebugSection::new("Ui")
                .entry("view", ron_string(&self.view))
                .entry("selected", ron_string(&self.selected_index))
                .entry("search_active", ron_string(&self.search_active))
                .entry("theme", ron_string(&self.theme)),
        ]
    }
}

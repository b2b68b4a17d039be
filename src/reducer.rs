use std::time::Duration;

use tui_dispatch::DispatchResult;

use crate::action::Action;
use crate::effect::Effect;
use crate::state::{
    AppState, ListMode, View, LISTING_DEBOUNCE_MS, NO_RESULTS_MESSAGE, SEARCH_DEBOUNCE_MS,
    UNKNOWN_ERROR_MESSAGE,
};

pub fn reducer(state: &mut AppState, action: Action) -> DispatchResult<Effect> {
    match action {
        Action::Init => {
            // A restored snapshot may start mid-search.
            if state.list.mode() == ListMode::Search {
                return DispatchResult::changed_with(schedule_for_search_text(state));
            }
            let generation = state.list.next_generation();
            state.list.page_offset = 0;
            state.list.entries.clear();
            state.list.error = None;
            state.list.is_loading = true;
            state.selected_index = 0;
            DispatchResult::changed_with(Effect::FetchPage {
                generation,
                limit: state.list.limit,
                offset: 0,
            })
        }

        // ===== Search field =====
        Action::SearchStart => {
            if state.search_active || state.view != View::List {
                return DispatchResult::unchanged();
            }
            state.search_active = true;
            DispatchResult::changed()
        }

        Action::SearchFinish => {
            if !state.search_active {
                return DispatchResult::unchanged();
            }
            state.search_active = false;
            DispatchResult::changed()
        }

        Action::SearchChange(text) => {
            if text == state.list.search_text {
                return DispatchResult::unchanged();
            }
            state.list.search_text = text;
            state.selected_index = 0;
            DispatchResult::changed_with(schedule_for_search_text(state))
        }

        Action::SearchDidLoad { generation, entry } => {
            if !state.list.is_current(generation) {
                tracing::debug!(generation, current = state.list.generation, "stale search result");
                return DispatchResult::unchanged();
            }
            state.list.has_more = false;
            state.list.is_loading = false;
            match entry {
                Some(entry) => {
                    state.list.entries = vec![entry];
                    state.list.error = None;
                }
                None => {
                    state.list.entries.clear();
                    state.list.error = Some(NO_RESULTS_MESSAGE.to_string());
                }
            }
            state.clamp_selection();
            DispatchResult::changed()
        }

        Action::SearchDidError { generation, error } => {
            if !state.list.is_current(generation) {
                tracing::debug!(generation, current = state.list.generation, "stale search error");
                return DispatchResult::unchanged();
            }
            tracing::warn!(%error, "search failed");
            state.list.fail(error);
            state.clamp_selection();
            DispatchResult::changed()
        }

        // ===== Pagination =====
        Action::ListLoadMore => match load_more(state) {
            Some(effect) => DispatchResult::changed_with(effect),
            None => DispatchResult::unchanged(),
        },

        Action::ListRefresh => {
            state.list.page_offset = 0;
            state.list.search_text.clear();
            state.search_active = false;
            state.selected_index = 0;
            DispatchResult::changed_with(schedule_for_search_text(state))
        }

        Action::ListPageDidLoad {
            generation,
            offset,
            page,
        } => {
            if !state.list.is_current(generation) || state.list.mode() != ListMode::Listing {
                tracing::debug!(generation, offset, "stale listing page");
                return DispatchResult::unchanged();
            }
            if offset == 0 {
                state.list.entries = page.entries;
            } else {
                state.list.entries.extend(page.entries);
            }
            state.list.has_more = page.next.is_some();
            state.list.is_loading = false;
            state.list.error = None;
            state.clamp_selection();
            DispatchResult::changed()
        }

        Action::ListPageDidError { generation, error } => {
            if !state.list.is_current(generation) {
                tracing::debug!(generation, current = state.list.generation, "stale listing error");
                return DispatchResult::unchanged();
            }
            tracing::warn!(%error, offset = state.list.page_offset, "listing failed");
            state.list.fail(error);
            state.clamp_selection();
            DispatchResult::changed()
        }

        // ===== Selection =====
        Action::SelectionMove(delta) => {
            let index = (state.selected_index as i64 + delta as i64).max(0) as usize;
            select(state, index)
        }

        Action::SelectionPage(delta) => {
            let page = list_page_size(state) as i64;
            let index = (state.selected_index as i64 + delta as i64 * page).max(0) as usize;
            select(state, index)
        }

        Action::SelectionJumpTop => select(state, 0),

        Action::SelectionJumpBottom => {
            let last = state.list.entries.len().saturating_sub(1);
            select(state, last)
        }

        Action::ListSelect(index) => select(state, index),

        // ===== Detail =====
        Action::DetailOpen(identifier) => open_detail(state, identifier),

        Action::DetailOpenSelected => match state.selected_entry() {
            Some(entry) => {
                let identifier = entry.name.clone();
                state.search_active = false;
                open_detail(state, identifier)
            }
            None => DispatchResult::unchanged(),
        },

        Action::DetailDidLoad {
            generation,
            identifier,
            entity,
        } => {
            if !state.detail.is_interested(generation, &identifier) {
                tracing::debug!(%identifier, generation, "stale detail result");
                return DispatchResult::unchanged();
            }
            state.detail.entity = Some(entity);
            state.detail.is_loading = false;
            DispatchResult::changed()
        }

        Action::DetailDidError {
            generation,
            identifier,
            error,
        } => {
            if !state.detail.is_interested(generation, &identifier) {
                tracing::debug!(%identifier, generation, "stale detail error");
                return DispatchResult::unchanged();
            }
            tracing::warn!(%identifier, %error, "detail fetch failed");
            state.detail.error = Some(if error.trim().is_empty() {
                UNKNOWN_ERROR_MESSAGE.to_string()
            } else {
                error
            });
            state.detail.is_loading = false;
            DispatchResult::changed()
        }

        Action::DetailClose => {
            if state.view == View::List {
                return DispatchResult::unchanged();
            }
            state.view = View::List;
            state.detail.unbind();
            DispatchResult::changed()
        }

        Action::DetailNext => step_detail(state, 1),
        Action::DetailPrev => step_detail(state, -1),

        // ===== UI =====
        Action::UiToggleTheme => {
            state.theme = state.theme.toggle();
            DispatchResult::changed()
        }

        Action::UiTerminalResize(width, height) => {
            if state.terminal_size == (width, height) {
                return DispatchResult::unchanged();
            }
            state.terminal_size = (width, height);
            DispatchResult::changed()
        }

        Action::Tick => {
            if state.list.is_loading || state.detail.is_loading {
                state.tick = state.tick.wrapping_add(1);
                DispatchResult::changed()
            } else {
                DispatchResult::unchanged()
            }
        }

        Action::Quit => DispatchResult::unchanged(),
    }
}

/// Start the request the current search text calls for.
///
/// Listing mode restarts from page zero with an empty list; search mode keeps
/// the old rows on screen until the lookup settles.
fn schedule_for_search_text(state: &mut AppState) -> Effect {
    let generation = state.list.next_generation();
    state.list.error = None;
    state.list.is_loading = true;
    match state.list.mode() {
        ListMode::Search => Effect::DebounceSearch {
            generation,
            query: state.list.search_text.trim().to_string(),
            delay: Duration::from_millis(SEARCH_DEBOUNCE_MS),
        },
        ListMode::Listing => {
            state.list.page_offset = 0;
            state.list.entries.clear();
            Effect::DebounceFirstPage {
                generation,
                limit: state.list.limit,
                delay: Duration::from_millis(LISTING_DEBOUNCE_MS),
            }
        }
    }
}

fn load_more(state: &mut AppState) -> Option<Effect> {
    if !state.list.can_load_more() {
        return None;
    }
    state.list.page_offset += state.list.limit;
    state.list.is_loading = true;
    state.list.error = None;
    let generation = state.list.next_generation();
    Some(Effect::FetchPage {
        generation,
        limit: state.list.limit,
        offset: state.list.page_offset,
    })
}

fn select(state: &mut AppState, index: usize) -> DispatchResult<Effect> {
    let moved = state.set_selected_index(index);
    let effects: Vec<Effect> = if state.selection_at_end() {
        load_more(state).into_iter().collect()
    } else {
        Vec::new()
    };
    if !moved && effects.is_empty() {
        return DispatchResult::unchanged();
    }
    DispatchResult::changed_with_many(effects)
}

fn open_detail(state: &mut AppState, identifier: String) -> DispatchResult<Effect> {
    let identifier = identifier.trim().to_lowercase();
    if identifier.is_empty() {
        return DispatchResult::unchanged();
    }
    state.view = View::Detail;
    let already_bound = state.detail.identifier.as_deref() == Some(identifier.as_str())
        && state.detail.error.is_none()
        && (state.detail.is_loading || state.detail.entity.is_some());
    if already_bound {
        return DispatchResult::changed();
    }
    let generation = state.detail.bind(identifier.clone());
    DispatchResult::changed_with(Effect::FetchDetail {
        generation,
        identifier,
    })
}

fn step_detail(state: &mut AppState, delta: i64) -> DispatchResult<Effect> {
    if state.view != View::Detail {
        return DispatchResult::unchanged();
    }
    let index = (state.selected_index as i64 + delta).max(0) as usize;
    if !state.set_selected_index(index) {
        return DispatchResult::unchanged();
    }
    let Some(identifier) = state.selected_entry().map(|entry| entry.name.clone()) else {
        return DispatchResult::unchanged();
    };
    let mut result = open_detail(state, identifier);
    if state.selection_at_end() {
        result.effects.extend(load_more(state));
    }
    result
}

fn list_page_size(state: &AppState) -> usize {
    (state.terminal_size.1.saturating_sub(8) as usize).max(1)
}

//! List and detail controller flows, with API completions simulated as actions.

use std::time::Duration;

use pokedex::{
    action::Action,
    effect::Effect,
    reducer::reducer,
    state::{AppState, EntityDetail, ListEntry, ListMode, ListPage, StatValue, TypeTag, View},
};
use tui_dispatch::testing::*;
use tui_dispatch::EffectStore;

fn entry(id: u32, name: &str) -> ListEntry {
    ListEntry {
        name: name.into(),
        url: format!("https://pokeapi.co/api/v2/pokemon/{id}/"),
    }
}

fn first_page() -> Vec<ListEntry> {
    vec![entry(1, "bulbasaur"), entry(2, "ivysaur")]
}

fn page(entries: Vec<ListEntry>, next: Option<&str>) -> ListPage {
    ListPage {
        total_count: 4,
        next: next.map(str::to_string),
        previous: None,
        entries,
    }
}

fn entity(id: u32, name: &str, kind: &str) -> EntityDetail {
    EntityDetail {
        id,
        name: name.into(),
        image_url: Some(format!("https://img.example/{id}.png")),
        types: vec![TypeTag { name: kind.into() }],
        stats: vec![StatValue {
            name: "hp".into(),
            base_value: 45,
        }],
    }
}

fn page_generation(effects: &[Effect]) -> u64 {
    match effects {
        [Effect::FetchPage { generation, .. }] => *generation,
        [Effect::DebounceFirstPage { generation, .. }] => *generation,
        other => panic!("expected a single page fetch, got {other:?}"),
    }
}

fn search_generation(effects: &[Effect]) -> u64 {
    match effects {
        [Effect::DebounceSearch { generation, .. }] => *generation,
        other => panic!("expected a single search, got {other:?}"),
    }
}

fn detail_generation(effects: &[Effect]) -> u64 {
    match effects {
        [Effect::FetchDetail { generation, .. }] => *generation,
        other => panic!("expected a single detail fetch, got {other:?}"),
    }
}

#[test]
fn first_page_settles_into_list() {
    let mut store = EffectStore::new(AppState::new(2), reducer);

    let result = store.dispatch(Action::Init);
    let generation = page_generation(&result.effects);
    assert!(store.state().list.is_loading);

    store.dispatch(Action::ListPageDidLoad {
        generation,
        offset: 0,
        page: page(first_page(), None),
    });

    let list = &store.state().list;
    assert!(!list.is_loading);
    assert_eq!(list.entries, first_page());
    assert!(list.error.is_none());
    assert!(!list.has_more);
}

#[test]
fn listing_failure_settles_to_empty_list_with_message() {
    let mut store = EffectStore::new(AppState::new(2), reducer);
    let generation = page_generation(&store.dispatch(Action::Init).effects);

    store.dispatch(Action::ListPageDidError {
        generation,
        error: "API error".into(),
    });

    let list = &store.state().list;
    assert!(!list.is_loading);
    assert!(list.entries.is_empty());
    assert_eq!(list.error.as_deref(), Some("API error"));
}

#[test]
fn load_more_accumulates_pages() {
    let mut store = EffectStore::new(AppState::new(2), reducer);
    let generation = page_generation(&store.dispatch(Action::Init).effects);
    store.dispatch(Action::ListPageDidLoad {
        generation,
        offset: 0,
        page: page(first_page(), Some("next-url")),
    });
    assert!(store.state().list.has_more);

    let result = store.dispatch(Action::ListLoadMore);
    assert!(matches!(
        result.effects.as_slice(),
        [Effect::FetchPage {
            limit: 2,
            offset: 2,
            ..
        }]
    ));
    let generation = page_generation(&result.effects);

    store.dispatch(Action::ListPageDidLoad {
        generation,
        offset: 2,
        page: page(vec![entry(3, "venusaur"), entry(4, "charmander")], None),
    });

    let list = &store.state().list;
    assert_eq!(list.entries.len(), 4);
    assert_eq!(list.entries[2].name, "venusaur");
    assert!(!list.has_more);

    // Nothing left to page in.
    assert!(!store.dispatch(Action::ListLoadMore).changed);
}

#[test]
fn successful_name_search_shows_single_entry() {
    let mut store = EffectStore::new(AppState::new(2), reducer);
    let generation = page_generation(&store.dispatch(Action::Init).effects);
    store.dispatch(Action::ListPageDidLoad {
        generation,
        offset: 0,
        page: page(first_page(), Some("next-url")),
    });

    let result = store.dispatch(Action::SearchChange("bulbasaur".into()));
    assert_eq!(store.state().list.mode(), ListMode::Search);
    let generation = search_generation(&result.effects);

    store.dispatch(Action::SearchDidLoad {
        generation,
        entry: Some(entry(1, "bulbasaur")),
    });

    let list = &store.state().list;
    assert_eq!(list.entries, vec![entry(1, "bulbasaur")]);
    assert!(!list.has_more);
    assert!(list.error.is_none());
    assert!(!list.is_loading);
}

#[test]
fn search_failure_other_than_not_found_is_visible() {
    let mut store = EffectStore::new(AppState::new(2), reducer);
    let generation = search_generation(&store.dispatch(Action::SearchChange("pika".into())).effects);

    store.dispatch(Action::SearchDidError {
        generation,
        error: "Failed to fetch Pokémon details (HTTP 500)".into(),
    });

    let list = &store.state().list;
    assert!(list.entries.is_empty());
    assert!(!list.has_more);
    assert_eq!(
        list.error.as_deref(),
        Some("Failed to fetch Pokémon details (HTTP 500)")
    );
}

#[test]
fn clearing_search_returns_to_listing_and_drops_singleton() {
    let mut store = EffectStore::new(AppState::new(2), reducer);
    let generation = search_generation(&store.dispatch(Action::SearchChange("bulbasaur".into())).effects);
    store.dispatch(Action::SearchDidLoad {
        generation,
        entry: Some(entry(1, "bulbasaur")),
    });

    let result = store.dispatch(Action::SearchChange("b".into()));
    assert_eq!(store.state().list.mode(), ListMode::Listing);
    assert_eq!(store.state().list.page_offset, 0);
    assert!(matches!(
        result.effects.as_slice(),
        [Effect::DebounceFirstPage { delay, .. }] if *delay == Duration::from_millis(200)
    ));
    let generation = page_generation(&result.effects);

    store.dispatch(Action::ListPageDidLoad {
        generation,
        offset: 0,
        page: page(vec![entry(7, "squirtle"), entry(8, "wartortle")], Some("next-url")),
    });

    let list = &store.state().list;
    assert_eq!(list.entries.len(), 2);
    assert!(list.entries.iter().all(|row| row.name != "bulbasaur"));
    assert!(list.has_more);
}

#[test]
fn only_latest_keystroke_result_applies() {
    let mut store = EffectStore::new(AppState::new(2), reducer);
    let first = search_generation(&store.dispatch(Action::SearchChange("ch".into())).effects);
    let second = search_generation(&store.dispatch(Action::SearchChange("cha".into())).effects);
    let third = search_generation(&store.dispatch(Action::SearchChange("char".into())).effects);
    assert!(first < second && second < third);

    // Latest completes first, then an earlier one straggles in.
    store.dispatch(Action::SearchDidLoad {
        generation: third,
        entry: None,
    });
    let stale = store.dispatch(Action::SearchDidLoad {
        generation: first,
        entry: Some(entry(4, "charmander")),
    });

    assert!(!stale.changed);
    assert!(store.state().list.entries.is_empty());
    assert_eq!(
        store.state().list.error.as_deref(),
        Some("No Pokémon found with that name.")
    );
}

#[test]
fn refresh_resets_search_and_reproduces_first_page() {
    let mut harness = EffectStoreTestHarness::new(AppState::new(2), reducer);
    harness.dispatch_collect(Action::SearchChange("pikachu".into()));
    harness.drain_effects();

    harness.dispatch_collect(Action::ListRefresh);
    harness.assert_state(|s| s.list.search_text.is_empty());
    harness.assert_state(|s| s.list.page_offset == 0);
    harness.assert_state(|s| s.list.is_loading);

    let effects = harness.drain_effects();
    effects.effects_count(1);
    effects.effects_first_matches(|e| matches!(e, Effect::DebounceFirstPage { limit: 2, .. }));

    // Init (none), search (1), refresh (2).
    harness.complete_action(Action::ListPageDidLoad {
        generation: 2,
        offset: 0,
        page: page(first_page(), None),
    });
    let (changed, total) = harness.process_emitted();
    assert_eq!((changed, total), (1, 1));

    harness.assert_state(|s| s.list.entries == first_page());
    harness.assert_state(|s| s.list.error.is_none());
}

#[test]
fn refresh_after_paging_starts_over() {
    let mut store = EffectStore::new(AppState::new(2), reducer);
    let generation = page_generation(&store.dispatch(Action::Init).effects);
    store.dispatch(Action::ListPageDidLoad {
        generation,
        offset: 0,
        page: page(first_page(), Some("next-url")),
    });
    let paging = page_generation(&store.dispatch(Action::ListLoadMore).effects);

    let generation = page_generation(&store.dispatch(Action::ListRefresh).effects);
    assert!(store.state().list.entries.is_empty());

    // The second page lands after the refresh and must not be appended.
    let late = store.dispatch(Action::ListPageDidLoad {
        generation: paging,
        offset: 2,
        page: page(vec![entry(3, "venusaur")], None),
    });
    assert!(!late.changed);

    store.dispatch(Action::ListPageDidLoad {
        generation,
        offset: 0,
        page: page(first_page(), Some("next-url")),
    });
    assert_eq!(store.state().list.entries, first_page());
    assert_eq!(store.state().list.page_offset, 0);
}

#[test]
fn detail_keeps_latest_identifier_when_older_finishes_last() {
    let mut store = EffectStore::new(AppState::new(2), reducer);
    let x = detail_generation(&store.dispatch(Action::DetailOpen("pikachu".into())).effects);
    let y = detail_generation(&store.dispatch(Action::DetailOpen("eevee".into())).effects);

    store.dispatch(Action::DetailDidLoad {
        generation: y,
        identifier: "eevee".into(),
        entity: entity(133, "eevee", "normal"),
    });
    store.dispatch(Action::DetailDidLoad {
        generation: x,
        identifier: "pikachu".into(),
        entity: entity(25, "pikachu", "electric"),
    });

    let detail = &store.state().detail;
    assert_eq!(detail.entity.as_ref().map(|e| e.name.as_str()), Some("eevee"));
    assert!(!detail.is_loading);
}

#[test]
fn detail_keeps_latest_identifier_when_older_finishes_first() {
    let mut store = EffectStore::new(AppState::new(2), reducer);
    let x = detail_generation(&store.dispatch(Action::DetailOpen("pikachu".into())).effects);
    let y = detail_generation(&store.dispatch(Action::DetailOpen("eevee".into())).effects);

    store.dispatch(Action::DetailDidError {
        generation: x,
        identifier: "pikachu".into(),
        error: "boom".into(),
    });
    assert!(store.state().detail.is_loading);
    assert!(store.state().detail.error.is_none());

    store.dispatch(Action::DetailDidError {
        generation: y,
        identifier: "eevee".into(),
        error: "Failed to fetch Pokémon details: not found".into(),
    });

    let detail = &store.state().detail;
    assert!(detail.entity.is_none());
    assert_eq!(
        detail.error.as_deref(),
        Some("Failed to fetch Pokémon details: not found")
    );
}

#[test]
fn detail_error_for_new_identifier_drops_previous_entity() {
    let mut store = EffectStore::new(AppState::new(2), reducer);
    let x = detail_generation(&store.dispatch(Action::DetailOpen("pikachu".into())).effects);
    store.dispatch(Action::DetailDidLoad {
        generation: x,
        identifier: "pikachu".into(),
        entity: entity(25, "pikachu", "electric"),
    });
    assert!(store.state().detail.entity.is_some());

    let y = detail_generation(&store.dispatch(Action::DetailOpen("eevee".into())).effects);
    assert!(store.state().detail.entity.is_none());

    store.dispatch(Action::DetailDidError {
        generation: y,
        identifier: "eevee".into(),
        error: "Failed to fetch Pokémon details: HTTP 500".into(),
    });

    let detail = &store.state().detail;
    assert_eq!(detail.identifier.as_deref(), Some("eevee"));
    assert!(detail.entity.is_none());
    assert!(detail.error.is_some());
    assert!(!detail.is_loading);
}

#[test]
fn open_selected_row_switches_view_and_back() {
    let mut harness = EffectStoreTestHarness::new(AppState::new(2), reducer);
    harness.complete_action(Action::ListPageDidLoad {
        generation: 0,
        offset: 0,
        page: page(first_page(), None),
    });
    harness.process_emitted();
    harness.assert_state(|s| s.list.entries.len() == 2);

    harness.dispatch_collect(Action::ListSelect(1));
    harness.dispatch_collect(Action::DetailOpenSelected);
    harness.assert_state(|s| s.view == View::Detail);
    harness.assert_state(|s| s.detail.identifier.as_deref() == Some("ivysaur"));

    let effects = harness.drain_effects();
    effects.effects_first_matches(
        |e| matches!(e, Effect::FetchDetail { identifier, .. } if identifier == "ivysaur"),
    );

    harness.dispatch_collect(Action::DetailClose);
    harness.assert_state(|s| s.view == View::List);
    harness.assert_state(|s| s.detail.identifier.is_none());
}

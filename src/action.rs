use serde::{Deserialize, Serialize};

use crate::state::{EntityDetail, ListEntry, ListPage};

#[derive(tui_dispatch::Action, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[action(infer_categories)]
pub enum Action {
    Init,

    // Search field. `SearchChange` carries the whole text after each edit.
    SearchStart,
    SearchFinish,
    SearchChange(String),
    SearchDidLoad {
        generation: u64,
        entry: Option<ListEntry>,
    },
    SearchDidError {
        generation: u64,
        error: String,
    },

    ListLoadMore,
    ListRefresh,
    ListPageDidLoad {
        generation: u64,
        offset: u32,
        page: ListPage,
    },
    ListPageDidError {
        generation: u64,
        error: String,
    },

    SelectionMove(i16),
    SelectionPage(i16),
    SelectionJumpTop,
    SelectionJumpBottom,
    ListSelect(usize),

    DetailOpen(String),
    DetailOpenSelected,
    DetailDidLoad {
        generation: u64,
        identifier: String,
        entity: EntityDetail,
    },
    DetailDidError {
        generation: u64,
        identifier: String,
        error: String,
    },
    DetailClose,
    DetailNext,
    DetailPrev,

    UiToggleTheme,
    UiTerminalResize(u16, u16),
    Tick,
    Quit,
}

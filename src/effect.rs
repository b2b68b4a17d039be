//! Effects - side effects declared by the reducer

use std::time::Duration;

use tui_dispatch::TaskKey;

/// Keystroke-driven fetches share this key so only the latest timer fires.
pub const LIST_INPUT_TASK: &str = "list_input";

/// Every request carries the controller generation it was issued under so
/// the reducer can drop completions that have been superseded.
#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    /// Fetch a listing page right away.
    FetchPage {
        generation: u64,
        limit: u32,
        offset: u32,
    },
    /// Fetch the first listing page once input has been quiet for `delay`.
    DebounceFirstPage {
        generation: u64,
        limit: u32,
        delay: Duration,
    },
    /// Look `query` up by name once input has been quiet for `delay`.
    DebounceSearch {
        generation: u64,
        query: String,
        delay: Duration,
    },
    FetchDetail {
        generation: u64,
        identifier: String,
    },
}

impl Effect {
    /// Key of the task this effect runs under. A new task replaces a pending
    /// one with the same key.
    pub fn task_key(&self) -> TaskKey {
        match self {
            Effect::FetchPage { .. } => TaskKey::new("list_page"),
            Effect::DebounceFirstPage { .. } | Effect::DebounceSearch { .. } => {
                TaskKey::new(LIST_INPUT_TASK)
            }
            Effect::FetchDetail { identifier, .. } => TaskKey::new(format!("detail_{identifier}")),
        }
    }
}

//! Pokedex - paginated PokeAPI browser with incremental search
//!
//! The library exposes the store pieces (state, actions, effects, reducer),
//! the API client, and the UI so they can be tested without a terminal.

pub mod action;
pub mod api;
pub mod effect;
pub mod logging;
pub mod reducer;
pub mod state;
pub mod ui;

//! PokeAPI client
//!
//! Every call is a single GET with no retries, caching, or timeout policy.

use std::sync::OnceLock;

use serde::Deserialize;
use thiserror::Error;

use crate::state::{EntityDetail, ListEntry, ListPage, StatValue, TypeTag};

pub const API_BASE: &str = "https://pokeapi.co/api/v2";

const LIST_WHAT: &str = "Pokémon list";
const DETAIL_WHAT: &str = "Pokémon details";

/// A failed round trip to the catalog API.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("Failed to reach the Pokémon API: {0}")]
    Transport(String),

    #[error("Failed to fetch {what} (HTTP {status})")]
    Status { what: &'static str, status: u16 },

    #[error("Failed to fetch {what}: not found")]
    NotFound { what: &'static str },

    #[error("Failed to read {what}: {message}")]
    Decode { what: &'static str, message: String },
}

impl FetchError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, FetchError::NotFound { .. })
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Status { status, .. } => Some(*status),
            FetchError::NotFound { .. } => Some(404),
            FetchError::Transport(_) | FetchError::Decode { .. } => None,
        }
    }

    fn from_status(what: &'static str, status: u16) -> Self {
        if status == 404 {
            FetchError::NotFound { what }
        } else {
            FetchError::Status { what, status }
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
struct NamedResource {
    name: String,
    url: String,
}

#[derive(Clone, Debug, Deserialize)]
struct ListResponse {
    count: u32,
    next: Option<String>,
    previous: Option<String>,
    results: Vec<NamedResource>,
}

#[derive(Clone, Debug, Deserialize)]
struct PokemonResponse {
    id: u32,
    name: String,
    types: Vec<PokemonTypeSlot>,
    stats: Vec<PokemonStatSlot>,
    sprites: serde_json::Value,
}

#[derive(Clone, Debug, Deserialize)]
struct PokemonTypeSlot {
    #[serde(rename = "type")]
    type_info: NamedResource,
}

#[derive(Clone, Debug, Deserialize)]
struct PokemonStatSlot {
    base_stat: u32,
    stat: NamedResource,
}

pub async fn list_entries(limit: u32, offset: u32) -> Result<ListPage, FetchError> {
    let url = format!("{API_BASE}/pokemon?limit={limit}&offset={offset}");
    let bytes = fetch_bytes(&url, LIST_WHAT).await?;
    parse_list_page(&bytes, limit)
}

pub async fn get_entity(identifier: &str) -> Result<EntityDetail, FetchError> {
    let url = entity_url(identifier);
    let bytes = fetch_bytes(&url, DETAIL_WHAT).await?;
    parse_entity_detail(&bytes)
}

/// Look a single entry up by exact name or id. Unknown names are `Ok(None)`.
pub async fn find_entry_by_name(name: &str) -> Result<Option<ListEntry>, FetchError> {
    let query = name.trim().to_lowercase();
    match get_entity(&query).await {
        Ok(entity) => Ok(Some(entry_for(&entity))),
        Err(err) if err.is_not_found() => {
            tracing::debug!(%query, "name lookup found nothing");
            Ok(None)
        }
        Err(err) => Err(err),
    }
}

/// Detail URL for a name or id. The identifier always stays one path segment.
pub fn entity_url(identifier: &str) -> String {
    format!("{API_BASE}/pokemon/{}", urlencoding::encode(identifier))
}

/// The list row a detail lookup stands in for during search.
pub fn entry_for(entity: &EntityDetail) -> ListEntry {
    ListEntry {
        name: entity.name.clone(),
        url: format!("{API_BASE}/pokemon/{}/", entity.id),
    }
}

pub fn parse_list_page(bytes: &[u8], limit: u32) -> Result<ListPage, FetchError> {
    let response: ListResponse = serde_json::from_slice(bytes).map_err(|err| FetchError::Decode {
        what: LIST_WHAT,
        message: err.to_string(),
    })?;
    let entries = response
        .results
        .into_iter()
        .take(limit as usize)
        .map(|entry| ListEntry {
            name: entry.name,
            url: entry.url,
        })
        .collect();
    Ok(ListPage {
        total_count: response.count,
        next: response.next,
        previous: response.previous,
        entries,
    })
}

pub fn parse_entity_detail(bytes: &[u8]) -> Result<EntityDetail, FetchError> {
    let response: PokemonResponse =
        serde_json::from_slice(bytes).map_err(|err| FetchError::Decode {
            what: DETAIL_WHAT,
            message: err.to_string(),
        })?;

    let types = response
        .types
        .into_iter()
        .map(|slot| TypeTag {
            name: slot.type_info.name,
        })
        .collect();
    let stats = response
        .stats
        .into_iter()
        .map(|slot| StatValue {
            name: slot.stat.name,
            base_value: slot.base_stat.min(u8::MAX as u32) as u8,
        })
        .collect();

    Ok(EntityDetail {
        id: response.id,
        name: response.name,
        image_url: pointer_string(&response.sprites, "/other/official-artwork/front_default"),
        types,
        stats,
    })
}

fn pointer_string(value: &serde_json::Value, pointer: &str) -> Option<String> {
    value
        .pointer(pointer)
        .and_then(|val| val.as_str())
        .map(|s| s.to_string())
}

async fn fetch_bytes(url: &str, what: &'static str) -> Result<Vec<u8>, FetchError> {
    tracing::debug!(%url, "GET");
    let response = http_client()
        .get(url)
        .send()
        .await
        .map_err(|err| FetchError::Transport(err.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        tracing::warn!(%url, status = status.as_u16(), "request failed");
        return Err(FetchError::from_status(what, status.as_u16()));
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|err| FetchError::Transport(err.to_string()))?;
    Ok(bytes.to_vec())
}

fn http_client() -> &'static reqwest::Client {
    static CLIENT: OnceLock<reqwest::Client> = OnceLock::new();
    CLIENT.get_or_init(reqwest::Client::new)
}

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::auth::{current_user, AuthToken};
use crate::errors::AppError;
use crate::models::{Empty, Entry};
use crate::state::AppState;
use crate::store::{EntryFilter, EntryMeta, EntryUpdate};

/// Advent calendars run from December 1st to the 25th.
pub const FIRST_DAY: i32 = 1;
pub const LAST_DAY: i32 = 25;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ListEntriesRequest {
    pub user_id: i64,
    /// 0 lists every year.
    pub year: i32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ListEntriesResponse {
    pub entries: Vec<Entry>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateEntryRequest {
    pub calendar_id: i64,
    pub day: i32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateEntryRequest {
    pub entry_id: i64,
    pub comment: String,
    pub url: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeleteEntryRequest {
    pub entry_id: i64,
}

pub async fn list_entries(
    state: &AppState,
    req: &ListEntriesRequest,
) -> Result<ListEntriesResponse, AppError> {
    let filter = EntryFilter {
        user_id: req.user_id,
        year: (req.year != 0).then_some(req.year),
    };
    let entries: Vec<Entry> = state
        .store
        .list_entries(&filter)
        .await?
        .into_iter()
        .map(Entry::from)
        .collect();

    debug!("Listed {} entries for {filter:?}", entries.len());
    Ok(ListEntriesResponse { entries })
}

/// Claims a day in a calendar. Only the new id is returned; the client
/// fills in the rest with `update_entry`.
pub async fn create_entry(
    state: &AppState,
    token: &AuthToken,
    req: &CreateEntryRequest,
) -> Result<Entry, AppError> {
    let user = current_user(state, token).await?;

    state
        .store
        .find_calendar(req.calendar_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("calendar {} not found", req.calendar_id)))?;

    if !(FIRST_DAY..=LAST_DAY).contains(&req.day) {
        return Err(AppError::InvalidArgument(format!(
            "day must be between {FIRST_DAY} and {LAST_DAY}, got {}",
            req.day
        )));
    }

    let id = state
        .store
        .insert_entry(user.id, req.calendar_id, req.day)
        .await?;
    info!(
        "User {} claimed day {} of calendar {} as entry {id}",
        user.id, req.day, req.calendar_id
    );

    Ok(Entry {
        id,
        ..Default::default()
    })
}

/// Link metadata is fetched before anything is written, so a failed fetch
/// leaves the entry untouched. The update itself is a single owner-scoped
/// statement; a non-owner gets the stored entry back unchanged.
pub async fn update_entry(
    state: &AppState,
    token: &AuthToken,
    req: &UpdateEntryRequest,
) -> Result<Entry, AppError> {
    let user = current_user(state, token).await?;

    let meta = if req.url.is_empty() {
        None
    } else {
        Some(state.meta_fetcher.fetch(&req.url).await?)
    };

    let update = EntryUpdate {
        comment: &req.comment,
        url: &req.url,
        meta: meta.as_ref().map(|m| EntryMeta {
            title: &m.title,
            image_url: &m.image_url,
        }),
    };
    let affected = state
        .store
        .update_entry(req.entry_id, user.id, &update)
        .await?;
    info!(
        "User {} updated entry {} ({affected} rows)",
        user.id, req.entry_id
    );

    let row = state
        .store
        .find_entry(req.entry_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("entry {} not found", req.entry_id)))?;

    Ok(Entry {
        id: row.id,
        comment: row.comment,
        url: row.url,
        title: row.title,
        image_url: row.image_url,
        ..Default::default()
    })
}

pub async fn delete_entry(
    state: &AppState,
    token: &AuthToken,
    req: &DeleteEntryRequest,
) -> Result<Empty, AppError> {
    let user = current_user(state, token).await?;

    // TODO: let the calendar owner cancel entries too
    let affected = state.store.delete_entry(req.entry_id, user.id).await?;
    info!(
        "User {} deleted entry {} ({affected} rows)",
        user.id, req.entry_id
    );

    Ok(Empty {})
}

//! Storage access for users, calendars and entries.
//!
//! Operations go through the `Store` trait so the service never touches a
//! connection directly. `AppState` carries an `Arc<dyn Store>`: `PgStore` in
//! production, `MemoryStore` in tests.
//!
//! Owner-scoped mutations take both the row id and the caller's user id and
//! report the number of affected rows; a mismatch affects zero rows and is
//! not an error.

use std::collections::HashMap;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{
    CalendarRow, CalendarWithOwnerRow, EntryRow, EntryWithCalendarRow, EntryWithOwnerRow,
    NewUser, UserRow,
};

#[cfg(test)]
pub mod memory;
pub mod postgres;

#[cfg(test)]
pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Conflicts with an existing row: {0}")]
    Conflict(String),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Filters for listing calendars. `None` means "do not filter".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CalendarFilter {
    pub year: i32,
    pub user_id: Option<i64>,
    /// Case-insensitive substring of the title or the description.
    pub query: Option<String>,
    pub limit: Option<i64>,
}

/// Filters for listing a user's entries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntryFilter {
    pub user_id: i64,
    pub year: Option<i32>,
}

/// Column values written by an entry update.
/// `meta` is only present when link metadata was fetched for `url`.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryUpdate<'a> {
    pub comment: &'a str,
    pub url: &'a str,
    pub meta: Option<EntryMeta<'a>>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntryMeta<'a> {
    pub title: &'a str,
    pub image_url: &'a str,
}

#[async_trait]
pub trait Store: Send + Sync {
    // Calendars

    /// Calendars matching `filter`, newest id first.
    async fn list_calendars(&self, filter: &CalendarFilter)
        -> StoreResult<Vec<CalendarWithOwnerRow>>;

    /// Number of entries per calendar, computed in a single aggregate query.
    /// Calendars without entries are absent from the map.
    async fn count_entries(&self, calendar_ids: &[i64]) -> StoreResult<HashMap<i64, i64>>;

    async fn find_calendar(&self, id: i64) -> StoreResult<Option<CalendarRow>>;

    async fn insert_calendar(
        &self,
        user_id: i64,
        title: &str,
        description: &str,
        year: i32,
    ) -> StoreResult<i64>;

    async fn update_calendar(
        &self,
        id: i64,
        user_id: i64,
        title: &str,
        description: &str,
    ) -> StoreResult<u64>;

    async fn delete_calendar(&self, id: i64, user_id: i64) -> StoreResult<u64>;

    // Entries

    /// Entries of one calendar ordered by day.
    async fn calendar_entries(&self, calendar_id: i64) -> StoreResult<Vec<EntryWithOwnerRow>>;

    /// Entries owned by a user ordered by day.
    async fn list_entries(&self, filter: &EntryFilter) -> StoreResult<Vec<EntryWithCalendarRow>>;

    async fn find_entry(&self, id: i64) -> StoreResult<Option<EntryRow>>;

    /// Inserts an entry with empty title, comment, url and image url.
    async fn insert_entry(&self, user_id: i64, calendar_id: i64, day: i32) -> StoreResult<i64>;

    async fn update_entry(
        &self,
        id: i64,
        user_id: i64,
        update: &EntryUpdate<'_>,
    ) -> StoreResult<u64>;

    async fn delete_entry(&self, id: i64, user_id: i64) -> StoreResult<u64>;

    // Users

    async fn find_user(&self, id: i64) -> StoreResult<Option<UserRow>>;

    async fn find_user_by_auth(
        &self,
        auth_provider: &str,
        auth_uid: &str,
    ) -> StoreResult<Option<UserRow>>;

    async fn insert_user(&self, user: &NewUser<'_>) -> StoreResult<i64>;

    async fn update_user_icon(&self, id: i64, icon_url: &str) -> StoreResult<u64>;

    async fn update_user_name(&self, id: i64, name: &str) -> StoreResult<u64>;
}

/// Escapes LIKE wildcards so the query is matched as a literal substring.
pub fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

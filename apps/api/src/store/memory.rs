//! In-memory `Store` used by the service tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::models::{
    CalendarRow, CalendarWithOwnerRow, EntryRow, EntryWithCalendarRow, EntryWithOwnerRow,
    NewUser, UserRow,
};
use crate::store::{CalendarFilter, EntryFilter, EntryUpdate, Store, StoreError, StoreResult};

#[derive(Default)]
struct Tables {
    users: Vec<UserRow>,
    calendars: Vec<CalendarRow>,
    entries: Vec<EntryRow>,
    next_id: i64,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn user(&self, id: i64) -> Option<&UserRow> {
        self.users.iter().find(|u| u.id == id)
    }
}

/// Ids share one sequence across tables so an entry id never collides
/// with a calendar id by accident.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    count_queries: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn seed_user(&self, name: &str, auth_provider: &str, auth_uid: &str) -> UserRow {
        let mut t = self.tables.lock().await;
        let row = UserRow {
            id: t.next_id(),
            name: name.to_string(),
            icon_url: format!("https://example.com/{auth_uid}.png"),
            auth_provider: auth_provider.to_string(),
            auth_uid: auth_uid.to_string(),
        };
        t.users.push(row.clone());
        row
    }

    pub async fn seed_calendar(&self, user_id: i64, title: &str, year: i32) -> CalendarRow {
        let mut t = self.tables.lock().await;
        let row = CalendarRow {
            id: t.next_id(),
            user_id,
            title: title.to_string(),
            description: format!("{title} description"),
            year,
        };
        t.calendars.push(row.clone());
        row
    }

    pub async fn seed_entry(&self, user_id: i64, calendar_id: i64, day: i32) -> EntryRow {
        let mut t = self.tables.lock().await;
        let row = EntryRow {
            id: t.next_id(),
            user_id,
            calendar_id,
            day,
            title: String::new(),
            comment: format!("day {day}"),
            url: String::new(),
            image_url: String::new(),
        };
        t.entries.push(row.clone());
        row
    }

    pub async fn users(&self) -> Vec<UserRow> {
        self.tables.lock().await.users.clone()
    }

    pub async fn calendars(&self) -> Vec<CalendarRow> {
        self.tables.lock().await.calendars.clone()
    }

    pub async fn entries(&self) -> Vec<EntryRow> {
        self.tables.lock().await.entries.clone()
    }

    /// How many times `count_entries` has been called.
    pub fn count_queries(&self) -> usize {
        self.count_queries.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn list_calendars(
        &self,
        filter: &CalendarFilter,
    ) -> StoreResult<Vec<CalendarWithOwnerRow>> {
        let t = self.tables.lock().await;
        let needle = filter.query.as_ref().map(|q| q.to_lowercase());

        let mut rows: Vec<CalendarWithOwnerRow> = t
            .calendars
            .iter()
            .filter(|c| c.year == filter.year)
            .filter(|c| filter.user_id.map_or(true, |uid| c.user_id == uid))
            .filter(|c| {
                needle.as_ref().map_or(true, |n| {
                    c.title.to_lowercase().contains(n) || c.description.to_lowercase().contains(n)
                })
            })
            .filter_map(|c| {
                let owner = t.user(c.user_id)?;
                Some(CalendarWithOwnerRow {
                    id: c.id,
                    user_id: c.user_id,
                    title: c.title.clone(),
                    description: c.description.clone(),
                    year: c.year,
                    owner_name: owner.name.clone(),
                    owner_icon_url: owner.icon_url.clone(),
                })
            })
            .collect();

        rows.sort_by(|a, b| b.id.cmp(&a.id));
        if let Some(limit) = filter.limit {
            rows.truncate(limit.max(0) as usize);
        }
        Ok(rows)
    }

    async fn count_entries(&self, calendar_ids: &[i64]) -> StoreResult<HashMap<i64, i64>> {
        self.count_queries.fetch_add(1, Ordering::SeqCst);
        let t = self.tables.lock().await;
        let mut counts = HashMap::new();
        for e in t.entries.iter().filter(|e| calendar_ids.contains(&e.calendar_id)) {
            *counts.entry(e.calendar_id).or_insert(0) += 1;
        }
        Ok(counts)
    }

    async fn find_calendar(&self, id: i64) -> StoreResult<Option<CalendarRow>> {
        let t = self.tables.lock().await;
        Ok(t.calendars.iter().find(|c| c.id == id).cloned())
    }

    async fn insert_calendar(
        &self,
        user_id: i64,
        title: &str,
        description: &str,
        year: i32,
    ) -> StoreResult<i64> {
        let mut t = self.tables.lock().await;
        let id = t.next_id();
        t.calendars.push(CalendarRow {
            id,
            user_id,
            title: title.to_string(),
            description: description.to_string(),
            year,
        });
        Ok(id)
    }

    async fn update_calendar(
        &self,
        id: i64,
        user_id: i64,
        title: &str,
        description: &str,
    ) -> StoreResult<u64> {
        let mut t = self.tables.lock().await;
        let mut affected = 0;
        for c in t
            .calendars
            .iter_mut()
            .filter(|c| c.id == id && c.user_id == user_id)
        {
            c.title = title.to_string();
            c.description = description.to_string();
            affected += 1;
        }
        Ok(affected)
    }

    async fn delete_calendar(&self, id: i64, user_id: i64) -> StoreResult<u64> {
        let mut t = self.tables.lock().await;
        let before = t.calendars.len();
        t.calendars.retain(|c| !(c.id == id && c.user_id == user_id));
        let affected = (before - t.calendars.len()) as u64;
        if affected > 0 {
            // Mirrors ON DELETE CASCADE.
            t.entries.retain(|e| e.calendar_id != id);
        }
        Ok(affected)
    }

    async fn calendar_entries(&self, calendar_id: i64) -> StoreResult<Vec<EntryWithOwnerRow>> {
        let t = self.tables.lock().await;
        let mut rows: Vec<EntryWithOwnerRow> = t
            .entries
            .iter()
            .filter(|e| e.calendar_id == calendar_id)
            .filter_map(|e| {
                let owner = t.user(e.user_id)?;
                Some(EntryWithOwnerRow {
                    id: e.id,
                    user_id: e.user_id,
                    calendar_id: e.calendar_id,
                    day: e.day,
                    title: e.title.clone(),
                    comment: e.comment.clone(),
                    url: e.url.clone(),
                    image_url: e.image_url.clone(),
                    owner_name: owner.name.clone(),
                    owner_icon_url: owner.icon_url.clone(),
                })
            })
            .collect();
        rows.sort_by_key(|e| (e.day, e.id));
        Ok(rows)
    }

    async fn list_entries(&self, filter: &EntryFilter) -> StoreResult<Vec<EntryWithCalendarRow>> {
        let t = self.tables.lock().await;
        let mut rows: Vec<EntryWithCalendarRow> = t
            .entries
            .iter()
            .filter(|e| e.user_id == filter.user_id)
            .filter_map(|e| {
                let owner = t.user(e.user_id)?;
                let calendar = t.calendars.iter().find(|c| c.id == e.calendar_id)?;
                if filter.year.map_or(false, |y| calendar.year != y) {
                    return None;
                }
                Some(EntryWithCalendarRow {
                    id: e.id,
                    user_id: e.user_id,
                    calendar_id: e.calendar_id,
                    day: e.day,
                    title: e.title.clone(),
                    comment: e.comment.clone(),
                    url: e.url.clone(),
                    image_url: e.image_url.clone(),
                    calendar_title: calendar.title.clone(),
                    calendar_description: calendar.description.clone(),
                    calendar_year: calendar.year,
                    owner_name: owner.name.clone(),
                    owner_icon_url: owner.icon_url.clone(),
                })
            })
            .collect();
        rows.sort_by_key(|e| (e.day, e.id));
        Ok(rows)
    }

    async fn find_entry(&self, id: i64) -> StoreResult<Option<EntryRow>> {
        let t = self.tables.lock().await;
        Ok(t.entries.iter().find(|e| e.id == id).cloned())
    }

    async fn insert_entry(&self, user_id: i64, calendar_id: i64, day: i32) -> StoreResult<i64> {
        let mut t = self.tables.lock().await;
        let id = t.next_id();
        t.entries.push(EntryRow {
            id,
            user_id,
            calendar_id,
            day,
            title: String::new(),
            comment: String::new(),
            url: String::new(),
            image_url: String::new(),
        });
        Ok(id)
    }

    async fn update_entry(
        &self,
        id: i64,
        user_id: i64,
        update: &EntryUpdate<'_>,
    ) -> StoreResult<u64> {
        let mut t = self.tables.lock().await;
        let mut affected = 0;
        for e in t
            .entries
            .iter_mut()
            .filter(|e| e.id == id && e.user_id == user_id)
        {
            e.comment = update.comment.to_string();
            e.url = update.url.to_string();
            if let Some(meta) = &update.meta {
                e.title = meta.title.to_string();
                e.image_url = meta.image_url.to_string();
            }
            affected += 1;
        }
        Ok(affected)
    }

    async fn delete_entry(&self, id: i64, user_id: i64) -> StoreResult<u64> {
        let mut t = self.tables.lock().await;
        let before = t.entries.len();
        t.entries.retain(|e| !(e.id == id && e.user_id == user_id));
        Ok((before - t.entries.len()) as u64)
    }

    async fn find_user(&self, id: i64) -> StoreResult<Option<UserRow>> {
        let t = self.tables.lock().await;
        Ok(t.user(id).cloned())
    }

    async fn find_user_by_auth(
        &self,
        auth_provider: &str,
        auth_uid: &str,
    ) -> StoreResult<Option<UserRow>> {
        let t = self.tables.lock().await;
        Ok(t.users
            .iter()
            .find(|u| u.auth_provider == auth_provider && u.auth_uid == auth_uid)
            .cloned())
    }

    async fn insert_user(&self, user: &NewUser<'_>) -> StoreResult<i64> {
        let mut t = self.tables.lock().await;
        if t.users
            .iter()
            .any(|u| u.auth_provider == user.auth_provider && u.auth_uid == user.auth_uid)
        {
            return Err(StoreError::Conflict(format!(
                "user {}/{} already exists",
                user.auth_provider, user.auth_uid
            )));
        }
        let id = t.next_id();
        t.users.push(UserRow {
            id,
            name: user.name.to_string(),
            icon_url: user.icon_url.to_string(),
            auth_provider: user.auth_provider.to_string(),
            auth_uid: user.auth_uid.to_string(),
        });
        Ok(id)
    }

    async fn update_user_icon(&self, id: i64, icon_url: &str) -> StoreResult<u64> {
        let mut t = self.tables.lock().await;
        Ok(match t.users.iter_mut().find(|u| u.id == id) {
            Some(u) => {
                u.icon_url = icon_url.to_string();
                1
            }
            None => 0,
        })
    }

    async fn update_user_name(&self, id: i64, name: &str) -> StoreResult<u64> {
        let mut t = self.tables.lock().await;
        Ok(match t.users.iter_mut().find(|u| u.id == id) {
            Some(u) => {
                u.name = name.to_string();
                1
            }
            None => 0,
        })
    }
}

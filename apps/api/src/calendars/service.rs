use chrono::Datelike;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::auth::{current_user, AuthToken};
use crate::errors::AppError;
use crate::models::{Calendar, Empty, Entry, User};
use crate::state::AppState;
use crate::store::CalendarFilter;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ListCalendarsRequest {
    pub year: i32,
    /// 0 lists every owner.
    pub user_id: i64,
    /// Empty matches everything.
    pub query: String,
    /// 0 means unbounded.
    pub page_size: i32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ListCalendarsResponse {
    pub calendars: Vec<Calendar>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GetCalendarRequest {
    pub calendar_id: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GetCalendarResponse {
    pub calendar: Calendar,
    pub entries: Vec<Entry>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateCalendarRequest {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateCalendarRequest {
    pub calendar_id: i64,
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeleteCalendarRequest {
    pub calendar_id: i64,
}

/// Year stamped on newly created calendars.
pub fn current_year() -> i32 {
    chrono::Local::now().year()
}

impl ListCalendarsRequest {
    fn to_filter(&self) -> Result<CalendarFilter, AppError> {
        if self.page_size < 0 {
            return Err(AppError::InvalidArgument(format!(
                "page_size must not be negative, got {}",
                self.page_size
            )));
        }
        Ok(CalendarFilter {
            year: self.year,
            user_id: (self.user_id != 0).then_some(self.user_id),
            query: (!self.query.is_empty()).then(|| self.query.clone()),
            limit: (self.page_size > 0).then_some(i64::from(self.page_size)),
        })
    }
}

pub async fn list_calendars(
    state: &AppState,
    req: &ListCalendarsRequest,
) -> Result<ListCalendarsResponse, AppError> {
    let filter = req.to_filter()?;
    let mut calendars: Vec<Calendar> = state
        .store
        .list_calendars(&filter)
        .await?
        .into_iter()
        .map(Calendar::from)
        .collect();

    if !calendars.is_empty() {
        bind_entry_counts(state, &mut calendars).await?;
    }

    debug!("Listed {} calendars for {filter:?}", calendars.len());
    Ok(ListCalendarsResponse { calendars })
}

/// Fills `entry_count` for every calendar with one aggregate query.
async fn bind_entry_counts(state: &AppState, calendars: &mut [Calendar]) -> Result<(), AppError> {
    let ids: Vec<i64> = calendars.iter().map(|c| c.id).collect();
    let counts = state.store.count_entries(&ids).await?;
    for calendar in calendars.iter_mut() {
        calendar.entry_count = counts.get(&calendar.id).copied().unwrap_or(0);
    }
    Ok(())
}

pub async fn get_calendar(
    state: &AppState,
    req: &GetCalendarRequest,
) -> Result<GetCalendarResponse, AppError> {
    let row = state
        .store
        .find_calendar(req.calendar_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("calendar {} not found", req.calendar_id)))?;

    let owner = state.store.find_user(row.user_id).await?;
    let entries: Vec<Entry> = state
        .store
        .calendar_entries(row.id)
        .await?
        .into_iter()
        .map(Entry::from)
        .collect();

    let mut calendar = Calendar::from(row);
    calendar.owner = owner.as_ref().map(User::from);
    calendar.entry_count = entries.len() as i64;

    Ok(GetCalendarResponse { calendar, entries })
}

pub async fn create_calendar(
    state: &AppState,
    token: &AuthToken,
    req: &CreateCalendarRequest,
) -> Result<Calendar, AppError> {
    let user = current_user(state, token).await?;

    let id = state
        .store
        .insert_calendar(user.id, &req.title, &req.description, current_year())
        .await?;
    info!("User {} created calendar {id}", user.id);

    let row = state
        .store
        .find_calendar(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("calendar {id} not found")))?;
    Ok(Calendar::from(row))
}

/// Only the owner's update takes effect. Anyone else gets the stored
/// calendar back unchanged and no error.
pub async fn update_calendar(
    state: &AppState,
    token: &AuthToken,
    req: &UpdateCalendarRequest,
) -> Result<Calendar, AppError> {
    let user = current_user(state, token).await?;

    let affected = state
        .store
        .update_calendar(req.calendar_id, user.id, &req.title, &req.description)
        .await?;
    info!(
        "User {} updated calendar {} ({affected} rows)",
        user.id, req.calendar_id
    );

    let row = state
        .store
        .find_calendar(req.calendar_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("calendar {} not found", req.calendar_id)))?;
    Ok(Calendar::from(row))
}

pub async fn delete_calendar(
    state: &AppState,
    token: &AuthToken,
    req: &DeleteCalendarRequest,
) -> Result<Empty, AppError> {
    let user = current_user(state, token).await?;

    let affected = state
        .store
        .delete_calendar(req.calendar_id, user.id)
        .await?;
    info!(
        "User {} deleted calendar {} ({affected} rows)",
        user.id, req.calendar_id
    );

    Ok(Empty {})
}

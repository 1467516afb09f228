use axum::{extract::State, Json};

use crate::auth::AuthToken;
use crate::calendars::service::{
    self, CreateCalendarRequest, DeleteCalendarRequest, GetCalendarRequest, GetCalendarResponse,
    ListCalendarsRequest, ListCalendarsResponse, UpdateCalendarRequest,
};
use crate::errors::AppError;
use crate::models::{Calendar, Empty};
use crate::state::AppState;

/// POST /adventar.v1.Adventar/ListCalendars
pub async fn handle_list_calendars(
    State(state): State<AppState>,
    Json(req): Json<ListCalendarsRequest>,
) -> Result<Json<ListCalendarsResponse>, AppError> {
    Ok(Json(service::list_calendars(&state, &req).await?))
}

/// POST /adventar.v1.Adventar/GetCalendar
pub async fn handle_get_calendar(
    State(state): State<AppState>,
    Json(req): Json<GetCalendarRequest>,
) -> Result<Json<GetCalendarResponse>, AppError> {
    Ok(Json(service::get_calendar(&state, &req).await?))
}

/// POST /adventar.v1.Adventar/CreateCalendar
pub async fn handle_create_calendar(
    State(state): State<AppState>,
    token: AuthToken,
    Json(req): Json<CreateCalendarRequest>,
) -> Result<Json<Calendar>, AppError> {
    Ok(Json(service::create_calendar(&state, &token, &req).await?))
}

/// POST /adventar.v1.Adventar/UpdateCalendar
pub async fn handle_update_calendar(
    State(state): State<AppState>,
    token: AuthToken,
    Json(req): Json<UpdateCalendarRequest>,
) -> Result<Json<Calendar>, AppError> {
    Ok(Json(service::update_calendar(&state, &token, &req).await?))
}

/// POST /adventar.v1.Adventar/DeleteCalendar
pub async fn handle_delete_calendar(
    State(state): State<AppState>,
    token: AuthToken,
    Json(req): Json<DeleteCalendarRequest>,
) -> Result<Json<Empty>, AppError> {
    Ok(Json(service::delete_calendar(&state, &token, &req).await?))
}

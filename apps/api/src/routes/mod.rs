pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::calendars::handlers as calendars;
use crate::entries::handlers as entries;
use crate::state::AppState;
use crate::users::handlers as users;

/// Every RPC is a JSON POST to `/<package>.<Service>/<Method>`.
pub const SERVICE_PATH: &str = "/adventar.v1.Adventar";

fn rpc(method: &str) -> String {
    format!("{SERVICE_PATH}/{method}")
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Calendars
        .route(&rpc("ListCalendars"), post(calendars::handle_list_calendars))
        .route(&rpc("GetCalendar"), post(calendars::handle_get_calendar))
        .route(&rpc("CreateCalendar"), post(calendars::handle_create_calendar))
        .route(&rpc("UpdateCalendar"), post(calendars::handle_update_calendar))
        .route(&rpc("DeleteCalendar"), post(calendars::handle_delete_calendar))
        // Entries
        .route(&rpc("ListEntries"), post(entries::handle_list_entries))
        .route(&rpc("CreateEntry"), post(entries::handle_create_entry))
        .route(&rpc("UpdateEntry"), post(entries::handle_update_entry))
        .route(&rpc("DeleteEntry"), post(entries::handle_delete_entry))
        // Users
        .route(&rpc("SignIn"), post(users::handle_sign_in))
        .route(&rpc("UpdateUser"), post(users::handle_update_user))
        .with_state(state)
}

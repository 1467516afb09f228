use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::user::User;

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct CalendarRow {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub description: String,
    pub year: i32,
}

/// A calendar joined with the public fields of its owner.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct CalendarWithOwnerRow {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub description: String,
    pub year: i32,
    pub owner_name: String,
    pub owner_icon_url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Calendar {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub year: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<User>,
    pub entry_count: i64,
}

impl From<CalendarRow> for Calendar {
    fn from(row: CalendarRow) -> Self {
        Calendar {
            id: row.id,
            title: row.title,
            description: row.description,
            year: row.year,
            owner: None,
            entry_count: 0,
        }
    }
}

impl From<CalendarWithOwnerRow> for Calendar {
    fn from(row: CalendarWithOwnerRow) -> Self {
        Calendar {
            id: row.id,
            title: row.title,
            description: row.description,
            year: row.year,
            owner: Some(User {
                id: row.user_id,
                name: row.owner_name,
                icon_url: row.owner_icon_url,
            }),
            entry_count: 0,
        }
    }
}

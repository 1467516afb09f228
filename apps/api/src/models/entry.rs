#![allow(dead_code)]

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::calendar::Calendar;
use crate::models::user::User;

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct EntryRow {
    pub id: i64,
    pub user_id: i64,
    pub calendar_id: i64,
    pub day: i32,
    pub title: String,
    pub comment: String,
    pub url: String,
    pub image_url: String,
}

/// An entry joined with the public fields of its owner.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct EntryWithOwnerRow {
    pub id: i64,
    pub user_id: i64,
    pub calendar_id: i64,
    pub day: i32,
    pub title: String,
    pub comment: String,
    pub url: String,
    pub image_url: String,
    pub owner_name: String,
    pub owner_icon_url: String,
}

/// An entry joined with its calendar and its owner.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct EntryWithCalendarRow {
    pub id: i64,
    pub user_id: i64,
    pub calendar_id: i64,
    pub day: i32,
    pub title: String,
    pub comment: String,
    pub url: String,
    pub image_url: String,
    pub calendar_title: String,
    pub calendar_description: String,
    pub calendar_year: i32,
    pub owner_name: String,
    pub owner_icon_url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Entry {
    pub id: i64,
    pub day: i32,
    pub title: String,
    pub comment: String,
    pub url: String,
    pub image_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<User>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calendar: Option<Calendar>,
}

impl From<EntryWithOwnerRow> for Entry {
    fn from(row: EntryWithOwnerRow) -> Self {
        Entry {
            id: row.id,
            day: row.day,
            title: row.title,
            comment: row.comment,
            url: row.url,
            image_url: row.image_url,
            owner: Some(User {
                id: row.user_id,
                name: row.owner_name,
                icon_url: row.owner_icon_url,
            }),
            calendar: None,
        }
    }
}

impl From<EntryWithCalendarRow> for Entry {
    fn from(row: EntryWithCalendarRow) -> Self {
        Entry {
            id: row.id,
            day: row.day,
            title: row.title,
            comment: row.comment,
            url: row.url,
            image_url: row.image_url,
            owner: Some(User {
                id: row.user_id,
                name: row.owner_name,
                icon_url: row.owner_icon_url,
            }),
            calendar: Some(Calendar {
                id: row.calendar_id,
                title: row.calendar_title,
                description: row.calendar_description,
                year: row.calendar_year,
                owner: None,
                entry_count: 0,
            }),
        }
    }
}

#![allow(dead_code)]

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct UserRow {
    pub id: i64,
    pub name: String,
    pub icon_url: String,
    pub auth_provider: String,
    pub auth_uid: String,
}

/// Fields of a user created on first sign-in.
#[derive(Debug, Clone, Copy)]
pub struct NewUser<'a> {
    pub name: &'a str,
    pub icon_url: &'a str,
    pub auth_provider: &'a str,
    pub auth_uid: &'a str,
}

/// Public user profile embedded in calendars and entries.
/// Auth identity never leaves the service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub icon_url: String,
}

impl From<&UserRow> for User {
    fn from(row: &UserRow) -> Self {
        User {
            id: row.id,
            name: row.name.clone(),
            icon_url: row.icon_url.clone(),
        }
    }
}

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::models::{
    CalendarRow, CalendarWithOwnerRow, EntryRow, EntryWithCalendarRow, EntryWithOwnerRow,
    NewUser, UserRow,
};
use crate::store::{
    escape_like, CalendarFilter, EntryFilter, EntryUpdate, Store, StoreError, StoreResult,
};

/// `Store` backed by a PostgreSQL pool.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        PgStore { pool }
    }
}

/// Maps unique-constraint violations to `StoreError::Conflict`.
fn classify(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db) = &err {
        if db.is_unique_violation() {
            return StoreError::Conflict(db.message().to_string());
        }
    }
    StoreError::Database(err)
}

fn list_calendars_query(filter: &CalendarFilter) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(
        r#"
        SELECT c.id, c.user_id, c.title, c.description, c.year,
               u.name AS owner_name, u.icon_url AS owner_icon_url
        FROM calendars AS c
        INNER JOIN users AS u ON u.id = c.user_id
        WHERE c.year = "#,
    );
    qb.push_bind(filter.year);

    if let Some(user_id) = filter.user_id {
        qb.push(" AND c.user_id = ").push_bind(user_id);
    }
    if let Some(query) = &filter.query {
        let pattern = format!("%{}%", escape_like(query));
        qb.push(" AND (c.title ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR c.description ILIKE ")
            .push_bind(pattern)
            .push(")");
    }

    qb.push(" ORDER BY c.id DESC");

    if let Some(limit) = filter.limit {
        qb.push(" LIMIT ").push_bind(limit);
    }
    qb
}

fn list_entries_query(filter: &EntryFilter) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(
        r#"
        SELECT e.id, e.user_id, e.calendar_id, e.day, e.title, e.comment, e.url, e.image_url,
               c.title AS calendar_title, c.description AS calendar_description,
               c.year AS calendar_year,
               u.name AS owner_name, u.icon_url AS owner_icon_url
        FROM entries AS e
        INNER JOIN users AS u ON u.id = e.user_id
        INNER JOIN calendars AS c ON c.id = e.calendar_id
        WHERE e.user_id = "#,
    );
    qb.push_bind(filter.user_id);

    if let Some(year) = filter.year {
        qb.push(" AND c.year = ").push_bind(year);
    }

    qb.push(" ORDER BY e.day, e.id");
    qb
}

#[async_trait]
impl Store for PgStore {
    async fn list_calendars(
        &self,
        filter: &CalendarFilter,
    ) -> StoreResult<Vec<CalendarWithOwnerRow>> {
        let mut qb = list_calendars_query(filter);
        let rows = qb
            .build_query_as::<CalendarWithOwnerRow>()
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn count_entries(&self, calendar_ids: &[i64]) -> StoreResult<HashMap<i64, i64>> {
        let rows: Vec<(i64, i64)> = sqlx::query_as(
            r#"
            SELECT calendar_id, COUNT(*)
            FROM entries
            WHERE calendar_id = ANY($1)
            GROUP BY calendar_id
            "#,
        )
        .bind(calendar_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().collect())
    }

    async fn find_calendar(&self, id: i64) -> StoreResult<Option<CalendarRow>> {
        Ok(sqlx::query_as::<_, CalendarRow>(
            "SELECT id, user_id, title, description, year FROM calendars WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn insert_calendar(
        &self,
        user_id: i64,
        title: &str,
        description: &str,
        year: i32,
    ) -> StoreResult<i64> {
        sqlx::query_scalar(
            r#"
            INSERT INTO calendars (user_id, title, description, year)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(user_id)
        .bind(title)
        .bind(description)
        .bind(year)
        .fetch_one(&self.pool)
        .await
        .map_err(classify)
    }

    async fn update_calendar(
        &self,
        id: i64,
        user_id: i64,
        title: &str,
        description: &str,
    ) -> StoreResult<u64> {
        let result = sqlx::query(
            "UPDATE calendars SET title = $1, description = $2 WHERE id = $3 AND user_id = $4",
        )
        .bind(title)
        .bind(description)
        .bind(id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    async fn delete_calendar(&self, id: i64, user_id: i64) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM calendars WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn calendar_entries(&self, calendar_id: i64) -> StoreResult<Vec<EntryWithOwnerRow>> {
        Ok(sqlx::query_as::<_, EntryWithOwnerRow>(
            r#"
            SELECT e.id, e.user_id, e.calendar_id, e.day, e.title, e.comment, e.url, e.image_url,
                   u.name AS owner_name, u.icon_url AS owner_icon_url
            FROM entries AS e
            INNER JOIN users AS u ON u.id = e.user_id
            WHERE e.calendar_id = $1
            ORDER BY e.day, e.id
            "#,
        )
        .bind(calendar_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn list_entries(&self, filter: &EntryFilter) -> StoreResult<Vec<EntryWithCalendarRow>> {
        let mut qb = list_entries_query(filter);
        let rows = qb
            .build_query_as::<EntryWithCalendarRow>()
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn find_entry(&self, id: i64) -> StoreResult<Option<EntryRow>> {
        Ok(sqlx::query_as::<_, EntryRow>(
            r#"
            SELECT id, user_id, calendar_id, day, title, comment, url, image_url
            FROM entries
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn insert_entry(&self, user_id: i64, calendar_id: i64, day: i32) -> StoreResult<i64> {
        sqlx::query_scalar(
            r#"
            INSERT INTO entries (user_id, calendar_id, day, title, comment, url, image_url)
            VALUES ($1, $2, $3, '', '', '', '')
            RETURNING id
            "#,
        )
        .bind(user_id)
        .bind(calendar_id)
        .bind(day)
        .fetch_one(&self.pool)
        .await
        .map_err(classify)
    }

    async fn update_entry(
        &self,
        id: i64,
        user_id: i64,
        update: &EntryUpdate<'_>,
    ) -> StoreResult<u64> {
        let query = match &update.meta {
            Some(meta) => sqlx::query(
                r#"
                UPDATE entries
                SET comment = $1, url = $2, title = $3, image_url = $4
                WHERE id = $5 AND user_id = $6
                "#,
            )
            .bind(update.comment)
            .bind(update.url)
            .bind(meta.title)
            .bind(meta.image_url),
            None => sqlx::query(
                "UPDATE entries SET comment = $1, url = $2 WHERE id = $3 AND user_id = $4",
            )
            .bind(update.comment)
            .bind(update.url),
        };

        let result = query.bind(id).bind(user_id).execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    async fn delete_entry(&self, id: i64, user_id: i64) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM entries WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn find_user(&self, id: i64) -> StoreResult<Option<UserRow>> {
        Ok(sqlx::query_as::<_, UserRow>(
            "SELECT id, name, icon_url, auth_provider, auth_uid FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn find_user_by_auth(
        &self,
        auth_provider: &str,
        auth_uid: &str,
    ) -> StoreResult<Option<UserRow>> {
        Ok(sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, name, icon_url, auth_provider, auth_uid
            FROM users
            WHERE auth_provider = $1 AND auth_uid = $2
            "#,
        )
        .bind(auth_provider)
        .bind(auth_uid)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn insert_user(&self, user: &NewUser<'_>) -> StoreResult<i64> {
        sqlx::query_scalar(
            r#"
            INSERT INTO users (name, icon_url, auth_provider, auth_uid)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(user.name)
        .bind(user.icon_url)
        .bind(user.auth_provider)
        .bind(user.auth_uid)
        .fetch_one(&self.pool)
        .await
        .map_err(classify)
    }

    async fn update_user_icon(&self, id: i64, icon_url: &str) -> StoreResult<u64> {
        let result = sqlx::query("UPDATE users SET icon_url = $1 WHERE id = $2")
            .bind(icon_url)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn update_user_name(&self, id: i64, name: &str) -> StoreResult<u64> {
        let result = sqlx::query("UPDATE users SET name = $1 WHERE id = $2")
            .bind(name)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

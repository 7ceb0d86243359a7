/// Season model and database operations
///
/// A season is a time-boxed league period. The system-wide invariant is that
/// **at most one season is active at any time**. This module owns that
/// invariant exclusively: both [`Season::create`] and [`Season::update`]
/// deactivate sibling seasons inside the same transaction that flips the new
/// flag, so a concurrent reader never observes zero-or-two active seasons
/// mid-change, and a mid-transaction failure rolls back both statements.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE seasons (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name TEXT NOT NULL,
///     year INTEGER,
///     start_date DATE,
///     end_date DATE,
///     is_active BOOLEAN NOT NULL DEFAULT FALSE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Season record
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Season {
    /// Unique season ID (UUID v4)
    pub id: Uuid,

    /// Season name, e.g. "Fall 2025 Tryouts"
    pub name: String,

    /// Optional calendar year
    pub year: Option<i32>,

    /// Optional first day of the season
    pub start_date: Option<NaiveDate>,

    /// Optional last day of the season
    pub end_date: Option<NaiveDate>,

    /// Whether this is the currently active season
    pub is_active: bool,

    /// When the season was created
    pub created_at: DateTime<Utc>,
}

/// Input for creating a new season
///
/// The created season always becomes the active one; both admin call sites
/// in this system activate on create.
#[derive(Debug, Clone, Default)]
pub struct CreateSeason {
    pub name: String,
    pub year: Option<i32>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// Input for a partial season update
///
/// Only `Some` fields are written; omitted fields keep their prior values.
#[derive(Debug, Clone, Default)]
pub struct UpdateSeason {
    pub name: Option<String>,
    pub year: Option<i32>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub is_active: Option<bool>,
}

impl UpdateSeason {
    /// True when no field is set; such an update is a no-op fetch
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.year.is_none()
            && self.start_date.is_none()
            && self.end_date.is_none()
            && self.is_active.is_none()
    }
}

const SEASON_COLUMNS: &str = "id, name, year, start_date, end_date, is_active, created_at";

impl Season {
    /// Fetches the single active season, `None` if no season is active
    pub async fn get_active(pool: &PgPool) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Season>(&format!(
            "SELECT {SEASON_COLUMNS} FROM seasons WHERE is_active = TRUE LIMIT 1"
        ))
        .fetch_optional(pool)
        .await
    }

    /// Lists all seasons, newest first
    pub async fn list_all(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Season>(&format!(
            "SELECT {SEASON_COLUMNS} FROM seasons ORDER BY created_at DESC"
        ))
        .fetch_all(pool)
        .await
    }

    /// Creates a new season as the active one
    ///
    /// Runs as a single transaction: deactivate every currently-active
    /// season, then insert the new row with `is_active = TRUE`. If either
    /// statement fails the transaction rolls back and no season changes
    /// state.
    pub async fn create(pool: &PgPool, data: CreateSeason) -> Result<Self, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query("UPDATE seasons SET is_active = FALSE WHERE is_active = TRUE")
            .execute(&mut *tx)
            .await?;

        let season = sqlx::query_as::<_, Season>(&format!(
            r#"
            INSERT INTO seasons (name, year, start_date, end_date, is_active)
            VALUES ($1, $2, $3, $4, TRUE)
            RETURNING {SEASON_COLUMNS}
            "#
        ))
        .bind(data.name.trim())
        .bind(data.year)
        .bind(data.start_date)
        .bind(data.end_date)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(season)
    }

    /// Applies a partial update to a season
    ///
    /// Omitted fields keep their prior values; an all-omitted update is a
    /// plain fetch. When the update sets `is_active = true`, every other
    /// active season is deactivated in the same transaction, keeping the
    /// at-most-one-active invariant intact on the update path as well as
    /// the create path.
    ///
    /// Returns the updated season, or `None` if the id does not exist. An
    /// unknown id rolls the transaction back, so the sibling deactivation
    /// never outlives a not-found result.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateSeason,
    ) -> Result<Option<Self>, sqlx::Error> {
        if data.is_empty() {
            return sqlx::query_as::<_, Season>(&format!(
                "SELECT {SEASON_COLUMNS} FROM seasons WHERE id = $1"
            ))
            .bind(id)
            .fetch_optional(pool)
            .await;
        }

        let mut tx = pool.begin().await?;

        if data.is_active == Some(true) {
            sqlx::query("UPDATE seasons SET is_active = FALSE WHERE is_active = TRUE AND id <> $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
        }

        let season = sqlx::query_as::<_, Season>(&format!(
            r#"
            UPDATE seasons
            SET name = COALESCE($2, name),
                year = COALESCE($3, year),
                start_date = COALESCE($4, start_date),
                end_date = COALESCE($5, end_date),
                is_active = COALESCE($6, is_active)
            WHERE id = $1
            RETURNING {SEASON_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(data.name.as_deref().map(str::trim))
        .bind(data.year)
        .bind(data.start_date)
        .bind(data.end_date)
        .bind(data.is_active)
        .fetch_optional(&mut *tx)
        .await?;

        if season.is_some() {
            tx.commit().await?;
        } else {
            tx.rollback().await?;
        }

        Ok(season)
    }

    /// Deletes a season; dependent tryout rows go with it (FK cascade)
    ///
    /// Returns `true` if a row was deleted, `false` if the id did not exist.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM seasons WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Checks whether a season with this id exists
    pub async fn exists(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let row: Option<(i32,)> = sqlx::query_as("SELECT 1 FROM seasons WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(row.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_season_default_is_empty() {
        let update = UpdateSeason::default();
        assert!(update.is_empty());
    }

    #[test]
    fn test_update_season_with_field_is_not_empty() {
        let update = UpdateSeason {
            is_active: Some(true),
            ..Default::default()
        };
        assert!(!update.is_empty());
    }

    // The at-most-one-active invariant is exercised against a real database
    // in nextup-api/tests/store_tests.rs.
}

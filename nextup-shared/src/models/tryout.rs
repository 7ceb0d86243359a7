/// Tryout (paid registration) model
///
/// A tryout row is proof that a user paid for a season. Rows are created
/// exclusively by the payment reconciler (`payments::reconcile`); no route
/// handler inserts them directly.
///
/// The composite `(user_id, season_id)` primary key is the idempotency
/// anchor: inserts go through `ON CONFLICT DO NOTHING`, so concurrent or
/// repeated deliveries of the same checkout (webhook retries, a webhook
/// racing the client redirect) resolve to first-writer-wins with no error.
/// A read-then-write check would race; the constraint cannot.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Paid registration record
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Tryout {
    /// Paying user
    pub user_id: Uuid,

    /// Season paid for
    pub season_id: Uuid,

    /// Provider-reported payment status; always "paid" for recorded rows
    pub payment_status: String,

    /// When the payment was recorded
    pub created_at: DateTime<Utc>,
}

impl Tryout {
    /// Records a paid registration for (user, season)
    ///
    /// Returns `true` if a new row was inserted, `false` if a row already
    /// existed (duplicate delivery, or the other ingress path won the race).
    pub async fn record_paid(
        pool: &PgPool,
        user_id: Uuid,
        season_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            INSERT INTO tryouts (user_id, season_id, payment_status)
            VALUES ($1, $2, 'paid')
            ON CONFLICT (user_id, season_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(season_id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Fetches the registration for (user, season), `None` if absent
    pub async fn find(
        pool: &PgPool,
        user_id: Uuid,
        season_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Tryout>(
            r#"
            SELECT user_id, season_id, payment_status, created_at
            FROM tryouts
            WHERE user_id = $1 AND season_id = $2
            "#,
        )
        .bind(user_id)
        .bind(season_id)
        .fetch_optional(pool)
        .await
    }

}

// Idempotency of record_paid is exercised against a real database in
// nextup-api/tests/store_tests.rs.

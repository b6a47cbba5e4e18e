use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use zenlink_core::{ReservationCandidate, ReservationStore, StoreError};

use crate::dialect::SqlDialect;

/// Postgres-backed `ReservationStore`. Each statement is row-scoped and
/// individually atomic; the conditional update in `expire_if_pending`
/// carries the whole cross-process race protection, so no surrounding
/// transaction or advisory lock is needed.
pub struct PgReservationStore {
    pool: PgPool,
    dialect: SqlDialect,
}

#[derive(sqlx::FromRow)]
struct CandidateRow {
    id: i64,
    reference_code: String,
    customer_name: String,
    created_at: DateTime<Utc>,
}

impl PgReservationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool, dialect: SqlDialect::Postgres }
    }
}

#[async_trait]
impl ReservationStore for PgReservationStore {
    async fn expired_pending_candidates(
        &self,
        ttl_minutes: i64,
    ) -> Result<Vec<ReservationCandidate>, StoreError> {
        let rows: Vec<CandidateRow> = sqlx::query_as(self.dialect.candidate_query())
            .bind(ttl_minutes)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| ReservationCandidate {
                booking_id: row.id,
                reference_code: row.reference_code,
                customer_name: row.customer_name,
                created_at: row.created_at,
            })
            .collect())
    }

    async fn expire_if_pending(&self, booking_id: i64, reason: &str) -> Result<bool, StoreError> {
        let result = sqlx::query(self.dialect.expire_query())
            .bind(booking_id)
            .bind(reason)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
